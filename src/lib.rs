//! # Forecast Jobs
//!
//! A Rust library for aggregating job posting events into monthly demand
//! series and projecting future demand with seasonal ARIMA models.
//!
//! ## Features
//!
//! - Event ingestion from CSV or in-memory records
//! - Gap-free monthly count series per job domain (zero-filled resampling)
//! - Seasonal ARIMA fitting with conditional-sum-of-squares estimation
//! - Multi-step point forecasts with calendar-aligned periods
//! - Confidence intervals and accuracy metrics for evaluation
//!
//! ## Quick Start
//!
//! ```
//! use chrono::{Months, NaiveDate};
//! use forecast_jobs::{Event, ForecastPipeline, SeriesAggregator};
//!
//! # fn main() -> forecast_jobs::error::Result<()> {
//! // Three years of monthly postings for one domain
//! let start = NaiveDate::from_ymd_opt(2021, 1, 15).unwrap();
//! let mut events = Vec::new();
//! for month in 0..36u32 {
//!     let date = start.checked_add_months(Months::new(month)).unwrap();
//!     let postings = 30 + 10 * ((month % 12) / 6);
//!     for _ in 0..postings {
//!         events.push(Event::new(date, "Engineering"));
//!     }
//! }
//!
//! // Aggregate, then forecast the next six months
//! let series_by_category = SeriesAggregator::aggregate(&events);
//! let result = ForecastPipeline::run(&series_by_category, "engineering", 6)?;
//!
//! assert_eq!(result.forecast.len(), 6);
//! # Ok(())
//! # }
//! ```

pub mod data;
pub mod error;
pub mod export;
pub mod models;
pub mod pipeline;
pub mod utils;

// Re-export commonly used types
pub use crate::data::{CountSeries, DataLoader, Event, SeriesAggregator, SeriesEntry};
pub use crate::error::ForecastError;
pub use crate::models::sarima::{SarimaModel, TrainedSarimaModel};
pub use crate::models::{ForecastModel, ForecastOutput, TrainedForecastModel};
pub use crate::pipeline::{
    ForecastPipeline, ForecastPoint, ForecastResult, DEFAULT_ORDER, DEFAULT_SEASONAL_ORDER,
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
