//! Orchestration: category lookup, model fitting, forecast assembly

use crate::data::CountSeries;
use crate::error::{ForecastError, Result};
use crate::models::sarima::SarimaModel;
use crate::models::{ForecastModel, TrainedForecastModel};
use crate::utils::future_periods;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Structural order `(p, d, q)` used for every pipeline forecast
pub const DEFAULT_ORDER: (usize, usize, usize) = (1, 1, 1);
/// Seasonal order `(P, D, Q, s)` used for every pipeline forecast
pub const DEFAULT_SEASONAL_ORDER: (usize, usize, usize, usize) = (1, 1, 1, 12);

/// A single projected month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastPoint {
    /// First day of the forecasted month
    pub period: NaiveDate,
    /// Projected job count, clamped to zero and rounded
    pub count: u32,
}

/// Historical series plus its forward projection
///
/// Invariant: the first forecast period is exactly one month after the last
/// history period, and forecast periods are consecutive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastResult {
    /// The observed monthly counts the model was fitted to
    pub history: CountSeries,
    /// Projected counts for the requested horizon
    pub forecast: Vec<ForecastPoint>,
}

/// Runs the aggregation-to-forecast flow for one category
#[derive(Debug)]
pub struct ForecastPipeline;

impl ForecastPipeline {
    /// Forecast `horizon` months of demand for `category`.
    ///
    /// The category is lower-cased before lookup so callers can pass the
    /// user's original spelling. A fresh model is fitted on every call;
    /// fitted state is never cached across calls.
    pub fn run(
        series_by_category: &BTreeMap<String, CountSeries>,
        category: &str,
        horizon: usize,
    ) -> Result<ForecastResult> {
        if horizon == 0 {
            return Err(ForecastError::InvalidHorizon(0));
        }

        let key = category.trim().to_lowercase();
        let series = series_by_category
            .get(&key)
            .ok_or_else(|| ForecastError::UnknownCategory(category.to_string()))?;

        let model = SarimaModel::new(DEFAULT_ORDER, DEFAULT_SEASONAL_ORDER)?;
        let trained = model.train(series)?;
        let output = trained.forecast(horizon)?;

        let forecast = output
            .values()
            .iter()
            .zip(future_periods(series.last_period(), horizon))
            .map(|(&value, period)| ForecastPoint {
                period,
                count: saturating_count(value),
            })
            .collect();

        Ok(ForecastResult {
            history: series.clone(),
            forecast,
        })
    }
}

/// Convert a raw model output into a job count: negative values clamp to
/// zero, everything else rounds to the nearest integer with ties going away
/// from zero.
pub fn saturating_count(value: f64) -> u32 {
    value.max(0.0).round() as u32
}
