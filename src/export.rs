//! Tabular rendering of forecast results
//!
//! The pipeline owns no file formats; these helpers turn a `ForecastResult`
//! into the `(Date, Job_Count)` rows the export collaborator consumes.

use crate::error::Result;
use crate::pipeline::ForecastResult;
use std::io::Write;

/// Forecast points as `(ISO month-start date, count)` rows
pub fn forecast_rows(result: &ForecastResult) -> Vec<(String, u32)> {
    result
        .forecast
        .iter()
        .map(|point| (point.period.format("%Y-%m-%d").to_string(), point.count))
        .collect()
}

/// Write the forecast as two-column CSV to any sink
pub fn write_forecast_csv<W: Write>(result: &ForecastResult, writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(["Date", "Job_Count"])?;
    for (date, count) in forecast_rows(result) {
        csv_writer.write_record([date.as_str(), count.to_string().as_str()])?;
    }
    csv_writer.flush()?;
    Ok(())
}
