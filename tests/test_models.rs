use chrono::NaiveDate;
use forecast_jobs::data::{CountSeries, SeriesEntry};
use forecast_jobs::error::ForecastError;
use forecast_jobs::models::sarima::SarimaModel;
use forecast_jobs::models::{ForecastModel, ForecastOutput, TrainedForecastModel};
use forecast_jobs::{DEFAULT_ORDER, DEFAULT_SEASONAL_ORDER};
use forecast_jobs::utils::add_months;
use rstest::rstest;

fn monthly_series(counts: &[u32]) -> CountSeries {
    let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
    let entries = counts
        .iter()
        .enumerate()
        .map(|(i, &count)| SeriesEntry {
            period: add_months(start, i as u32),
            count,
        })
        .collect();
    CountSeries::new(entries).unwrap()
}

/// Counts with an annual cycle, a mild trend and deterministic jitter that
/// does not line up with the seasonal lag
fn seasonal_counts(len: usize) -> Vec<u32> {
    const SEASON: [u32; 12] = [30, 28, 32, 35, 40, 44, 48, 45, 38, 34, 31, 29];
    (0..len)
        .map(|t| {
            let t = t as u32;
            SEASON[(t % 12) as usize] + t / 4 + (t * t) % 5
        })
        .collect()
}

fn default_model() -> SarimaModel {
    SarimaModel::new(DEFAULT_ORDER, DEFAULT_SEASONAL_ORDER).unwrap()
}

#[test]
fn test_forecast_length_invariant() {
    let series = monthly_series(&seasonal_counts(48));
    let trained = default_model().train(&series).unwrap();

    assert_eq!(trained.forecast(1).unwrap().values().len(), 1);
    assert_eq!(trained.forecast(6).unwrap().values().len(), 6);
    // The fitted model is read-only: projecting twice is allowed
    assert_eq!(trained.forecast(24).unwrap().values().len(), 24);
}

#[rstest]
#[case(23)]
#[case(24)]
fn test_short_series_rejected(#[case] len: usize) {
    let series = monthly_series(&seasonal_counts(len));
    let result = default_model().train(&series);

    match result {
        Err(ForecastError::InsufficientData { len: got, required }) => {
            assert_eq!(got, len);
            assert_eq!(required, 25);
        }
        other => panic!("expected InsufficientData, got {:?}", other),
    }
}

#[test]
fn test_minimum_length_series_fits() {
    let series = monthly_series(&seasonal_counts(25));
    let trained = default_model().train(&series).unwrap();
    assert_eq!(trained.forecast(3).unwrap().values().len(), 3);
}

#[test]
fn test_constant_series_is_degenerate() {
    let series = monthly_series(&vec![5; 30]);
    let result = default_model().train(&series);

    assert!(matches!(
        result,
        Err(ForecastError::DegenerateSeries { len: 30 })
    ));
}

#[test]
fn test_zero_horizon_rejected() {
    let series = monthly_series(&seasonal_counts(48));
    let trained = default_model().train(&series).unwrap();

    assert!(matches!(
        trained.forecast(0),
        Err(ForecastError::InvalidHorizon(0))
    ));
}

#[test]
fn test_fit_is_deterministic() {
    let series = monthly_series(&seasonal_counts(48));

    let first = default_model().train(&series).unwrap().forecast(12).unwrap();
    let second = default_model().train(&series).unwrap().forecast(12).unwrap();

    assert_eq!(first.values(), second.values());
}

#[rstest]
#[case((1, 1, 1), (1, 1, 1, 0))]
#[case((1, 1, 1), (1, 1, 1, 1))]
#[case((0, 0, 0), (0, 0, 0, 1))]
fn test_invalid_orders_rejected(
    #[case] order: (usize, usize, usize),
    #[case] seasonal_order: (usize, usize, usize, usize),
) {
    let result = SarimaModel::new(order, seasonal_order);
    assert!(matches!(result, Err(ForecastError::InvalidParameter(_))));
}

#[test]
fn test_model_name_and_minimums() {
    let model = default_model();
    assert_eq!(model.name(), "SARIMA(1,1,1)(1,1,1)[12]");
    assert_eq!(model.required_observations(), 25);

    let non_seasonal = SarimaModel::new((2, 1, 1), (0, 0, 0, 1)).unwrap();
    assert_eq!(non_seasonal.required_observations(), 5);
}

#[test]
fn test_random_walk_projects_last_value() {
    // ARIMA(0,1,0) is a random walk: the forecast holds the last observation.
    let model = SarimaModel::new((0, 1, 0), (0, 0, 0, 1)).unwrap();
    let series = monthly_series(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);

    let trained = model.train(&series).unwrap();
    let output = trained.forecast(3).unwrap();

    assert_eq!(output.values(), &[10.0, 10.0, 10.0]);
}

#[test]
fn test_forecast_values_are_finite() {
    let series = monthly_series(&seasonal_counts(48));
    let trained = default_model().train(&series).unwrap();
    let output = trained.forecast(12).unwrap();

    assert!(output.values().iter().all(|v| v.is_finite()));
}

#[test]
fn test_intervals_contain_point_and_widen() {
    let series = monthly_series(&seasonal_counts(48));
    let trained = default_model().train(&series).unwrap();
    let output = trained.forecast_with_intervals(6, 0.95).unwrap();

    let intervals = output.intervals().unwrap();
    assert_eq!(intervals.len(), 6);

    let mut last_margin = 0.0;
    for (value, (lower, upper)) in output.values().iter().zip(intervals.iter()) {
        assert!(lower <= value && value <= upper);
        let margin = upper - value;
        assert!(margin > last_margin);
        last_margin = margin;
    }
}

#[rstest]
#[case(0.0)]
#[case(1.0)]
#[case(1.5)]
fn test_invalid_confidence_level(#[case] confidence_level: f64) {
    let series = monthly_series(&seasonal_counts(48));
    let trained = default_model().train(&series).unwrap();

    let result = trained.forecast_with_intervals(6, confidence_level);
    assert!(matches!(result, Err(ForecastError::InvalidParameter(_))));
}

#[test]
fn test_fit_diagnostics() {
    let series = monthly_series(&seasonal_counts(48));
    let trained = default_model().train(&series).unwrap();

    assert!(trained.residual_variance() >= 0.0);
    assert!(trained.log_likelihood().is_finite());
    assert!(trained.aic().is_finite());
    assert_eq!(trained.ar().len(), 1);
    assert_eq!(trained.ma().len(), 1);
    assert_eq!(trained.seasonal_ar().len(), 1);
    assert_eq!(trained.seasonal_ma().len(), 1);
    assert!(trained.ar()[0].abs() < 1.0);
}

#[test]
fn test_forecast_output_validation() {
    let result = ForecastOutput::new(vec![1.0, 2.0], 3);
    assert!(result.is_err());

    let output = ForecastOutput::new(vec![1.0, 2.0, 3.0], 3).unwrap();
    assert_eq!(output.horizons(), 3);
    assert!(output.intervals().is_none());

    let mae = output.mean_absolute_error(&[2.0, 3.0, 4.0]).unwrap();
    assert!((mae - 1.0).abs() < 1e-12);
    let mse = output.mean_squared_error(&[2.0, 3.0, 4.0]).unwrap();
    assert!((mse - 1.0).abs() < 1e-12);

    assert!(output.mean_absolute_error(&[1.0]).is_err());
}
