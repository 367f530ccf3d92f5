use chrono::NaiveDate;
use forecast_jobs::utils::{
    add_months, forecast_accuracy, future_periods, month_label, month_start, months_between,
    train_test_split,
};
use rstest::rstest;

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

#[test]
fn test_month_start_floors_to_first_day() {
    assert_eq!(month_start(date(2023, 7, 19)), date(2023, 7, 1));
    assert_eq!(month_start(date(2023, 7, 1)), date(2023, 7, 1));
}

#[test]
fn test_add_months_rolls_over_years() {
    assert_eq!(add_months(date(2023, 11, 1), 1), date(2023, 12, 1));
    assert_eq!(add_months(date(2023, 12, 1), 1), date(2024, 1, 1));
    assert_eq!(add_months(date(2023, 5, 1), 14), date(2024, 7, 1));
}

#[rstest]
#[case(date(2023, 3, 1), date(2023, 3, 1), 0)]
#[case(date(2023, 1, 1), date(2023, 12, 1), 11)]
#[case(date(2022, 11, 1), date(2024, 2, 1), 15)]
#[case(date(2023, 6, 1), date(2023, 2, 1), -4)]
fn test_months_between(#[case] first: NaiveDate, #[case] last: NaiveDate, #[case] expected: i32) {
    assert_eq!(months_between(first, last), expected);
}

#[test]
fn test_future_periods_start_the_following_month() {
    let periods = future_periods(date(2023, 11, 30), 3);
    assert_eq!(
        periods,
        vec![date(2023, 12, 1), date(2024, 1, 1), date(2024, 2, 1)]
    );
}

#[test]
fn test_month_label() {
    assert_eq!(month_label(date(2024, 3, 1)), "2024-03");
    assert_eq!(month_label(date(2024, 11, 1)), "2024-11");
}

#[test]
fn test_train_test_split_sizes() {
    let data: Vec<f64> = (0..10).map(|i| i as f64).collect();

    let (train, test) = train_test_split(&data, 0.3);
    assert_eq!(train.len(), 7);
    assert_eq!(test.len(), 3);
    assert_eq!(train[6], 6.0);
    assert_eq!(test[0], 7.0);

    // Out-of-range ratios leave everything in the training set
    let (train, test) = train_test_split(&data, 0.0);
    assert_eq!(train.len(), 10);
    assert!(test.is_empty());
}

#[test]
fn test_forecast_accuracy_perfect_fit() {
    let values = [10.0, 20.0, 30.0];
    let accuracy = forecast_accuracy(&values, &values).unwrap();

    assert_eq!(accuracy.mae, 0.0);
    assert_eq!(accuracy.mse, 0.0);
    assert_eq!(accuracy.rmse, 0.0);
    assert_eq!(accuracy.mape, 0.0);
    assert_eq!(accuracy.smape, 0.0);
}

#[test]
fn test_forecast_accuracy_known_errors() {
    let forecast = [10.0, 20.0];
    let actual = [12.0, 18.0];
    let accuracy = forecast_accuracy(&forecast, &actual).unwrap();

    assert!((accuracy.mae - 2.0).abs() < 1e-9);
    assert!((accuracy.mse - 4.0).abs() < 1e-9);
    assert!((accuracy.rmse - 2.0).abs() < 1e-9);
    assert!((accuracy.mape - 13.888_888_888_9).abs() < 1e-6);
    assert!((accuracy.smape - 14.354_066_985_6).abs() < 1e-6);
}

#[test]
fn test_forecast_accuracy_rejects_mismatch() {
    assert!(forecast_accuracy(&[1.0], &[1.0, 2.0]).is_err());
    assert!(forecast_accuracy(&[], &[]).is_err());
}
