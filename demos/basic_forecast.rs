use chrono::{Datelike, Months, NaiveDate};
use forecast_jobs::export::write_forecast_csv;
use forecast_jobs::utils::month_label;
use forecast_jobs::{Event, ForecastPipeline, SeriesAggregator};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Forecast Jobs: Basic Forecasting Example");
    println!("========================================\n");

    // Create a synthetic posting log
    println!("Creating sample events...");
    let events = create_sample_events();
    println!("Sample events created: {} postings\n", events.len());

    // Aggregate into monthly series per domain
    let series_by_category = SeriesAggregator::aggregate(&events);
    for (category, series) in &series_by_category {
        println!(
            "  {}: {} months ({} .. {})",
            category,
            series.len(),
            month_label(series.first_period()),
            month_label(series.last_period())
        );
    }

    // Forecast six months of engineering demand
    println!("\nFitting seasonal model for 'engineering'...");
    let result = ForecastPipeline::run(&series_by_category, "engineering", 6)?;

    println!("\nLast observed months:");
    for entry in result.history.entries().iter().rev().take(3).rev() {
        println!("  {}  {:>4}", month_label(entry.period), entry.count);
    }

    println!("\nForecast:");
    for point in &result.forecast {
        println!("  {}  {:>4}", month_label(point.period), point.count);
    }

    println!("\nForecast as CSV:");
    write_forecast_csv(&result, std::io::stdout())?;

    Ok(())
}

/// Four years of postings for two domains with an annual hiring cycle
fn create_sample_events() -> Vec<Event> {
    let mut rng = StdRng::seed_from_u64(42);
    let noise = Normal::new(0.0, 3.0).unwrap();
    let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();

    let mut events = Vec::new();
    for month in 0..48u32 {
        let period = start.checked_add_months(Months::new(month)).unwrap();

        // Hiring peaks in late spring, dips around the new year
        let cycle = ((period.month() as f64 - 1.0) * std::f64::consts::PI / 6.0).sin() * 12.0;
        let engineering = (35.0 + cycle + month as f64 * 0.3 + noise.sample(&mut rng)).max(1.0);
        let design = (18.0 + cycle * 0.5 + noise.sample(&mut rng)).max(1.0);

        for _ in 0..engineering as u32 {
            let day = rng.gen_range(1..=28);
            events.push(Event::new(period.with_day(day).unwrap(), "Engineering"));
        }
        for _ in 0..design as u32 {
            let day = rng.gen_range(1..=28);
            events.push(Event::new(period.with_day(day).unwrap(), "Design"));
        }
    }

    events
}
