use forecast_jobs::export::write_forecast_csv;
use forecast_jobs::utils::month_label;
use forecast_jobs::{DataLoader, ForecastPipeline, SeriesAggregator};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let (Some(path), Some(category)) = (args.next(), args.next()) else {
        eprintln!("usage: forecast_from_csv <events.csv> <category> [horizon]");
        std::process::exit(2);
    };
    let horizon: usize = args.next().as_deref().unwrap_or("6").parse()?;

    let events = DataLoader::from_csv(&path)?;
    eprintln!("loaded {} events from {}", events.len(), path);

    let series_by_category = SeriesAggregator::aggregate(&events);
    let result = ForecastPipeline::run(&series_by_category, &category, horizon)?;

    eprintln!(
        "history: {} months ending {}",
        result.history.len(),
        month_label(result.history.last_period())
    );

    write_forecast_csv(&result, std::io::stdout())?;
    Ok(())
}
