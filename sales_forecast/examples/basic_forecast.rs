use chrono::{Duration, NaiveDate};
use sales_forecast::api::{ForecastRequest, ForecastService};
use sales_forecast::{SalesForecaster, SalesRecord};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Sales Forecast: Basic Example");
    println!("=============================\n");

    let records = create_sample_sales()?;
    println!("Sample data created: {} records\n", records.len());

    let service = ForecastService::default();

    // Forecast the next four weeks with every registered algorithm
    for algorithm in service.registry().algorithms() {
        let request = ForecastRequest::new(records.clone()).with_algorithm(algorithm.key());
        let predictions = service.predict(request)?.predictions;
        println!("{}: {} forecast rows", algorithm.display_name(), predictions.len());
        for row in predictions.iter().filter(|r| r.product == "Espresso").take(3) {
            println!(
                "  {} {:>6.1}  [{:.1}, {:.1}]",
                row.date,
                row.predicted_sales,
                row.lower(),
                row.upper()
            );
        }
    }

    println!("\nHoldout comparison (4 training weeks):");
    let comparison = service.compare(ForecastRequest::new(records))?;
    for row in comparison.results {
        println!(
            "  {:<18} MAE {:>6.2}  RMSE {:>6.2}  MAPE {:>6.2}%",
            row.name, row.metrics.mae, row.metrics.rmse, row.metrics.mape
        );
    }

    // A forecaster can also be used directly
    let data = sales_forecast::SalesData::new(create_sample_sales()?)?;
    let forecaster = service.registry().create_or_default("gradient_boosting");
    println!("\n{} produced {} rows", forecaster.name(), forecaster.predict(&data, 6, 1)?.len());

    Ok(())
}

fn create_sample_sales() -> Result<Vec<SalesRecord>, Box<dyn std::error::Error>> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).ok_or("invalid start date")?;
    let mut records = Vec::new();
    for day in 0..84 {
        let date = start + Duration::days(day);
        let weekend = day % 7 >= 5;
        records.push(SalesRecord::new(date, "Espresso", (if weekend { 40.0 } else { 25.0 }) + day as f64 * 0.2));
        records.push(SalesRecord::new(date, "Croissant", if weekend { 18.0 } else { 12.0 }));
    }
    Ok(records)
}
