use std::{
    fs,
    io::{self, Read},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use sales_forecast::{
    api::{ForecastRequest, ForecastService, Operation, WindowComparisonRequest},
    AlgorithmRegistry, Capabilities, DataLoader, ForecastConfig,
};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "sales-forecast", version, about = "Per-product sales forecasting and evaluation")]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Pretty-print the JSON response
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Forecast the next weeks for every product
    Predict(RequestArgs),
    /// Holdout metrics for one algorithm
    Evaluate(RequestArgs),
    /// Holdout metrics for every algorithm
    Compare(RequestArgs),
    /// Holdout metrics for every algorithm over several training windows
    CompareWindows(WindowArgs),
    /// List algorithm keys
    Algorithms,
    /// Liveness check
    Health,
}

#[derive(Args, Debug)]
struct RequestArgs {
    /// JSON request body (reads stdin when neither this nor --csv is given)
    #[arg(long, conflicts_with = "csv")]
    input: Option<PathBuf>,

    /// Sales export in CSV form
    #[arg(long)]
    csv: Option<PathBuf>,

    #[arg(long, default_value_t = 4)]
    training_weeks: u32,

    #[arg(long, default_value = "linear_regression")]
    algorithm: String,
}

#[derive(Args, Debug)]
struct WindowArgs {
    #[arg(long, conflicts_with = "csv")]
    input: Option<PathBuf>,

    #[arg(long)]
    csv: Option<PathBuf>,

    /// Training windows in weeks, e.g. `--windows 3,4,6`
    #[arg(long, value_delimiter = ',')]
    windows: Option<Vec<u32>>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = match &cli.config {
        Some(path) => ForecastConfig::from_json_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => ForecastConfig::default(),
    };
    let capabilities = Capabilities::detect();
    debug!(?capabilities, "starting");
    let service = ForecastService::new(AlgorithmRegistry::new(config, capabilities));

    let output = match cli.command {
        Commands::Predict(args) => run(&service, Operation::Predict, args, cli.pretty)?,
        Commands::Evaluate(args) => run(&service, Operation::Evaluate, args, cli.pretty)?,
        Commands::Compare(args) => run(&service, Operation::Compare, args, cli.pretty)?,
        Commands::CompareWindows(args) => match args.csv {
            Some(path) => {
                let data = DataLoader::from_csv(&path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                let request = WindowComparisonRequest {
                    sales_data: data.records().to_vec(),
                    windows: args.windows,
                };
                render(&service.compare_windows(request)?, cli.pretty)?
            }
            None => {
                let body = read_body(args.input)?;
                reformat(service.handle_json(Operation::CompareWindows, &body)?, cli.pretty)?
            }
        },
        Commands::Algorithms => render(&service.algorithms(), cli.pretty)?,
        Commands::Health => render(&service.health(), cli.pretty)?,
    };

    println!("{}", output);
    Ok(())
}

fn run(service: &ForecastService, operation: Operation, args: RequestArgs, pretty: bool) -> Result<String> {
    let Some(path) = args.csv else {
        let body = read_body(args.input)?;
        return reformat(service.handle_json(operation, &body)?, pretty);
    };

    let data = DataLoader::from_csv(&path).with_context(|| format!("failed to read {}", path.display()))?;
    let request = ForecastRequest::new(data.records().to_vec())
        .with_training_weeks(args.training_weeks)
        .with_algorithm(args.algorithm);
    match operation {
        Operation::Predict => render(&service.predict(request)?, pretty),
        Operation::Evaluate => render(&service.evaluate(request)?, pretty),
        _ => render(&service.compare(request)?, pretty),
    }
}

fn read_body(input: Option<PathBuf>) -> Result<String> {
    match input {
        Some(path) => fs::read_to_string(&path).with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut body = String::new();
            io::stdin().read_to_string(&mut body).context("failed to read stdin")?;
            Ok(body)
        }
    }
}

fn render<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    Ok(if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    })
}

fn reformat(json: String, pretty: bool) -> Result<String> {
    if !pretty {
        return Ok(json);
    }
    let value: serde_json::Value = serde_json::from_str(&json)?;
    render(&value, true)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}
