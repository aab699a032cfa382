//! `gfn`: runs the green-finance pipeline over two CSV files.
//!
//! ```text
//! gfn public.csv private.csv --scenario debt_crisis --basis scenario --format json
//! ```
use clap::{Parser, ValueEnum};
use green_finance_core::{
    display, ingest, Basis, CoreConfig, CoreError, MetricCalculator, Pipeline, RunRequest, Scenario, Side,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "gfn")]
#[command(about = "Green Financing Need calculator and policy scenario simulator")]
#[command(version)]
struct Args {
    /// Public green-finance CSV
    public: PathBuf,

    /// Private green-finance CSV
    private: PathBuf,

    /// Scenario to apply: fiscal_reform, debt_crisis or private_incentive
    #[arg(short, long)]
    scenario: Option<String>,

    /// First year affected by the scenario
    #[arg(short, long)]
    threshold: Option<i32>,

    /// Table the summary is computed from: baseline or scenario
    #[arg(short, long, default_value = "baseline")]
    basis: String,

    /// Print an empty summary instead of failing when the files share no key
    #[arg(long)]
    allow_empty: bool,

    /// Carbon price per ton of CO2
    #[arg(long)]
    carbon_price: Option<f64>,

    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the rows and the derivation trace of one country
    #[arg(long)]
    country: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(CoreError::EmptyResult { public_rows, private_rows, .. }) => {
            warn!(public_rows, private_rows, "no (country, year) pair is shared by both files");
            ExitCode::from(3)
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(args: &Args) -> Result<CoreConfig, CoreError> {
    let mut config = match &args.config {
        Some(path) => CoreConfig::load(path)?,
        None => CoreConfig::default(),
    };
    // Command-line flags take precedence over the file.
    if let Some(price) = args.carbon_price {
        config.carbon_price_per_ton = price;
    }
    if let Some(threshold) = args.threshold {
        config.scenario_year_threshold = threshold;
    }
    config.validate()?;
    Ok(config)
}

fn run(args: &Args) -> Result<(), CoreError> {
    let config = load_config(args)?;
    let request = RunRequest {
        scenario: args.scenario.as_deref().map(str::parse::<Scenario>).transpose()?,
        year_threshold: args.threshold,
        basis: args.basis.parse::<Basis>()?,
        allow_empty: args.allow_empty,
    };

    let public = ingest::load_frame(&args.public, Side::Public, &config)?;
    let private = ingest::load_frame(&args.private, Side::Private, &config)?;

    let calculator = MetricCalculator::new(&config);
    let output = Pipeline::new(config).run(&public, &private, &request)?;
    info!(records = output.baseline.len(), countries = output.summary.len(), "pipeline finished");

    match args.format {
        Format::Json => {
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Format::Text => {
            if let Some(outcome) = &output.scenario {
                print!("{}", display::format_scenario(outcome));
                println!();
            }
            println!("Mean GFN by country ({:?}):", output.basis);
            print!("{}", display::format_summary(&output.summary));

            if let Some(country) = &args.country {
                let rows = green_finance_core::country_view(output.summarized_table(), country);
                if rows.is_empty() {
                    warn!(%country, "country not present in the joined table");
                }
                for record in rows {
                    println!();
                    print!("{}", display::format_trace(record, &calculator));
                }
            }
        }
    }
    Ok(())
}
