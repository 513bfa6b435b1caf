//! # Run a backtest against a local price file
//! strikecast run --prices data/SPY.csv --ticker SPY --config config/default.toml
//!
//! # Check a price file before running
//! strikecast validate --prices data/SPY.csv

use std::process;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use strikecast::backtest::{BacktestConfig, BacktestEngine};
use strikecast::data::PriceLoader;
use strikecast::validation::{CalibrationCheck, SeriesValidator};

#[derive(Parser)]
#[command(name = "strikecast")]
#[command(about = "Quantile-based strike forecasting and option-selling backtests")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a backtest over a local price file
    Run {
        /// Path to the price file (CSV or parquet with date + adj_close)
        #[arg(short, long)]
        prices: String,

        /// Path to a TOML configuration file
        #[arg(short, long)]
        config: Option<String>,

        /// Ticker label for output
        #[arg(short, long, default_value = "SERIES")]
        ticker: String,

        /// Confidence level when no config file is given
        #[arg(long, default_value_t = 0.95)]
        confidence_level: f64,

        /// Horizon in trading sessions when no config file is given
        #[arg(long, default_value_t = 21)]
        horizon: usize,
    },

    /// Check a price file's integrity
    Validate {
        /// Path to the price file
        #[arg(short, long)]
        prices: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("Warning: failed to install log subscriber");
    }

    let outcome = match cli.command {
        Commands::Run {
            prices,
            config,
            ticker,
            confidence_level,
            horizon,
        } => run(&prices, config.as_deref(), &ticker, confidence_level, horizon),
        Commands::Validate { prices } => validate(&prices),
    };

    if let Err(message) = outcome {
        eprintln!("Error: {}", message);
        process::exit(1);
    }
}

fn run(
    prices: &str,
    config_path: Option<&str>,
    ticker: &str,
    confidence_level: f64,
    horizon: usize,
) -> Result<(), String> {
    let config = match config_path {
        Some(path) => {
            let contents = std::fs::read_to_string(path)
                .map_err(|e| format!("failed to read {}: {}", path, e))?;
            toml::from_str::<BacktestConfig>(&contents)
                .map_err(|e| format!("failed to parse {}: {}", path, e))?
        }
        None => BacktestConfig::new(confidence_level, horizon),
    };

    let series = PriceLoader::load(prices, ticker).map_err(|e| e.to_string())?;
    let engine = BacktestEngine::new(config);
    let result = engine.run(&series).map_err(|e| e.to_string())?;

    println!("{}", result.summary());

    // Hit rates vs the configured confidence level, with sampling error.
    let check = CalibrationCheck::new();
    let rates = &result.report.hit_rates;
    let alpha = result.config.confidence_level;

    for (side, survived, decided) in [
        ("put", rates.put_survived, rates.put_decided),
        ("call", rates.call_survived, rates.call_decided),
    ] {
        if let Some(report) = check.check(alpha, survived, decided) {
            println!(
                "Calibration ({}): observed {:.2}% vs expected {:.2}%, z = {:.2}{}",
                side,
                report.observed_rate * 100.0,
                report.expected_rate * 100.0,
                report.z_score,
                if report.consistent { "" } else { " [OFF]" },
            );
        }
    }

    Ok(())
}

fn validate(prices: &str) -> Result<(), String> {
    let series = PriceLoader::load(prices, "SERIES").map_err(|e| e.to_string())?;
    let report = SeriesValidator::validate(series.points());

    println!("{}", report.summary());
    for check in report.failed_checks() {
        println!("  FAIL {}: {}", check.name, check.message);
    }

    if report.all_passed() {
        Ok(())
    } else {
        Err("integrity checks failed".to_string())
    }
}
