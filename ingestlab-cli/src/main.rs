//! IngestLab CLI — price download and CSV loading commands.
//!
//! Commands:
//! - `prices` — fetch a price series from Yahoo Finance and save it as CSV
//! - `trades` — load a trade-records CSV and report its row count
//! - `news` — load a news/event CSV and report its row count
//! - `stream` — read a large CSV in fixed-size chunks

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use ingestlab_core::data::{
    LoadProgress, PolarsCsvParser, SilentProgress, StaticProvider, StdoutProgress,
};
use ingestlab_core::{Loader, LoaderConfig};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "ingestlab",
    about = "IngestLab CLI — commodity price and trade data ingestion"
)]
struct Cli {
    /// Path to a TOML config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output directory. Overrides `data_dir` from the config (default data/raw).
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Only print warnings and errors; no row-count lines.
    #[arg(long, global = true, default_value_t = false)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a daily price series and save it as `<data-dir>/<TICKER>_prices.csv`.
    Prices {
        /// Ticker symbol (e.g., GC=F for gold futures).
        ticker: String,

        /// Start date, inclusive (YYYY-MM-DD).
        #[arg(long, default_value = "2023-01-01")]
        start: String,

        /// End date, exclusive (YYYY-MM-DD).
        #[arg(long, default_value = "2024-01-01")]
        end: String,

        /// Serve bars from this CSV instead of the network.
        #[arg(long)]
        fixture: Option<PathBuf>,

        /// Rows of the result to print.
        #[arg(long, default_value_t = 5)]
        head: usize,
    },
    /// Load a whole trade-records CSV (UN Comtrade, World Bank).
    Trades {
        file: PathBuf,
    },
    /// Load a whole news/event CSV (e.g. GDELT).
    News {
        file: PathBuf,
    },
    /// Stream a large CSV in chunks and print each chunk's shape.
    Stream {
        file: PathBuf,

        /// Rows per chunk. Defaults to `chunk_size` from the config (10000).
        #[arg(long)]
        chunk_size: Option<usize>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.quiet);

    let mut config = match &cli.config {
        Some(path) => LoaderConfig::from_file(path)?,
        None => LoaderConfig::default(),
    };
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }

    let progress: Box<dyn LoadProgress> = if cli.quiet {
        Box::new(SilentProgress)
    } else {
        Box::new(StdoutProgress)
    };

    match cli.command {
        Commands::Prices {
            ticker,
            start,
            end,
            fixture,
            head,
        } => run_prices(&config, progress, &ticker, &start, &end, fixture, head),
        Commands::Trades { file } => {
            let loader = Loader::from_config(&config)?.with_progress(progress);
            loader.load_trade_data(&file)?;
            Ok(())
        }
        Commands::News { file } => {
            let loader = Loader::from_config(&config)?.with_progress(progress);
            loader.load_news_data(&file)?;
            Ok(())
        }
        Commands::Stream { file, chunk_size } => {
            let chunk_size = chunk_size.unwrap_or(config.chunk_size);
            if chunk_size == 0 {
                bail!("--chunk-size must be at least 1");
            }
            let loader = Loader::from_config(&config)?.with_progress(progress);
            run_stream(&loader, &file, chunk_size, cli.quiet)
        }
    }
}

fn init_tracing(quiet: bool) {
    let default = if quiet {
        "ingestlab=warn,ingestlab_core=warn"
    } else {
        "ingestlab=info,ingestlab_core=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_date(flag: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .with_context(|| format!("--{flag} must be YYYY-MM-DD, got '{value}'"))
}

fn run_prices(
    config: &LoaderConfig,
    progress: Box<dyn LoadProgress>,
    ticker: &str,
    start: &str,
    end: &str,
    fixture: Option<PathBuf>,
    head: usize,
) -> Result<()> {
    let start = parse_date("start", start)?;
    let end = parse_date("end", end)?;
    if start >= end {
        bail!("--start ({start}) must be before --end ({end})");
    }

    let loader = match fixture {
        Some(path) => {
            let delimiter = config.delimiter_byte()?;
            Loader::with_capabilities(
                &config.data_dir,
                Box::new(StaticProvider::from_csv(ticker, &path)?),
                Box::new(PolarsCsvParser::new(delimiter)),
            )?
            .with_delimiter(delimiter)
        }
        None => Loader::from_config(config)?,
    }
    .with_progress(progress);

    info!(provider = loader.provider_name(), ticker, "fetching");
    let df = loader.fetch_price_series(ticker, start, end)?;
    if head > 0 {
        println!("{}", df.head(Some(head)));
    }
    Ok(())
}

fn run_stream(loader: &Loader, file: &std::path::Path, chunk_size: usize, quiet: bool) -> Result<()> {
    let mut total_rows = 0usize;
    let mut chunks = loader.stream_csv(file, chunk_size)?;

    for chunk in chunks.by_ref() {
        let chunk = chunk?;
        total_rows += chunk.height();
        if !quiet {
            println!("Loaded chunk with shape: ({}, {})", chunk.height(), chunk.width());
        }
    }

    info!(chunks = chunks.chunks_read(), rows = total_rows, "stream complete");
    Ok(())
}
