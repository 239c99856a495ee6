//! Price provider trait and structured error types.
//!
//! The PriceProvider trait abstracts over where a price series comes from
//! (Yahoo Finance, a frozen fixture file) so the loader can be driven by a
//! fake in tests and offline runs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Raw daily OHLCV bar from a price provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
    pub adj_close: f64,
}

/// Every failure the ingestion layer can report.
///
/// Nothing is retried or recovered; each variant is handed straight back to
/// the caller with the path or symbol it concerns.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to create data directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV in {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to parse table from {source_name}: {message}")]
    Parse {
        source_name: String,
        message: String,
    },

    #[error("failed to write table to {}: {message}", path.display())]
    Write { path: PathBuf, message: String },

    #[error("chunk size must be at least 1")]
    InvalidChunkSize,

    #[error("invalid date range: start {start} is not before end {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("authentication required: {0}")]
    AuthenticationRequired(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("HTTP {status} for {symbol}")]
    Http { status: u16, symbol: String },

    #[error("config error: {0}")]
    Config(String),
}

/// Result of a successful fetch for a single symbol.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub symbol: String,
    pub bars: Vec<RawBar>,
    pub source: DataSource,
}

/// Where the bars came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSource {
    YahooFinance,
    Fixture,
}

/// Capability: fetch a remote price series by symbol and date range.
///
/// `start` is inclusive and `end` exclusive, matching the Yahoo convention.
pub trait PriceProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch daily OHLCV bars for a symbol over `[start, end)`.
    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, IngestError>;
}

/// In-memory provider serving fixed bars per symbol.
///
/// Used by tests and by `ingestlab prices --fixture` for offline runs.
#[derive(Debug, Clone, Default)]
pub struct StaticProvider {
    series: HashMap<String, Vec<RawBar>>,
}

impl StaticProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register bars for a symbol, replacing any previous series.
    pub fn with_series(mut self, symbol: &str, bars: Vec<RawBar>) -> Self {
        self.series.insert(symbol.to_string(), bars);
        self
    }

    /// Load a symbol's bars from a CSV file with a
    /// `date,open,high,low,close,volume,adj_close` header.
    pub fn from_csv(symbol: &str, path: &Path) -> Result<Self, IngestError> {
        let mut reader = csv::Reader::from_path(path).map_err(|e| IngestError::Csv {
            path: path.to_path_buf(),
            source: e,
        })?;

        let bars = reader
            .deserialize::<RawBar>()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| IngestError::Csv {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(Self::new().with_series(symbol, bars))
    }
}

impl PriceProvider for StaticProvider {
    fn name(&self) -> &str {
        "static"
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, IngestError> {
        let bars = self
            .series
            .get(symbol)
            .ok_or_else(|| IngestError::SymbolNotFound {
                symbol: symbol.to_string(),
            })?
            .iter()
            .filter(|b| b.date >= start && b.date < end)
            .cloned()
            .collect();

        Ok(FetchResult {
            symbol: symbol.to_string(),
            bars,
            source: DataSource::Fixture,
        })
    }
}
