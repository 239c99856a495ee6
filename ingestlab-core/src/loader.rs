//! The Loader: one output directory plus the ingestion operations.
//!
//! Operations block until their disk or network I/O finishes. Nothing is
//! retried; every failure is returned to the caller unchanged.

use crate::config::{LoaderConfig, YahooConfig, DEFAULT_DATA_DIR};
use crate::data::{
    bars_to_dataframe, write_csv, CsvChunks, IngestError, LoadKind, LoadProgress,
    PolarsCsvParser, PriceProvider, StdoutProgress, TableParser, YahooProvider,
};
use chrono::NaiveDate;
use polars::prelude::DataFrame;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub struct Loader {
    data_dir: PathBuf,
    delimiter: u8,
    provider: Box<dyn PriceProvider>,
    parser: Box<dyn TableParser>,
    progress: Box<dyn LoadProgress>,
}

impl Loader {
    /// Create `data_dir` (and missing parents) and build a loader backed by
    /// Yahoo Finance and the Polars CSV reader.
    ///
    /// Safe to call repeatedly on the same directory.
    pub fn init(data_dir: impl Into<PathBuf>) -> Result<Self, IngestError> {
        let provider = YahooProvider::new(&YahooConfig::default())?;
        Self::with_capabilities(
            data_dir,
            Box::new(provider),
            Box::new(PolarsCsvParser::default()),
        )
    }

    /// [`Loader::init`] on `data/raw`.
    pub fn init_default() -> Result<Self, IngestError> {
        Self::init(DEFAULT_DATA_DIR)
    }

    /// Build a loader from config: data directory, delimiter, Yahoo settings.
    pub fn from_config(config: &LoaderConfig) -> Result<Self, IngestError> {
        config.validate()?;
        let delimiter = config.delimiter_byte()?;
        let provider = YahooProvider::new(&config.yahoo)?;
        let mut loader = Self::with_capabilities(
            &config.data_dir,
            Box::new(provider),
            Box::new(PolarsCsvParser::new(delimiter)),
        )?;
        loader.delimiter = delimiter;
        Ok(loader)
    }

    /// Build a loader over explicit capabilities, e.g. fakes in tests.
    pub fn with_capabilities(
        data_dir: impl Into<PathBuf>,
        provider: Box<dyn PriceProvider>,
        parser: Box<dyn TableParser>,
    ) -> Result<Self, IngestError> {
        let data_dir = data_dir.into();
        fs::create_dir_all(&data_dir).map_err(|e| IngestError::CreateDir {
            path: data_dir.clone(),
            source: e,
        })?;
        debug!(dir = %data_dir.display(), "data directory ready");

        Ok(Self {
            data_dir,
            delimiter: b',',
            provider,
            parser,
            progress: Box::new(StdoutProgress),
        })
    }

    /// Replace the progress reporter (stdout by default).
    pub fn with_progress(mut self, progress: Box<dyn LoadProgress>) -> Self {
        self.progress = progress;
        self
    }

    /// Field delimiter of files read by `stream_csv`. Chunks are re-encoded
    /// with the parser's own delimiter, so any parser works with any input.
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Where `fetch_price_series` writes a ticker's series.
    pub fn price_path(&self, ticker: &str) -> PathBuf {
        self.data_dir.join(format!("{ticker}_prices.csv"))
    }

    /// Stream a CSV file as tables of at most `chunk_size` rows, in file order.
    ///
    /// The file is opened here, so a missing path fails before any chunk.
    pub fn stream_csv(&self, path: &Path, chunk_size: usize) -> Result<CsvChunks<'_>, IngestError> {
        CsvChunks::open(path, chunk_size, self.delimiter, self.parser.as_ref())
    }

    /// Fetch `ticker` over `[start, end)`, write it to
    /// `{data_dir}/{ticker}_prices.csv` (overwriting), and return the table.
    ///
    /// An empty series still produces a header-only file and an empty table.
    pub fn fetch_price_series(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<DataFrame, IngestError> {
        if start >= end {
            return Err(IngestError::InvalidDateRange { start, end });
        }

        debug!(ticker, %start, %end, provider = self.provider.name(), "fetching price series");
        let fetched = self.provider.fetch(ticker, start, end)?;
        let mut df = bars_to_dataframe(&fetched.bars)?;

        let path = self.price_path(ticker);
        write_csv(&mut df, &path)?;
        info!(ticker, rows = df.height(), path = %path.display(), "wrote price series");

        self.progress.on_loaded(LoadKind::Prices, df.height(), &path);
        Ok(df)
    }

    /// Read a whole trade-records CSV (UN Comtrade, World Bank exports).
    pub fn load_trade_data(&self, path: &Path) -> Result<DataFrame, IngestError> {
        self.load_whole(path, LoadKind::Trades)
    }

    /// Read a whole news/event CSV (e.g. GDELT exports) for entity extraction.
    pub fn load_news_data(&self, path: &Path) -> Result<DataFrame, IngestError> {
        self.load_whole(path, LoadKind::News)
    }

    fn load_whole(&self, path: &Path, kind: LoadKind) -> Result<DataFrame, IngestError> {
        let mut file = File::open(path).map_err(|e| IngestError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let df = self.parser.parse(&path.display().to_string(), &mut file)?;
        self.progress.on_loaded(kind, df.height(), path);
        Ok(df)
    }
}
