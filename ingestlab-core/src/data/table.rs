//! Delimited table parsing and writing on top of Polars.

use super::provider::{IngestError, RawBar};
use chrono::NaiveDate;
use polars::prelude::*;
use std::fs;
use std::io::{Cursor, Read};
use std::path::Path;

/// Capability: parse a delimited table (header row first) from a byte stream.
pub trait TableParser: Send + Sync {
    /// Parse everything `input` yields into one table.
    ///
    /// `source_name` only labels errors (a path, or a path plus chunk number).
    fn parse(&self, source_name: &str, input: &mut dyn Read) -> Result<DataFrame, IngestError>;

    /// Field delimiter this parser reads. Chunked streams re-encode with it.
    fn delimiter(&self) -> u8 {
        b','
    }
}

/// Polars CSV reader with dtype inference over the whole input.
#[derive(Debug, Clone, Copy)]
pub struct PolarsCsvParser {
    delimiter: u8,
}

impl PolarsCsvParser {
    pub fn new(delimiter: u8) -> Self {
        Self { delimiter }
    }
}

impl Default for PolarsCsvParser {
    fn default() -> Self {
        Self::new(b',')
    }
}

impl TableParser for PolarsCsvParser {
    fn delimiter(&self) -> u8 {
        self.delimiter
    }

    fn parse(&self, source_name: &str, input: &mut dyn Read) -> Result<DataFrame, IngestError> {
        let parse_err = |message: String| IngestError::Parse {
            source_name: source_name.to_string(),
            message,
        };

        let mut bytes = Vec::new();
        input
            .read_to_end(&mut bytes)
            .map_err(|e| parse_err(format!("read: {e}")))?;

        let delimiter = self.delimiter;
        CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(None)
            .map_parse_options(move |opts| opts.with_separator(delimiter))
            .into_reader_with_file_handle(Cursor::new(bytes))
            .finish()
            .map_err(|e| parse_err(e.to_string()))
    }
}

/// Convert price bars to a DataFrame with a `Date` column followed by OHLCV.
pub fn bars_to_dataframe(bars: &[RawBar]) -> Result<DataFrame, IngestError> {
    let epoch = NaiveDate::default();
    let dates: Vec<i32> = bars
        .iter()
        .map(|b| (b.date - epoch).num_days() as i32)
        .collect();
    let opens: Vec<f64> = bars.iter().map(|b| b.open).collect();
    let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
    let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let volumes: Vec<u64> = bars.iter().map(|b| b.volume).collect();
    let adj_closes: Vec<f64> = bars.iter().map(|b| b.adj_close).collect();

    let frame_err = |e: PolarsError| IngestError::Parse {
        source_name: "price bars".into(),
        message: e.to_string(),
    };

    DataFrame::new(vec![
        Column::new("date".into(), dates)
            .cast(&DataType::Date)
            .map_err(frame_err)?,
        Column::new("open".into(), opens),
        Column::new("high".into(), highs),
        Column::new("low".into(), lows),
        Column::new("close".into(), closes),
        Column::new("volume".into(), volumes),
        Column::new("adj_close".into(), adj_closes),
    ])
    .map_err(frame_err)
}

/// Write a DataFrame as CSV with a header row, truncating any existing file.
pub fn write_csv(df: &mut DataFrame, path: &Path) -> Result<(), IngestError> {
    let mut file = fs::File::create(path).map_err(|e| IngestError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(df)
        .map_err(|e| IngestError::Write {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}
