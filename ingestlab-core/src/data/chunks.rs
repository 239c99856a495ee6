//! Chunked CSV streaming.
//!
//! Records are pulled from the file with the `csv` crate, `chunk_size` at a
//! time, re-encoded behind the header row with the parser's own delimiter and
//! handed to a [`TableParser`]. Short rows pass through so the parser fills
//! them with nulls, exactly as a whole-file load does.
//! Only one chunk's worth of records is held in memory at once.

use super::provider::IngestError;
use super::table::TableParser;
use polars::prelude::DataFrame;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Lazy, finite, non-restartable sequence of tables read from one CSV file.
///
/// Every chunk except possibly the last has exactly `chunk_size` rows. After
/// the first error the iterator is exhausted.
pub struct CsvChunks<'a> {
    path: PathBuf,
    reader: csv::Reader<File>,
    header: csv::ByteRecord,
    record: csv::ByteRecord,
    /// Delimiter the parser expects in the re-encoded block.
    block_delimiter: u8,
    chunk_size: usize,
    parser: &'a dyn TableParser,
    chunks_read: usize,
    done: bool,
}

impl<'a> CsvChunks<'a> {
    /// Open `path` and read its header row. Fails before yielding anything if
    /// the file is missing, empty, or the header cannot be read.
    ///
    /// `delimiter` is the input file's delimiter.
    pub fn open(
        path: &Path,
        chunk_size: usize,
        delimiter: u8,
        parser: &'a dyn TableParser,
    ) -> Result<Self, IngestError> {
        if chunk_size == 0 {
            return Err(IngestError::InvalidChunkSize);
        }

        let file = File::open(path).map_err(|e| IngestError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(file);

        let header = reader
            .byte_headers()
            .map_err(|e| IngestError::Csv {
                path: path.to_path_buf(),
                source: e,
            })?
            .clone();

        if header.is_empty() {
            return Err(IngestError::Parse {
                source_name: path.display().to_string(),
                message: "no data: empty CSV".into(),
            });
        }

        Ok(Self {
            path: path.to_path_buf(),
            reader,
            header,
            record: csv::ByteRecord::new(),
            block_delimiter: parser.delimiter(),
            chunk_size,
            parser,
            chunks_read: 0,
            done: false,
        })
    }

    /// Number of chunks produced so far.
    pub fn chunks_read(&self) -> usize {
        self.chunks_read
    }

    fn csv_err(&self, source: csv::Error) -> IngestError {
        IngestError::Csv {
            path: self.path.clone(),
            source,
        }
    }

    /// Pull up to `chunk_size` records and re-encode them as CSV bytes.
    fn next_block(&mut self) -> Result<Option<Vec<u8>>, IngestError> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.block_delimiter)
            .flexible(true)
            .from_writer(Vec::new());
        writer
            .write_byte_record(&self.header)
            .map_err(|e| self.csv_err(e))?;

        let mut rows = 0;
        while rows < self.chunk_size {
            match self.reader.read_byte_record(&mut self.record) {
                Ok(true) => {
                    writer
                        .write_byte_record(&self.record)
                        .map_err(|e| self.csv_err(e))?;
                    rows += 1;
                }
                Ok(false) => {
                    self.done = true;
                    break;
                }
                Err(e) => return Err(self.csv_err(e)),
            }
        }

        if rows == 0 {
            return Ok(None);
        }

        debug!(path = %self.path.display(), chunk = self.chunks_read, rows, "read chunk");
        let bytes = writer
            .into_inner()
            .map_err(|e| self.csv_err(csv::Error::from(e.into_error())))?;
        Ok(Some(bytes))
    }
}

impl Iterator for CsvChunks<'_> {
    type Item = Result<DataFrame, IngestError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let bytes = match self.next_block() {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                self.done = true;
                return None;
            }
            Err(e) => {
                self.done = true;
                return Some(Err(e));
            }
        };

        let source_name = format!("{} (chunk {})", self.path.display(), self.chunks_read);
        self.chunks_read += 1;
        let result = self.parser.parse(&source_name, &mut bytes.as_slice());
        if result.is_err() {
            self.done = true;
        }
        Some(result)
    }
}

impl std::iter::FusedIterator for CsvChunks<'_> {}
