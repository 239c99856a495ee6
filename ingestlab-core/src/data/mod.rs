//! Data sources: price providers, table parsing, chunked CSV streaming.

pub mod chunks;
pub mod progress;
pub mod provider;
pub mod table;
pub mod yahoo;

pub use chunks::CsvChunks;
pub use progress::{LoadKind, LoadProgress, SilentProgress, StdoutProgress};
pub use provider::{DataSource, FetchResult, IngestError, PriceProvider, RawBar, StaticProvider};
pub use table::{bars_to_dataframe, write_csv, PolarsCsvParser, TableParser};
pub use yahoo::YahooProvider;
