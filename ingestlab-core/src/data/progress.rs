//! Row-count reporting after bulk loads.

use std::path::Path;

/// What kind of load just finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadKind {
    Prices,
    Trades,
    News,
}

/// Callback invoked once per completed bulk load.
pub trait LoadProgress: Send + Sync {
    fn on_loaded(&self, kind: LoadKind, rows: usize, path: &Path);
}

/// Prints one human-readable line per load to stdout.
pub struct StdoutProgress;

impl StdoutProgress {
    /// The line printed for one completed load.
    pub fn message(kind: LoadKind, rows: usize, path: &Path) -> String {
        match kind {
            LoadKind::Prices => format!(
                "Saved {rows} rows of commodity data to {}.",
                path.display()
            ),
            LoadKind::Trades => format!("Loaded {rows} trade records"),
            LoadKind::News => format!("Loaded {rows} news articles"),
        }
    }
}

impl LoadProgress for StdoutProgress {
    fn on_loaded(&self, kind: LoadKind, rows: usize, path: &Path) {
        println!("{}", Self::message(kind, rows, path));
    }
}

/// Reports nothing.
pub struct SilentProgress;

impl LoadProgress for SilentProgress {
    fn on_loaded(&self, _kind: LoadKind, _rows: usize, _path: &Path) {}
}
