//! Integration tests for the loader against fixture files and a static provider.

use chrono::NaiveDate;
use ingestlab_core::data::{PolarsCsvParser, SilentProgress, StaticProvider, TableParser};
use ingestlab_core::{IngestError, Loader, DEFAULT_CHUNK_SIZE};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn gold_loader(dir: &Path) -> Loader {
    let provider = StaticProvider::from_csv("GC=F", &fixture("gc_f_jan_2023.csv")).unwrap();
    Loader::with_capabilities(dir, Box::new(provider), Box::new(PolarsCsvParser::default()))
        .unwrap()
        .with_progress(Box::new(SilentProgress))
}

fn write_rows(path: &Path, rows: usize) {
    let mut file = fs::File::create(path).unwrap();
    writeln!(file, "row_id,reporter,value").unwrap();
    for i in 0..rows {
        writeln!(file, "{i},R{},{}.5", i % 17, i * 3).unwrap();
    }
}

#[test]
fn twenty_five_thousand_rows_in_three_chunks() {
    let tmp = tempfile::tempdir().unwrap();
    let input = tmp.path().join("comtrade_large.csv");
    write_rows(&input, 25_000);

    let loader = gold_loader(tmp.path());
    let chunks = loader.stream_csv(&input, DEFAULT_CHUNK_SIZE).unwrap();
    let sizes: Vec<usize> = chunks.map(|c| c.unwrap().height()).collect();

    assert_eq!(sizes, vec![10_000, 10_000, 5_000]);
}

#[test]
fn chunks_preserve_file_order() {
    let tmp = tempfile::tempdir().unwrap();
    let input = tmp.path().join("ordered.csv");
    write_rows(&input, 1_234);

    let loader = gold_loader(tmp.path());
    let mut next_id = 0i64;
    for chunk in loader.stream_csv(&input, 500).unwrap() {
        let chunk = chunk.unwrap();
        let ids = chunk.column("row_id").unwrap().i64().unwrap();
        for id in ids.into_iter() {
            assert_eq!(id, Some(next_id));
            next_id += 1;
        }
    }
    assert_eq!(next_id, 1_234);
}

#[test]
fn missing_file_fails_before_any_chunk() {
    let tmp = tempfile::tempdir().unwrap();
    let loader = gold_loader(tmp.path());

    match loader.stream_csv(&tmp.path().join("nope.csv"), 10) {
        Err(IngestError::Io { path, source }) => {
            assert!(path.ends_with("nope.csv"));
            assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
        }
        Err(other) => panic!("expected Io error, got: {other:?}"),
        Ok(_) => panic!("expected Io error, got a chunk stream"),
    }
}

#[test]
fn init_twice_keeps_directory() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("data/raw");

    Loader::init(&dir).unwrap();
    fs::write(dir.join("keep.csv"), "a\n1\n").unwrap();
    Loader::init(&dir).unwrap();

    assert!(dir.is_dir());
    assert!(dir.join("keep.csv").is_file());
}

#[test]
fn gold_series_written_to_ticker_path() {
    let tmp = tempfile::tempdir().unwrap();
    let loader = gold_loader(tmp.path());

    let df = loader
        .fetch_price_series("GC=F", date(2023, 1, 1), date(2024, 1, 1))
        .unwrap();

    assert!(df.height() > 0);
    assert_eq!(df.height(), 20);
    assert_eq!(
        df.get_column_names_str(),
        vec!["date", "open", "high", "low", "close", "volume", "adj_close"]
    );

    let path = tmp.path().join("GC=F_prices.csv");
    assert!(path.is_file());

    let back = PolarsCsvParser::default()
        .parse("read-back", &mut fs::File::open(&path).unwrap())
        .unwrap();
    assert_eq!(back.height(), df.height());
    assert_eq!(back.width(), df.width());
}

#[test]
fn refetch_overwrites_previous_file() {
    let tmp = tempfile::tempdir().unwrap();
    let loader = gold_loader(tmp.path());
    let path = loader.price_path("GC=F");

    loader
        .fetch_price_series("GC=F", date(2023, 1, 1), date(2024, 1, 1))
        .unwrap();
    let df = loader
        .fetch_price_series("GC=F", date(2023, 1, 3), date(2023, 1, 6))
        .unwrap();
    assert_eq!(df.height(), 3);

    let text = fs::read_to_string(&path).unwrap();
    // header plus three rows
    assert_eq!(text.lines().count(), 4);
    assert!(text.lines().nth(1).unwrap().starts_with("2023-01-03,"));
}

#[test]
fn empty_range_writes_header_only_file() {
    let tmp = tempfile::tempdir().unwrap();
    let loader = gold_loader(tmp.path());

    let df = loader
        .fetch_price_series("GC=F", date(2022, 1, 1), date(2022, 6, 1))
        .unwrap();
    assert_eq!(df.height(), 0);

    let text = fs::read_to_string(loader.price_path("GC=F")).unwrap();
    assert_eq!(text.lines().count(), 1);
    assert!(text.starts_with("date,open,high,low,close,volume,adj_close"));
}

#[test]
fn trade_and_news_counts_match_data_rows() {
    let tmp = tempfile::tempdir().unwrap();
    let loader = gold_loader(tmp.path());

    let trades = loader.load_trade_data(&fixture("comtrade_gold.csv")).unwrap();
    assert_eq!(trades.height(), 7);
    assert_eq!(trades.width(), 5);

    let news = loader.load_news_data(&fixture("gdelt_gold_news.csv")).unwrap();
    assert_eq!(news.height(), 4);
    let headline = news.column("headline").unwrap().str().unwrap().get(3);
    assert_eq!(headline, Some("Gold hits all-time peak, then retreats"));
}

#[test]
fn missing_trade_file_is_io_error() {
    let tmp = tempfile::tempdir().unwrap();
    let loader = gold_loader(tmp.path());

    assert!(matches!(
        loader.load_trade_data(&tmp.path().join("comtrade_missing.csv")),
        Err(IngestError::Io { .. })
    ));
}
