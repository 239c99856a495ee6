//! IngestLab Core — chunked CSV reading and commodity price download.
//!
//! This crate contains:
//! - The [`Loader`]: output directory, chunked CSV streaming, price series
//!   fetch-and-save, whole-file trade and news loads
//! - Two narrow capabilities the loader is built on: [`data::PriceProvider`]
//!   (Yahoo Finance, static fixtures) and [`data::TableParser`] (Polars CSV)
//! - TOML configuration

pub mod config;
pub mod data;
pub mod loader;

pub use config::{LoaderConfig, YahooConfig, DEFAULT_CHUNK_SIZE, DEFAULT_DATA_DIR};
pub use data::IngestError;
pub use loader::Loader;
