//! Yahoo Finance price provider.
//!
//! Fetches daily OHLCV bars from Yahoo's v8 chart API with a single request
//! per call. Failures are mapped onto `IngestError` and returned as-is.

use super::provider::{DataSource, FetchResult, IngestError, PriceProvider, RawBar};
use crate::config::YahooConfig;
use chrono::{NaiveDate, NaiveTime};
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Yahoo Finance v8 chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
    adjclose: Option<Vec<AdjCloseData>>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteData {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

#[derive(Debug, Deserialize)]
struct AdjCloseData {
    adjclose: Vec<Option<f64>>,
}

/// Yahoo Finance price provider.
pub struct YahooProvider {
    client: reqwest::blocking::Client,
    base_url: Url,
}

impl YahooProvider {
    pub fn new(config: &YahooConfig) -> Result<Self, IngestError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| IngestError::Config(format!("failed to build HTTP client: {e}")))?;

        let base_url = Url::parse(&config.base_url)
            .map_err(|e| IngestError::Config(format!("invalid base_url '{}': {e}", config.base_url)))?;

        Ok(Self { client, base_url })
    }

    /// Build the chart API URL for a symbol and `[start, end)`.
    fn chart_url(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<Url, IngestError> {
        let start_ts = start.and_time(NaiveTime::MIN).and_utc().timestamp();
        let end_ts = end.and_time(NaiveTime::MIN).and_utc().timestamp();

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| IngestError::Config(format!("base_url cannot be a base: {}", self.base_url)))?
            .pop_if_empty()
            .extend(["v8", "finance", "chart", symbol]);
        url.query_pairs_mut()
            .append_pair("period1", &start_ts.to_string())
            .append_pair("period2", &end_ts.to_string())
            .append_pair("interval", "1d")
            .append_pair("includeAdjustedClose", "true");
        Ok(url)
    }

    /// Parse the chart API response into RawBars.
    ///
    /// A result without timestamps means the range holds no trading days and
    /// yields an empty series.
    fn parse_response(symbol: &str, resp: ChartResponse) -> Result<Vec<RawBar>, IngestError> {
        let result = resp.chart.result.ok_or_else(|| match resp.chart.error {
            Some(err) if err.code == "Not Found" => IngestError::SymbolNotFound {
                symbol: symbol.to_string(),
            },
            Some(err) => {
                IngestError::ResponseFormatChanged(format!("{}: {}", err.code, err.description))
            }
            None => IngestError::ResponseFormatChanged("empty result with no error".into()),
        })?;

        let data = result
            .into_iter()
            .next()
            .ok_or_else(|| IngestError::ResponseFormatChanged("result array is empty".into()))?;

        let Some(timestamps) = data.timestamp else {
            debug!(symbol, "no timestamps in range");
            return Ok(Vec::new());
        };

        let quote = data.indicators.quote.into_iter().next().unwrap_or_default();

        let adj_closes = data
            .indicators
            .adjclose
            .and_then(|v| v.into_iter().next())
            .map(|a| a.adjclose);

        let mut bars = Vec::with_capacity(timestamps.len());
        let mut skipped = 0usize;

        for (i, &ts) in timestamps.iter().enumerate() {
            let date = chrono::DateTime::from_timestamp(ts, 0)
                .map(|dt| dt.naive_utc().date())
                .ok_or_else(|| {
                    IngestError::ResponseFormatChanged(format!("invalid timestamp: {ts}"))
                })?;

            let open = quote.open.get(i).copied().flatten();
            let high = quote.high.get(i).copied().flatten();
            let low = quote.low.get(i).copied().flatten();
            let close = quote.close.get(i).copied().flatten();
            let volume = quote.volume.get(i).copied().flatten();
            let adj_close = adj_closes
                .as_ref()
                .and_then(|v| v.get(i).copied().flatten());

            // Non-trading days come back with every field null
            if open.is_none()
                && high.is_none()
                && low.is_none()
                && close.is_none()
                && volume.is_none()
            {
                skipped += 1;
                continue;
            }

            bars.push(RawBar {
                date,
                open: open.unwrap_or(f64::NAN),
                high: high.unwrap_or(f64::NAN),
                low: low.unwrap_or(f64::NAN),
                close: close.unwrap_or(f64::NAN),
                volume: volume.unwrap_or(0),
                adj_close: adj_close.or(close).unwrap_or(f64::NAN),
            });
        }

        if skipped > 0 {
            warn!(symbol, skipped, "skipped empty bars");
        }

        Ok(bars)
    }

    fn fetch_once(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawBar>, IngestError> {
        let url = self.chart_url(symbol, start, end)?;
        debug!(%url, "requesting chart");

        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| IngestError::NetworkUnreachable(e.to_string()))?;

        let status = resp.status();

        if status == StatusCode::UNAUTHORIZED {
            return Err(IngestError::AuthenticationRequired(
                "Yahoo Finance requires authentication".into(),
            ));
        }

        if status == StatusCode::NOT_FOUND {
            return Err(IngestError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = resp
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(60);
            return Err(IngestError::RateLimited { retry_after_secs });
        }

        if !status.is_success() {
            return Err(IngestError::Http {
                status: status.as_u16(),
                symbol: symbol.to_string(),
            });
        }

        let chart: ChartResponse = resp.json().map_err(|e| {
            IngestError::ResponseFormatChanged(format!("failed to parse response for {symbol}: {e}"))
        })?;

        Self::parse_response(symbol, chart)
    }
}

impl PriceProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, IngestError> {
        let bars = self.fetch_once(symbol, start, end)?;
        Ok(FetchResult {
            symbol: symbol.to_string(),
            bars,
            source: DataSource::YahooFinance,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> YahooProvider {
        YahooProvider::new(&YahooConfig::default()).unwrap()
    }

    fn parse(symbol: &str, json: &str) -> Result<Vec<RawBar>, IngestError> {
        let resp: ChartResponse = serde_json::from_str(json).unwrap();
        YahooProvider::parse_response(symbol, resp)
    }

    #[test]
    fn chart_url_uses_exclusive_midnight_bounds() {
        let url = provider()
            .chart_url(
                "GC=F",
                NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            )
            .unwrap();

        assert_eq!(url.path(), "/v8/finance/chart/GC=F");
        let query = url.query().unwrap();
        assert!(query.contains("period1=1672531200"));
        assert!(query.contains("period2=1704067200"));
        assert!(query.contains("interval=1d"));
    }

    #[test]
    fn chart_url_escapes_path_separators() {
        let url = provider()
            .chart_url(
                "A/B",
                NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2023, 2, 1).unwrap(),
            )
            .unwrap();
        assert_eq!(url.path(), "/v8/finance/chart/A%2FB");
    }

    #[test]
    fn parses_bars_and_skips_null_rows() {
        let json = r#"{"chart":{"result":[{
            "timestamp":[1672756200,1672842600,1672929000],
            "indicators":{
                "quote":[{
                    "open":[1830.0,null,1856.0],
                    "high":[1850.5,null,1870.2],
                    "low":[1826.1,null,1852.0],
                    "close":[1839.7,null,1865.1],
                    "volume":[211,null,154]
                }],
                "adjclose":[{"adjclose":[1839.7,null,1865.1]}]
            }}],"error":null}}"#;

        let bars = parse("GC=F", json).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2023, 1, 3).unwrap());
        assert_eq!(bars[1].close, 1865.1);
        assert_eq!(bars[1].volume, 154);
    }

    #[test]
    fn missing_timestamps_is_empty_series() {
        let json = r#"{"chart":{"result":[{"indicators":{"quote":[{}]}}],"error":null}}"#;
        let bars = parse("GC=F", json).unwrap();
        assert!(bars.is_empty());
    }

    #[test]
    fn not_found_maps_to_symbol_not_found() {
        let json = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        match parse("ZZZZ", json) {
            Err(IngestError::SymbolNotFound { symbol }) => assert_eq!(symbol, "ZZZZ"),
            other => panic!("expected SymbolNotFound, got: {other:?}"),
        }
    }

    #[test]
    fn other_chart_errors_are_format_changes() {
        let json = r#"{"chart":{"result":null,"error":{"code":"Bad Request","description":"Invalid input"}}}"#;
        assert!(matches!(
            parse("GC=F", json),
            Err(IngestError::ResponseFormatChanged(_))
        ));
    }

    #[test]
    #[ignore = "hits the live Yahoo Finance API"]
    fn live_gold_futures_year() {
        let result = provider()
            .fetch(
                "GC=F",
                NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            )
            .unwrap();
        assert!(result.bars.len() > 200);
    }
}
