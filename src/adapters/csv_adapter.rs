//! CSV file OHLC adapter.
//!
//! One file per symbol, `<dir>/<SYMBOL>.csv`, with a header row and columns
//! `date,open,high,low,close,volume`. The first column is a `YYYY-MM-DD`
//! date, a compact `YYYYMMDD` date, or Unix seconds.

use crate::domain::error::OrionError;
use crate::domain::ohlcv::{Bar, OhlcSeries};
use crate::ports::ohlc_port::OhlcPort;
use chrono::NaiveDate;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::str::FromStr;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }
}

fn midnight_utc(date: NaiveDate) -> Option<i64> {
    date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc().timestamp())
}

fn parse_timestamp(text: &str) -> Result<i64, OrionError> {
    let text = text.trim();
    let invalid = || OrionError::DataFormat {
        reason: format!(
            "invalid date {:?}, expected YYYY-MM-DD, YYYYMMDD or Unix seconds",
            text
        ),
    };

    // Eight digits is a compact date, never epoch seconds.
    if text.len() == 8 && text.bytes().all(|b| b.is_ascii_digit()) {
        return NaiveDate::parse_from_str(text, "%Y%m%d")
            .ok()
            .and_then(midnight_utc)
            .ok_or_else(invalid);
    }
    if let Ok(seconds) = text.parse::<i64>() {
        return Ok(seconds);
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(midnight_utc)
        .ok_or_else(invalid)
}

fn column<T: FromStr>(record: &csv::StringRecord, index: usize, name: &str) -> Result<T, OrionError>
where
    T::Err: std::fmt::Display,
{
    record
        .get(index)
        .ok_or_else(|| OrionError::DataFormat {
            reason: format!("missing {} column", name),
        })?
        .trim()
        .parse()
        .map_err(|e| OrionError::DataFormat {
            reason: format!("invalid {} value: {}", name, e),
        })
}

/// Integer volume, tolerating exports that write `12345.0`.
fn volume(record: &csv::StringRecord) -> Result<i64, OrionError> {
    column::<i64>(record, 5, "volume").or_else(|_| column::<f64>(record, 5, "volume").map(|v| v as i64))
}

impl OhlcPort for CsvAdapter {
    fn fetch_bars(&self, symbol: &str, lookback: usize) -> Result<Vec<Bar>, OrionError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => OrionError::NoData {
                symbol: symbol.to_string(),
            },
            _ => OrionError::Io(e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| OrionError::DataFormat {
                reason: format!("CSV parse error: {}", e),
            })?;

            let timestamp = parse_timestamp(record.get(0).ok_or_else(|| OrionError::DataFormat {
                reason: "missing date column".into(),
            })?)?;

            bars.push(Bar {
                timestamp,
                open: column(&record, 1, "open")?,
                high: column(&record, 2, "high")?,
                low: column(&record, 3, "low")?,
                close: column(&record, 4, "close")?,
                volume: volume(&record)?,
            });
        }

        let series = OhlcSeries::new(bars);
        Ok(series.tail(lookback).bars().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_test_data() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();

        let csv_content = "date,open,high,low,close,volume\n\
            2024-01-17,110.0,120.0,105.0,115.0,55000\n\
            2024-01-15,100.0,110.0,90.0,105.0,50000\n\
            2024-01-16,105.0,115.0,100.0,110.0,60000\n";
        fs::write(path.join("TCS.csv"), csv_content).unwrap();

        let epoch_content = "timestamp,open,high,low,close,volume\n\
            1705276800,10.0,11.0,9.0,10.5,1000.0\n\
            1705363200,10.5,11.5,10.0,11.0,1200\n";
        fs::write(path.join("INFY.csv"), epoch_content).unwrap();

        fs::write(path.join("BAD.csv"), "date,open,high,low,close,volume\n2024-13-45,1,1,1,1,1\n")
            .unwrap();

        let compact_content = "date,open,high,low,close,volume\n\
            20240116,105.0,115.0,100.0,110.0,60000\n\
            20240115,100.0,110.0,90.0,105.0,50000\n";
        fs::write(path.join("WIPRO.csv"), compact_content).unwrap();

        fs::write(path.join("ODD.csv"), "date,open,high,low,close,volume\n20241399,1,1,1,1,1\n")
            .unwrap();

        (dir, path)
    }

    #[test]
    fn fetch_bars_returns_sorted_data() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        let bars = adapter.fetch_bars("TCS", 365).unwrap();

        assert_eq!(bars.len(), 3);
        assert_eq!(
            bars[0].date(),
            Some(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap())
        );
        assert_eq!(bars[0].open, 100.0);
        assert_eq!(bars[0].high, 110.0);
        assert_eq!(bars[0].low, 90.0);
        assert_eq!(bars[0].close, 105.0);
        assert_eq!(bars[0].volume, 50000);
        assert_eq!(bars[2].close, 115.0);
    }

    #[test]
    fn fetch_bars_applies_lookback() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        let bars = adapter.fetch_bars("TCS", 2).unwrap();

        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].close, 110.0);
        assert_eq!(bars[1].close, 115.0);
    }

    #[test]
    fn fetch_bars_accepts_unix_seconds() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        let bars = adapter.fetch_bars("INFY", 365).unwrap();

        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].timestamp, 1_705_276_800);
        assert_eq!(bars[0].volume, 1000);
        assert_eq!(
            bars[0].date(),
            Some(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap())
        );
    }

    #[test]
    fn fetch_bars_reads_compact_dates_as_dates() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        let bars = adapter.fetch_bars("WIPRO", 365).unwrap();

        assert_eq!(bars.len(), 2);
        assert_eq!(
            bars[0].date(),
            Some(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap())
        );
        assert_eq!(bars[1].close, 110.0);
    }

    #[test]
    fn fetch_bars_rejects_invalid_compact_date() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        assert!(matches!(
            adapter.fetch_bars("ODD", 365),
            Err(OrionError::DataFormat { .. })
        ));
    }

    #[test]
    fn fetch_bars_missing_file_is_no_data() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        assert!(matches!(
            adapter.fetch_bars("XYZ", 365),
            Err(OrionError::NoData { .. })
        ));
    }

    #[test]
    fn fetch_bars_rejects_bad_date() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        assert!(matches!(
            adapter.fetch_bars("BAD", 365),
            Err(OrionError::DataFormat { .. })
        ));
    }
}
