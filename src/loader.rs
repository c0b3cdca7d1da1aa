//! Record loading from disk. CSV is the native table format; JSON and RON
//! lists of rows are accepted as well, dispatched on file extension.
use std::fs::File;
use std::io::Read;
use std::path::Path;

use thiserror::Error;

use crate::net::io::{self, IoError};
use crate::record::{RawRecord, Record, RecordError};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Serde(#[from] IoError),
    #[error("row {row}: {source}")]
    Record {
        row: usize,
        #[source]
        source: RecordError,
    },
    #[error("unsupported record file extension `{0}`, expected csv, json or ron")]
    UnsupportedFormat(String),
}

pub fn load_records<P: AsRef<Path>>(path: P, null_marker: &str) -> Result<Vec<Record>, LoadError> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    let rows: Vec<RawRecord> = match extension.as_str() {
        "csv" => return parse_csv(File::open(path)?, null_marker),
        "json" => io::read_json(path)?,
        "ron" => io::read_ron(path)?,
        _ => return Err(LoadError::UnsupportedFormat(extension)),
    };
    log::debug!("read {} rows from {}", rows.len(), path.display());
    decode(rows, null_marker)
}

/// Reads a header-led CSV table with the `Mark`, `Father_Mark`,
/// `Father_cond` and `Level` columns.
pub fn parse_csv<R: Read>(reader: R, null_marker: &str) -> Result<Vec<Record>, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let rows = reader
        .deserialize::<RawRecord>()
        .collect::<Result<Vec<_>, _>>()?;
    decode(rows, null_marker)
}

fn decode(rows: Vec<RawRecord>, null_marker: &str) -> Result<Vec<Record>, LoadError> {
    rows.into_iter()
        .enumerate()
        .map(|(row, raw)| {
            raw.into_record(null_marker)
                .map_err(|source| LoadError::Record { row: row + 1, source })
        })
        .collect()
}
