//! Bounded row sampling
//!
//! Reads the header and at most `cap` data rows, turning each row into a
//! header-keyed JSON object. Rows past the cap are dropped, not summarized.

use crate::error::DatasetError;
use crate::handle::ValidatedDataset;
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::Path;

/// Header-keyed sample of a dataset
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DatasetSample {
    /// Column names, in file order
    pub headers: Vec<String>,
    /// Sampled rows
    pub rows: Vec<Map<String, Value>>,
    /// Whether rows were dropped to respect the cap
    pub truncated: bool,
}

impl DatasetSample {
    /// Build a sample directly from rows (used by callers that already hold
    /// parsed data)
    #[must_use]
    pub fn from_rows(headers: Vec<String>, rows: Vec<Map<String, Value>>) -> Self {
        Self {
            headers,
            rows,
            truncated: false,
        }
    }

    /// Number of sampled rows
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the sample has no rows
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Drop every row past `cap`
    pub fn truncate(&mut self, cap: usize) {
        if self.rows.len() > cap {
            self.rows.truncate(cap);
            self.truncated = true;
        }
    }

    /// Compact JSON array of the rows, as embedded in prompts
    #[must_use]
    pub fn rows_json(&self) -> String {
        // Serializing maps of strings cannot fail.
        serde_json::to_string(&self.rows).unwrap_or_else(|_| "[]".to_string())
    }
}

/// Sample at most `cap` rows from a validated dataset
///
/// Parsing stops once the cap is reached, so the rest of the file is never
/// read. A `"` only opens a quoted field at the start of the field.
///
/// # Errors
/// - `DatasetError::Unreadable` if the file cannot be read or parsed
/// - `DatasetError::MalformedInput` if there is no header line
pub async fn sample_rows(dataset: &ValidatedDataset, cap: usize) -> Result<DatasetSample, DatasetError> {
    let path = dataset.path().to_path_buf();
    let delimiter = dataset.handle().delimiter();

    let sample = tokio::task::spawn_blocking({
        let path = path.clone();
        move || read_sample(&path, delimiter, cap)
    })
    .await
    .map_err(|e| DatasetError::unreadable(&path, std::io::Error::other(e)))??;

    tracing::debug!(
        "Sampled {} rows ({} columns) from {}{}",
        sample.rows.len(),
        sample.headers.len(),
        path.display(),
        if sample.truncated { ", truncated" } else { "" }
    );

    Ok(sample)
}

fn read_sample(path: &Path, delimiter: u8, cap: usize) -> Result<DatasetSample, DatasetError> {
    let unreadable = |e: csv::Error| DatasetError::unreadable(path, e.into());

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(unreadable)?;
    let mut records = reader.byte_records();

    let headers = match records.next() {
        Some(record) => normalize_headers(decode(&record.map_err(unreadable)?)),
        None => {
            return Err(DatasetError::MalformedInput {
                path: path.to_path_buf(),
            })
        }
    };

    let mut sample = DatasetSample {
        headers,
        ..DatasetSample::default()
    };
    for record in records {
        let record = record.map_err(unreadable)?;
        if sample.rows.len() == cap {
            sample.truncated = true;
            break;
        }
        sample.rows.push(to_row(&sample.headers, decode(&record)));
    }

    Ok(sample)
}

fn decode(record: &csv::ByteRecord) -> Vec<String> {
    record
        .iter()
        .map(|field| String::from_utf8_lossy(field).into_owned())
        .collect()
}

fn normalize_headers(fields: Vec<String>) -> Vec<String> {
    fields
        .into_iter()
        .enumerate()
        .map(|(i, name)| {
            let name = name.trim().trim_start_matches('\u{feff}').to_string();
            if name.is_empty() {
                format!("column_{}", i + 1)
            } else {
                name
            }
        })
        .collect()
}

fn to_row(headers: &[String], fields: Vec<String>) -> Map<String, Value> {
    let mut fields = fields.into_iter();
    headers
        .iter()
        .map(|name| (name.clone(), Value::String(fields.next().unwrap_or_default())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_are_normalized() {
        let headers = normalize_headers(vec!["\u{feff}Name".into(), " ".into(), "Share ".into()]);
        assert_eq!(headers, vec!["Name", "column_2", "Share"]);
    }

    #[test]
    fn short_rows_are_padded() {
        let headers = vec!["a".to_string(), "b".to_string()];
        let row = to_row(&headers, vec!["1".into()]);
        assert_eq!(row["a"], Value::String("1".into()));
        assert_eq!(row["b"], Value::String(String::new()));
    }

    #[test]
    fn truncate_marks_sample() {
        let mut sample = DatasetSample::from_rows(vec!["a".into()], vec![Map::new(); 5]);
        sample.truncate(3);
        assert_eq!(sample.len(), 3);
        assert!(sample.truncated);

        sample.truncate(10);
        assert_eq!(sample.len(), 3);
    }
}
