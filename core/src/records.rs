use serde_json::Value;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{Error, Result};

/// Loads records from `path`.
///
/// A `.jsonl` file holds one record per line, blank lines skipped. Any other
/// file holds either an array of records or a single record object; other
/// JSON values yield no records.
pub fn read_records(path: &Path) -> Result<Vec<Value>> {
    let reader = BufReader::new(File::open(path)?);
    if path.extension().and_then(|s| s.to_str()) == Some("jsonl") {
        let mut records = Vec::new();
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() { continue; }
            let record: Value = serde_json::from_str(&line)
                .map_err(|source| Error::InvalidRecord { line: i + 1, source })?;
            records.push(record);
        }
        return Ok(records);
    }
    let json: Value = serde_json::from_reader(reader)
        .map_err(|source| Error::InvalidRecord { line: source.line(), source })?;
    match json {
        Value::Array(arr) => Ok(arr),
        obj @ Value::Object(_) => Ok(vec![obj]),
        _ => Ok(Vec::new()),
    }
}
