// JSONL file operations

use eyre::{Context, Result};
use fs2::FileExt;
use serde::{Serialize, de::DeserializeOwned};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use tracing::{debug, warn};

/// Append a record to a JSONL file
pub fn append_jsonl<T: Serialize>(path: &Path, record: &T) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .context("Failed to open JSONL file for appending")?;

    // Acquire exclusive lock before writing
    file.lock_exclusive().context("Failed to acquire file lock")?;

    let json = serde_json::to_string(record)?;
    writeln!(file, "{}", json)?;
    file.sync_all()?; // Ensure data is flushed to disk

    // Lock is automatically released when file is dropped
    Ok(())
}

/// Read all records from a JSONL file in file order
///
/// Unreadable or malformed lines are skipped with a warning.
pub fn read_jsonl<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        // File doesn't exist yet, nothing written
        return Ok(Vec::new());
    }

    let file = File::open(path).context("Failed to open JSONL file")?;
    let reader = BufReader::new(file);
    let mut records = Vec::new();

    for (line_num, line) in reader.lines().enumerate() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                warn!(
                    file = ?path,
                    line = line_num + 1,
                    error = ?e,
                    "Failed to read line, skipping"
                );
                continue;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str(&line) {
            Ok(record) => records.push(record),
            Err(e) => {
                warn!(
                    file = ?path,
                    line = line_num + 1,
                    error = ?e,
                    "Failed to parse JSON, skipping"
                );
            }
        }
    }

    debug!(file = ?path, count = records.len(), "Read records from JSONL");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::fs;
    use tempfile::TempDir;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Line {
        n: u32,
        text: String,
    }

    #[test]
    fn test_append_jsonl() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("test.jsonl");

        append_jsonl(&path, &Line { n: 1, text: "hello".to_string() }).unwrap();
        append_jsonl(&path, &Line { n: 2, text: "world".to_string() }).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(content.contains("\"text\":\"hello\""));
    }

    #[test]
    fn test_read_jsonl_in_order() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("test.jsonl");

        for n in 1..=3 {
            append_jsonl(&path, &Line { n, text: format!("line {}", n) }).unwrap();
        }

        let lines: Vec<Line> = read_jsonl(&path).unwrap();
        let ns: Vec<u32> = lines.iter().map(|l| l.n).collect();
        assert_eq!(ns, vec![1, 2, 3]);
    }

    #[test]
    fn test_read_jsonl_nonexistent_file() {
        let temp = TempDir::new().unwrap();
        let lines: Vec<Line> = read_jsonl(&temp.path().join("nonexistent.jsonl")).unwrap();
        assert!(lines.is_empty());
    }

    #[test]
    fn test_read_jsonl_malformed_line() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("test.jsonl");

        fs::write(
            &path,
            "{\"n\":1,\"text\":\"valid\"}\n{malformed json}\n\n{\"n\":2,\"text\":\"also valid\"}\n",
        )
        .unwrap();

        let lines: Vec<Line> = read_jsonl(&path).unwrap();
        // Should skip malformed line and load the two valid records
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].text, "also valid");
    }
}
