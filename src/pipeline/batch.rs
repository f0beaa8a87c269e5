use crate::error::{AggregatorError, Result};
use crate::types::RawJobRecord;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::warn;

/// Newest file in `dir` with the given extension, by modification time.
/// A missing directory counts as "no data".
pub fn latest_file(dir: &Path, extension: &str) -> Result<Option<PathBuf>> {
    let read_dir = match fs::read_dir(dir) {
        Ok(read_dir) => read_dir,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let mut newest: Option<(SystemTime, PathBuf)> = None;
    for entry in read_dir {
        let entry = entry?;
        let path = entry.path();
        let matches_ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(extension));
        if !matches_ext || !path.is_file() {
            continue;
        }

        let modified = entry.metadata()?.modified()?;
        let is_newer = newest
            .as_ref()
            .map_or(true, |(time, current)| (modified, &path) > (*time, current));
        if is_newer {
            newest = Some((modified, path));
        }
    }

    Ok(newest.map(|(_, path)| path))
}

/// Read one scraper output file. Accepts either a bare JSON array of jobs or
/// an object wrapping them under `jobs`. Individual entries that are not
/// job objects are skipped with a warning.
pub fn read_batch(path: &Path) -> Result<Vec<RawJobRecord>> {
    let content = fs::read_to_string(path)?;
    parse_batch(&content)
}

pub fn parse_batch(content: &str) -> Result<Vec<RawJobRecord>> {
    let value: Value = serde_json::from_str(content)?;
    let entries = match value {
        Value::Array(entries) => entries,
        Value::Object(mut object) => match object.remove("jobs") {
            Some(Value::Array(entries)) => entries,
            _ => return Err(AggregatorError::MissingField("jobs".to_string())),
        },
        _ => {
            return Err(AggregatorError::MissingField(
                "top-level array or jobs object".to_string(),
            ))
        }
    };

    let mut records = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<RawJobRecord>(entry) {
            Ok(record) => records.push(record),
            Err(e) => warn!("Skipping malformed job at index {}: {}", index, e),
        }
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::time::{Duration, UNIX_EPOCH};
    use tempfile::tempdir;

    #[test]
    fn test_parse_bare_array() {
        let records = parse_batch(r#"[{"title": "A", "link": "https://x/1"}, {"title": "B"}]"#).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].canonical_link(), Some("https://x/1"));
    }

    #[test]
    fn test_parse_jobs_object() {
        let records = parse_batch(r#"{"scraped_at": "2025-12-01", "jobs": [{"title": "A"}]}"#).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "A");
    }

    #[test]
    fn test_parse_skips_malformed_entries() {
        let records = parse_batch(r#"[{"title": "A"}, 42, "oops", {"title": ["not", "a", "string"]}]"#).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_parse_rejects_unusable_documents() {
        assert!(matches!(parse_batch("{not json"), Err(AggregatorError::Json(_))));
        assert!(matches!(parse_batch(r#"{"items": []}"#), Err(AggregatorError::MissingField(_))));
        assert!(matches!(parse_batch("12"), Err(AggregatorError::MissingField(_))));
    }

    #[test]
    fn test_latest_file_picks_newest_json() {
        let dir = tempdir().unwrap();
        let older = dir.path().join("jobs_20251201.json");
        let newer = dir.path().join("jobs_20251202.json");
        let ignored = dir.path().join("notes.txt");

        for (path, secs) in [(&older, 1_000), (&newer, 2_000), (&ignored, 3_000)] {
            let file = File::create(path).unwrap();
            file.set_modified(UNIX_EPOCH + Duration::from_secs(secs)).unwrap();
        }

        assert_eq!(latest_file(dir.path(), "json").unwrap(), Some(newer));
    }

    #[test]
    fn test_latest_file_missing_dir_or_no_match() {
        let dir = tempdir().unwrap();
        assert_eq!(latest_file(dir.path(), "json").unwrap(), None);
        assert_eq!(latest_file(&dir.path().join("absent"), "json").unwrap(), None);
    }
}
