//! Raw-directory discovery and message table loading.
//!
//! Input files hold positional rows matching [`ALL_COLUMNS`]: either one JSON
//! array per line (JSON Lines) or, for `.json` files, a single JSON array of
//! such rows. Every file is read completely before aggregation starts and any
//! malformed row aborts the load.

use std::path::{Path, PathBuf};

use serde_json::Value;
use timeline_core::data_processors::{CellExtractor, TimestampProcessor};
use timeline_core::error::{Result, TimelineError};
use timeline_core::models::{column, MessageRecord, ALL_COLUMNS};
use tracing::{debug, info, warn};

// ── Raw-directory discovery ───────────────────────────────────────────────────

/// `true` for placeholder markers such as `.gitkeep` and other dot-files.
pub fn is_placeholder(path: &Path) -> bool {
    path.file_name()
        .is_some_and(|n| n.as_encoded_bytes().first() == Some(&b'.'))
}

/// Find all usable data files under `dir`, sorted by path.
///
/// Usable means a regular file that is not a placeholder marker. Hidden
/// subdirectories are not descended into.
pub fn find_data_files(dir: &Path) -> Vec<PathBuf> {
    if !dir.exists() {
        warn!("Raw data directory does not exist: {}", dir.display());
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .min_depth(1)
        .follow_links(true)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_placeholder(entry.path()))
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Skipping unreadable entry under {}: {}", dir.display(), e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

/// Ensure `dir` holds at least one usable data file and return them all.
///
/// Fails with [`TimelineError::NoInputData`] when the directory is missing
/// or contains nothing besides placeholder markers.
pub fn check_raw_data(dir: &Path) -> Result<Vec<PathBuf>> {
    let files = find_data_files(dir);
    if files.is_empty() {
        return Err(TimelineError::NoInputData {
            dir: dir.to_path_buf(),
        });
    }
    debug!("Found {} data files in {}", files.len(), dir.display());
    Ok(files)
}

/// Pick the files to load: explicit `data_paths` win, otherwise every usable
/// file in `raw_dir`.
pub fn resolve_input_paths(data_paths: &[PathBuf], raw_dir: &Path) -> Result<Vec<PathBuf>> {
    if data_paths.is_empty() {
        check_raw_data(raw_dir)
    } else {
        Ok(data_paths.to_vec())
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Load and concatenate the message tables at `paths`, in the order given.
///
/// Row order within each file is preserved and no deduplication happens, so
/// the result holds exactly the sum of the per-file row counts.
pub fn load_records(paths: &[PathBuf]) -> Result<Vec<MessageRecord>> {
    let mut all: Vec<MessageRecord> = Vec::new();
    for path in paths {
        info!("Loading {} ...", path.display());
        let records = load_file(path)?;
        debug!("{}: {} rows", path.display(), records.len());
        all.extend(records);
    }
    info!("Loaded {} messages", all.len());
    Ok(all)
}

/// Load a single message table.
pub fn load_file(path: &Path) -> Result<Vec<MessageRecord>> {
    let content = std::fs::read_to_string(path).map_err(|source| TimelineError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let is_json_array = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if is_json_array {
        parse_json_array(path, &content)
    } else {
        parse_json_lines(path, &content)
    }
}

fn parse_json_lines(path: &Path, content: &str) -> Result<Vec<MessageRecord>> {
    let mut records = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let line_no = idx + 1;
        let value: Value = serde_json::from_str(trimmed).map_err(|source| TimelineError::Parse {
            path: path.to_path_buf(),
            line: line_no,
            source,
        })?;
        records.push(parse_row(path, line_no, &value)?);
    }
    Ok(records)
}

/// `line` in errors is the 1-based row index for array files.
fn parse_json_array(path: &Path, content: &str) -> Result<Vec<MessageRecord>> {
    let rows: Vec<Value> = serde_json::from_str(content).map_err(|source| TimelineError::Parse {
        path: path.to_path_buf(),
        line: 1,
        source,
    })?;
    rows.iter()
        .enumerate()
        .map(|(idx, row)| parse_row(path, idx + 1, row))
        .collect()
}

/// Convert one positional row into a [`MessageRecord`].
pub fn parse_row(path: &Path, line: usize, row: &Value) -> Result<MessageRecord> {
    let cells = match row {
        Value::Array(cells) if cells.len() == ALL_COLUMNS.len() => cells,
        other => {
            let found = match other {
                Value::Array(cells) => cells.len(),
                Value::Object(map) => map.len(),
                _ => 1,
            };
            return Err(TimelineError::SchemaMismatch {
                path: path.to_path_buf(),
                line,
                expected: ALL_COLUMNS.len(),
                found,
            });
        }
    };

    let required = |idx: usize| {
        CellExtractor::required_text(&cells[idx]).ok_or_else(|| TimelineError::InvalidCell {
            path: path.to_path_buf(),
            line,
            column: ALL_COLUMNS[idx],
        })
    };

    let conversation_with_name = required(column::CONVERSATION_WITH_NAME)?;
    let sender_name = required(column::SENDER_NAME)?;
    let datetime = parse_datetime(path, line, cells)?;

    Ok(MessageRecord {
        datetime,
        conversation_with_name,
        sender_name,
        conversation_id: CellExtractor::optional_text(&cells[column::CONVERSATION_ID]),
        text: CellExtractor::optional_text(&cells[column::TEXT]),
        language: CellExtractor::optional_text(&cells[column::LANGUAGE]),
        platform: CellExtractor::optional_text(&cells[column::PLATFORM]),
    })
}

/// `datetime` wins when present; a `null` datetime is derived from
/// `timestamp`.
fn parse_datetime(
    path: &Path,
    line: usize,
    cells: &[Value],
) -> Result<chrono::DateTime<chrono::Utc>> {
    let datetime_cell = &cells[column::DATETIME];
    let source = if datetime_cell.is_null() {
        &cells[column::TIMESTAMP]
    } else {
        datetime_cell
    };

    TimestampProcessor::parse(source).ok_or_else(|| TimelineError::InvalidTimestamp {
        path: path.to_path_buf(),
        line,
        value: source.to_string(),
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use std::io::Write;
    use tempfile::TempDir;

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn write_file(dir: &Path, name: &str, lines: &[String]) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        path
    }

    fn row(ts: i64, partner: &str, sender: &str) -> String {
        json!([ts, "c1", partner, sender, "hello", "en", "hangouts", null]).to_string()
    }

    fn rows(n: usize, partner: &str) -> Vec<String> {
        (0..n)
            .map(|i| row(1_488_628_800 + i as i64 * 3_600, partner, "Alice"))
            .collect()
    }

    // ── Raw-directory discovery ───────────────────────────────────────────────

    #[test]
    fn test_is_placeholder() {
        assert!(is_placeholder(Path::new("raw/.gitkeep")));
        assert!(is_placeholder(Path::new(".DS_Store")));
        assert!(!is_placeholder(Path::new("raw/messages.jsonl")));
    }

    #[cfg(unix)]
    #[test]
    fn test_check_raw_data_non_utf8_file_name() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let tmp = TempDir::new().unwrap();
        let name = OsStr::from_bytes(b"chat\xff.jsonl");
        let data = tmp.path().join(name);
        std::fs::write(&data, row(1_488_628_800, "Bob", "Alice")).unwrap();

        assert!(!is_placeholder(&data));
        let files = check_raw_data(tmp.path()).unwrap();
        assert_eq!(files, vec![data]);
    }

    #[cfg(unix)]
    #[test]
    fn test_find_data_files_skips_broken_links() {
        let tmp = TempDir::new().unwrap();
        std::os::unix::fs::symlink(tmp.path().join("gone"), tmp.path().join("dangling.jsonl"))
            .unwrap();
        let data = write_file(tmp.path(), "chat.jsonl", &rows(1, "Bob"));

        assert_eq!(find_data_files(tmp.path()), vec![data]);
    }

    #[test]
    fn test_check_raw_data_only_gitkeep() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), ".gitkeep", &[]);

        let err = check_raw_data(tmp.path()).unwrap_err();
        assert!(matches!(err, TimelineError::NoInputData { .. }));
    }

    #[test]
    fn test_check_raw_data_missing_dir() {
        let tmp = TempDir::new().unwrap();
        let err = check_raw_data(&tmp.path().join("raw")).unwrap_err();
        assert!(matches!(err, TimelineError::NoInputData { .. }));
    }

    #[test]
    fn test_check_raw_data_empty_dir() {
        let tmp = TempDir::new().unwrap();
        assert!(check_raw_data(tmp.path()).is_err());
    }

    #[test]
    fn test_check_raw_data_single_file() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), ".gitkeep", &[]);
        let data = write_file(tmp.path(), "chat.jsonl", &rows(1, "Bob"));

        let files = check_raw_data(tmp.path()).unwrap();
        assert_eq!(files, vec![data]);
    }

    #[test]
    fn test_find_data_files_sorted_and_recursive() {
        let tmp = TempDir::new().unwrap();
        let sub = tmp.path().join("2017");
        std::fs::create_dir_all(&sub).unwrap();
        let hidden = tmp.path().join(".cache");
        std::fs::create_dir_all(&hidden).unwrap();
        write_file(&hidden, "skip.jsonl", &[]);
        let b = write_file(tmp.path(), "b.jsonl", &[]);
        let a = write_file(tmp.path(), "a.jsonl", &[]);
        let c = write_file(&sub, "c.jsonl", &[]);

        let files = find_data_files(tmp.path());
        let mut expected = vec![a, b, c];
        expected.sort();
        assert_eq!(files, expected);
    }

    #[test]
    fn test_resolve_input_paths_prefers_explicit() {
        let tmp = TempDir::new().unwrap();
        let explicit = vec![PathBuf::from("x.jsonl"), PathBuf::from("y.jsonl")];
        // The raw dir is empty, but explicit paths bypass the check.
        let resolved = resolve_input_paths(&explicit, tmp.path()).unwrap();
        assert_eq!(resolved, explicit);
    }

    #[test]
    fn test_resolve_input_paths_falls_back_to_raw_dir() {
        let tmp = TempDir::new().unwrap();
        let data = write_file(tmp.path(), "chat.jsonl", &rows(2, "Bob"));
        let resolved = resolve_input_paths(&[], tmp.path()).unwrap();
        assert_eq!(resolved, vec![data]);
    }

    // ── Loading ───────────────────────────────────────────────────────────────

    #[test]
    fn test_load_two_files_concatenates() {
        let tmp = TempDir::new().unwrap();
        let a = write_file(tmp.path(), "a.jsonl", &rows(10, "Bob"));
        let b = write_file(tmp.path(), "b.jsonl", &rows(10, "Carol"));

        let records = load_records(&[a, b]).unwrap();
        assert_eq!(records.len(), 20);
        assert!(records[..10].iter().all(|r| r.conversation_with_name == "Bob"));
        assert!(records[10..].iter().all(|r| r.conversation_with_name == "Carol"));
    }

    #[test]
    fn test_load_same_file_twice_keeps_duplicates() {
        let tmp = TempDir::new().unwrap();
        let a = write_file(tmp.path(), "a.jsonl", &rows(4, "Bob"));

        let records = load_records(&[a.clone(), a]).unwrap();
        assert_eq!(records.len(), 8);
    }

    #[test]
    fn test_load_skips_blank_lines() {
        let tmp = TempDir::new().unwrap();
        let mut lines = rows(2, "Bob");
        lines.insert(1, String::new());
        lines.push("   ".to_string());
        let a = write_file(tmp.path(), "a.jsonl", &lines);

        assert_eq!(load_file(&a).unwrap().len(), 2);
    }

    #[test]
    fn test_load_json_array_file() {
        let tmp = TempDir::new().unwrap();
        let body = json!([
            [1488628800, null, "Bob", "Alice", null, null, null, null],
            [1488632400, null, "Bob", "Bob", null, null, null, "2017-03-04T13:00:00Z"],
        ])
        .to_string();
        let path = write_file(tmp.path(), "chat.json", &[body]);

        let records = load_file(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].sender_name, "Bob");
        assert_eq!(
            records[1].datetime,
            Utc.with_ymd_and_hms(2017, 3, 4, 13, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_load_empty_file() {
        let tmp = TempDir::new().unwrap();
        let a = write_file(tmp.path(), "a.jsonl", &[]);
        assert!(load_records(&[a]).unwrap().is_empty());
    }

    #[test]
    fn test_load_missing_file() {
        let tmp = TempDir::new().unwrap();
        let err = load_records(&[tmp.path().join("nope.jsonl")]).unwrap_err();
        assert!(matches!(err, TimelineError::FileRead { .. }));
    }

    #[test]
    fn test_load_schema_mismatch() {
        let tmp = TempDir::new().unwrap();
        let lines = vec![
            row(1_488_628_800, "Bob", "Alice"),
            json!([1488628800, "Bob", "Alice"]).to_string(),
        ];
        let a = write_file(tmp.path(), "a.jsonl", &lines);

        match load_file(&a).unwrap_err() {
            TimelineError::SchemaMismatch {
                line,
                expected,
                found,
                ..
            } => {
                assert_eq!(line, 2);
                assert_eq!(expected, 8);
                assert_eq!(found, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_object_row_is_schema_mismatch() {
        let tmp = TempDir::new().unwrap();
        let lines = vec![json!({"senderName": "Alice"}).to_string()];
        let a = write_file(tmp.path(), "a.jsonl", &lines);

        assert!(matches!(
            load_file(&a).unwrap_err(),
            TimelineError::SchemaMismatch { found: 1, .. }
        ));
    }

    #[test]
    fn test_load_invalid_json() {
        let tmp = TempDir::new().unwrap();
        let a = write_file(tmp.path(), "a.jsonl", &["[1, 2".to_string()]);
        assert!(matches!(
            load_file(&a).unwrap_err(),
            TimelineError::Parse { line: 1, .. }
        ));
    }

    // ── parse_row ─────────────────────────────────────────────────────────────

    #[test]
    fn test_parse_row_derives_datetime_from_timestamp() {
        let value = json!([1488628800, "c1", "Bob", "Alice", "hi", "en", "messenger", null]);
        let record = parse_row(Path::new("x"), 1, &value).unwrap();
        assert_eq!(
            record.datetime,
            Utc.with_ymd_and_hms(2017, 3, 4, 12, 0, 0).unwrap()
        );
        assert_eq!(record.conversation_with_name, "Bob");
        assert_eq!(record.sender_name, "Alice");
        assert_eq!(record.conversation_id.as_deref(), Some("c1"));
        assert_eq!(record.text.as_deref(), Some("hi"));
        assert_eq!(record.language.as_deref(), Some("en"));
        assert_eq!(record.platform.as_deref(), Some("messenger"));
    }

    #[test]
    fn test_parse_row_prefers_datetime_column() {
        let value = json!([0, null, "Bob", "Alice", null, null, null, "2020-01-01 08:30:00"]);
        let record = parse_row(Path::new("x"), 1, &value).unwrap();
        assert_eq!(
            record.datetime,
            Utc.with_ymd_and_hms(2020, 1, 1, 8, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_parse_row_invalid_timestamp() {
        let value = json!(["soon", null, "Bob", "Alice", null, null, null, null]);
        assert!(matches!(
            parse_row(Path::new("x"), 4, &value).unwrap_err(),
            TimelineError::InvalidTimestamp { line: 4, .. }
        ));
    }

    #[test]
    fn test_parse_row_numeric_partner_is_invalid() {
        let value = json!([1488628800, null, 1.0, "Alice", null, null, null, null]);
        assert!(matches!(
            parse_row(Path::new("x"), 3, &value).unwrap_err(),
            TimelineError::InvalidCell {
                line: 3,
                column: "conversationWithName",
                ..
            }
        ));

        let value = json!([1488628800, null, "Bob", 42, null, null, null, null]);
        assert!(matches!(
            parse_row(Path::new("x"), 1, &value).unwrap_err(),
            TimelineError::InvalidCell {
                column: "senderName",
                ..
            }
        ));
    }

    #[test]
    fn test_parse_row_missing_sender() {
        let value = json!([1488628800, null, "Bob", null, null, null, null, null]);
        assert!(matches!(
            parse_row(Path::new("x"), 1, &value).unwrap_err(),
            TimelineError::InvalidCell {
                column: "senderName",
                ..
            }
        ));
    }
}
