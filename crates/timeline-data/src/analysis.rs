//! The load → filter → rank/restrict pipeline shared by every entry point.

use std::path::PathBuf;

use timeline_core::error::Result;
use timeline_core::formatting::format_datetime;
use timeline_core::models::{ConversationCount, ReducedRecord};
use tracing::{debug, info};

use crate::aggregator::{ConversationAggregator, MessageFilter};
use crate::reader::load_records;

/// Rows shown in the debug preview of the reduced table.
const PREVIEW_ROWS: usize = 5;

// ── Public types ──────────────────────────────────────────────────────────────

/// Reduced data ready for rendering, plus the counts that produced it.
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    /// Rows exchanged with the top-N partners, projected to three columns.
    pub records: Vec<ReducedRecord>,
    /// The top-N partners with their message counts, busiest first.
    pub ranking: Vec<ConversationCount>,
    /// Rows loaded before filtering.
    pub loaded_count: usize,
    /// Rows left after filtering, before the top-N restriction.
    pub filtered_count: usize,
}

impl AnalysisResult {
    /// `true` when nothing is left to render.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ── Public function ───────────────────────────────────────────────────────────

/// Run the full aggregation pipeline.
///
/// 1. Load and concatenate every table in `paths`.
/// 2. Apply `filter`.
/// 3. Rank partners and keep the `top_n` busiest.
/// 4. Inner-join and project to [`ReducedRecord`]s.
///
/// A filter that removes every row is not an error: the result is empty.
pub fn load_data(
    paths: &[PathBuf],
    filter: &MessageFilter,
    top_n: usize,
) -> Result<AnalysisResult> {
    let records = load_records(paths)?;
    let loaded_count = records.len();

    let filtered = filter.apply(records);
    let filtered_count = filtered.len();
    if !filter.is_empty() {
        info!("{} of {} messages left after filtering", filtered_count, loaded_count);
    }

    let ranking = ConversationAggregator::top_conversations(&filtered, top_n);
    for entry in &ranking {
        debug!("{:>8}  {}", entry.count, entry.conversation_with_name);
    }

    let reduced = ConversationAggregator::rank_and_restrict(filtered, top_n);
    info!("Number to render: {}", reduced.len());
    log_preview(&reduced);

    Ok(AnalysisResult {
        records: reduced,
        ranking,
        loaded_count,
        filtered_count,
    })
}

fn log_preview(records: &[ReducedRecord]) {
    for record in records.iter().take(PREVIEW_ROWS) {
        debug!(
            "{}  {}  {}",
            format_datetime(record.datetime),
            record.conversation_with_name,
            record.sender_name
        );
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashSet;
    use std::io::Write;
    use std::path::Path;
    use tempfile::TempDir;
    use timeline_core::error::TimelineError;

    fn write_conversation(dir: &Path, name: &str, partner: &str, n: usize) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        for i in 0..n {
            let sender = if i % 2 == 0 { partner } else { "me" };
            let row = json!([
                1_500_000_000 + i as i64 * 86_400,
                null,
                partner,
                sender,
                "text",
                null,
                null,
                null
            ]);
            writeln!(file, "{}", row).unwrap();
        }
        path
    }

    fn fixture(dir: &Path) -> Vec<PathBuf> {
        vec![
            write_conversation(dir, "a.jsonl", "A", 50),
            write_conversation(dir, "b.jsonl", "B", 30),
            write_conversation(dir, "c.jsonl", "C", 5),
        ]
    }

    #[test]
    fn test_pipeline_top_two() {
        let tmp = TempDir::new().unwrap();
        let paths = fixture(tmp.path());

        let result = load_data(&paths, &MessageFilter::default(), 2).unwrap();
        assert_eq!(result.loaded_count, 85);
        assert_eq!(result.filtered_count, 85);
        assert_eq!(result.records.len(), 80);
        let names: Vec<&str> = result
            .ranking
            .iter()
            .map(|c| c.conversation_with_name.as_str())
            .collect();
        assert_eq!(names, vec!["A", "B"]);
        let partners: HashSet<&str> = result
            .records
            .iter()
            .map(|r| r.conversation_with_name.as_str())
            .collect();
        assert_eq!(partners, HashSet::from(["A", "B"]));
    }

    #[test]
    fn test_pipeline_matches_rank_and_restrict() {
        let tmp = TempDir::new().unwrap();
        let paths = fixture(tmp.path());

        let result = load_data(&paths, &MessageFilter::default(), 2).unwrap();
        let expected =
            ConversationAggregator::rank_and_restrict(load_records(&paths).unwrap(), 2);
        assert_eq!(result.records, expected);
    }

    #[test]
    fn test_pipeline_filter_then_rank() {
        let tmp = TempDir::new().unwrap();
        let paths = fixture(tmp.path());

        let filter = MessageFilter::new(None, None, Some("me".into()));
        let result = load_data(&paths, &filter, 1).unwrap();
        assert_eq!(result.filtered_count, 25 + 15 + 3);
        assert_eq!(result.records.len(), 25);
        assert!(result.records.iter().all(|r| r.sender_name == "A"));
    }

    #[test]
    fn test_pipeline_absent_sender_is_empty_not_error() {
        let tmp = TempDir::new().unwrap();
        let paths = fixture(tmp.path());

        let filter = MessageFilter::new(None, Some("alice".into()), None);
        let result = load_data(&paths, &filter, 10).unwrap();
        assert!(result.is_empty());
        assert!(result.ranking.is_empty());
        assert_eq!(result.loaded_count, 85);
    }

    #[test]
    fn test_pipeline_propagates_schema_mismatch() {
        let tmp = TempDir::new().unwrap();
        let bad = tmp.path().join("bad.jsonl");
        std::fs::write(&bad, "[1, \"A\", \"me\"]\n").unwrap();

        let err = load_data(&[bad], &MessageFilter::default(), 10).unwrap_err();
        assert!(matches!(err, TimelineError::SchemaMismatch { .. }));
    }
}
