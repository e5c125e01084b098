use std::io::Write;

use timeline_core::formatting::{format_count, format_datetime};
use timeline_data::analysis::AnalysisResult;

/// Print the ranking and row counts of `analysis` as plain text.
pub fn write_summary(out: &mut impl Write, analysis: &AnalysisResult) -> std::io::Result<()> {
    writeln!(out, "Loaded:    {} messages", format_count(analysis.loaded_count))?;
    writeln!(out, "Filtered:  {} messages", format_count(analysis.filtered_count))?;
    writeln!(out, "To render: {} messages", format_count(analysis.records.len()))?;

    if analysis.ranking.is_empty() {
        writeln!(out, "No conversations left after filtering.")?;
        return Ok(());
    }

    let name_width = analysis
        .ranking
        .iter()
        .map(|c| c.conversation_with_name.chars().count())
        .max()
        .unwrap_or(0)
        .max("Conversation".len());

    writeln!(out)?;
    writeln!(out, "{:<name_width$}  {:>10}", "Conversation", "Messages")?;
    for entry in &analysis.ranking {
        writeln!(
            out,
            "{:<name_width$}  {:>10}",
            entry.conversation_with_name,
            format_count(entry.count)
        )?;
    }

    if let (Some(first), Some(last)) = (
        analysis.records.iter().map(|r| r.datetime).min(),
        analysis.records.iter().map(|r| r.datetime).max(),
    ) {
        writeln!(out)?;
        writeln!(out, "From {} to {}", format_datetime(first), format_datetime(last))?;
    }
    Ok(())
}
