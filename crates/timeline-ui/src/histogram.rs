//! Per-partner message counts bucketed into fixed-width day bins.

use std::collections::HashMap;

use chrono::{Days, NaiveDate};
use timeline_core::models::ReducedRecord;

/// Message counts for one conversation partner, one value per bin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistogramSeries {
    pub name: String,
    pub counts: Vec<u64>,
}

impl HistogramSeries {
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }
}

/// Histogram over the date axis with one series per conversation partner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram {
    /// Bin width in days (at least 1).
    pub bin_width_days: u32,
    /// First day covered by each bin.
    pub bin_starts: Vec<NaiveDate>,
    /// Busiest partner first; equal totals ordered by name.
    pub series: Vec<HistogramSeries>,
}

impl Histogram {
    /// Bucket `records` into `bin_width_days`-day bins anchored at the date
    /// of the earliest message. A width of 0 is treated as 1.
    pub fn build(records: &[ReducedRecord], bin_width_days: u32) -> Self {
        let width = bin_width_days.max(1);

        let Some(anchor) = records.iter().map(|r| r.datetime.date_naive()).min() else {
            return Self {
                bin_width_days: width,
                bin_starts: Vec::new(),
                series: Vec::new(),
            };
        };

        let bin_of = |date: NaiveDate| ((date - anchor).num_days() / i64::from(width)) as usize;

        let bin_count = records
            .iter()
            .map(|r| bin_of(r.datetime.date_naive()))
            .max()
            .map_or(0, |last| last + 1);

        let mut by_partner: HashMap<&str, Vec<u64>> = HashMap::new();
        for record in records {
            let counts = by_partner
                .entry(record.conversation_with_name.as_str())
                .or_insert_with(|| vec![0; bin_count]);
            counts[bin_of(record.datetime.date_naive())] += 1;
        }

        let mut series: Vec<HistogramSeries> = by_partner
            .into_iter()
            .map(|(name, counts)| HistogramSeries {
                name: name.to_string(),
                counts,
            })
            .collect();
        series.sort_by(|a, b| b.total().cmp(&a.total()).then_with(|| a.name.cmp(&b.name)));

        let bin_starts = (0..bin_count)
            .filter_map(|i| anchor.checked_add_days(Days::new(i as u64 * u64::from(width))))
            .collect();

        Self {
            bin_width_days: width,
            bin_starts,
            series,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Largest single-bin count across all series.
    pub fn max_count(&self) -> u64 {
        self.series
            .iter()
            .flat_map(|s| s.counts.iter().copied())
            .max()
            .unwrap_or(0)
    }

    /// Sum of all counts; equals the number of input records.
    pub fn total(&self) -> u64 {
        self.series.iter().map(HistogramSeries::total).sum()
    }
}
