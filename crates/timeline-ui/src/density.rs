//! Gaussian kernel density estimates of message times, per partner.
//!
//! The x axis is measured in days since the Unix epoch so that curves share
//! one axis and densities read as "fraction of messages per day".

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use timeline_core::models::ReducedRecord;

/// Points sampled along the x axis for every curve.
pub const GRID_POINTS: usize = 200;
/// Lower bound on the kernel bandwidth, in days.
pub const MIN_BANDWIDTH_DAYS: f64 = 1.0;
/// The grid extends this many bandwidths past the first and last message.
const GRID_PADDING_BANDWIDTHS: f64 = 3.0;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Convert a timestamp to fractional days since the Unix epoch.
pub fn to_epoch_days(dt: DateTime<Utc>) -> f64 {
    dt.timestamp() as f64 / SECONDS_PER_DAY
}

/// Calendar date of a fractional epoch-day value.
pub fn epoch_days_to_date(days: f64) -> Option<NaiveDate> {
    DateTime::from_timestamp((days * SECONDS_PER_DAY).floor() as i64, 0).map(|dt| dt.date_naive())
}

/// Bandwidth by Scott's rule, `σ · n^(-1/5)`, floored at
/// [`MIN_BANDWIDTH_DAYS`]. `σ` is the sample standard deviation.
pub fn scott_bandwidth(samples: &[f64]) -> f64 {
    let n = samples.len();
    if n < 2 {
        return MIN_BANDWIDTH_DAYS;
    }
    let mean = samples.iter().sum::<f64>() / n as f64;
    let variance = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    let h = variance.sqrt() * (n as f64).powf(-0.2);
    if h.is_finite() {
        h.max(MIN_BANDWIDTH_DAYS)
    } else {
        MIN_BANDWIDTH_DAYS
    }
}

/// Evaluate the Gaussian KDE of `samples` with bandwidth `h` at `x`.
pub fn gaussian_kde(samples: &[f64], h: f64, x: f64) -> f64 {
    if samples.is_empty() || h <= 0.0 {
        return 0.0;
    }
    let norm = 1.0 / (samples.len() as f64 * h * (2.0 * std::f64::consts::PI).sqrt());
    samples
        .iter()
        .map(|s| {
            let u = (x - s) / h;
            (-0.5 * u * u).exp()
        })
        .sum::<f64>()
        * norm
}

/// One density curve, sampled on the shared grid.
#[derive(Debug, Clone, PartialEq)]
pub struct DensityCurve {
    pub name: String,
    pub bandwidth: f64,
    /// `(epoch_days, density)` pairs.
    pub points: Vec<(f64, f64)>,
}

/// Density curves for every partner on a shared x grid.
#[derive(Debug, Clone, PartialEq)]
pub struct DensityPlot {
    pub x_bounds: [f64; 2],
    pub y_max: f64,
    /// Partner with most messages first; equal counts ordered by name.
    pub curves: Vec<DensityCurve>,
}

impl DensityPlot {
    /// Estimate one density curve per partner in `records`.
    pub fn build(records: &[ReducedRecord]) -> Self {
        Self::build_with_resolution(records, GRID_POINTS)
    }

    /// As [`DensityPlot::build`] with an explicit number of grid points
    /// (at least 2).
    pub fn build_with_resolution(records: &[ReducedRecord], grid_points: usize) -> Self {
        let mut samples: HashMap<&str, Vec<f64>> = HashMap::new();
        for record in records {
            samples
                .entry(record.conversation_with_name.as_str())
                .or_default()
                .push(to_epoch_days(record.datetime));
        }

        if samples.is_empty() {
            return Self {
                x_bounds: [0.0, 1.0],
                y_max: 0.0,
                curves: Vec::new(),
            };
        }

        let mut groups: Vec<(&str, Vec<f64>, f64)> = samples
            .into_iter()
            .map(|(name, xs)| {
                let h = scott_bandwidth(&xs);
                (name, xs, h)
            })
            .collect();
        groups.sort_by(|a, b| b.1.len().cmp(&a.1.len()).then_with(|| a.0.cmp(b.0)));

        let all = groups.iter().flat_map(|(_, xs, _)| xs.iter().copied());
        let (lo, hi) = all.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), x| {
            (lo.min(x), hi.max(x))
        });
        let max_h = groups.iter().map(|(_, _, h)| *h).fold(MIN_BANDWIDTH_DAYS, f64::max);
        let x_min = lo - GRID_PADDING_BANDWIDTHS * max_h;
        let x_max = hi + GRID_PADDING_BANDWIDTHS * max_h;

        let steps = grid_points.max(2);
        let step = (x_max - x_min) / (steps - 1) as f64;
        let grid: Vec<f64> = (0..steps).map(|i| x_min + step * i as f64).collect();

        let curves: Vec<DensityCurve> = groups
            .into_iter()
            .map(|(name, xs, h)| DensityCurve {
                name: name.to_string(),
                bandwidth: h,
                points: grid.iter().map(|&x| (x, gaussian_kde(&xs, h, x))).collect(),
            })
            .collect();

        let y_max = curves
            .iter()
            .flat_map(|c| c.points.iter().map(|&(_, y)| y))
            .fold(0.0, f64::max);

        Self {
            x_bounds: [x_min, x_max],
            y_max,
            curves,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }
}
