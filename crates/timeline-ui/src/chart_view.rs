//! Histogram and density chart views.
//!
//! Count mode draws one bar group per date bin with a bar per conversation
//! partner. Density mode draws one braille line per partner on a shared
//! date axis. Both views put a colour legend under the chart.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Dataset, GraphType, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthChar;

use timeline_core::formatting::{format_count, format_date_label};

use crate::density::{epoch_days_to_date, DensityPlot};
use crate::histogram::Histogram;
use crate::themes::Theme;

pub const HISTOGRAM_TITLE: &str = "Message Breakdown";
pub const HISTOGRAM_Y_LABEL: &str = "Number of Messages";
pub const DENSITY_TITLE: &str = "Conversation Densities";
pub const DENSITY_Y_LABEL: &str = "Density";
pub const X_LABEL: &str = "Date";

/// Legend entries longer than this many columns are cut with `…`.
const MAX_LEGEND_NAME_WIDTH: usize = 24;
/// Date labels drawn along the density x axis.
const DENSITY_X_LABELS: usize = 5;
/// Columns taken by a `"Mar 2017"` label plus a space.
const DATE_LABEL_WIDTH: usize = 9;
/// Rows reserved for the legend below the chart.
const LEGEND_HEIGHT: u16 = 3;

// ── Histogram ─────────────────────────────────────────────────────────────────

/// Render `hist` as grouped bars, one group per bin.
///
/// Bins that do not fit in `area` are clipped on the right.
pub fn render_histogram(frame: &mut Frame, area: Rect, hist: &Histogram, theme: &Theme) {
    if hist.is_empty() {
        render_no_data(frame, area, theme);
        return;
    }

    let [chart_area, legend_area] = split_legend(area);

    let label_every = label_stride(hist.bin_starts.len(), hist.series.len());

    let mut chart = BarChart::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.border)
                .title(Line::styled(HISTOGRAM_TITLE, theme.title))
                .title_bottom(Line::styled(X_LABEL, theme.axis).alignment(Alignment::Center)),
        )
        .bar_width(1)
        .bar_gap(0)
        .group_gap(1)
        .max(hist.max_count().max(1));

    for (bin, start) in hist.bin_starts.iter().enumerate() {
        let bars: Vec<Bar> = hist
            .series
            .iter()
            .enumerate()
            .map(|(idx, series)| {
                Bar::default()
                    .value(series.counts[bin])
                    .style(theme.series_style(idx))
                    .text_value(String::new())
            })
            .collect();

        let label = if bin % label_every == 0 {
            format_date_label(*start)
        } else {
            String::new()
        };

        chart = chart.data(
            BarGroup::default()
                .label(Line::styled(label, theme.axis))
                .bars(&bars),
        );
    }

    frame.render_widget(chart, chart_area);

    let caption = format!(
        "{} (max {} per {}-day bin)",
        HISTOGRAM_Y_LABEL,
        format_count(hist.max_count() as usize),
        hist.bin_width_days
    );
    let names: Vec<&str> = hist.series.iter().map(|s| s.name.as_str()).collect();
    render_legend(frame, legend_area, &caption, &names, theme);
}

/// Show a date label on every `n`-th bin so labels do not overlap.
fn label_stride(bins: usize, series_count: usize) -> usize {
    if bins == 0 {
        return 1;
    }
    // Each group takes one column per bar plus the gap.
    let group_width = series_count.max(1) + 1;
    DATE_LABEL_WIDTH.div_ceil(group_width).clamp(1, bins)
}

// ── Density ───────────────────────────────────────────────────────────────────

/// Render `plot` as one line per partner.
pub fn render_density(frame: &mut Frame, area: Rect, plot: &DensityPlot, theme: &Theme) {
    if plot.is_empty() {
        render_no_data(frame, area, theme);
        return;
    }

    let [chart_area, legend_area] = split_legend(area);

    let datasets: Vec<Dataset> = plot
        .curves
        .iter()
        .enumerate()
        .map(|(idx, curve)| {
            Dataset::default()
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(theme.series_style(idx))
                .data(&curve.points)
        })
        .collect();

    let [x_min, x_max] = plot.x_bounds;
    let x_labels: Vec<Line> = (0..DENSITY_X_LABELS)
        .map(|i| {
            let x = x_min + (x_max - x_min) * i as f64 / (DENSITY_X_LABELS - 1) as f64;
            let text = epoch_days_to_date(x).map(format_date_label).unwrap_or_default();
            Line::styled(text, theme.axis)
        })
        .collect();

    let y_top = if plot.y_max > 0.0 { plot.y_max * 1.1 } else { 1.0 };
    let y_labels = vec![
        Line::styled("0", theme.axis),
        Line::styled(format!("{:.4}", y_top / 2.0), theme.axis),
        Line::styled(format!("{:.4}", y_top), theme.axis),
    ];

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.border)
                .title(Line::styled(DENSITY_TITLE, theme.title)),
        )
        .x_axis(
            Axis::default()
                .title(Line::styled(X_LABEL, theme.axis))
                .style(theme.axis)
                .bounds([x_min, x_max])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .title(Line::styled(DENSITY_Y_LABEL, theme.axis))
                .style(theme.axis)
                .bounds([0.0, y_top])
                .labels(y_labels),
        );

    frame.render_widget(chart, chart_area);

    let names: Vec<&str> = plot.curves.iter().map(|c| c.name.as_str()).collect();
    render_legend(frame, legend_area, "Per-partner density (1/day)", &names, theme);
}

// ── Shared pieces ─────────────────────────────────────────────────────────────

/// Placeholder shown when there is nothing to plot.
pub fn render_no_data(frame: &mut Frame, area: Rect, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("No messages to plot", theme.empty)),
        Line::from(""),
        Line::from(Span::styled(
            "Nothing left after loading and filtering. Press q to quit.",
            theme.dim,
        )),
    ];
    let paragraph = Paragraph::new(text)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.border)
                .title(Line::styled("chat-timeline", theme.title)),
        );
    frame.render_widget(paragraph, area);
}

fn split_legend(area: Rect) -> [Rect; 2] {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(LEGEND_HEIGHT)])
        .split(area);
    [chunks[0], chunks[1]]
}

fn render_legend(frame: &mut Frame, area: Rect, caption: &str, names: &[&str], theme: &Theme) {
    let mut spans = vec![Span::styled(format!("{caption}  "), theme.dim)];
    for (idx, name) in names.iter().enumerate() {
        spans.push(Span::styled("■ ", theme.series_style(idx)));
        spans.push(Span::styled(
            format!("{}  ", truncate_to_width(name, MAX_LEGEND_NAME_WIDTH)),
            theme.text,
        ));
    }
    let legend = Paragraph::new(Line::from(spans))
        .wrap(Wrap { trim: true })
        .alignment(Alignment::Left);
    frame.render_widget(legend, area);
}

/// Cut `s` to at most `max` display columns, ending in `…` when shortened.
pub fn truncate_to_width(s: &str, max: usize) -> String {
    let total: usize = s.chars().map(|c| c.width().unwrap_or(0)).sum();
    if total <= max {
        return s.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > max {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}
