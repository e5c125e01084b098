//! Application state and the blocking terminal loop.
//!
//! [`App`] owns the theme and the prepared plot and redraws it until the
//! user quits. [`render`] is the one-call entry point used by the binary.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Frame, Terminal};
use tracing::debug;

use timeline_core::error::{Result, TimelineError};
use timeline_core::models::ReducedRecord;
use timeline_core::settings::PlotMode;

use crate::chart_view;
use crate::density::DensityPlot;
use crate::histogram::Histogram;
use crate::themes::Theme;

// ── PlotData ──────────────────────────────────────────────────────────────────

/// A plot ready to draw, in one of the two presentation modes.
#[derive(Debug, Clone, PartialEq)]
pub enum PlotData {
    Histogram(Histogram),
    Density(DensityPlot),
}

impl PlotData {
    /// Prepare `records` for drawing in `mode`. `bin_width_days` only applies
    /// to count mode.
    pub fn build(records: &[ReducedRecord], mode: PlotMode, bin_width_days: u32) -> Self {
        match mode {
            PlotMode::Count => Self::Histogram(Histogram::build(records, bin_width_days)),
            PlotMode::Density => Self::Density(DensityPlot::build(records)),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Histogram(h) => h.is_empty(),
            Self::Density(d) => d.is_empty(),
        }
    }
}

// ── App ───────────────────────────────────────────────────────────────────────

/// Root state for the plot viewer.
pub struct App {
    /// Active colour theme.
    pub theme: Theme,
    /// The plot being shown.
    pub plot: PlotData,
    /// Set to `true` to break out of the event loop on the next iteration.
    pub should_quit: bool,
}

impl App {
    pub fn new(theme_name: &str, plot: PlotData) -> Self {
        Self {
            theme: Theme::from_name(theme_name),
            plot,
            should_quit: false,
        }
    }

    /// Draw the current plot into `frame`.
    pub fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        match &self.plot {
            PlotData::Histogram(hist) => chart_view::render_histogram(frame, area, hist, &self.theme),
            PlotData::Density(plot) => chart_view::render_density(frame, area, plot, &self.theme),
        }
    }

    /// Update state for one key press.
    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        match code {
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => self.should_quit = true,
            _ => {}
        }
    }

    /// Show the plot full-screen until `q`, `Esc` or `Ctrl+C`.
    ///
    /// The terminal is restored even when drawing fails.
    pub fn run(mut self) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let tick_rate = Duration::from_millis(250);

        let result = loop {
            if let Err(e) = terminal.draw(|frame| self.draw(frame)) {
                break Err(e);
            }

            match event::poll(tick_rate) {
                Ok(true) => match event::read() {
                    Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                        self.handle_key(key.code, key.modifiers);
                    }
                    Ok(_) => {}
                    Err(e) => break Err(e),
                },
                Ok(false) => {}
                Err(e) => break Err(e),
            }

            if self.should_quit {
                break Ok(());
            }
        };

        // Restore terminal state unconditionally.
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

/// Render `records` in the terminal in the chosen mode.
///
/// An empty table shows a placeholder panel rather than failing.
pub fn render(
    records: &[ReducedRecord],
    bin_width_days: u32,
    mode: PlotMode,
    theme_name: &str,
) -> Result<()> {
    let plot = PlotData::build(records, mode, bin_width_days);
    debug!("Rendering {:?} plot, empty: {}", mode, plot.is_empty());
    App::new(theme_name, plot)
        .run()
        .map_err(|e| TimelineError::Terminal(e.to_string()))
}
