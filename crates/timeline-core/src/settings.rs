use clap::builder::TypedValueParser;
use clap::Parser;
use std::path::PathBuf;

/// Default number of conversation partners to keep.
pub const DEFAULT_TOP_N: usize = 10;
/// Default histogram bin width in days.
pub const DEFAULT_BIN_WIDTH: u32 = 25;
/// Default raw message directory, relative to the working directory.
pub const DEFAULT_RAW_DIR: &str = "raw";

// ── PlotMode ──────────────────────────────────────────────────────────────────

/// How message frequency is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlotMode {
    /// Bucketed message counts per conversation partner.
    Count,
    /// Smoothed density estimate per conversation partner.
    Density,
}

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Plot chat message frequency over time, per conversation partner
#[derive(Parser, Debug, Clone)]
#[command(
    name = "chat-timeline",
    about = "Plot chat message frequency over time, per conversation partner",
    version
)]
pub struct Settings {
    /// Chat log data files (JSON Lines or JSON arrays of rows)
    #[arg(short = 'd', long = "data", num_args = 1.., value_name = "PATH")]
    pub data_paths: Vec<PathBuf>,

    /// Plot the message densities (KDE) instead of their count
    #[arg(long = "plot-density")]
    pub density: bool,

    /// Number of different senders to consider, ordered by number of messages sent
    #[arg(
        short = 'n',
        long = "number-senders",
        default_value_t = DEFAULT_TOP_N,
        value_parser = clap::value_parser!(u64).range(1..).map(|n| n as usize)
    )]
    pub top_n: usize,

    /// Bin width for histograms, in days
    #[arg(
        short = 'b',
        long = "bin-width",
        default_value_t = DEFAULT_BIN_WIDTH,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub bin_width: u32,

    /// Only keep messages sent in a conversation with this sender
    #[arg(long)]
    pub filter_conversation: Option<String>,

    /// Only keep messages sent by this sender
    #[arg(long)]
    pub filter_sender: Option<String>,

    /// Remove messages sent by this sender
    #[arg(long)]
    pub remove_sender: Option<String>,

    /// Directory holding the raw message files
    #[arg(long, env = "CHAT_TIMELINE_RAW_DIR", default_value = DEFAULT_RAW_DIR)]
    pub raw_dir: PathBuf,

    /// Display theme
    #[arg(long, default_value = "auto", value_parser = ["light", "dark", "auto"])]
    pub theme: String,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    pub log_level: String,

    /// Print the conversation ranking instead of opening the plot
    #[arg(long)]
    pub no_plot: bool,
}

impl Settings {
    /// Presentation mode selected by `--plot-density`.
    pub fn plot_mode(&self) -> PlotMode {
        if self.density {
            PlotMode::Density
        } else {
            PlotMode::Count
        }
    }
}

/// Map a Python-style level name onto a `tracing` filter directive.
///
/// Unknown names are passed through lowercased so that raw directives such as
/// `timeline_data=debug` keep working.
pub fn tracing_directive(log_level: &str) -> String {
    match log_level.to_uppercase().as_str() {
        "DEBUG" => "debug".to_string(),
        "INFO" => "info".to_string(),
        "WARNING" | "WARN" => "warn".to_string(),
        "ERROR" | "CRITICAL" => "error".to_string(),
        _ => log_level.to_lowercase(),
    }
}
