mod bootstrap;
mod summary;

use anyhow::Result;
use clap::Parser;
use timeline_core::settings::Settings;
use timeline_data::aggregator::MessageFilter;
use timeline_data::analysis::load_data;
use timeline_data::reader::resolve_input_paths;

fn main() -> Result<()> {
    let settings = Settings::parse();

    bootstrap::setup_logging(&settings.log_level)?;

    tracing::info!("chat-timeline v{} starting", env!("CARGO_PKG_VERSION"));

    run(&settings, &mut std::io::stdout())
}

/// Load → filter → rank/restrict → render, driven by `settings`.
///
/// With `--no-plot` the ranking summary is written to `out` instead of
/// opening the terminal plot.
fn run(settings: &Settings, out: &mut impl std::io::Write) -> Result<()> {
    let paths = resolve_input_paths(&settings.data_paths, &settings.raw_dir)?;

    let filter = MessageFilter::new(
        settings.filter_conversation.clone(),
        settings.filter_sender.clone(),
        settings.remove_sender.clone(),
    );

    let analysis = load_data(&paths, &filter, settings.top_n)?;

    if settings.no_plot {
        summary::write_summary(out, &analysis)?;
        return Ok(());
    }

    timeline_ui::app::render(
        &analysis.records,
        settings.bin_width,
        settings.plot_mode(),
        &settings.theme,
    )?;

    Ok(())
}
