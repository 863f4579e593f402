//! CLI definition, tracing setup, and the build command.

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use docsetgen_core::package::TarPackager;
use docsetgen_core::{BuildReport, ProgressReporter, build_docset};
use docsetgen_html::Asciidoctor;
use docsetgen_shared::{BuildContext, load_config};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// docsetgen — build an offline, indexed documentation bundle for Dash.
#[derive(Parser)]
#[command(
    name = "docsetgen",
    version,
    about = "Convert a RuboCop release's AsciiDoc pages into a Dash docset.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Release to build, e.g. v1.2.3 (a leading `v` is ignored).
    pub release: String,

    /// Configuration file (defaults to ./docsetgen.toml when present).
    #[arg(short, long, env = "DOCSETGEN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Remove an existing bundle before building.
    #[arg(long)]
    pub clean: bool,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text")]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

// ---------------------------------------------------------------------------
// Tracing
// ---------------------------------------------------------------------------

pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "docsetgen=info",
        1 => "docsetgen=debug",
        _ => "docsetgen=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Build
// ---------------------------------------------------------------------------

/// Build the docset for the release named on the command line.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref()).wrap_err("failed to load configuration")?;
    let ctx = BuildContext::new(&config, &cli.release, cli.clean)?;
    info!(version = %ctx.version, "building docset");

    let renderer = Asciidoctor::from_config(&config.renderer);
    let progress = CliProgress::new();
    let report = build_docset(&ctx, &renderer, &TarPackager, &progress)
        .await
        .wrap_err_with(|| format!("failed to build docset {}", ctx.version))?;

    println!(
        "Built {} ({} pages, {} entries, {} new) in {:.1}s",
        report.bundle_dir.display(),
        report.page_count,
        report.total_entries,
        report.entries_added,
        report.elapsed.as_secs_f64(),
    );
    match &report.archive {
        Some(archive) => println!(
            "Archive: {}{}",
            archive.display(),
            if report.catalog_updated {
                " (catalog updated)"
            } else {
                ""
            }
        ),
        None => println!(
            "Distribution root {} not found; archive and catalog skipped",
            ctx.dash_root.display()
        ),
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn page_converted(&self, path: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Converting [{current}/{total}] {path}"));
    }

    fn done(&self, _report: &BuildReport) {
        self.spinner.finish_and_clear();
    }
}

impl Drop for CliProgress {
    fn drop(&mut self) {
        if !self.spinner.is_finished() {
            self.spinner.finish_and_clear();
        }
    }
}
