//! docsetgen CLI — offline documentation bundle builder.
//!
//! Renders a release's AsciiDoc pages, indexes their headings for Dash, and
//! publishes the archive and catalog entry for that version.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        // Help and version go to stdout and exit 0.
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => {
            let _ = e.print();
            std::process::exit(1);
        }
    };
    commands::init_tracing(&cli);
    commands::run(cli).await
}
