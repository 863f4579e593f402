//! Page renderers: turn one source page into a standalone HTML document.
//!
//! The AsciiDoc conversion itself is delegated to an external program behind
//! the [`Renderer`] trait, so the rest of the pipeline only ever sees HTML.

use std::io::Write;
use std::process::{Command, Stdio};

use tracing::{debug, instrument};

use docsetgen_shared::{DocsetError, RendererConfig, Result};

/// Converts page source text to a full HTML document.
pub trait Renderer {
    /// Human-readable name for logs.
    fn name(&self) -> &str;

    /// Render `source` to HTML.
    fn render(&self, source: &str) -> Result<String>;
}

// ---------------------------------------------------------------------------
// Asciidoctor
// ---------------------------------------------------------------------------

/// Runs an `asciidoctor`-compatible command: page on stdin, HTML on stdout.
#[derive(Debug, Clone)]
pub struct Asciidoctor {
    command: String,
    args: Vec<String>,
}

impl Asciidoctor {
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
        }
    }

    pub fn from_config(config: &RendererConfig) -> Self {
        Self::new(config.command.clone(), config.args.clone())
    }
}

impl Renderer for Asciidoctor {
    fn name(&self) -> &str {
        &self.command
    }

    #[instrument(skip(self, source), fields(command = %self.command, len = source.len()))]
    fn render(&self, source: &str) -> Result<String> {
        let mut child = Command::new(&self.command)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                DocsetError::Render(format!(
                    "failed to spawn `{}`: {e}. Is it installed?",
                    self.command
                ))
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| DocsetError::Render("failed to capture renderer stdin".into()))?;

        // Feed stdin from a second thread while stdout is drained here; either
        // pipe may fill up before the other is done.
        let (output, written) = std::thread::scope(|scope| {
            let writer = scope.spawn(move || stdin.write_all(source.as_bytes()));
            let output = child.wait_with_output();
            (output, writer.join())
        });

        let output = output
            .map_err(|e| DocsetError::Render(format!("failed to wait for `{}`: {e}", self.command)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DocsetError::Render(format!(
                "`{}` exited with {}: {}",
                self.command,
                output.status,
                stderr.trim()
            )));
        }
        written
            .map_err(|_| DocsetError::Render("renderer stdin writer panicked".into()))?
            .map_err(|e| DocsetError::Render(format!("failed to write page source: {e}")))?;

        let html = String::from_utf8(output.stdout)
            .map_err(|e| DocsetError::Render(format!("renderer produced invalid UTF-8: {e}")))?;
        debug!(html_len = html.len(), "page rendered");
        Ok(html)
    }
}

// ---------------------------------------------------------------------------
// Passthrough
// ---------------------------------------------------------------------------

/// Treats the source as already-rendered HTML.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlPassthrough;

impl Renderer for HtmlPassthrough {
    fn name(&self) -> &str {
        "passthrough"
    }

    fn render(&self, source: &str) -> Result<String> {
        Ok(source.to_string())
    }
}
