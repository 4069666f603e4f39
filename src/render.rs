//! Payload rendering: fills a Jinja-style template with the metadata tree.
//!
//! The output files are ephemeral working artifacts. They are rewritten on
//! every run and only exist so the API stages can read them back; nothing
//! here is persisted state.

use anyhow::{Context as _, Result};
use std::fs;
use std::path::Path;
use tera::{Context, Tera};
use tracing::{error, info};

use crate::load_config::Metadata;

/// Renders `template` against the metadata and writes the result to
/// `outfile`, creating it if absent and truncating if present. Returns the
/// number of bytes written.
///
/// Read, template and serialization failures all surface as `Err`; the
/// caller decides whether that stops the run (it does not, it only warns).
pub fn render_payload(template: &Path, metadata: &Metadata, outfile: &Path) -> Result<usize> {
    let source = match fs::read_to_string(template) {
        Ok(source) => source,
        Err(e) => {
            error!(error = ?e, template = ?template, "Failed to read template");
            return Err(e).context(format!("failed to read template {}", template.display()));
        }
    };

    let mut tera = Tera::default();
    tera.add_raw_template("payload", &source)
        .with_context(|| format!("template {} did not parse", template.display()))?;

    let context = Context::from_serialize(metadata)
        .context("metadata did not serialize into a template context")?;
    let rendered = tera
        .render("payload", &context)
        .with_context(|| format!("template {} did not render", template.display()))?;

    fs::write(outfile, &rendered)
        .with_context(|| format!("failed to write payload {}", outfile.display()))?;
    info!(outfile = ?outfile, bytes = rendered.len(), "Payload written");
    Ok(rendered.len())
}
