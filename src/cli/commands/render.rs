use anyhow::{bail, Context, Result};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::{debug, error, info, trace};

use crate::config::{build_debug_handler, AppConfig};
use crate::debug::DebugOutcome;

/// Renders the debug page of `namespace/name` into `output`.
pub async fn render(config: &AppConfig, namespace: &str, name: &str, output: &Path) -> Result<()> {
    trace!("Entering render function");
    config.check().context("Invalid configuration")?;

    let handler = build_debug_handler(config);
    let page = match handler.display(namespace, name).await {
        Ok(DebugOutcome::Rendered(page)) => page,
        Ok(DebugOutcome::BadRequest(reason)) => {
            bail!("Cannot render {}/{}: {}", namespace, name, reason);
        }
        Err(e) => {
            error!("Debug page for {}/{} failed: {}", namespace, name, e);
            return Err(e.into());
        }
    };

    debug!("Writing page to {}", output.display());
    let file = File::create(output)
        .with_context(|| format!("Failed to create {}", output.display()))?;
    let mut writer = BufWriter::new(file);
    page.render(&mut writer)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    info!(
        "Rendered {} charts for {}/{} into {}",
        page.charts().len(),
        namespace,
        name,
        output.display()
    );
    Ok(())
}
