//! EcoMitra headless walkthrough.
//!
//! Scrolls the pitch-site pages through the motion engine without a browser
//! and prints what happened as JSON. Settings come from `mitra.toml` and
//! `MITRA_*` environment variables; `RUST_LOG` controls log output.

use anyhow::{Context, Result};
use mitra_config::MitraConfig;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod pages;
mod walkthrough;

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config = MitraConfig::load();
    let pages = pages::select(config.walkthrough.page.as_deref())?;
    info!(pages = pages.len(), viewport_width = config.walkthrough.viewport_width, "starting walkthrough");

    let mut reports = Vec::with_capacity(pages.len());
    for page in pages {
        let report = walkthrough::run(page, &config)
            .with_context(|| format!("walkthrough of the {page} page failed"))?;
        reports.push(report);
    }

    let json = serde_json::to_string_pretty(&reports).context("failed to serialize reports")?;
    println!("{json}");
    Ok(())
}
