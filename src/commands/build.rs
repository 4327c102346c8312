//! Generate static files

use chrono::{Local, NaiveDateTime};
use std::time::Instant;

use crate::error::Result;
use crate::generator::{clear_output_dir, copy_public_assets, SiteRenderer};
use crate::Site;

/// Counts from a completed build
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildSummary {
    pub items: usize,
    pub pages: usize,
    pub indexes: usize,
    pub assets: usize,
}

/// Build the site with the wall clock as "now"
pub fn run(site: &Site) -> Result<BuildSummary> {
    run_at(site, Local::now().naive_local())
}

/// Build the site: clear the output, load collections, render, copy assets.
///
/// `now` dates undated items and is what templates see from `now()`.
pub fn run_at(site: &Site, now: NaiveDateTime) -> Result<BuildSummary> {
    let start = Instant::now();

    site.check_output_dir()?;
    clear_output_dir(&site.output_dir)?;

    let items = site.load_items(now)?;
    tracing::info!(
        "Loaded {} items from {} collections",
        items.len(),
        site.config.collections.len()
    );

    let mut renderer = SiteRenderer::new(&site.config, &site.template_dir, &site.output_dir, now)?;
    let rendered = renderer.render(&items)?;

    let assets = copy_public_assets(&site.public_dir, &site.output_dir)?;
    tracing::info!("Copied {} public assets", assets);

    let duration = start.elapsed();
    tracing::info!("Generated in {:.2}s", duration.as_secs_f64());

    Ok(BuildSummary {
        items: items.len(),
        pages: rendered.pages,
        indexes: rendered.indexes,
        assets,
    })
}
