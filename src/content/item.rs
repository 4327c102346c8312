//! Content item model

use chrono::NaiveDateTime;
use serde::Serialize;
use std::path::PathBuf;

use super::frontmatter::Metadata;

/// A single piece of content, normalized by the collection loader.
///
/// Items are built once and never mutated; the renderer only reads them.
/// The whole item is exposed to templates as `item`.
#[derive(Debug, Clone, Serialize)]
pub struct ContentItem {
    pub title: String,

    /// URL-safe identifier (`[a-z0-9]` words joined by `-`)
    pub slug: String,

    pub description: Option<String>,

    /// Raw body after the front matter, before rendering
    pub content: String,

    /// Layout template wrapping the rendered content
    pub template: String,

    /// Path of the generated file relative to the output root
    pub output_path: String,

    /// Public URL, derived from `output_path`
    pub url: String,

    /// Name of the owning collection
    pub collection: String,

    pub date: Option<NaiveDateTime>,

    /// `.md` source, rendered through markdown
    pub is_markdown: bool,

    /// `.html` source, rendered as a template
    pub is_template: bool,

    pub flat_output: bool,

    /// Source file the item was loaded from
    pub source: PathBuf,

    /// Front-matter keys without a dedicated field
    pub extra: Metadata,
}

impl ContentItem {
    /// Display name used in log lines and error messages
    pub fn label(&self) -> String {
        format!("{} ({})", self.source.display(), self.collection)
    }

    /// Sort key: dateless items count as dated `now`
    pub fn sort_date(&self, now: NaiveDateTime) -> NaiveDateTime {
        self.date.unwrap_or(now)
    }
}

/// Sort items newest first; dateless items sort as if dated `now`.
///
/// The sort is stable, so items with equal dates keep discovery order.
pub fn sort_by_date_desc(items: &mut [ContentItem], now: NaiveDateTime) {
    items.sort_by(|a, b| b.sort_date(now).cmp(&a.sort_date(now)));
}
