//! Generator module - renders content items and collection indexes to disk

mod assets;

use chrono::{Local, NaiveDateTime};
use indexmap::IndexMap;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use tera::Context;

pub use assets::{clear_output_dir, copy_public_assets};

use crate::config::SiteConfig;
use crate::content::permalink::{normalize_output_path_to_url, titleize};
use crate::content::{ContentItem, MarkdownRenderer};
use crate::error::{Error, Result};
use crate::templates::{base_context, TemplateRenderer};

/// Items grouped by collection, in first-seen order
pub type Collections<'a> = IndexMap<&'a str, Vec<&'a ContentItem>>;

/// What a render pass wrote
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderSummary {
    pub pages: usize,
    pub indexes: usize,
}

/// Renders items through their layouts into the output directory
pub struct SiteRenderer<'a> {
    config: &'a SiteConfig,
    templates: TemplateRenderer,
    markdown: MarkdownRenderer,
    output_dir: PathBuf,
}

impl<'a> SiteRenderer<'a> {
    /// Create a renderer over the templates in `template_dir`
    pub fn new<P: Into<PathBuf>>(
        config: &'a SiteConfig,
        template_dir: &Path,
        output_dir: P,
        now: NaiveDateTime,
    ) -> Result<Self> {
        Ok(Self {
            config,
            templates: TemplateRenderer::load(template_dir, now)?,
            markdown: MarkdownRenderer::from_config(&config.highlight),
            output_dir: output_dir.into(),
        })
    }

    /// Render every item, then every collection index
    pub fn render(&mut self, items: &[ContentItem]) -> Result<RenderSummary> {
        let collections = group_by_collection(items);
        self.check_collisions(items)?;

        let shared = shared_context(self.config, items, &collections).map_err(|source| {
            Error::TemplateContext {
                item: "site configuration and items".to_string(),
                source,
            }
        })?;

        let mut summary = RenderSummary::default();

        for item in items {
            self.render_item(item, &shared)?;
            summary.pages += 1;
        }

        for (name, settings) in &self.config.collections {
            let Some(template) = settings.index_template() else {
                continue;
            };
            let members = collections.get(name.as_str()).map(Vec::as_slice).unwrap_or(&[]);
            self.render_index(name, template, members)?;
            summary.indexes += 1;
        }

        tracing::info!(
            "Rendered {} pages and {} collection indexes",
            summary.pages,
            summary.indexes
        );
        Ok(summary)
    }

    /// Render one item through its layout and write it
    fn render_item(&mut self, item: &ContentItem, shared: &Context) -> Result<()> {
        let content = if item.is_template {
            // The body sees itself, unrendered, as `content`
            let context = item_context(shared, item, &item.content)?;
            self.templates
                .render_str(&item.content, &context)
                .map_err(|source| Error::TemplateRender {
                    template: item.source.display().to_string(),
                    item: item.label(),
                    source,
                })?
        } else if item.is_markdown {
            self.markdown.render(&item.content)
        } else {
            item.content.clone()
        };

        if !self.templates.has_template(&item.template) {
            return Err(Error::TemplateNotFound {
                template: item.template.clone(),
                item: item.label(),
            });
        }

        let context = item_context(shared, item, &content)?;
        let html = self
            .templates
            .render(&item.template, &context)
            .map_err(|source| Error::TemplateRender {
                template: item.template.clone(),
                item: item.label(),
                source,
            })?;

        let path = write_output(&self.output_dir, &item.output_path, &html)?;
        tracing::debug!("Generated: {:?}", path);
        Ok(())
    }

    /// Render the index page of a collection
    fn render_index(&self, name: &str, template: &str, items: &[&ContentItem]) -> Result<()> {
        let label = format!("index of collection {:?}", name);
        if !self.templates.has_template(template) {
            return Err(Error::TemplateNotFound {
                template: template.to_string(),
                item: label,
            });
        }

        let settings = self.config.collection(name);
        let title = settings
            .and_then(|s| s.index_title.clone())
            .unwrap_or_else(|| titleize(name));
        let description = settings
            .and_then(|s| s.index_description.clone())
            .unwrap_or_default();

        let output_path = index_output_path(name);
        let url = normalize_output_path_to_url(&output_path);

        let context = index_context(self.config, name, &title, &description, &url, items)
            .map_err(|source| Error::TemplateContext {
                item: label.clone(),
                source,
            })?;

        let html = self
            .templates
            .render(template, &context)
            .map_err(|source| Error::TemplateRender {
                template: template.to_string(),
                item: label,
                source,
            })?;

        let path = write_output(&self.output_dir, &output_path, &html)?;
        tracing::debug!("Generated index: {:?}", path);
        Ok(())
    }

    /// Fail when two sources would write the same file
    fn check_collisions(&self, items: &[ContentItem]) -> Result<()> {
        let mut seen: HashMap<String, String> = HashMap::new();

        for item in items {
            if let Some(first) = seen.insert(item.output_path.clone(), item.label()) {
                return Err(Error::OutputCollision {
                    output_path: item.output_path.clone(),
                    first,
                    second: item.label(),
                });
            }
        }

        for (name, settings) in &self.config.collections {
            if settings.index_template().is_none() {
                continue;
            }
            let output_path = index_output_path(name);
            if let Some(first) = seen.get(&output_path) {
                return Err(Error::OutputCollision {
                    first: first.clone(),
                    second: format!("index of collection {:?}", name),
                    output_path,
                });
            }
        }

        Ok(())
    }
}

/// Render all items and collection indexes with the wall clock as `now()`
pub fn render_site(
    config: &SiteConfig,
    items: &[ContentItem],
    template_dir: &Path,
    output_dir: &Path,
) -> Result<RenderSummary> {
    let now = Local::now().naive_local();
    SiteRenderer::new(config, template_dir, output_dir, now)?.render(items)
}

/// Group items by collection, keeping the order collections first appear in
pub fn group_by_collection(items: &[ContentItem]) -> Collections<'_> {
    let mut collections: Collections<'_> = IndexMap::new();
    for item in items {
        collections
            .entry(item.collection.as_str())
            .or_default()
            .push(item);
    }
    collections
}

/// Output path of a collection's index page
pub fn index_output_path(collection: &str) -> String {
    format!("{}/index.html", collection)
}

fn shared_context(
    config: &SiteConfig,
    items: &[ContentItem],
    collections: &Collections<'_>,
) -> tera::Result<Context> {
    let mut context = base_context(config)?;
    context.try_insert("items", items)?;
    context.try_insert("collections", collections)?;
    Ok(context)
}

fn item_context(shared: &Context, item: &ContentItem, content: &str) -> Result<Context> {
    let mut context = shared.clone();
    context.insert("title", &item.title);
    context.insert("content", content);
    context
        .try_insert("item", item)
        .map_err(|source| Error::TemplateContext {
            item: item.label(),
            source,
        })?;
    Ok(context)
}

fn index_context(
    config: &SiteConfig,
    name: &str,
    title: &str,
    description: &str,
    url: &str,
    items: &[&ContentItem],
) -> tera::Result<Context> {
    let mut context = base_context(config)?;
    context.insert("title", title);
    context.insert("description", description);
    context.insert("item", &serde_json::json!({ "url": url }));
    context.try_insert("items", items)?;
    context.insert("collection", name);
    Ok(context)
}

/// Write `html` to `output_dir/relative`, creating parent directories
fn write_output(output_dir: &Path, relative: &str, html: &str) -> Result<PathBuf> {
    let relative = Path::new(relative);
    let escapes = relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes || relative.as_os_str().is_empty() {
        return Err(Error::OutputWrite {
            path: relative.to_path_buf(),
            source: io::Error::new(
                io::ErrorKind::InvalidInput,
                "output path must stay inside the output directory",
            ),
        });
    }

    let path = output_dir.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| Error::OutputWrite {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(&path, html).map_err(|source| Error::OutputWrite {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}
