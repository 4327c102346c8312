//! Collection loader - turns a directory of content files into items

use chrono::NaiveDateTime;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::item::{sort_by_date_desc, ContentItem};
use super::permalink::{
    default_permalink, normalize_output_path_to_url, resolve_output_path, slugify,
    split_dated_stem, titleize, PermalinkMeta,
};
use super::FrontMatter;
use crate::config::CollectionSettings;
use crate::error::{Error, Result};
use crate::helpers::parse_date_string;

/// Kind of content file, from its extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SourceKind {
    Markdown,
    Html,
}

impl SourceKind {
    fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("md") => Some(SourceKind::Markdown),
            Some("html") => Some(SourceKind::Html),
            _ => None,
        }
    }
}

/// Loads collections from disk
pub struct CollectionLoader {
    base_dir: PathBuf,
    now: NaiveDateTime,
    strict: bool,
}

impl CollectionLoader {
    /// Create a loader resolving collection paths against `base_dir`.
    ///
    /// `now` stands in for missing dates in permalinks and sorting.
    pub fn new<P: Into<PathBuf>>(base_dir: P, now: NaiveDateTime) -> Self {
        Self {
            base_dir: base_dir.into(),
            now,
            strict: false,
        }
    }

    /// Abort on malformed front matter instead of skipping the file
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Load every content file of a collection, newest first
    pub fn load(&self, name: &str, settings: &CollectionSettings) -> Result<Vec<ContentItem>> {
        let root = self.base_dir.join(&settings.path);
        if !root.is_dir() {
            return Err(Error::FileDiscovery {
                source: io::Error::new(io::ErrorKind::NotFound, "not a directory"),
                path: root,
            });
        }

        let max_depth = if settings.allow_subdirectory {
            usize::MAX
        } else {
            1
        };

        let mut items = Vec::new();

        for entry in WalkDir::new(&root)
            .min_depth(1)
            .max_depth(max_depth)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| Error::FileDiscovery {
                path: e.path().map(Path::to_path_buf).unwrap_or_else(|| root.clone()),
                source: io::Error::from(e),
            })?;

            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            let Some(kind) = SourceKind::from_path(path) else {
                continue;
            };
            if settings.markdown_only() && kind != SourceKind::Markdown {
                continue;
            }

            match self.load_item(name, settings, &root, path, kind) {
                Ok(item) if item.slug.is_empty() => {
                    tracing::warn!("Skipping {:?}: file name gives an empty slug", path);
                }
                Ok(item) => {
                    tracing::debug!("Loaded {:?} -> {}", path, item.output_path);
                    items.push(item);
                }
                Err(Error::FrontMatter { path, message }) if !self.strict => {
                    tracing::warn!("Skipping {:?}: malformed front matter: {}", path, message);
                }
                Err(e) => return Err(e),
            }
        }

        sort_by_date_desc(&mut items, self.now);

        tracing::info!("Loaded {} items from collection {:?}", items.len(), name);
        Ok(items)
    }

    /// Load a single content file
    fn load_item(
        &self,
        name: &str,
        settings: &CollectionSettings,
        root: &Path,
        path: &Path,
        kind: SourceKind,
    ) -> Result<ContentItem> {
        let raw = fs::read_to_string(path).map_err(|source| Error::FileDiscovery {
            path: path.to_path_buf(),
            source,
        })?;
        let (fm, body) = FrontMatter::parse(&raw).map_err(|e| Error::FrontMatter {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let derived = split_dated_stem(&stem);

        let mut date = derived.date;
        if let Some(raw_date) = fm.date.as_deref() {
            match parse_date_string(raw_date) {
                Some(parsed) => date = Some(parsed),
                None => tracing::debug!("Ignoring unparseable date {:?} in {:?}", raw_date, path),
            }
        }

        let slug = fm
            .slug
            .as_deref()
            .map(slugify)
            .filter(|s| !s.is_empty())
            .unwrap_or(derived.slug);

        let title = fm.title.unwrap_or_else(|| titleize(&slug));
        let template = fm.template.unwrap_or_else(|| settings.template.clone());

        let pattern = settings
            .permalink
            .clone()
            .unwrap_or_else(|| default_permalink(&settings.output_dir, &slug));
        let meta = PermalinkMeta {
            title: &title,
            slug: &slug,
            date,
        };

        let relative_dir = path
            .parent()
            .and_then(|parent| parent.strip_prefix(root).ok())
            .unwrap_or_else(|| Path::new(""));
        let output_path =
            resolve_output_path(&pattern, &meta, self.now, relative_dir, fm.flat_output);
        let url = normalize_output_path_to_url(&output_path);

        let is_markdown = kind == SourceKind::Markdown;

        Ok(ContentItem {
            title,
            slug,
            description: fm.description,
            content: body.to_string(),
            template,
            output_path,
            url,
            collection: name.to_string(),
            date,
            is_markdown,
            is_template: !is_markdown,
            flat_output: fm.flat_output,
            source: path.to_path_buf(),
            extra: fm.extra,
        })
    }
}

/// Load a collection whose path is relative to the working directory
pub fn load_collection(
    name: &str,
    settings: &CollectionSettings,
    now: NaiveDateTime,
) -> Result<Vec<ContentItem>> {
    CollectionLoader::new(".", now).load(name, settings)
}
