//! pressroom: a static site generator for collections of content
//!
//! Content lives in collections (directories of `.md` and `.html` files with
//! front matter). The collection loader turns each file into a
//! [`content::ContentItem`] with a slug, date, output path and URL; the
//! generator renders the items through Tera layouts and writes one index
//! page per collection that asks for it.

pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod generator;
pub mod helpers;
pub mod templates;

use chrono::NaiveDateTime;
use std::fs;
use std::path::{Component, Path, PathBuf};

pub use error::{Error, Result};

/// Config file names looked up in the base directory, in order
pub const CONFIG_FILES: &[&str] = &["config.yaml", "config.yml", "config.toml"];

/// A site: its configuration and resolved directories
#[derive(Debug, Clone)]
pub struct Site {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory; relative paths in the config resolve against it
    pub base_dir: PathBuf,
    /// Template directory
    pub template_dir: PathBuf,
    /// Output directory
    pub output_dir: PathBuf,
    /// Public assets copied verbatim into the output
    pub public_dir: PathBuf,
}

impl Site {
    /// Open a site from a directory, reading its config file if there is one
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();

        let config_path = CONFIG_FILES
            .iter()
            .map(|name| base_dir.join(name))
            .find(|path| path.exists());

        let config = match config_path {
            Some(path) => config::SiteConfig::load(&path)?,
            None => {
                tracing::warn!("No config file in {:?}, using defaults", base_dir);
                config::SiteConfig::default()
            }
        };

        Ok(Self::with_config(base_dir, config))
    }

    /// Build a site from an already loaded configuration
    pub fn with_config<P: Into<PathBuf>>(base_dir: P, config: config::SiteConfig) -> Self {
        let base_dir = base_dir.into();
        let template_dir = base_dir.join(&config.template_dir);
        let output_dir = base_dir.join(&config.output_dir);
        let public_dir = base_dir.join(&config.public_dir);

        Self {
            config,
            base_dir,
            template_dir,
            output_dir,
            public_dir,
        }
    }

    /// Load every configured collection, in config order
    pub fn load_items(&self, now: NaiveDateTime) -> Result<Vec<content::ContentItem>> {
        let loader = content::CollectionLoader::new(&self.base_dir, now)
            .strict(self.config.strict_front_matter);

        let mut items = Vec::new();
        for (name, settings) in &self.config.collections {
            items.extend(loader.load(name, settings)?);
        }
        Ok(items)
    }

    /// Refuse an output directory whose removal would take site sources with it.
    ///
    /// The output directory may not be, or contain, the base directory, the
    /// public or template directory, or any collection directory.
    pub fn check_output_dir(&self) -> Result<()> {
        let mut protected = vec![
            ("site directory".to_string(), self.base_dir.clone()),
            ("public directory".to_string(), self.public_dir.clone()),
            ("template directory".to_string(), self.template_dir.clone()),
        ];
        for (name, settings) in &self.config.collections {
            protected.push((
                format!("collection {:?}", name),
                self.base_dir.join(&settings.path),
            ));
        }

        let output = normalize_path(&self.output_dir);
        let output_real = fs::canonicalize(&self.output_dir).ok();

        for (label, dir) in protected {
            let inside = normalize_path(&dir).starts_with(&output)
                || match (&output_real, fs::canonicalize(&dir)) {
                    (Some(output_real), Ok(dir_real)) => dir_real.starts_with(output_real),
                    _ => false,
                };
            if inside {
                return Err(Error::Config {
                    path: self.output_dir.clone(),
                    message: format!(
                        "output directory would remove the {} {:?}",
                        label, dir
                    ),
                });
            }
        }
        Ok(())
    }

    /// Generate the static site
    pub fn build(&self) -> Result<commands::build::BuildSummary> {
        commands::build::run(self)
    }

    /// Clean the output directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }
}

/// Resolve `.` and `..` components without touching the filesystem
fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path(Path::new("/site/./out")), PathBuf::from("/site/out"));
        assert_eq!(normalize_path(Path::new("/site/a/../public")), PathBuf::from("/site/public"));
        assert_eq!(normalize_path(Path::new("a/../../../b")), PathBuf::from("../../b"));
        assert_eq!(normalize_path(Path::new("/../etc")), PathBuf::from("/etc"));
    }

    #[test]
    fn test_output_dir_must_not_hold_sources() {
        let mut config = config::SiteConfig::default();
        config.collections.insert(
            "posts".to_string(),
            config::CollectionSettings::new("content/posts"),
        );

        let site = Site::with_config("/site", config.clone());
        assert!(site.check_output_dir().is_ok());

        for output_dir in [".", "public", "templates", "content", "content/posts", "x/../content"] {
            let mut config = config.clone();
            config.output_dir = output_dir.to_string();
            let site = Site::with_config("/site", config);
            assert!(
                matches!(site.check_output_dir(), Err(Error::Config { .. })),
                "accepted output_dir {:?}",
                output_dir
            );
        }
    }
}
