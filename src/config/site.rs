//! Site configuration (config.yaml / config.toml)

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Main site configuration
///
/// The whole structure is exposed to templates as `config`, and `site` as
/// `site`. Keys this crate does not know about are kept in `extra` and are
/// serialized back at the top level so templates see the file verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Free-form site metadata (title, author, url...)
    pub site: IndexMap<String, serde_json::Value>,

    /// Collections in declaration order
    pub collections: IndexMap<String, CollectionSettings>,

    // Directories, relative to the site base directory
    pub template_dir: String,
    pub output_dir: String,
    pub public_dir: String,

    /// Abort the run on a malformed front-matter block instead of skipping the file
    pub strict_front_matter: bool,

    pub highlight: HighlightConfig,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_json::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            site: IndexMap::new(),
            collections: IndexMap::new(),
            template_dir: "templates".to_string(),
            output_dir: "output".to_string(),
            public_dir: "public".to_string(),
            strict_front_matter: false,
            highlight: HighlightConfig::default(),
            extra: IndexMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a YAML or TOML file, picked by extension
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let is_toml = path.extension().and_then(|e| e.to_str()) == Some("toml");
        let parsed = if is_toml {
            toml::from_str::<SiteConfig>(&content).map_err(|e| e.to_string())
        } else {
            serde_yaml::from_str::<SiteConfig>(&content).map_err(|e| e.to_string())
        };

        let config = parsed.map_err(|message| Error::Config {
            path: path.to_path_buf(),
            message,
        })?;
        tracing::debug!(
            "Loaded {:?} with {} collections",
            path,
            config.collections.len()
        );
        Ok(config)
    }

    /// Settings for a collection, if it is configured
    pub fn collection(&self, name: &str) -> Option<&CollectionSettings> {
        self.collections.get(name)
    }
}

/// Settings of a single collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionSettings {
    /// Directory holding the collection's content files
    pub path: PathBuf,

    /// `"markdown"` restricts the collection to `.md` files
    #[serde(rename = "type", default)]
    pub kind: String,

    #[serde(default)]
    pub allow_subdirectory: bool,

    /// Layout used when an item does not name one
    #[serde(default = "default_template")]
    pub template: String,

    /// Permalink pattern with `:year :month :day :title :slug :output_ext` tokens
    #[serde(default)]
    pub permalink: Option<String>,

    #[serde(default)]
    pub output_dir: String,

    #[serde(default)]
    pub index_template: Option<String>,
    #[serde(default)]
    pub index_title: Option<String>,
    #[serde(default)]
    pub index_description: Option<String>,
}

fn default_template() -> String {
    "default.html".to_string()
}

impl CollectionSettings {
    /// Create settings for a collection rooted at `path`, everything else default
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            kind: String::new(),
            allow_subdirectory: false,
            template: default_template(),
            permalink: None,
            output_dir: String::new(),
            index_template: None,
            index_title: None,
            index_description: None,
        }
    }

    /// Whether only `.md` files belong to this collection
    pub fn markdown_only(&self) -> bool {
        self.kind == "markdown"
    }

    /// The index template, if one is set and non-empty
    pub fn index_template(&self) -> Option<&str> {
        self.index_template.as_deref().filter(|t| !t.is_empty())
    }
}

/// Code highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub enable: bool,
    pub theme: String,
    pub line_number: bool,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            enable: false,
            theme: "base16-ocean.dark".to_string(),
            line_number: false,
        }
    }
}
