//! Error types for the content pipeline

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading collections or rendering the site.
///
/// Every variant carries the file, template or item it concerns so the caller
/// can report what broke.
#[derive(Debug, Error)]
pub enum Error {
    /// A collection directory or content file could not be read
    #[error("cannot read {path:?}")]
    FileDiscovery {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The front-matter block of a content file is malformed
    #[error("malformed front matter in {path:?}: {message}")]
    FrontMatter { path: PathBuf, message: String },

    /// A layout or index template is not in the template directory
    #[error("template {template:?} not found (required by {item})")]
    TemplateNotFound { template: String, item: String },

    /// A template file failed to parse while building the environment
    #[error("failed to load templates from {path:?}")]
    TemplateLoad {
        path: PathBuf,
        #[source]
        source: tera::Error,
    },

    /// Rendering failed: unknown variable, bad filter call, syntax error in a
    /// template-as-content body
    #[error("failed to render template {template:?} for {item}")]
    TemplateRender {
        template: String,
        item: String,
        #[source]
        source: tera::Error,
    },

    /// A value could not be turned into template context
    #[error("cannot pass {item} to templates")]
    TemplateContext {
        item: String,
        #[source]
        source: tera::Error,
    },

    /// Writing a generated file failed
    #[error("failed to write {path:?}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Two sources resolve to the same output file
    #[error("output {output_path:?} is produced by both {first} and {second}")]
    OutputCollision {
        output_path: String,
        first: String,
        second: String,
    },

    /// The configuration file is unreadable or undecodable
    #[error("invalid configuration {path:?}: {message}")]
    Config { path: PathBuf, message: String },

    /// Any other filesystem failure (asset copy, output cleaning)
    #[error("i/o error on {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
