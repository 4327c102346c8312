//! Content module - collections, front matter, permalinks and markdown

mod frontmatter;
mod item;
pub mod loader;
mod markdown;
pub mod permalink;

pub use frontmatter::{split_front_matter, FrontMatter, FrontMatterError, Metadata};
pub use item::{sort_by_date_desc, ContentItem};
pub use loader::{load_collection, CollectionLoader};
pub use markdown::MarkdownRenderer;
