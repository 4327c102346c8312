//! Configuration module

mod site;

pub use site::CollectionSettings;
pub use site::HighlightConfig;
pub use site::SiteConfig;
