//! Clean the output directory

use std::fs;

use crate::error::{Error, Result};
use crate::Site;

/// Remove the output directory
pub fn run(site: &Site) -> Result<()> {
    site.check_output_dir()?;
    if site.output_dir.exists() {
        fs::remove_dir_all(&site.output_dir).map_err(|e| Error::io(&site.output_dir, e))?;
        tracing::info!("Deleted: {:?}", site.output_dir);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use tempfile::TempDir;

    #[test]
    fn test_clean_removes_output() {
        let dir = TempDir::new().unwrap();
        let site = Site::with_config(dir.path(), SiteConfig::default());
        fs::create_dir_all(site.output_dir.join("posts")).unwrap();
        fs::write(site.output_dir.join("posts/index.html"), "x").unwrap();

        run(&site).unwrap();
        assert!(!site.output_dir.exists());

        // Cleaning twice is fine
        run(&site).unwrap();
    }

    #[test]
    fn test_clean_refuses_public_dir() {
        let dir = TempDir::new().unwrap();
        let mut config = SiteConfig::default();
        config.output_dir = "public".to_string();
        let site = Site::with_config(dir.path(), config);
        fs::create_dir_all(&site.public_dir).unwrap();
        fs::write(site.public_dir.join("logo.svg"), "<svg/>").unwrap();

        assert!(matches!(run(&site), Err(Error::Config { .. })));
        assert!(site.public_dir.join("logo.svg").is_file());
    }
}
