//! List site content

use chrono::{Local, NaiveDateTime};

use crate::content::ContentItem;
use crate::error::{Error, Result};
use crate::generator::group_by_collection;
use crate::Site;

/// Print the items of every collection, or of one collection
pub fn run(site: &Site, collection: Option<&str>) -> Result<()> {
    let listing = listing(site, collection, Local::now().naive_local())?;
    print!("{}", listing);
    Ok(())
}

/// One block per collection: a header with the item count, then
/// `date  url  title` per item in loader order
pub fn listing(site: &Site, collection: Option<&str>, now: NaiveDateTime) -> Result<String> {
    if let Some(name) = collection {
        if site.config.collection(name).is_none() {
            let known: Vec<_> = site.config.collections.keys().map(String::as_str).collect();
            return Err(Error::Config {
                path: site.base_dir.clone(),
                message: format!(
                    "unknown collection {:?}; available: {}",
                    name,
                    known.join(", ")
                ),
            });
        }
    }

    let items: Vec<ContentItem> = site
        .load_items(now)?
        .into_iter()
        .filter(|item| collection.map_or(true, |name| item.collection == name))
        .collect();
    let grouped = group_by_collection(&items);

    let mut out = String::new();
    for name in site.config.collections.keys() {
        if collection.is_some_and(|wanted| wanted != name.as_str()) {
            continue;
        }
        let members = grouped.get(name.as_str()).map(Vec::as_slice).unwrap_or(&[]);
        out.push_str(&format!("{} ({}):\n", name, members.len()));
        for item in members {
            let date = item
                .date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "----------".to_string());
            out.push_str(&format!("  {}  {}  {}\n", date, item.url, item.title));
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CollectionSettings, SiteConfig};
    use chrono::NaiveDate;
    use std::fs;
    use tempfile::TempDir;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn site() -> (TempDir, Site) {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("posts")).unwrap();
        fs::create_dir_all(dir.path().join("pages")).unwrap();
        fs::write(dir.path().join("posts/2024-01-01-a.md"), "A").unwrap();
        fs::write(dir.path().join("posts/2024-02-01-b.md"), "B").unwrap();
        fs::write(dir.path().join("pages/about.md"), "About").unwrap();

        let mut config = SiteConfig::default();
        config
            .collections
            .insert("posts".to_string(), CollectionSettings::new("posts"));
        config
            .collections
            .insert("pages".to_string(), CollectionSettings::new("pages"));
        let site = Site::with_config(dir.path(), config);
        (dir, site)
    }

    #[test]
    fn test_listing_all() {
        let (_dir, site) = site();
        let out = listing(&site, None, now()).unwrap();
        assert_eq!(
            out,
            "posts (2):\n  2024-02-01  /b/  B\n  2024-01-01  /a/  A\npages (1):\n  ----------  /about/  About\n"
        );
    }

    #[test]
    fn test_listing_one_collection() {
        let (_dir, site) = site();
        let out = listing(&site, Some("pages"), now()).unwrap();
        assert_eq!(out, "pages (1):\n  ----------  /about/  About\n");
    }

    #[test]
    fn test_unknown_collection() {
        let (_dir, site) = site();
        let err = listing(&site, Some("drafts"), now()).unwrap_err();
        assert!(err.to_string().contains("drafts"));
    }
}
