//! Slugs, permalinks and URLs

use chrono::NaiveDateTime;
use lazy_static::lazy_static;
use regex::Regex;
use std::path::{Component, Path};

use crate::helpers::parse_calendar_date;

lazy_static! {
    static ref NON_SLUG_CHARS: Regex = Regex::new(r"[^a-z0-9]+").unwrap();
    static ref DATED_STEM: Regex = Regex::new(r"^(\d{4}-\d{2}-\d{2})-(.+)$").unwrap();
}

/// Output extension substituted for `:output_ext`
pub const OUTPUT_EXT: &str = ".html";

/// Lowercase `s`, collapse every run of characters outside `[a-z0-9]` into a
/// single `-` and trim dashes from both ends.
///
/// The result is empty or matches `^[a-z0-9]+(-[a-z0-9]+)*$`.
pub fn slugify(s: &str) -> String {
    let lower = s.to_lowercase();
    NON_SLUG_CHARS
        .replace_all(&lower, "-")
        .trim_matches('-')
        .to_string()
}

/// Turn a slug into a display title: `hello-world` -> `Hello World`
pub fn titleize(slug: &str) -> String {
    slug.split(['-', ' '])
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Date and slug derived from a file stem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatedStem {
    pub date: Option<NaiveDateTime>,
    pub slug: String,
}

/// Split a `YYYY-MM-DD-rest` stem into its date and slugified remainder.
///
/// A stem without the prefix yields no date and the slugified stem. An
/// out-of-range prefix date is dropped but the remainder is still the slug.
pub fn split_dated_stem(stem: &str) -> DatedStem {
    let Some(caps) = DATED_STEM.captures(stem) else {
        return DatedStem {
            date: None,
            slug: slugify(stem),
        };
    };

    let date = parse_calendar_date(&caps[1]);
    if date.is_none() {
        tracing::debug!("Ignoring invalid filename date {:?} in {:?}", &caps[1], stem);
    }

    let slug = match slugify(&caps[2]) {
        s if s.is_empty() => slugify(stem),
        s => s,
    };

    DatedStem { date, slug }
}

/// Values substituted into a permalink pattern
#[derive(Debug, Clone)]
pub struct PermalinkMeta<'a> {
    pub title: &'a str,
    pub slug: &'a str,
    pub date: Option<NaiveDateTime>,
}

/// Substitute `:year :month :day :title :slug :output_ext` in `pattern`.
///
/// The date falls back to `now` when the item has none; title and slug are
/// slugified before substitution.
pub fn apply_permalink(pattern: &str, meta: &PermalinkMeta<'_>, now: NaiveDateTime) -> String {
    let date = meta.date.unwrap_or(now);

    pattern
        .replace(":year", &date.format("%Y").to_string())
        .replace(":month", &date.format("%m").to_string())
        .replace(":day", &date.format("%d").to_string())
        .replace(":title", &slugify(meta.title))
        .replace(":slug", &slugify(meta.slug))
        .replace(":output_ext", OUTPUT_EXT)
}

/// The permalink pattern used when a collection does not set one
pub fn default_permalink(output_dir: &str, slug: &str) -> String {
    format!("{}/{}/index.html", output_dir, slug)
}

/// Compute the output path of an item relative to the output root.
///
/// `relative_dir` is the directory of the source file relative to the
/// collection root; when non-empty it prefixes the permalink. `flat_output`
/// discards everything and yields `{slug}.html`.
pub fn resolve_output_path(
    pattern: &str,
    meta: &PermalinkMeta<'_>,
    now: NaiveDateTime,
    relative_dir: &Path,
    flat_output: bool,
) -> String {
    if flat_output {
        return format!("{}{}", meta.slug, OUTPUT_EXT);
    }

    let output_path = apply_permalink(pattern, meta, now)
        .trim_matches('/')
        .to_string();

    let prefix: Vec<String> = relative_dir
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    if prefix.is_empty() {
        output_path
    } else {
        format!("{}/{}", prefix.join("/"), output_path)
    }
}

/// Derive the public URL of an output path.
///
/// `blog/index.html` -> `/blog/`, `blog/post.html` -> `/blog/post.html`,
/// `blog/post` -> `/blog/post/`.
pub fn normalize_output_path_to_url(path: &str) -> String {
    let path = path.trim_start_matches('/');

    let mut url = if path == "index.html" {
        "/".to_string()
    } else if let Some(dir) = path.strip_suffix("/index.html") {
        format!("/{}/", dir)
    } else {
        format!("/{}", path)
    };

    if !url.ends_with('/') && !url.ends_with(".html") {
        url.push('/');
    }
    url
}
