//! Front-matter parsing

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Front-matter keys and values, in file order.
///
/// Values are held as JSON so every nested key is a string and the whole map
/// can be handed to templates as is.
pub type Metadata = IndexMap<String, Value>;

/// Why a front-matter block could not be decoded
#[derive(Debug, Error)]
pub enum FrontMatterError {
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("front matter must be a mapping of keys to values")]
    NotAMapping,
    #[error("value of {key:?} has a nested key that is not a string, number or boolean")]
    Unrepresentable { key: String },
}

#[derive(Clone, Copy)]
enum Format {
    Yaml,
    Toml,
    Json,
}

impl Format {
    fn from_fence(line: &str) -> Option<(Self, &'static str)> {
        match line.trim_end() {
            "---" => Some((Format::Yaml, "---")),
            "+++" => Some((Format::Toml, "+++")),
            ";;;" => Some((Format::Json, ";;;")),
            _ => None,
        }
    }
}

/// Split a content file into its front-matter block and body.
///
/// The block must open on the first line with `---` (YAML), `+++` (TOML) or
/// `;;;` (JSON) and close with the same fence on its own line. Without an
/// opening fence, or without a closing one, the whole text is body.
pub fn split_front_matter(content: &str) -> Result<(Metadata, &str), FrontMatterError> {
    let content = content.trim_start_matches('\u{feff}');

    let (first_line, rest) = match content.find('\n') {
        Some(pos) => (&content[..pos], &content[pos + 1..]),
        None => (content, ""),
    };

    let Some((format, fence)) = Format::from_fence(first_line) else {
        return Ok((Metadata::new(), content));
    };

    let Some((block, body)) = find_closing_fence(rest, fence) else {
        return Ok((Metadata::new(), content));
    };

    let body = body.trim_start_matches(['\n', '\r']);
    if block.trim().is_empty() {
        return Ok((Metadata::new(), body));
    }

    let metadata = match format {
        Format::Yaml => match serde_yaml::from_str::<serde_yaml::Value>(block)? {
            serde_yaml::Value::Mapping(map) => {
                let mut metadata = Metadata::new();
                for (key, value) in map {
                    let key = key_to_string(key)?;
                    let Some(value) = yaml_to_json(value) else {
                        return Err(FrontMatterError::Unrepresentable { key });
                    };
                    metadata.insert(key, value);
                }
                metadata
            }
            serde_yaml::Value::Null => Metadata::new(),
            _ => return Err(FrontMatterError::NotAMapping),
        },
        Format::Toml => {
            let table: toml::Table = toml::from_str(block)?;
            table
                .into_iter()
                .map(|(key, value)| (key, toml_to_json(value)))
                .collect()
        }
        Format::Json => match serde_json::from_str::<Value>(block)? {
            Value::Object(map) => map.into_iter().collect(),
            _ => return Err(FrontMatterError::NotAMapping),
        },
    };

    Ok((metadata, body))
}

/// Find a line consisting of `fence`; returns (block before it, text after it)
fn find_closing_fence<'a>(rest: &'a str, fence: &str) -> Option<(&'a str, &'a str)> {
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == fence {
            return Some((&rest[..offset], &rest[offset + line.len()..]));
        }
        offset += line.len();
    }
    None
}

/// Convert a YAML value to JSON, stringifying scalar keys and dropping tags.
/// `None` when a nested key is null or a collection.
fn yaml_to_json(value: serde_yaml::Value) -> Option<Value> {
    use serde_yaml::Value as Yaml;

    match value {
        Yaml::Null => Some(Value::Null),
        Yaml::Bool(b) => Some(Value::Bool(b)),
        Yaml::Number(n) => Some(if let Some(i) = n.as_i64() {
            Value::from(i)
        } else if let Some(u) = n.as_u64() {
            Value::from(u)
        } else {
            n.as_f64().map(Value::from).unwrap_or(Value::Null)
        }),
        Yaml::String(s) => Some(Value::String(s)),
        Yaml::Sequence(items) => items
            .into_iter()
            .map(yaml_to_json)
            .collect::<Option<Vec<_>>>()
            .map(Value::Array),
        Yaml::Mapping(map) => map
            .into_iter()
            .map(|(key, value)| Some((key_to_string(key).ok()?, yaml_to_json(value)?)))
            .collect::<Option<serde_json::Map<_, _>>>()
            .map(Value::Object),
        Yaml::Tagged(tagged) => yaml_to_json(tagged.value),
    }
}

/// TOML datetimes become their RFC 3339 text
fn toml_to_json(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::from(i),
        toml::Value::Float(f) => Value::from(f),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(items.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(key, value)| (key, toml_to_json(value)))
                .collect(),
        ),
    }
}

fn key_to_string(key: serde_yaml::Value) -> Result<String, FrontMatterError> {
    match key {
        serde_yaml::Value::String(s) => Ok(s),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        _ => Err(FrontMatterError::NotAMapping),
    }
}

/// Front matter with the recognized keys lifted into typed fields
#[derive(Debug, Clone, Default, Serialize)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub description: Option<String>,
    /// Unparsed date; see [`crate::helpers::parse_date_string`]
    pub date: Option<String>,
    pub slug: Option<String>,
    pub template: Option<String>,
    pub flat_output: bool,

    /// Keys this crate does not interpret, passed through to templates
    pub extra: Metadata,
}

impl FrontMatter {
    /// Parse front matter from a content string.
    /// Returns (front_matter, remaining_content)
    pub fn parse(content: &str) -> Result<(Self, &str), FrontMatterError> {
        let (metadata, body) = split_front_matter(content)?;
        Ok((Self::from_metadata(metadata), body))
    }

    /// Lift the recognized keys out of raw metadata.
    ///
    /// String-typed keys accept any scalar (`title: 2024` is the title
    /// `"2024"`); values of an unusable type are dropped with a warning.
    pub fn from_metadata(mut metadata: Metadata) -> Self {
        let mut take_string = |key: &str| -> Option<String> {
            let value = metadata.shift_remove(key)?;
            let s = scalar_to_string(&value);
            if s.is_none() && !value.is_null() {
                tracing::warn!("Ignoring front-matter key {:?}: expected a scalar", key);
            }
            s
        };

        let title = take_string("title");
        let description = take_string("description");
        let date = take_string("date");
        let slug = take_string("slug");
        let template = take_string("template");

        let flat_output = match metadata.shift_remove("flat_output") {
            Some(Value::Bool(b)) => b,
            Some(Value::Null) | None => false,
            Some(other) => {
                tracing::warn!("Ignoring flat_output {:?}: expected true or false", other);
                false
            }
        };

        Self {
            title,
            description,
            date,
            slug,
            template,
            flat_output,
            extra: metadata,
        }
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yaml_frontmatter() {
        let content = r#"---
title: Hello World
date: 2024-01-15 10:30:00
tags:
  - rust
  - tera
---

This is the content.
"#;

        let (fm, remaining) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title, Some("Hello World".to_string()));
        assert_eq!(fm.date, Some("2024-01-15 10:30:00".to_string()));
        assert!(fm.extra.contains_key("tags"));
        assert_eq!(remaining, "This is the content.\n");
    }

    #[test]
    fn test_parse_toml_frontmatter() {
        let content = "+++\ntitle = \"Toml Post\"\nflat_output = true\n+++\nBody\n";

        let (fm, remaining) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title, Some("Toml Post".to_string()));
        assert!(fm.flat_output);
        assert_eq!(remaining, "Body\n");
    }

    #[test]
    fn test_parse_json_frontmatter() {
        let content = ";;;\n{\"title\": \"Test Post\", \"slug\": \"custom\"}\n;;;\n\nThis is content.\n";

        let (fm, remaining) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title, Some("Test Post".to_string()));
        assert_eq!(fm.slug, Some("custom".to_string()));
        assert!(remaining.starts_with("This is content."));
    }

    #[test]
    fn test_no_frontmatter() {
        let content = "# Just markdown\n\n---\n\nWith a rule.\n";
        let (metadata, body) = split_front_matter(content).unwrap();
        assert!(metadata.is_empty());
        assert_eq!(body, content);
    }

    #[test]
    fn test_unclosed_fence_is_body() {
        let content = "---\ntitle: Never closed\n\nBody";
        let (metadata, body) = split_front_matter(content).unwrap();
        assert!(metadata.is_empty());
        assert_eq!(body, content);
    }

    #[test]
    fn test_empty_block() {
        let (metadata, body) = split_front_matter("---\n---\nBody").unwrap();
        assert!(metadata.is_empty());
        assert_eq!(body, "Body");
    }

    #[test]
    fn test_malformed_yaml_is_error() {
        let content = "---\ntitle: [unterminated\n---\nBody";
        assert!(matches!(
            split_front_matter(content),
            Err(FrontMatterError::Yaml(_))
        ));
    }

    #[test]
    fn test_non_mapping_is_error() {
        let content = "---\n- a\n- b\n---\nBody";
        assert!(matches!(
            split_front_matter(content),
            Err(FrontMatterError::NotAMapping)
        ));
    }

    #[test]
    fn test_scalar_values_become_strings() {
        let content = "---\ntitle: 2024\nslug: 42\nflat_output: false\n---\n";
        let (fm, _) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title, Some("2024".to_string()));
        assert_eq!(fm.slug, Some("42".to_string()));
        assert!(!fm.flat_output);
    }

    #[test]
    fn test_wrong_type_flat_output_ignored() {
        let content = "---\nflat_output: sometimes\n---\n";
        let (fm, _) = FrontMatter::parse(content).unwrap();
        assert!(!fm.flat_output);
        assert!(fm.extra.is_empty());
    }

    #[test]
    fn test_crlf_and_bom() {
        let content = "\u{feff}---\r\ntitle: Windows\r\n---\r\nBody\r\n";
        let (fm, body) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title, Some("Windows".to_string()));
        assert_eq!(body, "Body\r\n");
    }

    #[test]
    fn test_toml_datetime_becomes_string() {
        let content = "+++\ndate = 2024-05-10T08:00:00\n+++\n";
        let (fm, _) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.date, Some("2024-05-10T08:00:00".to_string()));
    }

    #[test]
    fn test_nested_scalar_keys_become_strings() {
        let content = "---\nmeta:\n  1: one\n  true: yes\n---\n";
        let (metadata, _) = split_front_matter(content).unwrap();
        assert_eq!(metadata["meta"]["1"], "one");
        assert_eq!(metadata["meta"]["true"], "yes");
    }

    #[test]
    fn test_nested_null_key_is_error() {
        let content = "---\nmeta:\n  ~: x\n---\nA";
        match split_front_matter(content) {
            Err(FrontMatterError::Unrepresentable { key, .. }) => assert_eq!(key, "meta"),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
