//! Template environment backed by Tera
//!
//! Every file under the template directory is registered under its
//! `/`-separated relative path, so layouts can `{% extends "base.html" %}` and
//! `{% include "partials/nav.html" %}` each other.

use chrono::NaiveDateTime;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tera::{Context, Tera};
use walkdir::WalkDir;

use crate::config::SiteConfig;
use crate::error::{Error, Result};
use crate::helpers::{format_date, parse_date_string, DEFAULT_DATE_FORMAT};

/// Template renderer over a directory of Tera templates
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Load every template under `template_dir`.
    ///
    /// A missing directory yields an empty environment; any layout lookup
    /// then fails with `TemplateNotFound`. `now` is what the `now()`
    /// template function returns.
    pub fn load(template_dir: &Path, now: NaiveDateTime) -> Result<Self> {
        let templates = collect_templates(template_dir)?;
        tracing::debug!(
            "Loading {} templates from {:?}",
            templates.len(),
            template_dir
        );

        let mut tera = Tera::default();

        // Output is HTML we generated ourselves; escaping would mangle content
        tera.autoescape_on(vec![]);

        tera.register_filter("format_date", format_date_filter);
        let now = now.format("%Y-%m-%dT%H:%M:%S").to_string();
        tera.register_function(
            "now",
            move |_args: &HashMap<String, tera::Value>| -> tera::Result<tera::Value> {
                Ok(tera::Value::String(now.clone()))
            },
        );

        tera.add_raw_templates(templates)
            .map_err(|source| Error::TemplateLoad {
                path: template_dir.to_path_buf(),
                source,
            })?;

        Ok(Self { tera })
    }

    /// Whether a template with this name was loaded
    pub fn has_template(&self, name: &str) -> bool {
        self.tera.get_template_names().any(|n| n == name)
    }

    /// Render a named template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> tera::Result<String> {
        self.tera.render(template_name, context)
    }

    /// Render a template given as a string, with the same filters and
    /// functions and access to the loaded templates
    pub fn render_str(&mut self, source: &str, context: &Context) -> tera::Result<String> {
        self.tera.render_str(source, context)
    }
}

/// Context entries every template sees: `config` and `site`
pub fn base_context(config: &SiteConfig) -> tera::Result<Context> {
    let mut context = Context::new();
    context.try_insert("config", config)?;
    context.try_insert("site", &config.site)?;
    Ok(context)
}

/// Read all template files, named by their path relative to `dir`
fn collect_templates(dir: &Path) -> Result<Vec<(String, String)>> {
    if !dir.is_dir() {
        tracing::warn!("Template directory {:?} does not exist", dir);
        return Ok(Vec::new());
    }

    let mut templates = Vec::new();
    for entry in WalkDir::new(dir).follow_links(true).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(dir).to_path_buf();
            Error::io(path, e.into())
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(dir).unwrap_or(path);
        let hidden = relative
            .components()
            .any(|c| c.as_os_str().to_string_lossy().starts_with('.'));
        if hidden {
            continue;
        }

        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        let contents = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        templates.push((name, contents));
    }

    Ok(templates)
}

/// Tera filter: `{{ item.date | format_date(fmt="%d %B %Y") }}`
///
/// Values that are not dates pass through unchanged.
fn format_date_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let format = match args.get("fmt") {
        Some(val) => tera::try_get_value!("format_date", "fmt", String, val),
        None => DEFAULT_DATE_FORMAT.to_string(),
    };

    let Some(date) = value.as_str().and_then(parse_date_string) else {
        return Ok(value.clone());
    };

    match format_date(&date, &format) {
        Some(formatted) => Ok(tera::Value::String(formatted)),
        None => Err(tera::Error::msg(format!(
            "format_date: invalid format {:?}",
            format
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn template_dir(files: &[(&str, &str)]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for (name, content) in files {
            let path = dir.path().join(name);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }
        dir
    }

    #[test]
    fn test_inheritance_and_include() {
        let dir = template_dir(&[
            ("base.html", "<main>{% block body %}{% endblock %}</main>{% include \"partials/foot.html\" %}"),
            ("partials/foot.html", "<footer>{{ site.title }}</footer>"),
            ("post.html", "{% extends \"base.html\" %}{% block body %}{{ content }}{% endblock %}"),
        ]);
        let renderer = TemplateRenderer::load(dir.path(), now()).unwrap();
        assert!(renderer.has_template("partials/foot.html"));

        let mut config = SiteConfig::default();
        config
            .site
            .insert("title".to_string(), serde_json::Value::from("Site"));
        let mut context = base_context(&config).unwrap();
        context.insert("content", "<p>Hi</p>");

        let html = renderer.render("post.html", &context).unwrap();
        assert_eq!(html, "<main><p>Hi</p></main><footer>Site</footer>");
    }

    #[test]
    fn test_format_date_filter() {
        let dir = template_dir(&[(
            "t.html",
            "{{ d | format_date }}|{{ d | format_date(fmt=\"%d/%m/%Y\") }}|{{ s | format_date }}",
        )]);
        let renderer = TemplateRenderer::load(dir.path(), now()).unwrap();

        let mut context = Context::new();
        context.insert("d", "2024-05-10T08:30:00");
        context.insert("s", "not a date");
        let out = renderer.render("t.html", &context).unwrap();
        assert_eq!(out, "2024-05-10|10/05/2024|not a date");
    }

    #[test]
    fn test_now_function_uses_injected_clock() {
        let dir = template_dir(&[("t.html", "{{ now() | format_date(fmt=\"%Y\") }}")]);
        let renderer = TemplateRenderer::load(dir.path(), now()).unwrap();
        assert_eq!(renderer.render("t.html", &Context::new()).unwrap(), "2025");
    }

    #[test]
    fn test_render_str_sees_loaded_templates() {
        let dir = template_dir(&[("macros.html", "{% macro hi(n) %}Hi {{ n }}{% endmacro hi %}")]);
        let mut renderer = TemplateRenderer::load(dir.path(), now()).unwrap();

        let mut context = Context::new();
        context.insert("name", "there");
        let out = renderer
            .render_str(
                "{% import \"macros.html\" as m %}{{ m::hi(n=name) }}",
                &context,
            )
            .unwrap();
        assert_eq!(out, "Hi there");
    }

    #[test]
    fn test_no_autoescape() {
        let dir = template_dir(&[("t.html", "{{ content }}")]);
        let renderer = TemplateRenderer::load(dir.path(), now()).unwrap();
        let mut context = Context::new();
        context.insert("content", "<b>bold</b>");
        assert_eq!(renderer.render("t.html", &context).unwrap(), "<b>bold</b>");
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let dir = TempDir::new().unwrap();
        let renderer = TemplateRenderer::load(&dir.path().join("nope"), now()).unwrap();
        assert!(!renderer.has_template("default.html"));
    }

    #[test]
    fn test_syntax_error_is_load_error() {
        let dir = template_dir(&[("broken.html", "{% if %}")]);
        let err = TemplateRenderer::load(dir.path(), now()).err().unwrap();
        assert!(matches!(err, Error::TemplateLoad { .. }));
    }

    #[test]
    fn test_config_with_odd_nested_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "site:\n  title: T\n  meta:\n    ~: x\n    1: one\n").unwrap();

        match SiteConfig::load(&path) {
            Ok(config) => assert!(base_context(&config).is_ok()),
            Err(err) => assert!(matches!(err, Error::Config { .. })),
        }
    }
}
