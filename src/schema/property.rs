//! Reads one typed source property into canonical channel contributions.
//!
//! Every function here is total: unknown or empty properties contribute
//! nothing rather than failing.

use std::sync::LazyLock;

use regex::Regex;

use super::types::CanonicalField;
use crate::notion::types::{PropertyValue, RichText};

static HEX_COLOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#([0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").expect("valid hex color pattern")
});

fn join_rich_text(runs: &[RichText]) -> String {
    runs.iter().map(|r| r.plain_text.as_str()).collect()
}

/// Render a number the way a browser would: integral values without `.0`.
fn format_number(number: &serde_json::Number) -> String {
    match number.as_f64() {
        Some(f) if number.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => {
            format!("{}", f as i64)
        }
        _ => number.to_string(),
    }
}

/// Plain-text rendering of a property. Files, relations and unsupported
/// types have no text.
pub fn read_text(prop: &PropertyValue) -> String {
    match prop {
        PropertyValue::Title { title } => join_rich_text(title),
        PropertyValue::RichText { rich_text } => join_rich_text(rich_text),
        PropertyValue::Select { select } | PropertyValue::Status { status: select } => select
            .as_ref()
            .map(|s| s.name.clone())
            .unwrap_or_default(),
        PropertyValue::Url { url } => url.clone().unwrap_or_default(),
        PropertyValue::Email { email } => email.clone().unwrap_or_default(),
        PropertyValue::PhoneNumber { phone_number } => phone_number.clone().unwrap_or_default(),
        PropertyValue::Number { number } => number.as_ref().map(format_number).unwrap_or_default(),
        PropertyValue::Date { date } => date
            .as_ref()
            .and_then(|d| d.start.clone())
            .unwrap_or_default(),
        PropertyValue::MultiSelect { multi_select } => multi_select
            .iter()
            .map(|s| s.name.as_str())
            .collect::<Vec<_>>()
            .join(", "),
        PropertyValue::Files { .. } | PropertyValue::Relation { .. } | PropertyValue::Unsupported => {
            String::new()
        }
    }
}

/// Hosted URLs of a `files` property, Notion-hosted before external.
pub fn read_files(prop: &PropertyValue) -> Vec<String> {
    let PropertyValue::Files { files } = prop else {
        return Vec::new();
    };
    files
        .iter()
        .filter_map(|entry| {
            entry
                .file
                .as_ref()
                .map(|f| f.url.as_str())
                .filter(|url| !url.is_empty())
                .or_else(|| {
                    entry
                        .external
                        .as_ref()
                        .map(|f| f.url.as_str())
                        .filter(|url| !url.is_empty())
                })
        })
        .map(str::to_string)
        .collect()
}

fn links_from_text(prop: &PropertyValue, text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    let is_url_type = matches!(prop, PropertyValue::Url { .. });
    if is_url_type || text.starts_with("http://") || text.starts_with("https://") {
        vec![text.to_string()]
    } else {
        Vec::new()
    }
}

fn colors_from_text(text: &str) -> Vec<String> {
    let text = text.trim();
    if HEX_COLOR.is_match(text) {
        vec![text.to_string()]
    } else {
        Vec::new()
    }
}

/// Page ids referenced by a `relation` property.
pub fn relation_ids(prop: &PropertyValue) -> Vec<String> {
    match prop {
        PropertyValue::Relation { relation } => relation.iter().map(|r| r.id.clone()).collect(),
        _ => Vec::new(),
    }
}

/// All channel contributions of one property.
pub fn read_property(prop: &PropertyValue) -> CanonicalField {
    let text = read_text(prop);
    CanonicalField {
        images: read_files(prop),
        links: links_from_text(prop, &text),
        colors: colors_from_text(&text),
        text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn prop(value: serde_json::Value) -> PropertyValue {
        PropertyValue::from_json(value)
    }

    #[test]
    fn test_text_by_type() {
        let title = prop(json!({"type": "title", "title": [{"plain_text": "Urban "}, {"plain_text": "Sound"}]}));
        assert_eq!(read_text(&title), "Urban Sound");

        let status = prop(json!({"type": "status", "status": {"name": "published"}}));
        assert_eq!(read_text(&status), "published");

        let empty_select = prop(json!({"type": "select", "select": null}));
        assert_eq!(read_text(&empty_select), "");

        let tags = prop(json!({"type": "multi_select", "multi_select": [{"name": "a"}, {"name": "b"}]}));
        assert_eq!(read_text(&tags), "a, b");

        let date = prop(json!({"type": "date", "date": {"start": "2024-09-01", "end": null}}));
        assert_eq!(read_text(&date), "2024-09-01");

        let phone = prop(json!({"type": "phone_number", "phone_number": "+886 2 1234"}));
        assert_eq!(read_text(&phone), "+886 2 1234");
    }

    #[test]
    fn test_numbers_render_without_trailing_zero() {
        assert_eq!(read_text(&prop(json!({"type": "number", "number": 3}))), "3");
        assert_eq!(read_text(&prop(json!({"type": "number", "number": 3.0}))), "3");
        assert_eq!(read_text(&prop(json!({"type": "number", "number": 2.5}))), "2.5");
        assert_eq!(read_text(&prop(json!({"type": "number", "number": null}))), "");
    }

    #[test]
    fn test_unsupported_type_contributes_nothing() {
        let checkbox = prop(json!({"type": "checkbox", "checkbox": true}));
        assert_eq!(read_property(&checkbox), CanonicalField::default());
    }

    #[test]
    fn test_files_prefer_hosted_url() {
        let files = prop(json!({"type": "files", "files": [
            {"name": "a", "type": "file", "file": {"url": "https://s3/a.png"}},
            {"name": "b", "type": "external", "external": {"url": "https://cdn/b.png"}},
            {"name": "c", "type": "file", "file": {"url": ""}},
            {"name": "d"}
        ]}));
        let field = read_property(&files);
        assert_eq!(field.images, vec!["https://s3/a.png", "https://cdn/b.png"]);
        assert_eq!(field.text, "");
        assert!(field.links.is_empty());
    }

    #[test]
    fn test_links_from_url_type_and_http_text() {
        let links = |value: serde_json::Value| read_property(&prop(value)).links;
        assert_eq!(links(json!({"type": "url", "url": "example.com/deck"})), vec!["example.com/deck"]);
        assert_eq!(
            links(json!({"type": "rich_text", "rich_text": [{"plain_text": "https://github.com/x"}]})),
            vec!["https://github.com/x"]
        );
        assert!(links(json!({"type": "rich_text", "rich_text": [{"plain_text": "see https://x.y"}]})).is_empty());
    }

    #[test]
    fn test_colors_match_three_or_six_hex_digits() {
        let color = |s: &str| read_property(&prop(json!({"type": "rich_text", "rich_text": [{"plain_text": s}]}))).colors;
        assert_eq!(color("#1a2b3c"), vec!["#1a2b3c"]);
        assert_eq!(color(" #FFF "), vec!["#FFF"]);
        assert!(color("#1234").is_empty());
        assert!(color("1a2b3c").is_empty());
        assert!(color("#ggg").is_empty());
    }

    #[test]
    fn test_relation_ids() {
        let rel = prop(json!({"type": "relation", "relation": [{"id": "p1"}, {"id": "p2"}]}));
        assert_eq!(relation_ids(&rel), vec!["p1", "p2"]);
        assert_eq!(read_text(&rel), "");
    }
}
