use std::collections::BTreeMap;

use super::property::{read_property, read_text};
use super::types::{CanonicalField, Item, UNTITLED};
use crate::notion::types::RawRecord;

/// Field names tried, in order, when a record has no usable `title` property.
pub const TITLE_FIELD_NAMES: &[&str] = &["CourseName", "ProjectName", "Name", "Title"];

pub const ITEM_TEXT_PARTS: usize = 4;
pub const ITEM_MAX_IMAGES: usize = 6;
pub const ITEM_MAX_LINKS: usize = 6;
pub const ITEM_MAX_COLORS: usize = 8;

/// Pick the title text and the name of the property it came from.
fn pick_title(record: &RawRecord) -> Option<(&str, String)> {
    let typed = record
        .properties
        .iter()
        .filter(|(_, prop)| prop.is_title())
        .map(|(name, prop)| (name.as_str(), read_text(prop)))
        .find(|(_, text)| !text.trim().is_empty());
    if typed.is_some() {
        return typed;
    }

    TITLE_FIELD_NAMES.iter().find_map(|&name| {
        let (key, prop) = record.properties.iter().find(|(key, _)| key == name)?;
        let text = read_text(prop);
        (!text.trim().is_empty()).then_some((key.as_str(), text))
    })
}

/// Stable id for rows the store returned without one.
fn fallback_id(fields: &BTreeMap<String, CanonicalField>) -> String {
    let mut hasher = blake3::Hasher::new();
    for (name, field) in fields {
        hasher.update(name.as_bytes());
        hasher.update(&[0]);
        hasher.update(field.text.as_bytes());
        for value in field.images.iter().chain(&field.links).chain(&field.colors) {
            hasher.update(&[0]);
            hasher.update(value.as_bytes());
        }
        hasher.update(&[0xff]);
    }
    let hex = hasher.finalize().to_hex();
    format!("row-{}", &hex.as_str()[..16])
}

/// Fold one external record into a canonical [`Item`].
pub fn normalize(record: &RawRecord) -> Item {
    let picked = pick_title(record);
    let title_field = picked.as_ref().map(|(name, _)| *name);

    let mut texts = Vec::new();
    let mut images = Vec::new();
    let mut links = Vec::new();
    let mut colors = Vec::new();
    let mut fields = BTreeMap::new();

    for (name, prop) in &record.properties {
        let field = read_property(prop);
        let is_title = prop.is_title() || title_field == Some(name.as_str());
        if !is_title && !field.text.is_empty() {
            texts.push(field.text.clone());
        }
        images.extend(field.images.iter().cloned());
        links.extend(field.links.iter().cloned());
        colors.extend(field.colors.iter().cloned());
        fields.insert(name.clone(), field);
    }

    texts.truncate(ITEM_TEXT_PARTS);
    images.truncate(ITEM_MAX_IMAGES);
    links.truncate(ITEM_MAX_LINKS);
    colors.truncate(ITEM_MAX_COLORS);

    let id = if record.id.is_empty() {
        fallback_id(&fields)
    } else {
        record.id.clone()
    };

    Item {
        id,
        title: picked
            .map(|(_, text)| text)
            .unwrap_or_else(|| UNTITLED.to_string()),
        text: texts.join(" | "),
        images,
        links,
        colors,
        fields,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notion::types::{PageObject, PropertyValue};
    use serde_json::json;

    fn record(value: serde_json::Value) -> RawRecord {
        let page: PageObject = serde_json::from_value(value).unwrap();
        RawRecord::from_page(page)
    }

    fn rich(text: &str) -> serde_json::Value {
        json!({"type": "rich_text", "rich_text": [{"plain_text": text}]})
    }

    #[test]
    fn test_title_from_typed_property() {
        let item = normalize(&record(json!({
            "id": "r1",
            "properties": {
                "Label": {"type": "title", "title": [{"plain_text": "Transit Memory"}]},
                "Name": rich("ignored")
            }
        })));
        assert_eq!(item.title, "Transit Memory");
        assert_eq!(item.text, "ignored");
    }

    #[test]
    fn test_title_falls_back_to_conventional_names() {
        let item = normalize(&record(json!({
            "id": "r1",
            "properties": {
                "Heading": {"type": "title", "title": []},
                "Summary": rich("about"),
                "Name": rich(""),
                "ProjectName": rich("Sound Diary")
            }
        })));
        assert_eq!(item.title, "Sound Diary");
        // The field that became the title is not repeated in the text.
        assert_eq!(item.text, "about");
    }

    #[test]
    fn test_title_never_empty() {
        let records = vec![
            RawRecord::default(),
            record(json!({"id": "x", "properties": {"Notes": rich("text only")}})),
            record(json!({"id": "y", "properties": {"Name": {"type": "title", "title": [{"plain_text": "  "}]}}})),
        ];
        for r in &records {
            assert_eq!(normalize(r).title, UNTITLED);
        }
    }

    #[test]
    fn test_text_joins_first_four_non_title_fields() {
        let item = normalize(&record(json!({
            "id": "r",
            "properties": {
                "Name": {"type": "title", "title": [{"plain_text": "T"}]},
                "A": rich("a"),
                "B": rich(""),
                "C": {"type": "number", "number": 3},
                "D": {"type": "select", "select": {"name": "d"}},
                "E": rich("e"),
                "F": rich("f")
            }
        })));
        assert_eq!(item.text, "a | 3 | d | e");
    }

    #[test]
    fn test_channels_aggregate_in_declaration_order_and_cap() {
        let files: Vec<_> = (0..7)
            .map(|i| json!({"type": "external", "external": {"url": format!("https://img/{i}")}}))
            .collect();
        let item = normalize(&record(json!({
            "id": "r",
            "properties": {
                "Cover": {"type": "files", "files": [{"file": {"url": "https://img/cover"}}]},
                "Gallery": {"type": "files", "files": files},
                "Site": {"type": "url", "url": "https://site"},
                "Accent": rich("#abc"),
                "Base": rich("#112233")
            }
        })));
        assert_eq!(item.images.len(), ITEM_MAX_IMAGES);
        assert_eq!(item.images[0], "https://img/cover");
        assert_eq!(item.images[5], "https://img/4");
        assert_eq!(item.links, vec!["https://site"]);
        assert_eq!(item.colors, vec!["#abc", "#112233"]);
        assert_eq!(item.fields["Gallery"].images.len(), 7);
        assert_eq!(item.fields.len(), 5);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let r = record(json!({
            "properties": {
                "Name": {"type": "title", "title": [{"plain_text": "No id"}]},
                "Palette": rich("#1a2b3c")
            }
        }));
        let first = normalize(&r);
        let second = normalize(&r);
        assert_eq!(first, second);
        assert!(first.id.starts_with("row-"));
        assert_eq!(first.id.len(), "row-".len() + 16);
    }

    #[test]
    fn test_fallback_ids_differ_per_content() {
        let unnamed = |text: &str| RawRecord {
            id: String::new(),
            properties: vec![("Name".into(), PropertyValue::from_json(rich(text)))],
        };
        let (a, b) = (unnamed("a"), unnamed("b"));
        assert_ne!(normalize(&a).id, normalize(&b).id);
    }
}
