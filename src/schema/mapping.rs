//! Parser for the `FieldMapping` override string.
//!
//! Accepts either a JSON object (`{"image": "Cover Photo"}`) or loose
//! `key: value` pairs separated by commas, semicolons or newlines. Parsing
//! is total; anything unrecognised is dropped and the worst case is an
//! empty [`Mapping`].

use serde_json::Value;

use super::types::{Mapping, Slot};

/// JSON attempt. `None` means "not a JSON object", not an error.
fn parse_json_object(raw: &str) -> Option<Mapping> {
    let Ok(Value::Object(object)) = serde_json::from_str::<Value>(raw) else {
        return None;
    };
    let mut mapping = Mapping::default();
    for (key, value) in object {
        if let (Some(slot), Value::String(field)) = (Slot::from_key(&key), value) {
            mapping.set(slot, field);
        }
    }
    Some(mapping)
}

fn parse_pairs(raw: &str) -> Mapping {
    let mut mapping = Mapping::default();
    for token in raw.split([',', ';', '\n']) {
        let Some((key, value)) = token.split_once(':') else {
            continue;
        };
        let (key, value) = (key.trim(), value.trim());
        if key.is_empty() || value.is_empty() {
            continue;
        }
        if let Some(slot) = Slot::from_key(key) {
            mapping.set(slot, value.to_string());
        }
    }
    mapping
}

pub fn parse_mapping(raw: &str) -> Mapping {
    let raw = raw.trim();
    if raw.is_empty() {
        return Mapping::default();
    }
    parse_json_object(raw).unwrap_or_else(|| parse_pairs(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(pairs: &[(Slot, &str)]) -> Mapping {
        let mut m = Mapping::default();
        for (slot, field) in pairs {
            m.set(*slot, field.to_string());
        }
        m
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_mapping("").is_empty());
        assert!(parse_mapping("   \n ").is_empty());
    }

    #[test]
    fn test_json_object() {
        let m = parse_mapping(r#"{"image":"Cover Photo","color":"Palette"}"#);
        assert_eq!(m, mapping(&[(Slot::Image, "Cover Photo"), (Slot::Color, "Palette")]));
    }

    #[test]
    fn test_json_ignores_unknown_keys_and_non_strings() {
        let m = parse_mapping(r#"{"title": "Name", "subtitle": "Sub", "link": 5, "text": null}"#);
        assert_eq!(m, mapping(&[(Slot::Title, "Name")]));
    }

    #[test]
    fn test_json_round_trip() {
        let original = mapping(&[
            (Slot::Title, "Name"),
            (Slot::Text, "Desc: long"),
            (Slot::Gallery, "Shots, misc"),
            (Slot::Link, "Repo"),
        ]);
        let json = serde_json::to_string(&original).unwrap();
        assert_eq!(parse_mapping(&json), original);
    }

    #[test]
    fn test_delimited_pairs() {
        assert_eq!(
            parse_mapping("title:Name, text:Desc"),
            mapping(&[(Slot::Title, "Name"), (Slot::Text, "Desc")])
        );
        assert_eq!(
            parse_mapping("image : Cover Photo;\ngallery:Shots\nlink: https://x.y/z"),
            mapping(&[
                (Slot::Image, "Cover Photo"),
                (Slot::Gallery, "Shots"),
                (Slot::Link, "https://x.y/z"),
            ])
        );
    }

    #[test]
    fn test_tokens_without_colon_are_dropped() {
        assert!(parse_mapping("not json, no colon here").is_empty());
        assert_eq!(
            parse_mapping("garbage, color:Palette, :empty, title:"),
            mapping(&[(Slot::Color, "Palette")])
        );
    }

    #[test]
    fn test_non_object_json_falls_back_to_pairs() {
        assert!(parse_mapping("[1, 2]").is_empty());
        // The pair grammar sees `"title` as the key, which is no slot.
        assert!(parse_mapping("\"title:Name\"").is_empty());
        assert!(parse_mapping("null").is_empty());
    }
}
