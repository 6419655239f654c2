use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Placeholder title for records where nothing title-like resolves.
pub const UNTITLED: &str = "Untitled";

/// What one source field contributes to each display channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalField {
    pub text: String,
    pub images: Vec<String>,
    pub links: Vec<String>,
    pub colors: Vec<String>,
}

/// A normalized source-database row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    /// Never empty; falls back to [`UNTITLED`].
    pub title: String,
    pub text: String,
    pub images: Vec<String>,
    pub links: Vec<String>,
    pub colors: Vec<String>,
    /// Per-field breakdown keyed by original field name.
    pub fields: BTreeMap<String, CanonicalField>,
}

/// A canonical display slot that a source field can be mapped onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Title,
    Text,
    Image,
    Gallery,
    Link,
    Color,
}

impl Slot {
    pub const ALL: [Slot; 6] = [
        Slot::Title,
        Slot::Text,
        Slot::Image,
        Slot::Gallery,
        Slot::Link,
        Slot::Color,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Slot::Title => "title",
            Slot::Text => "text",
            Slot::Image => "image",
            Slot::Gallery => "gallery",
            Slot::Link => "link",
            Slot::Color => "color",
        }
    }

    pub fn from_key(key: &str) -> Option<Slot> {
        Slot::ALL.into_iter().find(|slot| slot.key() == key)
    }
}

/// Caller-declared redirection from canonical slot to source field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mapping {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gallery: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Mapping {
    pub fn get(&self, slot: Slot) -> Option<&str> {
        let field = match slot {
            Slot::Title => &self.title,
            Slot::Text => &self.text,
            Slot::Image => &self.image,
            Slot::Gallery => &self.gallery,
            Slot::Link => &self.link,
            Slot::Color => &self.color,
        };
        field.as_deref()
    }

    pub fn set(&mut self, slot: Slot, field_name: String) {
        let field = match slot {
            Slot::Title => &mut self.title,
            Slot::Text => &mut self.text,
            Slot::Image => &mut self.image,
            Slot::Gallery => &mut self.gallery,
            Slot::Link => &mut self.link,
            Slot::Color => &mut self.color,
        };
        *field = Some(field_name);
    }

    pub fn is_empty(&self) -> bool {
        Slot::ALL.into_iter().all(|slot| self.get(slot).is_none())
    }

    /// Declared `(slot, field)` pairs in slot order.
    pub fn entries(&self) -> impl Iterator<Item = (Slot, &str)> + '_ {
        Slot::ALL
            .into_iter()
            .filter_map(move |slot| self.get(slot).map(|field| (slot, field)))
    }
}

/// Presentation archetype chosen once per project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Pattern {
    GalleryStory,
    ColorSwatch,
    LinkCards,
    GenericCards,
}

impl Pattern {
    pub fn as_str(self) -> &'static str {
        match self {
            Pattern::GalleryStory => "gallery-story",
            Pattern::ColorSwatch => "color-swatch",
            Pattern::LinkCards => "link-cards",
            Pattern::GenericCards => "generic-cards",
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display-ready projection of one [`Item`] through a [`Mapping`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappedItem {
    pub title: String,
    pub text: String,
    pub images: Vec<String>,
    pub links: Vec<String>,
    pub colors: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_keys_round_trip() {
        for slot in Slot::ALL {
            assert_eq!(Slot::from_key(slot.key()), Some(slot));
        }
        assert_eq!(Slot::from_key("Title"), None);
    }

    #[test]
    fn test_mapping_entries_follow_slot_order() {
        let mut mapping = Mapping::default();
        assert!(mapping.is_empty());
        mapping.set(Slot::Color, "Palette".into());
        mapping.set(Slot::Title, "Name".into());
        let entries: Vec<_> = mapping.entries().collect();
        assert_eq!(entries, vec![(Slot::Title, "Name"), (Slot::Color, "Palette")]);
    }

    #[test]
    fn test_pattern_serializes_kebab_case() {
        let json = serde_json::to_string(&Pattern::ColorSwatch).unwrap();
        assert_eq!(json, "\"color-swatch\"");
        assert_eq!(Pattern::LinkCards.to_string(), "link-cards");
    }
}
