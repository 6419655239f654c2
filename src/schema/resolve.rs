use std::collections::HashSet;

use super::types::{CanonicalField, Item, MappedItem, Mapping, Slot};

pub const MAPPED_MAX_IMAGES: usize = 10;
pub const MAPPED_MAX_LINKS: usize = 8;
pub const MAPPED_MAX_COLORS: usize = 10;

fn mapped_field<'a>(item: &'a Item, mapping: &Mapping, slot: Slot) -> Option<&'a CanonicalField> {
    mapping.get(slot).and_then(|name| item.fields.get(name))
}

/// Concatenate sources in priority order, keep first occurrences, cap.
fn merge_channel<'a>(sources: impl IntoIterator<Item = &'a [String]>, cap: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    sources
        .into_iter()
        .flatten()
        .filter(|value| seen.insert(*value))
        .take(cap)
        .cloned()
        .collect()
}

const NONE: &[String] = &[];

fn mapped_text(field: Option<&CanonicalField>, fallback: &str) -> String {
    field
        .map(|f| f.text.as_str())
        .filter(|text| !text.is_empty())
        .unwrap_or(fallback)
        .to_string()
}

/// Project an item through a mapping. Mapped fields come first in every
/// list channel; the item's own aggregate follows so nothing it found is lost.
pub fn resolve_item(item: &Item, mapping: &Mapping) -> MappedItem {
    let title = mapped_field(item, mapping, Slot::Title);
    let text = mapped_field(item, mapping, Slot::Text);
    let image = mapped_field(item, mapping, Slot::Image);
    let gallery = mapped_field(item, mapping, Slot::Gallery);
    let link = mapped_field(item, mapping, Slot::Link);
    let color = mapped_field(item, mapping, Slot::Color);

    MappedItem {
        title: mapped_text(title, &item.title),
        text: mapped_text(text, &item.text),
        images: merge_channel(
            [
                gallery.map_or(NONE, |f| f.images.as_slice()),
                image.map_or(NONE, |f| f.images.as_slice()),
                item.images.as_slice(),
            ],
            MAPPED_MAX_IMAGES,
        ),
        links: merge_channel(
            [link.map_or(NONE, |f| f.links.as_slice()), item.links.as_slice()],
            MAPPED_MAX_LINKS,
        ),
        colors: merge_channel(
            [color.map_or(NONE, |f| f.colors.as_slice()), item.colors.as_slice()],
            MAPPED_MAX_COLORS,
        ),
    }
}

/// Resolve up to `limit` items in snapshot order.
pub fn resolve_items(items: &[Item], mapping: &Mapping, limit: usize) -> Vec<MappedItem> {
    items
        .iter()
        .take(limit)
        .map(|item| resolve_item(item, mapping))
        .collect()
}
