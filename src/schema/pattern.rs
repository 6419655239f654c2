use super::types::{Item, Pattern};

/// Recognise a manual `UiPattern` hint. Case and surrounding space are ignored.
pub fn pattern_from_hint(hint: &str) -> Option<Pattern> {
    match hint.trim().to_lowercase().as_str() {
        "gallery-story" | "gallery" => Some(Pattern::GalleryStory),
        "color-swatch" | "swatch" => Some(Pattern::ColorSwatch),
        "link-cards" | "links" => Some(Pattern::LinkCards),
        "generic-cards" | "generic" => Some(Pattern::GenericCards),
        _ => None,
    }
}

/// Pick a pattern from the items' content. First matching rule wins:
/// multi-image rows, then colors, then links.
pub fn infer_pattern(items: &[Item]) -> Pattern {
    if items.iter().any(|item| item.images.len() > 1) {
        Pattern::GalleryStory
    } else if items.iter().any(|item| !item.colors.is_empty()) {
        Pattern::ColorSwatch
    } else if items.iter().any(|item| !item.links.is_empty()) {
        Pattern::LinkCards
    } else {
        Pattern::GenericCards
    }
}

/// A recognised manual hint always wins. Without a loaded snapshot the
/// content-agnostic `generic-cards` is used.
pub fn resolve_pattern(hint: &str, snapshot: Option<&[Item]>) -> Pattern {
    if let Some(pattern) = pattern_from_hint(hint) {
        return pattern;
    }
    match snapshot {
        Some(items) => infer_pattern(items),
        None => Pattern::GenericCards,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(images: usize, colors: usize, links: usize) -> Item {
        Item {
            id: "i".into(),
            title: "t".into(),
            images: (0..images).map(|i| format!("https://img/{i}")).collect(),
            colors: (0..colors).map(|_| "#fff".to_string()).collect(),
            links: (0..links).map(|i| format!("https://l/{i}")).collect(),
            ..Item::default()
        }
    }

    #[test]
    fn test_hint_aliases() {
        assert_eq!(pattern_from_hint("gallery"), Some(Pattern::GalleryStory));
        assert_eq!(pattern_from_hint("  Gallery-Story "), Some(Pattern::GalleryStory));
        assert_eq!(pattern_from_hint("SWATCH"), Some(Pattern::ColorSwatch));
        assert_eq!(pattern_from_hint("links"), Some(Pattern::LinkCards));
        assert_eq!(pattern_from_hint("generic"), Some(Pattern::GenericCards));
        assert_eq!(pattern_from_hint("carousel"), None);
        assert_eq!(pattern_from_hint(""), None);
    }

    #[test]
    fn test_manual_hint_beats_content() {
        let rich = vec![item(3, 2, 2)];
        assert_eq!(resolve_pattern("swatch", Some(&rich)), Pattern::ColorSwatch);
        assert_eq!(resolve_pattern("swatch", Some(&[])), Pattern::ColorSwatch);
        assert_eq!(resolve_pattern("swatch", None), Pattern::ColorSwatch);
    }

    #[test]
    fn test_unknown_hint_falls_through_to_inference() {
        let items = vec![item(0, 0, 1)];
        assert_eq!(resolve_pattern("carousel", Some(&items)), Pattern::LinkCards);
    }

    #[test]
    fn test_no_snapshot_defaults_to_generic() {
        assert_eq!(resolve_pattern("", None), Pattern::GenericCards);
    }

    #[test]
    fn test_images_beat_colors_across_items() {
        let items = vec![item(0, 1, 0), item(2, 0, 0)];
        assert_eq!(resolve_pattern("", Some(&items)), Pattern::GalleryStory);
    }

    #[test]
    fn test_single_image_is_not_a_gallery() {
        let items = vec![item(1, 1, 0)];
        assert_eq!(resolve_pattern("", Some(&items)), Pattern::ColorSwatch);
        let items = vec![item(1, 0, 1)];
        assert_eq!(resolve_pattern("", Some(&items)), Pattern::LinkCards);
    }

    #[test]
    fn test_fallback_to_generic() {
        let items = vec![item(1, 0, 0), item(0, 0, 0)];
        assert_eq!(resolve_pattern("", Some(&items)), Pattern::GenericCards);
        assert_eq!(resolve_pattern("", Some(&[])), Pattern::GenericCards);
    }

    #[test]
    fn test_inference_is_deterministic() {
        let items = vec![item(0, 2, 3), item(1, 0, 0)];
        let first = resolve_pattern(" ", Some(&items));
        assert_eq!(first, resolve_pattern(" ", Some(&items)));
        assert_eq!(first, Pattern::ColorSwatch);
    }
}
