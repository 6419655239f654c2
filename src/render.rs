//! Turns a resolved pattern and mapped items into Discord message text.
//!
//! One variant function per [`Pattern`]; the dispatcher handles the empty
//! and failed-fetch cases before any variant sees the items.

use std::fmt::Write;

use crate::catalog::loader::SourceSnapshot;
use crate::schema::{MappedItem, Mapping, Pattern};

pub const EMPTY_NOTICE: &str = "No source content available for this project yet.";
const SWATCH_LIMIT: usize = 12;
const SWATCH_PANEL_ITEMS: usize = 4;
const LINKS_PER_CARD: usize = 3;

fn link_label(url: &str) -> &str {
    url.trim_end_matches('/')
        .rsplit('/')
        .find(|s| !s.is_empty())
        .unwrap_or(url)
}

fn gallery_story(out: &mut String, items: &[MappedItem]) {
    let first = &items[0];
    if let Some(cover) = first.images.first() {
        let _ = writeln!(out, "[Cover]({})", cover);
    }
    let insight = if first.text.is_empty() {
        "No summary available."
    } else {
        first.text.as_str()
    };
    let _ = writeln!(out, "> {}\n", insight);
    for item in items {
        let _ = write!(out, "**{}**", item.title);
        if let Some(image) = item.images.first() {
            let _ = write!(out, " · [image]({})", image);
        }
        if item.images.len() > 1 {
            let _ = write!(out, " (+{} more)", item.images.len() - 1);
        }
        out.push('\n');
        if !item.text.is_empty() {
            let _ = writeln!(out, "{}", item.text);
        }
    }
}

fn color_swatch(out: &mut String, items: &[MappedItem]) {
    let chips: Vec<String> = items
        .iter()
        .flat_map(|item| item.colors.iter())
        .take(SWATCH_LIMIT)
        .map(|color| format!("`{}`", color))
        .collect();
    if !chips.is_empty() {
        let _ = writeln!(out, "{}\n", chips.join(" "));
    }
    for item in items.iter().take(SWATCH_PANEL_ITEMS) {
        let _ = writeln!(out, "**{}**", item.title);
        if !item.text.is_empty() {
            let _ = writeln!(out, "{}", item.text);
        }
    }
}

fn link_cards(out: &mut String, items: &[MappedItem]) {
    for item in items {
        let _ = writeln!(out, "**{}**", item.title);
        if !item.text.is_empty() {
            let _ = writeln!(out, "{}", item.text);
        }
        let links: Vec<String> = item
            .links
            .iter()
            .take(LINKS_PER_CARD)
            .map(|url| format!("[{}]({})", link_label(url), url))
            .collect();
        if !links.is_empty() {
            let _ = writeln!(out, "{}", links.join(" · "));
        }
        out.push('\n');
    }
}

fn generic_cards(out: &mut String, items: &[MappedItem]) {
    for item in items {
        let _ = writeln!(out, "**{}**", item.title);
        if !item.text.is_empty() {
            let _ = writeln!(out, "{}", item.text);
        }
        let mut meta = Vec::new();
        if let Some(image) = item.images.first() {
            meta.push(format!("[image]({})", image));
        }
        if let Some(link) = item.links.first() {
            meta.push(format!("[Reference link]({})", link));
        }
        if let Some(color) = item.colors.first() {
            meta.push(format!("`{}`", color));
        }
        if !meta.is_empty() {
            let _ = writeln!(out, "{}", meta.join(" · "));
        }
        out.push('\n');
    }
}

/// Render one project section.
pub fn render_project(
    project_title: &str,
    pattern: Pattern,
    snapshot: Option<&SourceSnapshot>,
    items: &[MappedItem],
) -> String {
    let mut out = format!("## {}\n*pattern: {}*\n", project_title, pattern);

    if let Some(error) = snapshot.and_then(|s| s.error.as_deref()) {
        let _ = writeln!(out, "Source DB load failed: {}", error);
        return out;
    }
    if items.is_empty() {
        out.push_str(EMPTY_NOTICE);
        out.push('\n');
        return out;
    }

    out.push('\n');
    match pattern {
        Pattern::GalleryStory => gallery_story(&mut out, items),
        Pattern::ColorSwatch => color_swatch(&mut out, items),
        Pattern::LinkCards => link_cards(&mut out, items),
        Pattern::GenericCards => generic_cards(&mut out, items),
    }
    out
}

/// Detected schema and active mapping, for diagnosing a project's source.
pub fn render_fields(snapshot: &SourceSnapshot, mapping: &Mapping) -> String {
    let mut out = format!(
        "**Source:** {} (`{}`)\n",
        if snapshot.title.is_empty() { "unknown" } else { snapshot.title.as_str() },
        snapshot.database_id
    );
    if let Some(error) = &snapshot.error {
        let _ = writeln!(out, "Source DB load failed: {}", error);
    }

    if snapshot.fields.is_empty() {
        out.push_str("No fields detected.\n");
    } else {
        out.push_str("**Fields:**\n");
        for field in &snapshot.fields {
            let _ = writeln!(out, "- {} ({})", field.name, field.kind);
        }
    }

    if mapping.is_empty() {
        out.push_str("**Mapping:** none (automatic)\n");
    } else {
        out.push_str("**Mapping:**\n");
        for (slot, field) in mapping.entries() {
            let known = snapshot.fields.iter().any(|f| f.name == field);
            let _ = writeln!(
                out,
                "- {} → {}{}",
                slot.key(),
                field,
                if known { "" } else { " (not in schema)" }
            );
        }
    }
    let _ = writeln!(out, "**Rows:** {}", snapshot.items.len());
    out
}
