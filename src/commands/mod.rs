mod config;
mod course;
mod courses;
mod fields;
mod manage;
mod project;

use crate::state::Context;

/// Course portfolio showcase
#[poise::command(
    slash_command,
    subcommands(
        "courses::courses",
        "course::course",
        "project::project",
        "fields::fields",
        "manage::refresh",
        "manage::publish",
        "config::config"
    )
)]
pub async fn showcase(_ctx: Context<'_>) -> Result<(), anyhow::Error> {
    Ok(())
}

/// Discord rejects messages over 2000 characters.
const CHUNK_LIMIT: usize = 1990;

/// Split `text` into pieces of at most `max` bytes, breaking after the last
/// newline (else space) that fits and never inside a character.
pub(crate) fn split_chunks(text: &str, max: usize) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut remaining = text;
    while !remaining.is_empty() {
        let mut chunk_len = remaining.len().min(max);
        while !remaining.is_char_boundary(chunk_len) {
            chunk_len -= 1;
        }
        if chunk_len == 0 {
            // A single character wider than `max` still has to go out whole.
            chunk_len = remaining.chars().next().map_or(remaining.len(), char::len_utf8);
        }
        let split_at = if chunk_len < remaining.len() {
            remaining[..chunk_len]
                .rfind('\n')
                .or_else(|| remaining[..chunk_len].rfind(' '))
                .map(|i| i + 1)
                .unwrap_or(chunk_len)
        } else {
            chunk_len
        };
        let (chunk, rest) = remaining.split_at(split_at);
        chunks.push(chunk);
        remaining = rest;
    }
    chunks
}

/// Send a message in Discord-safe chunks.
/// Uses ctx.say() for all chunks so follow-ups go through the interaction
/// webhook, which doesn't require Send Messages channel permission.
pub(crate) async fn send_chunked(ctx: &Context<'_>, text: &str) -> Result<(), anyhow::Error> {
    for chunk in split_chunks(text, CHUNK_LIMIT) {
        ctx.say(chunk).await?;
    }
    Ok(())
}

/// Autocomplete for published course slugs.
async fn autocomplete_course(ctx: Context<'_>, partial: &str) -> Vec<String> {
    let Ok(catalog) = ctx.data().catalog().await else {
        return Vec::new();
    };
    let partial = partial.to_lowercase();

    catalog
        .courses
        .iter()
        .map(|c| c.slug.clone())
        .filter(|slug| slug.to_lowercase().contains(&partial))
        .take(25)
        .collect()
}

/// Autocomplete for project tabs across published courses.
async fn autocomplete_tab(ctx: Context<'_>, partial: &str) -> Vec<String> {
    let Ok(catalog) = ctx.data().catalog().await else {
        return Vec::new();
    };
    let partial = partial.to_lowercase();
    let mut tabs: Vec<String> = catalog
        .projects
        .iter()
        .map(|p| p.tab_slug())
        .filter(|tab| tab.contains(&partial))
        .collect();
    tabs.sort();
    tabs.dedup();
    tabs.truncate(25);
    tabs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_limit_is_one_chunk() {
        let text = "a".repeat(CHUNK_LIMIT);
        assert_eq!(split_chunks(&text, CHUNK_LIMIT), vec![text.as_str()]);
        assert!(split_chunks("", CHUNK_LIMIT).is_empty());
    }

    #[test]
    fn test_text_without_spaces_is_cut_at_limit() {
        let text = "a".repeat(CHUNK_LIMIT + 1);
        let chunks = split_chunks(&text, CHUNK_LIMIT);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].len(), CHUNK_LIMIT);
        assert_eq!(chunks[1], "a");
    }

    #[test]
    fn test_multibyte_char_straddling_limit_moves_to_next_chunk() {
        let text = format!("{}éb", "a".repeat(CHUNK_LIMIT - 1));
        let chunks = split_chunks(&text, CHUNK_LIMIT);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].len(), CHUNK_LIMIT - 1);
        assert_eq!(chunks[1], "éb");
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn test_prefers_newline_then_space() {
        assert_eq!(
            split_chunks("line one\nline two", 12),
            vec!["line one\n", "line two"]
        );
        assert_eq!(split_chunks("alpha beta gamma", 12), vec!["alpha beta ", "gamma"]);
    }

    #[test]
    fn test_char_wider_than_limit_still_progresses() {
        assert_eq!(split_chunks("éé", 1), vec!["é", "é"]);
    }

    #[test]
    fn test_every_chunk_within_limit() {
        let text = "Grüße aus Taipei, ".repeat(400);
        let chunks = split_chunks(&text, CHUNK_LIMIT);
        assert!(chunks.iter().all(|c| c.len() <= CHUNK_LIMIT));
        assert_eq!(chunks.concat(), text);
    }
}
