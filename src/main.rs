mod catalog;
mod commands;
mod notion;
mod render;
mod schema;
mod state;

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Context as _;
use poise::serenity_prelude as serenity;
use poise::{Framework, FrameworkOptions};
use tracing::{error, info, warn, Level};

use notion::NotionClient;
use state::AppState;

type Command = poise::Command<AppState, anyhow::Error>;

/// Discord user ids from a comma separated list. Junk entries are skipped.
fn parse_admin_ids(raw: &str) -> HashSet<u64> {
    raw.split(',')
        .filter_map(|s| s.trim().parse::<u64>().ok())
        .collect()
}

/// Public site root without a trailing slash; blank means unset.
fn parse_site_base_url(raw: &str) -> Option<String> {
    let url = raw.trim().trim_end_matches('/');
    (!url.is_empty()).then(|| url.to_string())
}

/// Guild registration is instant; global registration can take up to an hour.
async fn register_commands(
    ctx: &serenity::Context,
    commands: &[Command],
    guild_id: Option<serenity::GuildId>,
) -> Result<(), serenity::Error> {
    let names: Vec<String> = commands
        .iter()
        .flat_map(|cmd| {
            std::iter::once(format!("/{}", cmd.name)).chain(
                cmd.subcommands
                    .iter()
                    .map(move |sub| format!("/{} {}", cmd.name, sub.name)),
            )
        })
        .collect();

    match guild_id {
        Some(gid) => {
            info!(guild = %gid, commands = ?names, "registering guild commands");
            poise::builtins::register_in_guild(ctx, commands, gid).await
        }
        None => {
            info!(commands = ?names, "registering global commands");
            poise::builtins::register_globally(ctx, commands).await
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .init();

    let _ = dotenv::dotenv();
    let token = dotenv::var("DISCORD_TOKEN").context("DISCORD_TOKEN required")?;
    let guild_id = dotenv::var("DISCORD_GUILD_ID")
        .ok()
        .and_then(|s| s.trim().parse::<u64>().ok())
        .map(serenity::GuildId::new);

    let notion = Arc::new(NotionClient::from_env()?);
    let admin_ids = parse_admin_ids(&dotenv::var("ADMIN_USER_IDS").unwrap_or_default());
    let site_base_url = parse_site_base_url(&dotenv::var("SITE_BASE_URL").unwrap_or_default());
    if admin_ids.is_empty() {
        warn!("ADMIN_USER_IDS empty, admin subcommands will refuse everyone");
    }
    if site_base_url.is_none() {
        warn!("SITE_BASE_URL unset, /showcase publish is disabled");
    }
    info!(
        admins = admin_ids.len(),
        site = site_base_url.as_deref().unwrap_or("-"),
        "showcase configured"
    );

    let app_state = AppState::new(notion, site_base_url, admin_ids);

    let framework = Framework::builder()
        .options(FrameworkOptions {
            commands: vec![commands::showcase()],
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!(user = %ready.user.name, id = %ready.user.id, "connected to Discord");
                register_commands(ctx, &framework.options().commands, guild_id).await?;
                Ok(app_state)
            })
        })
        .build();

    let mut client = serenity::ClientBuilder::new(&token, serenity::GatewayIntents::GUILDS)
        .framework(framework)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create client: {}", e))?;

    if let Err(e) = client.start().await {
        error!("Client error: {}", e);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_admin_ids_skips_junk() {
        let ids = parse_admin_ids(" 123, abc,,456 ,-1");
        assert_eq!(ids, HashSet::from([123, 456]));
        assert!(parse_admin_ids("").is_empty());
    }

    #[test]
    fn test_parse_site_base_url() {
        assert_eq!(
            parse_site_base_url(" https://show.example/ ").as_deref(),
            Some("https://show.example")
        );
        assert_eq!(parse_site_base_url("  "), None);
        assert_eq!(parse_site_base_url("/"), None);
    }
}
