use std::fmt::Write;

use tracing::info;

use crate::state::Context;

/// Drop cached catalog and source snapshots (admin only)
#[poise::command(slash_command, guild_only)]
pub async fn refresh(ctx: Context<'_>) -> Result<(), anyhow::Error> {
    if !ctx.data().is_admin(ctx.author().id.get()) {
        ctx.say("This command is admin-only.").await?;
        return Ok(());
    }

    let dropped = ctx.data().invalidate().await;
    info!(user = ctx.author().name, dropped, "caches refreshed");
    ctx.say(format!(
        "Cache cleared ({} source snapshot{} dropped). Next view reloads from Notion.",
        dropped,
        if dropped == 1 { "" } else { "s" }
    ))
    .await?;
    Ok(())
}

/// Write each published course's public URL back to Notion (admin only)
#[poise::command(slash_command, guild_only)]
pub async fn publish(ctx: Context<'_>) -> Result<(), anyhow::Error> {
    if !ctx.data().is_admin(ctx.author().id.get()) {
        ctx.say("This command is admin-only.").await?;
        return Ok(());
    }
    let Some(base) = ctx.data().site_base_url.clone() else {
        ctx.say("`SITE_BASE_URL` is not configured.").await?;
        return Ok(());
    };

    ctx.defer().await?;
    let catalog = ctx.data().catalog().await?;
    let report = catalog
        .publish_links(ctx.data().notion.as_ref(), &base)
        .await;
    info!(
        user = ctx.author().name,
        updated = report.updated,
        unchanged = report.unchanged,
        failed = report.failed.len(),
        "course links published"
    );

    let mut output = format!(
        "**Course links:** {} updated, {} already current, {} failed.\n",
        report.updated,
        report.unchanged,
        report.failed.len()
    );
    for (name, error) in &report.failed {
        let _ = writeln!(output, "- **{}**: {}", name, error);
    }
    if report.updated > 0 {
        // Cached catalog still holds the old links.
        ctx.data().invalidate().await;
    }

    super::send_chunked(&ctx, &output).await
}
