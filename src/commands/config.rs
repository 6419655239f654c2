use tracing::info;

use crate::state::{Context, Setting};

/// Show or change showcase display settings (admin only)
#[poise::command(slash_command, guild_only)]
pub async fn config(
    ctx: Context<'_>,
    #[description = "Setting to change; omit to show all"] setting: Option<Setting>,
    #[description = "New value"] value: Option<u32>,
) -> Result<(), anyhow::Error> {
    if !ctx.data().is_admin(ctx.author().id.get()) {
        ctx.say("This command is admin-only.").await?;
        return Ok(());
    }

    // No config guard may be held across the reply.
    let reply = match (setting, value) {
        (None, _) => ctx.data().config.read().await.to_string(),
        (Some(setting), Some(value)) => {
            let applied = ctx.data().config.write().await.set(setting, value);
            match applied {
                Ok(()) => {
                    info!(user = ctx.author().name, setting = setting.key(), value, "setting changed");
                    format!("`{}` is now {}.", setting.key(), value)
                }
                Err(e) => format!("Not changed: {}", e),
            }
        }
        (Some(setting), None) => format!(
            "`{}` needs a value, e.g. `/showcase config {} 12`.",
            setting.key(),
            setting.key()
        ),
    };
    ctx.say(reply).await?;
    Ok(())
}
