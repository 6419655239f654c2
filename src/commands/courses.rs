use std::fmt::Write;

use crate::state::Context;

/// List published courses
#[poise::command(slash_command, guild_only)]
pub async fn courses(ctx: Context<'_>) -> Result<(), anyhow::Error> {
    ctx.defer().await?;
    let catalog = ctx.data().catalog().await?;

    if catalog.courses.is_empty() {
        ctx.say("No published courses yet.").await?;
        return Ok(());
    }

    let mut output = String::from("**Courses**\n\n");
    for course in &catalog.courses {
        let projects = catalog.projects_for(course).len();
        let _ = writeln!(
            output,
            "**{}** · `{}` ({} project{})",
            course.name,
            course.slug,
            projects,
            if projects == 1 { "" } else { "s" }
        );
        if !course.summary.is_empty() {
            let _ = writeln!(output, "  {}", course.summary);
        }
    }

    super::send_chunked(&ctx, &output).await
}
