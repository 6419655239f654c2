use crate::render::render_fields;
use crate::schema::parse_mapping;
use crate::state::Context;

/// Show detected source fields and the active field mapping of a project
#[poise::command(slash_command, guild_only)]
pub async fn fields(
    ctx: Context<'_>,
    #[description = "Course slug"]
    #[autocomplete = "super::autocomplete_course"]
    course: String,
    #[description = "Project tab"]
    #[autocomplete = "super::autocomplete_tab"]
    tab: String,
) -> Result<(), anyhow::Error> {
    ctx.defer().await?;
    let catalog = ctx.data().catalog().await?;

    let Some(project) = catalog
        .course_by_slug(&course)
        .and_then(|c| catalog.project_by_tab(c, &tab))
    else {
        ctx.say(format!("No project tab `{}` in course `{}`.", tab, course))
            .await?;
        return Ok(());
    };
    let Some(database_id) = project.source_database_id.as_deref() else {
        ctx.say(format!(
            "**{}** has no usable SourceDatabaseId.",
            project.name
        ))
        .await?;
        return Ok(());
    };

    let ttl = ctx.data().config.read().await.cache_ttl();
    let snapshot = ctx
        .data()
        .snapshots
        .load_one(ctx.data().notion.as_ref(), database_id, ttl)
        .await;

    let mut output = format!("## {} · fields\n", project.name);
    if !project.ui_pattern.trim().is_empty() {
        output.push_str(&format!("**UiPattern:** `{}`\n", project.ui_pattern.trim()));
    }
    output.push_str(&render_fields(&snapshot, &parse_mapping(&project.field_mapping)));
    super::send_chunked(&ctx, &output).await
}
