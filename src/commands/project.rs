use tracing::info;

use crate::catalog::ProjectView;
use crate::render::render_project;
use crate::state::Context;

/// Render one project tab of a course
#[poise::command(slash_command, guild_only)]
pub async fn project(
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

    let Some(found_course) = catalog.course_by_slug(&course) else {
        ctx.say(format!("No published course `{}`.", course)).await?;
        return Ok(());
    };
    let Some(found) = catalog.project_by_tab(found_course, &tab) else {
        ctx.say(format!("Course `{}` has no project tab `{}`.", found_course.slug, tab))
            .await?;
        return Ok(());
    };

    let (max_items, ttl) = {
        let config = ctx.data().config.read().await;
        (config.max_items as usize, config.cache_ttl())
    };
    let snapshot = match found.source_database_id.as_deref() {
        Some(id) => Some(
            ctx.data()
                .snapshots
                .load_one(ctx.data().notion.as_ref(), id, ttl)
                .await,
        ),
        None => None,
    };
    let snapshot = snapshot.as_deref();

    let view = ProjectView::build(found, snapshot, max_items);
    info!(
        user = ctx.author().name,
        course = %found_course.slug,
        tab = %found.tab_slug(),
        pattern = %view.pattern,
        items = view.items.len(),
        "project view"
    );

    let output = render_project(&found.name, view.pattern, snapshot, &view.items);
    super::send_chunked(&ctx, &output).await
}
