use std::fmt::Write;

use tracing::info;

use crate::catalog::ProjectView;
use crate::state::Context;

/// Show a course and the presentation chosen for each project tab
#[poise::command(slash_command, guild_only)]
pub async fn course(
    ctx: Context<'_>,
    #[description = "Course slug"]
    #[autocomplete = "super::autocomplete_course"]
    slug: String,
) -> Result<(), anyhow::Error> {
    ctx.defer().await?;
    let catalog = ctx.data().catalog().await?;

    let Some(course) = catalog.course_by_slug(&slug) else {
        ctx.say(format!("No published course `{}`.", slug)).await?;
        return Ok(());
    };
    let projects = catalog.projects_for(course);

    let (max_items, ttl) = {
        let config = ctx.data().config.read().await;
        (config.max_items as usize, config.cache_ttl())
    };
    let snapshots = ctx
        .data()
        .snapshots
        .load(
            ctx.data().notion.as_ref(),
            projects.iter().filter_map(|p| p.source_database_id.as_deref()),
            ttl,
        )
        .await;

    info!(
        user = ctx.author().name,
        course = %course.slug,
        projects = projects.len(),
        sources = snapshots.len(),
        "course view"
    );

    let mut output = format!("# {}\n", course.name);
    if !course.summary.is_empty() {
        let _ = writeln!(output, "{}", course.summary);
    }
    if let Some(cover) = &course.cover_image {
        let _ = writeln!(output, "[Cover]({})", cover);
    }
    if !course.link.is_empty() {
        let _ = writeln!(output, "Site: {}", course.link);
    }
    output.push('\n');

    if projects.is_empty() {
        output.push_str("No published projects yet.\n");
    }
    for project in &projects {
        let snapshot = project
            .source_database_id
            .as_deref()
            .and_then(|id| snapshots.get(id))
            .map(|s| s.as_ref());
        let view = ProjectView::build(project, snapshot, max_items);
        let status = match snapshot {
            Some(s) if s.error.is_some() => "source DB load failed".to_string(),
            Some(s) => format!("{} item{}", s.items.len(), if s.items.len() == 1 { "" } else { "s" }),
            None => "no source database".to_string(),
        };
        let _ = writeln!(
            output,
            "- **{}** (`{}`) · {} · {}",
            project.tab_name,
            project.tab_slug(),
            view.pattern,
            status
        );
    }

    super::send_chunked(&ctx, &output).await
}
