pub mod loader;

use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::notion::types::RawRecord;
use crate::notion::ContentStore;
use crate::schema::property::{read_files, read_text, relation_ids};
use crate::schema::{parse_mapping, resolve_items, resolve_pattern, MappedItem, Mapping, Pattern};
use loader::SourceSnapshot;

/// A Notion id in plain (32 hex) or dashed UUID form.
static NOTION_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}|[0-9a-fA-F]{32,}",
    )
    .expect("valid notion id pattern")
});

/// Pull a clean database id out of a free-text `SourceDatabaseId` cell.
///
/// Only the first comma/whitespace separated token is considered. It may be
/// a bare id, a dashed UUID or a share URL such as
/// `https://www.notion.so/ws/Moodboard-<id>?v=<view>`; the first id wins.
/// Returned lowercase without dashes.
pub fn extract_database_id(raw: &str) -> Option<String> {
    let token = raw
        .split(|c: char| c == ',' || c.is_whitespace())
        .find(|t| !t.is_empty())?;

    let bytes = token.as_bytes();
    let hex_at = |i: usize| bytes.get(i).is_some_and(u8::is_ascii_hexdigit);
    NOTION_ID.find_iter(token).find_map(|m| {
        // Ids glued to more hex are part of something else (hashes, tokens).
        let embedded = (m.start() > 0 && hex_at(m.start() - 1)) || hex_at(m.end());
        let id: String = m.as_str().chars().filter(|c| *c != '-').collect();
        (!embedded && id.len() == 32).then(|| id.to_lowercase())
    })
}

pub fn is_published(status: &str) -> bool {
    status.trim().eq_ignore_ascii_case("published")
}

fn text_of(record: &RawRecord, name: &str) -> String {
    record.get(name).map(read_text).unwrap_or_default()
}

fn order_of(record: &RawRecord) -> Option<f64> {
    text_of(record, "Order").trim().parse().ok()
}

fn ids_of(record: &RawRecord, name: &str) -> Vec<String> {
    record.get(name).map(relation_ids).unwrap_or_default()
}

/// Slug from a display name: lowercase alphanumerics joined by `-`.
pub fn slugify(name: &str) -> String {
    name.split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Course {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub summary: String,
    pub cover_image: Option<String>,
    pub status: String,
    pub order: Option<f64>,
    pub project_ids: Vec<String>,
    pub link: String,
}

impl Course {
    pub fn from_record(record: &RawRecord) -> Self {
        let name = text_of(record, "CourseName");
        let name = if name.is_empty() {
            crate::schema::normalize(record).title
        } else {
            name
        };
        let slug = match text_of(record, "Slug").trim() {
            "" => slugify(&name),
            explicit => explicit.to_string(),
        };
        Self {
            id: record.id.clone(),
            slug,
            summary: text_of(record, "CourseSummary"),
            cover_image: record
                .get("CoverImage")
                .and_then(|prop| read_files(prop).into_iter().next()),
            status: text_of(record, "Status"),
            order: order_of(record),
            project_ids: ids_of(record, "Projects"),
            link: text_of(record, COURSE_LINK_PROPERTY),
            name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub tab_name: String,
    pub order: Option<f64>,
    pub status: String,
    pub course_ids: Vec<String>,
    pub source_database_id: Option<String>,
    /// Manual pattern hint; empty means infer.
    pub ui_pattern: String,
    /// Raw override string for the mapping parser.
    pub field_mapping: String,
}

impl Project {
    pub fn from_record(record: &RawRecord) -> Self {
        let name = text_of(record, "ProjectName");
        let name = if name.is_empty() {
            crate::schema::normalize(record).title
        } else {
            name
        };
        let tab_name = match text_of(record, "TabName").trim() {
            "" => name.clone(),
            tab => tab.to_string(),
        };
        Self {
            id: record.id.clone(),
            tab_name,
            order: order_of(record),
            status: text_of(record, "Status"),
            course_ids: ids_of(record, "Course"),
            source_database_id: extract_database_id(&text_of(record, "SourceDatabaseId")),
            ui_pattern: text_of(record, "UiPattern"),
            field_mapping: text_of(record, "FieldMapping"),
            name,
        }
    }

    /// Tab slug used to address the project within its course.
    pub fn tab_slug(&self) -> String {
        slugify(&self.tab_name)
    }
}

fn by_order_then_name(a_order: Option<f64>, a_name: &str, b_order: Option<f64>, b_name: &str) -> std::cmp::Ordering {
    let a = a_order.unwrap_or(f64::MAX);
    let b = b_order.unwrap_or(f64::MAX);
    a.total_cmp(&b).then_with(|| a_name.cmp(b_name))
}

/// Published courses and projects, as one consistent listing.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub courses: Vec<Course>,
    pub projects: Vec<Project>,
}

impl Catalog {
    pub fn from_records(courses: &[RawRecord], projects: &[RawRecord]) -> Self {
        let mut courses: Vec<Course> = courses
            .iter()
            .map(Course::from_record)
            .filter(|c| is_published(&c.status))
            .collect();
        courses.sort_by(|a, b| by_order_then_name(a.order, &a.name, b.order, &b.name));

        let projects: Vec<Project> = projects
            .iter()
            .map(Project::from_record)
            .filter(|p| is_published(&p.status))
            .collect();

        Self { courses, projects }
    }

    /// Fetch both listings concurrently and keep published rows only.
    pub async fn load<S: ContentStore>(store: &S) -> Result<Self> {
        let (courses, projects) = tokio::try_join!(store.list_courses(), store.list_projects())?;
        let catalog = Self::from_records(&courses, &projects);
        info!(
            courses = catalog.courses.len(),
            projects = catalog.projects.len(),
            hidden = courses.len() + projects.len() - catalog.courses.len() - catalog.projects.len(),
            "catalog loaded"
        );
        Ok(catalog)
    }

    /// Match by slug (case-insensitive) or page id.
    pub fn course_by_slug(&self, slug: &str) -> Option<&Course> {
        let slug = slug.trim();
        self.courses
            .iter()
            .find(|c| c.slug.eq_ignore_ascii_case(slug) || c.id == slug)
    }

    /// Projects linked to the course from either side of the relation.
    pub fn projects_for(&self, course: &Course) -> Vec<&Project> {
        let mut projects: Vec<&Project> = self
            .projects
            .iter()
            .filter(|p| p.course_ids.contains(&course.id) || course.project_ids.contains(&p.id))
            .collect();
        projects.sort_by(|a, b| by_order_then_name(a.order, &a.name, b.order, &b.name));
        debug!(course = %course.slug, projects = projects.len(), "projects resolved");
        projects
    }

    /// Match a project of the course by tab slug, tab name or page id.
    pub fn project_by_tab(&self, course: &Course, tab: &str) -> Option<&Project> {
        let tab = tab.trim();
        let wanted = slugify(tab);
        self.projects_for(course).into_iter().find(|p| {
            p.tab_slug() == wanted || p.tab_name.eq_ignore_ascii_case(tab) || p.id == tab
        })
    }
}

/// Property on the Courses database holding the public course page URL.
pub const COURSE_LINK_PROPERTY: &str = "CourseLink";

/// Public page URL of a course on the showcase site.
pub fn course_link(site_base_url: &str, slug: &str) -> String {
    format!("{}/courses/{}", site_base_url.trim().trim_end_matches('/'), slug)
}

/// Outcome of writing course links back to the store.
#[derive(Debug, Default, PartialEq)]
pub struct PublishReport {
    pub updated: usize,
    pub unchanged: usize,
    /// Course name and error message per failed update.
    pub failed: Vec<(String, String)>,
}

impl Catalog {
    /// Write `CourseLink` on every published course whose link is out of date.
    /// A failed update is recorded and the remaining courses still go out.
    pub async fn publish_links<S: ContentStore>(
        &self,
        store: &S,
        site_base_url: &str,
    ) -> PublishReport {
        let mut report = PublishReport::default();
        for course in &self.courses {
            let url = course_link(site_base_url, &course.slug);
            if course.link == url {
                report.unchanged += 1;
                continue;
            }
            match store
                .update_url_property(&course.id, COURSE_LINK_PROPERTY, &url)
                .await
            {
                Ok(()) => {
                    info!(course = %course.slug, url = %url, "course link published");
                    report.updated += 1;
                }
                Err(e) => {
                    warn!(course = %course.slug, error = %e, "course link update failed");
                    report.failed.push((course.name.clone(), format!("{:#}", e)));
                }
            }
        }
        report
    }
}

/// Everything the renderer needs for one project tab.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectView {
    pub pattern: Pattern,
    pub mapping: Mapping,
    pub items: Vec<MappedItem>,
}

impl ProjectView {
    /// Resolve pattern and mapped items for a project. `None` means the
    /// source has not been loaded (or the project names none).
    pub fn build(project: &Project, snapshot: Option<&SourceSnapshot>, limit: usize) -> Self {
        let mapping = parse_mapping(&project.field_mapping);
        let items = snapshot.map(|s| s.items.as_slice());
        let pattern = resolve_pattern(&project.ui_pattern, items);
        let items = resolve_items(items.unwrap_or_default(), &mapping, limit);
        Self {
            pattern,
            mapping,
            items,
        }
    }
}
