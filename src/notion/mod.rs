pub mod types;

use std::future::Future;

use anyhow::{Context, Result};
use reqwest::Method;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use types::{DatabaseObject, QueryResponse, RawRecord, SourceDatabase};

const NOTION_API_BASE: &str = "https://api.notion.com/v1";
const DEFAULT_NOTION_VERSION: &str = "2022-06-28";
const PAGE_SIZE: u32 = 100;
/// Upper bound on followed query cursors (5000 rows).
const MAX_QUERY_PAGES: usize = 50;

/// Read and write-back operations the showcase needs from the content store.
pub trait ContentStore {
    /// All rows of the Courses database, unfiltered.
    fn list_courses(&self) -> impl Future<Output = Result<Vec<RawRecord>>> + Send;

    /// All rows of the Projects database, unfiltered.
    fn list_projects(&self) -> impl Future<Output = Result<Vec<RawRecord>>> + Send;

    /// Schema and rows of one project's source database.
    fn fetch_source_database(
        &self,
        database_id: &str,
    ) -> impl Future<Output = Result<SourceDatabase>> + Send;

    /// Set a `url` property on a page.
    fn update_url_property(
        &self,
        page_id: &str,
        property: &str,
        url: &str,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// Drain a paginated query. `fetch` is called with the cursor of the page to
/// load (`None` for the first). Returns the rows and whether
/// [`MAX_QUERY_PAGES`] cut the listing short.
async fn collect_pages<F, Fut>(mut fetch: F) -> Result<(Vec<RawRecord>, bool)>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<QueryResponse>>,
{
    let mut rows = Vec::new();
    let mut cursor = None;
    for _ in 0..MAX_QUERY_PAGES {
        let page = fetch(cursor.take()).await?;
        rows.extend(page.results.into_iter().map(RawRecord::from_page));
        match (page.has_more, page.next_cursor) {
            (true, Some(next)) => cursor = Some(next),
            _ => return Ok((rows, false)),
        }
    }
    Ok((rows, true))
}

pub struct NotionClient {
    client: reqwest::Client,
    api_key: String,
    version: String,
    courses_database_id: String,
    projects_database_id: String,
}

impl NotionClient {
    pub fn from_env() -> Result<Self> {
        let api_key = dotenv::var("NOTION_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .context("NOTION_API_KEY required")?;
        let version = dotenv::var("NOTION_VERSION")
            .unwrap_or_else(|_| DEFAULT_NOTION_VERSION.to_string());
        let courses_database_id = dotenv::var("NOTION_COURSES_DATABASE_ID")
            .context("NOTION_COURSES_DATABASE_ID required")?;
        let projects_database_id = dotenv::var("NOTION_PROJECTS_DATABASE_ID")
            .context("NOTION_PROJECTS_DATABASE_ID required")?;

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_key,
            version,
            courses_database_id,
            projects_database_id,
        })
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, format!("{}/{}", NOTION_API_BASE, path.trim_start_matches('/')))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Notion-Version", &self.version)
    }

    /// Send a request and decode the body, turning non-2xx into an error
    /// carrying the status and response text.
    async fn send<T: DeserializeOwned>(req: reqwest::RequestBuilder) -> Result<T> {
        let resp = req.send().await.context("Notion request failed")?;
        let status = resp.status();
        let text = resp
            .text()
            .await
            .context("Failed to read Notion response")?;
        if !status.is_success() {
            anyhow::bail!("Notion API {}: {}", status.as_u16(), text);
        }
        serde_json::from_str(&text).context("Failed to parse Notion JSON")
    }

    /// Query every row of a database, following pagination cursors.
    pub async fn query_database(&self, database_id: &str) -> Result<Vec<RawRecord>> {
        let path = format!("databases/{}/query", database_id);
        let (rows, truncated) = collect_pages(|cursor| {
            let mut body = serde_json::json!({ "page_size": PAGE_SIZE });
            if let Some(c) = cursor {
                body["start_cursor"] = serde_json::Value::String(c);
            }
            Self::send::<QueryResponse>(self.request(Method::POST, &path).json(&body))
        })
        .await?;

        if truncated {
            warn!(
                database_id,
                rows = rows.len(),
                "database query stopped at page limit"
            );
        } else {
            debug!(database_id, rows = rows.len(), "database query complete");
        }
        Ok(rows)
    }

    pub async fn retrieve_database(&self, database_id: &str) -> Result<DatabaseObject> {
        Self::send(self.request(Method::GET, &format!("databases/{}", database_id))).await
    }
}

impl ContentStore for NotionClient {
    async fn list_courses(&self) -> Result<Vec<RawRecord>> {
        self.query_database(&self.courses_database_id)
            .await
            .context("Failed to list courses")
    }

    async fn list_projects(&self) -> Result<Vec<RawRecord>> {
        self.query_database(&self.projects_database_id)
            .await
            .context("Failed to list projects")
    }

    async fn fetch_source_database(&self, database_id: &str) -> Result<SourceDatabase> {
        let (database, rows) = tokio::try_join!(
            self.retrieve_database(database_id),
            self.query_database(database_id)
        )?;

        let title = database.plain_title();
        Ok(SourceDatabase {
            title: if title.is_empty() {
                "Source Database".to_string()
            } else {
                title
            },
            fields: database.field_schema(),
            rows,
        })
    }

    async fn update_url_property(&self, page_id: &str, property: &str, url: &str) -> Result<()> {
        let mut properties = serde_json::Map::new();
        properties.insert(property.to_string(), serde_json::json!({ "url": url }));
        let body = serde_json::json!({ "properties": properties });
        let _: serde_json::Value =
            Self::send(self.request(Method::PATCH, &format!("pages/{}", page_id)).json(&body))
                .await
                .with_context(|| format!("Failed to update {} on page {}", property, page_id))?;
        debug!(page_id, property, "page property updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::types::PageObject;

    fn page(ids: &[&str], next: Option<&str>) -> QueryResponse {
        QueryResponse {
            results: ids
                .iter()
                .map(|id| PageObject {
                    id: id.to_string(),
                    ..PageObject::default()
                })
                .collect(),
            has_more: next.is_some(),
            next_cursor: next.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_follows_cursors_until_last_page() {
        let mut pages = vec![page(&["r3"], None), page(&["r2"], Some("c2")), page(&["r1"], Some("c1"))];
        let mut cursors = Vec::new();
        let (rows, truncated) = collect_pages(|cursor| {
            cursors.push(cursor);
            let next = pages.pop();
            async move { next.ok_or_else(|| anyhow::anyhow!("no more pages")) }
        })
        .await
        .unwrap();

        let ids: Vec<&str> = rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["r1", "r2", "r3"]);
        assert!(!truncated);
        assert_eq!(cursors, vec![None, Some("c1".to_string()), Some("c2".to_string())]);
    }

    #[tokio::test]
    async fn test_has_more_without_cursor_stops() {
        let mut calls = 0;
        let (rows, truncated) = collect_pages(|_| {
            calls += 1;
            let mut last = page(&["r1"], None);
            last.has_more = true;
            async move { Ok(last) }
        })
        .await
        .unwrap();
        assert_eq!(rows.len(), 1);
        assert!(!truncated);
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn test_stops_at_page_limit() {
        let mut calls = 0;
        let (rows, truncated) = collect_pages(|_| {
            calls += 1;
            let next = page(&["r"], Some("again"));
            async move { Ok(next) }
        })
        .await
        .unwrap();
        assert!(truncated);
        assert_eq!(calls, MAX_QUERY_PAGES);
        assert_eq!(rows.len(), MAX_QUERY_PAGES);
    }

    #[tokio::test]
    async fn test_page_error_propagates() {
        let result = collect_pages(|cursor| async move {
            match cursor {
                None => Ok(page(&["r1"], Some("c1"))),
                Some(_) => Err(anyhow::anyhow!("Notion API 429: rate limited")),
            }
        })
        .await;
        assert!(result.unwrap_err().to_string().contains("429"));
    }
}
