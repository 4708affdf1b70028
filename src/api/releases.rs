use crate::api::jira::JiraClient;
use crate::api::response::classify;
use crate::api::transport::Transport;
use crate::errors::Result;
use crate::models::release::{select_next_major, ReleaseListing, ReleaseSummary};
use chrono::NaiveDate;

const RELEASE_LISTING_LIMIT: u32 = 100;

impl<T: Transport> JiraClient<T> {
    /// Latest releases of a project, newest release date first.
    pub async fn project_versions(&self, project: &str) -> Result<Vec<ReleaseSummary>> {
        let url = self
            .endpoints
            .api(&format!("project/{}/version", urlencoding::encode(project)));
        let params = [
            ("orderBy", "-releaseDate".to_string()),
            ("maxResults", RELEASE_LISTING_LIMIT.to_string()),
        ];

        let response = self.transport.get(&url, &params).await?;
        let listing: ReleaseListing = serde_json::from_value(classify(response)?)?;
        Ok(listing.values)
    }

    /// Major releases of `project` that have started and are not yet past their release date.
    pub async fn next_major_versions(&self, project: &str, today: NaiveDate) -> Result<Vec<String>> {
        let releases = self.project_versions(project).await?;
        let next = select_next_major(&releases, today);
        if !next.is_empty() {
            tracing::info!(
                "FixVersion(s) with a start date <= {} and release date >= {}: {:?}",
                today,
                today,
                next
            );
        }
        Ok(next)
    }

    pub async fn next_major_versions_today(&self, project: &str) -> Result<Vec<String>> {
        let today = chrono::Local::now().date_naive();
        self.next_major_versions(project, today).await
    }
}
