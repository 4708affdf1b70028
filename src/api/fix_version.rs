use crate::api::jira::{FieldProjection, JiraClient};
use crate::api::jql;
use crate::api::response::classify;
use crate::api::transport::Transport;
use crate::errors::{Result, TrackerError};
use crate::models::fix_version::{FixVersion, VersionDetail};
use crate::models::ticket::Ticket;

impl<T: Transport> JiraClient<T> {
    /// Tracker id of a release, read off one ticket that carries it.
    pub async fn fix_version_id(&self, name: &str) -> Result<String> {
        let query = self
            .query(format!(
                "fixVersion = {} AND project = {}",
                jql::quote(name),
                jql::quote(&self.home_project)
            ))
            .with_fields(FieldProjection::new("fixVersions"))
            .with_max_results(1);

        let sample = self.search(&query).await?;
        sample
            .first()
            .and_then(|ticket| ticket.fix_version_id(name))
            .map(str::to_string)
            .ok_or_else(|| {
                tracing::error!("FixVersion {:?} not found in project {}", name, self.home_project);
                TrackerError::NotFound(format!("FixVersion '{}' not found", name))
            })
    }

    pub async fn version_detail(&self, id: &str) -> Result<VersionDetail> {
        let url = self.endpoints.api(&format!("version/{}", urlencoding::encode(id)));
        let response = self.transport.get(&url, &[]).await?;
        let json = classify(response).map_err(|e| match e {
            TrackerError::NotFound(_) => TrackerError::NotFound(format!("FixVersion id {} not found", id)),
            other => other,
        })?;
        Ok(serde_json::from_value(json)?)
    }

    /// Home-project tickets in a release, bounded by the client's default cap.
    pub async fn fix_version_tickets(&self, name: &str) -> Result<Vec<Ticket>> {
        let query = self.query(format!(
            "fixVersion in ({}) AND project = {}",
            jql::quote(name),
            jql::quote(&self.home_project)
        ));
        self.search(&query).await
    }

    /// Resolve a release name into its detail, tickets and code tickets.
    pub async fn fix_version(&self, name: &str) -> Result<FixVersion> {
        let id = self.fix_version_id(name).await?;
        let detail = self.version_detail(&id).await?;
        let tickets = self.fix_version_tickets(name).await?;

        let fix_version = FixVersion::assemble(name, id, detail, tickets);
        tracing::info!(
            "FixVersion {} has {} ticket(s), {} with code changes",
            fix_version.name,
            fix_version.tickets.len(),
            fix_version.code_tickets.len()
        );
        Ok(fix_version)
    }
}
