use crate::api::jql;
use crate::api::response::classify;
use crate::api::transport::{HttpTransport, Transport};
use crate::config::credentials::Credentials;
use crate::config::settings::Settings;
use crate::errors::{Result, TrackerError};
use crate::models::ticket::{service_request_link, Ticket, TicketBuilder};
use crate::registry::{ComponentRegistry, StaticRegistry};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

pub const DEFAULT_FIELDS: &str = "*navigable";
pub const DEFAULT_MAX_RESULTS: u32 = 200;
pub const DEFAULT_HOME_PROJECT: &str = "IPE";
pub const DEFAULT_SERVICE_REQUEST_URL: &str = "http://10.158.0.236/DevWorkbench/#ajax/case.html";

/// Value of the `fields` query parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldProjection(String);

impl FieldProjection {
    pub fn new(fields: impl Into<String>) -> Self {
        Self(fields.into())
    }

    pub fn from_fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined: Vec<String> = fields.into_iter().map(|f| f.as_ref().to_string()).collect();
        Self(joined.join(","))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for FieldProjection {
    fn default() -> Self {
        Self::new(DEFAULT_FIELDS)
    }
}

/// One bounded search: JQL, field projection and result cap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub jql: String,
    pub fields: FieldProjection,
    pub max_results: u32,
}

impl Query {
    pub fn new(jql: impl Into<String>) -> Self {
        Self {
            jql: jql.into(),
            fields: FieldProjection::default(),
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    pub fn with_fields(mut self, fields: FieldProjection) -> Self {
        self.fields = fields;
        self
    }

    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results;
        self
    }
}

/// Base URLs the client talks to and derives links from.
#[derive(Debug, Clone)]
pub struct Endpoints {
    base_url: String,
    browse_url: String,
    service_request_url: String,
}

impl Endpoints {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            browse_url: format!("{}/browse", base_url),
            base_url,
            service_request_url: DEFAULT_SERVICE_REQUEST_URL.to_string(),
        }
    }

    pub fn with_service_request_url(mut self, url: impl Into<String>) -> Self {
        self.service_request_url = url.into();
        self
    }

    pub fn api(&self, path: &str) -> String {
        format!("{}/rest/api/2/{}", self.base_url, path)
    }

    pub fn browse_url(&self) -> &str {
        &self.browse_url
    }

    pub fn service_request_url(&self) -> &str {
        &self.service_request_url
    }
}

/// Tickets of one search plus the tracker's reported total.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPage {
    pub total: u64,
    pub tickets: Vec<Ticket>,
}

impl SearchPage {
    /// Matches the tracker reported but did not return.
    pub fn dropped(&self) -> u64 {
        self.total.saturating_sub(self.tickets.len() as u64)
    }

    pub fn is_truncated(&self) -> bool {
        self.dropped() > 0
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    total: u64,
    #[serde(default)]
    issues: Vec<Value>,
}

pub struct JiraClient<T = HttpTransport> {
    pub(crate) transport: T,
    pub(crate) endpoints: Endpoints,
    registry: Box<dyn ComponentRegistry>,
    pub(crate) home_project: String,
    pub(crate) default_fields: FieldProjection,
    pub(crate) default_max_results: u32,
}

impl JiraClient<HttpTransport> {
    pub fn from_settings(settings: &Settings, credentials: &Credentials) -> Result<Self> {
        let jira = &settings.jira;
        let transport = HttpTransport::new(
            credentials,
            Duration::from_secs(jira.timeout_secs),
            jira.ca_cert.as_deref(),
        )?;
        let endpoints =
            Endpoints::new(jira.url.as_str()).with_service_request_url(jira.service_request_url.as_str());

        Ok(Self::new(transport, endpoints)
            .with_home_project(jira.home_project.as_str())
            .with_defaults(FieldProjection::new(jira.fields.as_str()), jira.max_results))
    }

    /// Client from `~/.ticketlens/config.toml` and the resolved credentials.
    pub fn connect() -> Result<Self> {
        let settings = Settings::load().map_err(|e| TrackerError::Configuration(format!("{:#}", e)))?;
        let credentials = Credentials::resolve()?;
        Self::from_settings(&settings, &credentials)
    }
}

impl<T: Transport> JiraClient<T> {
    pub fn new(transport: T, endpoints: Endpoints) -> Self {
        Self {
            transport,
            endpoints,
            registry: Box::new(StaticRegistry::default()),
            home_project: DEFAULT_HOME_PROJECT.to_string(),
            default_fields: FieldProjection::default(),
            default_max_results: DEFAULT_MAX_RESULTS,
        }
    }

    pub fn with_registry(mut self, registry: impl ComponentRegistry + 'static) -> Self {
        self.registry = Box::new(registry);
        self
    }

    pub fn with_home_project(mut self, project: impl Into<String>) -> Self {
        self.home_project = project.into();
        self
    }

    pub fn with_defaults(mut self, fields: FieldProjection, max_results: u32) -> Self {
        self.default_fields = fields;
        self.default_max_results = max_results;
        self
    }

    pub fn home_project(&self) -> &str {
        &self.home_project
    }

    /// A query carrying this client's default projection and cap.
    pub fn query(&self, jql: impl Into<String>) -> Query {
        Query::new(jql)
            .with_fields(self.default_fields.clone())
            .with_max_results(self.default_max_results)
    }

    pub fn ticket_builder(&self) -> TicketBuilder<'_> {
        TicketBuilder::new(
            self.endpoints.browse_url(),
            self.endpoints.service_request_url(),
            self.registry.as_ref(),
        )
    }

    /// Run one bounded search. Does not page past `query.max_results`.
    pub async fn search_page(&self, query: &Query) -> Result<SearchPage> {
        tracing::info!("Fetching issues for JQL: {:?}", query.jql);

        let params = [
            ("jql", query.jql.clone()),
            ("fields", query.fields.as_str().to_string()),
            ("maxResults", query.max_results.to_string()),
        ];
        let response = self.transport.get(&self.endpoints.api("search"), &params).await?;
        let page: SearchResponse = serde_json::from_value(classify(response)?)?;

        tracing::info!("Query matched {} tickets", page.total);
        if page.total == 0 {
            return Ok(SearchPage {
                total: 0,
                tickets: Vec::new(),
            });
        }

        let builder = self.ticket_builder();
        let tickets = page
            .issues
            .iter()
            .take(query.max_results as usize)
            .map(|issue| builder.build(issue))
            .collect::<Result<Vec<_>>>()?;

        let result = SearchPage {
            total: page.total,
            tickets,
        };
        if result.is_truncated() {
            tracing::warn!(
                "Retrieving {} ticket(s) out of a possible {} ({} dropped). Increase max_results to retrieve more",
                result.tickets.len(),
                result.total,
                result.dropped()
            );
        }
        Ok(result)
    }

    pub async fn search(&self, query: &Query) -> Result<Vec<Ticket>> {
        Ok(self.search_page(query).await?.tickets)
    }

    pub async fn get_ticket(&self, key: &str, fields: &FieldProjection) -> Result<Ticket> {
        tracing::debug!("Fetching details from Jira for: {}", key);

        let url = self.endpoints.api(&format!("issue/{}", urlencoding::encode(key)));
        let response = self
            .transport
            .get(&url, &[("fields", fields.as_str().to_string())])
            .await?;

        let json = classify(response).map_err(|e| match e {
            TrackerError::NotFound(_) => TrackerError::NotFound(format!("Jira ticket {} not found", key)),
            other => other,
        })?;
        self.ticket_builder().build(&json)
    }

    /// The single Bug/New Feature ticket linked to a service request number.
    pub async fn find_by_service_request(&self, sr: &str) -> Result<Ticket> {
        let link = service_request_link(self.endpoints.service_request_url(), sr);
        let query = self.query(format!(
            "\"Remedy Link\" = {} AND type in (\"New Feature\", Bug)",
            jql::quote(&link)
        ));

        let mut tickets = self.search(&query).await?;
        match tickets.len() {
            1 => Ok(tickets.remove(0)),
            0 => Err(TrackerError::NotFound(format!(
                "Could not find Jira ticket for SR {}",
                sr
            ))),
            n => Err(TrackerError::AmbiguousResult(format!(
                "{} Jira tickets found for SR {}",
                n, sr
            ))),
        }
    }
}
