use crate::errors::{Result, TrackerError};
use crate::models::schema::{self, RawFields, RawLink};
use crate::registry::ComponentRegistry;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

static SERVICE_REQUEST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"sr=([0-9]+)$").expect("service request pattern is valid"));

/// Coarse board column derived from the tracker status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum KanbanStage {
    Open,
    Wip,
    Ready,
    Done,
}

impl KanbanStage {
    pub fn from_status(status: &str) -> Option<Self> {
        match status {
            "Open" | "Analyzing" | "Backlog" | "To Do" => Some(KanbanStage::Open),
            "Implementing" | "In Progress" | "In Review" => Some(KanbanStage::Wip),
            "Ready For Packaging" => Some(KanbanStage::Ready),
            "Validating on Staging" | "Deploy to Prod" | "Releasing" | "Done" => {
                Some(KanbanStage::Done)
            }
            _ => None,
        }
    }
}

/// Snapshot of one issue at fetch time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ticket {
    pub key: String,
    pub status: Option<String>,
    pub kanban_stage: Option<KanbanStage>,
    pub resolution: Option<String>,
    pub summary: Option<String>,
    #[serde(rename = "type")]
    pub issue_type: Option<String>,
    pub project: Option<String>,
    pub url: String,
    pub labels: BTreeSet<String>,
    /// Tracker-defined sprint payload, kept verbatim.
    pub sprint: Value,
    pub linked_stories: Vec<String>,
    pub fix_versions: Vec<String>,
    /// Version name to tracker id, for the versions that carry both.
    pub fix_version_ids: BTreeMap<String, String>,
    pub components: Vec<String>,
    pub build_components: Vec<String>,
    pub pods: Vec<String>,
    pub product_capability: Option<String>,
    pub client: Option<String>,
    pub business_group: Vec<String>,
    pub transaction_group: Vec<String>,
    pub instrument_group: Vec<String>,
    pub service_request_id: Option<String>,
    pub service_request_url: Option<String>,
}

impl Ticket {
    pub fn is_type(&self, issue_type: &str) -> bool {
        self.issue_type.as_deref() == Some(issue_type)
    }

    pub fn has_fix_version(&self, name: &str) -> bool {
        self.fix_versions.iter().any(|v| v == name)
    }

    pub fn fix_version_id(&self, name: &str) -> Option<&str> {
        self.fix_version_ids.get(name).map(String::as_str)
    }
}

/// Projects raw issue JSON into [`Ticket`]s. Holds only read-only lookup context.
pub struct TicketBuilder<'a> {
    browse_url: &'a str,
    service_request_url: &'a str,
    registry: &'a dyn ComponentRegistry,
}

impl<'a> TicketBuilder<'a> {
    pub fn new(
        browse_url: &'a str,
        service_request_url: &'a str,
        registry: &'a dyn ComponentRegistry,
    ) -> Self {
        Self {
            browse_url: browse_url.trim_end_matches('/'),
            service_request_url,
            registry,
        }
    }

    pub fn build(&self, json: &Value) -> Result<Ticket> {
        let key = json
            .get("key")
            .and_then(Value::as_str)
            .ok_or_else(|| TrackerError::MalformedEntity("issue has no 'key'".to_string()))?;

        let fields = json
            .get("fields")
            .filter(|f| f.is_object())
            .ok_or_else(|| TrackerError::MalformedEntity(format!("{} has no 'fields'", key)))?;

        let raw = RawFields::deserialize(fields)
            .map_err(|e| TrackerError::MalformedEntity(format!("{}: {}", key, e)))?;

        Ok(self.project(key, raw))
    }

    fn project(&self, key: &str, raw: RawFields) -> Ticket {
        let status = schema::name_of(&raw.status).map(str::to_string);
        let kanban_stage = status.as_deref().and_then(KanbanStage::from_status);
        let issue_type = schema::name_of(&raw.issuetype).map(str::to_string);

        let linked_stories = linked_stories(
            issue_type.as_deref(),
            raw.issuelinks.as_deref().unwrap_or_default(),
        );

        let mut fix_versions = Vec::new();
        let mut fix_version_ids = BTreeMap::new();
        for version in raw.fix_versions.iter().flatten() {
            if let Some(name) = &version.name {
                fix_versions.push(name.clone());
                if let Some(id) = &version.id {
                    fix_version_ids.entry(name.clone()).or_insert_with(|| id.clone());
                }
            }
        }

        let components = schema::names(&raw.components);
        let build_components = components
            .iter()
            .filter(|c| self.registry.is_build_component(c))
            .cloned()
            .collect();

        let service_request_id = raw
            .service_request_link
            .as_deref()
            .and_then(extract_service_request);
        let service_request_url = service_request_id
            .as_ref()
            .map(|sr| service_request_link(self.service_request_url, sr));

        let sprint = match raw.sprint {
            Some(Value::Null) | None => Value::Array(Vec::new()),
            Some(value) => value,
        };

        Ticket {
            key: key.to_string(),
            status,
            kanban_stage,
            resolution: schema::name_of(&raw.resolution).map(str::to_string),
            summary: raw.summary,
            issue_type,
            project: raw.project.and_then(|p| p.key),
            url: format!("{}/{}", self.browse_url, key),
            labels: raw.labels.unwrap_or_default().into_iter().collect(),
            sprint,
            linked_stories,
            fix_versions,
            fix_version_ids,
            components,
            build_components,
            pods: schema::values(&raw.pods),
            product_capability: schema::value_of(&raw.product_capability),
            client: schema::value_of(&raw.client),
            business_group: schema::values(&raw.business_group),
            transaction_group: schema::values(&raw.transaction_group),
            instrument_group: schema::values(&raw.instrument_group),
            service_request_id,
            service_request_url,
        }
    }
}

/// Inward Story keys reachable through the link type that matches this ticket's type.
fn linked_stories(issue_type: Option<&str>, links: &[RawLink]) -> Vec<String> {
    let wanted = match issue_type {
        Some("New Feature") => "Feature",
        Some("Bug") => "Fix",
        _ => return Vec::new(),
    };

    links
        .iter()
        .filter(|link| link.type_name() == Some(wanted))
        .filter_map(|link| link.inward_issue.as_ref())
        .filter(|issue| issue.type_name() == Some("Story"))
        .filter_map(|issue| issue.key.clone())
        .collect()
}

/// Trailing `sr=<digits>` of a service request link.
pub fn extract_service_request(link: &str) -> Option<String> {
    SERVICE_REQUEST
        .captures(link)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

pub fn service_request_link(base: &str, sr: &str) -> String {
    format!("{}?sr={}", base, sr)
}
