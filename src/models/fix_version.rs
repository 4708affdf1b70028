use crate::models::schema::{lenient, lenient_or_default};
use crate::models::ticket::Ticket;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Issue types that count as code changes for a release.
pub const CODE_TICKET_TYPES: [&str; 2] = ["Bug", "New Feature"];

/// Label that, when it is the only label, marks a ticket as having no development changes.
pub const NO_DEV_CHANGES: &str = "NO_DEV_CHANGES";

/// A named release and the tickets attached to it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FixVersion {
    pub name: String,
    pub id: String,
    pub release_date: Option<NaiveDate>,
    pub start_date: Option<NaiveDate>,
    pub archived: bool,
    pub released: bool,
    pub tickets: Vec<Ticket>,
    pub code_tickets: Vec<Ticket>,
}

/// Body of the version detail endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VersionDetail {
    #[serde(deserialize_with = "lenient")]
    pub release_date: Option<NaiveDate>,
    #[serde(deserialize_with = "lenient")]
    pub start_date: Option<NaiveDate>,
    #[serde(deserialize_with = "lenient_or_default")]
    pub archived: bool,
    #[serde(deserialize_with = "lenient_or_default")]
    pub released: bool,
}

impl FixVersion {
    pub fn assemble(name: &str, id: String, detail: VersionDetail, tickets: Vec<Ticket>) -> Self {
        let code_tickets = code_tickets(&tickets);
        Self {
            name: name.to_string(),
            id,
            release_date: detail.release_date,
            start_date: detail.start_date,
            archived: detail.archived,
            released: detail.released,
            tickets,
            code_tickets,
        }
    }
}

pub fn is_code_ticket(ticket: &Ticket) -> bool {
    let code_type = CODE_TICKET_TYPES.iter().any(|t| ticket.is_type(t));
    let no_dev_only = ticket.labels.len() == 1 && ticket.labels.contains(NO_DEV_CHANGES);
    code_type && !no_dev_only
}

pub fn code_tickets(tickets: &[Ticket]) -> Vec<Ticket> {
    tickets.iter().filter(|t| is_code_ticket(t)).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ticket::TicketBuilder;
    use crate::registry::StaticRegistry;
    use serde_json::json;

    fn ticket(key: &str, issue_type: &str, labels: &[&str]) -> Ticket {
        let registry = StaticRegistry::default();
        TicketBuilder::new("https://jira.example.com/browse", "http://sr", &registry)
            .build(&json!({
                "key": key,
                "fields": {"issuetype": {"name": issue_type}, "labels": labels}
            }))
            .unwrap()
    }

    #[test]
    fn test_no_dev_changes_alone_excludes_ticket() {
        assert!(!is_code_ticket(&ticket("IPE-1", "Bug", &["NO_DEV_CHANGES"])));
        assert!(is_code_ticket(&ticket("IPE-2", "Bug", &["NO_DEV_CHANGES", "docs"])));
        assert!(is_code_ticket(&ticket("IPE-3", "New Feature", &[])));
    }

    #[test]
    fn test_non_code_types_are_excluded() {
        assert!(!is_code_ticket(&ticket("IPE-4", "Story", &[])));
        assert!(!is_code_ticket(&ticket("IPE-5", "Task", &["backend"])));
    }

    #[test]
    fn test_assemble_computes_code_tickets() {
        let tickets = vec![
            ticket("IPE-1", "Bug", &[]),
            ticket("IPE-2", "Story", &[]),
            ticket("IPE-3", "New Feature", &["NO_DEV_CHANGES"]),
            ticket("IPE-4", "New Feature", &["ui"]),
        ];
        let detail: VersionDetail = serde_json::from_value(json!({
            "releaseDate": "2024-06-01",
            "startDate": "2024-01-01",
            "released": true
        }))
        .unwrap();

        let fv = FixVersion::assemble("9.0", "501".to_string(), detail, tickets);
        assert_eq!(fv.tickets.len(), 4);
        let keys: Vec<&str> = fv.code_tickets.iter().map(|t| t.key.as_str()).collect();
        assert_eq!(keys, vec!["IPE-1", "IPE-4"]);
        assert_eq!(fv.release_date, NaiveDate::from_ymd_opt(2024, 6, 1));
        assert!(fv.released);
        assert!(!fv.archived);
    }

    #[test]
    fn test_version_detail_tolerates_mistyped_values() {
        let detail: VersionDetail = serde_json::from_value(json!({
            "releaseDate": "06/01/2024",
            "startDate": 20240101,
            "archived": null,
            "released": "yes"
        }))
        .unwrap();

        assert!(detail.release_date.is_none());
        assert!(detail.start_date.is_none());
        assert!(!detail.archived);
        assert!(!detail.released);
    }
}
