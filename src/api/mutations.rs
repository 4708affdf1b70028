use crate::api::jira::JiraClient;
use crate::api::response::{classify, expect_no_content};
use crate::api::transport::Transport;
use crate::errors::{Result, TrackerError};
use serde::Deserialize;
use serde_json::{json, Value};
use std::str::FromStr;

/// Edit applied to a multi-select field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultiSelectOp {
    Add,
    Remove,
}

impl MultiSelectOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            MultiSelectOp::Add => "add",
            MultiSelectOp::Remove => "remove",
        }
    }

    fn describe(&self, value: &str, field: &str) -> String {
        match self {
            MultiSelectOp::Add => format!("add {:?} to {}", value, field),
            MultiSelectOp::Remove => format!("remove {:?} from {}", value, field),
        }
    }
}

impl FromStr for MultiSelectOp {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "add" => Ok(MultiSelectOp::Add),
            "remove" => Ok(MultiSelectOp::Remove),
            other => Err(TrackerError::Request(format!(
                "Operation {:?} not supported",
                other
            ))),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TransitionList {
    #[serde(default)]
    transitions: Vec<Transition>,
}

#[derive(Debug, Deserialize)]
struct Transition {
    id: String,
    to: Option<TransitionTarget>,
}

#[derive(Debug, Deserialize)]
struct TransitionTarget {
    name: Option<String>,
}

impl<T: Transport> JiraClient<T> {
    fn issue_url(&self, key: &str) -> String {
        self.endpoints.api(&format!("issue/{}", urlencoding::encode(key)))
    }

    fn transitions_url(&self, key: &str) -> String {
        self.endpoints
            .api(&format!("issue/{}/transitions", urlencoding::encode(key)))
    }

    async fn update_issue(&self, key: &str, body: Value, action: String) -> Result<()> {
        let response = self.transport.put(&self.issue_url(key), &body).await?;
        expect_no_content(response, &format!("{} on {}", action, key))?;
        tracing::info!("{}: {}", key, action);
        Ok(())
    }

    pub async fn set_field(&self, key: &str, field: &str, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        let action = format!("set {} to {}", field, value);
        self.update_issue(key, json!({"fields": {field: value}}), action)
            .await
    }

    pub async fn add_component(&self, key: &str, component: &str) -> Result<()> {
        let body = json!({"update": {"components": [{"add": {"name": component}}]}});
        self.update_issue(key, body, format!("add component {:?}", component))
            .await
    }

    /// Add or remove one named value on a multi-select field.
    pub async fn update_field(
        &self,
        key: &str,
        op: MultiSelectOp,
        field: &str,
        value: &str,
    ) -> Result<()> {
        let body = json!({"update": {field: [{op.as_str(): {"name": value}}]}});
        self.update_issue(key, body, op.describe(value, field)).await
    }

    /// Id of the transition that moves `key` into status `name`, if one is available.
    pub async fn transition_id(&self, key: &str, name: &str) -> Result<Option<String>> {
        let response = self.transport.get(&self.transitions_url(key), &[]).await?;
        let list: TransitionList = serde_json::from_value(classify(response)?)?;

        Ok(list
            .transitions
            .into_iter()
            .find(|t| t.to.as_ref().and_then(|to| to.name.as_deref()) == Some(name))
            .map(|t| t.id))
    }

    pub async fn transition_to(&self, key: &str, name: &str) -> Result<()> {
        let id = self.transition_id(key, name).await?.ok_or_else(|| {
            tracing::error!("{:?} is not a valid transition for {}", name, key);
            TrackerError::TransitionNotFound {
                key: key.to_string(),
                transition: name.to_string(),
            }
        })?;

        let body = json!({"transition": {"id": id}});
        let response = self.transport.post(&self.transitions_url(key), &body).await?;
        expect_no_content(response, &format!("transition {} to {:?}", key, name))?;
        tracing::info!("Successfully transitioned {} to {:?}", key, name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::client;
    use mockito::Matcher;

    #[test]
    fn test_parse_operation() {
        assert_eq!("add".parse::<MultiSelectOp>().unwrap(), MultiSelectOp::Add);
        assert_eq!("remove".parse::<MultiSelectOp>().unwrap(), MultiSelectOp::Remove);
        assert!("replace".parse::<MultiSelectOp>().is_err());
    }

    #[tokio::test]
    async fn test_set_field_encodes_value_safely() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PUT", "/rest/api/2/issue/IPE-1")
            .match_body(Matcher::Json(json!({
                "fields": {"summary": "Quote \" and \\ survive"}
            })))
            .with_status(204)
            .create_async()
            .await;

        client(&server)
            .set_field("IPE-1", "summary", "Quote \" and \\ survive")
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_add_component() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PUT", "/rest/api/2/issue/IPE-1")
            .match_body(Matcher::Json(json!({
                "update": {"components": [{"add": {"name": "BPS"}}]}
            })))
            .with_status(204)
            .create_async()
            .await;

        client(&server).add_component("IPE-1", "BPS").await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_update_field_add() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PUT", "/rest/api/2/issue/IPE-1")
            .match_body(Matcher::Json(json!({
                "update": {"customfield_13302": [{"add": {"name": "Pod A"}}]}
            })))
            .with_status(204)
            .create_async()
            .await;

        client(&server)
            .update_field("IPE-1", MultiSelectOp::Add, "customfield_13302", "Pod A")
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_update_field_remove() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PUT", "/rest/api/2/issue/IPE-1")
            .match_body(Matcher::Json(json!({
                "update": {"fixVersions": [{"remove": {"name": "9.0"}}]}
            })))
            .with_status(204)
            .create_async()
            .await;

        client(&server)
            .update_field("IPE-1", MultiSelectOp::Remove, "fixVersions", "9.0")
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_mutation_requires_no_content() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("PUT", "/rest/api/2/issue/IPE-1")
            .with_status(400)
            .with_body(r#"{"errors": {"components": "Component name 'X' is not valid"}}"#)
            .create_async()
            .await;

        let err = client(&server).add_component("IPE-1", "X").await.unwrap_err();
        assert!(matches!(err, TrackerError::MutationFailed { status: 400, .. }));
    }

    #[tokio::test]
    async fn test_transition_to() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/rest/api/2/issue/IPE-1/transitions")
            .with_status(200)
            .with_body(
                json!({"transitions": [
                    {"id": "11", "name": "Start", "to": {"name": "In Progress"}},
                    {"id": "31", "name": "Finish", "to": {"name": "Done"}}
                ]})
                .to_string(),
            )
            .create_async()
            .await;
        let post = server
            .mock("POST", "/rest/api/2/issue/IPE-1/transitions")
            .match_body(Matcher::Json(json!({"transition": {"id": "31"}})))
            .with_status(204)
            .create_async()
            .await;

        client(&server).transition_to("IPE-1", "Done").await.unwrap();
        post.assert_async().await;
    }

    #[tokio::test]
    async fn test_rejected_transition_is_mutation_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/rest/api/2/issue/IPE-1/transitions")
            .with_status(200)
            .with_body(r#"{"transitions": [{"id": "31", "to": {"name": "Done"}}]}"#)
            .create_async()
            .await;
        let post = server
            .mock("POST", "/rest/api/2/issue/IPE-1/transitions")
            .match_body(Matcher::Json(json!({"transition": {"id": "31"}})))
            .with_status(400)
            .with_body(r#"{"errorMessages": ["Resolution is required"]}"#)
            .create_async()
            .await;

        let err = client(&server).transition_to("IPE-1", "Done").await.unwrap_err();
        post.assert_async().await;
        match err {
            TrackerError::MutationFailed { status, body, .. } => {
                assert_eq!(status, 400);
                assert!(body.contains("Resolution is required"));
            }
            other => panic!("expected MutationFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unknown_transition() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/rest/api/2/issue/IPE-1/transitions")
            .with_status(200)
            .with_body(r#"{"transitions": [{"id": "11", "to": {"name": "In Progress"}}]}"#)
            .create_async()
            .await;
        let post = server
            .mock("POST", "/rest/api/2/issue/IPE-1/transitions")
            .expect(0)
            .create_async()
            .await;

        let jira = client(&server);
        assert_eq!(jira.transition_id("IPE-1", "Done").await.unwrap(), None);
        let err = jira.transition_to("IPE-1", "Done").await.unwrap_err();
        assert!(matches!(err, TrackerError::TransitionNotFound { .. }));
        post.assert_async().await;
    }
}
