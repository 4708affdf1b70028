//! Raw Jira issue layout. Every field path the projection reads is declared here,
//! each one optional, so a sparse payload deserializes to empty defaults.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawFields {
    #[serde(deserialize_with = "lenient")]
    pub status: Option<Named>,
    #[serde(deserialize_with = "lenient")]
    pub resolution: Option<Named>,
    #[serde(deserialize_with = "lenient")]
    pub summary: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub issuetype: Option<Named>,
    #[serde(deserialize_with = "lenient")]
    pub project: Option<Keyed>,
    #[serde(deserialize_with = "lenient_list")]
    pub labels: Option<Vec<String>>,
    #[serde(deserialize_with = "lenient_list")]
    pub issuelinks: Option<Vec<RawLink>>,
    #[serde(rename = "fixVersions", deserialize_with = "lenient_list")]
    pub fix_versions: Option<Vec<RawVersion>>,
    #[serde(deserialize_with = "lenient_list")]
    pub components: Option<Vec<Named>>,

    #[serde(rename = "customfield_10005")]
    pub sprint: Option<Value>,
    #[serde(rename = "customfield_13302", deserialize_with = "lenient_list")]
    pub pods: Option<Vec<Valued>>,
    #[serde(rename = "customfield_13901", deserialize_with = "lenient")]
    pub product_capability: Option<Valued>,
    #[serde(rename = "customfield_12082", deserialize_with = "lenient")]
    pub client: Option<Valued>,
    #[serde(rename = "customfield_13600", deserialize_with = "lenient_list")]
    pub business_group: Option<Vec<Valued>>,
    #[serde(rename = "customfield_13601", deserialize_with = "lenient_list")]
    pub transaction_group: Option<Vec<Valued>>,
    #[serde(rename = "customfield_13602", deserialize_with = "lenient_list")]
    pub instrument_group: Option<Vec<Valued>>,
    #[serde(rename = "customfield_12077", deserialize_with = "lenient")]
    pub service_request_link: Option<String>,
}

/// Any value that does not fit `T` reads as absent.
pub fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    match serde_json::from_value(value) {
        Ok(parsed) => Ok(Some(parsed)),
        Err(e) => {
            tracing::debug!("Ignoring field that is not a {}: {}", std::any::type_name::<T>(), e);
            Ok(None)
        }
    }
}

/// Like [`lenient`], but per element: entries that do not fit `T` are dropped.
pub fn lenient_list<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => Ok(Some(
            items
                .into_iter()
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect(),
        )),
        Value::Null => Ok(None),
        other => {
            tracing::debug!("Ignoring non-list field: {}", other);
            Ok(None)
        }
    }
}

/// [`lenient`] with the type's default for absent or mistyped values.
pub fn lenient_or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(lenient(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Default, Deserialize)]
pub struct Named {
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Keyed {
    pub key: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Valued {
    pub value: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawVersion {
    pub id: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawLink {
    #[serde(rename = "type")]
    pub link_type: Option<Named>,
    #[serde(rename = "inwardIssue")]
    pub inward_issue: Option<RawLinkedIssue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawLinkedIssue {
    pub key: Option<String>,
    pub fields: Option<RawLinkedFields>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawLinkedFields {
    pub issuetype: Option<Named>,
}

impl RawLink {
    pub fn type_name(&self) -> Option<&str> {
        name_of(&self.link_type)
    }
}

impl RawLinkedIssue {
    pub fn type_name(&self) -> Option<&str> {
        self.fields.as_ref().and_then(|f| name_of(&f.issuetype))
    }
}

pub fn name_of(named: &Option<Named>) -> Option<&str> {
    named.as_ref().and_then(|n| n.name.as_deref())
}

pub fn names(items: &Option<Vec<Named>>) -> Vec<String> {
    items
        .iter()
        .flatten()
        .filter_map(|item| item.name.clone())
        .collect()
}

pub fn value_of(valued: &Option<Valued>) -> Option<String> {
    valued.as_ref().and_then(|v| v.value.clone())
}

pub fn values(items: &Option<Vec<Valued>>) -> Vec<String> {
    items
        .iter()
        .flatten()
        .filter_map(|item| item.value.clone())
        .collect()
}
