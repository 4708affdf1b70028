use crate::models::schema::{lenient, lenient_or_default};
use chrono::NaiveDate;
use serde::Deserialize;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Release entry from the project version listing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReleaseSummary {
    #[serde(deserialize_with = "lenient")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient_or_default")]
    pub name: String,
    #[serde(deserialize_with = "lenient")]
    pub release_date: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub start_date: Option<String>,
    #[serde(deserialize_with = "lenient_or_default")]
    pub archived: bool,
    #[serde(deserialize_with = "lenient_or_default")]
    pub released: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ReleaseListing {
    pub values: Vec<ReleaseSummary>,
}

impl ReleaseSummary {
    /// `(start, release)` when both dates are set and parse.
    pub fn window(&self) -> Option<(NaiveDate, NaiveDate)> {
        let start = self.start_date.as_deref()?;
        let release = self.release_date.as_deref()?;
        match (
            NaiveDate::parse_from_str(start, DATE_FORMAT),
            NaiveDate::parse_from_str(release, DATE_FORMAT),
        ) {
            (Ok(start), Ok(release)) => Some((start, release)),
            _ => {
                tracing::debug!(
                    "Skipping release {:?} with unparsable dates ({:?}, {:?})",
                    self.name,
                    start,
                    release
                );
                None
            }
        }
    }

    pub fn is_major(&self) -> bool {
        self.name.ends_with(".0")
    }
}

/// Names of major releases whose window contains `today`, in listing order.
pub fn select_next_major(releases: &[ReleaseSummary], today: NaiveDate) -> Vec<String> {
    releases
        .iter()
        .filter(|r| r.is_major())
        .filter(|r| match r.window() {
            Some((start, release)) => start <= today && release >= today,
            None => false,
        })
        .map(|r| r.name.clone())
        .collect()
}
