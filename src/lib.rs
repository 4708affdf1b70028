//! Typed ticket projection and release aggregation over the Jira REST API.
//!
//! Raw issue JSON is projected into [`models::ticket::Ticket`] snapshots,
//! bulk queries are bounded by [`api::jira::Query`], and named releases are
//! resolved into [`models::fix_version::FixVersion`] views.

pub mod api;
pub mod config;
pub mod errors;
pub mod models;
pub mod registry;

pub use api::jira::{FieldProjection, JiraClient, Query};
pub use errors::{Result, TrackerError};
pub use models::fix_version::FixVersion;
pub use models::ticket::{KanbanStage, Ticket};
