pub mod fix_version;
pub mod jira;
pub mod jql;
pub mod mutations;
pub mod releases;
pub mod response;
pub mod timing;
pub mod transport;
