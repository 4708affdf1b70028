pub mod fix_version;
pub mod release;
pub mod schema;
pub mod ticket;
