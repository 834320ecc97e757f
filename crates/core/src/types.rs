/// Record identifiers are millisecond-scale integers (see [`crate::ids`]).
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
