/// Repository identifiers as assigned by the analytics backend.
pub type RepoId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
