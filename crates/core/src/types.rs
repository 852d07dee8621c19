/// Activity records are keyed by an opaque UUID generated at creation.
pub type ActivityId = uuid::Uuid;

/// Users are keyed by UUID as well.
pub type UserId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
