/// Images are identified by their file name within the loaded set.
pub type ImageId = String;

/// Sessions are keyed by a random UUID.
pub type SessionId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
