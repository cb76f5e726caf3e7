/// All database primary keys are 64-bit integers (BIGSERIAL on PostgreSQL,
/// INTEGER rowid on SQLite).
pub type DbId = i64;

/// All timestamps are UTC. Rendering into the civil timezone happens in
/// [`crate::timefmt`] only.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Telegram user and chat identifiers are 64-bit integers as well, but they
/// come from the transport, not the database.
pub type ChatId = i64;
pub type UserId = i64;
