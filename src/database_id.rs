//! Database ID type definitions.

/// Alias for the integer type used for mapping to database IDs.
pub type DatabaseId = i64;

/// Alias for the integer type identifying the user that owns a record.
///
/// Authentication happens upstream of this service, so user IDs arrive
/// already validated and are only used to scope reads and writes.
pub type UserId = i64;
