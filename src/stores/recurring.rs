//! Defines the store trait for recurring transaction definitions.

use time::OffsetDateTime;

use crate::{
    Error,
    database_id::{DatabaseId, UserId},
    models::{NewRecurringDefinition, RecurringDefinition},
};

/// Handles the creation and retrieval of recurring transaction definitions.
pub trait RecurringStore {
    /// Persist a new definition.
    ///
    /// The stored definition starts active with a null watermark; whether
    /// its first occurrence is due is the creation gate's concern, not the
    /// store's.
    fn create(&mut self, definition: NewRecurringDefinition) -> Result<RecurringDefinition, Error>;

    /// Retrieve every active definition across all owners.
    ///
    /// This is the sweep's view of the store; inactive definitions are
    /// filtered out here so the sweep never sees them.
    fn find_active(&self) -> Result<Vec<RecurringDefinition>, Error>;

    /// Retrieve all of `user_id`'s definitions, active or not.
    fn get_by_user_id(&self, user_id: UserId) -> Result<Vec<RecurringDefinition>, Error>;

    /// Advance the watermark of definition `id` from `expected` to `value`.
    ///
    /// The update only applies while the stored watermark still equals
    /// `expected`, which gives each materialization pass per-definition
    /// mutual exclusion without a lock: the slower of two concurrent
    /// passes gets [Error::WatermarkConflict] instead of silently
    /// rewinding or double-advancing the watermark.
    ///
    /// # Errors
    /// This function will return an:
    /// - [Error::NotFound] if `id` does not refer to a definition,
    /// - [Error::WatermarkConflict] if the stored watermark is not `expected`.
    fn update_last_processed(
        &mut self,
        id: DatabaseId,
        expected: Option<OffsetDateTime>,
        value: OffsetDateTime,
    ) -> Result<(), Error>;
}
