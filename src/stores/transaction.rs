//! Defines the transaction store trait.

use time::Date;

use crate::{Error, database_id::DatabaseId, models::{NewTransaction, Transaction}};

/// Handles appending transactions and answering how far a recurring
/// definition has been materialized.
///
/// The materialization engine only ever appends; editing and deleting
/// transactions belongs to the general CRUD surface outside this service.
pub trait TransactionStore {
    /// Append `transaction` to the store.
    ///
    /// Returns `None` when `transaction` names a `(recurring_id, date)`
    /// pair that is already recorded. This is what makes redundant
    /// materialization passes safe: re-appending an occurrence is a no-op,
    /// not a duplicate and not an error. Transactions entered by hand
    /// (`recurring_id` of `None`) are never deduplicated.
    fn append(&mut self, transaction: NewTransaction) -> Result<Option<Transaction>, Error>;

    /// The date of the most recent occurrence materialized from the
    /// definition `recurring_id`, or `None` if it has produced no
    /// transactions yet.
    ///
    /// The engine resumes expansion from this date, so occurrences that
    /// were appended before a failed watermark update are not produced a
    /// second time.
    fn latest_occurrence_date(&self, recurring_id: DatabaseId) -> Result<Option<Date>, Error>;
}
