//! SQLite backed implementations of the store traits.

mod recurring;
mod transaction;

pub use recurring::SQLiteRecurringStore;
pub use transaction::SQLiteTransactionStore;

pub(crate) use recurring::create_recurring_table;
pub(crate) use transaction::create_transaction_table;

use std::str::FromStr;

use rusqlite::{Row, types::Type};

use crate::Error;

/// Read a TEXT column and parse it into a domain enum.
///
/// Used for columns that store [crate::models::TransactionKind] and
/// [crate::models::Frequency] values as their string form.
fn parse_text_column<T>(row: &Row, index: usize) -> Result<T, rusqlite::Error>
where
    T: FromStr<Err = Error>,
{
    let text: String = row.get(index)?;

    text.parse().map_err(|error: Error| {
        rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(error))
    })
}
