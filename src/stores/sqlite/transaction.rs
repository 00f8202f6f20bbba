//! Implements a SQLite backed transaction store.

use std::sync::{Arc, Mutex};

use rusqlite::{Connection, Row};
use time::Date;

use crate::{
    Error,
    database_id::DatabaseId,
    models::{NewTransaction, Transaction},
    stores::{TransactionStore, sqlite::parse_text_column},
};

/// Stores transactions in a SQLite database.
#[derive(Debug, Clone)]
pub struct SQLiteTransactionStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteTransactionStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

impl TransactionStore for SQLiteTransactionStore {
    /// Append a transaction to the database.
    ///
    /// Materialized occurrences are deduplicated on `(recurring_id, date)`:
    /// inserting an occurrence that already exists returns `Ok(None)` and
    /// leaves the database unchanged. Rows with a null `recurring_id` are
    /// exempt, so manually entered transactions may share a date freely.
    ///
    /// # Errors
    /// This function will return an [Error::SqlError] if there is an
    /// unexpected SQL error.
    ///
    /// # Panics
    /// Panics if the lock for the database connection is already held by
    /// the same thread.
    fn append(&mut self, transaction: NewTransaction) -> Result<Option<Transaction>, Error> {
        let connection = self.connection.lock().unwrap();

        let row = connection
            .prepare(
                "INSERT INTO \"transaction\" (user_id, description, amount, kind, category, date, recurring_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT (recurring_id, date) DO NOTHING
                 RETURNING id, user_id, description, amount, kind, category, date, recurring_id",
            )?
            .query_row(
                (
                    transaction.user_id,
                    transaction.description,
                    transaction.amount,
                    transaction.kind.to_string(),
                    transaction.category,
                    transaction.date,
                    transaction.recurring_id,
                ),
                map_transaction_row,
            );

        match row {
            Ok(transaction) => Ok(Some(transaction)),
            // DO NOTHING swallowed the insert: the occurrence already exists.
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    /// Get the date of the latest occurrence recorded for `recurring_id`.
    ///
    /// # Errors
    /// This function will return an [Error::SqlError] if there is an
    /// unexpected SQL error.
    ///
    /// # Panics
    /// Panics if the lock for the database connection is already held by
    /// the same thread.
    fn latest_occurrence_date(&self, recurring_id: DatabaseId) -> Result<Option<Date>, Error> {
        let connection = self.connection.lock().unwrap();

        let date = connection.query_row(
            "SELECT MAX(date) FROM \"transaction\" WHERE recurring_id = :recurring_id",
            &[(":recurring_id", &recurring_id)],
            |row| row.get(0),
        )?;

        Ok(date)
    }
}

/// Create the transaction table in the database.
///
/// The unique index over `(recurring_id, date)` is what turns re-delivered
/// materializations into no-ops; SQLite leaves rows with a null
/// `recurring_id` out of the uniqueness check.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub(crate) fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                description TEXT NOT NULL,
                amount REAL NOT NULL,
                kind TEXT NOT NULL,
                category TEXT NOT NULL,
                date TEXT NOT NULL,
                recurring_id INTEGER,
                UNIQUE (recurring_id, date)
                )",
        (),
    )?;

    Ok(())
}

/// Map a database row to a [Transaction].
fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        user_id: row.get(1)?,
        description: row.get(2)?,
        amount: row.get(3)?,
        kind: parse_text_column(row, 4)?,
        category: row.get(5)?,
        date: row.get(6)?,
        recurring_id: row.get(7)?,
    })
}
