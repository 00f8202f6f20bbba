//! Implements a SQLite backed store for recurring transaction definitions.

use std::sync::{Arc, Mutex};

use rusqlite::{Connection, Row};
use time::OffsetDateTime;

use crate::{
    Error,
    database_id::{DatabaseId, UserId},
    models::{NewRecurringDefinition, RecurringDefinition},
    stores::{RecurringStore, sqlite::parse_text_column},
};

const DEFINITION_COLUMNS: &str =
    "id, user_id, description, amount, kind, category, frequency, start_date, last_processed, active";

/// Stores recurring transaction definitions in a SQLite database.
#[derive(Debug, Clone)]
pub struct SQLiteRecurringStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteRecurringStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

impl RecurringStore for SQLiteRecurringStore {
    /// Create a new recurring definition in the database.
    ///
    /// The stored definition is active and has a null watermark.
    ///
    /// # Errors
    /// This function will return an [Error::SqlError] if there is an
    /// unexpected SQL error.
    ///
    /// # Panics
    /// Panics if the lock for the database connection is already held by
    /// the same thread.
    fn create(&mut self, definition: NewRecurringDefinition) -> Result<RecurringDefinition, Error> {
        let connection = self.connection.lock().unwrap();

        let definition = connection
            .prepare(&format!(
                "INSERT INTO recurring_transaction (user_id, description, amount, kind, category, frequency, start_date)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 RETURNING {DEFINITION_COLUMNS}"
            ))?
            .query_row(
                (
                    definition.user_id,
                    definition.description,
                    definition.amount,
                    definition.kind.to_string(),
                    definition.category,
                    definition.frequency.to_string(),
                    definition.start_date,
                ),
                map_definition_row,
            )?;

        Ok(definition)
    }

    /// Retrieve every active definition, across all owners.
    ///
    /// # Errors
    /// This function will return an [Error::SqlError] if there is an
    /// unexpected SQL error.
    ///
    /// # Panics
    /// Panics if the lock for the database connection is already held by
    /// the same thread.
    fn find_active(&self) -> Result<Vec<RecurringDefinition>, Error> {
        let connection = self.connection.lock().unwrap();

        let definitions = connection
            .prepare(&format!(
                "SELECT {DEFINITION_COLUMNS} FROM recurring_transaction WHERE active = 1 ORDER BY id"
            ))?
            .query_map((), map_definition_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(definitions)
    }

    /// Retrieve all of `user_id`'s definitions.
    ///
    /// # Errors
    /// This function will return an [Error::SqlError] if there is an
    /// unexpected SQL error.
    ///
    /// # Panics
    /// Panics if the lock for the database connection is already held by
    /// the same thread.
    fn get_by_user_id(&self, user_id: UserId) -> Result<Vec<RecurringDefinition>, Error> {
        let connection = self.connection.lock().unwrap();

        let definitions = connection
            .prepare(&format!(
                "SELECT {DEFINITION_COLUMNS} FROM recurring_transaction
                 WHERE user_id = :user_id ORDER BY id"
            ))?
            .query_map(&[(":user_id", &user_id)], map_definition_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(definitions)
    }

    /// Advance the watermark of definition `id` from `expected` to `value`.
    ///
    /// The `WHERE last_processed IS ?` clause makes the read-modify-write
    /// conditional: the row only changes if no other pass has touched the
    /// watermark since `expected` was read.
    ///
    /// # Errors
    /// This function will return an:
    /// - [Error::NotFound] if `id` does not refer to a definition,
    /// - [Error::WatermarkConflict] if the stored watermark is not `expected`,
    /// - [Error::SqlError] if there is some other SQL error.
    ///
    /// # Panics
    /// Panics if the lock for the database connection is already held by
    /// the same thread.
    fn update_last_processed(
        &mut self,
        id: DatabaseId,
        expected: Option<OffsetDateTime>,
        value: OffsetDateTime,
    ) -> Result<(), Error> {
        let connection = self.connection.lock().unwrap();

        let updated = connection.execute(
            "UPDATE recurring_transaction SET last_processed = ?2
             WHERE id = ?1 AND last_processed IS ?3",
            (id, value, expected),
        )?;

        if updated == 1 {
            return Ok(());
        }

        let exists = connection.query_row(
            "SELECT COUNT(id) FROM recurring_transaction WHERE id = :id",
            &[(":id", &id)],
            |row| row.get::<_, i64>(0),
        )?;

        if exists == 0 {
            Err(Error::NotFound)
        } else {
            Err(Error::WatermarkConflict)
        }
    }
}

/// Create the recurring transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub(crate) fn create_recurring_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS recurring_transaction (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                description TEXT NOT NULL,
                amount REAL NOT NULL,
                kind TEXT NOT NULL,
                category TEXT NOT NULL,
                frequency TEXT NOT NULL,
                start_date TEXT NOT NULL,
                last_processed TEXT,
                active INTEGER NOT NULL DEFAULT 1
                )",
        (),
    )?;

    Ok(())
}

/// Map a database row to a [RecurringDefinition].
fn map_definition_row(row: &Row) -> Result<RecurringDefinition, rusqlite::Error> {
    Ok(RecurringDefinition {
        id: row.get(0)?,
        user_id: row.get(1)?,
        description: row.get(2)?,
        amount: row.get(3)?,
        kind: parse_text_column(row, 4)?,
        category: row.get(5)?,
        frequency: parse_text_column(row, 6)?,
        start_date: row.get(7)?,
        last_processed: row.get(8)?,
        active: row.get(9)?,
    })
}
