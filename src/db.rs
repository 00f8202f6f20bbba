//! Database initialization for the application's SQLite schema.

use rusqlite::Connection;

use crate::stores::sqlite::{create_recurring_table, create_transaction_table};

/// Create the application's tables if they do not exist.
///
/// # Errors
/// Returns an error if a table cannot be created or if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), rusqlite::Error> {
    let transaction = rusqlite::Transaction::new_unchecked(
        connection,
        rusqlite::TransactionBehavior::Exclusive,
    )?;

    create_transaction_table(&transaction)?;
    create_recurring_table(&transaction)?;

    transaction.commit()
}

#[cfg(test)]
mod initialize_tests {
    use rusqlite::Connection;

    use crate::db::initialize;

    #[test]
    fn initialize_is_idempotent() {
        let connection = Connection::open_in_memory().unwrap();

        initialize(&connection).expect("Could not initialize the database");
        initialize(&connection).expect("Could not re-initialize the database");
    }
}
