//! Implements a struct that holds the state of the REST server.

use crate::{category::CategoryCatalog, clock::Clock, stores::{RecurringStore, TransactionStore}};

/// The state shared by the route handlers.
///
/// The stores and the clock are generic so tests can substitute fakes and
/// freeze time; the server binary instantiates the SQLite stores and the
/// system clock.
#[derive(Debug, Clone)]
pub struct AppState<R, T, C>
where
    R: RecurringStore + Clone + Send + Sync,
    T: TransactionStore + Clone + Send + Sync,
    C: Clock,
{
    /// The store for recurring transaction definitions.
    pub recurring_store: R,
    /// The store transactions are appended to.
    pub transaction_store: T,
    /// The categories a definition may use, per transaction kind.
    pub category_catalog: CategoryCatalog,
    /// Where the handlers and the engine read the current time from.
    pub clock: C,
}

impl<R, T, C> AppState<R, T, C>
where
    R: RecurringStore + Clone + Send + Sync,
    T: TransactionStore + Clone + Send + Sync,
    C: Clock,
{
    /// Create a new [AppState].
    pub fn new(
        recurring_store: R,
        transaction_store: T,
        category_catalog: CategoryCatalog,
        clock: C,
    ) -> Self {
        Self {
            recurring_store,
            transaction_store,
            category_catalog,
            clock,
        }
    }
}
