//! Application router configuration.

pub mod endpoints;
mod recurring;

use axum::{
    Router,
    routing::{get, post},
};

use crate::{
    clock::Clock,
    routes::recurring::{create_recurring, get_recurring, trigger_sweep},
    state::AppState,
    stores::{RecurringStore, TransactionStore},
};

/// Return a router with all the app's routes.
pub fn build_router<R, T, C>(state: AppState<R, T, C>) -> Router
where
    R: RecurringStore + Clone + Send + Sync + 'static,
    T: TransactionStore + Clone + Send + Sync + 'static,
    C: Clock,
{
    Router::new()
        .route(endpoints::RECURRING, post(create_recurring))
        .route(endpoints::RECURRING, get(get_recurring))
        .route(endpoints::RECURRING_SWEEP, post(trigger_sweep))
        .with_state(state)
}
