//! Route handlers for recurring transaction definitions and the sweep.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

use crate::{
    Error,
    clock::Clock,
    database_id::UserId,
    engine::{materialize_on_create, run_sweep},
    models::{NewRecurringDefinition, TransactionKind, parse_date},
    state::AppState,
    stores::{RecurringStore, TransactionStore},
};

/// The client's data for a new recurring definition.
///
/// `frequency` and `start_date` stay raw strings here so validation (and
/// its error messages) happen in [NewRecurringDefinition::new] rather than
/// inside the deserializer.
#[derive(Debug, Deserialize)]
pub struct CreateRecurringData {
    /// The user the definition belongs to.
    pub user_id: UserId,
    /// The description copied onto each produced transaction.
    pub description: String,
    /// The amount copied onto each produced transaction.
    pub amount: f64,
    /// Whether the produced transactions are income or expenses.
    pub kind: TransactionKind,
    /// The category copied onto each produced transaction.
    pub category: String,
    /// How often the definition produces a transaction.
    pub frequency: String,
    /// The date of the first occurrence as a `YYYY-MM-DD` string.
    pub start_date: String,
}

/// A route handler for creating a new recurring definition.
///
/// The definition is validated, persisted, and run through the creation
/// gate: a start date that has already arrived produces the first
/// occurrence immediately (exactly one transaction, however old the start
/// date), while the backfill of any remaining occurrences is left to the
/// sweep. The response carries the definition as stored, watermark
/// included.
pub async fn create_recurring<R, T, C>(
    State(state): State<AppState<R, T, C>>,
    Json(data): Json<CreateRecurringData>,
) -> Result<impl IntoResponse, Error>
where
    R: RecurringStore + Clone + Send + Sync,
    T: TransactionStore + Clone + Send + Sync,
    C: Clock,
{
    let new_definition = NewRecurringDefinition::new(
        data.user_id,
        &data.description,
        data.amount,
        data.kind,
        &data.category,
        &data.frequency,
        &data.start_date,
        &state.category_catalog,
    )?;

    let mut recurring_store = state.recurring_store.clone();
    let mut transaction_store = state.transaction_store.clone();

    let mut definition = recurring_store.create(new_definition)?;
    materialize_on_create(
        &mut definition,
        &mut recurring_store,
        &mut transaction_store,
        &state.clock,
    )?;

    Ok((StatusCode::CREATED, Json(definition)))
}

/// The query parameters scoping a definition listing to its owner.
#[derive(Debug, Deserialize)]
pub struct ListRecurringParams {
    /// The user whose definitions to list.
    pub user_id: UserId,
}

/// A route handler listing a user's recurring definitions.
pub async fn get_recurring<R, T, C>(
    State(state): State<AppState<R, T, C>>,
    Query(params): Query<ListRecurringParams>,
) -> Result<impl IntoResponse, Error>
where
    R: RecurringStore + Clone + Send + Sync,
    T: TransactionStore + Clone + Send + Sync,
    C: Clock,
{
    let definitions = state.recurring_store.get_by_user_id(params.user_id)?;

    Ok(Json(definitions))
}

/// The body for a hand-triggered sweep.
#[derive(Debug, Default, Deserialize)]
pub struct SweepData {
    /// Sweep up to this `YYYY-MM-DD` date instead of today.
    pub as_of: Option<String>,
}

/// A route handler running one materialization sweep.
///
/// Accepts an optional JSON body with an `as_of` date for testing; with no
/// body the sweep runs up to today, exactly like a scheduled firing.
pub async fn trigger_sweep<R, T, C>(
    State(state): State<AppState<R, T, C>>,
    data: Option<Json<SweepData>>,
) -> Result<impl IntoResponse, Error>
where
    R: RecurringStore + Clone + Send + Sync,
    T: TransactionStore + Clone + Send + Sync,
    C: Clock,
{
    let data = data.map(|Json(data)| data).unwrap_or_default();

    let as_of = match &data.as_of {
        Some(text) => parse_date(text)?,
        None => state.clock.today(),
    };

    let mut recurring_store = state.recurring_store.clone();
    let mut transaction_store = state.transaction_store.clone();

    let report = run_sweep(
        as_of,
        &mut recurring_store,
        &mut transaction_store,
        &state.clock,
    )
    .await?;

    Ok(Json(report))
}
