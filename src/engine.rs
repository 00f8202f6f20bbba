//! The recurring transaction materialization engine.
//!
//! [materialize] expands one definition's due occurrences into concrete
//! transactions, [materialize_on_create] handles the deliberately narrower
//! creation-time path, and [run_sweep] drives a full pass over every
//! active definition. All three are safe to invoke redundantly: the
//! transaction store deduplicates occurrences and the watermark update is
//! conditional, so re-running a pass creates nothing twice.

use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    calendar::next_occurrence,
    clock::Clock,
    models::{NewTransaction, RecurringDefinition, Transaction},
    stores::{RecurringStore, TransactionStore},
};

/// The result of one materialization pass over a definition.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterializeOutcome {
    /// The transactions created by this pass, in increasing date order.
    pub created: Vec<Transaction>,
    /// The definition with its watermark as the pass left it.
    pub definition: RecurringDefinition,
}

/// Expand every outstanding occurrence of `definition` up to and including
/// `as_of` into transactions, then advance the watermark to `clock.now()`.
///
/// The pass resumes from the occurrences already recorded for the
/// definition: the cursor walks the occurrence grid forward from
/// `start_date`, skipping dates that already have a transaction. It walks
/// rather than jumps so the monthly end-of-month clamp carries forward
/// identically on every pass. Occurrences are emitted strictly in
/// increasing date order.
///
/// Because the resume point comes from the recorded transactions, a pass
/// that died after appending but before the watermark update picks up
/// exactly where it left off, and a redundant pass with the same `as_of`
/// emits nothing.
///
/// An inactive definition is skipped entirely: no transactions, no
/// watermark movement.
///
/// # Errors
/// This function will return an:
/// - [Error::WatermarkConflict] if a concurrent pass advanced the
///   watermark after `definition` was read,
/// - or any store error raised while appending, in which case the
///   watermark is left untouched so the next sweep retries the window.
pub fn materialize<R, T, C>(
    definition: &RecurringDefinition,
    as_of: Date,
    recurring_store: &mut R,
    transaction_store: &mut T,
    clock: &C,
) -> Result<MaterializeOutcome, Error>
where
    R: RecurringStore,
    T: TransactionStore,
    C: Clock,
{
    if !definition.active {
        return Ok(MaterializeOutcome {
            created: Vec::new(),
            definition: definition.clone(),
        });
    }

    let mut cursor = definition.start_date;
    if let Some(latest) = transaction_store.latest_occurrence_date(definition.id)? {
        while cursor <= latest {
            cursor = next_occurrence(cursor, definition.frequency);
        }
    }

    let mut created = Vec::new();
    while cursor <= as_of {
        let appended = transaction_store.append(NewTransaction {
            user_id: definition.user_id,
            description: definition.description.clone(),
            amount: definition.amount,
            kind: definition.kind,
            category: definition.category.clone(),
            date: cursor,
            recurring_id: Some(definition.id),
        })?;

        if let Some(transaction) = appended {
            created.push(transaction);
        }

        cursor = next_occurrence(cursor, definition.frequency);
    }

    let now = clock.now();
    recurring_store.update_last_processed(definition.id, definition.last_processed, now)?;

    Ok(MaterializeOutcome {
        created,
        definition: RecurringDefinition {
            last_processed: Some(now),
            ..definition.clone()
        },
    })
}

/// Materialize the first occurrence of a just-created definition.
///
/// A definition whose `start_date` has already arrived produces exactly
/// one transaction, dated `start_date`, no matter how far back that date
/// lies; the historical backfill is left to the sweep's next pass. A
/// definition starting in the future is left untouched, watermark null,
/// for the sweep to pick up once the date arrives.
///
/// If the sweep processes the definition concurrently with its creation,
/// the occurrence constraint keeps the first transaction single and the
/// resulting watermark conflict is absorbed rather than surfaced; the
/// definition's watermark then reflects the sweep's pass.
///
/// `definition.last_processed` is updated in place when the gate runs so
/// the caller can return the definition as the store now holds it.
///
/// # Errors
/// A failed append surfaces the error and leaves the watermark null, so
/// the next sweep retries from `start_date`.
pub fn materialize_on_create<R, T, C>(
    definition: &mut RecurringDefinition,
    recurring_store: &mut R,
    transaction_store: &mut T,
    clock: &C,
) -> Result<Option<Transaction>, Error>
where
    R: RecurringStore,
    T: TransactionStore,
    C: Clock,
{
    if definition.start_date > clock.today() {
        return Ok(None);
    }

    let created = transaction_store.append(NewTransaction {
        user_id: definition.user_id,
        description: definition.description.clone(),
        amount: definition.amount,
        kind: definition.kind,
        category: definition.category.clone(),
        date: definition.start_date,
        recurring_id: Some(definition.id),
    })?;

    let now = clock.now();
    match recurring_store.update_last_processed(definition.id, definition.last_processed, now) {
        Ok(()) => definition.last_processed = Some(now),
        Err(Error::WatermarkConflict) => {
            tracing::debug!(
                "recurring definition {} was swept while it was being created",
                definition.id
            );
        }
        Err(error) => return Err(error),
    }

    Ok(created)
}

/// A summary of one sweep over the active definitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    /// How many definitions the sweep visited successfully.
    pub definitions_processed: usize,
    /// How many transactions the sweep created in total.
    pub transactions_created: usize,
    /// How many definitions failed and were left for the next sweep.
    pub failures: usize,
}

/// Run one sweep: materialize every active definition up to `as_of`.
///
/// Definitions are processed sequentially and independently. A failing
/// definition is logged and counted, never allowed to abort the rest of
/// the sweep, and control is yielded back to the runtime between
/// definitions so a large sweep does not starve request handling.
///
/// # Errors
/// This function will return an [Error::SqlError] if the active
/// definitions cannot be loaded at all; per-definition errors are absorbed
/// into the report.
pub async fn run_sweep<R, T, C>(
    as_of: Date,
    recurring_store: &mut R,
    transaction_store: &mut T,
    clock: &C,
) -> Result<SweepReport, Error>
where
    R: RecurringStore,
    T: TransactionStore,
    C: Clock,
{
    let definitions = recurring_store.find_active()?;

    let mut report = SweepReport {
        definitions_processed: 0,
        transactions_created: 0,
        failures: 0,
    };

    for definition in definitions {
        match materialize(&definition, as_of, recurring_store, transaction_store, clock) {
            Ok(outcome) => {
                report.definitions_processed += 1;
                report.transactions_created += outcome.created.len();
            }
            Err(error) => {
                report.failures += 1;
                tracing::error!(
                    "sweep failed for recurring definition {}: {error}",
                    definition.id
                );
            }
        }

        tokio::task::yield_now().await;
    }

    Ok(report)
}
