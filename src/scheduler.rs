//! The periodic sweep scheduler.
//!
//! Instead of an ambient process-wide timer, the sweep loop is an owned
//! object with an injected clock and an explicit lifecycle: [SweepScheduler::start]
//! spawns the loop and returns a [SchedulerHandle] whose
//! [stop](SchedulerHandle::stop) ends it, so tests and shutdown paths can
//! control the timer instead of racing it.

use std::time::Duration;

use tokio::{sync::oneshot, task::JoinHandle, time::MissedTickBehavior};

use crate::{
    clock::Clock,
    engine,
    stores::{RecurringStore, TransactionStore},
};

/// Drives [engine::run_sweep] once at startup and then on a fixed period.
#[derive(Debug)]
pub struct SweepScheduler<R, T, C>
where
    R: RecurringStore + Send + 'static,
    T: TransactionStore + Send + 'static,
    C: Clock,
{
    recurring_store: R,
    transaction_store: T,
    clock: C,
    period: Duration,
}

impl<R, T, C> SweepScheduler<R, T, C>
where
    R: RecurringStore + Send + 'static,
    T: TransactionStore + Send + 'static,
    C: Clock,
{
    /// Create a scheduler that sweeps every `period`.
    pub fn new(recurring_store: R, transaction_store: T, clock: C, period: Duration) -> Self {
        Self {
            recurring_store,
            transaction_store,
            clock,
            period,
        }
    }

    /// Start the sweep loop on the runtime.
    ///
    /// The first sweep runs immediately. Later sweeps run every period; a
    /// sweep that overruns its period simply delays the next firing rather
    /// than letting ticks pile up.
    pub fn start(mut self) -> SchedulerHandle {
        let (shutdown, mut shutdown_receiver) = oneshot::channel();

        let task = tokio::spawn(async move {
            let mut timer = tokio::time::interval(self.period);
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = timer.tick() => {
                        let as_of = self.clock.today();

                        match engine::run_sweep(
                            as_of,
                            &mut self.recurring_store,
                            &mut self.transaction_store,
                            &self.clock,
                        )
                        .await
                        {
                            Ok(report) => tracing::info!(
                                "sweep for {as_of}: {} definitions processed, {} transactions created, {} failures",
                                report.definitions_processed,
                                report.transactions_created,
                                report.failures,
                            ),
                            Err(error) => {
                                tracing::error!("sweep for {as_of} could not run: {error}")
                            }
                        }
                    }
                    _ = &mut shutdown_receiver => break,
                }
            }

            tracing::debug!("sweep scheduler stopped");
        });

        SchedulerHandle { shutdown, task }
    }
}

/// Stops a running [SweepScheduler].
#[derive(Debug)]
pub struct SchedulerHandle {
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Signal the sweep loop to stop and wait for it to finish.
    pub async fn stop(self) {
        let _ = self.shutdown.send(());
        let _ = self.task.await;
    }
}

#[cfg(test)]
mod sweep_scheduler_tests {
    use std::{
        sync::{Arc, Mutex},
        time::Duration,
    };

    use rusqlite::Connection;
    use time::macros::{date, datetime};

    use crate::{
        category::CategoryCatalog,
        clock::FixedClock,
        db::initialize,
        models::{NewRecurringDefinition, TransactionKind},
        scheduler::SweepScheduler,
        stores::{
            RecurringStore, TransactionStore,
            sqlite::{SQLiteRecurringStore, SQLiteTransactionStore},
        },
    };

    fn get_test_stores() -> (SQLiteRecurringStore, SQLiteTransactionStore) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let connection = Arc::new(Mutex::new(connection));

        (
            SQLiteRecurringStore::new(connection.clone()),
            SQLiteTransactionStore::new(connection),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn scheduler_sweeps_immediately_and_re_fires_idempotently() {
        let (mut recurring_store, transaction_store) = get_test_stores();
        let clock = FixedClock(datetime!(2024-01-22 10:00:00 UTC));
        recurring_store
            .create(
                NewRecurringDefinition::new(
                    1,
                    "Paycheck",
                    1250.5,
                    TransactionKind::Income,
                    "Salary",
                    "weekly",
                    "2024-01-01",
                    &CategoryCatalog::default(),
                )
                .unwrap(),
            )
            .unwrap();

        let scheduler = SweepScheduler::new(
            recurring_store.clone(),
            transaction_store.clone(),
            clock,
            Duration::from_secs(24 * 60 * 60),
        );
        let handle = scheduler.start();

        // The first firing happens at startup, not a period later.
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(
            transaction_store.latest_occurrence_date(1),
            Ok(Some(date!(2024 - 01 - 22)))
        );
        let first_watermark = recurring_store.get_by_user_id(1).unwrap()[0].last_processed;
        assert!(first_watermark.is_some());

        // A day later the sweep fires again; with a frozen clock there is
        // nothing new to materialize.
        tokio::time::sleep(Duration::from_secs(24 * 60 * 60)).await;
        let definitions = recurring_store.get_by_user_id(1).unwrap();
        assert_eq!(definitions[0].last_processed, first_watermark);

        handle.stop().await;
    }
}
