//! [`ReconcileCounters`] [`Task`].

use std::{convert::Infallible, error::Error, time};

use common::operations::{By, Perform, Start};
use tokio::time::interval;
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::property,
    infra::{database, Database},
    read,
    Service,
};

use super::Task;

/// Configuration for [`ReconcileCounters`] [`Task`].
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Interval between reconciliation passes.
    pub interval: time::Duration,
}

/// [`Task`] periodically recomputing the derived [`Property`] counters
/// (room totals, availability, rating aggregates) from their source rows.
///
/// The counters are already maintained transactionally on every mutation;
/// this pass is the safety net putting a bound on any drift.
///
/// [`Property`]: crate::domain::Property
#[derive(Clone, Copy, Debug)]
pub struct ReconcileCounters<S> {
    /// [`Config`] of this [`Task`].
    config: Config,

    /// [`Service`] instance.
    service: S,
}

impl<Db> Task<Start<By<ReconcileCounters<Self>, Config>>> for Service<Db>
where
    ReconcileCounters<Service<Db>>:
        Task<Perform<()>, Ok = (), Err: Error> + Send + Sync + 'static,
    Self: Clone,
{
    type Ok = ();
    type Err = Infallible;

    async fn execute(
        &self,
        Start(by): Start<By<ReconcileCounters<Self>, Config>>,
    ) -> Result<Self::Ok, Self::Err> {
        let config = by.into_inner();
        let task = ReconcileCounters {
            config,
            service: self.clone(),
        };

        let mut interval = interval(task.config.interval);
        loop {
            let _ = interval.tick().await;
            _ = task.execute(Perform(())).await.map_err(|e| {
                log::error!("`task::ReconcileCounters` failed: {e}");
            });
        }
    }
}

impl<Db> Task<Perform<()>> for ReconcileCounters<Service<Db>>
where
    Db: Database<
            Perform<By<read::property::RoomSummary, Option<property::Id>>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<
            Perform<By<read::property::RatingStats, Option<property::Id>>>,
            Ok = (),
            Err = Traced<database::Error>,
        >,
{
    type Ok = ();
    type Err = ExecutionError;

    async fn execute(&self, _: Perform<()>) -> Result<Self::Ok, Self::Err> {
        self.service
            .database()
            .execute(Perform(By::<read::property::RoomSummary, _>::new(None)))
            .await
            .map_err(tracerr::map_from_and_wrap!())?;
        self.service
            .database()
            .execute(Perform(By::<read::property::RatingStats, _>::new(None)))
            .await
            .map_err(tracerr::map_from_and_wrap!())
    }
}

/// Error of [`ReconcileCounters`] execution.
pub type ExecutionError = Traced<database::Error>;
