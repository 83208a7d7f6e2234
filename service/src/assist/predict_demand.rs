//! [`Assist`] operation predicting forward-looking demand.

use common::operations::{By, Select};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::property,
    infra::{assist, database, Database},
    read,
    Service,
};

use super::Assist;

/// [`Assist`] operation predicting forward-looking demand.
///
/// Aggregated history comes from the booking ledger; the forecast itself is
/// purely advisory and never mutates pricing.
#[derive(Clone, Debug)]
pub struct PredictDemand {
    /// ID of the [`Property`] to predict demand for, or [`None`] for a
    /// platform-wide prediction.
    ///
    /// [`Property`]: crate::domain::Property
    pub property_id: Option<property::Id>,

    /// City context of the prediction, if known.
    pub city: Option<property::City>,
}

/// Output of the [`PredictDemand`] operation.
#[derive(Clone, Debug)]
pub struct Output {
    /// Forecast produced by the model (or its fallback).
    pub forecast: assist::Forecast,

    /// Month-bucketed history the forecast was based on.
    pub historical: Vec<read::booking::MonthlyVolume>,
}

impl<Db> Assist<PredictDemand> for Service<Db>
where
    Db: Database<
        Select<By<Vec<read::booking::MonthlyVolume>, Option<property::Id>>>,
        Ok = Vec<read::booking::MonthlyVolume>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Output;
    type Err = Traced<database::Error>;

    /// Predicts demand, falling back to the static
    /// [`assist::Forecast::fallback()`] on any upstream model failure.
    /// Database failures do propagate: without history there is nothing to
    /// predict from.
    async fn execute(&self, op: PredictDemand) -> Result<Self::Ok, Self::Err> {
        let PredictDemand { property_id, city } = op;

        let historical = self
            .database()
            .execute(Select(By::new(property_id)))
            .await
            .map_err(tracerr::wrap!())?;

        let forecast = self
            .assistant()
            .predict(city.as_ref(), &historical)
            .await
            .unwrap_or_else(|e| {
                log::warn!("demand prediction unavailable: {e}");
                assist::Forecast::fallback()
            });

        Ok(Output {
            forecast,
            historical,
        })
    }
}
