//! [`Complaint`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select, Update};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{complaint, property, user, Complaint},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

/// Columns selected for a [`Complaint`].
const COLUMNS: &str = "\
    id, user_id, property_id, title, description, \
    category, priority, status, \
    ai_category, ai_priority, ai_sentiment_score, ai_confidence, \
    resolution_text, resolved_by, resolved_at, created_at";

/// Maps a [`Row`] onto a [`Complaint`].
fn from_row(row: &Row) -> Complaint {
    let classification = match (
        row.get::<_, Option<_>>("ai_category"),
        row.get::<_, Option<_>>("ai_priority"),
    ) {
        (Some(suggested_category), Some(suggested_priority)) => {
            Some(complaint::Classification {
                suggested_category,
                suggested_priority,
                sentiment_score: row
                    .get::<_, Option<_>>("ai_sentiment_score")
                    .unwrap_or_default(),
                confidence: row
                    .get::<_, Option<_>>("ai_confidence")
                    .unwrap_or_default(),
            })
        }
        (Some(_) | None, _) => None,
    };

    let resolution = match (
        row.get::<_, Option<_>>("resolution_text"),
        row.get::<_, Option<_>>("resolved_by"),
        row.get::<_, Option<_>>("resolved_at"),
    ) {
        (Some(text), Some(resolved_by), Some(resolved_at)) => {
            Some(complaint::Resolution {
                text,
                resolved_by,
                resolved_at,
            })
        }
        _ => None,
    };

    Complaint {
        id: row.get("id"),
        user_id: row.get("user_id"),
        property_id: row.get("property_id"),
        title: row.get("title"),
        description: row.get("description"),
        category: row.get("category"),
        priority: row.get("priority"),
        status: row.get("status"),
        classification,
        resolution,
        created_at: row.get("created_at"),
    }
}

impl<C> Database<Select<By<Option<Complaint>, complaint::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Complaint>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Complaint>, complaint::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: complaint::Id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM complaints \
             WHERE id = $1::UUID \
             LIMIT 1",
        );
        Ok(self
            .query_opt(&sql, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row))
    }
}

impl<C> Database<Select<By<Vec<Complaint>, user::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Complaint>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Complaint>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let user_id: user::Id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM complaints \
             WHERE user_id = $1::UUID \
             ORDER BY created_at DESC",
        );
        Ok(self
            .query(&sql, &[&user_id])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C> Database<Select<By<Vec<Complaint>, property::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Complaint>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Complaint>, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let property_id: property::Id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM complaints \
             WHERE property_id = $1::UUID \
             ORDER BY created_at DESC",
        );
        Ok(self
            .query(&sql, &[&property_id])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C> Database<Insert<Complaint>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(complaint): Insert<Complaint>,
    ) -> Result<Self::Ok, Self::Err> {
        let Complaint {
            id,
            user_id,
            property_id,
            title,
            description,
            category,
            priority,
            status,
            classification,
            resolution,
            created_at,
        } = complaint;

        let ai_category = classification.map(|c| c.suggested_category);
        let ai_priority = classification.map(|c| c.suggested_priority);
        let ai_sentiment_score = classification.map(|c| c.sentiment_score);
        let ai_confidence = classification.map(|c| c.confidence);
        let resolution_text = resolution.as_ref().map(|r| r.text.clone());
        let resolved_by = resolution.as_ref().map(|r| r.resolved_by);
        let resolved_at = resolution.as_ref().map(|r| r.resolved_at);

        const SQL: &str = "\
            INSERT INTO complaints (\
                id, user_id, property_id, title, description, \
                category, priority, status, \
                ai_category, ai_priority, ai_sentiment_score, ai_confidence, \
                resolution_text, resolved_by, resolved_at, created_at \
            ) VALUES (\
                $1::UUID, $2::UUID, $3::UUID, $4::VARCHAR, $5::VARCHAR, \
                $6::INT2, $7::INT2, $8::INT2, \
                $9::INT2, $10::INT2, $11::NUMERIC, $12::NUMERIC, \
                $13::VARCHAR, $14::UUID, $15::TIMESTAMPTZ, $16::TIMESTAMPTZ \
            )";
        self.exec(
            SQL,
            &[
                &id,
                &user_id,
                &property_id,
                &title,
                &description,
                &category,
                &priority,
                &status,
                &ai_category,
                &ai_priority,
                &ai_sentiment_score,
                &ai_confidence,
                &resolution_text,
                &resolved_by,
                &resolved_at,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Update<Complaint>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(complaint): Update<Complaint>,
    ) -> Result<Self::Ok, Self::Err> {
        let Complaint {
            id,
            category,
            priority,
            status,
            resolution,
            ..
        } = complaint;

        let resolution_text = resolution.as_ref().map(|r| r.text.clone());
        let resolved_by = resolution.as_ref().map(|r| r.resolved_by);
        let resolved_at = resolution.as_ref().map(|r| r.resolved_at);

        // Author, property and text are immutable; triage fields and the
        // resolution change over the complaint lifecycle.
        const SQL: &str = "\
            UPDATE complaints \
            SET category = $2::INT2, \
                priority = $3::INT2, \
                status = $4::INT2, \
                resolution_text = $5::VARCHAR, \
                resolved_by = $6::UUID, \
                resolved_at = $7::TIMESTAMPTZ \
            WHERE id = $1::UUID";
        self.exec(
            SQL,
            &[
                &id,
                &category,
                &priority,
                &status,
                &resolution_text,
                &resolved_by,
                &resolved_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}
