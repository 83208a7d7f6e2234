//! [`Review`]-related [`Database`] implementations.

use common::operations::{By, Delete, Insert, Select, Update};
use tokio_postgres::{types::ToSql, Row};
use tracerr::Traced;

use crate::{
    domain::{property, review, user, Review},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

/// Columns selected for a [`Review`].
const COLUMNS: &str = "\
    id, user_id, property_id, rating, title, text, \
    sentiment_score, sentiment_label, \
    flagged, flag_reason, helpful, created_at";

/// Maps a [`Row`] onto a [`Review`].
fn from_row(row: &Row) -> Review {
    Review {
        id: row.get("id"),
        user_id: row.get("user_id"),
        property_id: row.get("property_id"),
        rating: review::Rating::new(
            u8::try_from(row.get::<_, i16>("rating")).expect("1 to 5"),
        )
        .expect("`rating` out of range"),
        title: row.get("title"),
        text: row.get("text"),
        sentiment: review::Sentiment {
            score: row.get("sentiment_score"),
            label: row.get("sentiment_label"),
        },
        flagged: row.get("flagged"),
        flag_reason: row.get("flag_reason"),
        helpful: row.get("helpful"),
        created_at: row.get("created_at"),
    }
}

impl<C> Database<Select<By<Option<Review>, review::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Review>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Review>, review::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: review::Id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM reviews \
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

impl<C> Database<Select<By<Option<Review>, (user::Id, property::Id)>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Review>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Review>, (user::Id, property::Id)>>,
    ) -> Result<Self::Ok, Self::Err> {
        let (user_id, property_id) = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM reviews \
             WHERE user_id = $1::UUID \
               AND property_id = $2::UUID \
             LIMIT 1",
        );
        Ok(self
            .query_opt(&sql, &[&user_id, &property_id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row))
    }
}

impl<C> Database<Select<By<Vec<Review>, property::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Review>;
    type Err = Traced<database::Error>;

    /// Selects the publicly visible (non-flagged) reviews of a property.
    async fn execute(
        &self,
        Select(by): Select<By<Vec<Review>, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let property_id: property::Id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM reviews \
             WHERE property_id = $1::UUID \
               AND NOT flagged \
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

impl<C>
    Database<
        Select<By<read::review::list::Page, read::review::list::Selector>>,
    > for Postgres<C>
where
    C: Connection,
{
    type Ok = read::review::list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::review::list::Page, read::review::list::Selector>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::review::list::Selector {
            arguments,
            filter: read::review::list::Filter { flagged },
        } = by.into_inner();

        let limit = i64::try_from(arguments.limit()).unwrap_or(i64::MAX);
        let offset = i64::try_from(arguments.offset()).unwrap_or(i64::MAX);

        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![&limit, &offset];
        let flagged_idx = flagged.as_ref().map(|f| {
            ps.push(f);
            ps.len()
        });

        let flagged_filter = flagged_idx
            .map(|idx| format!("WHERE flagged = ${idx}::BOOL "))
            .unwrap_or_default();

        let sql = format!(
            "SELECT {COLUMNS}, COUNT(*) OVER ()::INT8 AS total \
             FROM reviews \
             {flagged_filter}\
             ORDER BY created_at DESC \
             LIMIT $1::INT8 \
             OFFSET $2::INT8",
        );
        let rows = self
            .query(&sql, ps.as_slice())
            .await
            .map_err(tracerr::wrap!())?;

        let total = rows
            .first()
            .map(|row| row.get::<_, i64>("total"))
            .and_then(|t| u64::try_from(t).ok())
            .unwrap_or_default();
        let reviews = rows.iter().map(from_row).collect::<Vec<_>>();

        Ok(read::review::list::Page::new(&arguments, reviews, total))
    }
}

impl<C> Database<Insert<Review>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(review): Insert<Review>,
    ) -> Result<Self::Ok, Self::Err> {
        let Review {
            id,
            user_id,
            property_id,
            rating,
            title,
            text,
            sentiment,
            flagged,
            flag_reason,
            helpful,
            created_at,
        } = review;

        let rating = i16::from(u8::from(rating));

        const SQL: &str = "\
            INSERT INTO reviews (\
                id, user_id, property_id, rating, title, text, \
                sentiment_score, sentiment_label, \
                flagged, flag_reason, helpful, created_at \
            ) VALUES (\
                $1::UUID, $2::UUID, $3::UUID, $4::INT2, \
                $5::VARCHAR, $6::VARCHAR, \
                $7::NUMERIC, $8::INT2, \
                $9::BOOL, $10::VARCHAR, $11::INT4, $12::TIMESTAMPTZ \
            )";
        self.exec(
            SQL,
            &[
                &id,
                &user_id,
                &property_id,
                &rating,
                &title,
                &text,
                &sentiment.score,
                &sentiment.label,
                &flagged,
                &flag_reason,
                &helpful,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Update<Review>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(review): Update<Review>,
    ) -> Result<Self::Ok, Self::Err> {
        let Review {
            id,
            flagged,
            flag_reason,
            helpful,
            ..
        } = review;

        // Author, rating and text are immutable; only moderation state and
        // the helpful counter change.
        const SQL: &str = "\
            UPDATE reviews \
            SET flagged = $2::BOOL, \
                flag_reason = $3::VARCHAR, \
                helpful = $4::INT4 \
            WHERE id = $1::UUID";
        self.exec(SQL, &[&id, &flagged, &flag_reason, &helpful])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Delete<By<Review, review::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Review, review::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: review::Id = by.into_inner();

        const SQL: &str = "\
            DELETE FROM reviews \
            WHERE id = $1::UUID";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
