//! [`Room`]-related [`Database`] implementations.

use common::{
    money::Currency,
    operations::{By, Insert, Select, Update},
    Money,
};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{property, room, Room},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

/// Columns selected for a [`Room`].
const COLUMNS: &str = "\
    id, property_id, name, kind, \
    price_daily, price_weekly, price_monthly, \
    capacity, total_beds, available_beds, \
    ac, attached_bathroom, active, created_at";

/// Maps a [`Row`] onto a [`Room`].
fn from_row(row: &Row) -> Room {
    let money = |amount| Money {
        amount,
        currency: Currency::Inr,
    };

    Room {
        id: row.get("id"),
        property_id: row.get("property_id"),
        name: row.get("name"),
        kind: row.get("kind"),
        price: room::Price {
            daily: money(row.get("price_daily")),
            weekly: row.get::<_, Option<_>>("price_weekly").map(money),
            monthly: row.get::<_, Option<_>>("price_monthly").map(money),
        },
        capacity: u16::try_from(row.get::<_, i32>("capacity"))
            .expect("`capacity` overflow"),
        total_beds: u16::try_from(row.get::<_, i32>("total_beds"))
            .expect("`total_beds` overflow"),
        available_beds: u16::try_from(row.get::<_, i32>("available_beds"))
            .expect("`available_beds` overflow"),
        ac: row.get("ac"),
        attached_bathroom: row.get("attached_bathroom"),
        active: row.get("active"),
        created_at: row.get("created_at"),
    }
}

impl<C> Database<Select<By<Option<Room>, room::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Room>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Room>, room::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: room::Id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM rooms \
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

impl<C> Database<Select<By<Vec<Room>, property::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Room>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Room>, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let property_id: property::Id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM rooms \
             WHERE property_id = $1::UUID \
             ORDER BY created_at",
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

impl<C> Database<Insert<Room>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(room): Insert<Room>,
    ) -> Result<Self::Ok, Self::Err> {
        let Room {
            id,
            property_id,
            name,
            kind,
            price,
            capacity,
            total_beds,
            available_beds,
            ac,
            attached_bathroom,
            active,
            created_at,
        } = room;

        let price_daily = price.daily.amount;
        let price_weekly = price.weekly.map(|m| m.amount);
        let price_monthly = price.monthly.map(|m| m.amount);
        let capacity = i32::from(capacity);
        let total_beds = i32::from(total_beds);
        let available_beds = i32::from(available_beds);

        const SQL: &str = "\
            INSERT INTO rooms (\
                id, property_id, name, kind, \
                price_daily, price_weekly, price_monthly, \
                capacity, total_beds, available_beds, \
                ac, attached_bathroom, active, created_at \
            ) VALUES (\
                $1::UUID, $2::UUID, $3::VARCHAR, $4::INT2, \
                $5::NUMERIC, $6::NUMERIC, $7::NUMERIC, \
                $8::INT4, $9::INT4, $10::INT4, \
                $11::BOOL, $12::BOOL, $13::BOOL, $14::TIMESTAMPTZ \
            )";
        self.exec(
            SQL,
            &[
                &id,
                &property_id,
                &name,
                &kind,
                &price_daily,
                &price_weekly,
                &price_monthly,
                &capacity,
                &total_beds,
                &available_beds,
                &ac,
                &attached_bathroom,
                &active,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Update<(room::BedAdjustment, room::Id)>> for Postgres<C>
where
    C: Connection,
{
    type Ok = bool;
    type Err = Traced<database::Error>;

    /// Adjusts [`Room::available_beds`] by one, conditionally.
    ///
    /// The condition lives in the SQL itself, so concurrent writers can
    /// never drive the counter below zero or above the bed total: the
    /// losing writer affects zero rows and gets `false` back.
    async fn execute(
        &self,
        Update((adjustment, id)): Update<(room::BedAdjustment, room::Id)>,
    ) -> Result<Self::Ok, Self::Err> {
        const OCCUPY: &str = "\
            UPDATE rooms \
            SET available_beds = available_beds - 1 \
            WHERE id = $1::UUID \
              AND available_beds > 0";
        const RELEASE: &str = "\
            UPDATE rooms \
            SET available_beds = available_beds + 1 \
            WHERE id = $1::UUID \
              AND available_beds < total_beds";

        let sql = match adjustment {
            room::BedAdjustment::Occupy => OCCUPY,
            room::BedAdjustment::Release => RELEASE,
        };
        self.exec(sql, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(|affected| affected > 0)
    }
}
