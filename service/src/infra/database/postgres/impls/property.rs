//! [`Property`]-related [`Database`] implementations.

use common::{
    money::Currency,
    operations::{By, Insert, Lock, Perform, Select},
    Money,
};
use tokio_postgres::{types::ToSql, Row};
use tracerr::Traced;

use crate::{
    domain::{property, Property},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

/// Columns selected for a [`Property`].
const COLUMNS: &str = "\
    id, name, slug, description, kind, gender, \
    address, city, state, pincode, lat, lng, \
    amenities, rules, starting_from, security_deposit, owner_id, \
    avg_rating, total_reviews, total_rooms, available_rooms, \
    verified, featured, active, created_at";

/// Maps a [`Row`] onto a [`Property`].
fn from_row(row: &Row) -> Property {
    let coordinates = match (
        row.get::<_, Option<_>>("lat"),
        row.get::<_, Option<_>>("lng"),
    ) {
        (Some(lat), Some(lng)) => Some(property::Coordinates { lat, lng }),
        (Some(_) | None, _) => None,
    };

    Property {
        id: row.get("id"),
        name: row.get("name"),
        slug: row.get("slug"),
        description: row.get("description"),
        kind: row.get("kind"),
        gender: row.get("gender"),
        location: property::Location {
            address: row.get("address"),
            city: row.get("city"),
            state: row.get("state"),
            pincode: row.get("pincode"),
            coordinates,
        },
        amenities: row.get("amenities"),
        rules: row.get("rules"),
        pricing: property::Pricing {
            starting_from: Money {
                amount: row.get("starting_from"),
                currency: Currency::Inr,
            },
            security_deposit: Money {
                amount: row.get("security_deposit"),
                currency: Currency::Inr,
            },
        },
        owner_id: row.get("owner_id"),
        avg_rating: row.get("avg_rating"),
        total_reviews: row.get("total_reviews"),
        total_rooms: row.get("total_rooms"),
        available_rooms: row.get("available_rooms"),
        verified: row.get("verified"),
        featured: row.get("featured"),
        active: row.get("active"),
        created_at: row.get("created_at"),
    }
}

impl<C> Database<Select<By<Option<Property>, property::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Property>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Property>, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: property::Id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM properties \
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

impl<'s, C> Database<Select<By<Option<Property>, &'s property::Slug>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Property>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Property>, &'s property::Slug>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let slug: &property::Slug = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM properties \
             WHERE slug = $1::VARCHAR \
             LIMIT 1",
        );
        Ok(self
            .query_opt(&sql, &[slug])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row))
    }
}

impl<C> Database<Insert<Property>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(property): Insert<Property>,
    ) -> Result<Self::Ok, Self::Err> {
        let Property {
            id,
            name,
            slug,
            description,
            kind,
            gender,
            location,
            amenities,
            rules,
            pricing,
            owner_id,
            avg_rating,
            total_reviews,
            total_rooms,
            available_rooms,
            verified,
            featured,
            active,
            created_at,
        } = property;

        let lat = location.coordinates.map(|c| c.lat);
        let lng = location.coordinates.map(|c| c.lng);
        let starting_from = pricing.starting_from.amount;
        let security_deposit = pricing.security_deposit.amount;

        const SQL: &str = "\
            INSERT INTO properties (\
                id, name, slug, description, kind, gender, \
                address, city, state, pincode, lat, lng, \
                amenities, rules, starting_from, security_deposit, owner_id, \
                avg_rating, total_reviews, total_rooms, available_rooms, \
                verified, featured, active, created_at \
            ) VALUES (\
                $1::UUID, $2::VARCHAR, $3::VARCHAR, $4::VARCHAR, \
                $5::INT2, $6::INT2, \
                $7::VARCHAR, $8::VARCHAR, $9::VARCHAR, $10::VARCHAR, \
                $11::NUMERIC, $12::NUMERIC, \
                $13::INT2[], $14::VARCHAR[], $15::NUMERIC, $16::NUMERIC, \
                $17::UUID, \
                $18::NUMERIC, $19::INT4, $20::INT4, $21::INT4, \
                $22::BOOL, $23::BOOL, $24::BOOL, $25::TIMESTAMPTZ \
            )";
        self.exec(
            SQL,
            &[
                &id,
                &name,
                &slug,
                &description,
                &kind,
                &gender,
                &location.address,
                &location.city,
                &location.state,
                &location.pincode,
                &lat,
                &lng,
                &amenities,
                &rules,
                &starting_from,
                &security_deposit,
                &owner_id,
                &avg_rating,
                &total_reviews,
                &total_rooms,
                &available_rooms,
                &verified,
                &featured,
                &active,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Lock<By<Property, property::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Property, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: property::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM properties \
            WHERE id = $1::UUID \
            FOR UPDATE";
        self.query(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Perform<By<read::property::Availability, property::Id>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Perform(by): Perform<By<read::property::Availability, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: property::Id = by.into_inner();

        const SQL: &str = "\
            UPDATE properties \
            SET available_rooms = (\
                SELECT COUNT(*)::INT4 \
                FROM rooms \
                WHERE rooms.property_id = properties.id \
                  AND rooms.available_beds > 0) \
            WHERE id = $1::UUID";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C, S> Database<Perform<By<read::property::RoomSummary, S>>>
    for Postgres<C>
where
    C: Connection,
    S: Into<Option<property::Id>> + Send,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Perform(by): Perform<By<read::property::RoomSummary, S>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id: Option<property::Id> = by.into_inner().into();

        const SQL: &str = "\
            UPDATE properties \
            SET total_rooms = (\
                SELECT COUNT(*)::INT4 \
                FROM rooms \
                WHERE rooms.property_id = properties.id), \
                available_rooms = (\
                SELECT COUNT(*)::INT4 \
                FROM rooms \
                WHERE rooms.property_id = properties.id \
                  AND rooms.available_beds > 0), \
                starting_from = COALESCE((\
                SELECT MIN(rooms.price_daily) \
                FROM rooms \
                WHERE rooms.property_id = properties.id), starting_from) \
            WHERE $1::UUID IS NULL \
               OR id = $1::UUID";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C, S> Database<Perform<By<read::property::RatingStats, S>>>
    for Postgres<C>
where
    C: Connection,
    S: Into<Option<property::Id>> + Send,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Perform(by): Perform<By<read::property::RatingStats, S>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id: Option<property::Id> = by.into_inner().into();

        // Zero qualifying reviews reset the aggregate to 0/0.
        const SQL: &str = "\
            UPDATE properties \
            SET avg_rating = COALESCE((\
                SELECT ROUND(AVG(reviews.rating), 1) \
                FROM reviews \
                WHERE reviews.property_id = properties.id \
                  AND NOT reviews.flagged), 0), \
                total_reviews = (\
                SELECT COUNT(*)::INT4 \
                FROM reviews \
                WHERE reviews.property_id = properties.id \
                  AND NOT reviews.flagged) \
            WHERE $1::UUID IS NULL \
               OR id = $1::UUID";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C>
    Database<
        Select<By<read::property::list::Page, read::property::list::Selector>>,
    > for Postgres<C>
where
    C: Connection,
{
    type Ok = read::property::list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::property::list::Page, read::property::list::Selector>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::property::list::Selector {
            arguments,
            filter: read::property::list::Filter { city, kind },
        } = by.into_inner();

        let limit = i64::try_from(arguments.limit()).unwrap_or(i64::MAX);
        let offset = i64::try_from(arguments.offset()).unwrap_or(i64::MAX);

        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![&limit, &offset];
        let city_idx = city.as_ref().map(|c| {
            ps.push(c);
            ps.len()
        });
        let kind_idx = kind.as_ref().map(|k| {
            ps.push(k);
            ps.len()
        });

        let city_filter = city_idx
            .map(|idx| format!("AND LOWER(city) = LOWER(${idx}::VARCHAR) "))
            .unwrap_or_default();
        let kind_filter = kind_idx
            .map(|idx| format!("AND kind = ${idx}::INT2 "))
            .unwrap_or_default();

        let sql = format!(
            "SELECT {COLUMNS}, COUNT(*) OVER ()::INT8 AS total \
             FROM properties \
             WHERE active \
               AND verified \
               {city_filter}\
               {kind_filter}\
             ORDER BY featured DESC, avg_rating DESC, created_at DESC \
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
        let properties = rows.iter().map(from_row).collect::<Vec<_>>();

        Ok(read::property::list::Page::new(&arguments, properties, total))
    }
}
