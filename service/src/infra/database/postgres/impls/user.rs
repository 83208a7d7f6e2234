//! [`User`]-related [`Database`] implementations.

use common::{
    money::Currency,
    operations::{By, Insert, Select},
    Money,
};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{property, user, User},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

/// Columns selected for a [`User`].
const COLUMNS: &str = "\
    id, name, email, password_hash, role, phone, \
    pref_city, pref_budget_min, pref_budget_max, pref_gender, \
    saved_properties, verified, created_at";

/// Maps a [`Row`] onto a [`User`].
fn from_row(row: &Row) -> User {
    User {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        role: row.get("role"),
        phone: row.get("phone"),
        preferences: user::Preferences {
            city: row.get("pref_city"),
            budget_min: row
                .get::<_, Option<_>>("pref_budget_min")
                .map(|amount| Money {
                    amount,
                    currency: Currency::Inr,
                }),
            budget_max: row
                .get::<_, Option<_>>("pref_budget_max")
                .map(|amount| Money {
                    amount,
                    currency: Currency::Inr,
                }),
            gender: row.get("pref_gender"),
        },
        saved_properties: row.get::<_, Vec<property::Id>>("saved_properties"),
        verified: row.get("verified"),
        created_at: row.get("created_at"),
    }
}

impl<C> Database<Select<By<Option<User>, user::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: user::Id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM users \
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

impl<'e, C> Database<Select<By<Option<User>, &'e user::Email>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, &'e user::Email>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let email: &user::Email = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM users \
             WHERE email = $1::VARCHAR \
             LIMIT 1",
        );
        Ok(self
            .query_opt(&sql, &[email])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row))
    }
}

impl<C> Database<Insert<User>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(user): Insert<User>,
    ) -> Result<Self::Ok, Self::Err> {
        let User {
            id,
            name,
            email,
            password_hash,
            role,
            phone,
            preferences,
            saved_properties,
            verified,
            created_at,
        } = user;

        let budget_min = preferences.budget_min.map(|m| m.amount);
        let budget_max = preferences.budget_max.map(|m| m.amount);

        const SQL: &str = "\
            INSERT INTO users (\
                id, name, email, password_hash, role, phone, \
                pref_city, pref_budget_min, pref_budget_max, pref_gender, \
                saved_properties, verified, created_at \
            ) VALUES (\
                $1::UUID, $2::VARCHAR, $3::VARCHAR, $4::VARCHAR, $5::INT2, \
                $6::VARCHAR, \
                $7::VARCHAR, $8::NUMERIC, $9::NUMERIC, $10::INT2, \
                $11::UUID[], $12::BOOL, $13::TIMESTAMPTZ \
            )";
        self.exec(
            SQL,
            &[
                &id,
                &name,
                &email,
                &password_hash,
                &role,
                &phone,
                &preferences.city,
                &budget_min,
                &budget_max,
                &preferences.gender,
                &saved_properties,
                &verified,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}
