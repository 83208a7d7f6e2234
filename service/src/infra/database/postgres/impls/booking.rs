//! [`Booking`]-related [`Database`] implementations.

use common::{
    money::Currency,
    operations::{By, Insert, Lock, Select, Update},
    Money,
};
use tokio_postgres::{types::ToSql, Row};
use tracerr::Traced;

use crate::{
    domain::{booking, property, user, Booking},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

/// Columns selected for a [`Booking`].
const COLUMNS: &str = "\
    id, user_id, property_id, room_id, \
    check_in, check_out, guests, \
    amount_subtotal, amount_tax, amount_discount, amount_total, \
    payment_method, payment_status, \
    payment_order_id, payment_payment_id, payment_signature, paid_at, \
    status, special_requests, invoice_number, created_at";

/// Maps a [`Row`] onto a [`Booking`].
fn from_row(row: &Row) -> Booking {
    let money = |amount| Money {
        amount,
        currency: Currency::Inr,
    };

    Booking {
        id: row.get("id"),
        user_id: row.get("user_id"),
        property_id: row.get("property_id"),
        room_id: row.get("room_id"),
        check_in: row.get("check_in"),
        check_out: row.get("check_out"),
        guests: u16::try_from(row.get::<_, i32>("guests"))
            .expect("`guests` overflow"),
        amount: booking::Amount {
            subtotal: money(row.get("amount_subtotal")),
            tax: money(row.get("amount_tax")),
            discount: money(row.get("amount_discount")),
            total: money(row.get("amount_total")),
        },
        payment: booking::Payment {
            method: row.get("payment_method"),
            status: row.get("payment_status"),
            order_id: row.get("payment_order_id"),
            payment_id: row.get("payment_payment_id"),
            signature: row.get("payment_signature"),
            paid_at: row.get("paid_at"),
        },
        status: row.get("status"),
        special_requests: row.get("special_requests"),
        invoice_number: row.get("invoice_number"),
        created_at: row.get("created_at"),
    }
}

impl<C> Database<Select<By<Option<Booking>, booking::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Booking>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Booking>, booking::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: booking::Id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM bookings \
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

impl<'o, C> Database<Select<By<Option<Booking>, &'o booking::OrderId>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Booking>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Booking>, &'o booking::OrderId>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let order_id: &booking::OrderId = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM bookings \
             WHERE payment_order_id = $1::VARCHAR \
             LIMIT 1",
        );
        Ok(self
            .query_opt(&sql, &[order_id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row))
    }
}

impl<C> Database<Select<By<Vec<Booking>, user::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Booking>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Booking>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let user_id: user::Id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM bookings \
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

impl<C> Database<Select<By<Vec<Booking>, property::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Booking>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Booking>, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let property_id: property::Id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM bookings \
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

impl<C>
    Database<
        Select<By<read::booking::list::Page, read::booking::list::Selector>>,
    > for Postgres<C>
where
    C: Connection,
{
    type Ok = read::booking::list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::booking::list::Page, read::booking::list::Selector>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::booking::list::Selector {
            arguments,
            filter: read::booking::list::Filter { status },
        } = by.into_inner();

        let limit = i64::try_from(arguments.limit()).unwrap_or(i64::MAX);
        let offset = i64::try_from(arguments.offset()).unwrap_or(i64::MAX);

        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![&limit, &offset];
        let status_idx = status.as_ref().map(|s| {
            ps.push(s);
            ps.len()
        });

        let status_filter = status_idx
            .map(|idx| format!("WHERE status = ${idx}::INT2 "))
            .unwrap_or_default();

        let sql = format!(
            "SELECT {COLUMNS}, COUNT(*) OVER ()::INT8 AS total \
             FROM bookings \
             {status_filter}\
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
        let bookings = rows.iter().map(from_row).collect::<Vec<_>>();

        Ok(read::booking::list::Page::new(&arguments, bookings, total))
    }
}

impl<C> Database<Select<By<Vec<read::booking::MonthlyVolume>, Option<property::Id>>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<read::booking::MonthlyVolume>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<Vec<read::booking::MonthlyVolume>, Option<property::Id>>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let property_id: Option<property::Id> = by.into_inner();

        // Trailing six months, bucketed by creation month.
        const SQL: &str = "\
            SELECT TO_CHAR(created_at, 'YYYY-MM') AS month, \
                   COUNT(*)::INT8 AS bookings, \
                   SUM(amount_total) AS revenue, \
                   AVG(amount_total) AS avg_amount \
            FROM bookings \
            WHERE created_at >= NOW() - INTERVAL '6 months' \
              AND ($1::UUID IS NULL \
                   OR property_id = $1::UUID) \
            GROUP BY 1 \
            ORDER BY 1";
        Ok(self
            .query(SQL, &[&property_id])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| read::booking::MonthlyVolume {
                month: row.get("month"),
                bookings: row.get("bookings"),
                revenue: row.get("revenue"),
                avg_amount: row.get("avg_amount"),
            })
            .collect())
    }
}

impl<C> Database<Insert<Booking>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(booking): Insert<Booking>,
    ) -> Result<Self::Ok, Self::Err> {
        let Booking {
            id,
            user_id,
            property_id,
            room_id,
            check_in,
            check_out,
            guests,
            amount,
            payment,
            status,
            special_requests,
            invoice_number,
            created_at,
        } = booking;

        let guests = i32::from(guests);
        let subtotal = amount.subtotal.amount;
        let tax = amount.tax.amount;
        let discount = amount.discount.amount;
        let total = amount.total.amount;

        const SQL: &str = "\
            INSERT INTO bookings (\
                id, user_id, property_id, room_id, \
                check_in, check_out, guests, \
                amount_subtotal, amount_tax, amount_discount, amount_total, \
                payment_method, payment_status, \
                payment_order_id, payment_payment_id, payment_signature, \
                paid_at, \
                status, special_requests, invoice_number, created_at \
            ) VALUES (\
                $1::UUID, $2::UUID, $3::UUID, $4::UUID, \
                $5::TIMESTAMPTZ, $6::TIMESTAMPTZ, $7::INT4, \
                $8::NUMERIC, $9::NUMERIC, $10::NUMERIC, $11::NUMERIC, \
                $12::INT2, $13::INT2, \
                $14::VARCHAR, $15::VARCHAR, $16::VARCHAR, $17::TIMESTAMPTZ, \
                $18::INT2, $19::VARCHAR, $20::VARCHAR, $21::TIMESTAMPTZ \
            )";
        self.exec(
            SQL,
            &[
                &id,
                &user_id,
                &property_id,
                &room_id,
                &check_in,
                &check_out,
                &guests,
                &subtotal,
                &tax,
                &discount,
                &total,
                &payment.method,
                &payment.status,
                &payment.order_id,
                &payment.payment_id,
                &payment.signature,
                &payment.paid_at,
                &status,
                &special_requests,
                &invoice_number,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Update<Booking>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(booking): Update<Booking>,
    ) -> Result<Self::Ok, Self::Err> {
        let Booking {
            id,
            payment,
            status,
            ..
        } = booking;

        // Identity, dates and the frozen amount never change after creation.
        const SQL: &str = "\
            UPDATE bookings \
            SET payment_method = $2::INT2, \
                payment_status = $3::INT2, \
                payment_order_id = $4::VARCHAR, \
                payment_payment_id = $5::VARCHAR, \
                payment_signature = $6::VARCHAR, \
                paid_at = $7::TIMESTAMPTZ, \
                status = $8::INT2 \
            WHERE id = $1::UUID";
        self.exec(
            SQL,
            &[
                &id,
                &payment.method,
                &payment.status,
                &payment.order_id,
                &payment.payment_id,
                &payment.signature,
                &payment.paid_at,
                &status,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Lock<By<Booking, booking::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Booking, booking::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: booking::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM bookings \
            WHERE id = $1::UUID \
            FOR UPDATE";
        self.query(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
