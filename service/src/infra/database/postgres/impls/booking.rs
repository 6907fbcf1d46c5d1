//! [`Booking`]-related [`Database`] implementations.

use common::{
    operations::{By, Insert, Select, Update},
    DateRange, Money,
};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{booking, Booking},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read::booking::{
        list::{self, Participant, Timeframe},
        Finished, HasConflict, Overlap, Overlapping,
    },
};

/// Columns of the `bookings` table decoded by [`from_row()`].
const COLUMNS: &str = "\
    id, property_id, guest_id, host_id, \
    check_in, check_out, guests, \
    currency, base_amount, cleaning_fee, service_fee, total_amount, \
    status, payment_status, payment_method, \
    special_requests, reason, \
    created_at, updated_at";

/// Decodes a [`Booking`] from the provided [`Row`] of [`COLUMNS`].
fn from_row(row: &Row) -> Booking {
    let currency = row.get("currency");
    let money = |col: &str| Money::new(row.get(col), currency);
    Booking {
        id: row.get("id"),
        property_id: row.get("property_id"),
        guest_id: row.get("guest_id"),
        host_id: row.get("host_id"),
        stay: DateRange::new(row.get("check_in"), row.get("check_out"))
            .expect("`check_out > check_in` is a constraint"),
        guests: u16::try_from(row.get::<_, i16>("guests"))
            .expect("`guests > 0` is a constraint"),
        pricing: booking::Pricing {
            base: money("base_amount"),
            cleaning_fee: money("cleaning_fee"),
            service_fee: money("service_fee"),
            total: money("total_amount"),
        },
        status: row.get("status"),
        payment_status: row.get("payment_status"),
        payment_method: row.get("payment_method"),
        special_requests: row.get("special_requests"),
        reason: row.get("reason"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// Active [`booking::Status`]es holding their nights.
const ACTIVE: [booking::Status; 2] =
    [booking::Status::Pending, booking::Status::Confirmed];

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
        self.query_opt(&sql, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.as_ref().map(from_row))
    }
}

impl<C> Database<Select<By<HasConflict, Overlap>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = HasConflict;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HasConflict, Overlap>>,
    ) -> Result<Self::Ok, Self::Err> {
        let Overlap {
            property_id,
            stay,
            exclude,
        } = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM bookings \
            WHERE property_id = $1::UUID \
              AND status = ANY($4::INT2[]) \
              AND ($5::UUID IS NULL OR id <> $5::UUID) \
              AND ((check_in >= $2::DATE AND check_in < $3::DATE) \
                   OR (check_out > $2::DATE AND check_out <= $3::DATE) \
                   OR (check_in <= $2::DATE AND check_out >= $3::DATE)) \
            LIMIT 1";
        self.query_opt(
            SQL,
            &[
                &property_id,
                &stay.start(),
                &stay.end(),
                &ACTIVE.as_slice(),
                &exclude,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(|r| HasConflict(r.is_some()))
    }
}

impl<C> Database<Select<By<Vec<Booking>, Overlapping>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Booking>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Booking>, Overlapping>>,
    ) -> Result<Self::Ok, Self::Err> {
        let Overlapping { property_id, range } = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM bookings \
             WHERE property_id = $1::UUID \
               AND status = ANY($4::INT2[]) \
               AND check_in < $3::DATE \
               AND check_out > $2::DATE \
             ORDER BY check_in ASC",
        );
        Ok(self
            .query(
                &sql,
                &[
                    &property_id,
                    &range.start(),
                    &range.end(),
                    &ACTIVE.as_slice(),
                ],
            )
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C> Database<Select<By<Vec<Booking>, list::Filter>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Booking>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Booking>, list::Filter>>,
    ) -> Result<Self::Ok, Self::Err> {
        let list::Filter {
            participant,
            status,
            timeframe,
            property_id,
            today,
        } = by.into_inner();

        let (participant_column, user_id) = match participant {
            Participant::Guest(id) => ("guest_id", id),
            Participant::Host(id) => ("host_id", id),
        };
        let timeframe = match timeframe {
            None => "",
            Some(Timeframe::Upcoming) => "AND check_in >= $4::DATE",
            Some(Timeframe::Past) => "AND check_out < $4::DATE",
        };

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM bookings \
             WHERE {participant_column} = $1::UUID \
               AND ($2::INT2 IS NULL OR status = $2::INT2) \
               AND ($3::UUID IS NULL OR property_id = $3::UUID) \
               {timeframe} \
             ORDER BY check_in DESC",
        );
        Ok(self
            .query(&sql, &[&user_id, &status, &property_id, &today])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
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
            property_id,
            guest_id,
            host_id,
            stay,
            guests,
            pricing,
            status,
            payment_status,
            payment_method,
            special_requests,
            reason,
            created_at,
            updated_at,
        } = booking;

        let guests = i16::try_from(guests).unwrap_or(i16::MAX);

        const SQL: &str = "\
            INSERT INTO bookings (\
                id, property_id, guest_id, host_id, \
                check_in, check_out, guests, \
                currency, base_amount, cleaning_fee, service_fee, \
                total_amount, \
                status, payment_status, payment_method, \
                special_requests, reason, \
                created_at, updated_at \
            ) VALUES (\
                $1::UUID, $2::UUID, $3::UUID, $4::UUID, \
                $5::DATE, $6::DATE, $7::INT2, \
                $8::INT2, $9::NUMERIC, $10::NUMERIC, $11::NUMERIC, \
                $12::NUMERIC, \
                $13::INT2, $14::INT2, $15::INT2, \
                $16::TEXT, $17::VARCHAR, \
                $18::TIMESTAMPTZ, $19::TIMESTAMPTZ \
            )";
        self.exec(
            SQL,
            &[
                &id,
                &property_id,
                &guest_id,
                &host_id,
                &stay.start(),
                &stay.end(),
                &guests,
                &pricing.total.currency,
                &pricing.base.amount,
                &pricing.cleaning_fee.amount,
                &pricing.service_fee.amount,
                &pricing.total.amount,
                &status,
                &payment_status,
                &payment_method,
                &special_requests,
                &reason,
                &created_at,
                &updated_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Update<booking::StatusChange>> for Postgres<C>
where
    C: Connection,
{
    type Ok = u64;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(change): Update<booking::StatusChange>,
    ) -> Result<Self::Ok, Self::Err> {
        let booking::StatusChange { booking, from } = change;

        const SQL: &str = "\
            UPDATE bookings \
            SET status = $2::INT2, \
                payment_status = $3::INT2, \
                reason = $4::VARCHAR, \
                updated_at = $5::TIMESTAMPTZ \
            WHERE id = $1::UUID \
              AND status = $6::INT2";
        self.exec(
            SQL,
            &[
                &booking.id,
                &booking.status,
                &booking.payment_status,
                &booking.reason,
                &booking.updated_at,
                &from,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<By<Booking, Finished>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = u64;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(by): Update<By<Booking, Finished>>,
    ) -> Result<Self::Ok, Self::Err> {
        let Finished { today } = by.into_inner();

        const SQL: &str = "\
            UPDATE bookings \
            SET status = $1::INT2, \
                updated_at = NOW() \
            WHERE status = $2::INT2 \
              AND check_out <= $3::DATE";
        self.exec(
            SQL,
            &[
                &booking::Status::Completed,
                &booking::Status::Confirmed,
                &today,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
    }
}
