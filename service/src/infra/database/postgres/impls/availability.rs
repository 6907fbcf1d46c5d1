//! Availability calendar [`Database`] implementations.

use common::{
    operations::{By, Insert, Select, Update},
    Date,
};
use rust_decimal::Decimal;
use tracerr::Traced;

use crate::{
    domain::availability::{
        Calendar, Changes, Day, Fields, Notes, Status, Transition,
    },
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read::availability::{Coverage, Price, Range, Stay},
};

impl<C> Database<Insert<Calendar>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(calendar): Insert<Calendar>,
    ) -> Result<Self::Ok, Self::Err> {
        let Calendar { property_id, days } = calendar;

        let mut dates = Vec::with_capacity(days.len());
        let mut is_available = Vec::with_capacity(days.len());
        let mut prices = Vec::with_capacity(days.len());
        let mut requires_approval = Vec::with_capacity(days.len());
        let mut statuses = Vec::with_capacity(days.len());
        let mut notes = Vec::with_capacity(days.len());
        for day in days {
            dates.push(day.date);
            is_available.push(day.is_available);
            prices.push(day.price);
            requires_approval.push(day.requires_approval);
            statuses.push(day.status);
            notes.push(day.notes);
        }

        const SQL: &str = "\
            INSERT INTO availability_calendar (\
                property_id, date, is_available, price, \
                requires_approval, status, notes \
            ) \
            SELECT $1::UUID, d.date, d.is_available, d.price, \
                   d.requires_approval, d.status, d.notes \
            FROM UNNEST(\
                $2::DATE[], $3::BOOLEAN[], $4::NUMERIC[], \
                $5::BOOLEAN[], $6::INT2[], $7::VARCHAR[] \
            ) AS d(\
                date, is_available, price, \
                requires_approval, status, notes \
            ) \
            ON CONFLICT (property_id, date) DO NOTHING";
        self.exec(
            SQL,
            &[
                &property_id,
                &dates,
                &is_available,
                &prices,
                &requires_approval,
                &statuses,
                &notes,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Select<By<Vec<Day>, Range>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Day>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Day>, Range>>,
    ) -> Result<Self::Ok, Self::Err> {
        let Range { property_id, dates } = by.into_inner();

        const SQL: &str = "\
            SELECT property_id, date, is_available, price, \
                   requires_approval, status, notes \
            FROM availability_calendar \
            WHERE property_id = $1::UUID \
              AND date >= $2::DATE AND date < $3::DATE \
            ORDER BY date ASC";
        Ok(self
            .query(SQL, &[&property_id, &dates.start(), &dates.end()])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| Day {
                property_id: row.get("property_id"),
                date: row.get("date"),
                is_available: row.get("is_available"),
                price: row.get("price"),
                requires_approval: row.get("requires_approval"),
                status: row.get("status"),
                notes: row.get("notes"),
            })
            .collect())
    }
}

impl<C> Database<Select<By<Price, Stay>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Price;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Price, Stay>>,
    ) -> Result<Self::Ok, Self::Err> {
        let Stay { property_id, stay } = by.into_inner();

        const SQL: &str = "\
            SELECT COALESCE(SUM(price), 0) AS price \
            FROM availability_calendar \
            WHERE property_id = $1::UUID \
              AND date >= $2::DATE AND date < $3::DATE";
        self.query_opt(SQL, &[&property_id, &stay.start(), &stay.end()])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| {
                Price(row.map_or(Decimal::ZERO, |r| r.get("price")))
            })
    }
}

impl<C> Database<Select<By<Coverage, Stay>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Coverage;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Coverage, Stay>>,
    ) -> Result<Self::Ok, Self::Err> {
        let Stay { property_id, stay } = by.into_inner();

        const SQL: &str = "\
            SELECT COUNT(*) AS days, \
                   COUNT(*) FILTER (\
                       WHERE status = $4::INT2 AND is_available\
                   ) AS bookable, \
                   COALESCE(BOOL_OR(requires_approval), FALSE) \
                       AS requires_approval \
            FROM availability_calendar \
            WHERE property_id = $1::UUID \
              AND date >= $2::DATE AND date < $3::DATE";
        let Some(row) = self
            .query_opt(
                SQL,
                &[
                    &property_id,
                    &stay.start(),
                    &stay.end(),
                    &Status::Available,
                ],
            )
            .await
            .map_err(tracerr::wrap!())?
        else {
            return Ok(Coverage::default());
        };

        let count = |col: &str| {
            u32::try_from(row.get::<_, i64>(col))
                .unwrap_or_else(|_| panic!("`{col}` overflow"))
        };
        Ok(Coverage {
            days: count("days"),
            bookable: count("bookable"),
            requires_approval: row.get("requires_approval"),
        })
    }
}

impl<C> Database<Update<Changes>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(changes): Update<Changes>,
    ) -> Result<Self::Ok, Self::Err> {
        let Changes {
            property_id,
            entries,
        } = changes;

        let mut dates: Vec<Date> = Vec::with_capacity(entries.len());
        let mut is_available: Vec<Option<bool>> = vec![];
        let mut prices: Vec<Option<Decimal>> = vec![];
        let mut statuses: Vec<Option<Status>> = vec![];
        let mut requires_approval: Vec<Option<bool>> = vec![];
        let mut notes: Vec<Option<Notes>> = vec![];
        for (date, fields) in entries {
            let Fields {
                is_available: a,
                price: p,
                status: s,
                requires_approval: r,
                notes: n,
            } = fields;
            dates.push(date);
            is_available.push(a);
            prices.push(p);
            statuses.push(s);
            requires_approval.push(r);
            notes.push(n);
        }
        let held = [Status::Booked, Status::Pending];

        const SQL: &str = "\
            UPDATE availability_calendar AS c \
            SET is_available = CASE \
                    WHEN c.status = ANY($8::INT2[]) THEN c.is_available \
                    ELSE COALESCE(u.is_available, c.is_available) \
                END, \
                status = CASE \
                    WHEN c.status = ANY($8::INT2[]) THEN c.status \
                    ELSE COALESCE(u.status, c.status) \
                END, \
                price = COALESCE(u.price, c.price), \
                requires_approval = \
                    COALESCE(u.requires_approval, c.requires_approval), \
                notes = COALESCE(u.notes, c.notes), \
                updated_at = NOW() \
            FROM UNNEST(\
                $2::DATE[], $3::BOOLEAN[], $4::NUMERIC[], \
                $5::INT2[], $6::BOOLEAN[], $7::VARCHAR[] \
            ) AS u(\
                date, is_available, price, \
                status, requires_approval, notes \
            ) \
            WHERE c.property_id = $1::UUID \
              AND c.date = u.date";
        self.exec(
            SQL,
            &[
                &property_id,
                &dates,
                &is_available,
                &prices,
                &statuses,
                &requires_approval,
                &notes,
                &held.as_slice(),
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Update<Transition>> for Postgres<C>
where
    C: Connection,
{
    type Ok = u64;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(transition): Update<Transition>,
    ) -> Result<Self::Ok, Self::Err> {
        let Transition {
            property_id,
            stay,
            from,
            to,
            offered_only,
        } = transition;

        const SQL: &str = "\
            UPDATE availability_calendar \
            SET status = $4::INT2, \
                updated_at = NOW() \
            WHERE property_id = $1::UUID \
              AND date >= $2::DATE AND date < $3::DATE \
              AND status = ANY($5::INT2[]) \
              AND (is_available OR NOT $6::BOOLEAN)";
        self.exec(
            SQL,
            &[
                &property_id,
                &stay.start(),
                &stay.end(),
                &to,
                &from,
                &offered_only,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
    }
}
