//! [`Property`]-related [`Database`] implementations.

use std::collections::HashMap;

use common::{
    operations::{By, Insert, Lock, Select, Update},
    Money,
};
use itertools::Itertools as _;
use postgres_types::ToSql;
use rust_decimal::Decimal;
use tracerr::Traced;

use crate::{
    domain::{availability, property, user, Property},
    infra::{
        database::{
            self,
            postgres::{Connection, LikePattern},
            Postgres,
        },
        Database,
    },
    read::property::search,
};

impl<C, IDs> Database<Select<By<HashMap<property::Id, Property>, IDs>>>
    for Postgres<C>
where
    C: Connection,
    IDs: AsRef<[property::Id]>,
{
    type Ok = HashMap<property::Id, Property>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashMap<property::Id, Property>, IDs>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        // Avoid subtle change for SQL.
        let ids: &[property::Id] = ids.as_ref();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let limit = i32::try_from(ids.len()).unwrap_or(i32::MAX);

        const SQL: &str = "\
            SELECT p.id, p.host_id, p.title, p.description, p.kind, \
                   p.address, p.city, p.postal_code, p.country, \
                   p.latitude, p.longitude, \
                   p.guest_capacity, p.bedrooms, p.beds, p.bathrooms, \
                   p.currency, p.base_price, p.cleaning_fee, \
                   p.status, p.created_at, p.updated_at, \
                   ARRAY(SELECT a.amenity_id \
                         FROM property_amenities a \
                         WHERE a.property_id = p.id \
                         ORDER BY a.amenity_id) AS amenities \
            FROM properties p \
            WHERE p.id IN (SELECT unnest($1::UUID[]) LIMIT $2::INT4) \
            LIMIT $2::INT4";
        Ok(self
            .query(SQL, &[&ids, &limit])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| {
                let id = row.get("id");
                let currency = row.get("currency");
                let count = |col: &str| {
                    u16::try_from(row.get::<_, i16>(col))
                        .unwrap_or_else(|_| panic!("`{col}` overflow"))
                };
                let location = row
                    .get::<_, Option<Decimal>>("latitude")
                    .zip(row.get::<_, Option<Decimal>>("longitude"))
                    .and_then(|(lat, lng)| property::Location::new(lat, lng));
                (
                    id,
                    Property {
                        id,
                        host_id: row.get("host_id"),
                        title: row.get("title"),
                        description: row.get("description"),
                        kind: row.get("kind"),
                        address: row.get("address"),
                        city: row.get("city"),
                        postal_code: row.get("postal_code"),
                        country: row.get("country"),
                        location,
                        rooms: property::Rooms::new(
                            count("guest_capacity"),
                            count("bedrooms"),
                            count("beds"),
                            row.get("bathrooms"),
                        )
                        .expect("`rooms` are checked by constraints"),
                        base_price: Money::new(
                            row.get("base_price"),
                            currency,
                        ),
                        cleaning_fee: Money::new(
                            row.get("cleaning_fee"),
                            currency,
                        ),
                        status: row.get("status"),
                        amenities: row.get("amenities"),
                        created_at: row.get("created_at"),
                        updated_at: row.get("updated_at"),
                    },
                )
            })
            .collect())
    }
}

impl<C> Database<Select<By<Option<Property>, property::Id>>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<HashMap<property::Id, Property>, [property::Id; 1]>>,
        Ok = HashMap<property::Id, Property>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<Property>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Property>, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .execute(Select(By::new([id])))
            .await
            .map_err(tracerr::wrap!())?
            .remove(&id))
    }
}

impl<C> Database<Select<By<Vec<Property>, user::Id>>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<HashMap<property::Id, Property>, Vec<property::Id>>>,
        Ok = HashMap<property::Id, Property>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Vec<Property>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Property>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let host_id: user::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM properties \
            WHERE host_id = $1::UUID \
            ORDER BY created_at DESC";
        let ids = self
            .query(SQL, &[&host_id])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| row.get("id"))
            .collect::<Vec<property::Id>>();

        let mut found = self
            .execute(Select(By::new(ids.clone())))
            .await
            .map_err(tracerr::wrap!())?;
        Ok(ids.iter().filter_map(|id| found.remove(id)).collect())
    }
}

impl<C> Database<Select<By<search::Page, search::Selector>>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<HashMap<property::Id, Property>, Vec<property::Id>>>,
        Ok = HashMap<property::Id, Property>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = search::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<search::Page, search::Selector>>,
    ) -> Result<Self::Ok, Self::Err> {
        let search::Selector {
            arguments,
            filter:
                search::Filter {
                    city,
                    guests,
                    kind,
                    bedrooms,
                    bathrooms,
                    min_price,
                    max_price,
                    bounds,
                    amenities,
                    stay,
                    instant_book,
                },
        } = by.into_inner();

        let published = property::Status::Published;
        let available = availability::Status::Available;
        let city = city.as_deref().map(LikePattern::containing);
        let guests = guests.map(|n| i16::try_from(n).unwrap_or(i16::MAX));
        let bedrooms = bedrooms.map(|n| i16::try_from(n).unwrap_or(i16::MAX));
        let amenities = amenities.into_iter().unique().collect::<Vec<_>>();
        let amenities_count =
            i64::try_from(amenities.len()).unwrap_or(i64::MAX);
        let stay = stay.map(|s| (s.start(), s.end(), i64::from(s.nights())));

        let mut w = Conditions::default();
        w.push("p.status = {0}::INT2", &[&published]);
        if let Some(city) = &city {
            w.push("p.city ILIKE {0}::VARCHAR", &[city]);
        }
        if let Some(guests) = &guests {
            w.push("p.guest_capacity >= {0}::INT2", &[guests]);
        }
        if let Some(kind) = &kind {
            w.push("p.kind = {0}::INT2", &[kind]);
        }
        if let Some(bedrooms) = &bedrooms {
            w.push("p.bedrooms >= {0}::INT2", &[bedrooms]);
        }
        if let Some(bathrooms) = &bathrooms {
            w.push("p.bathrooms >= {0}::NUMERIC", &[bathrooms]);
        }
        if let Some(min) = &min_price {
            w.push("p.base_price >= {0}::NUMERIC", &[min]);
        }
        if let Some(max) = &max_price {
            w.push("p.base_price <= {0}::NUMERIC", &[max]);
        }
        if let Some(b) = &bounds {
            w.push(
                "p.latitude BETWEEN {0}::NUMERIC AND {1}::NUMERIC \
                 AND p.longitude BETWEEN {2}::NUMERIC AND {3}::NUMERIC",
                &[&b.south, &b.north, &b.west, &b.east],
            );
        }
        if !amenities.is_empty() {
            w.push(
                "(SELECT COUNT(DISTINCT a.amenity_id) \
                  FROM property_amenities a \
                  WHERE a.property_id = p.id \
                    AND a.amenity_id = ANY({0}::INT4[])) = {1}::INT8",
                &[&amenities, &amenities_count],
            );
        }
        if let Some((check_in, check_out, nights)) = &stay {
            w.push(
                "(SELECT COUNT(*) \
                  FROM availability_calendar c \
                  WHERE c.property_id = p.id \
                    AND c.date >= {0}::DATE AND c.date < {1}::DATE \
                    AND c.status = {2}::INT2 \
                    AND c.is_available) = {3}::INT8",
                &[check_in, check_out, &available, nights],
            );
            if instant_book {
                w.push(
                    "(SELECT COUNT(*) \
                      FROM availability_calendar c \
                      WHERE c.property_id = p.id \
                        AND c.date >= {0}::DATE AND c.date < {1}::DATE \
                        AND NOT c.requires_approval) = {2}::INT8",
                    &[check_in, check_out, nights],
                );
            }
        }
        let filtering = w.sql.iter().join(" AND ");
        let mut ps = w.params;

        let sql = format!(
            "SELECT COUNT(*) \
             FROM properties p \
             WHERE {filtering}",
        );
        let total = self
            .query_opt(&sql, ps.as_slice())
            .await
            .map_err(tracerr::wrap!())?
            .map_or(0, |row| row.get::<_, i64>(0));
        let total = u64::try_from(total).unwrap_or_default();

        let limit = i64::from(arguments.limit());
        let offset = i64::try_from(arguments.offset()).unwrap_or(i64::MAX);
        let limit_idx = ps.len() + 1;
        ps.push(&limit);
        ps.push(&offset);
        let sql = format!(
            "SELECT p.id \
             FROM properties p \
             WHERE {filtering} \
             ORDER BY p.base_price ASC, p.created_at ASC \
             LIMIT ${limit_idx}::INT8 OFFSET ${offset_idx}::INT8",
            offset_idx = limit_idx + 1,
        );
        let ids = self
            .query(&sql, ps.as_slice())
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| row.get("id"))
            .collect::<Vec<property::Id>>();

        let mut found = self
            .execute(Select(By::new(ids.clone())))
            .await
            .map_err(tracerr::wrap!())?;
        Ok(search::Page::new(
            arguments,
            ids.iter().filter_map(|id| found.remove(id)),
            total,
        ))
    }
}

impl<C> Database<Insert<Property>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Property>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(property): Insert<Property>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(property)).await.map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Property>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(property): Update<Property>,
    ) -> Result<Self::Ok, Self::Err> {
        let Property {
            id,
            host_id,
            title,
            description,
            kind,
            address,
            city,
            postal_code,
            country,
            location,
            rooms,
            base_price,
            cleaning_fee,
            status,
            amenities,
            created_at,
            updated_at,
        } = property;

        let latitude = location.map(|l| l.latitude());
        let longitude = location.map(|l| l.longitude());
        let count = |n: u16| i16::try_from(n).expect("`Rooms` are bounded");
        let guest_capacity = count(rooms.guest_capacity());
        let bedrooms = count(rooms.bedrooms());
        let beds = count(rooms.beds());
        let bathrooms = rooms.bathrooms();

        const SQL: &str = "\
            INSERT INTO properties (\
                id, host_id, title, description, kind, \
                address, city, postal_code, country, \
                latitude, longitude, \
                guest_capacity, bedrooms, beds, bathrooms, \
                currency, base_price, cleaning_fee, \
                status, created_at, updated_at \
            ) VALUES (\
                $1::UUID, $2::UUID, $3::VARCHAR, $4::TEXT, $5::INT2, \
                $6::VARCHAR, $7::VARCHAR, $8::VARCHAR, $9::VARCHAR, \
                $10::NUMERIC, $11::NUMERIC, \
                $12::INT2, $13::INT2, $14::INT2, $15::NUMERIC, \
                $16::INT2, $17::NUMERIC, $18::NUMERIC, \
                $19::INT2, $20::TIMESTAMPTZ, $21::TIMESTAMPTZ \
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET title = EXCLUDED.title, \
                description = EXCLUDED.description, \
                kind = EXCLUDED.kind, \
                address = EXCLUDED.address, \
                city = EXCLUDED.city, \
                postal_code = EXCLUDED.postal_code, \
                country = EXCLUDED.country, \
                latitude = EXCLUDED.latitude, \
                longitude = EXCLUDED.longitude, \
                guest_capacity = EXCLUDED.guest_capacity, \
                bedrooms = EXCLUDED.bedrooms, \
                beds = EXCLUDED.beds, \
                bathrooms = EXCLUDED.bathrooms, \
                currency = EXCLUDED.currency, \
                base_price = EXCLUDED.base_price, \
                cleaning_fee = EXCLUDED.cleaning_fee, \
                status = EXCLUDED.status, \
                updated_at = EXCLUDED.updated_at";
        _ = self
            .exec(
                SQL,
                &[
                    &id,
                    &host_id,
                    &title,
                    &description,
                    &kind,
                    &address,
                    &city,
                    &postal_code,
                    &country,
                    &latitude,
                    &longitude,
                    &guest_capacity,
                    &bedrooms,
                    &beds,
                    &bathrooms,
                    &base_price.currency,
                    &base_price.amount,
                    &cleaning_fee.amount,
                    &status,
                    &created_at,
                    &updated_at,
                ],
            )
            .await
            .map_err(tracerr::wrap!())?;

        const AMENITIES_SQL: &str = "\
            WITH removed AS (\
                DELETE FROM property_amenities \
                WHERE property_id = $1::UUID \
                  AND amenity_id <> ALL($2::INT4[]) \
            ) \
            INSERT INTO property_amenities (property_id, amenity_id) \
            SELECT $1::UUID, unnest($2::INT4[]) \
            ON CONFLICT DO NOTHING";
        self.exec(AMENITIES_SQL, &[&id, &amenities])
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

        // Updating the row keeps it locked until the transaction ends, even
        // if it existed already.
        const SQL: &str = "\
            INSERT INTO properties_lock \
            VALUES ($1::UUID) \
            ON CONFLICT (id) DO UPDATE \
            SET id = EXCLUDED.id";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

/// SQL filtering conditions being built along with their parameters.
#[derive(Default)]
struct Conditions<'a> {
    /// Parameters referred by the [`Conditions::sql`].
    params: Vec<&'a (dyn ToSql + Sync)>,

    /// SQL of the conditions.
    sql: Vec<String>,
}

impl<'a> Conditions<'a> {
    /// Pushes the provided SQL condition with its `params`.
    ///
    /// Placeholders `{0}`, `{1}`.. of the `cond` refer to the `params`.
    fn push(&mut self, cond: &str, params: &[&'a (dyn ToSql + Sync)]) {
        let first = self.params.len() + 1;
        self.params.extend_from_slice(params);
        self.sql.push((0..params.len()).fold(cond.to_owned(), |cond, i| {
            cond.replace(&format!("{{{i}}}"), &format!("${}", first + i))
        }));
    }
}
