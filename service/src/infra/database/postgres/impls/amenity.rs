//! [`Amenity`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select};
use tracerr::Traced;

use crate::{
    domain::Amenity,
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

impl<C> Database<Select<By<Vec<Amenity>, ()>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Amenity>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<Amenity>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            SELECT id, name, icon, category \
            FROM amenities \
            ORDER BY category, name";
        Ok(self
            .query(SQL, &[])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| Amenity {
                id: row.get("id"),
                name: row.get("name"),
                icon: row.get("icon"),
                category: row.get("category"),
            })
            .collect())
    }
}

impl<C> Database<Insert<Amenity>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(amenity): Insert<Amenity>,
    ) -> Result<Self::Ok, Self::Err> {
        let Amenity {
            id,
            name,
            icon,
            category,
        } = amenity;

        const SQL: &str = "\
            INSERT INTO amenities (id, name, icon, category) \
            VALUES ($1::INT4, $2::VARCHAR, $3::VARCHAR, $4::INT2) \
            ON CONFLICT (id) DO UPDATE \
            SET name = EXCLUDED.name, \
                icon = EXCLUDED.icon, \
                category = EXCLUDED.category";
        self.exec(SQL, &[&id, &name, &icon, &category])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
