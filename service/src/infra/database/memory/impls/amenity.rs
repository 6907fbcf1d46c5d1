//! [`Amenity`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select};
use tracerr::Traced;

use crate::{
    domain::Amenity,
    infra::{
        database::{self, memory::Store, Memory},
        Database,
    },
};

impl<S: Store> Database<Select<By<Vec<Amenity>, ()>>> for Memory<S> {
    type Ok = Vec<Amenity>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<Amenity>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut all = self
            .0
            .with(|s| s.amenities.values().cloned().collect::<Vec<_>>())
            .await
            .map_err(tracerr::wrap!())?;
        all.sort_by(|a, b| {
            (a.category.u8(), &a.name).cmp(&(b.category.u8(), &b.name))
        });
        Ok(all)
    }
}

impl<S: Store> Database<Insert<Amenity>> for Memory<S> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(amenity): Insert<Amenity>,
    ) -> Result<Self::Ok, Self::Err> {
        self.0
            .with(|s| drop(s.amenities.insert(amenity.id, amenity)))
            .await
            .map_err(tracerr::wrap!())
    }
}
