//! [`Booking`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select, Update};
use tracerr::Traced;

use crate::{
    domain::{booking, Booking},
    infra::{
        database::{self, memory::Store, Memory},
        Database,
    },
    read::booking::{list, Finished, HasConflict, Overlap, Overlapping},
};

impl<S: Store> Database<Select<By<Option<Booking>, booking::Id>>>
    for Memory<S>
{
    type Ok = Option<Booking>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Booking>, booking::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.0
            .with(|s| s.bookings.get(&id).cloned())
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<S: Store> Database<Select<By<HasConflict, Overlap>>> for Memory<S> {
    type Ok = HasConflict;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HasConflict, Overlap>>,
    ) -> Result<Self::Ok, Self::Err> {
        let overlap = by.into_inner();
        self.0
            .with(|s| {
                HasConflict(s.bookings.values().any(|b| overlap.matches(b)))
            })
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<S: Store> Database<Select<By<Vec<Booking>, Overlapping>>> for Memory<S> {
    type Ok = Vec<Booking>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Booking>, Overlapping>>,
    ) -> Result<Self::Ok, Self::Err> {
        let overlap = Overlap::from(by.into_inner());
        let mut found = self
            .0
            .with(|s| {
                s.bookings
                    .values()
                    .filter(|b| overlap.matches(b))
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .await
            .map_err(tracerr::wrap!())?;
        found.sort_by_key(|b| b.stay.start());
        Ok(found)
    }
}

impl<S: Store> Database<Select<By<Vec<Booking>, list::Filter>>> for Memory<S> {
    type Ok = Vec<Booking>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Booking>, list::Filter>>,
    ) -> Result<Self::Ok, Self::Err> {
        let filter = by.into_inner();
        let mut found = self
            .0
            .with(|s| {
                s.bookings
                    .values()
                    .filter(|b| filter.matches(b))
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .await
            .map_err(tracerr::wrap!())?;
        found.sort_by(|a, b| b.stay.start().cmp(&a.stay.start()));
        Ok(found)
    }
}

impl<S: Store> Database<Insert<Booking>> for Memory<S> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(booking): Insert<Booking>,
    ) -> Result<Self::Ok, Self::Err> {
        self.0
            .with(|s| drop(s.bookings.insert(booking.id, booking)))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<S: Store> Database<Update<booking::StatusChange>> for Memory<S> {
    type Ok = u64;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(change): Update<booking::StatusChange>,
    ) -> Result<Self::Ok, Self::Err> {
        self.0
            .with(|s| match s.bookings.get_mut(&change.booking.id) {
                Some(stored) if change.matches(stored) => {
                    *stored = change.booking;
                    1
                }
                Some(_) | None => 0,
            })
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<S: Store> Database<Update<By<Booking, Finished>>> for Memory<S> {
    type Ok = u64;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(by): Update<By<Booking, Finished>>,
    ) -> Result<Self::Ok, Self::Err> {
        let finished = by.into_inner();
        let now = booking::ModificationDateTime::now();
        self.0
            .with(|s| {
                let mut completed = 0;
                for b in s.bookings.values_mut().filter(|b| finished.matches(b))
                {
                    b.status = booking::Status::Completed;
                    b.updated_at = now;
                    completed += 1;
                }
                completed
            })
            .await
            .map_err(tracerr::wrap!())
    }
}
