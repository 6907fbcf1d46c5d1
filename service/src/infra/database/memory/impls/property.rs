//! [`Property`]-related [`Database`] implementations.

use std::collections::HashMap;

use common::operations::{By, Insert, Lock, Select, Update};
use tracerr::Traced;

use crate::{
    domain::{property, user, Property},
    infra::{
        database::{self, memory::Store, Memory},
        Database,
    },
    read::{self, property::search},
};

impl<S, IDs> Database<Select<By<HashMap<property::Id, Property>, IDs>>>
    for Memory<S>
where
    S: Store,
    IDs: AsRef<[property::Id]>,
{
    type Ok = HashMap<property::Id, Property>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashMap<property::Id, Property>, IDs>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        self.0
            .with(|s| {
                ids.as_ref()
                    .iter()
                    .filter_map(|id| s.properties.get(id))
                    .map(|p| (p.id, p.clone()))
                    .collect()
            })
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<S: Store> Database<Select<By<Option<Property>, property::Id>>>
    for Memory<S>
{
    type Ok = Option<Property>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Property>, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.0
            .with(|s| s.properties.get(&id).cloned())
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<S: Store> Database<Select<By<Vec<Property>, user::Id>>> for Memory<S> {
    type Ok = Vec<Property>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Property>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let host_id = by.into_inner();
        let mut hosted = self
            .0
            .with(|s| {
                s.properties
                    .values()
                    .filter(|p| p.is_hosted_by(host_id))
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .await
            .map_err(tracerr::wrap!())?;
        hosted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(hosted)
    }
}

impl<S: Store> Database<Select<By<search::Page, search::Selector>>>
    for Memory<S>
{
    type Ok = search::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<search::Page, search::Selector>>,
    ) -> Result<Self::Ok, Self::Err> {
        let search::Selector { arguments, filter } = by.into_inner();

        let mut found = self
            .0
            .with(|s| {
                s.properties
                    .values()
                    .filter(|p| filter.matches(p))
                    .filter(|p| {
                        let Some(stay) = filter.stay else {
                            return true;
                        };
                        let days = s
                            .calendar
                            .get(&p.id)
                            .into_iter()
                            .flat_map(|c| c.range(stay.start()..stay.end()))
                            .map(|(_, d)| d)
                            .collect::<Vec<_>>();
                        let nights = stay.nights() as usize;

                        read::availability::Coverage::of(days.iter().copied())
                            .is_bookable(stay.nights())
                            && (!filter.instant_book
                                || days
                                    .iter()
                                    .filter(|d| !d.requires_approval)
                                    .count()
                                    == nights)
                    })
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .await
            .map_err(tracerr::wrap!())?;
        found.sort_by(|a, b| {
            a.base_price
                .amount
                .cmp(&b.base_price.amount)
                .then_with(|| a.created_at.cmp(&b.created_at))
        });

        let total = found.len() as u64;
        let items = found
            .into_iter()
            .skip(usize::try_from(arguments.offset()).unwrap_or(usize::MAX))
            .take(arguments.limit() as usize);
        Ok(search::Page::new(arguments, items, total))
    }
}

impl<S> Database<Insert<Property>> for Memory<S>
where
    S: Store,
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

impl<S: Store> Database<Update<Property>> for Memory<S> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(property): Update<Property>,
    ) -> Result<Self::Ok, Self::Err> {
        self.0
            .with(|s| drop(s.properties.insert(property.id, property)))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<S: Store> Database<Lock<By<Property, property::Id>>> for Memory<S> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<Property, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Transactions hold the whole state exclusively already.
        Ok(())
    }
}
