//! [`User`]-related [`Database`] implementations.

use std::collections::HashMap;

use common::operations::{By, Insert, Select};
use tracerr::Traced;

use crate::{
    domain::{user, User},
    infra::{
        database::{self, memory::Store, Memory},
        Database,
    },
};

impl<S, IDs> Database<Select<By<HashMap<user::Id, User>, IDs>>> for Memory<S>
where
    S: Store,
    IDs: AsRef<[user::Id]>,
{
    type Ok = HashMap<user::Id, User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashMap<user::Id, User>, IDs>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        self.0
            .with(|s| {
                ids.as_ref()
                    .iter()
                    .filter_map(|id| s.users.get(id))
                    .map(|u| (u.id, u.clone()))
                    .collect()
            })
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<S: Store> Database<Select<By<Option<User>, user::Id>>> for Memory<S> {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.0
            .with(|s| s.users.get(&id).cloned())
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<S: Store> Database<Select<By<Option<User>, &user::Email>>>
    for Memory<S>
{
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, &user::Email>>,
    ) -> Result<Self::Ok, Self::Err> {
        let email = by.into_inner();
        self.0
            .with(|s| s.users.values().find(|u| &u.email == email).cloned())
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<S: Store> Database<Insert<User>> for Memory<S> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(user): Insert<User>,
    ) -> Result<Self::Ok, Self::Err> {
        self.0
            .with(|s| drop(s.users.insert(user.id, user)))
            .await
            .map_err(tracerr::wrap!())
    }
}
