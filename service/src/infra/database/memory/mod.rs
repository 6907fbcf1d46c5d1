//! In-memory [`Database`] implementation.
//!
//! Transactions are serializable: a [`Tx`] holds the whole [`State`]
//! exclusively from its start until it's committed or dropped, working on a
//! staged copy that replaces the [`State`] on commit only.

mod impls;
#[cfg(test)]
mod interfering;

use std::{
    collections::{BTreeMap, HashMap},
    future::Future,
    sync::Arc,
};

use common::Date;
use derive_more::{Display, Error as StdError};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracerr::Traced;

use crate::{
    domain::{amenity, availability, booking, property, user},
    infra::database,
};
#[cfg(doc)]
use crate::infra::Database;

#[cfg(test)]
pub(crate) use self::interfering::Interfering;

/// In-memory [`Database`] client.
#[derive(Clone, Debug)]
pub struct Memory<T = NonTx>(T);

impl Memory {
    /// Creates a new empty [`Memory`] client.
    #[must_use]
    pub fn new() -> Self {
        Self(NonTx {
            state: Arc::new(Mutex::new(State::default())),
        })
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

/// Data kept by a [`Memory`] client.
#[derive(Clone, Debug, Default)]
pub struct State {
    /// Stored [`user::User`]s.
    pub users: HashMap<user::Id, user::User>,

    /// Stored [`amenity::Amenity`]s.
    pub amenities: HashMap<amenity::Id, amenity::Amenity>,

    /// Stored [`property::Property`]s.
    pub properties: HashMap<property::Id, property::Property>,

    /// Calendars of the stored [`property::Property`]s.
    pub calendar: HashMap<property::Id, BTreeMap<Date, availability::Day>>,

    /// Stored [`booking::Booking`]s.
    pub bookings: HashMap<booking::Id, booking::Booking>,
}

/// Non-transactional [`Memory`] client.
#[derive(Clone, Debug)]
pub struct NonTx {
    /// Shared [`State`].
    state: Arc<Mutex<State>>,
}

/// Transactional [`Memory`] client.
#[derive(Clone, Debug)]
pub struct Tx {
    /// [`Staged`] changes, taken on commit.
    staged: Arc<Mutex<Option<Staged>>>,
}

/// [`State`] staged by a [`Tx`].
#[derive(Debug)]
struct Staged {
    /// Exclusive access to the shared [`State`].
    guard: OwnedMutexGuard<State>,

    /// Copy of the shared [`State`] the [`Tx`] works on.
    state: State,
}

/// Access to the [`State`] of a [`Memory`] client.
pub trait Store {
    /// Runs the provided function over the [`State`].
    ///
    /// # Errors
    ///
    /// If the [`State`] is not accessible anymore.
    fn with<R>(
        &self,
        f: impl FnOnce(&mut State) -> R,
    ) -> impl Future<Output = Result<R, Traced<database::Error>>>;
}

impl Store for NonTx {
    async fn with<R>(
        &self,
        f: impl FnOnce(&mut State) -> R,
    ) -> Result<R, Traced<database::Error>> {
        Ok(f(&mut *self.state.lock().await))
    }
}

impl Store for Tx {
    async fn with<R>(
        &self,
        f: impl FnOnce(&mut State) -> R,
    ) -> Result<R, Traced<database::Error>> {
        let mut staged = self.staged.lock().await;
        let staged = staged
            .as_mut()
            .ok_or_else(|| tracerr::new!(Error::Committed))
            .map_err(tracerr::map_from)?;
        Ok(f(&mut staged.state))
    }
}

impl NonTx {
    /// Starts a new [`Tx`], waiting for the running one to finish.
    async fn begin(&self) -> Tx {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let state = guard.clone();
        Tx {
            staged: Arc::new(Mutex::new(Some(Staged { guard, state }))),
        }
    }
}

impl Tx {
    /// Commits this [`Tx`], replacing the shared [`State`] with the staged
    /// one.
    async fn commit(&self) -> Result<(), Traced<database::Error>> {
        let Staged { mut guard, state } = self
            .staged
            .lock()
            .await
            .take()
            .ok_or_else(|| tracerr::new!(Error::Committed))
            .map_err(tracerr::map_from)?;
        *guard = state;
        Ok(())
    }
}

/// In-memory database [`Error`].
#[derive(Clone, Copy, Debug, Display, StdError)]
pub enum Error {
    /// [`Tx`] is used after being committed.
    #[display("transaction is already committed")]
    Committed,
}
