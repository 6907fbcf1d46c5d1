//! [`Store`] emulating a concurrent write in the middle of a transaction.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use common::operations::{Commit, Transact};
use derive_more::Debug;
use tracerr::Traced;

use crate::infra::{database, Database};

use super::{Error, Memory, NonTx, State, Store, Tx};

/// Write applied to a [`State`].
type Write = Arc<dyn Fn(&mut State) + Send + Sync>;

/// [`Store`] whose transactions see a [`Write`] committed by somebody else
/// right before their `at`-th access to the [`State`].
#[derive(Clone, Debug)]
pub(crate) struct Interfering<S> {
    /// Wrapped [`Store`].
    store: S,

    /// Number of the transactional access the [`Write`] precedes.
    at: usize,

    /// [`Write`] to apply.
    #[debug(skip)]
    write: Write,

    /// Number of accesses made by the transaction so far.
    accesses: Arc<AtomicUsize>,
}

impl Memory<Interfering<NonTx>> {
    /// Wraps the provided [`Memory`] client, so each of its transactions
    /// sees the provided `write` right before its `at`-th access.
    pub(crate) fn interfering(
        memory: &Memory,
        at: usize,
        write: impl Fn(&mut State) + Send + Sync + 'static,
    ) -> Self {
        Self(Interfering {
            store: memory.0.clone(),
            at,
            write: Arc::new(write),
            accesses: Arc::default(),
        })
    }
}

impl Store for Interfering<NonTx> {
    async fn with<R>(
        &self,
        f: impl FnOnce(&mut State) -> R,
    ) -> Result<R, Traced<database::Error>> {
        self.store.with(f).await.map_err(tracerr::wrap!())
    }
}

impl Store for Interfering<Tx> {
    async fn with<R>(
        &self,
        f: impl FnOnce(&mut State) -> R,
    ) -> Result<R, Traced<database::Error>> {
        let n = self.accesses.fetch_add(1, Ordering::SeqCst) + 1;

        let mut staged = self.store.staged.lock().await;
        let staged = staged
            .as_mut()
            .ok_or_else(|| tracerr::new!(Error::Committed))
            .map_err(tracerr::map_from)?;
        if n == self.at {
            (self.write)(&mut *staged.guard);
            (self.write)(&mut staged.state);
        }
        Ok(f(&mut staged.state))
    }
}

impl Database<Transact> for Memory<Interfering<NonTx>> {
    type Ok = Memory<Interfering<Tx>>;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        let Interfering {
            store, at, write, ..
        } = &self.0;
        Ok(Memory(Interfering {
            store: store.begin().await,
            at: *at,
            write: Arc::clone(write),
            accesses: Arc::default(),
        }))
    }
}

impl Database<Transact> for Memory<Interfering<Tx>> {
    type Ok = Self;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        Ok(self.clone())
    }
}

impl Database<Commit> for Memory<Interfering<Tx>> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
        self.0.store.commit().await.map_err(tracerr::wrap!())
    }
}
