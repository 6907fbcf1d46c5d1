//! Postgres database clients acquiring their [`Connection`]s lazily.

use std::{future::Future, sync::Arc};

use tokio::sync::{Mutex, RwLock, RwLockReadGuard};
use tokio_postgres::{types::ToSql, Row, ToStatement};
use tracerr::Traced;

use crate::infra::database::{
    self,
    postgres::{self, connection, Connection},
};

/// Slot holding a lazily acquired [`Connection`].
#[derive(Debug)]
struct Slot<C>(RwLock<Option<C>>);

impl<C> Default for Slot<C> {
    fn default() -> Self {
        Self(RwLock::new(None))
    }
}

impl<C> Slot<C> {
    /// Returns the [`Connection`] of this [`Slot`], acquiring it with the
    /// provided `acquire` function if the [`Slot`] is empty.
    async fn get_or_acquire<F, Fut>(
        &self,
        acquire: F,
    ) -> Result<RwLockReadGuard<'_, C>, Traced<database::Error>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<C, Traced<database::Error>>>,
    {
        let guard = self.0.read().await;
        let guard = if guard.is_some() {
            guard
        } else {
            drop(guard);

            let mut guard = self.0.write().await;
            if guard.is_none() {
                *guard = Some(acquire().await.map_err(tracerr::wrap!())?);
            }
            guard.downgrade()
        };

        RwLockReadGuard::try_map(guard, Option::as_ref)
            .map_err(|_| tracerr::new!(postgres::Error::Released))
            .map_err(tracerr::map_from)
    }

    /// Takes the [`Connection`] out of this [`Slot`], leaving it empty.
    async fn take(&self) -> Option<C> {
        self.0.write().await.take()
    }
}

/// Non-transactional Postgres database client.
#[derive(Clone, Debug)]
pub struct NonTx {
    /// [`connection::Pool`] to acquire [`Connection`]s from.
    pool: connection::Pool,

    /// [`Connection`] used by this client, once acquired.
    slot: Arc<Slot<connection::NonTx>>,
}

impl NonTx {
    /// Creates a new [`NonTx`] client acquiring its [`Connection`]s from the
    /// provided [`connection::Pool`].
    #[must_use]
    pub(crate) fn from_pool(pool: connection::Pool) -> Self {
        Self {
            pool,
            slot: Arc::default(),
        }
    }

    /// Acquires a fresh [`Connection`] from the [`connection::Pool`] of this
    /// [`NonTx`] client, not shared with the client itself.
    ///
    /// # Errors
    ///
    /// If the [`connection::Pool`] fails to provide a [`Connection`].
    pub(crate) async fn acquire(
        &self,
    ) -> Result<connection::NonTx, Traced<database::Error>> {
        self.pool
            .get()
            .await
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)
    }

    /// Returns the [`Connection`] of this [`NonTx`] client.
    async fn connection(
        &self,
    ) -> Result<RwLockReadGuard<'_, connection::NonTx>, Traced<database::Error>>
    {
        self.slot
            .get_or_acquire(|| self.acquire())
            .await
            .map_err(tracerr::wrap!())
    }
}

/// Transactional Postgres database client.
///
/// The transaction begins on the first statement, reusing the [`Connection`]
/// of the [`NonTx`] client it was created from, if that one has any.
#[derive(Clone, Debug)]
pub struct Tx {
    /// [`NonTx`] client this [`Tx`] client was created from.
    origin: NonTx,

    /// Whether the [`Connection`] of the `origin` may still be reused.
    reuse: Arc<Mutex<bool>>,

    /// Transaction of this client, once begun.
    slot: Arc<Slot<connection::Tx>>,
}

impl Tx {
    /// Creates a new [`Tx`] client from the provided [`NonTx`] client.
    #[must_use]
    pub fn from_non_tx(client: NonTx) -> Self {
        Self {
            origin: client,
            reuse: Arc::new(Mutex::new(true)),
            slot: Arc::default(),
        }
    }

    /// Begins a transaction in the [`Connection`] of the `origin` client, or
    /// in a fresh one if it has none or has been reused already.
    async fn begin(&self) -> Result<connection::Tx, Traced<database::Error>> {
        let reused = {
            let mut reuse = self.reuse.lock().await;
            if *reuse {
                *reuse = false;
                self.origin.slot.take().await
            } else {
                None
            }
        };
        let conn = match reused {
            Some(c) => c,
            None => self.origin.acquire().await.map_err(tracerr::wrap!())?,
        };
        connection::Tx::begin(conn).await.map_err(tracerr::wrap!())
    }

    /// Returns the transactional [`Connection`] of this [`Tx`] client.
    async fn connection(
        &self,
    ) -> Result<RwLockReadGuard<'_, connection::Tx>, Traced<database::Error>>
    {
        self.slot
            .get_or_acquire(|| self.begin())
            .await
            .map_err(tracerr::wrap!())
    }

    /// Commits the transaction of this [`Tx`] client, if it has begun.
    ///
    /// The next statement through this [`Tx`] client begins a new transaction.
    ///
    /// # Errors
    ///
    /// If failed to commit the transaction.
    pub async fn commit(&self) -> Result<(), Traced<database::Error>> {
        match self.slot.take().await {
            Some(tx) => tx.commit().await.map_err(tracerr::wrap!()),
            None => Ok(()),
        }
    }
}

/// Implements [`Connection`] for the given client by forwarding to its lazily
/// acquired [`Connection`].
macro_rules! forward_to_slot {
    ($ty:ty) => {
        impl Connection for $ty {
            async fn query<T>(
                &self,
                stmt: &T,
                params: &[&(dyn ToSql + Sync)],
            ) -> Result<Vec<Row>, Traced<database::Error>>
            where
                T: ToStatement + Send + Sync + ?Sized,
            {
                self.connection()
                    .await
                    .map_err(tracerr::wrap!())?
                    .query(stmt, params)
                    .await
                    .map_err(tracerr::wrap!())
            }

            async fn query_opt<T>(
                &self,
                stmt: &T,
                params: &[&(dyn ToSql + Sync)],
            ) -> Result<Option<Row>, Traced<database::Error>>
            where
                T: ToStatement + Send + Sync + ?Sized,
            {
                self.connection()
                    .await
                    .map_err(tracerr::wrap!())?
                    .query_opt(stmt, params)
                    .await
                    .map_err(tracerr::wrap!())
            }

            async fn exec<T>(
                &self,
                stmt: &T,
                params: &[&(dyn ToSql + Sync)],
            ) -> Result<u64, Traced<database::Error>>
            where
                T: ToStatement + Send + Sync + ?Sized,
            {
                self.connection()
                    .await
                    .map_err(tracerr::wrap!())?
                    .exec(stmt, params)
                    .await
                    .map_err(tracerr::wrap!())
            }
        }
    };
}

forward_to_slot!(NonTx);
forward_to_slot!(Tx);
