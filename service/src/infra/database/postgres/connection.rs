//! Raw Postgres [`Connection`]s.

use std::{fmt, future::Future};

use deadpool_postgres::GenericClient as _;
use futures::{FutureExt as _, TryFutureExt as _};
use ouroboros::self_referencing;
use tokio_postgres::{types::ToSql, Row, ToStatement};
use tracerr::Traced;
use tracing as log;

use crate::infra::database::{self, postgres};

pub use deadpool_postgres::{
    Client as NonTx, CreatePoolError as PoolCreationError, Pool, PoolError,
};
pub use tokio_postgres::Error;

/// Generic database connection.
pub trait Connection {
    /// Queries the provided statement with the given parameters and returns the
    /// resulting rows.
    ///
    /// # Errors
    ///
    /// If failed to query the statement.
    fn query<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl Future<Output = Result<Vec<Row>, Traced<database::Error>>>
    where
        T: ToStatement + Send + Sync + ?Sized;

    /// Queries the provided statement with the given parameters and returns the
    /// optional resulting row.
    ///
    /// # Errors
    ///
    /// If failed to query the statement, or it returned more than one row.
    fn query_opt<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl Future<Output = Result<Option<Row>, Traced<database::Error>>>
    where
        T: ToStatement + Send + Sync + ?Sized;

    /// Executes the provided statement with the given parameters and returns
    /// the number of affected rows.
    ///
    /// # Errors
    ///
    /// If failed to execute the statement.
    fn exec<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl Future<Output = Result<u64, Traced<database::Error>>>
    where
        T: ToStatement + Send + Sync + ?Sized;
}

/// Implements [`Connection`] for the given type by forwarding to the
/// [`deadpool_postgres::GenericClient`] returned by the `$client` expression.
///
/// `$client` receives `self` and returns
/// `Result<&impl GenericClient, Traced<database::Error>>`.
macro_rules! forward_connection {
    ($ty:ty, |$this:ident| $client:expr) => {
        impl Connection for $ty {
            async fn query<T>(
                &self,
                stmt: &T,
                params: &[&(dyn ToSql + Sync)],
            ) -> Result<Vec<Row>, Traced<database::Error>>
            where
                T: ToStatement + Send + Sync + ?Sized,
            {
                let $this = self;
                $client
                    .map_err(tracerr::wrap!())?
                    .query(stmt, params)
                    .await
                    .map_err(tracerr::from_and_wrap!(=> postgres::Error))
                    .map_err(tracerr::map_from)
            }

            async fn query_opt<T>(
                &self,
                stmt: &T,
                params: &[&(dyn ToSql + Sync)],
            ) -> Result<Option<Row>, Traced<database::Error>>
            where
                T: ToStatement + Send + Sync + ?Sized,
            {
                let $this = self;
                $client
                    .map_err(tracerr::wrap!())?
                    .query_opt(stmt, params)
                    .await
                    .map_err(tracerr::from_and_wrap!(=> postgres::Error))
                    .map_err(tracerr::map_from)
            }

            async fn exec<T>(
                &self,
                stmt: &T,
                params: &[&(dyn ToSql + Sync)],
            ) -> Result<u64, Traced<database::Error>>
            where
                T: ToStatement + Send + Sync + ?Sized,
            {
                let $this = self;
                let affected = $client
                    .map_err(tracerr::wrap!())?
                    .execute(stmt, params)
                    .await
                    .map_err(tracerr::from_and_wrap!(=> postgres::Error))
                    .map_err(tracerr::map_from)?;
                log::trace!("statement affected {affected} rows");
                Ok(affected)
            }
        }
    };
}

/// Transactional Postgres database [`Connection`].
///
/// Dropping it without [`Tx::commit()`]ting rolls the transaction back.
#[self_referencing]
pub struct Tx {
    /// [`NonTx`] [`Connection`] the transaction runs in.
    non_tx: NonTx,

    /// Transaction running in the [`Connection`], until committed.
    #[borrows(mut non_tx)]
    #[not_covariant]
    tx: Option<deadpool_postgres::Transaction<'this>>,
}

impl fmt::Debug for Tx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tx")
            .field("committed", &self.with_tx(|tx| tx.is_none()))
            .finish_non_exhaustive()
    }
}

impl Tx {
    /// Begins a new [`Tx`] in the provided [`NonTx`] [`Connection`].
    ///
    /// # Errors
    ///
    /// If failed to begin a transaction.
    pub async fn begin(client: NonTx) -> Result<Self, Traced<database::Error>> {
        let tx =
            Self::try_new_async_send(client, |c| {
                c.transaction().map_ok(Some).boxed()
            })
            .await
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)?;
        log::trace!("transaction started");
        Ok(tx)
    }

    /// Returns the running [`Transaction`] of this [`Tx`].
    ///
    /// # Errors
    ///
    /// If this [`Tx`] has been committed already.
    ///
    /// [`Transaction`]: deadpool_postgres::Transaction
    fn running(
        &self,
    ) -> Result<&deadpool_postgres::Transaction<'_>, Traced<database::Error>>
    {
        self.with_tx(|tx| tx.as_ref())
            .ok_or_else(|| tracerr::new!(postgres::Error::Released))
            .map_err(tracerr::map_from)
    }

    /// Commits this [`Tx`].
    ///
    /// # Errors
    ///
    /// If failed to commit this [`Tx`], or it has been committed already.
    pub async fn commit(mut self) -> Result<(), Traced<database::Error>> {
        #[expect(
            clippy::redundant_closure_for_method_calls,
            reason = "different variance, see \
                      https://doc.rust-lang.org/nomicon/subtyping.html#variance"
        )]
        let tx = self
            .with_tx_mut(|tx| tx.take())
            .ok_or_else(|| tracerr::new!(postgres::Error::Released))
            .map_err(tracerr::map_from)?;
        tx.commit()
            .await
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)?;
        log::trace!("transaction committed");
        Ok(())
    }
}

forward_connection!(NonTx, |this| Ok::<_, Traced<database::Error>>(&**this));
forward_connection!(Tx, |this| this.running());
