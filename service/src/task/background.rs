//! Background environment for running [`Task`]s.

use std::{
    error::Error,
    future::{Future, IntoFuture},
    iter,
};

use futures::{
    future::{self, LocalBoxFuture},
    FutureExt as _, TryFutureExt as _,
};
use tokio::task;
use tracing as log;

#[cfg(doc)]
use crate::Task;

/// Error of a [`Task`] running in the [`Background`].
type TaskError = Box<dyn Error + 'static>;

/// Background environment for running [`Task`]s on the current thread.
#[derive(Debug, Default)]
pub struct Background {
    /// Local set the [`Task`]s run in.
    set: task::LocalSet,

    /// Names and handles of the spawned [`Task`]s.
    tasks: Vec<(&'static str, task::JoinHandle<Result<(), TaskError>>)>,
}

impl Background {
    /// Spawns a new named [`Task`] inside the [`Background`] environment.
    pub fn spawn<F, E>(&mut self, name: &'static str, future: F)
    where
        F: Future<Output = Result<(), E>> + 'static,
        E: Error + 'static,
    {
        log::debug!("spawning `{name}` background task");

        let handle = self
            .set
            .spawn_local(future.map_err(|e| TaskError::from(Box::new(e))));
        self.tasks.push((name, handle));
    }

    /// Returns the number of [`Task`]s spawned in this [`Background`].
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Indicates whether no [`Task`]s were spawned in this [`Background`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl IntoFuture for Background {
    type Output = Result<(), TaskError>;
    type IntoFuture = LocalBoxFuture<'static, Self::Output>;

    /// Resolves once every spawned [`Task`] finishes, or as soon as any of
    /// them fails or panics.
    fn into_future(self) -> Self::IntoFuture {
        let Self { set, tasks } = self;

        let tasks = tasks.into_iter().map(|(name, handle)| {
            handle
                .map(move |res| {
                    let res = res.map_err(TaskError::from).and_then(|r| r);
                    if let Err(e) = &res {
                        log::error!("`{name}` background task failed: {e}");
                    }
                    res
                })
                .boxed_local()
        });

        future::try_join_all(iter::once(set.map(Ok).boxed_local()).chain(tasks))
            .map_ok(drop)
            .boxed_local()
    }
}

#[cfg(test)]
mod spec {
    use std::{
        fmt,
        future::IntoFuture as _,
        sync::{
            atomic::{AtomicBool, Ordering},
            Arc,
        },
    };

    use derive_more::{Display, Error};

    use super::Background;

    #[derive(Debug, Display, Error)]
    #[display("boom")]
    struct Boom;

    #[tokio::test]
    async fn completes_when_all_tasks_succeed() {
        let ran = Arc::new(AtomicBool::new(false));

        let mut bg = Background::default();
        let flag = Arc::clone(&ran);
        bg.spawn("flag", async move {
            flag.store(true, Ordering::SeqCst);
            Ok::<_, fmt::Error>(())
        });
        assert_eq!(bg.len(), 1);

        bg.into_future().await.unwrap();
        assert!(ran.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn fails_when_any_task_fails() {
        let mut bg = Background::default();
        bg.spawn("ok", async { Ok::<_, Boom>(()) });
        bg.spawn("boom", async { Err(Boom) });

        let err = bg.into_future().await.unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }
}
