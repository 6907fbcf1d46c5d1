//! [`CompleteFinishedBookings`] [`Task`].

use std::{convert::Infallible, error::Error, time};

use common::{
    operations::{By, Perform, Start, Update},
    Date,
};
use smart_default::SmartDefault;
use tokio::time::interval;
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::Booking,
    infra::{database, Database},
    read::booking::Finished,
    Service,
};

use super::Task;

/// Configuration for [`CompleteFinishedBookings`] [`Task`].
#[derive(Clone, Copy, Debug, SmartDefault)]
pub struct Config {
    /// Interval between [`Booking`]s completion runs.
    #[default(time::Duration::from_secs(60 * 60))]
    pub interval: time::Duration,
}

/// [`Task`] moving confirmed [`Booking`]s whose check-out date has come to
/// [`booking::Status::Completed`].
///
/// Calendar days of completed [`Booking`]s stay booked.
///
/// [`booking::Status::Completed`]: crate::domain::booking::Status::Completed
#[derive(Clone, Copy, Debug)]
pub struct CompleteFinishedBookings<S> {
    /// [`Config`] of this [`Task`].
    config: Config,

    /// [`Service`] instance.
    service: S,
}

impl<Db, Ml> Task<Start<By<CompleteFinishedBookings<Self>, Config>>>
    for Service<Db, Ml>
where
    CompleteFinishedBookings<Service<Db, Ml>>:
        Task<Perform<Date>, Ok = u64, Err: Error> + 'static,
    Self: Clone,
{
    type Ok = ();
    type Err = Infallible;

    async fn execute(
        &self,
        Start(by): Start<By<CompleteFinishedBookings<Self>, Config>>,
    ) -> Result<Self::Ok, Self::Err> {
        let config = by.into_inner();
        let task = CompleteFinishedBookings {
            config,
            service: self.clone(),
        };

        let mut interval = interval(task.config.interval);
        loop {
            let _ = interval.tick().await;
            match task.execute(Perform(Date::today())).await {
                Ok(0) => {}
                Ok(n) => log::info!("{n} finished bookings completed"),
                Err(e) => log::error!(
                    "`task::CompleteFinishedBookings` failed: {e}",
                ),
            }
        }
    }
}

impl<Db, Ml> Task<Perform<Date>>
    for CompleteFinishedBookings<Service<Db, Ml>>
where
    Db: Database<
        Update<By<Booking, Finished>>,
        Ok = u64,
        Err = Traced<database::Error>,
    >,
{
    type Ok = u64;
    type Err = ExecutionError;

    async fn execute(
        &self,
        Perform(today): Perform<Date>,
    ) -> Result<Self::Ok, Self::Err> {
        self.service
            .database()
            .execute(Update(By::new(Finished { today })))
            .await
            .map_err(tracerr::wrap!())
    }
}

/// Error of [`CompleteFinishedBookings`] execution.
pub type ExecutionError = Traced<database::Error>;

#[cfg(test)]
mod spec {
    use common::operations::Perform;

    use crate::{domain::booking, tests::Scenario, Task as _};

    use super::{CompleteFinishedBookings, Config};

    #[tokio::test]
    async fn completes_only_finished_confirmed_bookings() {
        let s = Scenario::new().await;
        let property = s.published_property().await;
        let over = s.book(&property, 1, 4).await;
        let ongoing = s.book(&property, 5, 9).await;

        let task = CompleteFinishedBookings {
            config: Config::default(),
            service: s.service.clone(),
        };
        let completed = task.execute(Perform(s.day(6))).await.unwrap();

        assert_eq!(completed, 1);
        assert_eq!(s.booking(over.id).await.status, booking::Status::Completed);
        assert_eq!(
            s.booking(ongoing.id).await.status,
            booking::Status::Confirmed,
        );
        assert!(s
            .days(&property, 1, 4)
            .await
            .iter()
            .all(|d| d.status == crate::domain::availability::Status::Booked));
    }
}
