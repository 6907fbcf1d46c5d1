//! Service contains the business logic of the application.
//!
//! List of available Cargo features:
#![doc = document_features::document_features!()]
#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod command;
pub mod domain;
pub mod infra;
pub mod query;
pub mod read;
pub mod task;
#[cfg(test)]
mod tests;

use common::{
    money::Currency,
    operations::{By, Start},
    Percent,
};
use derive_more::Debug;
use rust_decimal::Decimal;

#[cfg(doc)]
use infra::{Database, Mailer};

pub use self::{command::Command, query::Query, task::Task};

/// [`Service`] configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// [JWT] encoding key.
    ///
    /// [JWT]: https://datatracker.ietf.org/doc/html/rfc7519
    #[debug(skip)]
    pub jwt_encoding_key: jsonwebtoken::EncodingKey,

    /// [JWT] decoding key.
    ///
    /// [JWT]: https://datatracker.ietf.org/doc/html/rfc7519
    #[debug(skip)]
    pub jwt_decoding_key: jsonwebtoken::DecodingKey,

    /// Number of months the calendar of a new property is generated for,
    /// starting today.
    pub calendar_horizon_months: u32,

    /// Service fee charged on the base amount of every booking.
    pub service_fee: Percent,

    /// [`Currency`] of the prices.
    pub currency: Currency,

    /// [`task::CompleteFinishedBookings`] configuration.
    pub complete_finished_bookings: task::complete_finished_bookings::Config,
}

impl Config {
    /// Default [`Config::calendar_horizon_months`].
    pub const DEFAULT_CALENDAR_HORIZON_MONTHS: u32 = 12;

    /// Returns the default [`Config::service_fee`].
    #[must_use]
    pub fn default_service_fee() -> Percent {
        Percent::new(Decimal::from(5)).unwrap_or_else(|| unreachable!())
    }
}

/// Domain service.
#[derive(Clone, Debug)]
pub struct Service<Db, Ml = infra::mailer::Log> {
    /// Configuration of this [`Service`].
    config: Config,

    /// [`Database`] of this [`Service`].
    database: Db,

    /// [`Mailer`] of this [`Service`].
    mailer: Ml,
}

impl<Db, Ml> Service<Db, Ml> {
    /// Creates a new [`Service`] with the provided parameters.
    pub fn new(
        config: Config,
        database: Db,
        mailer: Ml,
    ) -> (Self, task::Background)
    where
        Self: Task<
                Start<
                    By<
                        task::CompleteFinishedBookings<Self>,
                        task::complete_finished_bookings::Config,
                    >,
                >,
                Ok = (),
                Err: std::error::Error,
            > + Clone
            + 'static,
    {
        let this = Service {
            config,
            database,
            mailer,
        };

        let mut bg = task::Background::default();
        let svc = this.clone();
        bg.spawn("complete_finished_bookings", async move {
            svc.execute(Start(By::new(
                svc.config().complete_finished_bookings,
            )))
            .await
        });

        (this, bg)
    }

    /// Returns [`Config`] of this [`Service`].
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns [`Database`] of this [`Service`].
    #[must_use]
    pub fn database(&self) -> &Db {
        &self.database
    }

    /// Returns [`Mailer`] of this [`Service`].
    #[must_use]
    pub fn mailer(&self) -> &Ml {
        &self.mailer
    }
}
