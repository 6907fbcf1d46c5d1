//! [`Mailer`]-related implementations.

use common::operations::Perform;
use derive_more::{Display, Error as StdError};
use tracerr::Traced;
use tracing as log;

use crate::domain::user;
#[cfg(doc)]
use crate::domain::User;

/// [`Letter`] delivery operation.
pub use common::Handler as Mailer;

/// Letter addressed to a [`User`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Letter {
    /// Asks a newly registered [`User`] to confirm their [`user::Email`].
    Verification {
        /// [`user::Email`] to confirm.
        to: user::Email,

        /// First [`user::Name`] of the [`User`] to greet.
        name: user::Name,
    },
}

impl Letter {
    /// Returns the [`user::Email`] this [`Letter`] is delivered to.
    #[must_use]
    pub fn recipient(&self) -> &user::Email {
        match self {
            Self::Verification { to, .. } => to,
        }
    }
}

/// [`Mailer`] writing [`Letter`]s to the log instead of delivering them.
#[derive(Clone, Copy, Debug, Default)]
pub struct Log;

impl Mailer<Perform<Letter>> for Log {
    type Ok = ();
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Perform(letter): Perform<Letter>,
    ) -> Result<Self::Ok, Self::Err> {
        match &letter {
            Letter::Verification { to, name } => {
                log::info!("verification letter for `{name}` sent to `{to}`");
            }
        }
        Ok(())
    }
}

/// [`Mailer`] error.
#[derive(Clone, Debug, Display, StdError)]
pub enum Error {
    /// [`Letter`] has not been accepted for delivery.
    #[display("`Letter` to `{_0}` is rejected")]
    Rejected(#[error(not(source))] user::Email),
}
