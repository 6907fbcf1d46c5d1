//! [`Command`] for registering a new [`User`].

use argon2::password_hash;
use common::{
    operations::{By, Commit, Insert, Perform, Select, Transact, Transacted},
    DateTime,
};
use derive_more::{Display, Error, From};
use secrecy::{ExposeSecret as _, SecretBox};
use tracerr::Traced;
use tracing as log;

#[cfg(doc)]
use crate::domain::user::{Email, Name, Password, Phone, Role};
use crate::{
    domain::{user, User},
    infra::{
        database,
        mailer::{self, Letter},
        Database, Mailer,
    },
    Service,
};

use super::Command;

/// [`Command`] for registering a new [`User`].
///
/// A [`Letter::Verification`] is sent to the new [`User`] once registered.
/// Failing to send it doesn't fail the registration.
#[derive(Clone, Debug)]
pub struct CreateUser {
    /// First [`Name`] of a new [`User`].
    pub first_name: user::Name,

    /// Last [`Name`] of a new [`User`].
    pub last_name: user::Name,

    /// [`Email`] of a new [`User`].
    pub email: user::Email,

    /// [`Password`] of a new [`User`].
    pub password: SecretBox<user::Password>,

    /// [`Phone`] of a new [`User`].
    pub phone: Option<user::Phone>,

    /// [`Role`] of a new [`User`].
    pub role: user::Role,
}

impl<Db, Ml> Command<CreateUser> for Service<Db, Ml>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: for<'l> Database<
            Select<By<Option<User>, &'l user::Email>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Insert<User>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
    Ml: Mailer<Perform<Letter>, Err = Traced<mailer::Error>>,
{
    type Ok = User;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateUser) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateUser {
            first_name,
            last_name,
            email,
            password,
            phone,
            role,
        } = cmd;

        let password_hash = user::PasswordHash::new(password.expose_secret())
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let occupant = tx
            .execute(Select(By::new(&email)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if occupant.is_some() {
            return Err(tracerr::new!(E::EmailOccupied(email)));
        }

        let user = User {
            id: user::Id::new(),
            first_name,
            last_name,
            email,
            password_hash,
            phone,
            role,
            created_at: DateTime::now().coerce(),
        };

        tx.execute(Insert(user.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::info!("`User(id: {})` registered as `{}`", user.id, user.role);

        let letter = Letter::Verification {
            to: user.email.clone(),
            name: user.first_name.clone(),
        };
        if let Err(e) = self.mailer().execute(Perform(letter)).await {
            log::error!(
                "failed to send verification letter to `User(id: {})`: {e}",
                user.id,
            );
        }

        Ok(user)
    }
}

/// Error of [`CreateUser`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`user::Email`] is registered already.
    #[display("`{_0}` email is occupied")]
    #[from(ignore)]
    EmailOccupied(#[error(not(source))] user::Email),

    /// [`user::Password`] cannot be hashed.
    #[display("Failed to hash a password: {_0}")]
    PasswordHash(password_hash::Error),
}

#[cfg(test)]
mod spec {
    use secrecy::SecretBox;

    use crate::{
        domain::user,
        infra::mailer::Letter,
        query::{self, Query as _},
        tests::Scenario,
        Command as _,
    };

    use super::{CreateUser, ExecutionError};

    fn registration(email: &str) -> CreateUser {
        CreateUser {
            first_name: user::Name::new("Frieda").unwrap(),
            last_name: user::Name::new("Friesen").unwrap(),
            email: user::Email::new(email).unwrap(),
            password: SecretBox::new(Box::new(
                user::Password::new("Leuchtturm-7").unwrap(),
            )),
            phone: user::Phone::new("+49 4841 12345"),
            role: user::Role::Host,
        }
    }

    #[tokio::test]
    async fn registers_user_with_hashed_password() {
        let s = Scenario::new().await;

        let user = s
            .service
            .execute(registration("frieda@example.de"))
            .await
            .unwrap();

        assert_eq!(user.email.to_string(), "frieda@example.de");
        assert!(user.is_host());
        assert!(user
            .password_hash
            .verify(&user::Password::new("Leuchtturm-7").unwrap()));
        assert!(!user.password_hash.to_string().contains("Leuchtturm-7"));

        let stored = s
            .service
            .execute(query::user::ById::by(user.id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.password_hash, user.password_hash);

        assert_eq!(
            s.service.mailer().letters(),
            [Letter::Verification {
                to: user.email.clone(),
                name: user.first_name.clone(),
            }],
        );
    }

    #[tokio::test]
    async fn rejects_occupied_email() {
        let s = Scenario::new().await;

        let err = s
            .service
            .execute(registration(s.guest.email.as_ref()))
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::EmailOccupied(e) if *e == s.guest.email,
        ));
        assert!(s.service.mailer().letters().is_empty());
    }

    #[tokio::test]
    async fn registers_even_if_letter_is_rejected() {
        let s = Scenario::new().await;
        s.service.mailer().reject_all();

        let user = s
            .service
            .execute(registration("frieda@example.de"))
            .await
            .unwrap();

        let stored = s
            .service
            .execute(query::user::ById::by(user.id))
            .await
            .unwrap();
        assert!(stored.is_some());
        assert!(s.service.mailer().letters().is_empty());
    }
}
