//! [`Command`] for creating a [`Session`].

use std::time::Duration;

use common::{
    operations::{By, Select},
    DateTime, DateTimeOf,
};
use derive_more::{Display, Error, From};
use secrecy::{ExposeSecret as _, SecretBox};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::user::{session::Token, Email, Password};
use crate::{
    domain::{
        user::{self, session, Session},
        User,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a [`Session`].
#[derive(Clone, Debug, From)]
pub enum CreateUserSession {
    /// Create a new [`Session`] by [`User`] credentials.
    ByCredentials {
        /// [`Email`] of a [`User`].
        email: user::Email,

        /// [`Password`] of a [`User`].
        password: SecretBox<user::Password>,
    },

    /// Create a new [`Session`] by [`User`] ID.
    ByUserId(user::Id),
}

impl CreateUserSession {
    /// [`Duration`] of [`Session`] expiration.
    const EXPIRATION_DURATION: Duration = Duration::from_secs(7 * 24 * 60 * 60);
}

/// Output of [`CreateUserSession`] [`Command`].
#[derive(Clone, Debug)]
pub struct Output {
    /// [`Token`] of the created [`Session`].
    pub token: session::Token,

    /// [`User`] whose [`Session`] has been created.
    pub user: User,

    /// [`DateTime`] when the [`Session`] expires.
    pub expires_at: session::ExpirationDateTime,
}

impl<Db, Ml> Command<CreateUserSession> for Service<Db, Ml>
where
    Db: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + for<'l> Database<
            Select<By<Option<User>, &'l user::Email>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateUserSession,
    ) -> Result<Self::Ok, Self::Err> {
        use CreateUserSession as Cmd;
        use ExecutionError as E;

        let user = match cmd {
            Cmd::ByCredentials { email, password } => {
                let user = self
                    .database()
                    .execute(Select(By::new(&email)))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?
                    .ok_or(E::WrongCredentials)
                    .map_err(tracerr::wrap!())?;

                if !user.password_hash.verify(password.expose_secret()) {
                    return Err(tracerr::new!(E::WrongCredentials));
                }

                user
            }
            Cmd::ByUserId(user_id) => self
                .database()
                .execute(Select(By::new(user_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::UserNotExists(user_id))
                .map_err(tracerr::wrap!())?,
        };

        let lifetime = i64::try_from(Cmd::EXPIRATION_DURATION.as_secs())
            .unwrap_or(i64::MAX);
        let expires_at = DateTimeOf::from_unix_timestamp(
            DateTime::now().unix_timestamp().saturating_add(lifetime),
        )
        .ok_or(E::ExpirationOutOfRange)
        .map_err(tracerr::wrap!())?;
        let token = jsonwebtoken::encode::<Session>(
            &jsonwebtoken::Header::default(),
            &Session {
                user_id: user.id,
                expires_at,
            },
            &self.config.jwt_encoding_key,
        )
        .map_err(tracerr::from_and_wrap!(=> E))?;

        // SAFETY: `jsonwebtoken::encode` always returns a valid
        //         `session::Token`.
        #[expect(unsafe_code, reason = "invariants are preserved")]
        let token = unsafe { session::Token::new_unchecked(token) };

        Ok(Output {
            token,
            user,
            expires_at,
        })
    }
}

/// Error of [`CreateUserSession`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Session`] expiration doesn't fit into a [`DateTime`].
    #[display("`Session` expiration is out of range")]
    #[from(ignore)]
    ExpirationOutOfRange,

    /// [`jsonwebtoken`] encoding error.
    #[display("Failed to encode a JSON Web Token: {_0}")]
    JsonWebTokenEncodeError(jsonwebtoken::errors::Error),

    /// [`User`] with the provided ID does not exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),

    /// [`CreateUserSession::ByCredentials`] contains wrong credentials.
    #[display("Wrong `User` credentials")]
    WrongCredentials,
}

#[cfg(test)]
mod spec {
    use common::DateTime;
    use secrecy::SecretBox;

    use crate::{
        command::AuthorizeUserSession,
        domain::user,
        tests::{Scenario, PASSWORD},
        Command as _,
    };

    use super::{CreateUserSession, ExecutionError};

    fn credentials(email: &user::Email, password: &str) -> CreateUserSession {
        CreateUserSession::ByCredentials {
            email: email.clone(),
            password: SecretBox::new(Box::new(
                user::Password::new(password).unwrap(),
            )),
        }
    }

    #[tokio::test]
    async fn issues_token_for_valid_credentials() {
        let s = Scenario::new().await;

        let out = s
            .service
            .execute(credentials(&s.host.email, PASSWORD))
            .await
            .unwrap();

        assert_eq!(out.user.id, s.host.id);
        assert!(out.expires_at > DateTime::now().coerce());

        let (session, user) = s
            .service
            .execute(AuthorizeUserSession { token: out.token })
            .await
            .unwrap();
        assert_eq!(session.user_id, s.host.id);
        assert_eq!(user.id, s.host.id);
    }

    #[tokio::test]
    async fn rejects_wrong_password_and_unknown_email() {
        let s = Scenario::new().await;

        let err = s
            .service
            .execute(credentials(&s.host.email, "Strandkorb-43"))
            .await
            .unwrap_err();
        assert!(matches!(err.as_ref(), ExecutionError::WrongCredentials));

        let stranger = user::Email::new("nobody@example.de").unwrap();
        let err = s
            .service
            .execute(credentials(&stranger, PASSWORD))
            .await
            .unwrap_err();
        assert!(matches!(err.as_ref(), ExecutionError::WrongCredentials));
    }

    #[tokio::test]
    async fn issues_token_by_user_id() {
        let s = Scenario::new().await;

        let out = s
            .service
            .execute(CreateUserSession::ByUserId(s.guest.id))
            .await
            .unwrap();
        assert_eq!(out.user.id, s.guest.id);

        let stranger = user::Id::new();
        let err = s
            .service
            .execute(CreateUserSession::ByUserId(stranger))
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::UserNotExists(id) if *id == stranger,
        ));
    }
}
