//! [`Command`] for authorizing a [`User`].

use common::operations::{By, Select};
use derive_more::{Display, Error, From};
use jsonwebtoken::Validation;
use tracerr::Traced;

use crate::{
    domain::{
        user::{self, session, Session},
        User,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for authorizing a [`User`] by a bearer [`session::Token`].
#[derive(Clone, Debug, From)]
pub struct AuthorizeUserSession {
    /// [`Session`] token to authorize.
    pub token: session::Token,
}

impl<Db, Ml> Command<AuthorizeUserSession> for Service<Db, Ml>
where
    Db: Database<
        Select<By<Option<User>, user::Id>>,
        Ok = Option<User>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = (Session, User);
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: AuthorizeUserSession,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let AuthorizeUserSession { token } = cmd;

        let session = jsonwebtoken::decode::<Session>(
            token.as_ref(),
            &self.config.jwt_decoding_key,
            &Validation::default(),
        )
        .map_err(tracerr::from_and_wrap!(=> E))?
        .claims;

        let user = self
            .database()
            .execute(Select(By::new(session.user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UserNotExists(session.user_id))
            .map_err(tracerr::wrap!())?;

        Ok((session, user))
    }
}

/// Error of [`AuthorizeUserSession`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`jsonwebtoken`] decoding error.
    #[display("Failed to decode a JSON Web Token: {_0}")]
    JsonWebTokenDecodeError(jsonwebtoken::errors::Error),

    /// [`User`] the [`Session`] belongs to does not exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),
}

#[cfg(test)]
mod spec {
    use common::{DateTime, DateTimeOf};
    use jsonwebtoken::{EncodingKey, Header};

    use crate::{
        domain::user::{self, session::Token, Session},
        tests::{Scenario, JWT_SECRET},
        Command as _,
    };

    use super::{AuthorizeUserSession, ExecutionError};

    fn token(user_id: user::Id, secret: &[u8]) -> Token {
        let session = Session {
            user_id,
            expires_at: DateTimeOf::from_unix_timestamp(
                DateTime::now().unix_timestamp() + 3600,
            )
            .unwrap(),
        };
        let token = jsonwebtoken::encode(
            &Header::default(),
            &session,
            &EncodingKey::from_secret(secret),
        )
        .unwrap();
        token.parse().unwrap()
    }

    #[tokio::test]
    async fn loads_user_of_valid_token() {
        let s = Scenario::new().await;

        let (session, user) = s
            .service
            .execute(AuthorizeUserSession {
                token: token(s.guest.id, JWT_SECRET),
            })
            .await
            .unwrap();

        assert_eq!(session.user_id, s.guest.id);
        assert_eq!(user.id, s.guest.id);
    }

    #[tokio::test]
    async fn rejects_foreign_signature_and_unknown_user() {
        let s = Scenario::new().await;

        let err = s
            .service
            .execute(AuthorizeUserSession {
                token: token(s.guest.id, b"another secret"),
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::JsonWebTokenDecodeError(_),
        ));

        let stranger = user::Id::new();
        let err = s
            .service
            .execute(AuthorizeUserSession {
                token: token(stranger, JWT_SECRET),
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::UserNotExists(id) if *id == stranger,
        ));
    }
}
