//! [`User`]-related definitions.

use axum::{extract::rejection::JsonRejection, Json};
use common::DateTime;
use http::StatusCode;
use secrecy::{ExposeSecret as _, SecretBox, SecretString};
use serde::{Deserialize, Serialize};
use service::{
    command::{self, create_user_session, Command as _},
    domain, query, Query as _,
};

use crate::{define_error, AsError, Context, Error};

/// A user.
#[derive(Clone, Debug, Serialize)]
pub struct User {
    /// ID of this [`User`].
    pub id: domain::user::Id,

    /// First name of this [`User`].
    pub first_name: String,

    /// Last name of this [`User`].
    pub last_name: String,

    /// Email address of this [`User`].
    pub email: String,

    /// Phone number of this [`User`].
    pub phone: Option<String>,

    /// Role of this [`User`].
    pub role: domain::user::Role,

    /// [`DateTime`] when this [`User`] was created.
    pub created_at: DateTime,
}

impl From<domain::User> for User {
    fn from(u: domain::User) -> Self {
        Self {
            id: u.id,
            first_name: u.first_name.to_string(),
            last_name: u.last_name.to_string(),
            email: u.email.to_string(),
            phone: u.phone.as_ref().map(ToString::to_string),
            role: u.role,
            created_at: u.created_at.coerce(),
        }
    }
}

/// Public summary of a [`User`] taking part in a booking.
#[derive(Clone, Debug, Serialize)]
pub struct Summary {
    /// ID of the [`User`].
    pub id: domain::user::Id,

    /// First name of the [`User`].
    pub first_name: String,

    /// Last name of the [`User`].
    pub last_name: String,
}

impl From<domain::User> for Summary {
    fn from(u: domain::User) -> Self {
        Self {
            id: u.id,
            first_name: u.first_name.to_string(),
            last_name: u.last_name.to_string(),
        }
    }
}

/// Response of [`me()`].
#[derive(Debug, Serialize)]
pub struct MeResponse {
    /// Authenticated [`User`].
    pub user: User,
}

/// `GET /auth/me`: returns the authenticated [`User`].
///
/// # Errors
///
/// If the request is not authorized.
#[tracing::instrument(skip_all, fields(api.name = "me"))]
pub async fn me(ctx: Context) -> Result<axum::Json<MeResponse>, Error> {
    let my_id = ctx.current_session().await?.user_id;

    ctx.service()
        .execute(query::user::ById::by(my_id))
        .await
        .map_err(AsError::into_error)
        .map_err(ctx.error())?
        .ok_or_else(|| UserError::NotExists.into())
        .map_err(ctx.error())
        .map(|u| axum::Json(MeResponse { user: u.into() }))
}

/// Request body of [`register()`].
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    /// Email address to register with.
    pub email: String,

    /// Password to log in with.
    pub password: SecretString,

    /// First name of the new [`User`].
    pub first_name: String,

    /// Last name of the new [`User`].
    pub last_name: String,

    /// Phone number of the new [`User`].
    #[serde(default)]
    pub phone: Option<String>,

    /// Role of the new [`User`], guest by default.
    #[serde(default)]
    pub role: Option<domain::user::Role>,
}

/// Request body of [`login()`].
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Email address of the [`User`].
    pub email: String,

    /// Password of the [`User`].
    pub password: SecretString,
}

/// Response of [`register()`] and [`login()`].
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    /// Localized message.
    pub message: Option<String>,

    /// Authenticated [`User`].
    pub user: User,

    /// Bearer token of the session.
    pub token: String,

    /// [`DateTime`] when the `token` expires.
    pub expires_at: DateTime,
}

impl SessionResponse {
    /// Builds a [`SessionResponse`] out of the created session, localizing
    /// the message with the provided `key`.
    fn new(
        ctx: &Context,
        key: &str,
        out: create_user_session::Output,
    ) -> Self {
        Self {
            message: ctx.locale().translate(key).map(ToOwned::to_owned),
            user: out.user.into(),
            token: out.token.to_string(),
            expires_at: out.expires_at.coerce(),
        }
    }
}

/// `POST /auth/register`: registers a new [`User`] and logs them in.
///
/// # Errors
///
/// If the request body is malformed or the email is occupied.
#[tracing::instrument(skip_all, fields(api.name = "register"))]
pub async fn register(
    ctx: Context,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SessionResponse>), Error> {
    use domain::user;

    let Json(req) = body.map_err(AsError::into_error).map_err(ctx.error())?;

    let phone = match req.phone.filter(|p| !p.is_empty()) {
        Some(p) => Some(
            user::Phone::new(p)
                .ok_or_else(|| Invalid::Phone.into())
                .map_err(ctx.error())?,
        ),
        None => None,
    };
    let cmd = command::CreateUser {
        first_name: user::Name::new(req.first_name)
            .ok_or_else(|| Invalid::Name.into())
            .map_err(ctx.error())?,
        last_name: user::Name::new(req.last_name)
            .ok_or_else(|| Invalid::Name.into())
            .map_err(ctx.error())?,
        email: email(req.email).map_err(ctx.error())?,
        password: password(&req.password).map_err(ctx.error())?,
        phone,
        role: req.role.unwrap_or(user::Role::Guest),
    };

    let user = ctx
        .service()
        .execute(cmd)
        .await
        .map_err(AsError::into_error)
        .map_err(ctx.error())?;
    let out = ctx
        .service()
        .execute(command::CreateUserSession::ByUserId(user.id))
        .await
        .map_err(AsError::into_error)
        .map_err(ctx.error())?;

    Ok((
        StatusCode::CREATED,
        Json(SessionResponse::new(&ctx, "auth.registered", out)),
    ))
}

/// `POST /auth/login`: logs a [`User`] in by their credentials.
///
/// # Errors
///
/// If the request body is malformed or the credentials are wrong.
#[tracing::instrument(skip_all, fields(api.name = "login"))]
pub async fn login(
    ctx: Context,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<SessionResponse>, Error> {
    let Json(req) = body.map_err(AsError::into_error).map_err(ctx.error())?;

    // Malformed credentials can't match any `User`.
    let credentials = email(req.email)
        .and_then(|e| password(&req.password).map(|p| (e, p)))
        .map_err(|_| CredentialsError::Wrong.into())
        .map_err(ctx.error())?;
    let (email, password) = credentials;

    ctx.service()
        .execute(command::CreateUserSession::ByCredentials { email, password })
        .await
        .map_err(AsError::into_error)
        .map_err(ctx.error())
        .map(|out| Json(SessionResponse::new(&ctx, "auth.logged_in", out)))
}

/// Parses the provided `address` into a [`domain::user::Email`].
fn email(address: String) -> Result<domain::user::Email, Error> {
    domain::user::Email::new(address.trim().to_lowercase())
        .ok_or_else(|| Invalid::Email.into())
}

/// Parses the provided `secret` into a [`domain::user::Password`].
fn password(
    secret: &SecretString,
) -> Result<SecretBox<domain::user::Password>, Error> {
    let password = domain::user::Password::new(secret.expose_secret())
        .ok_or_else(|| Error::from(Invalid::Password))?;
    Ok(SecretBox::init_with(move || password))
}

impl AsError for command::create_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::EmailOccupied(_) => Some(UserError::EmailOccupied.into()),
            Self::PasswordHash(_) => None,
        }
    }
}

impl AsError for create_user_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::ExpirationOutOfRange | Self::JsonWebTokenEncodeError(_) => {
                None
            }
            Self::UserNotExists(_) | Self::WrongCredentials => {
                Some(CredentialsError::Wrong.into())
            }
        }
    }
}

define_error! {
    enum UserError {
        #[code = "USER_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`User` does not exist"]
        NotExists,

        #[code = "EMAIL_OCCUPIED"]
        #[status = BAD_REQUEST]
        #[message = "Email is registered by another `User` already"]
        EmailOccupied,
    }
}

define_error! {
    enum CredentialsError {
        #[code = "WRONG_CREDENTIALS"]
        #[status = UNAUTHORIZED]
        #[message = "Provided credentials don't match any `User`"]
        Wrong,
    }
}

define_error! {
    enum Invalid {
        #[code = "INVALID_EMAIL"]
        #[status = BAD_REQUEST]
        #[message = "Email address is invalid"]
        Email,

        #[code = "INVALID_PASSWORD"]
        #[status = BAD_REQUEST]
        #[message = "Password must be 8 to 128 characters long"]
        Password,

        #[code = "INVALID_NAME"]
        #[status = BAD_REQUEST]
        #[message = "First and last names must be 1 to 100 characters long \
                     without surrounding spaces"]
        Name,

        #[code = "INVALID_PHONE"]
        #[status = BAD_REQUEST]
        #[message = "Phone number must contain 7 to 15 digits"]
        Phone,
    }
}
