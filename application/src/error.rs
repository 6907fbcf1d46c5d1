//! [`Error`]-related definitions.

use std::{fmt, num::TryFromIntError};

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::typed_header::TypedHeaderRejection;
use derive_more::Error as StdError;
use itertools::Itertools as _;
use serde::Serialize;
use service::infra::database;
use tracerr::{Trace, Traced};
use tracing as log;

use crate::i18n::Locale;

/// Defines a new error type.
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_error {
    (
        enum $name:ident {
            $(
                #[code = $code:literal]
                #[status = $status_code:ident]
                #[message = $message:literal]
                $variant:ident
            ),* $(,)?
        }
    ) => {
        /// Error type.
        #[derive(
            Clone,
            Copy,
            Debug,
            ::derive_more::Display,
            ::derive_more::Error
        )]
        #[repr(u16)]
        pub enum $name {
            $(
                #[display($message)]
                #[doc = $message]
                $variant,
            )*
        }

        impl From<$name> for $crate::Error {
            fn from(err: $name) -> Self {
                match err {
                    $(
                        $name::$variant => Self {
                            code: $code,
                            status_code: ::http::StatusCode::$status_code,
                            message: $message.to_string(),
                            backtrace: None,
                        },
                    )*
                }
            }
        }
    };
}

/// REST API [`Error`].
#[derive(Clone, Debug, StdError)]
pub struct Error {
    /// [`Error`] code.
    pub code: Code,

    /// [`http::StatusCode`] of this [`Error`].
    pub status_code: http::StatusCode,

    /// Backtrace of this [`Error`].
    #[error(not(backtrace))]
    pub backtrace: Option<Trace>,

    /// [`Error`] message.
    pub message: String,
}

impl Error {
    /// Code of [`Error::internal()`]s.
    pub const INTERNAL: Code = "INTERNAL_SERVER_ERROR";

    /// Create a new [`Error`] representing an internal server error.
    ///
    /// The provided `err` is logged, while the client only sees a generic
    /// message.
    #[must_use]
    pub fn internal(err: &impl ToString) -> Self {
        log::error!("internal server error: {}", err.to_string());

        Self {
            code: Self::INTERNAL,
            status_code: http::StatusCode::INTERNAL_SERVER_ERROR,
            message: "Internal server error".to_owned(),
            backtrace: None,
        }
    }

    /// Translates the message of this [`Error`] into the provided
    /// [`Locale`], if there is a translation for its code.
    #[must_use]
    pub fn localized(mut self, locale: Locale) -> Self {
        if let Some(msg) = locale.translate(self.code) {
            msg.clone_into(&mut self.message);
        }
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            code,
            status_code: _,
            backtrace,
            message,
        } = self;

        write!(
            f,
            "[{code}]: {message}{}",
            backtrace
                .iter()
                .format_with("\n", |trace, f| f(&format_args!("{trace}"))),
        )
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        /// JSON body of an [`Error`] response.
        #[derive(Serialize)]
        struct Body {
            /// [`Error`] code.
            code: Code,

            /// Localized [`Error`] message.
            message: String,
        }

        if self.backtrace.is_some() {
            log::debug!("{self}");
        }

        let Self {
            code,
            status_code,
            message,
            backtrace: _,
        } = self;
        (status_code, Json(Body { code, message })).into_response()
    }
}

/// [`Error`] code.
pub type Code = &'static str;

/// Helper trait for converting types into [`Error`]s.
pub trait AsError {
    /// Tries to convert the type into an [`Error`].
    ///
    /// [`None`] is returned if the type cannot be converted into an [`Error`].
    fn try_as_error(&self) -> Option<Error>;

    /// Converts the type into an [`Error`].
    fn as_error(&self) -> Error
    where
        Self: fmt::Display,
    {
        self.try_as_error()
            .unwrap_or_else(|| Error::internal(&self))
    }

    /// Converts the type into an [`Error`] by consuming it.
    fn into_error(self) -> Error
    where
        Self: fmt::Display + Sized,
    {
        self.as_error()
    }
}

impl<E: AsError> AsError for Traced<E> {
    fn try_as_error(&self) -> Option<Error> {
        let mut error = self.as_ref().try_as_error()?;
        error.backtrace = Some(self.trace().clone());
        Some(error)
    }
}

define_error! {
    enum RequestError {
        #[code = "INVALID_BODY"]
        #[status = BAD_REQUEST]
        #[message = "Request body is malformed or misses required fields"]
        InvalidBody,

        #[code = "INVALID_PARAMETERS"]
        #[status = BAD_REQUEST]
        #[message = "Query parameters are malformed"]
        InvalidParameters,

        #[code = "INVALID_PATH"]
        #[status = BAD_REQUEST]
        #[message = "Resource identifier is malformed"]
        InvalidPath,

        #[code = "INVALID_HEADER"]
        #[status = BAD_REQUEST]
        #[message = "Request header is malformed"]
        InvalidHeader,
    }
}

impl AsError for JsonRejection {
    fn try_as_error(&self) -> Option<Error> {
        log::debug!("rejected request body: {self}");
        Some(RequestError::InvalidBody.into())
    }
}

impl AsError for QueryRejection {
    fn try_as_error(&self) -> Option<Error> {
        log::debug!("rejected query parameters: {self}");
        Some(RequestError::InvalidParameters.into())
    }
}

impl AsError for PathRejection {
    fn try_as_error(&self) -> Option<Error> {
        log::debug!("rejected path parameters: {self}");
        Some(RequestError::InvalidPath.into())
    }
}

impl AsError for TypedHeaderRejection {
    fn try_as_error(&self) -> Option<Error> {
        log::debug!("rejected header: {self}");
        Some(RequestError::InvalidHeader.into())
    }
}

impl AsError for database::Error {
    fn try_as_error(&self) -> Option<Error> {
        None
    }
}

impl AsError for TryFromIntError {
    fn try_as_error(&self) -> Option<Error> {
        None
    }
}
