/*
 * Responsibility
 * - AppError shared by the HTTP boundary, with its IntoResponse impl
 * - AuthError taxonomy: every variant collapses to 401 with a plain-text body
 * - Internal errors keep the JSON error envelope
 */
use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

/// Why a request was not let through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No credential was supplied.
    #[error("authentication required")]
    AuthenticationMissing,
    /// A credential was supplied but it was wrong, expired or unsigned.
    #[error("authentication failed")]
    AuthenticationInvalid,
    /// Authenticated, but the matching rule still refuses the request.
    #[error("access denied")]
    AuthorizationDenied,
}

/// Challenge advertised in `WWW-Authenticate` on a 401.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Challenge {
    Basic,
    Bearer,
}

impl Challenge {
    fn header_value(self) -> HeaderValue {
        match self {
            Challenge::Basic => HeaderValue::from_static("Basic realm=\"store\""),
            Challenge::Bearer => HeaderValue::from_static("Bearer"),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{reason}")]
    Unauthorized {
        reason: AuthError,
        challenge: Option<Challenge>,
        message: &'static str,
    },
    #[error("internal server error")]
    Internal,
}

impl AppError {
    pub fn unauthorized(reason: AuthError) -> Self {
        Self::Unauthorized {
            reason,
            challenge: None,
            message: "Unauthorized",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Unauthorized {
                challenge, message, ..
            } => {
                let mut res = (StatusCode::UNAUTHORIZED, message).into_response();
                if let Some(challenge) = challenge {
                    res.headers_mut()
                        .insert(header::WWW_AUTHENTICATE, challenge.header_value());
                }
                res
            }
            AppError::Internal => {
                let body = ErrorResponse {
                    error: ErrorBody {
                        code: "INTERNAL_SERVER_ERROR",
                        message: "internal server error".into(),
                    },
                };
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
        }
    }
}
