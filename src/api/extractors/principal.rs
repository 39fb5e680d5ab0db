use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::{AppError, AuthError};
use crate::services::auth::{Authentication, Mechanism, Principal};

/// Extractor handing the authenticated principal to a handler.
///
/// The security middleware inserts `Authentication` into the request extensions.
/// When it is missing (route not behind the chain, or permitted anonymously)
/// or still a raw JWT, the handler answers 401.
#[derive(Debug, Clone)]
pub struct CurrentPrincipal {
    pub principal: Principal,
    pub mechanism: Mechanism,
}

impl<S> FromRequestParts<S> for CurrentPrincipal
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let authentication = parts
            .extensions
            .get::<Authentication>()
            .ok_or(AppError::unauthorized(AuthError::AuthenticationMissing))?;

        match (authentication.principal(), authentication.mechanism()) {
            (Some(principal), Some(mechanism)) => Ok(CurrentPrincipal {
                principal: principal.clone(),
                mechanism,
            }),
            _ => Err(AppError::unauthorized(AuthError::AuthenticationMissing)),
        }
    }
}
