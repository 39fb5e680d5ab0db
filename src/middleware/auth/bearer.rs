//! Bearer token stage (resource-server equivalent).
//!
//! Verifies `Authorization: Bearer <token>` with the configured `TokenVerifier`
//! and installs the raw `Authentication::Jwt`. Unlike the other stages, a token
//! that fails verification ends the request here with a 401.

use axum::http::request::Parts;
use tracing::{debug, warn};

use crate::error::{AuthError, Challenge};
use crate::middleware::auth::{
    chain::{Rejection, Stage},
    context::AuthContext,
    headers::authorization_param,
};
use crate::services::auth::{Authentication, Mechanism, TokenVerifier};

fn reject() -> Rejection {
    Rejection {
        stage: Some(Stage::BearerToken),
        reason: AuthError::AuthenticationInvalid,
        challenge: Some(Challenge::Bearer),
        message: "Unauthorized",
    }
}

pub(crate) fn filter(
    verifier: Option<&dyn TokenVerifier>,
    parts: &Parts,
    ctx: &mut AuthContext,
) -> Result<(), Rejection> {
    let Some(token) = authorization_param(&parts.headers, "Bearer") else {
        return Ok(());
    };

    let path = parts.uri.path();
    if ctx.is_authenticated() {
        debug!(method = %parts.method, path = %path, "already authenticated; bearer token ignored");
        return Ok(());
    }

    if token.is_empty() {
        warn!(method = %parts.method, path = %path, "empty bearer token");
        ctx.record_failure(Mechanism::Bearer);
        return Err(reject());
    }

    let Some(verifier) = verifier else {
        warn!(method = %parts.method, path = %path, "bearer token presented but no verifier is configured");
        ctx.record_failure(Mechanism::Bearer);
        return Err(reject());
    };

    match verifier.verify(token) {
        Ok(verified) => {
            debug!(
                method = %parts.method,
                path = %path,
                sub = ?verified.subject,
                jti = ?verified.jti,
                "bearer token verified"
            );
            ctx.install(Stage::BearerToken, Authentication::Jwt(verified));
            Ok(())
        }
        Err(err) => {
            warn!(method = %parts.method, path = %path, error = %err, "access token verification failed");
            ctx.record_failure(Mechanism::Bearer);
            Err(reject())
        }
    }
}
