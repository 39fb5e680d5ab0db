//! HTTP Basic stage: `Authorization: Basic base64(user:pass)` against the demo user.
//!
//! Malformed headers (bad base64, non UTF-8, no colon) are logged and treated as
//! a failed attempt; they never abort the request on their own.

use axum::http::request::Parts;
use base64::{Engine, engine::general_purpose::STANDARD};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::middleware::auth::{chain::Stage, context::AuthContext, headers::authorization_param};
use crate::services::auth::{Authentication, Mechanism, StaticCredentialStore};

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum BasicDecodeError {
    #[error("credentials are not valid base64")]
    Base64,
    #[error("credentials are not valid UTF-8")]
    Utf8,
    #[error("credentials are missing the ':' separator")]
    MissingSeparator,
}

/// Decode the `user:pass` pair. The password may itself contain ':'.
pub(crate) fn decode_basic(param: &str) -> Result<(String, String), BasicDecodeError> {
    let bytes = STANDARD
        .decode(param)
        .map_err(|_| BasicDecodeError::Base64)?;
    let decoded = String::from_utf8(bytes).map_err(|_| BasicDecodeError::Utf8)?;
    let (user, pass) = decoded
        .split_once(':')
        .ok_or(BasicDecodeError::MissingSeparator)?;
    Ok((user.to_string(), pass.to_string()))
}

pub(crate) fn filter(credentials: &StaticCredentialStore, parts: &Parts, ctx: &mut AuthContext) {
    let Some(param) = authorization_param(&parts.headers, "Basic") else {
        return;
    };

    let path = parts.uri.path();
    if ctx.is_authenticated() {
        debug!(method = %parts.method, path = %path, "already authenticated; basic credentials ignored");
        return;
    }

    let (username, password) = match decode_basic(param) {
        Ok(pair) => pair,
        Err(err) => {
            warn!(method = %parts.method, path = %path, error = %err, "malformed basic credentials");
            ctx.record_failure(Mechanism::Basic);
            return;
        }
    };

    match credentials.verify_basic(&username, &password) {
        Some(principal) => {
            info!(method = %parts.method, path = %path, user = %principal.name, "authenticated with basic credentials");
            ctx.install(Stage::HttpBasic, Authentication::Basic(principal));
        }
        None => {
            warn!(method = %parts.method, path = %path, user = %username, "basic credentials rejected");
            ctx.record_failure(Mechanism::Basic);
        }
    }
}
