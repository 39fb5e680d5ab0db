//! API key filter: `DELETE` requests authenticate with a static key header.
//!
//! Runs first in the chain, before any `Authorization` header is looked at.
//! A wrong or missing key never aborts the request; the context simply stays
//! unauthenticated and rule evaluation produces the 401.

use axum::http::{HeaderName, Method, request::Parts};
use tracing::{info, warn};

use crate::middleware::auth::{chain::Stage, context::AuthContext, headers::header_str};
use crate::services::auth::{Authentication, Mechanism, Principal, StaticCredentialStore};

pub(crate) fn filter(
    header: &HeaderName,
    credentials: &StaticCredentialStore,
    parts: &Parts,
    ctx: &mut AuthContext,
) {
    if parts.method != Method::DELETE {
        return;
    }

    let path = parts.uri.path();
    match header_str(&parts.headers, header) {
        Some(key) if credentials.api_key_matches(key) => {
            info!(method = %parts.method, path = %path, "authenticated with valid API key");
            ctx.install(Stage::ApiKey, Authentication::ApiKey(Principal::api_key_user()));
        }
        Some(_) => {
            warn!(method = %parts.method, path = %path, "invalid API key");
            ctx.record_failure(Mechanism::ApiKey);
        }
        None => {
            warn!(method = %parts.method, path = %path, "missing API key");
        }
    }
}
