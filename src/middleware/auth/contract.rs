//! Contract-test stage.
//!
//! Used instead of the real stages when `SECURITY_PROFILE=contract`. It checks
//! only that each verb carries a credential of the right shape, so contract
//! suites can hit the API with placeholder credentials. Nothing is verified.

use axum::http::{HeaderName, Method, request::Parts};
use tracing::warn;

use crate::error::AuthError;
use crate::middleware::auth::{
    basic::decode_basic,
    chain::{Rejection, Stage},
    context::AuthContext,
    headers::{authorization_param, header_str},
};
use crate::services::auth::{Authentication, Mechanism, Principal};

pub const CONTRACT_PRINCIPAL: &str = "Authenticated User";

fn shape_matches(api_key_header: &HeaderName, parts: &Parts) -> Option<Mechanism> {
    let headers = &parts.headers;
    match parts.method {
        Method::POST => authorization_param(headers, "Bearer").map(|_| Mechanism::Bearer),
        Method::GET => authorization_param(headers, "Basic")
            .filter(|param| decode_basic(param).is_ok())
            .map(|_| Mechanism::Basic),
        Method::DELETE => header_str(headers, api_key_header)
            .filter(|key| !key.is_empty())
            .map(|_| Mechanism::ApiKey),
        _ => None,
    }
}

pub(crate) fn filter(
    api_key_header: &HeaderName,
    parts: &Parts,
    ctx: &mut AuthContext,
) -> Result<(), Rejection> {
    match shape_matches(api_key_header, parts) {
        Some(mechanism) => {
            let principal = Principal::new(CONTRACT_PRINCIPAL, Vec::new());
            ctx.install(
                Stage::ContractShape,
                Authentication::for_mechanism(mechanism, principal),
            );
            Ok(())
        }
        None => {
            warn!(method = %parts.method, path = %parts.uri.path(), "contract profile: credential shape mismatch");
            Err(Rejection {
                stage: Some(Stage::ContractShape),
                reason: AuthError::AuthenticationMissing,
                challenge: None,
                message: "Authentication failed",
            })
        }
    }
}
