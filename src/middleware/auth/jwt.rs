//! JWT principal filter.
//!
//! Runs after the bearer stage. A verified `Authentication::Jwt` is re-wrapped
//! as `Authentication::Bearer` with a generic principal whose roles are the
//! token's scopes, so rule evaluation and handlers never depend on the token
//! shape. Any other authentication passes through untouched.

use axum::http::request::Parts;
use tracing::info;

use crate::middleware::auth::{chain::Stage, context::AuthContext};
use crate::services::auth::{Authentication, Principal, principal::BEARER_PRINCIPAL};

pub(crate) fn filter(parts: &Parts, ctx: &mut AuthContext) {
    let scopes = match ctx.authentication() {
        Authentication::Jwt(jwt) => jwt.scopes.clone(),
        Authentication::Unauthenticated
        | Authentication::ApiKey(_)
        | Authentication::Basic(_)
        | Authentication::Bearer(_) => return,
    };

    info!(
        method = %parts.method,
        path = %parts.uri.path(),
        scopes = %scopes.join(", "),
        "received JWT with scopes"
    );

    ctx.install(
        Stage::JwtPrincipal,
        Authentication::Bearer(Principal::new(BEARER_PRINCIPAL, scopes)),
    );
}
