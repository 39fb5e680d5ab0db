//! Security middleware: runs the filter chain for every request, then either
//! hands the request on with its `Authentication` in the extensions or answers 401.

use axum::{
    Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
};
use tracing::{debug, warn};

use crate::error::AppError;
use crate::state::AppState;

/// Put the security chain in front of every route of `router`.
///
/// ```ignore
/// let router = api::routes();
/// let router = middleware::auth::access::apply(router, state.clone());
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // from_fn cannot take the State extractor in axum 0.8; pass state explicitly
    router.layer(middleware::from_fn_with_state(state, access_middleware))
}

async fn access_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let ctx = match state.security.authenticate(&parts) {
        Ok(ctx) => ctx,
        Err(rejection) => {
            warn!(
                method = %parts.method,
                path = %parts.uri.path(),
                stage = ?rejection.stage,
                reason = %rejection.reason,
                "request rejected"
            );
            return Err(rejection.into());
        }
    };

    debug!(
        method = %parts.method,
        path = %parts.uri.path(),
        mechanism = ?ctx.authentication().mechanism(),
        "request allowed"
    );

    // middleware -> extractor handoff
    parts.extensions.insert(ctx.into_authentication());

    Ok(next.run(Request::from_parts(parts, body)).await)
}
