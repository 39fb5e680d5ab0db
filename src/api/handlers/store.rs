/*
 * Responsibility
 * - Stand-in for the product/order endpoints
 * - Echoes who got through the security chain and how, so the allow path is observable
 */
use axum::{
    Json,
    extract::OriginalUri,
    http::Method,
};
use serde::Serialize;

use crate::api::extractors::CurrentPrincipal;
use crate::services::auth::{Mechanism, Principal};

#[derive(Debug, Serialize)]
pub struct AccessGranted {
    pub method: String,
    pub path: String,
    pub mechanism: Mechanism,
    pub principal: Principal,
}

pub async fn acknowledge(
    method: Method,
    OriginalUri(uri): OriginalUri,
    CurrentPrincipal {
        principal,
        mechanism,
    }: CurrentPrincipal,
) -> Json<AccessGranted> {
    Json(AccessGranted {
        method: method.to_string(),
        path: uri.path().to_string(),
        mechanism,
        principal,
    })
}
