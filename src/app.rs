/*
 * Responsibility
 * - Load Config -> build auth collaborators and the security chain -> assemble the Router
 * - Apply middleware (security chain inside, HTTP-level layers outside)
 * - Start with axum::serve()
 */
use std::{panic, process};

use anyhow::Result;
use axum::Router;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::error::AppError;
use crate::middleware;
use crate::middleware::auth::SecurityChain;
use crate::services::auth::build_auth_services;
use crate::state::AppState;
use crate::api;

fn init_tracing() {
    // RUST_LOG wins when set, e.g. RUST_LOG=info,store_auth=debug,tower_http=debug
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // stderr may be hidden depending on how the process is launched
        tracing::error!(?info, "panic");

        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;

    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        env = ?config.app_env,
        profile = ?config.security.profile,
        default_policy = ?config.security.default_policy,
        "starting store API on {}",
        config.addr
    );

    let state = build_state(&config)?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Process-level services, built once and shared by every request.
pub fn build_state(config: &Config) -> Result<AppState, AppError> {
    let services = build_auth_services(&config.security)?;
    let security = SecurityChain::from_config(&config.security, services)?;

    tracing::info!(stages = ?security.stages(), "security chain assembled");

    Ok(AppState::new(security))
}

pub fn build_router(state: AppState, config: &Config) -> Router {
    let router = middleware::auth::access::apply(api::routes(), state.clone()).with_state(state);

    middleware::http::apply(router, &config.http)
}
