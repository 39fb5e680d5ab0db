//! Per-verb authentication for the store API.
//!
//! `POST` needs a verified bearer token, `GET` HTTP Basic credentials and
//! `DELETE` a static API key. See [`middleware::auth`] for the filter chain.

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod services;
pub mod state;
