/*
 * Responsibility
 * - URL surface of the store API (routes() re-export)
 */
pub mod extractors;
pub mod handlers;
mod routes;

pub use routes::routes;
