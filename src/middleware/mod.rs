/*
 * Responsibility
 * - Public surface of the middleware layer
 * - auth: security filter chain, http: transport-level layers
 */
pub mod auth;
pub mod http;
