//! Authentication filter chain and authorization rules.
//!
//! Request flow:
//! `ApiKey -> HttpBasic -> BearerToken -> JwtPrincipal -> rules -> handler`

pub mod access;
mod api_key;
mod basic;
mod bearer;
pub mod chain;
pub mod context;
mod contract;
mod headers;
mod jwt;
pub mod rules;

pub use chain::{ChainError, Rejection, SecurityChain, Stage};
pub use context::AuthContext;
pub use rules::{AuthorizationPolicy, AuthorizationRule, PathPattern, Requirement, Verdict};
