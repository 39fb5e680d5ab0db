//! Per-request authentication context.
//!
//! One `AuthContext` is created for each request when the chain starts, threaded
//! through the stages by `&mut`, read by rule evaluation and then dropped.
//! Nothing here is shared between requests.

use crate::middleware::auth::chain::Stage;
use crate::services::auth::{Authentication, Mechanism};

#[derive(Debug, Default)]
pub struct AuthContext {
    authentication: Authentication,
    transitions: Vec<Stage>,
    failed_attempt: Option<Mechanism>,
}

impl AuthContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn authentication(&self) -> &Authentication {
        &self.authentication
    }

    pub fn is_authenticated(&self) -> bool {
        self.authentication.is_authenticated()
    }

    /// Replace the current authentication and remember which stage did it.
    pub fn install(&mut self, stage: Stage, authentication: Authentication) {
        self.authentication = authentication;
        self.transitions.push(stage);
    }

    /// Stages that changed the authentication, in the order they ran.
    pub fn transitions(&self) -> &[Stage] {
        &self.transitions
    }

    /// A credential for `mechanism` was presented but did not check out.
    pub fn record_failure(&mut self, mechanism: Mechanism) {
        self.failed_attempt = Some(mechanism);
    }

    pub fn failed_attempt(&self) -> Option<Mechanism> {
        self.failed_attempt
    }

    pub fn into_authentication(self) -> Authentication {
        self.authentication
    }
}
