/*
 * Responsibility
 * - Shared context bound to the Router (AppState)
 * - Cheap to clone: the security chain sits behind an Arc and is read-only after startup
 */
use std::sync::Arc;

use crate::middleware::auth::SecurityChain;

#[derive(Clone, Debug)]
pub struct AppState {
    pub security: Arc<SecurityChain>,
}

impl AppState {
    pub fn new(security: Arc<SecurityChain>) -> Self {
        Self { security }
    }
}
