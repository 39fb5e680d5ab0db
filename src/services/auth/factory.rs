/// Factory: build the process-level auth collaborators from `SecurityConfig`.
use std::sync::Arc;

use tracing::warn;

use crate::config::SecurityConfig;
use crate::error::AppError;
use crate::services::auth::{JwtVerifier, StaticCredentialStore, TokenVerifier};

/// Collaborators shared (read-only) by every request's filter chain.
#[derive(Clone)]
pub struct AuthServices {
    pub credentials: StaticCredentialStore,
    /// `None` when no JWT key is configured.
    pub verifier: Option<Arc<dyn TokenVerifier>>,
}

impl std::fmt::Debug for AuthServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthServices")
            .field("credentials", &self.credentials)
            .field("verifier", &self.verifier.is_some())
            .finish()
    }
}

pub fn build_auth_services(config: &SecurityConfig) -> Result<AuthServices, AppError> {
    let credentials = StaticCredentialStore::from_config(config).map_err(|e| {
        warn!(error = %e, "failed to build credential store");
        AppError::Internal
    })?;

    let verifier = match &config.jwt {
        Some(jwt) => {
            let verifier = JwtVerifier::new(jwt).map_err(|e| {
                warn!(error = %e, "failed to build bearer token verifier");
                AppError::Internal
            })?;
            Some(Arc::new(verifier) as Arc<dyn TokenVerifier>)
        }
        None => {
            warn!("no JWT key configured; bearer authentication will reject every token");
            None
        }
    };

    Ok(AuthServices {
        credentials,
        verifier,
    })
}
