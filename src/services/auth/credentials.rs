/*
 * Responsibility
 * - StaticCredentialStore: the single demo user (bcrypt hash) and the single valid API key
 * - Immutable after startup; shared across requests behind an Arc
 * - A real deployment replaces this with a secret store / user directory
 */
use std::fmt;

use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::config::{DemoPassword, SecurityConfig};
use crate::services::auth::principal::{Principal, ROLE_USER};

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("failed to hash demo password: {0}")]
    Hash(#[from] bcrypt::BcryptError),
    #[error("api key must not be empty")]
    EmptyApiKey,
}

#[derive(Clone)]
struct DemoUser {
    username: String,
    password_hash: String,
    roles: Vec<String>,
}

#[derive(Clone)]
pub struct StaticCredentialStore {
    user: DemoUser,
    api_key_digest: [u8; 32],
}

impl fmt::Debug for StaticCredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print the hash or the key digest
        f.debug_struct("StaticCredentialStore")
            .field("username", &self.user.username)
            .field("roles", &self.user.roles)
            .finish()
    }
}

fn digest(value: &str) -> [u8; 32] {
    Sha256::digest(value.as_bytes()).into()
}

impl StaticCredentialStore {
    /// `password_hash` must already be a bcrypt hash.
    pub fn new(
        username: impl Into<String>,
        password_hash: impl Into<String>,
        api_key: &str,
    ) -> Result<Self, CredentialError> {
        if api_key.is_empty() {
            return Err(CredentialError::EmptyApiKey);
        }

        Ok(Self {
            user: DemoUser {
                username: username.into(),
                password_hash: password_hash.into(),
                roles: vec![ROLE_USER.to_string()],
            },
            api_key_digest: digest(api_key),
        })
    }

    pub fn from_config(config: &SecurityConfig) -> Result<Self, CredentialError> {
        let password_hash = match &config.demo_password {
            DemoPassword::Bcrypt(hash) => hash.clone(),
            DemoPassword::Plain(plain) => bcrypt::hash(plain, config.bcrypt_cost)?,
        };

        Self::new(&config.demo_username, password_hash, &config.api_key)
    }

    /// Exact match against the configured key, compared as SHA-256 digests.
    pub fn api_key_matches(&self, presented: &str) -> bool {
        digest(presented) == self.api_key_digest
    }

    /// Check a basic-auth pair against the demo user.
    ///
    /// A malformed stored hash counts as a mismatch.
    pub fn verify_basic(&self, username: &str, password: &str) -> Option<Principal> {
        if username != self.user.username {
            return None;
        }

        match bcrypt::verify(password, &self.user.password_hash) {
            Ok(true) => Some(Principal::new(&self.user.username, self.user.roles.clone())),
            Ok(false) => None,
            Err(err) => {
                tracing::error!(error = %err, "stored demo password hash is unusable");
                None
            }
        }
    }
}
