use std::fmt;

use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use thiserror::Error;

use crate::config::{JwtConfig, JwtKey};

/// Errors returned by bearer-token verification.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("jwt verification failed: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("invalid verification key: {0}")]
    InvalidKey(String),
}

/// Collaborator that turns a bearer token into a verified token, or refuses it.
///
/// The filter chain depends on this trait only, so tests and alternative
/// identity providers can plug in their own verifier.
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<VerifiedJwt, TokenError>;
}

/// A token whose signature, expiry and (when configured) issuer/audience were checked.
///
/// `sub` is optional: the scopes alone decide what the caller may do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedJwt {
    pub subject: Option<String>,
    pub scopes: Vec<String>,
    pub jti: Option<String>,
}

/// `scp` shows up either as an array or as a space-separated string depending on the issuer.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum ScopeClaim {
    List(Vec<String>),
    Joined(String),
}

impl ScopeClaim {
    fn into_scopes(self) -> Vec<String> {
        match self {
            ScopeClaim::List(list) => list,
            ScopeClaim::Joined(s) => split_scopes(&s),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct AccessTokenClaims {
    #[serde(default)]
    sub: Option<String>,
    #[allow(dead_code)]
    exp: u64,
    #[serde(default)]
    jti: Option<String>,
    #[serde(default)]
    scope: Option<String>,
    #[serde(default)]
    scp: Option<ScopeClaim>,
}

fn split_scopes(raw: &str) -> Vec<String> {
    raw.split_whitespace().map(str::to_string).collect()
}

/// jsonwebtoken-backed verifier (Ed25519, RSA or HS256 keys).
#[derive(Clone)]
pub struct JwtVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl fmt::Debug for JwtVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print key material
        f.debug_struct("JwtVerifier")
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtVerifier {
    pub fn new(config: &JwtConfig) -> Result<Self, TokenError> {
        let (decoding_key, algorithm) = match &config.key {
            JwtKey::Ed25519Pem(pem) => (
                DecodingKey::from_ed_pem(pem.as_bytes())
                    .map_err(|e| TokenError::InvalidKey(format!("ed25519 pem: {}", e)))?,
                Algorithm::EdDSA,
            ),
            JwtKey::RsaPem(pem) => (
                DecodingKey::from_rsa_pem(pem.as_bytes())
                    .map_err(|e| TokenError::InvalidKey(format!("rsa pem: {}", e)))?,
                Algorithm::RS256,
            ),
            JwtKey::Hs256Secret(secret) => {
                (DecodingKey::from_secret(secret.as_bytes()), Algorithm::HS256)
            }
        };

        let mut validation = Validation::new(algorithm);
        validation.leeway = config.leeway_seconds;
        if let Some(issuer) = &config.issuer {
            validation.set_issuer(&[issuer]);
        }
        match &config.audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }

        Ok(Self {
            decoding_key,
            validation,
        })
    }
}

impl TokenVerifier for JwtVerifier {
    fn verify(&self, token: &str) -> Result<VerifiedJwt, TokenError> {
        let data =
            jsonwebtoken::decode::<AccessTokenClaims>(token, &self.decoding_key, &self.validation)?;
        let claims = data.claims;

        let subject = claims.sub.filter(|sub| !sub.trim().is_empty());

        // `scope` wins when both are present
        let scopes = match (claims.scope, claims.scp) {
            (Some(scope), _) => split_scopes(&scope),
            (None, Some(scp)) => scp.into_scopes(),
            (None, None) => Vec::new(),
        };

        Ok(VerifiedJwt {
            subject,
            scopes,
            jti: claims.jti,
        })
    }
}
