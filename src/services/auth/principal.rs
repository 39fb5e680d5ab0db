/*
 * Responsibility
 * - Types describing "who is calling" once a filter has accepted a credential
 * - Authentication is a tagged variant: consumers match on it instead of probing types
 */
use serde::Serialize;

use crate::services::auth::access_jwt::VerifiedJwt;

pub const ROLE_API_KEY_USER: &str = "API_KEY_USER";
pub const ROLE_USER: &str = "USER";

pub const API_KEY_PRINCIPAL: &str = "api_key_user";
pub const BEARER_PRINCIPAL: &str = "authenticated_user";

/// Authentication mechanism a principal was established with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mechanism {
    ApiKey,
    Basic,
    Bearer,
}

/// The identified caller and the roles (or scopes) granted to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub name: String,
    pub roles: Vec<String>,
}

impl Principal {
    pub fn new(name: impl Into<String>, roles: Vec<String>) -> Self {
        Self {
            name: name.into(),
            roles,
        }
    }

    pub fn api_key_user() -> Self {
        Self::new(API_KEY_PRINCIPAL, vec![ROLE_API_KEY_USER.to_string()])
    }
}

/// Current authentication state of a request.
///
/// `Jwt` is the raw verifier output; the JWT principal filter turns it into
/// `Bearer` so rule evaluation and handlers never see the token shape.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Authentication {
    #[default]
    Unauthenticated,
    ApiKey(Principal),
    Basic(Principal),
    Jwt(VerifiedJwt),
    Bearer(Principal),
}

impl Authentication {
    pub fn is_authenticated(&self) -> bool {
        !matches!(self, Authentication::Unauthenticated)
    }

    pub fn mechanism(&self) -> Option<Mechanism> {
        match self {
            Authentication::Unauthenticated => None,
            Authentication::ApiKey(_) => Some(Mechanism::ApiKey),
            Authentication::Basic(_) => Some(Mechanism::Basic),
            Authentication::Jwt(_) | Authentication::Bearer(_) => Some(Mechanism::Bearer),
        }
    }

    /// The generic principal, once one has been installed.
    pub fn principal(&self) -> Option<&Principal> {
        match self {
            Authentication::ApiKey(p) | Authentication::Basic(p) | Authentication::Bearer(p) => {
                Some(p)
            }
            Authentication::Unauthenticated | Authentication::Jwt(_) => None,
        }
    }

    /// Wrap a principal in the variant for `mechanism`.
    pub fn for_mechanism(mechanism: Mechanism, principal: Principal) -> Self {
        match mechanism {
            Mechanism::ApiKey => Authentication::ApiKey(principal),
            Mechanism::Basic => Authentication::Basic(principal),
            Mechanism::Bearer => Authentication::Bearer(principal),
        }
    }
}
