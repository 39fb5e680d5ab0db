pub mod access_jwt;
pub mod credentials;
pub mod factory;
pub mod principal;

pub use access_jwt::{JwtVerifier, TokenError, TokenVerifier, VerifiedJwt};
pub use credentials::{CredentialError, StaticCredentialStore};
pub use factory::{AuthServices, build_auth_services};
pub use principal::{Authentication, Mechanism, Principal};
