/*
 * Responsibility
 * - Read settings from the environment (listen addr, HTTP limits, credentials, JWT keys)
 * - Validate them (missing production secrets fail startup)
 * - Development keeps the demo defaults so the API runs without a .env
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

pub const DEV_API_KEY: &str = "APIKEY1234";
pub const DEV_DEMO_USERNAME: &str = "user";
pub const DEV_DEMO_PASSWORD: &str = "password";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(raw: Option<String>) -> Self {
        match raw
            .unwrap_or_else(|| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Which filter chain guards the API.
///
/// `Contract` only checks the shape of the credential for each verb. It exists
/// for contract-test runs against a stub and is refused in production.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityProfile {
    Strict,
    Contract,
}

/// Requirement applied to requests that match none of the declared rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultPolicy {
    Permit,
    Authenticated,
    Deny,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub body_limit_bytes: usize,
    pub request_timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            body_limit_bytes: 1024 * 1024,
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// How the demo user's password reaches the credential store.
#[derive(Clone)]
pub enum DemoPassword {
    Plain(String),
    Bcrypt(String),
}

impl fmt::Debug for DemoPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain(_) => f.write_str("Plain(..)"),
            Self::Bcrypt(_) => f.write_str("Bcrypt(..)"),
        }
    }
}

/// Key material for bearer-token verification.
#[derive(Clone)]
pub enum JwtKey {
    Ed25519Pem(String),
    RsaPem(String),
    Hs256Secret(String),
}

impl fmt::Debug for JwtKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // never print key material
        match self {
            Self::Ed25519Pem(_) => f.write_str("Ed25519Pem(..)"),
            Self::RsaPem(_) => f.write_str("RsaPem(..)"),
            Self::Hs256Secret(_) => f.write_str("Hs256Secret(..)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub key: JwtKey,
    pub issuer: Option<String>,
    pub audience: Option<String>,
    pub leeway_seconds: u64,
}

#[derive(Clone)]
pub struct SecurityConfig {
    pub profile: SecurityProfile,
    pub default_policy: DefaultPolicy,
    pub api_key_header: String,
    pub api_key: String,
    pub demo_username: String,
    pub demo_password: DemoPassword,
    pub bcrypt_cost: u32,
    /// `None` leaves bearer authentication unconfigured: every bearer token is rejected.
    pub jwt: Option<JwtConfig>,
}

impl fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("profile", &self.profile)
            .field("default_policy", &self.default_policy)
            .field("api_key_header", &self.api_key_header)
            .field("demo_username", &self.demo_username)
            .field("demo_password", &self.demo_password)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("jwt", &self.jwt)
            .finish()
    }
}

impl SecurityConfig {
    /// Development settings: demo credentials, permissive catch-all, HS256 bearer tokens.
    pub fn development(jwt_secret: impl Into<String>) -> Self {
        Self {
            profile: SecurityProfile::Strict,
            default_policy: DefaultPolicy::Permit,
            api_key_header: "X-API-Key".to_string(),
            api_key: DEV_API_KEY.to_string(),
            demo_username: DEV_DEMO_USERNAME.to_string(),
            demo_password: DemoPassword::Plain(DEV_DEMO_PASSWORD.to_string()),
            bcrypt_cost: bcrypt::DEFAULT_COST,
            jwt: Some(JwtConfig {
                key: JwtKey::Hs256Secret(jwt_secret.into()),
                issuer: None,
                audience: None,
                leeway_seconds: 60,
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    pub http: HttpConfig,
    pub security: SecurityConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup (the process env in `from_env`).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let port: u16 = match var("PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 3000,
        };

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::parse(var("APP_ENV"));

        let defaults = HttpConfig::default();
        let http = HttpConfig {
            body_limit_bytes: parse_or(
                var("HTTP_BODY_LIMIT_BYTES"),
                "HTTP_BODY_LIMIT_BYTES",
                defaults.body_limit_bytes,
            )?,
            request_timeout: Duration::from_secs(parse_or(
                var("HTTP_TIMEOUT_SECONDS"),
                "HTTP_TIMEOUT_SECONDS",
                defaults.request_timeout.as_secs(),
            )?),
        };

        let profile = match var("SECURITY_PROFILE")
            .map(|v| v.to_ascii_lowercase())
            .as_deref()
        {
            None | Some("strict") => SecurityProfile::Strict,
            Some("contract") => SecurityProfile::Contract,
            Some(_) => return Err(ConfigError::Invalid("SECURITY_PROFILE")),
        };
        if profile == SecurityProfile::Contract && app_env.is_production() {
            return Err(ConfigError::Invalid("SECURITY_PROFILE"));
        }

        let default_policy = match var("AUTH_DEFAULT_POLICY")
            .map(|v| v.to_ascii_lowercase())
            .as_deref()
        {
            None if app_env.is_production() => DefaultPolicy::Deny,
            None | Some("permit") => DefaultPolicy::Permit,
            Some("authenticated") => DefaultPolicy::Authenticated,
            Some("deny") => DefaultPolicy::Deny,
            Some(_) => return Err(ConfigError::Invalid("AUTH_DEFAULT_POLICY")),
        };

        let api_key_header = var("API_KEY_HEADER").unwrap_or_else(|| "X-API-Key".to_string());
        if axum::http::HeaderName::from_bytes(api_key_header.as_bytes()).is_err() {
            return Err(ConfigError::Invalid("API_KEY_HEADER"));
        }

        let api_key = secret_or_dev_default(var("API_KEY"), app_env, "API_KEY", DEV_API_KEY)?;

        let demo_username =
            var("DEMO_USERNAME").unwrap_or_else(|| DEV_DEMO_USERNAME.to_string());
        if demo_username.contains(':') {
            return Err(ConfigError::Invalid("DEMO_USERNAME"));
        }

        let demo_password = match (var("DEMO_PASSWORD_BCRYPT"), var("DEMO_PASSWORD")) {
            (Some(hash), _) => DemoPassword::Bcrypt(hash),
            (None, Some(plain)) => DemoPassword::Plain(plain),
            (None, None) if app_env.is_production() => {
                return Err(ConfigError::Missing("DEMO_PASSWORD"));
            }
            (None, None) => DemoPassword::Plain(DEV_DEMO_PASSWORD.to_string()),
        };

        let bcrypt_cost: u32 = parse_or(var("BCRYPT_COST"), "BCRYPT_COST", bcrypt::DEFAULT_COST)?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(ConfigError::Invalid("BCRYPT_COST"));
        }

        let jwt_key = if let Some(pem) = var("ACCESS_JWT_PUBLIC_KEY_PEM") {
            Some(JwtKey::Ed25519Pem(pem.replace("\\n", "\n")))
        } else if let Some(pem) = var("ACCESS_JWT_RSA_PUBLIC_KEY_PEM") {
            Some(JwtKey::RsaPem(pem.replace("\\n", "\n")))
        } else {
            var("ACCESS_JWT_HS256_SECRET").map(JwtKey::Hs256Secret)
        };

        let jwt = match jwt_key {
            Some(key) => Some(JwtConfig {
                key,
                issuer: var("AUTH_ISSUER"),
                audience: var("AUTH_AUDIENCE"),
                leeway_seconds: parse_or(
                    var("ACCESS_TOKEN_LEEWAY_SECONDS"),
                    "ACCESS_TOKEN_LEEWAY_SECONDS",
                    60,
                )?,
            }),
            None if app_env.is_production() => {
                return Err(ConfigError::Missing("ACCESS_JWT_PUBLIC_KEY_PEM"));
            }
            None => None,
        };

        Ok(Self {
            addr,
            app_env,
            http,
            security: SecurityConfig {
                profile,
                default_policy,
                api_key_header,
                api_key,
                demo_username,
                demo_password,
                bcrypt_cost,
                jwt,
            },
        })
    }
}

fn parse_or<T: FromStr>(raw: Option<String>, key: &'static str, default: T) -> Result<T, ConfigError> {
    match raw {
        Some(v) => v.parse().map_err(|_| ConfigError::Invalid(key)),
        None => Ok(default),
    }
}

// Hardcoded demo secrets are only acceptable outside production.
fn secret_or_dev_default(
    raw: Option<String>,
    app_env: AppEnv,
    key: &'static str,
    dev_default: &str,
) -> Result<String, ConfigError> {
    match raw {
        Some(v) => Ok(v),
        None if app_env.is_production() => Err(ConfigError::Missing(key)),
        None => Ok(dev_default.to_string()),
    }
}
