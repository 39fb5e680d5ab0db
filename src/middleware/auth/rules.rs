//! Authorization rules: `(method, path pattern) -> requirement`, evaluated in
//! declaration order, first match wins.
//!
//! A policy always ends with a catch-all fallback, so every request matches
//! exactly one rule.

use std::fmt;

use axum::http::Method;

use crate::config::DefaultPolicy;
use crate::error::{AuthError, Challenge};
use crate::middleware::auth::context::AuthContext;
use crate::services::auth::Mechanism;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    /// `*`: exactly one segment
    One,
    /// `**`: zero or more segments
    Any,
}

/// Ant-style path pattern (`/products/**`, `/orders/*/items`).
#[derive(Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl fmt::Debug for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.raw)
    }
}

impl PathPattern {
    pub fn new(raw: &str) -> Self {
        let segments = split_path(raw)
            .map(|s| match s {
                "**" => Segment::Any,
                "*" => Segment::One,
                lit => Segment::Literal(lit.to_string()),
            })
            .collect();

        Self {
            raw: raw.to_string(),
            segments,
        }
    }

    pub fn matches(&self, path: &str) -> bool {
        let parts: Vec<&str> = split_path(path).collect();
        match_segments(&self.segments, &parts)
    }
}

fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

fn match_segments(pattern: &[Segment], path: &[&str]) -> bool {
    match pattern.split_first() {
        None => path.is_empty(),
        Some((Segment::Any, rest)) => (0..=path.len()).any(|skip| match_segments(rest, &path[skip..])),
        Some((Segment::One, rest)) => !path.is_empty() && match_segments(rest, &path[1..]),
        Some((Segment::Literal(lit), rest)) => {
            path.first() == Some(&lit.as_str()) && match_segments(rest, &path[1..])
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    PermitAll,
    /// Any authenticated principal when `None`, otherwise one established via that mechanism.
    Authenticated(Option<Mechanism>),
    DenyAll,
}

impl From<DefaultPolicy> for Requirement {
    fn from(policy: DefaultPolicy) -> Self {
        match policy {
            DefaultPolicy::Permit => Requirement::PermitAll,
            DefaultPolicy::Authenticated => Requirement::Authenticated(None),
            DefaultPolicy::Deny => Requirement::DenyAll,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationRule {
    /// `None` matches every method.
    pub method: Option<Method>,
    pub pattern: PathPattern,
    pub requirement: Requirement,
}

impl AuthorizationRule {
    pub fn matches(&self, method: &Method, path: &str) -> bool {
        self.method.as_ref().is_none_or(|m| m == method) && self.pattern.matches(path)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Allow,
    Reject {
        reason: AuthError,
        challenge: Option<Challenge>,
    },
}

#[derive(Debug, Clone)]
pub struct AuthorizationPolicy {
    rules: Vec<AuthorizationRule>,
    fallback: Requirement,
}

impl AuthorizationPolicy {
    pub fn new(fallback: Requirement) -> Self {
        Self {
            rules: Vec::new(),
            fallback,
        }
    }

    pub fn rule(mut self, method: Option<Method>, pattern: &str, requirement: Requirement) -> Self {
        self.rules.push(AuthorizationRule {
            method,
            pattern: PathPattern::new(pattern),
            requirement,
        });
        self
    }

    /// The store API rules: verb decides the mechanism on `/products/**` and `/orders/**`.
    pub fn store_api(default: DefaultPolicy) -> Self {
        let bearer = Requirement::Authenticated(Some(Mechanism::Bearer));
        let basic = Requirement::Authenticated(Some(Mechanism::Basic));
        let api_key = Requirement::Authenticated(Some(Mechanism::ApiKey));

        Self::new(default.into())
            .rule(None, "/health", Requirement::PermitAll)
            .rule(Some(Method::POST), "/products/**", bearer)
            .rule(Some(Method::POST), "/orders/**", bearer)
            .rule(Some(Method::GET), "/products/**", basic)
            .rule(Some(Method::GET), "/orders/**", basic)
            .rule(Some(Method::DELETE), "/products/**", api_key)
            .rule(Some(Method::DELETE), "/orders/**", api_key)
    }

    /// Requirement of the first matching rule, or the fallback.
    pub fn requirement_for(&self, method: &Method, path: &str) -> Requirement {
        self.rules
            .iter()
            .find(|rule| rule.matches(method, path))
            .map(|rule| rule.requirement)
            .unwrap_or(self.fallback)
    }

    pub fn evaluate(&self, method: &Method, path: &str, ctx: &AuthContext) -> Verdict {
        let requirement = self.requirement_for(method, path);
        let authentication = ctx.authentication();

        match requirement {
            Requirement::PermitAll => Verdict::Allow,
            Requirement::DenyAll => Verdict::Reject {
                reason: AuthError::AuthorizationDenied,
                challenge: None,
            },
            Requirement::Authenticated(via) => {
                let challenge = match via {
                    Some(Mechanism::Basic) => Some(Challenge::Basic),
                    Some(Mechanism::Bearer) => Some(Challenge::Bearer),
                    Some(Mechanism::ApiKey) | None => None,
                };

                if !authentication.is_authenticated() {
                    let reason = match ctx.failed_attempt() {
                        Some(_) => AuthError::AuthenticationInvalid,
                        None => AuthError::AuthenticationMissing,
                    };
                    return Verdict::Reject { reason, challenge };
                }

                match via {
                    Some(required) if authentication.mechanism() != Some(required) => {
                        Verdict::Reject {
                            reason: AuthError::AuthorizationDenied,
                            challenge,
                        }
                    }
                    _ => Verdict::Allow,
                }
            }
        }
    }
}
