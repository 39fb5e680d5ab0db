//! Filter chain assembly.
//!
//! The chain is an explicit, ordered list of stages built once at startup and
//! shared (read-only) by every request. Each request gets a fresh `AuthContext`
//! that the stages fill in order; the authorization policy then decides.
//!
//! Stage contracts:
//! - `ApiKey`: pre: nothing has run. post: `ApiKey` principal on a valid DELETE key.
//! - `HttpBasic`: post: `Basic` principal on valid demo credentials, if still unauthenticated.
//! - `BearerToken`: post: raw `Jwt` on a verified token; a bad token ends the request.
//!   Needs `JwtPrincipal` later in the chain, so rules never see a raw `Jwt`.
//! - `JwtPrincipal`: pre: `BearerToken` already ran. post: no `Jwt` left in the context.
//! - `ContractShape`: runs alone; shape-only checks for contract-test runs.

use std::sync::Arc;

use axum::http::{HeaderName, request::Parts};
use thiserror::Error;

use crate::config::{SecurityConfig, SecurityProfile};
use crate::error::{AppError, AuthError, Challenge};
use crate::middleware::auth::{
    api_key, basic, bearer, contract,
    context::AuthContext,
    jwt,
    rules::{AuthorizationPolicy, Verdict},
};
use crate::services::auth::AuthServices;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    ApiKey,
    HttpBasic,
    BearerToken,
    JwtPrincipal,
    ContractShape,
}

impl Stage {
    /// Order used by the strict profile.
    pub const STANDARD: [Stage; 4] = [
        Stage::ApiKey,
        Stage::HttpBasic,
        Stage::BearerToken,
        Stage::JwtPrincipal,
    ];
}

/// A request refused by a stage (`stage = Some`) or by rule evaluation (`None`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub stage: Option<Stage>,
    pub reason: AuthError,
    pub challenge: Option<Challenge>,
    pub message: &'static str,
}

impl From<Rejection> for AppError {
    fn from(r: Rejection) -> Self {
        AppError::Unauthorized {
            reason: r.reason,
            challenge: r.challenge,
            message: r.message,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChainError {
    #[error("filter chain has no stages")]
    Empty,
    #[error("stage {0:?} appears more than once")]
    Duplicate(Stage),
    #[error("stage {first:?} must run before {then:?}")]
    OutOfOrder { first: Stage, then: Stage },
    #[error("stage {0:?} cannot run without {1:?}")]
    MissingPrerequisite(Stage, Stage),
    #[error("stage {0:?} cannot be combined with other stages")]
    Exclusive(Stage),
}

fn validate(stages: &[Stage]) -> Result<(), ChainError> {
    if stages.is_empty() {
        return Err(ChainError::Empty);
    }

    for (i, stage) in stages.iter().enumerate() {
        if stages[..i].contains(stage) {
            return Err(ChainError::Duplicate(*stage));
        }
    }

    if stages.contains(&Stage::ContractShape) && stages.len() > 1 {
        return Err(ChainError::Exclusive(Stage::ContractShape));
    }

    let position = |stage: Stage| stages.iter().position(|s| *s == stage);

    if let (Some(api_key), Some(bearer)) = (position(Stage::ApiKey), position(Stage::BearerToken)) {
        if api_key > bearer {
            return Err(ChainError::OutOfOrder {
                first: Stage::ApiKey,
                then: Stage::BearerToken,
            });
        }
    }

    if let Some(jwt) = position(Stage::JwtPrincipal) {
        match position(Stage::BearerToken) {
            None => {
                return Err(ChainError::MissingPrerequisite(
                    Stage::JwtPrincipal,
                    Stage::BearerToken,
                ));
            }
            Some(bearer) if bearer > jwt => {
                return Err(ChainError::OutOfOrder {
                    first: Stage::BearerToken,
                    then: Stage::JwtPrincipal,
                });
            }
            Some(_) => {}
        }
    } else if stages.contains(&Stage::BearerToken) {
        return Err(ChainError::MissingPrerequisite(
            Stage::BearerToken,
            Stage::JwtPrincipal,
        ));
    }

    Ok(())
}

#[derive(Debug)]
pub struct SecurityChain {
    stages: Vec<Stage>,
    services: AuthServices,
    api_key_header: HeaderName,
    policy: AuthorizationPolicy,
}

impl SecurityChain {
    pub fn new(
        stages: Vec<Stage>,
        services: AuthServices,
        api_key_header: HeaderName,
        policy: AuthorizationPolicy,
    ) -> Result<Self, ChainError> {
        validate(&stages)?;
        Ok(Self {
            stages,
            services,
            api_key_header,
            policy,
        })
    }

    /// Chain for the configured profile, with the store API rules.
    ///
    /// `api_key_header` is validated by `Config`, so a bad value here is a caller bug
    /// and reported as `AppError::Internal`.
    pub fn from_config(config: &SecurityConfig, services: AuthServices) -> Result<Arc<Self>, AppError> {
        let api_key_header = HeaderName::from_bytes(config.api_key_header.as_bytes())
            .map_err(|_| AppError::Internal)?;

        let stages = match config.profile {
            SecurityProfile::Strict => Stage::STANDARD.to_vec(),
            SecurityProfile::Contract => vec![Stage::ContractShape],
        };

        let chain = Self::new(
            stages,
            services,
            api_key_header,
            AuthorizationPolicy::store_api(config.default_policy),
        )
        .map_err(|e| {
            tracing::error!(error = %e, "invalid filter chain");
            AppError::Internal
        })?;

        Ok(Arc::new(chain))
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    fn run_stage(&self, stage: Stage, parts: &Parts, ctx: &mut AuthContext) -> Result<(), Rejection> {
        match stage {
            Stage::ApiKey => {
                api_key::filter(&self.api_key_header, &self.services.credentials, parts, ctx);
                Ok(())
            }
            Stage::HttpBasic => {
                basic::filter(&self.services.credentials, parts, ctx);
                Ok(())
            }
            Stage::BearerToken => bearer::filter(self.services.verifier.as_deref(), parts, ctx),
            Stage::JwtPrincipal => {
                jwt::filter(parts, ctx);
                Ok(())
            }
            Stage::ContractShape => contract::filter(&self.api_key_header, parts, ctx),
        }
    }

    /// Run every stage on a fresh context, then the authorization rules.
    ///
    /// A stage rejection stops the chain; later stages never see the request.
    pub fn authenticate(&self, parts: &Parts) -> Result<AuthContext, Rejection> {
        let mut ctx = AuthContext::new();

        for stage in &self.stages {
            self.run_stage(*stage, parts, &mut ctx)?;
        }

        match self.policy.evaluate(&parts.method, parts.uri.path(), &ctx) {
            Verdict::Allow => Ok(ctx),
            Verdict::Reject { reason, challenge } => Err(Rejection {
                stage: None,
                reason,
                challenge,
                message: "Unauthorized",
            }),
        }
    }
}
