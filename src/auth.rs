// src/auth.rs
//! Bearer-token authentication and the `Actor` passed into every service call
//! that needs to know who is acting.

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rocket::http::Status;
use rocket::request::{FromRequest, Outcome};
use rocket::{Request, State};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{HrError, HrResult};
use crate::models::Role;

const HR_ROLES: &[Role] = &[Role::Admin, Role::HrManager];
const MATCHING_ROLES: &[Role] = &[Role::Admin, Role::HrManager, Role::Recruiter];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub name: Option<String>,
    #[serde(default)]
    pub roles: Vec<Role>,
    pub person_id: Option<i64>,
    pub exp: usize,
}

pub struct AuthConfig {
    secret: String,
}

impl AuthConfig {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Sign a token valid for `ttl`
    pub fn issue_token(
        &self,
        subject: &str,
        name: Option<&str>,
        roles: &[Role],
        person_id: Option<i64>,
        ttl: Duration,
    ) -> Result<String> {
        let claims = Claims {
            sub: subject.to_string(),
            name: name.map(str::to_string),
            roles: roles.to_vec(),
            person_id,
            exp: (Utc::now() + ttl).timestamp().max(0) as usize,
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .context("Failed to sign token")
    }

    pub fn verify(&self, token: &str) -> Result<Actor> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )?;
        Ok(data.claims.into())
    }
}

// ===== Actor =====

/// Who is performing an operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Actor {
    pub user_id: String,
    pub name: Option<String>,
    pub person_id: Option<i64>,
    pub roles: Vec<Role>,
}

impl From<Claims> for Actor {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            name: claims.name,
            person_id: claims.person_id,
            roles: claims.roles,
        }
    }
}

impl Actor {
    pub fn new(user_id: impl Into<String>, roles: Vec<Role>, person_id: Option<i64>) -> Self {
        Self {
            user_id: user_id.into(),
            name: None,
            person_id,
            roles,
        }
    }

    /// The administrative CLI acts as this.
    pub fn system() -> Self {
        Self::new("system", vec![Role::Admin], None)
    }

    pub fn has_any(&self, roles: &[Role]) -> bool {
        self.roles.iter().any(|role| roles.contains(role))
    }

    pub fn require_any(&self, roles: &[Role], action: &str) -> HrResult<()> {
        if self.has_any(roles) {
            Ok(())
        } else {
            Err(HrError::Forbidden(format!(
                "{} is not allowed to {}",
                self.user_id, action
            )))
        }
    }

    pub fn is_hr(&self) -> bool {
        self.has_any(HR_ROLES)
    }

    /// Persons, skills, organization, job definitions, leave types and balances
    pub fn require_hr(&self) -> HrResult<()> {
        self.require_any(HR_ROLES, "manage HR records")
    }

    pub fn require_matching(&self) -> HrResult<()> {
        self.require_any(MATCHING_ROLES, "run or review matching")
    }

    /// HR may act for anyone; everyone else only for their own person record.
    pub fn can_act_for(&self, person_id: i64) -> bool {
        self.is_hr() || self.person_id == Some(person_id)
    }

    pub fn require_self_or_hr(&self, person_id: i64, action: &str) -> HrResult<()> {
        if self.can_act_for(person_id) {
            Ok(())
        } else {
            Err(HrError::Forbidden(format!(
                "{} may only {} for their own record",
                self.user_id, action
            )))
        }
    }
}

// ===== Request guards =====

pub struct AuthenticatedUser {
    pub actor: Actor,
}

#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    TokenVerificationFailed,
    NotConfigured,
}

impl AuthError {
    pub fn message(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "Authorization token required",
            AuthError::InvalidToken => "Invalid authorization token format",
            AuthError::TokenVerificationFailed => "Token verification failed",
            AuthError::NotConfigured => "Authentication is not configured",
        }
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthenticatedUser {
    type Error = AuthError;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let auth_config = match req.guard::<&State<AuthConfig>>().await {
            Outcome::Success(config) => config,
            Outcome::Error((status, _)) => return Outcome::Error((status, AuthError::NotConfigured)),
            Outcome::Forward(f) => return Outcome::Forward(f),
        };

        let token = match req.headers().get_one("Authorization") {
            Some(header) => match header.strip_prefix("Bearer ") {
                Some(token) if !token.trim().is_empty() => token.trim(),
                _ => {
                    warn!("Invalid Authorization header format");
                    return Outcome::Error((Status::Unauthorized, AuthError::InvalidToken));
                }
            },
            None => {
                debug!("Missing Authorization header");
                return Outcome::Error((Status::Unauthorized, AuthError::MissingToken));
            }
        };

        match auth_config.verify(token) {
            Ok(actor) => {
                debug!("Authenticated {} with roles {:?}", actor.user_id, actor.roles);
                Outcome::Success(AuthenticatedUser { actor })
            }
            Err(e) => {
                warn!("Token verification failed: {}", e);
                Outcome::Error((Status::Unauthorized, AuthError::TokenVerificationFailed))
            }
        }
    }
}

/// Guard that never fails; `user` is `None` without a valid token.
pub struct OptionalAuth {
    pub user: Option<AuthenticatedUser>,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for OptionalAuth {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        match AuthenticatedUser::from_request(req).await {
            Outcome::Success(auth) => Outcome::Success(OptionalAuth { user: Some(auth) }),
            _ => Outcome::Success(OptionalAuth { user: None }),
        }
    }
}
