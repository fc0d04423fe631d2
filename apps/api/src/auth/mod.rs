//! Authentication and route permissions.
//!
//! Bearer tokens are issued by the hosted auth service; we never mint or decode
//! them locally. `BaasAuthenticator` asks the service who the token belongs to,
//! then joins that identity onto the caller's `profiles` row.
//!
//! `AppState` holds an `Arc<dyn Authenticator>` so tests can swap in a fixed user.

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::profile::ProfileRow;
use crate::state::AppState;
use crate::subscription::tiers::Tier;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "admin" => Role::Admin,
            _ => Role::User,
        }
    }
}

/// The authenticated caller, resolved once per request.
#[derive(Debug, Clone, Serialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub tier: Tier,
    pub role: Role,
}

impl AuthUser {
    fn from_profile(profile: ProfileRow) -> Self {
        let tier = Tier::parse(&profile.tier).unwrap_or_else(|| {
            warn!(
                "Profile {} has unknown tier '{}', treating as free",
                profile.id, profile.tier
            );
            Tier::Free
        });
        Self {
            id: profile.id,
            email: profile.email,
            tier,
            role: Role::parse(&profile.role),
        }
    }
}

/// Resolves a bearer token into an `AuthUser`.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, token: &str) -> Result<AuthUser, AppError>;
}

#[derive(Debug, Deserialize)]
struct BaasUser {
    id: Uuid,
    email: Option<String>,
}

/// Verifies tokens against `{BAAS_URL}/auth/v1/user` and loads the profile row.
pub struct BaasAuthenticator {
    client: Client,
    base_url: String,
    anon_key: String,
    db: PgPool,
}

impl BaasAuthenticator {
    pub fn new(base_url: &str, anon_key: &str, db: PgPool) -> anyhow::Result<Self> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(10))
                .build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            db,
        })
    }

    async fn fetch_identity(&self, token: &str) -> Result<BaasUser, AppError> {
        let response = self
            .client
            .get(format!("{}/auth/v1/user", self.base_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("auth service unreachable: {e}")))?;

        if !response.status().is_success() {
            return Err(AppError::Unauthorized);
        }

        response
            .json::<BaasUser>()
            .await
            .map_err(|_| AppError::Unauthorized)
    }
}

#[async_trait]
impl Authenticator for BaasAuthenticator {
    async fn authenticate(&self, token: &str) -> Result<AuthUser, AppError> {
        let identity = self.fetch_identity(token).await?;
        let profile = load_or_create_profile(
            &self.db,
            identity.id,
            identity.email.as_deref().unwrap_or_default(),
        )
        .await?;
        Ok(AuthUser::from_profile(profile))
    }
}

/// First request from a new account creates its profile on the free tier.
pub async fn load_or_create_profile(
    pool: &PgPool,
    user_id: Uuid,
    email: &str,
) -> Result<ProfileRow, AppError> {
    let existing = sqlx::query_as::<_, ProfileRow>("SELECT * FROM profiles WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    if let Some(profile) = existing {
        return Ok(profile);
    }

    let profile = sqlx::query_as::<_, ProfileRow>(
        r#"
        INSERT INTO profiles (id, email, tier, role)
        VALUES ($1, $2, 'free', 'user')
        ON CONFLICT (id) DO UPDATE SET email = profiles.email
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(email)
    .fetch_one(pool)
    .await?;
    info!("Created profile for user {user_id}");
    Ok(profile)
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let token = bearer_token(parts).ok_or(AppError::Unauthorized)?;
        state.auth.authenticate(token).await
    }
}

/// An `AuthUser` whose profile carries `role = admin`.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthUser);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != Role::Admin {
            warn!("Non-admin user {} attempted an admin route", user.id);
            return Err(AppError::Forbidden);
        }
        Ok(AdminUser(user))
    }
}
