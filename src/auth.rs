use std::{collections::BTreeSet, sync::Arc};

use async_trait::async_trait;
use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, Validation, decode, decode_header, errors::ErrorKind, jwk::JwkSet,
};
use serde_json::{Map, Value};
use tokio::sync::OnceCell;

use crate::{
    config::AppConfig,
    error::{ApiError, AuthError},
};

/// Claims
///
/// Decoded token payload, keyed by claim name.
pub type Claims = Map<String, Value>;

/// AuthDecision
///
/// Result of a successful authorization. Built at the start of a protected
/// request, stored in the request extensions for the handler and dropped with
/// the response.
#[derive(Debug, Clone)]
pub struct AuthDecision {
    pub claims: Claims,
    pub permissions: BTreeSet<String>,
}

impl AuthDecision {
    /// The `sub` claim, e.g. `auth0|64f...`.
    pub fn subject(&self) -> Option<&str> {
        self.claims.get("sub").and_then(Value::as_str)
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.claims
            .get("exp")
            .and_then(Value::as_i64)
            .and_then(|exp| DateTime::from_timestamp(exp, 0))
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }
}

// --- Signing Key Sources ---

/// KeySource
///
/// Supplies the identity provider's published signing keys.
#[async_trait]
pub trait KeySource: Send + Sync {
    async fn key_set(&self) -> Result<Arc<JwkSet>, AuthError>;
}

/// RemoteKeySet
///
/// Fetches the key set from the provider's well-known endpoint on first use and
/// keeps it for the life of the process. A failed fetch is not cached, so the
/// next request tries again.
pub struct RemoteKeySet {
    client: reqwest::Client,
    url: String,
    cache: OnceCell<Arc<JwkSet>>,
}

impl RemoteKeySet {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            cache: OnceCell::new(),
        }
    }

    async fn fetch(&self) -> Result<Arc<JwkSet>, AuthError> {
        tracing::info!(url = %self.url, "fetching signing key set");
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| {
                tracing::error!(error = ?e, url = %self.url, "signing key set request failed");
                AuthError::invalid_key()
            })?;

        let keys = response.json::<JwkSet>().await.map_err(|e| {
            tracing::error!(error = ?e, url = %self.url, "signing key set is not a valid JWKS");
            AuthError::invalid_key()
        })?;

        Ok(Arc::new(keys))
    }
}

#[async_trait]
impl KeySource for RemoteKeySet {
    async fn key_set(&self) -> Result<Arc<JwkSet>, AuthError> {
        self.cache
            .get_or_try_init(|| self.fetch())
            .await
            .map(Arc::clone)
    }
}

/// StaticKeySet
///
/// Fixed key set, used by tests and offline development.
pub struct StaticKeySet {
    keys: Arc<JwkSet>,
}

impl StaticKeySet {
    pub fn new(keys: JwkSet) -> Self {
        Self {
            keys: Arc::new(keys),
        }
    }
}

#[async_trait]
impl KeySource for StaticKeySet {
    async fn key_set(&self) -> Result<Arc<JwkSet>, AuthError> {
        Ok(Arc::clone(&self.keys))
    }
}

// --- Guard ---

/// AuthGuard
///
/// Verifies bearer tokens against the provider's signing keys and the
/// configured issuer/audience, then checks the `permissions` claim. Shared by
/// every protected route.
#[derive(Clone)]
pub struct AuthGuard {
    keys: Arc<dyn KeySource>,
    issuer: String,
    audience: String,
}

impl AuthGuard {
    pub fn new(
        keys: Arc<dyn KeySource>,
        issuer: impl Into<String>,
        audience: impl Into<String>,
    ) -> Self {
        Self {
            keys,
            issuer: issuer.into(),
            audience: audience.into(),
        }
    }

    /// Guard for the configured tenant, fetching keys from its JWKS endpoint.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            Arc::new(RemoteKeySet::new(config.jwks_url())),
            config.issuer(),
            config.api_audience.clone(),
        )
    }

    /// authorize
    ///
    /// Runs the full check for one request. Each step fails with its own
    /// `AuthError`; nothing touches the database.
    pub async fn authorize(
        &self,
        headers: &HeaderMap,
        required_permission: &str,
    ) -> Result<AuthDecision, AuthError> {
        let token = bearer_token(headers)?;
        let claims = self.verify(token).await?;
        let permissions = permissions(&claims)?;

        if !permissions.contains(required_permission) {
            return Err(AuthError::permission_not_found());
        }

        Ok(AuthDecision {
            claims,
            permissions,
        })
    }

    async fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let kid = decode_header(token)
            .ok()
            .and_then(|header| header.kid)
            .ok_or(AuthError::malformed_token())?;

        let keys = self.keys.key_set().await?;
        let jwk = keys.find(&kid).ok_or(AuthError::invalid_key())?;
        let decoding_key = DecodingKey::from_jwk(jwk).map_err(|e| {
            tracing::warn!(error = ?e, %kid, "published key cannot verify tokens");
            AuthError::invalid_key()
        })?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);

        match decode::<Claims>(token, &decoding_key, &validation) {
            Ok(data) => Ok(data.claims),
            Err(e) => Err(match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::token_expired(),
                ErrorKind::InvalidIssuer
                | ErrorKind::InvalidAudience
                | ErrorKind::InvalidSubject
                | ErrorKind::ImmatureSignature
                | ErrorKind::MissingRequiredClaim(_) => AuthError::invalid_claims(),
                _ => AuthError::invalid_header(),
            }),
        }
    }
}

/// Extracts the token from `Authorization: Bearer <token>`. The header must be
/// exactly two space-separated parts and the scheme is case-sensitive.
fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::missing_header())?
        .to_str()
        .map_err(|_| AuthError::malformed_header())?;

    let mut parts = value.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) if !token.is_empty() => Ok(token),
        _ => Err(AuthError::malformed_header()),
    }
}

/// A `permissions` claim that is absent, or not a list of strings, is rejected.
/// An empty list is accepted here and fails the membership check instead.
fn permissions(claims: &Claims) -> Result<BTreeSet<String>, AuthError> {
    let Some(Value::Array(values)) = claims.get("permissions") else {
        return Err(AuthError::permissions_missing());
    };

    values
        .iter()
        .map(|value| {
            value
                .as_str()
                .map(str::to_owned)
                .ok_or(AuthError::permissions_missing())
        })
        .collect()
}

// --- Middleware ---

/// PermissionGate
///
/// Middleware state pairing the shared guard with the permission one route
/// requires.
#[derive(Clone)]
pub struct PermissionGate {
    pub guard: AuthGuard,
    pub permission: &'static str,
}

impl PermissionGate {
    pub fn new(guard: AuthGuard, permission: &'static str) -> Self {
        Self { guard, permission }
    }
}

/// require_permission
///
/// Layered in front of a protected handler with `from_fn_with_state`. Short
/// circuits with the `AuthError` before the handler runs; on success the
/// `AuthDecision` is available to the handler as `Extension<AuthDecision>`.
pub async fn require_permission(
    State(gate): State<PermissionGate>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let decision = gate
        .guard
        .authorize(request.headers(), gate.permission)
        .await
        .inspect_err(|e| {
            tracing::debug!(
                permission = gate.permission,
                status = e.status.as_u16(),
                reason = e.message,
                "request rejected by auth guard"
            );
        })?;

    request.extensions_mut().insert(decision);
    Ok(next.run(request).await)
}
