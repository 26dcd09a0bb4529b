#![allow(dead_code)]

use std::sync::Arc;

use coffee_shop::{
    AppState, AuthGuard, InMemoryRepository, StaticKeySet, create_router,
    repository::RepositoryState,
};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode, jwk::JwkSet};
use serde_json::{Value, json};
use tokio::net::TcpListener;

// --- Identity provider stand-in ---

pub const ISSUER: &str = "https://coffee-shop-test.us.auth0.com/";
pub const AUDIENCE: &str = "drinks";
pub const KID: &str = "test-signing-key";

pub const ALL_PERMISSIONS: &[&str] = &[
    "get:drinks-detail",
    "post:drinks",
    "patch:drinks",
    "delete:drinks",
];

const SIGNING_KEY_PEM: &str = include_str!("../fixtures/signing_key.pem");
/// Key the provider never published; tokens signed with it must not verify.
const FOREIGN_KEY_PEM: &str = include_str!("../fixtures/foreign_key.pem");

/// Base64url modulus of `signing_key.pem`.
const SIGNING_KEY_N: &str = "vI-N8gocYwMdnTd_LTJ8iGX9k9VWQIHODhim9ZjkWOpR5hh3r8wI3VVhVEZuFQK9siggNRnj9pBN3rW0uciVY8nvibkyiETDothQrpzxqjleQlJQOJJTq9Zwjw3LzkDC_Vzuk5B__WyS9sqWCESIaL1-KwfaUaFTMNzfh935SbnjI0cJDlFU3TZHbIjXKfP9NSYpI8OIeNMp7PdHAmw1JUAKBqtIPCKZZtfzBNOox5zgCdOPzshuu8LiXTJMBnRo-6QRn6LD-nxGph9sGVUC6SZHQVkxhw068_Qbn3fnvKnGES6GAiS2LqPHSZb3A1cQHelWP9kf359SID-t7VkoBQ";

pub fn jwks_json() -> Value {
    json!({
        "keys": [{
            "kty": "RSA",
            "use": "sig",
            "alg": "RS256",
            "kid": KID,
            "n": SIGNING_KEY_N,
            "e": "AQAB"
        }]
    })
}

pub fn key_set() -> JwkSet {
    serde_json::from_value(jwks_json()).expect("test JWKS must parse")
}

pub fn guard() -> AuthGuard {
    AuthGuard::new(Arc::new(StaticKeySet::new(key_set())), ISSUER, AUDIENCE)
}

// --- Token minting ---

pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Claims of a valid one-hour token carrying `permissions`.
pub fn claims(permissions: &[&str]) -> Value {
    json!({
        "iss": ISSUER,
        "sub": "auth0|barista",
        "aud": AUDIENCE,
        "iat": now(),
        "exp": now() + 3600,
        "permissions": permissions,
    })
}

pub fn rs256_header(kid: Option<&str>) -> Header {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = kid.map(str::to_string);
    header
}

pub fn sign(claims: &Value) -> String {
    sign_with(&rs256_header(Some(KID)), claims, SIGNING_KEY_PEM)
}

pub fn sign_with_foreign_key(claims: &Value) -> String {
    sign_with(&rs256_header(Some(KID)), claims, FOREIGN_KEY_PEM)
}

pub fn sign_with(header: &Header, claims: &Value, pem: &str) -> String {
    let key = EncodingKey::from_rsa_pem(pem.as_bytes()).expect("test key must parse");
    encode(header, claims, &key).expect("token must encode")
}

/// Valid token carrying `permissions`.
pub fn token(permissions: &[&str]) -> String {
    sign(&claims(permissions))
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

// --- Running server ---

pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }
}

/// Serves the real router on an ephemeral port over the given repository.
pub async fn spawn_app_with(repo: RepositoryState) -> TestApp {
    let state = AppState::new(repo, guard());
    let router = create_router(state);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    TestApp {
        address,
        client: reqwest::Client::new(),
    }
}

/// Serves the router over an empty in-memory table.
pub async fn spawn_app() -> TestApp {
    spawn_app_with(Arc::new(InMemoryRepository::new())).await
}
