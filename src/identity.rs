use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::models::SessionTokens;

// 1. IdentityService Contract
/// IdentityService
///
/// Defines the abstract contract for all interactions with the hosted identity
/// provider. Credential collection, token issuance, and revocation are
/// entirely the provider's responsibility; this application only brokers the
/// calls. The trait allows swapping the real HTTP client (SupabaseAuthClient)
/// for the in-memory Mock (MockIdentityService) during testing without
/// affecting the calling handlers.
#[async_trait]
pub trait IdentityService: Send + Sync {
    /// Registers a new user with the provider and returns the provider-issued
    /// user id, which becomes the primary key of the local profile mirror.
    async fn sign_up(&self, email: &str, password: &str) -> Result<Uuid, String>;

    /// Exchanges credentials for a provider-issued token pair.
    async fn sign_in(&self, email: &str, password: &str) -> Result<SessionTokens, String>;

    /// Revokes the session behind the given access token. Best-effort: the
    /// bearer token is invalid afterwards either way, so failures are logged,
    /// not surfaced.
    async fn sign_out(&self, access_token: &str) -> Result<(), String>;
}

// 2. The Real Implementation (Supabase Auth)
/// SupabaseAuthClient
///
/// The concrete implementation backed by the Supabase Auth REST API. The same
/// client transparently handles:
/// - **Local:** the Supabase CLI development stack.
/// - **Production:** the hosted project endpoint.
#[derive(Clone)]
pub struct SupabaseAuthClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

/// Minimal shape of the provider's signup response; only the canonical user
/// id is consumed.
#[derive(Deserialize)]
struct SignUpResponse {
    id: Uuid,
}

impl SupabaseAuthClient {
    /// new
    ///
    /// Constructs the client from the provider endpoint and anonymous API key
    /// resolved by AppConfig.
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }
}

#[async_trait]
impl IdentityService for SupabaseAuthClient {
    /// sign_up
    ///
    /// Calls the provider's signup endpoint. The password travels straight
    /// through to the provider and is never persisted or logged locally.
    async fn sign_up(&self, email: &str, password: &str) -> Result<Uuid, String> {
        let url = format!("{}/auth/v1/signup", self.base_url);

        let response = self
            .http
            .post(url)
            .header("apikey", &self.api_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if !response.status().is_success() {
            // Provider rejections (duplicate email, weak password, etc.).
            return Err(format!("identity provider rejected signup: {}", response.status()));
        }

        let body = response
            .json::<SignUpResponse>()
            .await
            .map_err(|e| e.to_string())?;

        Ok(body.id)
    }

    /// sign_in
    ///
    /// Performs the password grant against the provider's token endpoint and
    /// returns the issued token pair verbatim.
    async fn sign_in(&self, email: &str, password: &str) -> Result<SessionTokens, String> {
        let url = format!("{}/auth/v1/token?grant_type=password", self.base_url);

        let response = self
            .http
            .post(url)
            .header("apikey", &self.api_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if !response.status().is_success() {
            return Err(format!("identity provider rejected sign-in: {}", response.status()));
        }

        response
            .json::<SessionTokens>()
            .await
            .map_err(|e| e.to_string())
    }

    /// sign_out
    ///
    /// Asks the provider to revoke the session behind the access token.
    async fn sign_out(&self, access_token: &str) -> Result<(), String> {
        let url = format!("{}/auth/v1/logout", self.base_url);

        let response = self
            .http
            .post(url)
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if !response.status().is_success() {
            return Err(format!("identity provider rejected sign-out: {}", response.status()));
        }

        Ok(())
    }
}

// 3. The Mock Implementation (For Unit Tests)
/// MockIdentityService
///
/// A mock implementation of `IdentityService` used exclusively for unit and
/// integration testing. Lets handler tests exercise the registration and
/// sign-in flows without a network connection to the provider.
#[derive(Clone)]
pub struct MockIdentityService {
    /// When true, all operations return a simulated failure.
    pub should_fail: bool,
    /// The user id handed back from sign_up, so tests can assert the profile
    /// mirror was created with the provider-issued id.
    pub issued_user_id: Uuid,
}

impl MockIdentityService {
    pub fn new() -> Self {
        Self {
            should_fail: false,
            issued_user_id: Uuid::nil(),
        }
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            issued_user_id: Uuid::nil(),
        }
    }
}

impl Default for MockIdentityService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityService for MockIdentityService {
    async fn sign_up(&self, _email: &str, _password: &str) -> Result<Uuid, String> {
        if self.should_fail {
            return Err("Mock Identity Error: Simulation requested".to_string());
        }
        Ok(self.issued_user_id)
    }

    async fn sign_in(&self, email: &str, _password: &str) -> Result<SessionTokens, String> {
        if self.should_fail {
            return Err("Mock Identity Error: Simulation requested".to_string());
        }
        // Deterministic token material for mock assertions.
        Ok(SessionTokens {
            access_token: format!("mock-access-token-{}", email),
            refresh_token: "mock-refresh-token".to_string(),
            expires_in: 3600,
        })
    }

    async fn sign_out(&self, _access_token: &str) -> Result<(), String> {
        if self.should_fail {
            return Err("Mock Identity Error: Simulation requested".to_string());
        }
        Ok(())
    }
}

/// IdentityState
///
/// The concrete type used to share the identity service access across the
/// application state.
pub type IdentityState = Arc<dyn IdentityService>;
