// SPDX-License-Identifier: AGPL-3.0
// ResourceMap Core - Session lifecycle
//
// The token and user are persisted under `authToken` and `user`.
// The in-memory session only holds a user once the token has been issued
// or validated during this run.

use crate::client::ApiClient;
use crate::forms::{ChangePasswordForm, RegisterForm};
use crate::storage::{KeyValueStore, AUTH_TOKEN_KEY, USER_KEY};
use crate::types::{
    AppError, AuthResponse, ClientSettings, DeleteAccountRequest, LoginRequest, User,
    ValidateTokenRequest, ValidateTokenResponse,
};
use reqwest::StatusCode;
use std::sync::{Arc, RwLock};

/// An active, validated session
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    pub user: Option<User>,
}

/// Result of the boot-time session check
#[derive(Debug, Clone, PartialEq)]
pub enum SessionStatus {
    Authenticated(Session),
    Unauthenticated,
}

impl SessionStatus {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }
}

/// Persisted token/user cache plus the in-memory active session
pub struct SessionCache {
    storage: Arc<dyn KeyValueStore>,
    active: RwLock<Option<Session>>,
}

impl SessionCache {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            storage,
            active: RwLock::new(None),
        }
    }

    /// Token from durable storage; never fails
    pub fn stored_token(&self) -> Option<String> {
        match self.storage.get(AUTH_TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                tracing::warn!("Failed to read stored token: {}", e);
                None
            }
        }
    }

    /// User from durable storage; never fails
    pub fn stored_user(&self) -> Option<User> {
        let raw = match self.storage.get(USER_KEY) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!("Failed to read stored user: {}", e);
                return None;
            }
        };

        serde_json::from_str(&raw)
            .map_err(|e| tracing::warn!("Failed to decode stored user: {}", e))
            .ok()
    }

    /// Persist a freshly issued token and user, then activate them.
    ///
    /// Either both keys are written or neither is left behind.
    fn store(&self, auth: &AuthResponse) -> Result<(), AppError> {
        let user_json = serde_json::to_string(&auth.user)?;
        self.storage.set(AUTH_TOKEN_KEY, &auth.token)?;

        if let Err(e) = self.storage.set(USER_KEY, &user_json) {
            tracing::error!("Failed to persist user, discarding issued token: {}", e);
            if let Err(e) = self.storage.remove(AUTH_TOKEN_KEY) {
                tracing::warn!("Failed to remove {} from storage: {}", AUTH_TOKEN_KEY, e);
            }
            return Err(e);
        }

        self.activate(auth.token.clone(), Some(auth.user.clone()));
        Ok(())
    }

    fn activate(&self, token: String, user: Option<User>) {
        *self.active.write().unwrap() = Some(Session { token, user });
    }

    /// Replace the cached user of the active session
    fn refresh_user(&self, user: &User) {
        let mut active = self.active.write().unwrap();
        let Some(session) = active.as_mut() else {
            return;
        };
        session.user = Some(user.clone());

        match serde_json::to_string(user) {
            Ok(json) => {
                if let Err(e) = self.storage.set(USER_KEY, &json) {
                    tracing::warn!("Failed to cache user profile: {}", e);
                }
            }
            Err(e) => tracing::warn!("Failed to encode user profile: {}", e),
        }
    }

    /// Drop the session from memory and storage; never fails
    pub fn invalidate(&self) {
        *self.active.write().unwrap() = None;

        for key in [AUTH_TOKEN_KEY, USER_KEY] {
            if let Err(e) = self.storage.remove(key) {
                tracing::warn!("Failed to remove {} from storage: {}", key, e);
            }
        }
    }

    pub fn current(&self) -> Option<Session> {
        self.active.read().unwrap().clone()
    }
}

/// Authentication operations against the API, with local cache synchronization
pub struct SessionManager {
    api: Arc<ApiClient>,
    cache: Arc<SessionCache>,
}

impl SessionManager {
    pub fn new(
        settings: &ClientSettings,
        storage: Arc<dyn KeyValueStore>,
    ) -> Result<Self, AppError> {
        let cache = Arc::new(SessionCache::new(storage));
        let api = Arc::new(ApiClient::new(settings, cache.clone())?);
        Ok(Self { api, cache })
    }

    /// Shared API client, for remote-backed listing sources
    pub fn api(&self) -> Arc<ApiClient> {
        self.api.clone()
    }

    /// The active session, if any
    pub fn session(&self) -> Option<Session> {
        self.cache.current()
    }

    pub fn is_authenticated(&self) -> bool {
        self.cache.current().is_some()
    }

    /// Check the persisted token at boot and activate the session if it is still valid
    pub async fn restore(&self) -> SessionStatus {
        let Some(token) = self.cache.stored_token() else {
            tracing::info!("No stored token, starting unauthenticated");
            return SessionStatus::Unauthenticated;
        };

        match self.check_token(&token).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::info!("Stored token was rejected, clearing session");
                self.cache.invalidate();
                return SessionStatus::Unauthenticated;
            }
            Err(e) => {
                tracing::warn!("Could not validate stored token, keeping it: {}", e);
                return SessionStatus::Unauthenticated;
            }
        }

        self.cache.activate(token, self.cache.stored_user());
        if self.cache.current().is_some_and(|s| s.user.is_none()) {
            self.current_user().await;
        }

        match self.cache.current() {
            Some(session) => {
                tracing::info!("Session restored");
                SessionStatus::Authenticated(session)
            }
            None => SessionStatus::Unauthenticated,
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, AppError> {
        let request = LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };

        let auth: AuthResponse = self
            .api
            .post_json("/Auth/login", &request, "Login failed")
            .await?;

        self.cache.store(&auth)?;
        tracing::info!("Logged in as user {}", auth.user.id);
        Ok(auth)
    }

    /// Validate the form locally, then register; no request is sent if validation fails
    pub async fn register(&self, form: &RegisterForm) -> Result<AuthResponse, AppError> {
        let request = form.validate()?;

        let auth: AuthResponse = self
            .api
            .post_json("/Auth/register", &request, "Registration failed")
            .await?;

        self.cache.store(&auth)?;
        tracing::info!("Registered user {}", auth.user.id);
        Ok(auth)
    }

    /// Clear the local session. The API has no logout endpoint.
    pub async fn logout(&self) {
        self.cache.invalidate();
        tracing::info!("Logged out");
    }

    /// Fetch the authoritative profile; `None` on any failure
    pub async fn current_user(&self) -> Option<User> {
        match self.api.get_json::<User>("/Auth/me", "Failed to load profile").await {
            Ok(user) => {
                self.cache.refresh_user(&user);
                Some(user)
            }
            Err(e) => {
                tracing::warn!("Failed to fetch current user: {}", e);
                None
            }
        }
    }

    /// Remote profile, falling back to the cached one
    pub async fn load_profile(&self) -> Option<User> {
        match self.current_user().await {
            Some(user) => Some(user),
            None => self.stored_user(),
        }
    }

    pub fn stored_user(&self) -> Option<User> {
        self.cache.stored_user()
    }

    pub fn stored_token(&self) -> Option<String> {
        self.cache.stored_token()
    }

    /// Ask the server whether a token is valid; fails closed
    pub async fn validate_token(&self, token: &str) -> bool {
        self.check_token(token).await.unwrap_or_else(|e| {
            tracing::warn!("Token validation failed: {}", e);
            false
        })
    }

    /// Server verdict on a token; `Err` when no verdict was obtained
    async fn check_token(&self, token: &str) -> Result<bool, AppError> {
        let request = ValidateTokenRequest { token };
        let response: ValidateTokenResponse = self
            .api
            .post_json("/Auth/validate-token", &request, "Token validation failed")
            .await?;
        Ok(response.is_valid)
    }

    pub async fn change_password(&self, form: &ChangePasswordForm) -> Result<(), AppError> {
        let request = form.validate()?;
        self.api
            .post("/Auth/change-password", &request, "Failed to change password")
            .await?;
        tracing::info!("Password changed");
        Ok(())
    }

    /// Permanently delete the account and clear all local session state
    pub async fn delete_account(&self, password: &str) -> Result<(), AppError> {
        if password.trim().is_empty() {
            return Err(AppError::Validation(
                "Password is required to delete the account".to_string(),
            ));
        }

        self.api
            .delete(
                "/Auth/delete-account",
                &DeleteAccountRequest { password },
                "Failed to delete account",
            )
            .await?;

        self.cache.invalidate();
        tracing::info!("Account deleted");
        Ok(())
    }

    /// Reachability check against the public endpoint
    pub async fn test_connection(&self) -> bool {
        match self.api.get_status("/Test/public").await {
            Ok(status) => status == StatusCode::OK,
            Err(e) => {
                tracing::warn!("Connectivity check failed: {}", e);
                false
            }
        }
    }
}
