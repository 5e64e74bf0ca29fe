// SPDX-License-Identifier: AGPL-3.0
// ResourceMap Core - In-process stand-in for the ResourceMap API (tests only)

use crate::donations::Donation;
use crate::fixtures;
use crate::requests::AidRequest;
use crate::types::{Role, User};
use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

pub const VALID_EMAIL: &str = "joao@example.org";
pub const VALID_PASSWORD: &str = "segredo123";
const ISSUED_TOKEN: &str = "token-abc123";

pub fn sample_user() -> User {
    User {
        id: 42,
        email: VALID_EMAIL.to_string(),
        name: "João Silva".to_string(),
        phone: None,
        role: Role::Donor,
        is_active: true,
        last_login: None,
        created_at: "2025-06-01T10:00:00Z".to_string(),
        updated_at: None,
        organization_id: None,
    }
}

/// Base URL nothing is listening on
pub fn unreachable_base_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/api", port)
}

#[derive(Default)]
struct MockState {
    requests: AtomicUsize,
    revoked: AtomicBool,
    listings_down: AtomicBool,
    last_authorization: Mutex<Option<String>>,
    donations: Mutex<Vec<Donation>>,
    requests_listing: Mutex<Vec<AidRequest>>,
}

impl MockState {
    fn record(&self, headers: &HeaderMap) {
        self.requests.fetch_add(1, Ordering::SeqCst);
        *self.last_authorization.lock().unwrap() = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
    }

    fn authorized(&self, headers: &HeaderMap) -> bool {
        let expected = format!("Bearer {}", ISSUED_TOKEN);
        !self.revoked.load(Ordering::SeqCst)
            && headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok())
                == Some(expected.as_str())
    }
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

fn unauthorized() -> Response {
    StatusCode::UNAUTHORIZED.into_response()
}

/// Handle to a running mock API
pub struct MockApi {
    base_url: String,
    state: Arc<MockState>,
}

impl MockApi {
    pub async fn start() -> Self {
        let state = Arc::new(MockState {
            donations: Mutex::new(fixtures::donations()),
            requests_listing: Mutex::new(fixtures::aid_requests()),
            ..MockState::default()
        });

        let router = Router::new()
            .route("/api/Auth/login", post(login))
            .route("/api/Auth/register", post(register))
            .route("/api/Auth/me", get(me))
            .route("/api/Auth/change-password", post(change_password))
            .route("/api/Auth/delete-account", delete(delete_account))
            .route("/api/Auth/validate-token", post(validate_token))
            .route("/api/Test/public", get(public))
            .route("/api/Donations", get(list_donations))
            .route("/api/Requests", get(list_requests))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self {
            base_url: format!("http://{}/api", addr),
            state,
        }
    }

    pub fn base_url(&self) -> String {
        self.base_url.clone()
    }

    pub fn token(&self) -> String {
        ISSUED_TOKEN.to_string()
    }

    pub fn request_count(&self) -> usize {
        self.state.requests.load(Ordering::SeqCst)
    }

    pub fn last_authorization(&self) -> Option<String> {
        self.state.last_authorization.lock().unwrap().clone()
    }

    /// Make every previously issued token unauthorized
    pub fn revoke_tokens(&self) {
        self.state.revoked.store(true, Ordering::SeqCst);
    }

    /// Make the listing endpoints answer 500
    pub fn fail_listings(&self) {
        self.state.listings_down.store(true, Ordering::SeqCst);
    }

    pub fn set_donations(&self, donations: Vec<Donation>) {
        *self.state.donations.lock().unwrap() = donations;
    }
}

async fn login(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.record(&headers);
    if body["email"] == VALID_EMAIL && body["password"] == VALID_PASSWORD {
        Json(json!({ "token": ISSUED_TOKEN, "user": sample_user() })).into_response()
    } else {
        error(StatusCode::UNAUTHORIZED, "Email ou senha inválidos")
    }
}

async fn register(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.record(&headers);
    if body["email"] == VALID_EMAIL {
        return error(StatusCode::BAD_REQUEST, "Email já cadastrado");
    }

    let mut user = serde_json::to_value(sample_user()).unwrap();
    for field in ["email", "name", "phone", "role", "organizationId"] {
        if let Some(value) = body.get(field) {
            user[field] = value.clone();
        }
    }
    Json(json!({ "token": ISSUED_TOKEN, "user": user })).into_response()
}

async fn me(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    state.record(&headers);
    if !state.authorized(&headers) {
        return unauthorized();
    }
    Json(sample_user()).into_response()
}

async fn change_password(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.record(&headers);
    if !state.authorized(&headers) {
        return unauthorized();
    }
    if body["currentPassword"] != VALID_PASSWORD {
        return error(StatusCode::BAD_REQUEST, "Senha atual incorreta");
    }
    Json(json!({ "message": "Senha alterada" })).into_response()
}

async fn delete_account(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.record(&headers);
    if !state.authorized(&headers) {
        return unauthorized();
    }
    if body["password"] != VALID_PASSWORD {
        return error(StatusCode::BAD_REQUEST, "Senha incorreta");
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn validate_token(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.record(&headers);
    let is_valid = !state.revoked.load(Ordering::SeqCst) && body["token"] == ISSUED_TOKEN;
    Json(json!({ "isValid": is_valid })).into_response()
}

async fn public(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    state.record(&headers);
    Json(json!({ "message": "ok" })).into_response()
}

async fn list_donations(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    state.record(&headers);
    if !state.authorized(&headers) {
        return unauthorized();
    }
    if state.listings_down.load(Ordering::SeqCst) {
        return error(StatusCode::INTERNAL_SERVER_ERROR, "Serviço indisponível");
    }
    let donations = state.donations.lock().unwrap().clone();
    Json(donations).into_response()
}

async fn list_requests(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    state.record(&headers);
    if !state.authorized(&headers) {
        return unauthorized();
    }
    if state.listings_down.load(Ordering::SeqCst) {
        return error(StatusCode::INTERNAL_SERVER_ERROR, "Serviço indisponível");
    }
    let requests = state.requests_listing.lock().unwrap().clone();
    Json(requests).into_response()
}
