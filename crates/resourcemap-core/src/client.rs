// SPDX-License-Identifier: AGPL-3.0
// ResourceMap Core - HTTP client for the ResourceMap API
//
// Every request carries the cached bearer token when one exists.
// Any 401 response invalidates the local session, whichever call caused it.
// Auth endpoints report every rejection as `AppError::Auth`; collection reads
// report 5xx answers as `AppError::Server`.

use crate::session::SessionCache;
use crate::types::{AppError, ClientSettings};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Error body returned by the API
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// How a non-2xx answer is reported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rejection {
    /// Every rejection is an auth failure
    Auth,
    /// 4xx is an auth failure, 5xx is a server failure
    ByStatus,
}

/// Client for the remote ResourceMap API
pub struct ApiClient {
    http_client: Client,
    base_url: String,
    session: Arc<SessionCache>,
}

impl ApiClient {
    pub fn new(settings: &ClientSettings, session: Arc<SessionCache>) -> Result<Self, AppError> {
        settings.validate()?;

        let http_client = Client::builder()
            .timeout(settings.request_timeout())
            .build()
            .map_err(|e| AppError::InvalidConfig(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: settings.api_base_url.trim().trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http_client.request(method, self.url(path));

        match self.session.stored_token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send a request and turn transport failures and non-2xx answers into errors.
    ///
    /// `fallback` is the message used when the server gives no `message` field.
    async fn execute(
        &self,
        builder: RequestBuilder,
        fallback: &str,
        rejection: Rejection,
    ) -> Result<Response, AppError> {
        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                AppError::Network(format!("Request to {} timed out", self.base_url))
            } else if e.is_connect() {
                AppError::Network(format!("Cannot connect to {} - {}", self.base_url, e))
            } else {
                AppError::Network(format!("Request failed: {}", e))
            }
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!("API answered 401, clearing local session");
            self.session.invalidate();
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .ok()
            .and_then(|body| body.message)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| fallback.to_string());

        tracing::debug!("API error {}: {}", status, message);
        if rejection == Rejection::ByStatus && status.is_server_error() {
            return Err(AppError::Server(format!("{} ({})", message, status)));
        }
        Err(AppError::Auth(message))
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, AppError> {
        response
            .json()
            .await
            .map_err(|e| AppError::Serialization(format!("Failed to parse response: {}", e)))
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        fallback: &str,
    ) -> Result<T, AppError> {
        let builder = self.request(Method::GET, path);
        let response = self.execute(builder, fallback, Rejection::Auth).await?;
        Self::decode(response).await
    }

    /// GET a resource collection; 5xx answers are `AppError::Server`
    pub async fn get_collection<T: DeserializeOwned>(
        &self,
        path: &str,
        fallback: &str,
    ) -> Result<Vec<T>, AppError> {
        let builder = self.request(Method::GET, path);
        let response = self.execute(builder, fallback, Rejection::ByStatus).await?;
        Self::decode(response).await
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B, fallback: &str) -> Result<T, AppError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self.request(Method::POST, path).json(body);
        let response = self.execute(builder, fallback, Rejection::Auth).await?;
        Self::decode(response).await
    }

    /// POST a JSON body, ignoring the response body
    pub async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        fallback: &str,
    ) -> Result<(), AppError> {
        let builder = self.request(Method::POST, path).json(body);
        self.execute(builder, fallback, Rejection::Auth)
            .await
            .map(|_| ())
    }

    /// DELETE carrying a JSON body, ignoring the response body
    pub async fn delete<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        fallback: &str,
    ) -> Result<(), AppError> {
        let builder = self.request(Method::DELETE, path).json(body);
        self.execute(builder, fallback, Rejection::Auth)
            .await
            .map(|_| ())
    }

    /// GET returning only the status code; transport failures are still errors
    pub async fn get_status(&self, path: &str) -> Result<StatusCode, AppError> {
        let response = self
            .request(Method::GET, path)
            .send()
            .await
            .map_err(|e| AppError::Network(format!("Request failed: {}", e)))?;

        if response.status() == StatusCode::UNAUTHORIZED {
            self.session.invalidate();
        }
        Ok(response.status())
    }
}
