//! Callable-function implementation of the notification store.
//!
//! Callable functions take a `POST` with a JSON body `{"data": ...}` and
//! answer `{"result": ...}` on success or `{"error": {"status", "message"}}`
//! with a non-2xx status on failure.

use std::time::Duration;

use async_trait::async_trait;
use innohub_notifications::{NotificationStore, StoreError, StoreRequest, StoreResponse};
use serde::{Deserialize, Serialize};

use crate::config::ClientConfig;
use crate::error::ClientError;

/// Request envelope for a callable function.
#[derive(Serialize)]
struct CallableRequest<'a, T> {
    data: &'a T,
}

/// Success envelope for a callable function.
#[derive(Deserialize)]
struct CallableResult<T> {
    result: Option<T>,
}

/// Error envelope for a callable function.
#[derive(Deserialize)]
struct CallableFailure {
    error: CallableErrorBody,
}

#[derive(Deserialize)]
struct CallableErrorBody {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Status string callable functions use for missing or invalid credentials.
const STATUS_UNAUTHENTICATED: &str = "UNAUTHENTICATED";

/// Notification store backed by the `manageNotifications` callable.
pub struct CallableStore {
    client: reqwest::Client,
    endpoint: String,
    id_token: Option<String>,
}

impl CallableStore {
    /// Build a store from configuration, with its own HTTP client.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            endpoint: config.notifications_endpoint(),
            id_token: config.id_token.clone(),
        })
    }

    /// Build a store reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            id_token: None,
        }
    }

    /// Send `token` as the bearer credential on every call.
    pub fn with_id_token(mut self, token: impl Into<String>) -> Self {
        self.id_token = Some(token.into());
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Invoke the callable with `request` and decode its `result`.
    pub async fn invoke(&self, request: &StoreRequest) -> Result<StoreResponse, ClientError> {
        let mut builder = self
            .client
            .post(&self.endpoint)
            .json(&CallableRequest { data: request });
        if let Some(token) = &self.id_token {
            builder = builder.bearer_auth(token);
        }

        tracing::debug!(action = request.action(), endpoint = %self.endpoint, "Calling notifications function");
        let response = builder.send().await?;
        let response = Self::ensure_success(response).await?;

        let body: CallableResult<StoreResponse> = response.json().await?;
        body.result.ok_or(ClientError::MissingResult)
    }

    // ---- private helpers ----

    /// Map a non-2xx response to [`ClientError::Api`] or
    /// [`ClientError::Unauthenticated`], preferring the callable error
    /// envelope's message over the raw body.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        let parsed = serde_json::from_str::<CallableFailure>(&body).ok();

        let unauthenticated = status == reqwest::StatusCode::UNAUTHORIZED
            || parsed
                .as_ref()
                .and_then(|f| f.error.status.as_deref())
                .is_some_and(|s| s == STATUS_UNAUTHENTICATED);
        let message = parsed.and_then(|f| f.error.message).unwrap_or(body);

        if unauthenticated {
            return Err(ClientError::Unauthenticated(message));
        }
        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl NotificationStore for CallableStore {
    async fn call(&self, request: StoreRequest) -> Result<StoreResponse, StoreError> {
        self.invoke(&request).await.map_err(|e| {
            tracing::debug!(action = request.action(), error = %e, "Notifications function call failed");
            StoreError::from(e)
        })
    }
}
