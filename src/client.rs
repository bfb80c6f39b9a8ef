use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, RequestBuilder, Response};

use crate::config::DeploymentConfig;
use crate::error::{Error, Result};
use crate::observability::{CLIENT_REQUESTS, CLIENT_REQUEST_DURATION, CLIENT_REQUEST_ERRORS};
use crate::types::{BotNameResponse, ChatReply, DispatchRequest, DispatchResponse};

const CHAT_PATH: &str = "chat";
const BOT_NAME_PATH: &str = "botname";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Builds the headers for every request to the agent service.
///
/// Development gets a bare JSON content type; production adds the bearer
/// credential from the deployment configuration.
pub fn build_headers(config: &DeploymentConfig) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    if config.mode.is_production() {
        let token = config.auth_token.as_deref().ok_or_else(|| {
            Error::configuration("an auth token is required in production", None)
        })?;
        let mut value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
            Error::validation(
                "auth token contains characters not allowed in a header",
                Some("authorization".to_string()),
            )
        })?;
        value.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, value);
    }
    Ok(headers)
}

/// The network seam between the controller and the agent service.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Sends one user turn and returns the agent's reply.
    async fn chat(&self, request: &DispatchRequest) -> Result<ChatReply>;

    /// Fetches the agent's display name.
    async fn bot_name(&self) -> Result<BotNameResponse>;
}

/// Client for the agent service.
#[derive(Debug, Clone)]
pub struct AgentClient {
    client: ReqwestClient,
    config: DeploymentConfig,
    headers: HeaderMap,
    timeout: Duration,
}

impl AgentClient {
    /// Create a new client for the given deployment.
    pub fn new(config: DeploymentConfig) -> Result<Self> {
        Self::with_options(config, None)
    }

    /// Create a new client with a custom request timeout.
    pub fn with_options(config: DeploymentConfig, timeout: Option<Duration>) -> Result<Self> {
        let headers = build_headers(&config)?;
        let timeout = timeout.unwrap_or(DEFAULT_TIMEOUT);
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                Error::http_client(
                    format!("Failed to build HTTP client: {}", e),
                    Some(Box::new(e)),
                )
            })?;

        Ok(Self {
            client,
            config,
            headers,
            timeout,
        })
    }

    /// The deployment this client talks to.
    pub fn config(&self) -> &DeploymentConfig {
        &self.config
    }

    /// Process API response errors and convert to our Error type
    async fn process_error_response(response: Response) -> Error {
        let status = response.status();
        let status_code = status.as_u16();

        let error_body = match response.text().await {
            Ok(body) if !body.trim().is_empty() => body,
            Ok(_) => status
                .canonical_reason()
                .unwrap_or("no response body")
                .to_string(),
            Err(e) => {
                return Error::http_client(
                    format!("Failed to read error response: {}", e),
                    Some(Box::new(e)),
                );
            }
        };

        match status_code {
            401 | 403 => Error::authentication(error_body),
            404 => Error::not_found(error_body),
            408 => Error::timeout(error_body, None),
            500..=599 => Error::service_unavailable(error_body, status_code),
            _ => Error::api(status_code, error_body),
        }
    }

    /// Sends the request and maps transport failures and non-2xx statuses.
    async fn execute(&self, request: RequestBuilder) -> Result<Response> {
        CLIENT_REQUESTS.click();
        let start = Instant::now();
        let result = self.execute_inner(request).await;
        CLIENT_REQUEST_DURATION.add(start.elapsed().as_secs_f64());
        if result.is_err() {
            CLIENT_REQUEST_ERRORS.click();
        }
        result
    }

    async fn execute_inner(&self, request: RequestBuilder) -> Result<Response> {
        let response = request
            .headers(self.headers.clone())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::timeout(
                        format!("Request timed out: {}", e),
                        Some(self.timeout.as_secs_f64()),
                    )
                } else if e.is_connect() {
                    Error::connection(format!("Connection error: {}", e), Some(Box::new(e)))
                } else {
                    Error::http_client(format!("Request failed: {}", e), Some(Box::new(e)))
                }
            })?;

        if !response.status().is_success() {
            return Err(Self::process_error_response(response).await);
        }
        Ok(response)
    }

    /// Parses the whole body at once; a malformed body is a serialization error.
    async fn parse<T: serde::de::DeserializeOwned>(response: Response) -> Result<T> {
        let body = response.bytes().await.map_err(|e| {
            Error::http_client(
                format!("Failed to read response: {}", e),
                Some(Box::new(e)),
            )
        })?;
        serde_json::from_slice(&body).map_err(|e| {
            Error::serialization(
                format!("Failed to parse response: {}", e),
                Some(Box::new(e)),
            )
        })
    }
}

#[async_trait]
impl ChatTransport for AgentClient {
    async fn chat(&self, request: &DispatchRequest) -> Result<ChatReply> {
        // Incremental replies are reserved; nothing is sent for them.
        if request.stream {
            return Ok(ChatReply::Streaming);
        }
        let url = self.config.endpoint(CHAT_PATH)?;
        let response = self.execute(self.client.post(url).json(request)).await?;
        let reply: DispatchResponse = Self::parse(response).await?;
        Ok(ChatReply::Complete(reply))
    }

    async fn bot_name(&self) -> Result<BotNameResponse> {
        let url = self.config.endpoint(BOT_NAME_PATH)?;
        let response = self.execute(self.client.get(url)).await?;
        Self::parse(response).await
    }
}
