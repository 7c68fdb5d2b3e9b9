//! GigaChatApiAgent - Direct REST API implementation for GigaChat.
//!
//! Calls the GigaChat REST API without SDK dependency. Access tokens
//! are short-lived and fetched through the OAuth endpoint with the
//! pre-encoded authorization key, then cached until close to expiry.

use crate::{GenerationAgent, GenerationError, GenerationRequest};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

const DEFAULT_GIGACHAT_MODEL: &str = "GigaChat";
const OAUTH_URL: &str = "https://ngw.devices.sberbank.ru:9443/api/v2/oauth";
const CHAT_URL: &str = "https://gigachat.devices.sberbank.ru/api/v1/chat/completions";
const OAUTH_SCOPE: &str = "GIGACHAT_API_PERS";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Refresh the token this long before its reported expiry.
const TOKEN_EXPIRY_MARGIN_MS: i64 = 60_000;

/// Agent implementation that talks to the GigaChat HTTP API.
pub struct GigaChatApiAgent {
    client: Client,
    /// Base64-encoded authorization key, sent as-is in the Basic header
    auth_key: String,
    model: String,
    max_tokens: u32,
    token: RwLock<Option<CachedToken>>,
}

struct CachedToken {
    access_token: String,
    /// Epoch milliseconds, as reported by the OAuth endpoint
    expires_at: i64,
}

impl GigaChatApiAgent {
    /// Creates a new agent with the provided authorization key and model.
    pub fn new(auth_key: impl Into<String>, model: impl Into<String>) -> Self {
        // The GigaChat endpoints present a Russian CA certificate that
        // is absent from standard trust stores.
        let client = Client::builder()
            .danger_accept_invalid_certs(true)
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self {
            client,
            auth_key: auth_key.into(),
            model: model.into(),
            max_tokens: 1024,
            token: RwLock::new(None),
        }
    }

    /// Loads configuration from environment variables.
    ///
    /// `GIGACHAT_CLIENT_SECRET` is required; `GIGACHAT_MODEL_NAME`
    /// defaults to `GigaChat`.
    pub fn try_from_env() -> Result<Self, GenerationError> {
        let auth_key = env::var("GIGACHAT_CLIENT_SECRET").map_err(|_| {
            GenerationError::Auth("GIGACHAT_CLIENT_SECRET not found in environment".into())
        })?;
        let model =
            env::var("GIGACHAT_MODEL_NAME").unwrap_or_else(|_| DEFAULT_GIGACHAT_MODEL.into());
        Ok(Self::new(auth_key, model))
    }

    /// Overrides the model after construction.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the maximum number of tokens to generate.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Returns a valid access token, fetching a fresh one when the
    /// cached token is missing or close to expiry.
    async fn access_token(&self) -> Result<String, GenerationError> {
        let now_ms = chrono::Utc::now().timestamp_millis();
        {
            let token = self.token.read().await;
            if let Some(cached) = token.as_ref() {
                if cached.expires_at - TOKEN_EXPIRY_MARGIN_MS > now_ms {
                    return Ok(cached.access_token.clone());
                }
            }
        }

        debug!("fetching new GigaChat access token");
        let response = self
            .client
            .post(OAUTH_URL)
            .header("Authorization", format!("Basic {}", self.auth_key))
            .header("RqUID", Uuid::new_v4().to_string())
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(format!("scope={OAUTH_SCOPE}"))
            .send()
            .await
            .map_err(auth_or_timeout)?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GenerationError::Auth(format!(
                "token request failed ({status}): {message}"
            )));
        }

        let token_response: TokenResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::Auth(e.to_string()))?;

        let mut token = self.token.write().await;
        *token = Some(CachedToken {
            access_token: token_response.access_token.clone(),
            expires_at: token_response.expires_at,
        });

        Ok(token_response.access_token)
    }

    fn build_request(&self, request: &GenerationRequest) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: request.system_prompt().to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: request.to_prompt(),
                },
            ],
            max_tokens: self.max_tokens,
        }
    }
}

#[async_trait]
impl GenerationAgent for GigaChatApiAgent {
    async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationError> {
        let token = self.access_token().await?;
        let body = self.build_request(&request);

        debug!(kind = request.kind(), model = %self.model, "sending generation request");
        let response = self
            .client
            .post(CHAT_URL)
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await
            .map_err(http_or_timeout)?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            // Token was revoked early; drop the cache so the next call
            // re-authenticates.
            let mut cached = self.token.write().await;
            *cached = None;
            return Err(GenerationError::Api {
                status: status.as_u16(),
                message: "unauthorized".to_string(),
            });
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!(%status, "generation request failed");
            return Err(GenerationError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::Http(e.to_string()))?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(GenerationError::EmptyResponse);
        }
        Ok(content)
    }
}

fn http_or_timeout(err: reqwest::Error) -> GenerationError {
    if err.is_timeout() {
        GenerationError::Timeout
    } else {
        GenerationError::Http(err.to_string())
    }
}

fn auth_or_timeout(err: reqwest::Error) -> GenerationError {
    if err.is_timeout() {
        GenerationError::Timeout
    } else {
        GenerationError::Auth(err.to_string())
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_at: i64,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
}

#[derive(Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessage,
}
