//! Post-game commentary
//!
//! Asks Gemini for a one-line remark about the final score. Every failure
//! path ends in a static string; the caller always gets something to show.

pub mod gemini;

#[cfg(target_arch = "wasm32")]
pub mod fetch;

use std::fmt;

use gemini::{GenerateContentRequest, GenerateContentResponse, GenerationConfig};

/// Shown when no API key is configured. No request is made.
pub const MISSING_SETUP_FALLBACK: &str = "Gemini isn't set up, so you'll have to judge yourself.";
/// Shown when the request fails for any reason
pub const ERROR_FALLBACK: &str = "Gemini is speechless at your performance.";
/// Shown when Gemini answers with no text
pub const EMPTY_REPLY_FALLBACK: &str = "Game Over!";

/// Build the prompt for a final score
pub fn prompt_for(score: u32) -> String {
    format!(
        "The user just finished a game of Flappy Bird. Their score was {}. \
         Give them a very short, witty, sarcastic, or encouraging remark based on their score. \
         If score < 5: Roast them gently. \
         If score > 5 and < 20: Encouraging but standard. \
         If score > 20: Praise them as a god. \
         Keep it under 20 words.",
        score
    )
}

/// Errors from a commentary request
#[derive(Debug, Clone, PartialEq)]
pub enum CommentaryError {
    /// No API key configured; detected before any request
    MissingCredentials,
    /// Request could not be sent or no response arrived
    Transport(String),
    /// Server answered with a non-success status
    Status(u16),
    /// Response body was not the expected JSON
    Decode(String),
}

impl fmt::Display for CommentaryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommentaryError::MissingCredentials => write!(f, "no API key configured"),
            CommentaryError::Transport(e) => write!(f, "request failed: {}", e),
            CommentaryError::Status(code) => write!(f, "server returned HTTP {}", code),
            CommentaryError::Decode(e) => write!(f, "unexpected response: {}", e),
        }
    }
}

impl std::error::Error for CommentaryError {}

/// HTTP seam. The browser build posts with `fetch`; tests use canned replies.
#[allow(async_fn_in_trait)]
pub trait CommentaryTransport {
    /// POST a JSON body and return the response body
    async fn post_json(&self, url: &str, api_key: &str, body: String) -> Result<String, CommentaryError>;
}

/// Transport for builds with no HTTP client (native). Always fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTransport;

impl CommentaryTransport for NoTransport {
    async fn post_json(&self, _url: &str, _api_key: &str, _body: String) -> Result<String, CommentaryError> {
        Err(CommentaryError::Transport("no HTTP transport in this build".to_string()))
    }
}

/// Model and sampling settings
#[derive(Debug, Clone)]
pub struct CommentarySettings {
    pub model: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl Default for CommentarySettings {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            // High creativity
            temperature: 1.2,
            max_output_tokens: 50,
        }
    }
}

/// API key baked in at build time (`API_KEY=... trunk build`)
#[cfg(target_arch = "wasm32")]
pub fn api_key_from_env() -> Option<String> {
    non_blank(option_env!("API_KEY"))
}

/// API key from the `API_KEY` environment variable, else the build-time value
#[cfg(not(target_arch = "wasm32"))]
pub fn api_key_from_env() -> Option<String> {
    non_blank(std::env::var("API_KEY").ok().as_deref()).or_else(|| non_blank(option_env!("API_KEY")))
}

fn non_blank(key: Option<&str>) -> Option<String> {
    key.map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
}

/// Gemini commentary client
pub struct CommentaryClient<T> {
    transport: T,
    api_key: Option<String>,
    settings: CommentarySettings,
}

impl<T: CommentaryTransport> CommentaryClient<T> {
    /// Blank keys are treated as missing
    pub fn new(transport: T, api_key: Option<String>, settings: CommentarySettings) -> Self {
        Self {
            transport,
            api_key: non_blank(api_key.as_deref()),
            settings,
        }
    }

    pub fn has_credentials(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn settings(&self) -> &CommentarySettings {
        &self.settings
    }

    /// Remark for a final score, or a fallback string. Never retries.
    pub async fn commentary(&self, score: u32) -> String {
        match self.try_commentary(score).await {
            Ok(text) => text,
            Err(CommentaryError::MissingCredentials) => {
                log::warn!("Commentary skipped: no API key configured");
                MISSING_SETUP_FALLBACK.to_string()
            }
            Err(e) => {
                log::error!("Gemini API error: {}", e);
                ERROR_FALLBACK.to_string()
            }
        }
    }

    /// Remark for a final score, surfacing errors
    pub async fn try_commentary(&self, score: u32) -> Result<String, CommentaryError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(CommentaryError::MissingCredentials)?;

        let request = GenerateContentRequest::from_prompt(
            prompt_for(score),
            GenerationConfig {
                temperature: self.settings.temperature,
                max_output_tokens: self.settings.max_output_tokens,
            },
        );
        let body = serde_json::to_string(&request).map_err(|e| CommentaryError::Decode(e.to_string()))?;
        let url = gemini::generate_content_url(&self.settings.model);

        let reply = self.transport.post_json(&url, api_key, body).await?;
        let response: GenerateContentResponse =
            serde_json::from_str(&reply).map_err(|e| CommentaryError::Decode(e.to_string()))?;

        Ok(response
            .text()
            .unwrap_or_else(|| EMPTY_REPLY_FALLBACK.to_string()))
    }
}
