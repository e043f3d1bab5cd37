//! # OT Board Tip
//!
//! Short reassuring sentences for relatives watching the display ticker.
//!
//! Tips come from a hosted text-generation model. The ticker must never show an error, so
//! [`TipService::get_tip`] always returns a sentence: the model's answer when the call works,
//! otherwise one of two fixed fallbacks. Failures are logged and swallowed here.
//!
//! ## Example Usage
//!
//! ```no_run
//! use otboard_tip::{TipConfig, TipService};
//!
//! # async fn run() {
//! let service = TipService::new(TipConfig::from_env_values(
//!     std::env::var("API_KEY").ok(),
//!     None,
//!     None,
//! ));
//! let tip = service.get_tip().await;
//! println!("SMART TIP: {tip}");
//! # }
//! ```

use serde::Deserialize;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

/// Prompt sent on every request; no conversation state is kept.
pub const TIP_PROMPT: &str = "Generate a short, reassuring one-sentence tip for relatives waiting in a hospital surgical department. Focus on comfort, patience, or health. Keep it under 15 words.";

/// Returned when the model answers with no text.
pub const FALLBACK_EMPTY: &str =
    "Our medical team is committed to providing the best care for your loved ones.";

/// Returned when the call fails for any reason.
pub const FALLBACK_ERROR: &str =
    "Thank you for your patience. Your family's health is our priority.";

pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum TipError {
    #[error("API_KEY is not configured")]
    MissingApiKey,
    #[error("tip request failed: {0}")]
    Request(reqwest::Error),
    #[error("tip endpoint returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("tip response could not be decoded: {0}")]
    Decode(reqwest::Error),
}

/// Connection settings for the text-generation endpoint.
#[derive(Clone)]
pub struct TipConfig {
    api_key: Option<String>,
    model: String,
    base_url: String,
    timeout: Duration,
}

impl TipConfig {
    /// Builds a config from optional raw values, falling back to defaults for blanks.
    pub fn from_env_values(
        api_key: Option<String>,
        model: Option<String>,
        base_url: Option<String>,
    ) -> Self {
        fn non_blank(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }

        Self {
            api_key: non_blank(api_key),
            model: non_blank(model).unwrap_or_else(|| DEFAULT_MODEL.into()),
            base_url: non_blank(base_url).unwrap_or_else(|| DEFAULT_BASE_URL.into()),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

impl std::fmt::Debug for TipConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TipConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate, `None` if blank.
    fn text(self) -> Option<String> {
        let text: String = self
            .candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .filter_map(|p| p.text)
            .collect();
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }
}

/// Client for the tip endpoint.
#[derive(Clone, Debug)]
pub struct TipService {
    config: TipConfig,
    client: reqwest::Client,
}

impl TipService {
    pub fn new(config: TipConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { config, client }
    }

    /// A tip sentence. Never fails: errors are logged and replaced by a fallback.
    pub async fn get_tip(&self) -> String {
        match self.fetch().await {
            Ok(Some(tip)) => tip,
            Ok(None) => FALLBACK_EMPTY.to_string(),
            Err(e) => {
                tracing::error!("tip collaborator error: {}", e);
                FALLBACK_ERROR.to_string()
            }
        }
    }

    async fn fetch(&self) -> Result<Option<String>, TipError> {
        let api_key = self.config.api_key.as_deref().ok_or(TipError::MissingApiKey)?;

        let body = serde_json::json!({
            "contents": [{ "role": "user", "parts": [{ "text": TIP_PROMPT }] }]
        });

        let response = self
            .client
            .post(self.config.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(TipError::Request)?;

        if !response.status().is_success() {
            return Err(TipError::Status(response.status()));
        }

        let parsed: GenerateContentResponse = response.json().await.map_err(TipError::Decode)?;
        Ok(parsed.text())
    }
}

/// Most recent tip, shared between the refresher task and readers.
#[derive(Clone, Debug)]
pub struct TipCache {
    current: Arc<RwLock<String>>,
}

impl TipCache {
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            current: Arc::new(RwLock::new(initial.into())),
        }
    }

    pub fn get(&self) -> String {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set(&self, tip: String) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = tip;
    }

    /// Fetches once, stores the result and returns it.
    pub async fn refresh(&self, service: &TipService) -> String {
        let tip = service.get_tip().await;
        self.set(tip.clone());
        tip
    }
}

/// Spawns a task that refreshes `cache` immediately and then every `period`.
///
/// Aborting the returned handle stops the refresher.
pub fn spawn_refresher(
    service: TipService,
    cache: TipCache,
    period: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            let tip = cache.refresh(&service).await;
            tracing::debug!(tip = %tip, "tip refreshed");
        }
    })
}
