use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::env_or;
use crate::errors::LlmError;
use crate::models::GroundingSource;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Configuration for LLM service
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl LlmConfig {
    /// The credential is read once here; a missing key is a valid state.
    pub fn from_env() -> Self {
        let api_key = std::env::var("API_KEY")
            .or_else(|_| std::env::var("GEMINI_API_KEY"))
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());

        Self {
            api_key,
            model: std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            base_url: std::env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            timeout: Duration::from_secs(env_or("LLM_TIMEOUT_SECS", 30)),
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }
}

/// A single generation request.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    pub web_grounding: bool,
}

/// Raw generation output; `text` may be empty.
#[derive(Debug, Clone, Default)]
pub struct Generation {
    pub text: String,
    pub sources: Vec<GroundingSource>,
}

/// Trait for LLM providers
#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn generate(&self, request: GenerationRequest) -> Result<Generation, LlmError>;
}

/// Gemini `generateContent` request/response structures
#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<GeminiTool>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
struct GeminiTool {
    google_search: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContent>,
    #[serde(default)]
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Deserialize)]
struct GroundingChunk {
    #[serde(default)]
    web: Option<WebChunk>,
}

#[derive(Debug, Deserialize)]
struct WebChunk {
    uri: Option<String>,
    title: Option<String>,
}

impl GeminiResponse {
    fn into_generation(self) -> Generation {
        let Some(candidate) = self.candidates.into_iter().next() else {
            return Generation::default();
        };

        let text = candidate
            .content
            .map(|c| {
                c.parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        // Chunks without a web payload still count as sources, just unlinkable ones
        let sources = candidate
            .grounding_metadata
            .map(|m| {
                m.grounding_chunks
                    .into_iter()
                    .map(|chunk| match chunk.web {
                        Some(web) => GroundingSource { uri: web.uri, title: web.title },
                        None => GroundingSource::default(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Generation { text, sources }
    }
}

/// Gemini provider implementation
pub struct GeminiProvider {
    api_key: String,
    model: String,
    base_url: String,
    client: Client,
}

impl GeminiProvider {
    pub fn new(api_key: String, config: &LlmConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::NetworkError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_key,
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }

    async fn call_gemini(&self, request: &GeminiRequest) -> Result<GeminiResponse, LlmError> {
        let response = self.client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout
                } else {
                    LlmError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmError::RateLimited);
        }

        if !status.is_success() {
            let error_text = response.text().await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(LlmError::ApiError(format!("HTTP {}: {}", status, error_text)));
        }

        response.json::<GeminiResponse>()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    async fn generate(&self, request: GenerationRequest) -> Result<Generation, LlmError> {
        info!("Generating content (model: {}, web grounding: {})", self.model, request.web_grounding);

        let tools = if request.web_grounding {
            vec![GeminiTool { google_search: serde_json::Map::new() }]
        } else {
            Vec::new()
        };

        let body = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart { text: Some(request.prompt) }],
            }],
            tools,
        };

        let generation = self.call_gemini(&body).await?.into_generation();
        info!(
            "Generation complete ({} chars, {} sources)",
            generation.text.len(),
            generation.sources.len()
        );
        Ok(generation)
    }
}

/// Builds the configured provider, or `None` when no API key is set.
pub fn provider_from_config(config: &LlmConfig) -> Result<Option<Arc<dyn LlmProvider>>, LlmError> {
    let Some(key) = config.api_key.clone().filter(|_| config.has_api_key()) else {
        warn!("API key not configured. Market analysis will report the missing key.");
        return Ok(None);
    };

    info!("Initializing Gemini provider (model: {})", config.model);
    let provider = GeminiProvider::new(key, config)?;
    Ok(Some(Arc::new(provider) as Arc<dyn LlmProvider>))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Path;
    use axum::http::{HeaderMap, StatusCode};
    use axum::response::IntoResponse;
    use axum::routing::post;
    use axum::{Json, Router};

    /// Stands in for the Gemini API; the model name picks the reply.
    async fn gemini_stub(Path(call): Path<String>, headers: HeaderMap) -> axum::response::Response {
        match call.trim_end_matches(":generateContent") {
            "rate-limited" => StatusCode::TOO_MANY_REQUESTS.into_response(),
            "broken" => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
            "garbled" => (StatusCode::OK, "not json").into_response(),
            "slow" => {
                tokio::time::sleep(Duration::from_secs(5)).await;
                StatusCode::OK.into_response()
            }
            _ => {
                let key = headers.get("x-goog-api-key").and_then(|v| v.to_str().ok());
                if key != Some("test-key") {
                    return StatusCode::UNAUTHORIZED.into_response();
                }
                Json(serde_json::json!({
                    "candidates": [{ "content": { "parts": [{ "text": "hi" }] } }]
                }))
                .into_response()
            }
        }
    }

    async fn spawn_gemini_stub() -> String {
        let app = Router::new().route("/v1beta/models/:call", post(gemini_stub));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn provider_for(base_url: &str, model: &str) -> GeminiProvider {
        let config = LlmConfig {
            model: model.to_string(),
            base_url: base_url.to_string(),
            timeout: Duration::from_millis(300),
            ..LlmConfig::default()
        };
        GeminiProvider::new("test-key".to_string(), &config).unwrap()
    }

    fn market_request() -> GenerationRequest {
        GenerationRequest {
            prompt: "How is NVDA doing?".to_string(),
            web_grounding: true,
        }
    }

    #[test]
    fn test_llm_config_default() {
        let config = LlmConfig::default();
        assert!(!config.has_api_key());
        assert_eq!(config.model, "gemini-2.5-flash");
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_no_provider_without_key() {
        let config = LlmConfig {
            api_key: Some(String::new()),
            ..LlmConfig::default()
        };
        assert!(provider_from_config(&config).unwrap().is_none());
    }

    #[test]
    fn test_provider_built_with_key() {
        let config = LlmConfig {
            api_key: Some("secret".to_string()),
            ..LlmConfig::default()
        };
        assert!(provider_from_config(&config).unwrap().is_some());
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let config = LlmConfig {
            base_url: "http://localhost:8080/".to_string(),
            ..LlmConfig::default()
        };
        let provider = GeminiProvider::new("k".to_string(), &config).unwrap();
        assert_eq!(
            provider.endpoint(),
            "http://localhost:8080/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn test_request_enables_google_search() {
        let body = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart { text: Some("hi".to_string()) }],
            }],
            tools: vec![GeminiTool { google_search: serde_json::Map::new() }],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(json["tools"][0]["google_search"], serde_json::json!({}));
    }

    #[test]
    fn test_response_parsing_joins_parts_and_collects_sources() {
        let raw = serde_json::json!({
            "candidates": [{
                "content": { "parts": [{ "text": "NVDA is up " }, { "text": "on AI demand." }] },
                "groundingMetadata": {
                    "groundingChunks": [
                        { "web": { "uri": "https://example.com/a", "title": "Example" } },
                        { "retrievedContext": {} }
                    ]
                }
            }]
        });
        let response: GeminiResponse = serde_json::from_value(raw).unwrap();
        let generation = response.into_generation();
        assert_eq!(generation.text, "NVDA is up on AI demand.");
        assert_eq!(generation.sources.len(), 2);
        assert_eq!(generation.sources[0].title.as_deref(), Some("Example"));
        assert_eq!(generation.sources[1], GroundingSource::default());
    }

    #[test]
    fn test_response_without_candidates_is_empty() {
        let response: GeminiResponse = serde_json::from_value(serde_json::json!({})).unwrap();
        let generation = response.into_generation();
        assert!(generation.text.is_empty());
        assert!(generation.sources.is_empty());
    }

    #[tokio::test]
    async fn test_generate_maps_http_outcomes() {
        let base_url = spawn_gemini_stub().await;

        let ok = provider_for(&base_url, "gemini-2.5-flash").generate(market_request()).await;
        assert_eq!(ok.unwrap().text, "hi");

        let limited = provider_for(&base_url, "rate-limited").generate(market_request()).await;
        assert!(matches!(limited, Err(LlmError::RateLimited)));

        let broken = provider_for(&base_url, "broken").generate(market_request()).await;
        match broken {
            Err(LlmError::ApiError(msg)) => {
                assert!(msg.contains("500"));
                assert!(msg.contains("boom"));
            }
            other => panic!("expected ApiError, got {:?}", other.map(|g| g.text)),
        }

        let garbled = provider_for(&base_url, "garbled").generate(market_request()).await;
        assert!(matches!(garbled, Err(LlmError::InvalidResponse(_))));

        let slow = provider_for(&base_url, "slow").generate(market_request()).await;
        assert!(matches!(slow, Err(LlmError::Timeout)));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let result = provider_for(&base_url, "gemini-2.5-flash").generate(market_request()).await;
        assert!(matches!(result, Err(LlmError::NetworkError(_))));
    }
}
