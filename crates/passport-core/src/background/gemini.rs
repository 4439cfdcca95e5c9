//! Gemini image-editing client.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{decode_image_data, BackgroundEditRequest, BackgroundEditor, BackgroundError, EditFuture};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-image";

const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    #[serde(skip_serializing)]
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Read the key from `GEMINI_API_KEY`, falling back to `API_KEY`.
    pub fn from_env() -> Result<Self, BackgroundError> {
        API_KEY_VARS
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find(|key| !key.trim().is_empty())
            .map(Self::new)
            .ok_or(BackgroundError::MissingApiKey)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        let model = model.into();
        if !model.trim().is_empty() {
            self.model = model;
        }
        self
    }

    pub fn endpoint(&self) -> String {
        format!(
            "{}/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

#[derive(Debug, Clone)]
pub struct GeminiClient {
    config: GeminiConfig,
    http: reqwest::Client,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self, BackgroundError> {
        if config.api_key.trim().is_empty() {
            return Err(BackgroundError::MissingApiKey);
        }
        Ok(Self {
            config,
            http: reqwest::Client::new(),
        })
    }

    pub fn from_env() -> Result<Self, BackgroundError> {
        Self::new(GeminiConfig::from_env()?)
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    async fn send(&self, request: &BackgroundEditRequest) -> Result<Vec<u8>, BackgroundError> {
        let url = self.config.endpoint();
        tracing::debug!(%url, bytes = request.image_bytes.len(), "sending background edit");

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(&request_body(request))
            .send()
            .await
            .map_err(|e| BackgroundError::Request(e.to_string()))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| e.to_string());
        read_response(status.as_u16(), body)
    }
}

/// Turn an HTTP status and the body read into the edited image.
fn read_response(status: u16, body: Result<String, String>) -> Result<Vec<u8>, BackgroundError> {
    let text = body.map_err(BackgroundError::Request)?;
    if !(200..300).contains(&status) {
        return Err(BackgroundError::Api {
            status,
            message: extract_gemini_error(&text).unwrap_or(text),
        });
    }
    extract_image(&text)
}

impl BackgroundEditor for GeminiClient {
    fn edit<'a>(&'a self, request: &'a BackgroundEditRequest) -> EditFuture<'a> {
        Box::pin(self.send(request))
    }
}

fn request_body(request: &BackgroundEditRequest) -> Value {
    json!({
        "contents": [
            {
                "role": "user",
                "parts": [
                    {
                        "inline_data": {
                            "mime_type": request.mime_type,
                            "data": request.encoded_image()
                        }
                    },
                    { "text": request.prompt }
                ]
            }
        ],
        "generationConfig": {
            "responseModalities": ["IMAGE"]
        }
    })
}

/// Pull the first inline image out of a `generateContent` response body.
pub fn extract_image(body: &str) -> Result<Vec<u8>, BackgroundError> {
    let payload: GeminiResponse = serde_json::from_str(body)
        .map_err(|e| BackgroundError::InvalidResponse(e.to_string()))?;
    let data = payload
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .into_iter()
        .flat_map(|content| content.parts)
        .find_map(|part| part.inline_data)
        .ok_or(BackgroundError::NoImageData)?;
    decode_image_data(&data.data)
}

fn extract_gemini_error(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: Option<GeminiError>,
    }

    #[derive(Deserialize)]
    struct GeminiError {
        message: Option<String>,
        status: Option<String>,
    }

    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    let error = parsed.error?;
    let parts: Vec<String> = [error.message, error.status.map(|s| format!("type: {s}"))]
        .into_iter()
        .flatten()
        .filter(|part| !part.trim().is_empty())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" | "))
    }
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    #[serde(rename = "inlineData", alias = "inline_data")]
    inline_data: Option<GeminiInlineData>,
}

#[derive(Debug, Deserialize)]
struct GeminiInlineData {
    data: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> BackgroundEditRequest {
        BackgroundEditRequest {
            image_bytes: vec![1, 2, 3],
            mime_type: "image/png".to_string(),
            prompt: "make it blue".to_string(),
        }
    }

    #[test]
    fn test_endpoint() {
        let config = GeminiConfig::new("k");
        assert_eq!(
            config.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash-image:generateContent"
        );
        let config = GeminiConfig {
            base_url: "http://localhost:9000/".to_string(),
            ..GeminiConfig::new("k")
        }
        .with_model("m");
        assert_eq!(config.endpoint(), "http://localhost:9000/m:generateContent");
    }

    #[test]
    fn test_with_empty_model_keeps_default() {
        assert_eq!(GeminiConfig::new("k").with_model("  ").model, DEFAULT_MODEL);
    }

    #[test]
    fn test_client_requires_key() {
        assert!(matches!(
            GeminiClient::new(GeminiConfig::default()),
            Err(BackgroundError::MissingApiKey)
        ));
    }

    #[test]
    fn test_request_body_shape() {
        let body = request_body(&request());
        let parts = &body["contents"][0]["parts"];
        assert_eq!(parts[0]["inline_data"]["mime_type"], "image/png");
        assert_eq!(parts[0]["inline_data"]["data"], "AQID");
        assert_eq!(parts[1]["text"], "make it blue");
        assert_eq!(body["generationConfig"]["responseModalities"][0], "IMAGE");
    }

    #[test]
    fn test_extract_first_image_part() {
        let body = r#"{
            "candidates": [{
                "content": {
                    "parts": [
                        { "text": "Here is your photo" },
                        { "inlineData": { "mimeType": "image/png", "data": "AQID" } },
                        { "inlineData": { "mimeType": "image/png", "data": "BAUG" } }
                    ]
                }
            }]
        }"#;
        assert_eq!(extract_image(body).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_extract_without_image_part() {
        let body = r#"{ "candidates": [{ "content": { "parts": [{ "text": "sorry" }] } }] }"#;
        assert!(matches!(extract_image(body), Err(BackgroundError::NoImageData)));
        assert!(matches!(
            extract_image(r#"{ "candidates": [] }"#),
            Err(BackgroundError::NoImageData)
        ));
    }

    #[test]
    fn test_extract_malformed_body() {
        assert!(matches!(
            extract_image("<html>"),
            Err(BackgroundError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_body_read_failure_is_a_request_error() {
        let result = read_response(200, Err("connection reset".to_string()));
        assert!(matches!(
            result,
            Err(BackgroundError::Request(message)) if message == "connection reset"
        ));
        assert!(matches!(
            read_response(500, Err("timed out".to_string())),
            Err(BackgroundError::Request(_))
        ));
    }

    #[test]
    fn test_error_status_carries_api_message() {
        let body = r#"{ "error": { "message": "quota exceeded" } }"#.to_string();
        assert!(matches!(
            read_response(429, Ok(body)),
            Err(BackgroundError::Api { status: 429, message }) if message == "quota exceeded"
        ));
        assert!(matches!(
            read_response(502, Ok("bad gateway".to_string())),
            Err(BackgroundError::Api { status: 502, message }) if message == "bad gateway"
        ));
    }

    #[test]
    fn test_success_status_extracts_image() {
        let body = r#"{ "candidates": [{ "content": { "parts": [{ "inlineData": { "data": "AQID" } }] } }] }"#;
        assert_eq!(read_response(200, Ok(body.to_string())).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_extract_gemini_error() {
        let body = r#"{ "error": { "code": 400, "message": "API key not valid", "status": "INVALID_ARGUMENT" } }"#;
        assert_eq!(
            extract_gemini_error(body).unwrap(),
            "API key not valid | type: INVALID_ARGUMENT"
        );
        assert!(extract_gemini_error("plain text").is_none());
    }
}
