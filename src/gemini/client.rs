//! GeminiClient - handles communication with the Gemini generateContent API.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::camera::CapturedImage;
use crate::workflow::Verifier;

use super::prompt::{response_schema, VERIFICATION_PROMPT};

/// The environment variable name for the Gemini API key.
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Default base URL for the Gemini API.
pub const GEMINI_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model for verification.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Default timeout for HTTP requests (30 seconds).
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default connection timeout (10 seconds).
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// MIME type of the captured stills.
const IMAGE_MIME_TYPE: &str = "image/jpeg";

/// Structured judgment returned by the verification call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationOutcome {
    /// Whether the selfie matches the person on the ID document.
    pub is_match: bool,
    /// Model confidence in the determination (0.0-1.0).
    pub confidence: f64,
    /// Natural-language justification for the judgment.
    pub reasoning: String,
}

/// Request body for generateContent.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

/// One content part: either prompt text or an inline image.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

impl Part {
    fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            inline_data: None,
        }
    }

    fn image(image: &CapturedImage) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData {
                mime_type: IMAGE_MIME_TYPE.to_string(),
                data: BASE64.encode(&image.data),
            }),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    /// Base64-encoded image bytes
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    response_schema: serde_json::Value,
}

/// Response from generateContent.
#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

/// Client for the Gemini verification call.
pub struct GeminiClient {
    api_key: String,
    base_url: String,
    model: String,
    http_client: reqwest::Client,
}

impl GeminiClient {
    /// Create a new GeminiClient by reading the API key from the environment.
    ///
    /// # Errors
    ///
    /// Returns `VerifyError::MissingApiKey` if the `GEMINI_API_KEY`
    /// environment variable is not set.
    pub fn new() -> Result<Self, VerifyError> {
        let api_key = std::env::var(GEMINI_API_KEY_ENV).map_err(|_| VerifyError::MissingApiKey)?;
        Self::with_api_key(api_key)
    }

    /// Create a new GeminiClient with an explicit API key.
    pub fn with_api_key(api_key: String) -> Result<Self, VerifyError> {
        Self::build(api_key, GEMINI_API_BASE_URL.to_string(), DEFAULT_MODEL.to_string())
    }

    /// Create a new GeminiClient with a custom base URL.
    ///
    /// Useful for testing against a mock server.
    pub fn with_base_url(api_key: String, base_url: String) -> Result<Self, VerifyError> {
        Self::build(api_key, base_url, DEFAULT_MODEL.to_string())
    }

    /// Create a new GeminiClient with a custom model.
    pub fn with_model(api_key: String, model: String) -> Result<Self, VerifyError> {
        Self::build(api_key, GEMINI_API_BASE_URL.to_string(), model)
    }

    fn build(api_key: String, base_url: String, model: String) -> Result<Self, VerifyError> {
        if api_key.is_empty() {
            return Err(VerifyError::MissingApiKey);
        }

        let http_client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()?;

        Ok(Self {
            api_key,
            base_url,
            model,
            http_client,
        })
    }

    /// Get the API key.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the model.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Submit the two stills for a match/authenticity judgment.
    ///
    /// Sends a single generateContent request with the fixed instruction
    /// prompt, the ID document image, and the selfie image, constrained
    /// to the `{isMatch, confidence, reasoning}` response schema. One
    /// request, one response; the caller decides what a failure means.
    ///
    /// # Errors
    ///
    /// Returns `VerifyError::ApiError` for non-success statuses,
    /// `VerifyError::HttpError` for transport failures, and
    /// `VerifyError::EmptyResponse`/`VerifyError::MalformedResponse`
    /// when the response does not carry a parsable judgment.
    pub async fn submit_verification(
        &self,
        document: &CapturedImage,
        selfie: &CapturedImage,
    ) -> Result<VerificationOutcome, VerifyError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);

        let request_body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part::text(VERIFICATION_PROMPT),
                    Part::image(document),
                    Part::image(selfie),
                ],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: response_schema(),
            },
        };

        let response = self
            .http_client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(VerifyError::ApiError(format!(
                "API request failed with status {}: {}",
                status, error_text
            )));
        }

        let body: GenerateContentResponse = response.json().await?;

        let judgment_text = body
            .candidates
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts)
            .find_map(|p| p.text)
            .ok_or(VerifyError::EmptyResponse)?;

        let outcome: VerificationOutcome = serde_json::from_str(&judgment_text)
            .map_err(|e| VerifyError::MalformedResponse(e.to_string()))?;

        Ok(outcome)
    }
}

#[async_trait::async_trait]
impl Verifier for GeminiClient {
    async fn verify(
        &self,
        document: &CapturedImage,
        selfie: &CapturedImage,
    ) -> Result<VerificationOutcome, VerifyError> {
        self.submit_verification(document, selfie).await
    }
}

/// Errors that can occur during the verification call.
#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error("API key not configured")]
    MissingApiKey,

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Response contained no judgment")]
    EmptyResponse,

    #[error("Could not parse judgment: {0}")]
    MalformedResponse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn still(data: Vec<u8>) -> CapturedImage {
        CapturedImage {
            data,
            width: 2,
            height: 2,
        }
    }

    #[test]
    fn test_with_api_key_creates_client() {
        let client = GeminiClient::with_api_key("test-api-key".to_string()).unwrap();
        assert_eq!(client.api_key(), "test-api-key");
        assert_eq!(client.base_url(), GEMINI_API_BASE_URL);
        assert_eq!(client.model(), DEFAULT_MODEL);
    }

    #[test]
    fn test_with_api_key_empty_returns_error() {
        let result = GeminiClient::with_api_key("".to_string());
        assert!(matches!(result, Err(VerifyError::MissingApiKey)));
    }

    #[test]
    fn test_with_base_url_creates_client() {
        let client =
            GeminiClient::with_base_url("test-key".to_string(), "https://custom.api".to_string())
                .unwrap();
        assert_eq!(client.api_key(), "test-key");
        assert_eq!(client.base_url(), "https://custom.api");
        assert_eq!(client.model(), DEFAULT_MODEL);
    }

    #[test]
    fn test_with_model_creates_client() {
        let client =
            GeminiClient::with_model("test-key".to_string(), "gemini-custom".to_string()).unwrap();
        assert_eq!(client.api_key(), "test-key");
        assert_eq!(client.base_url(), GEMINI_API_BASE_URL);
        assert_eq!(client.model(), "gemini-custom");
    }

    #[test]
    fn test_verify_error_display() {
        assert_eq!(
            VerifyError::MissingApiKey.to_string(),
            "API key not configured"
        );
        assert_eq!(
            VerifyError::ApiError("bad request".to_string()).to_string(),
            "API error: bad request"
        );
        assert_eq!(
            VerifyError::EmptyResponse.to_string(),
            "Response contained no judgment"
        );
    }

    #[test]
    fn test_outcome_deserializes_camel_case() {
        let json = r#"{"isMatch": true, "confidence": 0.94, "reasoning": "faces match"}"#;
        let outcome: VerificationOutcome = serde_json::from_str(json).unwrap();
        assert!(outcome.is_match);
        assert_eq!(outcome.confidence, 0.94);
        assert_eq!(outcome.reasoning, "faces match");
    }

    #[test]
    fn test_outcome_rejects_missing_fields() {
        let json = r#"{"isMatch": true}"#;
        let result: Result<VerificationOutcome, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_request_body_part_order() {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part::text(VERIFICATION_PROMPT),
                    Part::image(&still(vec![1, 2, 3])),
                    Part::image(&still(vec![4, 5, 6])),
                ],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: response_schema(),
            },
        };

        let json = serde_json::to_value(&request).unwrap();
        let parts = json["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 3);
        assert!(parts[0]["text"].is_string());
        assert_eq!(parts[1]["inlineData"]["mimeType"], "image/jpeg");
        assert_eq!(parts[1]["inlineData"]["data"], BASE64.encode([1u8, 2, 3]));
        assert_eq!(parts[2]["inlineData"]["data"], BASE64.encode([4u8, 5, 6]));
        assert_eq!(
            json["generationConfig"]["responseMimeType"],
            "application/json"
        );
    }

    #[test]
    fn test_text_part_omits_inline_data() {
        let json = serde_json::to_value(Part::text("hello")).unwrap();
        assert_eq!(json["text"], "hello");
        assert!(json.get("inlineData").is_none());
    }

    #[test]
    fn test_submit_verification_builds_correct_url() {
        let client = GeminiClient::with_api_key("test-key".to_string()).unwrap();
        let expected_url = format!(
            "{}/models/{}:generateContent",
            client.base_url(),
            client.model()
        );
        assert_eq!(
            expected_url,
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }
}
