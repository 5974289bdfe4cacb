use crate::config::Config;
use crate::schema::Schema;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::Debug;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Failure of a structured-text or image-generation call. Propagates
/// immediately; the client performs no retry and keeps no partial results.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("generation request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("generation service error: {0}")]
    Service(String),
    #[error("generation response empty: {0}")]
    EmptyResponse(String),
    #[error("failed to parse structured response: {source}. Body: {body}")]
    MalformedResponse {
        #[source]
        source: serde_json::Error,
        body: String,
    },
}

#[async_trait]
pub trait GenerationClient: Send + Sync + Debug {
    /// Text generation. When a schema is given, the service is asked to
    /// reply with JSON conforming to it.
    async fn generate_text(
        &self,
        prompt: &str,
        schema: Option<&Schema>,
    ) -> Result<String, GenerationError>;

    /// Text-to-image generation. Returns base64-encoded image bytes.
    async fn generate_image(&self, prompt: &str) -> Result<String, GenerationError>;
}

pub fn create_client(config: &Config) -> anyhow::Result<Box<dyn GenerationClient>> {
    let cfg = &config.gemini;
    Ok(Box::new(GeminiClient::new(
        &cfg.api_key,
        &cfg.model,
        &cfg.image_model,
    )))
}

/// Runs a schema-constrained generation call and parses the reply into `T`.
///
/// Code-fence markers around the reply are stripped before parsing. A reply
/// that is valid JSON of the wrong shape fails the same way a service error
/// does; no repair is attempted.
pub async fn generate_structured<T: serde::de::DeserializeOwned>(
    client: &dyn GenerationClient,
    prompt: &str,
    schema: &Schema,
) -> Result<T, GenerationError> {
    let raw = client.generate_text(prompt, Some(schema)).await?;
    let clean = strip_code_blocks(&raw);
    serde_json::from_str(&clean).map_err(|e| GenerationError::MalformedResponse {
        source: e,
        body: clean,
    })
}

pub fn strip_code_blocks(s: &str) -> String {
    let s = s.trim();
    if s.starts_with("```json") {
        s.trim_start_matches("```json")
            .trim_end_matches("```")
            .trim()
            .to_string()
    } else if s.starts_with("```") {
        s.trim_start_matches("```")
            .trim_end_matches("```")
            .trim()
            .to_string()
    } else {
        s.to_string()
    }
}

#[derive(Debug)]
pub struct GeminiClient {
    api_key: String,
    model: String,
    image_model: String,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(api_key: &str, model: &str, image_model: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            model: model.to_string(),
            image_model: image_model.to_string(),
            client: reqwest::Client::new(),
        }
    }
}

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
    #[serde(rename = "responseSchema")]
    response_schema: Value,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: String,
}

#[derive(Deserialize, Debug)]
struct ApiError {
    message: String,
}

#[derive(Serialize)]
struct PredictRequest {
    instances: Vec<ImageInstance>,
    parameters: ImageParameters,
}

#[derive(Serialize)]
struct ImageInstance {
    prompt: String,
}

#[derive(Serialize)]
struct ImageParameters {
    #[serde(rename = "sampleCount")]
    sample_count: u32,
}

#[derive(Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Deserialize)]
struct Prediction {
    #[serde(rename = "bytesBase64Encoded")]
    bytes_base64_encoded: Option<String>,
}

#[async_trait]
impl GenerationClient for GeminiClient {
    async fn generate_text(
        &self,
        prompt: &str,
        schema: Option<&Schema>,
    ) -> Result<String, GenerationError> {
        let url = format!(
            "{}/{}:generateContent?key={}",
            GEMINI_BASE_URL, self.model, self.api_key
        );

        let request_body = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: schema.map(|s| GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: s.to_value(),
            }),
        };

        let resp = self.client.post(&url).json(&request_body).send().await?;

        if !resp.status().is_success() {
            let error_text = resp.text().await?;
            return Err(GenerationError::Service(error_text));
        }

        // Keep the raw text around to report parse failures with context.
        let response_text = resp.text().await?;
        let result: GenerateContentResponse = match serde_json::from_str(&response_text) {
            Ok(r) => r,
            Err(e) => {
                return Err(GenerationError::MalformedResponse {
                    source: e,
                    body: response_text,
                })
            }
        };

        if let Some(err) = result.error {
            return Err(GenerationError::Service(err.message));
        }

        if let Some(candidates) = result.candidates {
            if let Some(first) = candidates.first() {
                if let Some(content) = &first.content {
                    if let Some(part) = content.parts.first() {
                        return Ok(part.text.clone());
                    }
                }

                let reason = first.finish_reason.as_deref().unwrap_or("UNKNOWN");
                return Err(GenerationError::EmptyResponse(format!(
                    "no content in candidate, finish reason: {}",
                    reason
                )));
            }
        }

        Err(GenerationError::EmptyResponse(format!(
            "no candidates in response. Body: {}",
            response_text
        )))
    }

    async fn generate_image(&self, prompt: &str) -> Result<String, GenerationError> {
        let url = format!(
            "{}/{}:predict?key={}",
            GEMINI_BASE_URL, self.image_model, self.api_key
        );

        let request_body = PredictRequest {
            instances: vec![ImageInstance {
                prompt: prompt.to_string(),
            }],
            parameters: ImageParameters { sample_count: 1 },
        };

        let resp = self.client.post(&url).json(&request_body).send().await?;

        if !resp.status().is_success() {
            let error_text = resp.text().await?;
            return Err(GenerationError::Service(error_text));
        }

        let result: PredictResponse = resp.json().await?;

        result
            .predictions
            .into_iter()
            .next()
            .and_then(|p| p.bytes_base64_encoded)
            .ok_or_else(|| {
                GenerationError::EmptyResponse("no image prediction in response".to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[test]
    fn test_strip_code_blocks() {
        assert_eq!(strip_code_blocks("json"), "json");
        assert_eq!(strip_code_blocks("```json\n{}\n```"), "{}");
        assert_eq!(strip_code_blocks("```\n{}\n```"), "{}");
        assert_eq!(strip_code_blocks("  ```json  \n  {}  \n  ```  "), "{}");
    }

    #[test]
    fn test_content_response_parsing_success() {
        let json = r#"{
            "candidates": [
                {
                    "content": {
                        "parts": [
                            { "text": "{\"title\": \"Ashfall\"}" }
                        ],
                        "role": "model"
                    },
                    "finishReason": "STOP",
                    "index": 0
                }
            ]
        }"#;

        let result: GenerateContentResponse = serde_json::from_str(json).unwrap();
        let candidate = &result.candidates.as_ref().unwrap()[0];
        assert_eq!(
            candidate.content.as_ref().unwrap().parts[0].text,
            "{\"title\": \"Ashfall\"}"
        );
    }

    #[test]
    fn test_content_response_parsing_safety_block() {
        // Blocked candidates carry a finish reason but no content.
        let json = r#"{
            "candidates": [
                {
                    "finishReason": "SAFETY",
                    "index": 0
                }
            ]
        }"#;

        let result: GenerateContentResponse = serde_json::from_str(json).unwrap();
        let candidate = &result.candidates.as_ref().unwrap()[0];
        assert!(candidate.content.is_none());
        assert_eq!(candidate.finish_reason.as_deref(), Some("SAFETY"));
    }

    #[test]
    fn test_predict_response_parsing() {
        let json = r#"{
            "predictions": [
                { "bytesBase64Encoded": "AAAA", "mimeType": "image/png" }
            ]
        }"#;

        let result: PredictResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            result.predictions[0].bytes_base64_encoded.as_deref(),
            Some("AAAA")
        );
    }

    #[test]
    fn test_predict_response_parsing_empty() {
        let result: PredictResponse = serde_json::from_str("{}").unwrap();
        assert!(result.predictions.is_empty());
    }

    #[derive(Debug)]
    struct FixedTextClient {
        reply: String,
    }

    #[async_trait]
    impl GenerationClient for FixedTextClient {
        async fn generate_text(
            &self,
            _prompt: &str,
            _schema: Option<&Schema>,
        ) -> Result<String, GenerationError> {
            Ok(self.reply.clone())
        }

        async fn generate_image(&self, _prompt: &str) -> Result<String, GenerationError> {
            Err(GenerationError::Service("not used".to_string()))
        }
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Named {
        name: String,
    }

    #[tokio::test]
    async fn test_generate_structured_strips_fences() {
        let client = FixedTextClient {
            reply: "```json\n{\"name\": \"Ava\"}\n```".to_string(),
        };

        let named: Named = generate_structured(&client, "who?", &Schema::string())
            .await
            .unwrap();
        assert_eq!(
            named,
            Named {
                name: "Ava".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_generate_structured_rejects_wrong_shape() {
        let client = FixedTextClient {
            reply: "{\"label\": \"Ava\"}".to_string(),
        };

        let result: Result<Named, _> = generate_structured(&client, "who?", &Schema::string()).await;
        assert!(matches!(
            result,
            Err(GenerationError::MalformedResponse { .. })
        ));
    }
}
