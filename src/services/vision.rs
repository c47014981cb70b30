/// Listing compliance review by a hosted vision model.
///
/// The image travels as a base64 data URL inside a single user message,
/// next to the listing prompt. Only the first choice's text content is
/// kept; any other response shape is rejected.
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use bytes::Bytes;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::VisionConfig;
use crate::error::CollaboratorError;
use crate::upload::sniff_mime;

const SERVICE: &str = "vision model";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: Vec<ContentPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Clone)]
pub struct VisionClient {
    http: HttpClient,
    config: VisionConfig,
}

impl VisionClient {
    pub fn new(http: HttpClient, config: &VisionConfig) -> Self {
        Self {
            http,
            config: config.clone(),
        }
    }

    /// Ask the model whether the image meets the listing guidelines
    pub async fn review(&self, bytes: Bytes) -> Result<String, CollaboratorError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| CollaboratorError::unavailable(SERVICE, "OPENAI_API_KEY not set"))?;

        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: vec![
                    ContentPart::Text {
                        text: &self.config.prompt,
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: data_url(&bytes),
                        },
                    },
                ],
            }],
            max_tokens: self.config.max_tokens,
        };

        debug!(model = %self.config.model, bytes = bytes.len(), "requesting listing review");

        let response = self
            .http
            .post(&self.config.endpoint)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| CollaboratorError::unavailable(SERVICE, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(CollaboratorError::rejected(SERVICE, status.as_u16(), detail));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| CollaboratorError::unavailable(SERVICE, e.to_string()))?;
        parse_review(&body)
    }
}

/// `data:<mime>;base64,<payload>`, falling back to JPEG for unknown content
pub fn data_url(bytes: &[u8]) -> String {
    let mime = sniff_mime(bytes).unwrap_or("image/jpeg");
    format!("data:{};base64,{}", mime, BASE64_STANDARD.encode(bytes))
}

/// Extract the first choice's message text
pub fn parse_review(body: &[u8]) -> Result<String, CollaboratorError> {
    let response: ChatResponse = serde_json::from_slice(body)
        .map_err(|e| CollaboratorError::unparseable(SERVICE, e.to_string()))?;

    let text = response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|content| content.trim().to_string())
        .unwrap_or_default();

    if text.is_empty() {
        return Err(CollaboratorError::unparseable(
            SERVICE,
            "response has no message content",
        ));
    }
    Ok(text)
}
