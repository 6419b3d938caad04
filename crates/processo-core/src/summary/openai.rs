use std::time::{Duration, Instant};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use super::{
    SummarizationClient, Summary, SummaryError, SummaryFuture, TokenUsage, VISION_PROMPT,
    summary_prompt,
};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Token counts assumed when the provider omits usage.
const TEXT_USAGE_ESTIMATE: (u32, u32) = (500, 500);
const IMAGE_USAGE_ESTIMATE: (u32, u32) = (1000, 1000);

/// Settings for [`OpenAiClient`].
#[derive(Clone)]
pub struct SummaryConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl std::fmt::Debug for SummaryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SummaryConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.3,
            max_tokens: 2048,
            timeout: Duration::from_secs(120),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: MessageContent,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponseRaw {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<TokenUsage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

pub(crate) fn data_url(image: &[u8], mime_type: &str) -> String {
    format!("data:{mime_type};base64,{}", STANDARD.encode(image))
}

fn parse_response(body: &str, estimate: (u32, u32)) -> Result<Summary, SummaryError> {
    let raw: ChatResponseRaw =
        serde_json::from_str(body).map_err(|e| SummaryError::Parse(e.to_string()))?;
    let text = raw
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(|c| c.trim().to_string())
        .ok_or(SummaryError::EmptyResponse)?;
    let usage = raw
        .usage
        .unwrap_or_else(|| TokenUsage::new(estimate.0, estimate.1));
    Ok(Summary { text, usage })
}

/// Chat-completions client for summaries and page-image analysis.
#[derive(Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    config: SummaryConfig,
}

impl OpenAiClient {
    pub fn new(config: SummaryConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    pub fn config(&self) -> &SummaryConfig {
        &self.config
    }

    fn api_key(&self) -> Result<&str, SummaryError> {
        self.config
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| SummaryError::Config("OPENAI_API_KEY not set".into()))
    }

    async fn chat(
        &self,
        content: MessageContent,
        temperature: Option<f32>,
        estimate: (u32, u32),
    ) -> Result<Summary, SummaryError> {
        let api_key = self.api_key()?;
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content,
            }],
            temperature,
            max_tokens: self.config.max_tokens,
        };

        let start = Instant::now();
        let response = self
            .http
            .post(format!(
                "{}/chat/completions",
                self.config.base_url.trim_end_matches('/')
            ))
            .bearer_auth(api_key)
            .timeout(self.config.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| SummaryError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SummaryError::Network(e.to_string()))?;
        if !status.is_success() {
            tracing::warn!(status = %status, "chat completion rejected");
            return Err(SummaryError::Api(format!("{status}: {body}")));
        }

        let summary = parse_response(&body, estimate)?;
        tracing::debug!(
            model = %self.config.model,
            duration_ms = start.elapsed().as_millis() as u64,
            total_tokens = summary.usage.total_tokens,
            "chat completion"
        );
        Ok(summary)
    }
}

impl SummarizationClient for OpenAiClient {
    fn name(&self) -> &str {
        "openai"
    }

    fn summarize<'a>(&'a self, text: &'a str) -> SummaryFuture<'a> {
        Box::pin(async move {
            self.chat(
                MessageContent::Text(summary_prompt(text)),
                Some(self.config.temperature),
                TEXT_USAGE_ESTIMATE,
            )
            .await
        })
    }

    fn analyze_image<'a>(&'a self, image: &'a [u8], mime_type: &'a str) -> SummaryFuture<'a> {
        Box::pin(async move {
            let parts = vec![
                ContentPart::Text {
                    text: VISION_PROMPT.to_string(),
                },
                ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: data_url(image, mime_type),
                    },
                },
            ];
            self.chat(MessageContent::Parts(parts), None, IMAGE_USAGE_ESTIMATE)
                .await
        })
    }
}
