//! Summarization contract and degraded-mode helpers.
//!
//! Provider failures never fail a request: the helpers here turn them into
//! a human-readable string in place of the summary, plus a cost entry that
//! records the error.

pub mod cost;
pub mod openai;

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use cost::{CostBreakdown, CostEntry, UsageCost, UsageKind};
pub use openai::{OpenAiClient, SummaryConfig};

/// Characters per chunk for [`summarize_in_chunks`].
pub const CHUNK_CHARS: usize = 4000;

pub const EMPTY_TEXT_MESSAGE: &str = "Texto não encontrado.";
pub const MISSING_IMAGE_MESSAGE: &str = "Imagem não enviada ou não encontrada.";

pub const VISION_PROMPT: &str = "IA, você deve agir como um estagiário de direito, e extrair de forma organizada e lógica toda a informação presente na imagem.";

pub fn summary_prompt(text: &str) -> String {
    format!("Resuma o texto jurídico a seguir de forma objetiva, numerada e clara:\n\n{text}")
}

/// Prompt shown to the user before any provider call, built from the facts section.
pub fn pre_ai_prompt(facts: &str) -> String {
    format!(
        "Você é um estagiário jurídico. Leia a seção 'Dos Fatos' abaixo e produza um resumo claro e organizado dos eventos principais relatados:\n\n{facts}\n\nResuma os fatos de forma objetiva e numerada, com linguagem jurídica simples."
    )
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl TokenUsage {
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }

    pub fn add(&mut self, other: TokenUsage) {
        self.prompt_tokens += other.prompt_tokens;
        self.completion_tokens += other.completion_tokens;
        self.total_tokens += other.total_tokens;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub text: String,
    pub usage: TokenUsage,
}

#[derive(Error, Debug)]
pub enum SummaryError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("API error: {0}")]
    Api(String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("empty response from provider")]
    EmptyResponse,
}

pub type SummaryFuture<'a> = Pin<Box<dyn Future<Output = Result<Summary, SummaryError>> + Send + 'a>>;

/// A language-model provider that summarises text and describes images.
pub trait SummarizationClient: Send + Sync {
    fn name(&self) -> &str;

    fn summarize<'a>(&'a self, text: &'a str) -> SummaryFuture<'a>;

    fn analyze_image<'a>(&'a self, image: &'a [u8], mime_type: &'a str) -> SummaryFuture<'a>;
}

/// Text for the response plus the cost of producing it (`None` when no
/// provider call was made).
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryOutcome {
    pub text: String,
    pub cost: Option<CostEntry>,
}

/// Summarise `text`, substituting `"Erro ao resumir: {e}"` on failure.
pub async fn summarize_or_describe(client: &dyn SummarizationClient, text: &str) -> SummaryOutcome {
    if text.trim().is_empty() {
        return SummaryOutcome {
            text: EMPTY_TEXT_MESSAGE.to_string(),
            cost: None,
        };
    }
    match client.summarize(text).await {
        Ok(summary) => SummaryOutcome {
            text: summary.text,
            cost: Some(CostEntry::Usage(UsageCost::text(summary.usage))),
        },
        Err(e) => {
            tracing::warn!(provider = client.name(), error = %e, "summarization failed");
            SummaryOutcome {
                text: format!("Erro ao resumir: {e}"),
                cost: Some(CostEntry::Error {
                    error: e.to_string(),
                }),
            }
        }
    }
}

/// Describe a page image, substituting `"Erro ao analisar imagem com IA: {e}"` on failure.
pub async fn analyze_or_describe(
    client: &dyn SummarizationClient,
    image: &[u8],
    mime_type: &str,
) -> SummaryOutcome {
    match client.analyze_image(image, mime_type).await {
        Ok(summary) => SummaryOutcome {
            text: summary.text,
            cost: Some(CostEntry::Usage(UsageCost::image(
                summary.usage,
                image.len() as u64,
            ))),
        },
        Err(e) => {
            tracing::warn!(provider = client.name(), error = %e, "image analysis failed");
            SummaryOutcome {
                text: format!("Erro ao analisar imagem com IA: {e}"),
                cost: Some(CostEntry::Error {
                    error: e.to_string(),
                }),
            }
        }
    }
}

/// Split `text` into pieces of at most `max_chars` characters, on char boundaries.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<&str> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut count = 0;
    for (idx, _) in text.char_indices() {
        if count == max_chars {
            chunks.push(&text[start..idx]);
            start = idx;
            count = 0;
        }
        count += 1;
    }
    if start < text.len() {
        chunks.push(&text[start..]);
    }
    chunks
}

/// Summarise long text piecewise and join the partial summaries with newlines.
///
/// A failing chunk contributes its error string; the cost then records the
/// first error instead of the accumulated usage.
pub async fn summarize_in_chunks(client: &dyn SummarizationClient, text: &str) -> SummaryOutcome {
    let chunks = chunk_text(text, CHUNK_CHARS);
    if chunks.is_empty() {
        return summarize_or_describe(client, text).await;
    }

    let mut parts = Vec::with_capacity(chunks.len());
    let mut usage = TokenUsage::default();
    let mut first_error = None;
    let mut called = false;
    for (i, chunk) in chunks.iter().enumerate() {
        tracing::debug!(chunk = i + 1, total = chunks.len(), "summarizing chunk");
        let outcome = summarize_or_describe(client, chunk).await;
        match outcome.cost {
            Some(CostEntry::Usage(u)) => {
                called = true;
                usage.add(TokenUsage {
                    prompt_tokens: u.prompt_tokens,
                    completion_tokens: u.completion_tokens,
                    total_tokens: u.total_tokens,
                });
            }
            Some(CostEntry::Error { error }) => {
                called = true;
                first_error.get_or_insert(error);
            }
            None => {}
        }
        parts.push(outcome.text);
    }

    let cost = match first_error {
        Some(error) => Some(CostEntry::Error { error }),
        None if called => Some(CostEntry::Usage(UsageCost::text(usage))),
        None => None,
    };
    SummaryOutcome {
        text: parts.join("\n"),
        cost,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Echoes the input length, or fails when the text contains "falha".
    struct MockClient {
        calls: Mutex<Vec<String>>,
    }

    impl MockClient {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl SummarizationClient for MockClient {
        fn name(&self) -> &str {
            "mock"
        }

        fn summarize<'a>(&'a self, text: &'a str) -> SummaryFuture<'a> {
            Box::pin(async move {
                self.calls.lock().unwrap().push(text.to_string());
                if text.contains("falha") {
                    return Err(SummaryError::Api("quota exceeded".into()));
                }
                Ok(Summary {
                    text: format!("resumo de {} chars", text.chars().count()),
                    usage: TokenUsage::new(500, 500),
                })
            })
        }

        fn analyze_image<'a>(&'a self, image: &'a [u8], mime_type: &'a str) -> SummaryFuture<'a> {
            Box::pin(async move {
                if image.is_empty() {
                    return Err(SummaryError::EmptyResponse);
                }
                Ok(Summary {
                    text: format!("{mime_type} com {} bytes", image.len()),
                    usage: TokenUsage::new(1000, 1000),
                })
            })
        }
    }

    #[test]
    fn chunks_respect_char_boundaries() {
        let text = "ação".repeat(3);
        let chunks = chunk_text(&text, 5);
        assert_eq!(chunks, vec!["açãoa", "çãoaç", "ão"]);
        assert!(chunk_text("", 10).is_empty());
        assert_eq!(chunk_text("abc", 10), vec!["abc"]);
    }

    #[test]
    fn prompts_embed_text() {
        assert!(summary_prompt("X").ends_with("clara:\n\nX"));
        let p = pre_ai_prompt("fatos aqui");
        assert!(p.starts_with("Você é um estagiário jurídico."));
        assert!(p.contains("\n\nfatos aqui\n\n"));
    }

    #[tokio::test]
    async fn empty_text_skips_provider() {
        let client = MockClient::new();
        let outcome = summarize_or_describe(&client, "   ").await;
        assert_eq!(outcome.text, EMPTY_TEXT_MESSAGE);
        assert!(outcome.cost.is_none());
        assert!(client.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn provider_errors_become_strings() {
        let client = MockClient::new();
        let outcome = summarize_or_describe(&client, "uma falha").await;
        assert_eq!(outcome.text, "Erro ao resumir: API error: quota exceeded");
        assert_eq!(
            outcome.cost,
            Some(CostEntry::Error {
                error: "API error: quota exceeded".into()
            })
        );

        let outcome = analyze_or_describe(&client, &[], "image/jpeg").await;
        assert!(outcome.text.starts_with("Erro ao analisar imagem com IA: "));
    }

    #[tokio::test]
    async fn image_analysis_is_priced_with_size() {
        let client = MockClient::new();
        let outcome = analyze_or_describe(&client, &[0u8; 2048], "image/jpeg").await;
        assert_eq!(outcome.text, "image/jpeg com 2048 bytes");
        match outcome.cost {
            Some(CostEntry::Usage(u)) => {
                assert_eq!(u.kind, UsageKind::Image);
                assert_eq!(u.image_kb, Some(2.0));
                assert_eq!(u.total_usd, 0.02);
            }
            other => panic!("unexpected cost: {other:?}"),
        }
    }

    #[tokio::test]
    async fn chunked_summary_joins_parts_and_sums_usage() {
        let client = MockClient::new();
        let text = "a".repeat(CHUNK_CHARS * 2 + 10);
        let outcome = summarize_in_chunks(&client, &text).await;
        assert_eq!(
            outcome.text,
            "resumo de 4000 chars\nresumo de 4000 chars\nresumo de 10 chars"
        );
        assert_eq!(client.calls.lock().unwrap().len(), 3);
        match outcome.cost {
            Some(CostEntry::Usage(u)) => assert_eq!(u.prompt_tokens, 1500),
            other => panic!("unexpected cost: {other:?}"),
        }
    }

    #[tokio::test]
    async fn chunked_summary_records_first_error() {
        let client = MockClient::new();
        let mut text = "b".repeat(CHUNK_CHARS);
        text.push_str("falha");
        let outcome = summarize_in_chunks(&client, &text).await;
        let lines: Vec<_> = outcome.text.lines().collect();
        assert_eq!(lines[0], "resumo de 4000 chars");
        assert!(lines[1].starts_with("Erro ao resumir:"));
        assert!(matches!(outcome.cost, Some(CostEntry::Error { .. })));
    }
}
