//! Token usage pricing for the chat-completions model.

use serde::{Deserialize, Serialize};

use super::TokenUsage;

/// USD per 1000 prompt tokens.
pub const INPUT_USD_PER_1K: f64 = 0.005;
/// USD per 1000 completion tokens.
pub const OUTPUT_USD_PER_1K: f64 = 0.015;

pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageKind {
    Text,
    Image,
}

/// Priced usage of one provider call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageCost {
    #[serde(rename = "type")]
    pub kind: UsageKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_kb: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_bytes: Option<u64>,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
    pub input_usd: f64,
    pub output_usd: f64,
    pub total_usd: f64,
}

impl UsageCost {
    fn priced(kind: UsageKind, usage: TokenUsage) -> Self {
        let input = usage.prompt_tokens as f64 / 1000.0 * INPUT_USD_PER_1K;
        let output = usage.completion_tokens as f64 / 1000.0 * OUTPUT_USD_PER_1K;
        Self {
            kind,
            image_kb: None,
            image_bytes: None,
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
            total_tokens: usage.total_tokens,
            input_usd: round4(input),
            output_usd: round4(output),
            total_usd: round4(input + output),
        }
    }

    pub fn text(usage: TokenUsage) -> Self {
        Self::priced(UsageKind::Text, usage)
    }

    pub fn image(usage: TokenUsage, image_bytes: u64) -> Self {
        Self {
            image_kb: Some(round2(image_bytes as f64 / 1024.0)),
            image_bytes: Some(image_bytes),
            ..Self::priced(UsageKind::Image, usage)
        }
    }
}

/// Cost of one call, or the provider error that prevented it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CostEntry {
    Usage(UsageCost),
    Error { error: String },
}

impl CostEntry {
    pub fn total_usd(&self) -> f64 {
        match self {
            CostEntry::Usage(u) => u.total_usd,
            CostEntry::Error { .. } => 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<CostEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<CostEntry>,
    pub total_usd: f64,
}

impl CostBreakdown {
    pub fn new(text: Option<CostEntry>, image: Option<CostEntry>) -> Self {
        let total: f64 = text.iter().chain(image.iter()).map(CostEntry::total_usd).sum();
        Self {
            text,
            image,
            total_usd: round4(total),
        }
    }
}
