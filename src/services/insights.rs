// src/services/insights.rs
//
// Natural-language category summaries. This module owns the prompt
// contract (top 20 items, "NAME=$1,234" pairs) and treats the actual
// text generation as an opaque HTTP collaborator; without one
// configured it falls back to a deterministic summary.

use log::{error, info};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::env;

use crate::models::InsightItem;

/// How many category items the prompt carries; keeps token usage small.
const PROMPT_ITEM_LIMIT: usize = 20;

const COMPLETION_MAX_TOKENS: u32 = 350;

#[derive(Debug, Clone, Default)]
pub struct InsightConfig {
    pub api_url: Option<String>,
    pub api_key: Option<String>,
}

impl InsightConfig {
    pub fn from_env() -> Self {
        InsightConfig {
            api_url: env::var("INSIGHT_API_URL").ok(),
            api_key: env::var("INSIGHT_API_KEY").ok(),
        }
    }
}

/// Integer dollars with thousands separators, e.g. 1234567.8 -> "1,234,568".
fn format_thousands(value: f64) -> String {
    let rounded = value.round() as i64;
    let digits = rounded.abs().to_string();
    let mut out = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if rounded < 0 {
        format!("-{}", out)
    } else {
        out
    }
}

/// "NAME=$amount" pairs for the first 20 items, comma-joined.
pub fn format_pairs(items: &[InsightItem]) -> String {
    items
        .iter()
        .take(PROMPT_ITEM_LIMIT)
        .map(|i| format!("{}=${}", i.name, format_thousands(i.value)))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn build_prompt(month: &str, pairs: &str) -> String {
    format!(
        "You are a retail analyst. Write 4-6 short bullets about the category breakdown for {month}.\n\
Use plain English, no tables. Include: top category & share, top-3 share vs long tail, \
notable rise/drop if obvious, and 1-2 next actions.\nData: {pairs}."
    )
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    text: String,
}

/// Run the prompt through the configured completion endpoint, or return
/// the deterministic fallback when none is configured or the call fails.
pub async fn complete(cfg: &InsightConfig, prompt: &str, pairs: &str) -> String {
    let fallback = format!(
        "* Top category and shares based on: {pairs}\n\
* (No insight provider configured; deterministic summary.)"
    );

    let url = match &cfg.api_url {
        Some(url) => url,
        None => return fallback,
    };

    let mut req = Client::new()
        .post(url)
        .json(&json!({ "prompt": prompt, "max_tokens": COMPLETION_MAX_TOKENS }));
    if let Some(key) = &cfg.api_key {
        req = req.bearer_auth(key);
    }

    match req.send().await {
        Ok(resp) => match resp.error_for_status() {
            Ok(resp) => match resp.json::<CompletionResponse>().await {
                Ok(body) => {
                    info!("Insight completion succeeded ({} chars)", body.text.len());
                    body.text
                }
                Err(e) => {
                    error!("Insight provider returned unparsable body: {}", e);
                    fallback
                }
            },
            Err(e) => {
                error!("Insight provider returned error status: {}", e);
                fallback
            }
        },
        Err(e) => {
            error!("Insight provider request failed: {}", e);
            fallback
        }
    }
}
