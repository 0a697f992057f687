use std::time::Duration;

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::detection::{clean_description, refine_prompt, suggest_meal_type, DetectedItem, RefinedMeal};
use super::NutritionCoach;
use crate::config::LlmConfig;
use crate::error::{Error, Result};

const MAX_ESTIMATE_KCAL: i32 = 10_000;

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI-compatible chat-completions client (OpenRouter by default).
#[derive(Clone)]
pub struct OpenRouterCoach {
    client: reqwest::Client,
    config: LlmConfig,
    api_key: String,
}

impl OpenRouterCoach {
    pub fn new(config: LlmConfig, api_key: String) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config, api_key })
    }

    async fn complete(&self, system: &str, user: String, max_tokens: u32) -> Result<String> {
        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage { role: "system", content: system.to_string() },
                ChatMessage { role: "user", content: user },
            ],
            temperature: 0.7,
            max_tokens,
        };

        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("HTTP-Referer", &self.config.app_url)
            .header("X-Title", "nutricoach")
            .json(&body)
            .send()
            .await
            .map_err(degraded)?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::ExternalServiceDegraded(format!(
                "chat completion returned {status}"
            )));
        }

        let parsed: ChatResponse = response.json().await.map_err(degraded)?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| Error::ExternalServiceDegraded("empty completion".into()))?;
        debug!(model = %self.config.model, chars = content.len(), "completion received");
        Ok(content)
    }
}

fn degraded(e: reqwest::Error) -> Error {
    warn!(error = %e, "language model request failed");
    Error::ExternalServiceDegraded(e.to_string())
}

/// Pulls the first integer out of a model reply such as `"About 450 kcal"`.
fn parse_calories(reply: &str) -> Result<i32> {
    lazy_static! {
        static ref NUMBER_RE: Regex = Regex::new(r"\d[\d,]*").unwrap();
    }
    let digits: String = NUMBER_RE
        .find(reply)
        .map(|m| m.as_str().replace(',', ""))
        .ok_or_else(|| Error::ExternalServiceDegraded(format!("no number in reply {reply:?}")))?;
    let kcal: i32 = digits
        .parse()
        .map_err(|_| Error::ExternalServiceDegraded(format!("unparseable estimate {digits:?}")))?;
    if !(0..=MAX_ESTIMATE_KCAL).contains(&kcal) {
        return Err(Error::ExternalServiceDegraded(format!(
            "estimate {kcal} out of range"
        )));
    }
    Ok(kcal)
}

#[async_trait]
impl NutritionCoach for OpenRouterCoach {
    async fn estimate_calories(&self, description: &str) -> Result<i32> {
        let reply = self
            .complete(
                "You estimate meal calories. Reply with a single integer number of kilocalories and nothing else.",
                format!("Meal: {}", description.trim()),
                16,
            )
            .await?;
        parse_calories(&reply)
    }

    async fn generate_tip(&self, health_goal: &str) -> Result<String> {
        self.complete(
            "You are a helpful nutrition coach. Provide concise, actionable nutrition tips in 1-2 sentences. \
             Focus on practical advice that users can implement immediately.",
            format!("Generate a nutrition tip for someone whose goal is: {}", health_goal.trim()),
            150,
        )
        .await
    }

    async fn refine_detection(&self, items: &[DetectedItem], local_hour: u8) -> Result<RefinedMeal> {
        let meal_type = suggest_meal_type(local_hour);
        let reply = self
            .complete(
                "You are a helpful nutrition assistant that creates natural meal descriptions.",
                refine_prompt(items, local_hour, meal_type),
                100,
            )
            .await?;
        let description = clean_description(&reply)?;
        Ok(RefinedMeal::described(items, meal_type, description))
    }
}
