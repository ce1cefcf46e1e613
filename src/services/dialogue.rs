use crate::{
    foundation::error::{ReelError, ReelResult},
    script::model::DialogueTurn,
};

/// Writes a dialogue script for a topic.
pub trait DialogueGenerator: Send + Sync {
    fn generate(&self, topic: &str, system_prompt: &str) -> ReelResult<Vec<DialogueTurn>>;
}

pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Chat-completions client asking for a `{"dialogue_turns": [...]}` JSON object.
pub struct OpenAiDialogue {
    client: reqwest::blocking::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiDialogue {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            api_key: api_key.into(),
            base_url: "https://api.openai.com".to_string(),
            model: model.into(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Read the API key from `OPENAI_API_KEY`.
    pub fn from_env(model: impl Into<String>) -> ReelResult<Self> {
        let key = std::env::var(OPENAI_API_KEY_ENV)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                ReelError::validation(format!(
                    "{OPENAI_API_KEY_ENV} is not set (needed for dialogue generation)"
                ))
            })?;
        Ok(Self::new(key, model))
    }
}

pub fn user_prompt(topic: &str) -> String {
    format!("The concept to be explained is: {topic}.")
}

pub fn chat_request_body(model: &str, system_prompt: &str, topic: &str) -> serde_json::Value {
    serde_json::json!({
        "model": model,
        "response_format": { "type": "json_object" },
        "messages": [
            { "role": "system", "content": system_prompt },
            { "role": "user", "content": user_prompt(topic) },
        ],
    })
}

/// Turns from a model reply: `{"dialogue_turns": [...]}` or a bare array.
pub fn parse_dialogue_payload(content: &str) -> ReelResult<Vec<DialogueTurn>> {
    let value: serde_json::Value = serde_json::from_str(content.trim())
        .map_err(|e| ReelError::service(format!("dialogue reply is not JSON: {e}")))?;
    let turns = match value {
        serde_json::Value::Array(items) => serde_json::Value::Array(items),
        serde_json::Value::Object(mut map) => match map.remove("dialogue_turns") {
            Some(turns @ serde_json::Value::Array(_)) => turns,
            _ => {
                return Err(ReelError::service(
                    "dialogue reply has no 'dialogue_turns' list",
                ));
            }
        },
        _ => {
            return Err(ReelError::service(
                "dialogue reply must be an object or a list",
            ));
        }
    };
    let turns: Vec<DialogueTurn> = serde_json::from_value(turns)
        .map_err(|e| ReelError::service(format!("dialogue turns are malformed: {e}")))?;
    if turns.is_empty() {
        return Err(ReelError::service("dialogue reply contains no turns"));
    }
    Ok(turns)
}

#[derive(serde::Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(serde::Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(serde::Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

impl DialogueGenerator for OpenAiDialogue {
    #[tracing::instrument(skip(self, system_prompt), fields(model = self.model.as_str()))]
    fn generate(&self, topic: &str, system_prompt: &str) -> ReelResult<Vec<DialogueTurn>> {
        let url = format!(
            "{}/v1/chat/completions",
            self.base_url.trim_end_matches('/')
        );
        let res = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&chat_request_body(&self.model, system_prompt, topic))
            .send()
            .map_err(|e| ReelError::service(format!("openai request failed: {e}")))?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().unwrap_or_default();
            return Err(ReelError::service(format!(
                "openai chat completion failed: {status}: {}",
                body.trim()
            )));
        }

        let reply: ChatResponse = res
            .json()
            .map_err(|e| ReelError::service(format!("openai response is malformed: {e}")))?;
        let content = reply
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ReelError::service("openai response has no message content"))?;

        let turns = parse_dialogue_payload(&content)?;
        tracing::info!(turns = turns.len(), "generated dialogue");
        Ok(turns)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/services/dialogue.rs"]
mod tests;
