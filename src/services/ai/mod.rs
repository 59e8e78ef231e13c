pub mod anthropic;
pub mod decision;
pub mod groq;
pub mod intent;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// A chat-completion backend. Implementations must sample deterministically
/// (temperature 0) so the same utterance yields the same structure.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn chat(&self, system_prompt: &str, messages: &[Message]) -> anyhow::Result<String>;
}

/// Pulls the JSON object out of a model reply that may be wrapped in
/// markdown fences or surrounded by prose.
pub fn parse_json_reply<T: serde::de::DeserializeOwned>(response: &str) -> Option<T> {
    if let Ok(value) = serde_json::from_str::<T>(response) {
        return Some(value);
    }

    let trimmed = response.trim();
    let cleaned = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    let cleaned = cleaned.strip_suffix("```").unwrap_or(cleaned).trim();

    if let Ok(value) = serde_json::from_str::<T>(cleaned) {
        return Some(value);
    }

    let start = cleaned.find('{')?;
    let end = cleaned.rfind('}')?;
    if end < start {
        return None;
    }
    serde_json::from_str::<T>(&cleaned[start..=end]).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Probe {
        ok: bool,
    }

    #[test]
    fn test_parse_plain_json() {
        assert_eq!(parse_json_reply::<Probe>(r#"{"ok":true}"#), Some(Probe { ok: true }));
    }

    #[test]
    fn test_parse_markdown_fenced_json() {
        let reply = "```json\n{\"ok\":false}\n```";
        assert_eq!(parse_json_reply::<Probe>(reply), Some(Probe { ok: false }));
    }

    #[test]
    fn test_parse_json_inside_prose() {
        let reply = "Here you go: {\"ok\":true} hope that helps";
        assert_eq!(parse_json_reply::<Probe>(reply), Some(Probe { ok: true }));
    }

    #[test]
    fn test_parse_garbage() {
        assert_eq!(parse_json_reply::<Probe>("I can't do that"), None);
        assert_eq!(parse_json_reply::<Probe>("} nope {"), None);
    }
}
