use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;

use crate::models::CreationRecommendation;
use crate::services::ai::{parse_json_reply, LlmProvider, Message};

const SYSTEM_PROMPT: &str = r#"You are a business development assistant.
Based on the company information provided, decide if we should create a new entry in our database.
Consider:
- Is this likely a real company?
- Does the email domain match the company name?
- Is this a business email (not gmail, hotmail, etc.)?

Return ONLY valid JSON (no markdown, no explanation):
{
  "should_create": boolean,
  "reason": string,
  "suggested_type": "customer" or "lead"
}
"#;

/// Source of structured recommendations on creating an unknown counterparty.
#[async_trait]
pub trait SuggestionSource: Send + Sync {
    async fn recommend(&self, company_name: &str, email: &str) -> anyhow::Result<CreationRecommendation>;
}

/// Recommendation backed by the language service.
pub struct LlmSuggestionSource {
    llm: Arc<dyn LlmProvider>,
}

impl LlmSuggestionSource {
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl SuggestionSource for LlmSuggestionSource {
    async fn recommend(&self, company_name: &str, email: &str) -> anyhow::Result<CreationRecommendation> {
        let prompt = format!("Company: {company_name}\nEmail: {email}");
        let response = self
            .llm
            .chat(SYSTEM_PROMPT, &[Message::user(prompt)])
            .await
            .context("decision service call failed")?;

        parse_json_reply::<CreationRecommendation>(&response)
            .with_context(|| format!("unparseable recommendation: {response}"))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::models::CounterpartyKind;

    struct RecordingLlm {
        reply: &'static str,
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl LlmProvider for RecordingLlm {
        async fn chat(&self, _system: &str, messages: &[Message]) -> anyhow::Result<String> {
            self.seen
                .lock()
                .unwrap()
                .extend(messages.iter().map(|m| m.content.clone()));
            Ok(self.reply.to_string())
        }
    }

    #[tokio::test]
    async fn test_recommendation_parsed() {
        let llm = Arc::new(RecordingLlm {
            reply: r#"{"should_create":true,"reason":"Corporate domain","suggested_type":"customer"}"#,
            seen: Mutex::new(vec![]),
        });
        let source = LlmSuggestionSource::new(llm.clone());

        let rec = source.recommend("Keerok", "vincent@keerok.tech").await.unwrap();
        assert!(rec.should_create);
        assert_eq!(rec.reason, "Corporate domain");
        assert_eq!(rec.suggested_type, CounterpartyKind::Customer);
        assert_eq!(
            llm.seen.lock().unwrap().as_slice(),
            ["Company: Keerok\nEmail: vincent@keerok.tech"]
        );
    }

    #[tokio::test]
    async fn test_unparseable_recommendation_is_error() {
        let llm = Arc::new(RecordingLlm {
            reply: "maybe?",
            seen: Mutex::new(vec![]),
        });
        let source = LlmSuggestionSource::new(llm);
        assert!(source.recommend("Gmail", "bob@gmail.com").await.is_err());
    }
}
