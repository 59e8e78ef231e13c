use std::sync::Arc;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::config::{AppConfig, LlmBackend, MatchStrictness, NewCounterpartyPolicy};
use crate::errors::AppError;
use crate::i18n::{kind_label, message, MessageKey};
use crate::models::MeetingOutcome;
use crate::services::ai::anthropic::{AnthropicProvider, DEFAULT_ANTHROPIC_MODEL};
use crate::services::ai::decision::{LlmSuggestionSource, SuggestionSource};
use crate::services::ai::groq::{GroqProvider, DEFAULT_GROQ_MODEL};
use crate::services::ai::intent::extract_intent;
use crate::services::ai::LlmProvider;
use crate::services::calendar::{CalendarProvider, GoogleCalendar};
use crate::services::committer::MeetingCommitter;
use crate::services::gap_filling::fill_missing;
use crate::services::language::detect_locale;
use crate::services::operator::Operator;
use crate::services::records::notion::NotionRecords;
use crate::services::records::RecordsStore;
use crate::services::resolver::{candidate_name, CounterpartyResolver};
use crate::services::validation::validate;

#[derive(Clone, Debug)]
pub struct SchedulerSettings {
    pub timezone: Tz,
    pub operator_name: String,
    pub match_strictness: MatchStrictness,
    pub new_counterparty_policy: NewCounterpartyPolicy,
}

impl SchedulerSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            timezone: config.timezone,
            operator_name: config.operator_name.clone(),
            match_strictness: config.match_strictness,
            new_counterparty_policy: config.new_counterparty_policy,
        }
    }
}

/// Turns one free-text request into a booked meeting. Holds only the
/// authenticated service clients; nothing is cached between requests.
pub struct MeetingScheduler {
    llm: Arc<dyn LlmProvider>,
    suggestions: Arc<dyn SuggestionSource>,
    records: Arc<dyn RecordsStore>,
    calendar: Arc<dyn CalendarProvider>,
    settings: SchedulerSettings,
}

impl MeetingScheduler {
    pub fn new(
        llm: Arc<dyn LlmProvider>,
        suggestions: Arc<dyn SuggestionSource>,
        records: Arc<dyn RecordsStore>,
        calendar: Arc<dyn CalendarProvider>,
        settings: SchedulerSettings,
    ) -> Self {
        Self {
            llm,
            suggestions,
            records,
            calendar,
            settings,
        }
    }

    /// Wires the production clients named by the configuration.
    pub fn from_config(config: &AppConfig) -> Self {
        let llm: Arc<dyn LlmProvider> = match config.llm_backend {
            LlmBackend::Groq => {
                let model = config.llm_model.clone().unwrap_or_else(|| DEFAULT_GROQ_MODEL.to_string());
                tracing::info!("using Groq LLM provider (model: {})", model);
                Arc::new(GroqProvider::new(config.llm_api_key.clone(), model))
            }
            LlmBackend::Anthropic => {
                let model = config
                    .llm_model
                    .clone()
                    .unwrap_or_else(|| DEFAULT_ANTHROPIC_MODEL.to_string());
                tracing::info!("using Anthropic LLM provider (model: {})", model);
                Arc::new(AnthropicProvider::new(config.llm_api_key.clone(), model))
            }
        };
        let records = NotionRecords::new(
            config.notion_api_key.clone(),
            config.meetings_database_id.clone(),
            config.customers_database_id.clone(),
            config.leads_database_id.clone(),
            config.template_page_id.clone(),
        );
        let calendar = GoogleCalendar::new(&config.google_token_file, config.calendar_id.clone());

        Self::new(
            llm.clone(),
            Arc::new(LlmSuggestionSource::new(llm)),
            Arc::new(records),
            Arc::new(calendar),
            SchedulerSettings::from_config(config),
        )
    }

    pub async fn process_meeting_request(
        &self,
        utterance: &str,
        operator: &dyn Operator,
    ) -> Result<MeetingOutcome, AppError> {
        let now = Utc::now().with_timezone(&self.settings.timezone);
        self.process_meeting_request_at(utterance, operator, now).await
    }

    /// Same as [`Self::process_meeting_request`] with an explicit "now" in the
    /// operating timezone, which anchors relative dates.
    pub async fn process_meeting_request_at(
        &self,
        utterance: &str,
        operator: &dyn Operator,
        now: DateTime<Tz>,
    ) -> Result<MeetingOutcome, AppError> {
        let locale = detect_locale(utterance);
        tracing::info!(
            locale = %locale,
            interactive = operator.is_interactive(),
            request = utterance,
            "processing meeting request"
        );

        let mut draft = extract_intent(self.llm.as_ref(), utterance, locale, now).await?;

        let intent = match validate(&draft, locale) {
            Ok(intent) => intent,
            Err(err) => {
                let missing = draft.missing_fields();
                if missing.is_empty() || !operator.is_interactive() {
                    return Err(err);
                }
                tracing::info!(missing = ?missing, "soliciting missing information");
                fill_missing(&mut draft, &missing, locale, self.settings.timezone, operator).await?;
                validate(&draft, locale)?
            }
        };

        let company_name = candidate_name(&intent);
        let resolver = CounterpartyResolver {
            records: self.records.as_ref(),
            suggestions: self.suggestions.as_ref(),
            strictness: self.settings.match_strictness,
            policy: self.settings.new_counterparty_policy,
        };
        let resolution = resolver.resolve(&intent, locale, operator).await;

        let committer = MeetingCommitter {
            calendar: self.calendar.as_ref(),
            records: self.records.as_ref(),
            operator_name: &self.settings.operator_name,
            timezone: self.settings.timezone,
        };
        let commit = committer
            .commit(&intent, resolution.record.as_ref(), &company_name, locale)
            .await?;

        tracing::info!(
            conference_url = %commit.conference_url,
            page_id = %commit.records_page_id,
            counterparty = resolution.record.as_ref().map(|r| r.record_id.as_str()).unwrap_or_default(),
            created = resolution.created_new,
            "meeting booked"
        );

        Ok(MeetingOutcome {
            conference_url: commit.conference_url,
            records_page_id: commit.records_page_id,
            intent,
            counterparty: resolution.record,
            created_counterparty: resolution.created_new,
            locale,
        })
    }
}

/// Human-readable report of a booked meeting, in the request's locale.
pub fn summarize(outcome: &MeetingOutcome) -> Vec<String> {
    let locale = outcome.locale;
    let intent = &outcome.intent;
    let mut lines = vec![
        message(locale, MessageKey::ResultSuccess, &[]),
        message(locale, MessageKey::ResultConferenceLink, &[("url", &outcome.conference_url)]),
        message(locale, MessageKey::ResultPageId, &[("id", &outcome.records_page_id)]),
        String::new(),
        message(locale, MessageKey::ResultDetails, &[]),
        format!("title: {}", intent.title),
        format!("datetime: {}", intent.start.to_rfc3339()),
        format!("duration: {}", intent.duration_minutes),
        format!("attendee_email: {}", intent.attendee_email),
    ];
    if let Some(description) = &intent.description {
        lines.push(format!("description: {description}"));
    }
    if let Some(company) = &intent.company_name_hint {
        lines.push(format!("company_name: {company}"));
    }
    lines.push(String::new());

    lines.push(match &outcome.counterparty {
        Some(record) if outcome.created_counterparty => message(
            locale,
            MessageKey::ResultCounterpartyCreated,
            &[
                ("kind", &kind_label(locale, record.kind)),
                ("company", record.display_name.as_deref().unwrap_or_default()),
            ],
        ),
        Some(record) => message(
            locale,
            MessageKey::ResultCounterpartyFound,
            &[("kind", &kind_label(locale, record.kind))],
        ),
        None => message(locale, MessageKey::ResultCounterpartyMissing, &[]),
    });
    lines
}
