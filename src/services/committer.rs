use chrono_tz::Tz;

use crate::errors::AppError;
use crate::i18n::{message, MessageKey};
use crate::models::{CommitResult, CommitStage, CounterpartyRecord, Locale, MeetingIntent, PartialCommit};
use crate::services::calendar::{CalendarProvider, EventRequest};
use crate::services::records::{MeetingPage, RecordsStore};

/// Name shown in the event and page titles: the record's own title when the
/// counterparty resolved, else the hinted or derived company name.
pub fn display_name(counterparty: Option<&CounterpartyRecord>, fallback: &str) -> Option<String> {
    counterparty
        .and_then(|record| record.display_name.clone())
        .or_else(|| Some(fallback.trim().to_string()).filter(|name| !name.is_empty()))
}

pub fn event_summary(display_name: Option<&str>, operator_name: &str) -> String {
    format!("{} <> {}", display_name.unwrap_or("Meeting"), operator_name)
}

pub fn page_title(display_name: Option<&str>, intent: &MeetingIntent) -> String {
    format!("Meeting with {}", display_name.unwrap_or(intent.title.as_str()))
}

/// Writes a resolved meeting to the calendar and the records store.
///
/// The calendar event comes first, then the page, then the page is patched
/// with the conference link. A failure after the event exists is reported
/// with what was left behind; nothing is rolled back.
pub struct MeetingCommitter<'a> {
    pub calendar: &'a dyn CalendarProvider,
    pub records: &'a dyn RecordsStore,
    pub operator_name: &'a str,
    pub timezone: Tz,
}

impl MeetingCommitter<'_> {
    pub async fn commit(
        &self,
        intent: &MeetingIntent,
        counterparty: Option<&CounterpartyRecord>,
        company_name: &str,
        locale: Locale,
    ) -> Result<CommitResult, AppError> {
        let display = display_name(counterparty, company_name);
        let mut partial = PartialCommit::default();

        let request = EventRequest {
            summary: event_summary(display.as_deref(), self.operator_name),
            description: intent.description.clone(),
            start: intent.start,
            end: intent.end(),
            time_zone: self.timezone.name().to_string(),
            attendee_email: intent.attendee_email.clone(),
            request_id: format!("meeting-{}", uuid::Uuid::new_v4()),
        };
        tracing::info!(
            summary = %request.summary,
            start = %request.start.to_rfc3339(),
            end = %request.end.to_rfc3339(),
            "creating calendar event"
        );
        let event = self.calendar.create_event(&request).await.map_err(|e| {
            commit_error(locale, CommitStage::CalendarEvent, &format!("{e:#}"), partial.clone())
        })?;
        partial.calendar_event_id = Some(event.id.clone());
        partial.conference_url = Some(event.conference_url.clone());

        let page = MeetingPage {
            title: page_title(display.as_deref(), intent),
            start: intent.start,
            counterparty: counterparty.cloned(),
        };
        let page_id = self.records.create_meeting_page(&page).await.map_err(|e| {
            commit_error(locale, CommitStage::RecordsPage, &format!("{e:#}"), partial.clone())
        })?;
        tracing::info!(page_id = %page_id, title = %page.title, "records page created");
        partial.records_page_id = Some(page_id.clone());

        self.records
            .set_conference_url(&page_id, &event.conference_url)
            .await
            .map_err(|e| {
                commit_error(locale, CommitStage::ConferenceLink, &format!("{e:#}"), partial.clone())
            })?;

        Ok(CommitResult {
            conference_url: event.conference_url,
            records_page_id: page_id,
        })
    }
}

fn commit_error(locale: Locale, stage: CommitStage, detail: &str, partial: PartialCommit) -> AppError {
    let mut text = message(
        locale,
        MessageKey::CommitFailed,
        &[("stage", stage.as_str()), ("detail", detail)],
    );
    if let Some(event_id) = &partial.calendar_event_id {
        tracing::warn!(
            stage = stage.as_str(),
            event_id = %event_id,
            page_id = partial.records_page_id.as_deref().unwrap_or_default(),
            "meeting partially committed"
        );
        let warning = match &partial.records_page_id {
            Some(page_id) => message(
                locale,
                MessageKey::UnlinkedConferenceWarning,
                &[
                    ("event", event_id),
                    ("page", page_id),
                    ("url", partial.conference_url.as_deref().unwrap_or_default()),
                ],
            ),
            None => message(locale, MessageKey::PartialCommitWarning, &[("event", event_id)]),
        };
        text.push(' ');
        text.push_str(&warning);
    }
    AppError::Commit {
        message: text,
        stage,
        partial,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CounterpartyKind;

    #[test]
    fn test_display_name_prefers_record() {
        let record = CounterpartyRecord {
            kind: CounterpartyKind::Customer,
            record_id: "c1".to_string(),
            display_name: Some("Keerok SAS".to_string()),
        };
        assert_eq!(display_name(Some(&record), "Keerok").as_deref(), Some("Keerok SAS"));

        let nameless = CounterpartyRecord {
            display_name: None,
            ..record
        };
        assert_eq!(display_name(Some(&nameless), "Keerok").as_deref(), Some("Keerok"));
        assert_eq!(display_name(None, "Keerok").as_deref(), Some("Keerok"));
        assert_eq!(display_name(None, " "), None);
    }

    #[test]
    fn test_event_summary() {
        assert_eq!(event_summary(Some("Keerok"), "Vincent"), "Keerok <> Vincent");
        assert_eq!(event_summary(None, "Vincent"), "Meeting <> Vincent");
    }

    #[test]
    fn test_partial_commit_message() {
        let err = commit_error(
            Locale::En,
            CommitStage::RecordsPage,
            "boom",
            PartialCommit {
                calendar_event_id: Some("evt-1".to_string()),
                conference_url: Some("https://meet.google.com/abc".to_string()),
                records_page_id: None,
            },
        );
        let text = err.to_string();
        assert!(text.starts_with("Error creating meeting entries (records_page): boom"));
        assert!(text.contains("evt-1"));
    }

    #[test]
    fn test_conference_link_failure_names_existing_page() {
        let err = commit_error(
            Locale::En,
            CommitStage::ConferenceLink,
            "boom",
            PartialCommit {
                calendar_event_id: Some("evt-1".to_string()),
                conference_url: Some("https://meet.google.com/abc".to_string()),
                records_page_id: Some("page-1".to_string()),
            },
        );
        let text = err.to_string();
        assert!(text.contains("records page page-1 exist"));
        assert!(text.contains("https://meet.google.com/abc"));
        assert!(!text.contains("not linked to a records page"));
    }
}
