use serde::{Deserialize, Serialize};

use super::{CounterpartyRecord, Locale, MeetingIntent};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommitResult {
    pub conference_url: String,
    pub records_page_id: String,
}

/// Everything the session boundary hands back for one processed request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MeetingOutcome {
    pub conference_url: String,
    pub records_page_id: String,
    pub intent: MeetingIntent,
    pub counterparty: Option<CounterpartyRecord>,
    pub created_counterparty: bool,
    pub locale: Locale,
}

/// External objects that already exist when a commit stops half-way.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PartialCommit {
    pub calendar_event_id: Option<String>,
    pub conference_url: Option<String>,
    pub records_page_id: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CommitStage {
    CalendarEvent,
    RecordsPage,
    ConferenceLink,
}

impl CommitStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommitStage::CalendarEvent => "calendar_event",
            CommitStage::RecordsPage => "records_page",
            CommitStage::ConferenceLink => "conference_link",
        }
    }
}
