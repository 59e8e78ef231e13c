pub mod notion;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};

use crate::models::{CounterpartyKind, CounterpartyRecord};

/// Meeting-notes page to create in the workspace records store.
#[derive(Debug, Clone, PartialEq)]
pub struct MeetingPage {
    pub title: String,
    pub start: DateTime<FixedOffset>,
    pub counterparty: Option<CounterpartyRecord>,
}

/// The workspace records store: a customers database, a leads database and
/// the database meeting pages are created in.
#[async_trait]
pub trait RecordsStore: Send + Sync {
    /// Records of `kind` whose title contains any of `variants`.
    async fn search(
        &self,
        kind: CounterpartyKind,
        variants: &[String],
    ) -> anyhow::Result<Vec<CounterpartyRecord>>;

    async fn create_counterparty(
        &self,
        kind: CounterpartyKind,
        name: &str,
    ) -> anyhow::Result<CounterpartyRecord>;

    /// Returns the id of the created page.
    async fn create_meeting_page(&self, page: &MeetingPage) -> anyhow::Result<String>;

    async fn set_conference_url(&self, page_id: &str, url: &str) -> anyhow::Result<()>;
}
