use anyhow::Context;
use async_trait::async_trait;
use serde_json::{json, Value};

use super::{MeetingPage, RecordsStore};
use crate::models::{CounterpartyKind, CounterpartyRecord};

pub const NOTION_API_BASE_URL: &str = "https://api.notion.com/v1";
pub const NOTION_API_VERSION: &str = "2022-06-28";

pub const CUSTOMER_TITLE_PROPERTY: &str = "Company name";
pub const LEAD_TITLE_PROPERTY: &str = "Lead name";
pub const MEETING_TITLE_PROPERTY: &str = "Name";
pub const STATUS_PROPERTY: &str = "Status";
pub const MEETING_DATE_PROPERTY: &str = "Meeting date";
pub const CONFERENCE_URL_PROPERTY: &str = "Google Meet";

pub const NEW_COUNTERPARTY_STATUS: &str = "New";
pub const PLANNED_MEETING_STATUS: &str = "Planned";

pub fn title_property(kind: CounterpartyKind) -> &'static str {
    match kind {
        CounterpartyKind::Customer => CUSTOMER_TITLE_PROPERTY,
        CounterpartyKind::Lead => LEAD_TITLE_PROPERTY,
    }
}

/// Relation property on a meeting page pointing at the counterparty.
pub fn relation_property(kind: CounterpartyKind) -> &'static str {
    match kind {
        CounterpartyKind::Customer => "Customer",
        CounterpartyKind::Lead => "Lead",
    }
}

fn rich_title(content: &str) -> Value {
    json!({ "title": [{ "text": { "content": content } }] })
}

pub fn title_filter(kind: CounterpartyKind, variants: &[String]) -> Value {
    let property = title_property(kind);
    let clauses: Vec<Value> = variants
        .iter()
        .map(|variant| json!({ "property": property, "title": { "contains": variant } }))
        .collect();
    json!({ "or": clauses })
}

pub fn counterparty_properties(kind: CounterpartyKind, name: &str) -> Value {
    json!({
        title_property(kind): rich_title(name),
        STATUS_PROPERTY: { "select": { "name": NEW_COUNTERPARTY_STATUS } },
    })
}

pub fn meeting_page_properties(page: &MeetingPage) -> Value {
    let mut properties = json!({
        MEETING_TITLE_PROPERTY: rich_title(&page.title),
        STATUS_PROPERTY: { "select": { "name": PLANNED_MEETING_STATUS } },
        MEETING_DATE_PROPERTY: { "date": { "start": page.start.to_rfc3339() } },
    });
    if let Some(record) = &page.counterparty {
        properties[relation_property(record.kind)] =
            json!({ "relation": [{ "id": record.record_id }] });
    }
    properties
}

pub fn conference_properties(url: &str) -> Value {
    json!({ CONFERENCE_URL_PROPERTY: { "url": url } })
}

/// Reads a database row into a record; the display name is `None` when the
/// title property is absent or empty.
pub fn record_from_page(kind: CounterpartyKind, page: &Value) -> Option<CounterpartyRecord> {
    let record_id = page["id"].as_str()?.to_string();
    let title = &page["properties"][title_property(kind)]["title"][0];
    let display_name = title["text"]["content"]
        .as_str()
        .or_else(|| title["plain_text"].as_str())
        .map(str::to_string);
    if display_name.is_none() {
        tracing::warn!(record_id = %record_id, kind = kind.as_str(), "record has no readable title");
    }
    Some(CounterpartyRecord {
        kind,
        record_id,
        display_name,
    })
}

pub struct NotionRecords {
    api_key: String,
    meetings_database_id: String,
    customers_database_id: String,
    leads_database_id: String,
    template_page_id: String,
    base_url: String,
    client: reqwest::Client,
}

impl NotionRecords {
    pub fn new(
        api_key: String,
        meetings_database_id: String,
        customers_database_id: String,
        leads_database_id: String,
        template_page_id: String,
    ) -> Self {
        Self {
            api_key,
            meetings_database_id,
            customers_database_id,
            leads_database_id,
            template_page_id,
            base_url: NOTION_API_BASE_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn database_id(&self, kind: CounterpartyKind) -> &str {
        match kind {
            CounterpartyKind::Customer => &self.customers_database_id,
            CounterpartyKind::Lead => &self.leads_database_id,
        }
    }

    async fn send(&self, request: reqwest::RequestBuilder, what: &str) -> anyhow::Result<Value> {
        let resp = request
            .bearer_auth(&self.api_key)
            .header("Notion-Version", NOTION_API_VERSION)
            .send()
            .await
            .with_context(|| format!("failed to call Notion API ({what})"))?;

        let status = resp.status();
        let data: Value = resp
            .json()
            .await
            .with_context(|| format!("failed to parse Notion response ({what})"))?;

        if !status.is_success() {
            anyhow::bail!("Notion API error ({what}, {}): {}", status, data["message"]);
        }
        Ok(data)
    }
}

#[async_trait]
impl RecordsStore for NotionRecords {
    async fn search(
        &self,
        kind: CounterpartyKind,
        variants: &[String],
    ) -> anyhow::Result<Vec<CounterpartyRecord>> {
        let url = format!("{}/databases/{}/query", self.base_url, self.database_id(kind));
        let body = json!({ "filter": title_filter(kind, variants) });
        let data = self
            .send(self.client.post(url).json(&body), "query")
            .await?;

        Ok(data["results"]
            .as_array()
            .map(|rows| rows.iter().filter_map(|row| record_from_page(kind, row)).collect())
            .unwrap_or_default())
    }

    async fn create_counterparty(
        &self,
        kind: CounterpartyKind,
        name: &str,
    ) -> anyhow::Result<CounterpartyRecord> {
        let body = json!({
            "parent": { "database_id": self.database_id(kind) },
            "properties": counterparty_properties(kind, name),
        });
        let data = self
            .send(
                self.client.post(format!("{}/pages", self.base_url)).json(&body),
                "create counterparty",
            )
            .await?;

        let record_id = data["id"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("created page has no id"))?;
        Ok(CounterpartyRecord {
            kind,
            record_id: record_id.to_string(),
            display_name: Some(name.to_string()),
        })
    }

    async fn create_meeting_page(&self, page: &MeetingPage) -> anyhow::Result<String> {
        let body = json!({
            "parent": { "database_id": self.meetings_database_id },
            "properties": meeting_page_properties(page),
            "template": { "type": "template_id", "template_id": self.template_page_id },
        });
        let data = self
            .send(
                self.client.post(format!("{}/pages", self.base_url)).json(&body),
                "create meeting page",
            )
            .await?;

        data["id"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| anyhow::anyhow!("created meeting page has no id"))
    }

    async fn set_conference_url(&self, page_id: &str, url: &str) -> anyhow::Result<()> {
        let body = json!({ "properties": conference_properties(url) });
        self.send(
            self.client
                .patch(format!("{}/pages/{}", self.base_url, page_id))
                .json(&body),
            "update meeting page",
        )
        .await?;
        Ok(())
    }
}
