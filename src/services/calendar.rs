use std::path::PathBuf;

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use serde_json::{json, Value};

const CALENDAR_API_BASE_URL: &str = "https://www.googleapis.com/calendar/v3";

/// A calendar event with a videoconference to be created.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRequest {
    pub summary: String,
    pub description: Option<String>,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    pub time_zone: String,
    pub attendee_email: String,
    /// Idempotency key for the conference creation request.
    pub request_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreatedEvent {
    pub id: String,
    pub conference_url: String,
}

#[async_trait]
pub trait CalendarProvider: Send + Sync {
    async fn create_event(&self, event: &EventRequest) -> anyhow::Result<CreatedEvent>;
}

pub fn event_body(event: &EventRequest) -> Value {
    let mut body = json!({
        "summary": event.summary,
        "start": { "dateTime": event.start.to_rfc3339(), "timeZone": event.time_zone },
        "end": { "dateTime": event.end.to_rfc3339(), "timeZone": event.time_zone },
        "conferenceData": {
            "createRequest": {
                "requestId": event.request_id,
                "conferenceSolutionKey": { "type": "hangoutsMeet" },
            }
        },
        "attendees": [{ "email": event.attendee_email }],
    });
    if let Some(description) = &event.description {
        body["description"] = json!(description);
    }
    body
}

/// Conference link of a created event: `hangoutLink`, else the first video
/// entry point.
pub fn conference_url(event: &Value) -> Option<String> {
    event["hangoutLink"]
        .as_str()
        .or_else(|| {
            event["conferenceData"]["entryPoints"]
                .as_array()?
                .iter()
                .find(|e| e["entryPointType"] == "video")
                .and_then(|e| e["uri"].as_str())
        })
        .map(|s| s.to_string())
}

/// Pre-authorized OAuth token as written by the consent flow.
#[derive(Debug, Deserialize)]
struct StoredToken {
    #[serde(alias = "access_token")]
    token: String,
}

/// Google Calendar v3 client using a bearer token read from disk. Obtaining
/// and refreshing that token is left to the tooling that writes the file.
pub struct GoogleCalendar {
    token_file: PathBuf,
    calendar_id: String,
    client: reqwest::Client,
}

impl GoogleCalendar {
    pub fn new(token_file: impl Into<PathBuf>, calendar_id: String) -> Self {
        Self {
            token_file: token_file.into(),
            calendar_id,
            client: reqwest::Client::new(),
        }
    }

    async fn access_token(&self) -> anyhow::Result<String> {
        let raw = tokio::fs::read_to_string(&self.token_file)
            .await
            .with_context(|| format!("failed to read token file {}", self.token_file.display()))?;
        let stored: StoredToken =
            serde_json::from_str(&raw).context("token file is not a Google OAuth token")?;
        Ok(stored.token)
    }
}

#[async_trait]
impl CalendarProvider for GoogleCalendar {
    async fn create_event(&self, event: &EventRequest) -> anyhow::Result<CreatedEvent> {
        let token = self.access_token().await?;
        let url = format!("{}/calendars/{}/events", CALENDAR_API_BASE_URL, self.calendar_id);

        let resp = self
            .client
            .post(url)
            .bearer_auth(token)
            .query(&[("conferenceDataVersion", "1"), ("sendUpdates", "all")])
            .json(&event_body(event))
            .send()
            .await
            .context("failed to call Google Calendar API")?;

        let status = resp.status();
        let data: Value = resp
            .json()
            .await
            .context("failed to parse Google Calendar response")?;

        if !status.is_success() {
            anyhow::bail!("Google Calendar API error ({}): {}", status, data["error"]["message"]);
        }

        let id = data["id"].as_str().unwrap_or_default().to_string();
        tracing::info!(
            event_id = %id,
            start = data["start"]["dateTime"].as_str().unwrap_or_default(),
            "calendar event created"
        );
        let conference_url = conference_url(&data)
            .ok_or_else(|| anyhow::anyhow!("calendar event {id} was created without a conference link"))?;

        Ok(CreatedEvent { id, conference_url })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> EventRequest {
        EventRequest {
            summary: "Keerok <> Vincent".to_string(),
            description: None,
            start: DateTime::parse_from_rfc3339("2025-03-15T14:00:00+01:00").unwrap(),
            end: DateTime::parse_from_rfc3339("2025-03-15T15:00:00+01:00").unwrap(),
            time_zone: "Europe/Paris".to_string(),
            attendee_email: "vincent@keerok.tech".to_string(),
            request_id: "meeting-test-123".to_string(),
        }
    }

    #[test]
    fn test_event_body() {
        let body = event_body(&request());
        assert_eq!(body["summary"], "Keerok <> Vincent");
        assert_eq!(body["start"]["dateTime"], "2025-03-15T14:00:00+01:00");
        assert_eq!(body["end"]["dateTime"], "2025-03-15T15:00:00+01:00");
        assert_eq!(body["start"]["timeZone"], "Europe/Paris");
        assert_eq!(
            body["conferenceData"]["createRequest"]["conferenceSolutionKey"]["type"],
            "hangoutsMeet"
        );
        assert_eq!(body["conferenceData"]["createRequest"]["requestId"], "meeting-test-123");
        assert_eq!(body["attendees"][0]["email"], "vincent@keerok.tech");
        assert!(body.get("description").is_none());
    }

    #[test]
    fn test_event_body_with_description() {
        let mut req = request();
        req.description = Some("Quarterly review".to_string());
        assert_eq!(event_body(&req)["description"], "Quarterly review");
    }

    #[test]
    fn test_conference_url_sources() {
        let event = json!({ "hangoutLink": "https://meet.google.com/abc" });
        assert_eq!(conference_url(&event).as_deref(), Some("https://meet.google.com/abc"));

        let event = json!({
            "conferenceData": { "entryPoints": [
                { "entryPointType": "phone", "uri": "tel:+33-1" },
                { "entryPointType": "video", "uri": "https://meet.google.com/xyz" }
            ]}
        });
        assert_eq!(conference_url(&event).as_deref(), Some("https://meet.google.com/xyz"));

        assert_eq!(conference_url(&json!({ "id": "evt" })), None);
    }

    #[test]
    fn test_stored_token_accepts_both_names() {
        let t: StoredToken = serde_json::from_str(r#"{"token":"ya29.a"}"#).unwrap();
        assert_eq!(t.token, "ya29.a");
        let t: StoredToken = serde_json::from_str(r#"{"access_token":"ya29.b","refresh_token":"r"}"#).unwrap();
        assert_eq!(t.token, "ya29.b");
    }
}
