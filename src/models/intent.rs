use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

pub const DEFAULT_DURATION_MINUTES: u32 = 30;

/// Best-effort meeting description as returned by the extraction service.
///
/// Keys mirror the JSON schema given to the language model. Every field may be
/// missing; `datetime` is kept as text until the validator parses it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MeetingDraft {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub datetime: Option<String>,
    #[serde(default, deserialize_with = "lenient_minutes")]
    pub duration: Option<i64>,
    #[serde(default)]
    pub attendee_email: Option<String>,
    #[serde(default)]
    pub company_name: Option<String>,
}

impl MeetingDraft {
    pub fn value_of(&self, field: Field) -> Option<&str> {
        let value = match field {
            Field::Title => self.title.as_deref(),
            Field::Datetime => self.datetime.as_deref(),
            Field::AttendeeEmail => self.attendee_email.as_deref(),
        };
        value.map(str::trim).filter(|v| !v.is_empty())
    }

    /// Required fields that are absent or blank, in canonical order.
    pub fn missing_fields(&self) -> Vec<Field> {
        Field::REQUIRED
            .into_iter()
            .filter(|f| self.value_of(*f).is_none())
            .collect()
    }

    /// Explicit company hint, ignoring blank strings the model sometimes emits.
    pub fn company_hint(&self) -> Option<&str> {
        self.company_name
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }
}

/// Accepts `30`, `30.0` or `"30"`; anything else counts as unspecified.
fn lenient_minutes<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Required meeting fields, named after the extraction schema keys.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Title,
    Datetime,
    AttendeeEmail,
}

impl Field {
    pub const REQUIRED: [Field; 3] = [Field::Title, Field::Datetime, Field::AttendeeEmail];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Datetime => "datetime",
            Field::AttendeeEmail => "attendee_email",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A complete, validated meeting request.
///
/// `start` keeps the offset it was written with: 14:30 stays 14:30.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MeetingIntent {
    pub title: String,
    pub description: Option<String>,
    pub start: DateTime<FixedOffset>,
    pub duration_minutes: u32,
    pub attendee_email: String,
    pub company_name_hint: Option<String>,
}

impl MeetingIntent {
    pub fn end(&self) -> DateTime<FixedOffset> {
        self.start + chrono::Duration::minutes(i64::from(self.duration_minutes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_treats_blank_as_missing() {
        let draft = MeetingDraft {
            title: Some("  ".to_string()),
            datetime: Some("2024-06-11T14:30:00+02:00".to_string()),
            ..Default::default()
        };
        assert_eq!(draft.missing_fields(), vec![Field::Title, Field::AttendeeEmail]);
    }

    #[test]
    fn test_duration_accepts_strings() {
        let draft: MeetingDraft = serde_json::from_str(r#"{"duration":"45"}"#).unwrap();
        assert_eq!(draft.duration, Some(45));
        let draft: MeetingDraft = serde_json::from_str(r#"{"duration":"about an hour"}"#).unwrap();
        assert_eq!(draft.duration, None);
        let draft: MeetingDraft = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(draft.duration, None);
    }
}
