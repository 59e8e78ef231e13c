use std::sync::OnceLock;

use chrono::DateTime;
use regex::Regex;

use crate::errors::AppError;
use crate::i18n::{message, MessageKey};
use crate::models::{Field, Locale, MeetingDraft, MeetingIntent, DEFAULT_DURATION_MINUTES};

fn address_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s.]+(\.[^@\s.]+)+$").unwrap())
}

/// `local@domain.tld` shape check; deliberately no deliverability rules.
pub fn is_valid_address(address: &str) -> bool {
    address_re().is_match(address.trim())
}

/// Checks presence, address syntax and timestamp, then builds the intent.
///
/// Every offending field is reported in a single error, in check order.
pub fn validate(draft: &MeetingDraft, locale: Locale) -> Result<MeetingIntent, AppError> {
    let mut fields = draft.missing_fields();
    let mut details: Vec<String> = fields.iter().map(|f| f.to_string()).collect();

    let attendee_email = draft.value_of(Field::AttendeeEmail);
    if let Some(address) = attendee_email {
        if !is_valid_address(address) {
            fields.push(Field::AttendeeEmail);
            details.push(format!("{} ({address})", Field::AttendeeEmail));
        }
    }

    let start = draft
        .value_of(Field::Datetime)
        .and_then(|raw| match DateTime::parse_from_rfc3339(raw) {
            Ok(start) => Some(start),
            Err(_) => {
                fields.push(Field::Datetime);
                details.push(format!("{} ({raw})", Field::Datetime));
                None
            }
        });

    let (Some(title), Some(start), Some(attendee_email), true) = (
        draft.value_of(Field::Title),
        start,
        attendee_email,
        fields.is_empty(),
    ) else {
        tracing::info!(fields = ?fields, "meeting draft failed validation");
        return Err(AppError::Validation {
            message: message(
                locale,
                MessageKey::ValidationFailed,
                &[("fields", &details.join(", "))],
            ),
            fields,
        });
    };

    let duration_minutes = draft
        .duration
        .and_then(|d| u32::try_from(d).ok())
        .filter(|d| *d > 0)
        .unwrap_or(DEFAULT_DURATION_MINUTES);

    Ok(MeetingIntent {
        title: title.to_string(),
        description: draft
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string),
        start,
        duration_minutes,
        attendee_email: attendee_email.to_string(),
        company_name_hint: draft.company_hint().map(str::to_string),
    })
}
