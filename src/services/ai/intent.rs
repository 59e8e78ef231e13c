use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime, Offset, TimeZone};
use chrono_tz::Tz;

use crate::errors::AppError;
use crate::i18n::{message, MessageKey};
use crate::models::{Locale, MeetingDraft, DEFAULT_DURATION_MINUTES};
use crate::services::ai::{parse_json_reply, LlmProvider, Message};

const NAIVE_FORMATS: [&str; 5] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

const SYSTEM_PROMPT: &str = r#"You are a bilingual (French/English) meeting scheduler assistant. Extract the following information from the meeting request:
- Meeting title / Titre de la réunion
- Description/agenda / Description/ordre du jour
- Date and time / Date et heure
- Duration (in minutes) / Durée (en minutes)
- Attendee email / Email du participant
- Company name (if specified explicitly) / Nom de l'entreprise (si spécifié explicitement)

Return ONLY valid JSON (no markdown, no explanation) with these exact keys:
title, description, datetime, duration, attendee_email, company_name

Rules:
- If no explicit title is given, set title to "{default_title}"
- If the company name is not explicitly specified, set company_name to null. Never guess it from the email.
- If duration is not specified, set it to {default_duration}
- Extract email addresses even if they are at the end of the sentence
- Use null for anything you cannot find
"#;

/// Builds the extraction instructions, pinning relative dates to `now` and
/// literal times to the operating timezone.
pub fn build_extraction_prompt(locale: Locale, now: &DateTime<Tz>) -> String {
    let tz = now.timezone();
    let tomorrow = now.date_naive() + Duration::days(1);
    let example_start = tomorrow
        .and_hms_opt(14, 30, 0)
        .and_then(|naive| attach_offset(naive, tz));
    let example_datetime = example_start
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| format!("{tomorrow}T14:30:00"));
    let offset = example_start
        .map(|dt| dt.format("%:z").to_string())
        .unwrap_or_default();

    let default_title = message(locale, MessageKey::ExtractionDefaultTitle, &[]);
    let rules = SYSTEM_PROMPT
        .replace("{default_title}", &default_title)
        .replace("{default_duration}", &DEFAULT_DURATION_MINUTES.to_string());

    format!(
        r#"{rules}
Time handling:
- Current time in {tz_name}: {now}
- For "tomorrow"/"demain", use this date: {tomorrow}
- Return datetime in ISO 8601 format with the {tz_name} offset (e.g. {offset})
- Times must be EXACTLY as specified, with NO adjustments:
  * "14h30" means exactly 14:30 {tz_name} time
  * "9h" means exactly 09:00 {tz_name} time
  * "2pm" means exactly 14:00 {tz_name} time
- DO NOT perform any timezone conversion

Example:
Input: "Réunion demain à 14h30 avec vincent@keerok.tech"
Output: {{"title": "Réunion", "description": null, "datetime": "{example_datetime}", "duration": {default_duration}, "attendee_email": "vincent@keerok.tech", "company_name": null}}
"#,
        tz_name = tz.name(),
        now = now.format("%Y-%m-%d %H:%M:%S %Z"),
        default_duration = DEFAULT_DURATION_MINUTES,
    )
}

/// Asks the language service for a meeting draft. The returned draft's
/// `datetime`, when present, always carries an explicit offset.
pub async fn extract_intent(
    llm: &dyn LlmProvider,
    utterance: &str,
    locale: Locale,
    now: DateTime<Tz>,
) -> Result<MeetingDraft, AppError> {
    let system = build_extraction_prompt(locale, &now);

    let response = llm
        .chat(&system, &[Message::user(utterance)])
        .await
        .map_err(|e| extraction_error(locale, &format!("{e:#}")))?;
    tracing::info!(response = %response, "extraction response");

    let mut draft = parse_json_reply::<MeetingDraft>(&response)
        .ok_or_else(|| extraction_error(locale, "response is not a JSON meeting object"))?;

    draft.datetime = match draft.datetime.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => {
            let start = normalize_datetime(raw, now.timezone()).ok_or_else(|| {
                extraction_error(locale, &format!("unparseable datetime {raw:?}"))
            })?;
            tracing::info!(original = raw, processed = %start.to_rfc3339(), "normalized start");
            Some(start.to_rfc3339())
        }
        _ => None,
    };

    draft.duration = Some(match draft.duration {
        Some(minutes) if minutes > 0 => minutes,
        _ => i64::from(DEFAULT_DURATION_MINUTES),
    });

    Ok(draft)
}

/// Parses a timestamp, keeping any explicit offset untouched and attaching the
/// operating timezone's offset to naive wall-clock times.
pub fn normalize_datetime(raw: &str, tz: Tz) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z") {
        return Some(dt);
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .and_then(|naive| attach_offset(naive, tz))
}

/// Pins a wall-clock time to `tz` without moving it. Times skipped by a DST
/// jump keep their wall clock and take the offset in force just after the
/// jump (02:30 on a spring-forward night in Paris becomes 02:30+02:00).
pub fn attach_offset(naive: NaiveDateTime, tz: Tz) -> Option<DateTime<FixedOffset>> {
    let offset = match tz.offset_from_local_datetime(&naive).earliest() {
        Some(offset) => offset.fix(),
        None => tz.offset_from_utc_datetime(&naive).fix(),
    };
    offset.from_local_datetime(&naive).single()
}

fn extraction_error(locale: Locale, detail: &str) -> AppError {
    AppError::Extraction(message(
        locale,
        MessageKey::ExtractionFailed,
        &[("detail", detail)],
    ))
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::Timelike;
    use chrono_tz::Europe::Paris;

    use super::*;

    struct CannedLlm(&'static str);

    #[async_trait]
    impl LlmProvider for CannedLlm {
        async fn chat(&self, _system: &str, _messages: &[Message]) -> anyhow::Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct FailingLlm;

    #[async_trait]
    impl LlmProvider for FailingLlm {
        async fn chat(&self, _system: &str, _messages: &[Message]) -> anyhow::Result<String> {
            anyhow::bail!("connection reset")
        }
    }

    fn june_10() -> DateTime<Tz> {
        Paris.with_ymd_and_hms(2024, 6, 10, 9, 15, 0).unwrap()
    }

    #[test]
    fn test_prompt_pins_dates_and_defaults() {
        let prompt = build_extraction_prompt(Locale::Fr, &june_10());
        assert!(prompt.contains("use this date: 2024-06-11"));
        assert!(prompt.contains("2024-06-11T14:30:00+02:00"));
        assert!(prompt.contains("Current time in Europe/Paris: 2024-06-10 09:15:00"));
        assert!(prompt.contains(r#"set title to "Réunion""#));
        assert!(prompt.contains("set it to 30"));

        let prompt = build_extraction_prompt(Locale::En, &june_10());
        assert!(prompt.contains(r#"set title to "Meeting""#));
    }

    #[tokio::test]
    async fn test_extract_french_example() {
        let llm = CannedLlm(
            r#"{"title":"Réunion","description":null,"datetime":"2024-06-11T14:30:00+02:00","duration":30,"attendee_email":"vincent@keerok.tech","company_name":null}"#,
        );
        let draft = extract_intent(&llm, "Réunion demain à 14h30 avec vincent@keerok.tech", Locale::Fr, june_10())
            .await
            .unwrap();
        assert_eq!(draft.title.as_deref(), Some("Réunion"));
        assert_eq!(draft.datetime.as_deref(), Some("2024-06-11T14:30:00+02:00"));
        assert_eq!(draft.duration, Some(30));
        assert_eq!(draft.attendee_email.as_deref(), Some("vincent@keerok.tech"));
        assert_eq!(draft.company_name, None);
    }

    #[tokio::test]
    async fn test_naive_datetime_gets_operating_offset() {
        let llm = CannedLlm(
            r#"{"title":"Sync","datetime":"2024-06-11T14:30:00","attendee_email":"a@b.io"}"#,
        );
        let draft = extract_intent(&llm, "sync tomorrow 14h30 a@b.io", Locale::En, june_10())
            .await
            .unwrap();
        assert_eq!(draft.datetime.as_deref(), Some("2024-06-11T14:30:00+02:00"));
        assert_eq!(draft.duration, Some(30));
    }

    #[tokio::test]
    async fn test_missing_datetime_is_left_for_validation() {
        let llm = CannedLlm(r#"{"title":"Sync","datetime":null,"attendee_email":"a@b.io","duration":0}"#);
        let draft = extract_intent(&llm, "sync with a@b.io", Locale::En, june_10())
            .await
            .unwrap();
        assert_eq!(draft.datetime, None);
        assert_eq!(draft.duration, Some(30));
    }

    #[tokio::test]
    async fn test_unparseable_datetime_is_extraction_error() {
        let llm = CannedLlm(r#"{"title":"Sync","datetime":"next tuesday-ish","attendee_email":"a@b.io"}"#);
        let err = extract_intent(&llm, "sync", Locale::En, june_10()).await.unwrap_err();
        assert!(matches!(err, AppError::Extraction(_)));
        assert!(err.to_string().starts_with("Error parsing meeting request"));
    }

    #[tokio::test]
    async fn test_non_json_reply_is_localized_extraction_error() {
        let err = extract_intent(&CannedLlm("Désolé, je ne peux pas."), "rdv", Locale::Fr, june_10())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Extraction(_)));
        assert!(err.to_string().starts_with("Erreur lors de l'analyse de la demande"));
    }

    #[tokio::test]
    async fn test_transport_failure_is_extraction_error() {
        let err = extract_intent(&FailingLlm, "sync", Locale::En, june_10()).await.unwrap_err();
        assert!(err.to_string().contains("connection reset"));
    }

    #[test]
    fn test_literal_times_never_shift() {
        for (raw, hour, minute) in [
            ("2024-06-11T14:30:00+02:00", 14, 30),
            ("2024-06-11T14:30:00", 14, 30),
            ("2024-06-11 09:00", 9, 0),
            ("2024-06-11T16:45:00-05:00", 16, 45),
            ("2024-12-02T14:30", 14, 30),
        ] {
            let dt = normalize_datetime(raw, Paris).unwrap();
            assert_eq!((dt.hour(), dt.minute()), (hour, minute), "{raw}");
        }
    }

    #[test]
    fn test_winter_offset_attached() {
        let dt = normalize_datetime("2024-12-02T14:30", Paris).unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-12-02T14:30:00+01:00");
    }

    #[test]
    fn test_dst_gap_keeps_wall_clock() {
        // 02:30 does not exist in Paris on 2024-03-31.
        let naive = NaiveDateTime::parse_from_str("2024-03-31 02:30", "%Y-%m-%d %H:%M").unwrap();
        let dt = attach_offset(naive, Paris).unwrap();
        assert_eq!((dt.hour(), dt.minute()), (2, 30));
        assert_eq!(dt.offset().local_minus_utc(), 2 * 3600);
        assert_eq!(dt.to_rfc3339(), "2024-03-31T02:30:00+02:00");
    }
}
