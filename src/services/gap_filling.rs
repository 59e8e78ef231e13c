use chrono_tz::Tz;

use crate::errors::AppError;
use crate::i18n::{message, MessageKey};
use crate::models::{Field, Locale, MeetingDraft};
use crate::services::ai::intent::normalize_datetime;
use crate::services::operator::Operator;
use crate::services::resolver::derive_company_name;
use crate::services::validation::is_valid_address;

/// Solicit order: the default title needs the address.
const FILL_ORDER: [Field; 3] = [Field::AttendeeEmail, Field::Datetime, Field::Title];

/// Asks the operator for each missing required field, in the request's
/// locale. Waits as long as the operator takes; only a closed input ends
/// the exchange early.
pub async fn fill_missing(
    draft: &mut MeetingDraft,
    missing: &[Field],
    locale: Locale,
    tz: Tz,
    operator: &dyn Operator,
) -> Result<(), AppError> {
    for field in FILL_ORDER.into_iter().filter(|f| missing.contains(f)) {
        let filled = match field {
            Field::AttendeeEmail => ask_address(locale, operator).await,
            Field::Datetime => ask_start(locale, tz, operator).await,
            Field::Title => ask_title(draft, locale, operator).await,
        };

        match filled {
            Ok(value) => {
                tracing::info!(field = field.as_str(), value = %value, "operator supplied field");
                match field {
                    Field::AttendeeEmail => draft.attendee_email = Some(value),
                    Field::Datetime => draft.datetime = Some(value),
                    Field::Title => draft.title = Some(value),
                }
            }
            Err(e) => {
                tracing::warn!(error = %format!("{e:#}"), "operator input ended");
                let fields = draft.missing_fields();
                let names: Vec<&str> = fields.iter().map(Field::as_str).collect();
                let detail = format!(
                    "{} ({})",
                    names.join(", "),
                    message(locale, MessageKey::InputClosed, &[])
                );
                return Err(AppError::Validation {
                    message: message(locale, MessageKey::ValidationFailed, &[("fields", &detail)]),
                    fields,
                });
            }
        }
    }
    Ok(())
}

async fn ask_address(locale: Locale, operator: &dyn Operator) -> anyhow::Result<String> {
    let prompt = message(locale, MessageKey::PromptAttendeeEmail, &[]);
    loop {
        let answer = operator.ask(&prompt).await?;
        if is_valid_address(&answer) {
            return Ok(answer);
        }
        operator
            .say(&message(locale, MessageKey::InvalidEmail, &[]))
            .await;
    }
}

async fn ask_start(locale: Locale, tz: Tz, operator: &dyn Operator) -> anyhow::Result<String> {
    let prompt = message(locale, MessageKey::PromptDatetime, &[]);
    loop {
        let answer = operator.ask(&prompt).await?;
        if let Some(start) = normalize_datetime(&answer, tz) {
            return Ok(start.to_rfc3339());
        }
        operator
            .say(&message(locale, MessageKey::InvalidDatetime, &[]))
            .await;
    }
}

async fn ask_title(
    draft: &MeetingDraft,
    locale: Locale,
    operator: &dyn Operator,
) -> anyhow::Result<String> {
    let answer = operator
        .ask(&message(locale, MessageKey::PromptTitle, &[]))
        .await?;
    if !answer.is_empty() {
        return Ok(answer);
    }

    let company = draft
        .company_hint()
        .map(str::to_string)
        .or_else(|| draft.value_of(Field::AttendeeEmail).map(derive_company_name))
        .unwrap_or_default();
    Ok(message(locale, MessageKey::DefaultTitle, &[("company", &company)]))
}

#[cfg(test)]
mod tests {
    use chrono_tz::Europe::Paris;

    use super::*;
    use crate::services::operator::ScriptedOperator;

    #[tokio::test]
    async fn test_address_reprompted_until_valid() {
        let mut draft = MeetingDraft {
            title: Some("Sync".to_string()),
            datetime: Some("2024-06-11T14:30:00+02:00".to_string()),
            ..Default::default()
        };
        let operator = ScriptedOperator::new(["nope", "still@nope", "vincent@keerok.tech"]);

        fill_missing(&mut draft, &[Field::AttendeeEmail], Locale::En, Paris, &operator)
            .await
            .unwrap();

        assert_eq!(draft.attendee_email.as_deref(), Some("vincent@keerok.tech"));
        let transcript = operator.transcript();
        assert_eq!(
            transcript
                .iter()
                .filter(|l| l.as_str() == "Invalid email format. Please try again.")
                .count(),
            2
        );
    }

    #[tokio::test]
    async fn test_empty_title_gets_localized_default() {
        let mut draft = MeetingDraft {
            datetime: Some("2024-06-11T14:30:00+02:00".to_string()),
            attendee_email: Some("vincent@keerok.tech".to_string()),
            ..Default::default()
        };
        let operator = ScriptedOperator::new([""]);

        fill_missing(&mut draft, &[Field::Title], Locale::Fr, Paris, &operator)
            .await
            .unwrap();

        assert_eq!(draft.title.as_deref(), Some("Réunion avec Keerok"));
        assert_eq!(operator.transcript(), vec!["Quel est le titre de la réunion ? "]);
    }

    #[tokio::test]
    async fn test_default_title_uses_derived_address_filled_first() {
        let mut draft = MeetingDraft {
            datetime: Some("2024-06-11T14:30:00+02:00".to_string()),
            ..Default::default()
        };
        let operator = ScriptedOperator::new(["jo@bigcorp.io", ""]);

        fill_missing(
            &mut draft,
            &[Field::Title, Field::AttendeeEmail],
            Locale::En,
            Paris,
            &operator,
        )
        .await
        .unwrap();

        assert_eq!(draft.title.as_deref(), Some("Meeting with Bigcorp"));
    }

    #[tokio::test]
    async fn test_start_prompt_keeps_wall_clock() {
        let mut draft = MeetingDraft::default();
        let operator = ScriptedOperator::new(["jo@bigcorp.io", "demain", "2024-06-11 14:30", "Kickoff"]);

        fill_missing(
            &mut draft,
            &[Field::Title, Field::Datetime, Field::AttendeeEmail],
            Locale::Fr,
            Paris,
            &operator,
        )
        .await
        .unwrap();

        assert_eq!(draft.datetime.as_deref(), Some("2024-06-11T14:30:00+02:00"));
        assert_eq!(draft.title.as_deref(), Some("Kickoff"));
        assert!(operator
            .transcript()
            .contains(&"Date ou heure invalide. Utilisez le format AAAA-MM-JJ HH:MM.".to_string()));
    }

    #[tokio::test]
    async fn test_closed_input_names_remaining_fields() {
        let mut draft = MeetingDraft::default();
        let operator = ScriptedOperator::new(["jo@bigcorp.io"]);

        let err = fill_missing(
            &mut draft,
            &[Field::Title, Field::Datetime, Field::AttendeeEmail],
            Locale::En,
            Paris,
            &operator,
        )
        .await
        .unwrap_err();

        assert_eq!(err.fields(), &[Field::Title, Field::Datetime]);
        assert!(err.to_string().contains("input closed"));
    }
}
