use crate::config::{MatchStrictness, NewCounterpartyPolicy};
use crate::errors::AppError;
use crate::i18n::{kind_label, message, MessageKey};
use crate::models::{CounterpartyKind, CounterpartyRecord, Locale, MeetingIntent, ResolutionOutcome};
use crate::services::ai::decision::SuggestionSource;
use crate::services::operator::Operator;
use crate::services::records::RecordsStore;

/// Stores are searched in this order; the first hit wins.
const SEARCH_ORDER: [CounterpartyKind; 2] = [CounterpartyKind::Customer, CounterpartyKind::Lead];

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn domain_of(address: &str) -> &str {
    address
        .rsplit_once('@')
        .map(|(_, domain)| domain)
        .unwrap_or(address)
        .trim()
}

/// Company name guessed from the address: the label left of the domain's
/// first dot, capitalized (`vincent@keerok.tech` gives `Keerok`).
pub fn derive_company_name(address: &str) -> String {
    let domain = domain_of(address);
    capitalize(domain.split('.').next().unwrap_or(domain))
}

/// The explicit company hint, else the name derived from the address.
pub fn candidate_name(intent: &MeetingIntent) -> String {
    intent
        .company_name_hint
        .clone()
        .unwrap_or_else(|| derive_company_name(&intent.attendee_email))
}

/// Spellings a record title is matched against. Duplicates are dropped, order
/// is stable.
pub fn name_variants(candidate: &str, address: &str) -> Vec<String> {
    let domain = domain_of(address);
    let mut variants: Vec<String> = Vec::with_capacity(5);
    for variant in [
        candidate.to_string(),
        candidate.to_lowercase(),
        candidate.to_uppercase(),
        derive_company_name(address),
        capitalize(domain),
    ] {
        if !variant.is_empty() && !variants.contains(&variant) {
            variants.push(variant);
        }
    }
    variants
}

fn matches_strictly(record: &CounterpartyRecord, variants: &[String]) -> bool {
    record.display_name.as_deref().is_some_and(|name| {
        let name = name.trim().to_lowercase();
        variants.iter().any(|v| v.to_lowercase() == name)
    })
}

pub struct CounterpartyResolver<'a> {
    pub records: &'a dyn RecordsStore,
    pub suggestions: &'a dyn SuggestionSource,
    pub strictness: MatchStrictness,
    pub policy: NewCounterpartyPolicy,
}

impl CounterpartyResolver<'_> {
    /// Finds the attendee's organization among customers then leads, and in
    /// interactive sessions may create it. Never fails: every error along the
    /// way degrades to "no counterparty".
    pub async fn resolve(
        &self,
        intent: &MeetingIntent,
        locale: Locale,
        operator: &dyn Operator,
    ) -> ResolutionOutcome {
        let candidate = candidate_name(intent);
        let variants = name_variants(&candidate, &intent.attendee_email);
        tracing::info!(candidate = %candidate, variants = ?variants, "searching counterparty");

        if let Some(record) = self.lookup(&variants).await {
            return ResolutionOutcome::found(record);
        }
        tracing::warn!(variants = ?variants, "counterparty not found in any store");

        if !operator.is_interactive() {
            return ResolutionOutcome::not_found();
        }

        match self.offer_creation(&candidate, intent, locale, operator).await {
            Some(record) => ResolutionOutcome::created(record),
            None => ResolutionOutcome::not_found(),
        }
    }

    async fn lookup(&self, variants: &[String]) -> Option<CounterpartyRecord> {
        for kind in SEARCH_ORDER {
            let records = match self.records.search(kind, variants).await {
                Ok(records) => records,
                Err(e) => {
                    tracing::error!(kind = kind.as_str(), error = %format!("{e:#}"), "counterparty search failed");
                    continue;
                }
            };

            let hit = records.into_iter().find(|record| match self.strictness {
                MatchStrictness::Substring => true,
                MatchStrictness::Exact => matches_strictly(record, variants),
            });
            if let Some(record) = hit {
                tracing::info!(
                    kind = kind.as_str(),
                    record_id = %record.record_id,
                    name = record.display_name.as_deref().unwrap_or_default(),
                    "counterparty found"
                );
                return Some(record);
            }
        }
        None
    }

    /// Decision service first, then the operator's explicit consent.
    async fn offer_creation(
        &self,
        candidate: &str,
        intent: &MeetingIntent,
        locale: Locale,
        operator: &dyn Operator,
    ) -> Option<CounterpartyRecord> {
        let recommendation = match self
            .suggestions
            .recommend(candidate, &intent.attendee_email)
            .await
        {
            Ok(rec) => rec,
            Err(e) => {
                tracing::error!(error = %format!("{e:#}"), "company creation decision failed");
                return None;
            }
        };
        tracing::info!(
            should_create = recommendation.should_create,
            reason = %recommendation.reason,
            suggested_type = recommendation.suggested_type.as_str(),
            "company creation recommendation"
        );
        if !recommendation.should_create {
            return None;
        }

        let suggested = kind_label(locale, recommendation.suggested_type);
        operator
            .say(&message(
                locale,
                MessageKey::SuggestCreate,
                &[("kind", &suggested), ("company", candidate)],
            ))
            .await;
        operator
            .say(&message(
                locale,
                MessageKey::SuggestReason,
                &[("reason", &recommendation.reason)],
            ))
            .await;

        match operator
            .confirm(&message(locale, MessageKey::ConfirmCreate, &[]))
            .await
        {
            Ok(true) => {}
            Ok(false) => {
                tracing::info!(candidate, "operator declined company creation");
                return None;
            }
            Err(e) => {
                tracing::warn!(error = %format!("{e:#}"), "no confirmation for company creation");
                return None;
            }
        }

        let kind = match self.policy {
            NewCounterpartyPolicy::Suggested => recommendation.suggested_type,
            NewCounterpartyPolicy::Always(kind) => kind,
            NewCounterpartyPolicy::Ask => operator
                .ask(&message(locale, MessageKey::AskKind, &[]))
                .await
                .ok()
                .and_then(|answer| CounterpartyKind::parse(&answer))
                .unwrap_or(CounterpartyKind::Lead),
        };

        match self.create(kind, candidate).await {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::error!(error = %e, "company creation failed");
                operator
                    .say(&message(
                        locale,
                        MessageKey::CreationFailed,
                        &[("kind", &kind_label(locale, kind)), ("company", candidate)],
                    ))
                    .await;
                None
            }
        }
    }

    async fn create(&self, kind: CounterpartyKind, name: &str) -> Result<CounterpartyRecord, AppError> {
        let record = self
            .records
            .create_counterparty(kind, name)
            .await
            .map_err(|e| AppError::Resolution(format!("creating {} {name}: {e:#}", kind.as_str())))?;
        tracing::info!(kind = kind.as_str(), record_id = %record.record_id, name, "created counterparty");
        Ok(record)
    }
}
