//! Operator-facing message catalog.
//!
//! Every prompt, notice and error prefix is looked up here by
//! `(locale, key)` and rendered with named `{placeholders}`.

use crate::models::{CounterpartyKind, Locale};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKey {
    Banner,
    PromptAttendeeEmail,
    PromptDatetime,
    PromptTitle,
    InvalidEmail,
    InvalidDatetime,
    DefaultTitle,
    ExtractionDefaultTitle,
    SuggestCreate,
    SuggestReason,
    ConfirmCreate,
    AskKind,
    CreationFailed,
    KindCustomer,
    KindLead,
    ValidationFailed,
    ExtractionFailed,
    CommitFailed,
    PartialCommitWarning,
    UnlinkedConferenceWarning,
    InputClosed,
    ResultSuccess,
    ResultConferenceLink,
    ResultPageId,
    ResultDetails,
    ResultCounterpartyFound,
    ResultCounterpartyCreated,
    ResultCounterpartyMissing,
}

fn template(locale: Locale, key: MessageKey) -> &'static str {
    use MessageKey::*;
    match (locale, key) {
        (Locale::En, Banner) => "Please describe the meeting you want to schedule (in English or French):",
        (Locale::Fr, Banner) => "Veuillez décrire la réunion que vous souhaitez planifier (en anglais ou en français) :",

        (Locale::En, PromptAttendeeEmail) => "What is the attendee's email? ",
        (Locale::Fr, PromptAttendeeEmail) => "Quel est l'email du participant ? ",
        (Locale::En, PromptDatetime) => "When should the meeting start? (YYYY-MM-DD HH:MM) ",
        (Locale::Fr, PromptDatetime) => "Quand la réunion doit-elle commencer ? (AAAA-MM-JJ HH:MM) ",
        (Locale::En, PromptTitle) => "What is the meeting title? ",
        (Locale::Fr, PromptTitle) => "Quel est le titre de la réunion ? ",
        (Locale::En, InvalidEmail) => "Invalid email format. Please try again.",
        (Locale::Fr, InvalidEmail) => "Format d'email invalide. Veuillez réessayer.",
        (Locale::En, InvalidDatetime) => "Invalid date or time. Please use YYYY-MM-DD HH:MM.",
        (Locale::Fr, InvalidDatetime) => "Date ou heure invalide. Utilisez le format AAAA-MM-JJ HH:MM.",
        (Locale::En, DefaultTitle) => "Meeting with {company}",
        (Locale::Fr, DefaultTitle) => "Réunion avec {company}",
        (Locale::En, ExtractionDefaultTitle) => "Meeting",
        (Locale::Fr, ExtractionDefaultTitle) => "Réunion",

        (Locale::En, SuggestCreate) => "Suggestion to create a new {kind}: {company}",
        (Locale::Fr, SuggestCreate) => "Suggestion de créer un nouveau {kind} : {company}",
        (Locale::En, SuggestReason) => "Reason: {reason}",
        (Locale::Fr, SuggestReason) => "Raison : {reason}",
        (Locale::En, ConfirmCreate) => "Would you like to create the entry? (yes/no): ",
        (Locale::Fr, ConfirmCreate) => "Voulez-vous créer l'entrée ? (oui/non) : ",
        (Locale::En, AskKind) => "Is this a customer or a lead? (customer/lead): ",
        (Locale::Fr, AskKind) => "Est-ce un client ou un lead ? (client/lead) : ",
        (Locale::En, CreationFailed) => "Could not create the {kind} entry for {company}; the meeting will not be linked to it.",
        (Locale::Fr, CreationFailed) => "Impossible de créer l'entrée {kind} pour {company} ; la réunion ne lui sera pas liée.",
        (Locale::En, KindCustomer) => "customer",
        (Locale::Fr, KindCustomer) => "client",
        (Locale::En, KindLead) => "lead",
        (Locale::Fr, KindLead) => "lead",

        (Locale::En, ValidationFailed) => "Missing or invalid meeting information: {fields}",
        (Locale::Fr, ValidationFailed) => "Informations de réunion manquantes ou invalides : {fields}",
        (Locale::En, ExtractionFailed) => "Error parsing meeting request: {detail}",
        (Locale::Fr, ExtractionFailed) => "Erreur lors de l'analyse de la demande : {detail}",
        (Locale::En, CommitFailed) => "Error creating meeting entries ({stage}): {detail}",
        (Locale::Fr, CommitFailed) => "Erreur lors de la création des entrées ({stage}) : {detail}",
        (Locale::En, PartialCommitWarning) => "The calendar event {event} exists but is not linked to a records page; please reconcile it manually.",
        (Locale::Fr, PartialCommitWarning) => "L'événement {event} existe mais n'est lié à aucune page ; veuillez le rapprocher manuellement.",
        (Locale::En, UnlinkedConferenceWarning) => "The calendar event {event} and records page {page} exist but the page has no conference link; please add {url} manually.",
        (Locale::Fr, UnlinkedConferenceWarning) => "L'événement {event} et la page {page} existent mais la page n'a pas de lien de visioconférence ; veuillez ajouter {url} manuellement.",
        (Locale::En, InputClosed) => "input closed before all information was provided",
        (Locale::Fr, InputClosed) => "saisie interrompue avant la fin",

        (Locale::En, ResultSuccess) => "Meeting scheduled successfully!",
        (Locale::Fr, ResultSuccess) => "Réunion planifiée avec succès !",
        (Locale::En, ResultConferenceLink) => "Google Meet link: {url}",
        (Locale::Fr, ResultConferenceLink) => "Lien Google Meet : {url}",
        (Locale::En, ResultPageId) => "Notion page ID: {id}",
        (Locale::Fr, ResultPageId) => "ID de la page Notion : {id}",
        (Locale::En, ResultDetails) => "Meeting details:",
        (Locale::Fr, ResultDetails) => "Détails de la réunion :",
        (Locale::En, ResultCounterpartyFound) => "Company found in {kind} database!",
        (Locale::Fr, ResultCounterpartyFound) => "Entreprise trouvée dans la base de données {kind} !",
        (Locale::En, ResultCounterpartyCreated) => "New {kind} entry created: {company}",
        (Locale::Fr, ResultCounterpartyCreated) => "Nouvelle entrée {kind} créée : {company}",
        (Locale::En, ResultCounterpartyMissing) => "Warning: Company not found in databases",
        (Locale::Fr, ResultCounterpartyMissing) => "Attention : Entreprise non trouvée dans les bases de données",
    }
}

/// Renders `key` in `locale`, replacing each `{name}` with its value.
pub fn message(locale: Locale, key: MessageKey, params: &[(&str, &str)]) -> String {
    params
        .iter()
        .fold(template(locale, key).to_string(), |text, (name, value)| {
            text.replace(&format!("{{{name}}}"), value)
        })
}

pub fn kind_label(locale: Locale, kind: CounterpartyKind) -> String {
    let key = match kind {
        CounterpartyKind::Customer => MessageKey::KindCustomer,
        CounterpartyKind::Lead => MessageKey::KindLead,
    };
    message(locale, key, &[])
}
