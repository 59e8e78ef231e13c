use whatlang::Lang;

use crate::models::Locale;

const FRENCH_MARKERS: &[&str] = &[
    "réunion", "reunion", "demain", "avec", "rendez-vous", "rdv", "à", "le", "la", "les",
    "pour", "heure", "heures", "aujourd'hui", "lundi", "mardi", "mercredi", "jeudi",
    "vendredi", "matin", "après-midi", "soir", "planifier", "prévoir", "entre", "nous",
];

const ENGLISH_MARKERS: &[&str] = &[
    "meeting", "tomorrow", "with", "at", "the", "schedule", "call", "today", "monday",
    "tuesday", "wednesday", "thursday", "friday", "morning", "afternoon", "evening",
    "for", "book", "set", "up", "pm", "am", "minutes",
];

/// Classifies an utterance as `en` or `fr`. Never fails: anything the
/// detector cannot place ends up as `en`.
pub fn detect_locale(text: &str) -> Locale {
    let text = text.trim();
    if text.is_empty() {
        return Locale::En;
    }

    if let Some(locale) = marker_vote(text) {
        tracing::debug!(locale = %locale, "language decided by marker words");
        return locale;
    }

    match whatlang::detect(text) {
        Some(info) => {
            let locale = coerce(info.lang());
            tracing::debug!(
                detected = info.lang().code(),
                confidence = info.confidence(),
                locale = %locale,
                "language detected"
            );
            locale
        }
        None => {
            tracing::debug!("language detection inconclusive, defaulting to en");
            Locale::En
        }
    }
}

/// Maps an arbitrary detected language onto the nearest supported locale.
pub fn coerce(lang: Lang) -> Locale {
    match lang {
        Lang::Fra | Lang::Ita | Lang::Spa | Lang::Por | Lang::Cat | Lang::Ron => Locale::Fr,
        _ => Locale::En,
    }
}

fn marker_vote(text: &str) -> Option<Locale> {
    let lowered = text.to_lowercase();
    let words: Vec<&str> = lowered
        .split(|c: char| c.is_whitespace() || matches!(c, ',' | '.' | '!' | '?' | ';' | ':'))
        .filter(|w| !w.is_empty() && !w.contains('@'))
        .collect();

    let french = words.iter().filter(|w| FRENCH_MARKERS.contains(w)).count();
    let english = words.iter().filter(|w| ENGLISH_MARKERS.contains(w)).count();

    // Accented letters are a strong hint that English text lacks.
    let accents = lowered.chars().any(|c| "éèêàçùâîôû".contains(c));
    let french = french + usize::from(accents);

    if french >= english + 2 || (french > 0 && english == 0) {
        Some(Locale::Fr)
    } else if english >= french + 2 || (english > 0 && french == 0) {
        Some(Locale::En)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_french_request() {
        assert_eq!(
            detect_locale("Réunion demain à 14h30 avec vincent@keerok.tech"),
            Locale::Fr
        );
    }

    #[test]
    fn test_english_request() {
        assert_eq!(
            detect_locale("schedule a meeting tomorrow at 14h30 with x@y.com"),
            Locale::En
        );
    }

    #[test]
    fn test_empty_and_garbled_fall_back_to_en() {
        assert_eq!(detect_locale(""), Locale::En);
        assert_eq!(detect_locale("   "), Locale::En);
        assert_eq!(detect_locale("1234 5678"), Locale::En);
    }

    #[test]
    fn test_coerce_unsupported_languages() {
        assert_eq!(coerce(Lang::Fra), Locale::Fr);
        assert_eq!(coerce(Lang::Spa), Locale::Fr);
        assert_eq!(coerce(Lang::Deu), Locale::En);
        assert_eq!(coerce(Lang::Jpn), Locale::En);
        assert_eq!(coerce(Lang::Eng), Locale::En);
    }
}
