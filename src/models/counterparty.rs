use serde::{Deserialize, Serialize};

/// Which records store a counterparty lives in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CounterpartyKind {
    Customer,
    Lead,
}

impl CounterpartyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CounterpartyKind::Customer => "customer",
            CounterpartyKind::Lead => "lead",
        }
    }

    /// Accepts the English and French words an operator or model may use.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "customer" | "client" | "c" => Some(CounterpartyKind::Customer),
            "lead" | "prospect" | "l" => Some(CounterpartyKind::Lead),
            _ => None,
        }
    }
}

/// Reference to an existing (or just created) customer or lead record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CounterpartyRecord {
    pub kind: CounterpartyKind,
    pub record_id: String,
    /// Title of the record; `None` when the record's title property is malformed.
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolutionOutcome {
    pub record: Option<CounterpartyRecord>,
    pub created_new: bool,
}

impl ResolutionOutcome {
    pub fn not_found() -> Self {
        Self::default()
    }

    pub fn found(record: CounterpartyRecord) -> Self {
        Self {
            record: Some(record),
            created_new: false,
        }
    }

    pub fn created(record: CounterpartyRecord) -> Self {
        Self {
            record: Some(record),
            created_new: true,
        }
    }
}

/// Decision service answer on whether an unknown company deserves a record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreationRecommendation {
    pub should_create: bool,
    #[serde(default)]
    pub reason: String,
    #[serde(default = "default_suggested_type", deserialize_with = "deserialize_kind")]
    pub suggested_type: CounterpartyKind,
}

fn default_suggested_type() -> CounterpartyKind {
    CounterpartyKind::Lead
}

fn deserialize_kind<'de, D>(deserializer: D) -> Result<CounterpartyKind, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .as_deref()
        .and_then(CounterpartyKind::parse)
        .unwrap_or(CounterpartyKind::Lead))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kind_bilingual() {
        assert_eq!(CounterpartyKind::parse("Client"), Some(CounterpartyKind::Customer));
        assert_eq!(CounterpartyKind::parse(" lead "), Some(CounterpartyKind::Lead));
        assert_eq!(CounterpartyKind::parse("partner"), None);
    }

    #[test]
    fn test_recommendation_unknown_type_defaults_to_lead() {
        let rec: CreationRecommendation = serde_json::from_str(
            r#"{"should_create":true,"reason":"business domain","suggested_type":"prospect-ish"}"#,
        )
        .unwrap();
        assert!(rec.should_create);
        assert_eq!(rec.suggested_type, CounterpartyKind::Lead);

        let rec: CreationRecommendation =
            serde_json::from_str(r#"{"should_create":false}"#).unwrap();
        assert_eq!(rec.suggested_type, CounterpartyKind::Lead);
        assert_eq!(rec.reason, "");
    }
}
