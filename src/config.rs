use std::env;

use chrono_tz::Tz;

use crate::errors::AppError;
use crate::models::CounterpartyKind;

/// How loosely a record title has to match a name variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum MatchStrictness {
    /// Title contains any variant, as the records store filters.
    #[default]
    Substring,
    /// Title equals a variant, ignoring case.
    Exact,
}

impl MatchStrictness {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "substring" | "contains" => Some(MatchStrictness::Substring),
            "exact" => Some(MatchStrictness::Exact),
            _ => None,
        }
    }
}

/// Which store a newly created counterparty goes to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum NewCounterpartyPolicy {
    /// Follow the decision service's `suggested_type`.
    #[default]
    Suggested,
    /// Ask the operator customer or lead.
    Ask,
    Always(CounterpartyKind),
}

impl NewCounterpartyPolicy {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "suggested" => Some(NewCounterpartyPolicy::Suggested),
            "ask" => Some(NewCounterpartyPolicy::Ask),
            other => CounterpartyKind::parse(other).map(NewCounterpartyPolicy::Always),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LlmBackend {
    Anthropic,
    Groq,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub api_token: Option<String>,
    pub llm_backend: LlmBackend,
    pub llm_api_key: String,
    pub llm_model: Option<String>,
    pub notion_api_key: String,
    pub meetings_database_id: String,
    pub customers_database_id: String,
    pub leads_database_id: String,
    pub template_page_id: String,
    pub google_token_file: String,
    pub calendar_id: String,
    pub timezone: Tz,
    pub operator_name: String,
    pub match_strictness: MatchStrictness,
    pub new_counterparty_policy: NewCounterpartyPolicy,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup, reporting every missing
    /// required key at once.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut missing: Vec<&str> = Vec::new();
        let mut required = |key: &'static str| {
            get(key).unwrap_or_else(|| {
                missing.push(key);
                String::new()
            })
        };

        let llm_backend = match get("LLM_PROVIDER").as_deref() {
            Some("groq") => LlmBackend::Groq,
            _ => LlmBackend::Anthropic,
        };
        let llm_api_key = match llm_backend {
            LlmBackend::Groq => required("GROQ_API_KEY"),
            LlmBackend::Anthropic => required("ANTHROPIC_API_KEY"),
        };
        let notion_api_key = required("NOTION_API_KEY");
        let meetings_database_id = required("NOTION_DATABASE_ID");
        let customers_database_id = required("NOTION_CUSTOMERS_DATABASE_ID");
        let leads_database_id = required("NOTION_LEADS_DATABASE_ID");
        let template_page_id = required("NOTION_TEMPLATE_PAGE_ID");
        let google_token_file = required("GOOGLE_TOKEN_FILE");
        let timezone_name = required("OPERATING_TIMEZONE");

        if !missing.is_empty() {
            return Err(AppError::Config(format!(
                "missing required environment variables: {}",
                missing.join(", ")
            )));
        }

        let timezone: Tz = timezone_name.parse().map_err(|_| {
            AppError::Config(format!("OPERATING_TIMEZONE is not a known timezone: {timezone_name}"))
        })?;

        let match_strictness = match get("MATCH_STRICTNESS") {
            Some(raw) => MatchStrictness::parse(&raw)
                .ok_or_else(|| AppError::Config(format!("invalid MATCH_STRICTNESS: {raw}")))?,
            None => MatchStrictness::default(),
        };
        let new_counterparty_policy = match get("NEW_COUNTERPARTY_KIND") {
            Some(raw) => NewCounterpartyPolicy::parse(&raw)
                .ok_or_else(|| AppError::Config(format!("invalid NEW_COUNTERPARTY_KIND: {raw}")))?,
            None => NewCounterpartyPolicy::default(),
        };

        Ok(Self {
            port: get("PORT").and_then(|v| v.parse().ok()).unwrap_or(3000),
            api_token: get("API_TOKEN"),
            llm_backend,
            llm_api_key,
            llm_model: get("LLM_MODEL"),
            notion_api_key,
            meetings_database_id,
            customers_database_id,
            leads_database_id,
            template_page_id,
            google_token_file,
            calendar_id: get("GOOGLE_CALENDAR_ID").unwrap_or_else(|| "primary".to_string()),
            timezone,
            operator_name: get("OPERATOR_NAME").unwrap_or_else(|| "Organizer".to_string()),
            match_strictness,
            new_counterparty_policy,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn full_env() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("ANTHROPIC_API_KEY", "sk-test"),
            ("NOTION_API_KEY", "secret_test"),
            ("NOTION_DATABASE_ID", "meetings"),
            ("NOTION_CUSTOMERS_DATABASE_ID", "customers"),
            ("NOTION_LEADS_DATABASE_ID", "leads"),
            ("NOTION_TEMPLATE_PAGE_ID", "template"),
            ("GOOGLE_TOKEN_FILE", "token.json"),
            ("OPERATING_TIMEZONE", "Europe/Paris"),
        ])
    }

    fn load(env: &HashMap<&'static str, &'static str>) -> Result<AppConfig, AppError> {
        AppConfig::from_lookup(|key| env.get(key).map(|v| v.to_string()))
    }

    #[test]
    fn test_defaults() {
        let config = load(&full_env()).unwrap();
        assert_eq!(config.llm_backend, LlmBackend::Anthropic);
        assert_eq!(config.timezone, chrono_tz::Europe::Paris);
        assert_eq!(config.calendar_id, "primary");
        assert_eq!(config.port, 3000);
        assert_eq!(config.match_strictness, MatchStrictness::Substring);
        assert_eq!(config.new_counterparty_policy, NewCounterpartyPolicy::Suggested);
        assert!(config.api_token.is_none());
    }

    #[test]
    fn test_every_missing_key_is_named() {
        let mut env = full_env();
        env.remove("NOTION_LEADS_DATABASE_ID");
        env.remove("OPERATING_TIMEZONE");
        let err = load(&env).unwrap_err().to_string();
        assert!(err.contains("NOTION_LEADS_DATABASE_ID"));
        assert!(err.contains("OPERATING_TIMEZONE"));
    }

    #[test]
    fn test_groq_requires_its_own_key() {
        let mut env = full_env();
        env.insert("LLM_PROVIDER", "groq");
        let err = load(&env).unwrap_err().to_string();
        assert!(err.contains("GROQ_API_KEY"));
    }

    #[test]
    fn test_unknown_timezone_rejected() {
        let mut env = full_env();
        env.insert("OPERATING_TIMEZONE", "Mars/Olympus");
        assert!(matches!(load(&env), Err(AppError::Config(_))));
    }

    #[test]
    fn test_policy_knobs() {
        let mut env = full_env();
        env.insert("MATCH_STRICTNESS", "exact");
        env.insert("NEW_COUNTERPARTY_KIND", "customer");
        let config = load(&env).unwrap();
        assert_eq!(config.match_strictness, MatchStrictness::Exact);
        assert_eq!(
            config.new_counterparty_policy,
            NewCounterpartyPolicy::Always(CounterpartyKind::Customer)
        );
    }
}
