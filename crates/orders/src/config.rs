use model::env::{
    DEFAULT_EMAIL_SENDER, DEFAULT_NOTIFY_CONCURRENCY, DEFAULT_ORDER_INDEX, EMAIL_SENDER,
    NOTIFY_CONCURRENCY, ORDER_INDEX, ORDER_TABLE, RENEWAL_BASE_URL,
};
use std::fmt::{Display, Formatter};

/// Settings shared by every order function, read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrdersConfig {
    pub table_name: String,
    pub index_name: String,
    pub renewal_base_url: Option<String>,
    pub email_sender: String,
    pub notify_concurrency: usize,
}

impl OrdersConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|variable| std::env::var(variable).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let value = |variable: &str| lookup(variable).filter(|value| !value.trim().is_empty());

        let table_name: String = value(ORDER_TABLE).ok_or(ConfigError::Missing(ORDER_TABLE))?;

        let notify_concurrency: usize = match value(NOTIFY_CONCURRENCY) {
            None => DEFAULT_NOTIFY_CONCURRENCY,
            Some(raw) => match raw.parse::<usize>() {
                Ok(limit) if limit > 0 => limit,
                _ => return Err(ConfigError::Invalid(NOTIFY_CONCURRENCY, raw)),
            },
        };

        Ok(OrdersConfig {
            table_name,
            index_name: value(ORDER_INDEX).unwrap_or_else(|| DEFAULT_ORDER_INDEX.to_string()),
            renewal_base_url: value(RENEWAL_BASE_URL),
            email_sender: value(EMAIL_SENDER).unwrap_or_else(|| DEFAULT_EMAIL_SENDER.to_string()),
            notify_concurrency,
        })
    }

    /// Only the notifier builds renewal links, so only it requires a base URL.
    pub fn require_renewal_base_url(&self) -> Result<&str, ConfigError> {
        self.renewal_base_url
            .as_deref()
            .ok_or(ConfigError::Missing(RENEWAL_BASE_URL))
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str, String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Missing(variable) => {
                write!(f, "Missing {} environment variable", variable)
            }
            ConfigError::Invalid(variable, value) => {
                write!(f, "Invalid value {:?} for {} environment variable", value, variable)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
