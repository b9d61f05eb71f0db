//! Client configuration read from the environment.

use crate::{apis::auth::Token, common::DEFAULT_SANDBOX_URL, Error};
use serde::Deserialize;

/// Settings needed to build a [`BlinkDebitClient`](crate::BlinkDebitClient).
///
/// [`from_env`](BlinkPayConfig::from_env) reads the following variables:
///
/// | Variable | Field | Default |
/// |---|---|---|
/// | `BLINKPAY_DEBIT_URL` | `debit_url` | the sandbox URL |
/// | `BLINKPAY_CLIENT_ID` | `client_id` | required |
/// | `BLINKPAY_CLIENT_SECRET` | `client_secret` | required |
/// | `BLINKPAY_TIMEOUT` | `timeout_secs` | `10` |
/// | `BLINKPAY_RETRY_ENABLED` | `retry_enabled` | `true` |
#[derive(Deserialize, Debug, Clone)]
pub struct BlinkPayConfig {
    #[serde(default = "default_debit_url")]
    pub debit_url: String,
    pub client_id: String,
    pub client_secret: Token,
    #[serde(rename = "timeout", default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_retry_enabled")]
    pub retry_enabled: bool,
}

impl BlinkPayConfig {
    /// Creates a configuration with the given credentials and default settings.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<Token>) -> Self {
        Self {
            debit_url: default_debit_url(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            timeout_secs: default_timeout_secs(),
            retry_enabled: default_retry_enabled(),
        }
    }

    /// Reads the configuration from `BLINKPAY_*` environment variables.
    pub fn from_env() -> Result<Self, Error> {
        ::config::Config::builder()
            .add_source(::config::Environment::with_prefix("BLINKPAY").try_parsing(true))
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| Error::InvalidValue(format!("Invalid Blink Debit configuration: {}", e)))
    }
}

fn default_debit_url() -> String {
    DEFAULT_SANDBOX_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_retry_enabled() -> bool {
    true
}
