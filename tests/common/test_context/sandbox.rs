use crate::common::MockBankAction;
use blink_debit::{BlinkDebitClient, Environment};

pub struct TestContext {
    pub client: BlinkDebitClient,
}

impl TestContext {
    pub async fn start() -> Self {
        // Take the credentials and the sandbox URL from the BLINKPAY_* env variables
        let client = BlinkDebitClient::from_env().unwrap();

        Self { client }
    }

    pub fn environment(&self) -> Environment {
        std::env::var("BLINKPAY_DEBIT_URL")
            .ok()
            .and_then(|url| url::Url::parse(&url).ok())
            .map(|url| Environment::from_single_url(&url))
            .unwrap_or(Environment::Sandbox)
    }

    pub async fn complete_mock_bank_authorisation(
        &self,
        _consent_id: &str,
        _action: MockBankAction,
    ) -> Result<(), anyhow::Error> {
        // Redirect flows need a browser session with the bank, only decoupled flows
        // against the PNZ sandbox complete on their own.
        Err(anyhow::anyhow!(
            "Redirect authorisation cannot be automated against the sandbox"
        ))
    }
}
