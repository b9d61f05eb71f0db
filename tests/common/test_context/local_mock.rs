use crate::common::{mock_server::BlinkMockServer, MockBankAction};
use blink_debit::{apis::auth::Credentials, BlinkDebitClient, Environment};
use uuid::Uuid;

pub struct TestContext {
    pub client: BlinkDebitClient,
    mock_server: BlinkMockServer,
}

impl TestContext {
    pub async fn start() -> Self {
        // Generate a new set of random credentials for this specific test
        let client_id = Uuid::new_v4().to_string();
        let client_secret = Uuid::new_v4().to_string();

        // Setup a new mock server
        let mock_server = BlinkMockServer::start(&client_id, &client_secret).await;

        // Configure a new BlinkDebitClient to point to the mock server
        let client = BlinkDebitClient::builder(Credentials::new(client_id, client_secret))
            .with_retry_policy(None) // Disable retries against the mock server
            .with_environment(Environment::from_single_url(&mock_server.url()))
            .build()
            .unwrap();

        Self {
            client,
            mock_server,
        }
    }

    pub fn environment(&self) -> Environment {
        Environment::from_single_url(&self.mock_server.url())
    }

    pub async fn complete_mock_bank_authorisation(
        &self,
        consent_id: &str,
        action: MockBankAction,
    ) -> Result<(), anyhow::Error> {
        self.mock_server
            .complete_mock_bank_authorisation(consent_id, action)
    }
}
