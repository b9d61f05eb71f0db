
use crate::common::MockBankAction;
use anyhow::Context;
use blink_debit::apis::{
    consents::{AuthFlowDetail, Consent, ConsentDetail, ConsentStatus},
    payments::{Payment, PaymentRequest, PaymentStatus, PaymentType},
    refunds::Refund,
};
use chrono::Utc;
use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};
use url::Url;
use uuid::Uuid;
use wiremock::{
    matchers::{header, header_exists, method, path, path_regex},
    Mock, MockServer, Request, Respond, ResponseTemplate,
};

static MOCK_REDIRECT_URI: &str = "https://mock.redirect.uri";
static MOCK_ACCESS_TOKEN_PREFIX: &str = "mock-access-token";

/// Number of status checks after which the mock bank approves a decoupled consent.
const DECOUPLED_APPROVAL_POLLS: u32 = 2;

struct MockServerConfiguration {
    client_id: String,
    client_secret: String,
    access_token: String,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum ConsentKind {
    Single,
    Enduring,
    QuickPayment,
}

struct StoredConsent {
    kind: ConsentKind,
    consent: Consent,
    polls: u32,
}

#[derive(Default)]
struct MockServerStorage {
    consents: HashMap<String, StoredConsent>,
    payments: HashMap<String, Payment>,
    refunds: HashMap<String, Refund>,
}

struct MockServerStateInner {
    configuration: MockServerConfiguration,
    storage: RwLock<MockServerStorage>,
}

/// State shared by all the routes of a mock server.
type MockServerState = Arc<MockServerStateInner>;

/// Binds a route handler to the shared mock server state.
struct Route {
    state: MockServerState,
    handler: fn(&MockServerStateInner, &Request) -> ResponseTemplate,
}

impl Respond for Route {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        (self.handler)(&self.state, request)
    }
}

/// In-memory mock of the Blink Debit APIs used in local integration tests.
pub struct BlinkMockServer {
    server: MockServer,
    state: MockServerState,
}

impl BlinkMockServer {
    pub async fn start(client_id: &str, client_secret: &str) -> Self {
        let server = MockServer::start().await;
        let state = Arc::new(MockServerStateInner {
            configuration: MockServerConfiguration {
                client_id: client_id.to_string(),
                client_secret: client_secret.to_string(),
                access_token: format!("{}-{}", MOCK_ACCESS_TOKEN_PREFIX, Uuid::new_v4()),
            },
            storage: RwLock::new(MockServerStorage::default()),
        });
        let bearer = format!("Bearer {}", state.configuration.access_token);
        let route = |handler: Handler| Route {
            state: state.clone(),
            handler,
        };

        Mock::given(method("POST"))
            .and(path("/oauth2/token"))
            .respond_with(route(routes::post_token))
            .mount(&server)
            .await;

        for (resource, kind) in [
            ("single-consents", ConsentKind::Single),
            ("enduring-consents", ConsentKind::Enduring),
            ("quick-payments", ConsentKind::QuickPayment),
        ] {
            let collection = format!("/payments/v1/{}", resource);
            let item = format!("^/payments/v1/{}/[^/]+$", resource);
            let (create, get, revoke): (Handler, Handler, Handler) = match kind {
                ConsentKind::Single => (
                    routes::create_single_consent,
                    routes::get_single_consent,
                    routes::revoke_single_consent,
                ),
                ConsentKind::Enduring => (
                    routes::create_enduring_consent,
                    routes::get_enduring_consent,
                    routes::revoke_enduring_consent,
                ),
                ConsentKind::QuickPayment => (
                    routes::create_quick_payment,
                    routes::get_quick_payment,
                    routes::revoke_quick_payment,
                ),
            };

            Mock::given(method("POST"))
                .and(path(collection.as_str()))
                .and(header("authorization", bearer.as_str()))
                .and(header_exists("idempotency-key"))
                .respond_with(route(create))
                .mount(&server)
                .await;
            Mock::given(method("GET"))
                .and(path_regex(item.as_str()))
                .and(header("authorization", bearer.as_str()))
                .respond_with(route(get))
                .mount(&server)
                .await;
            Mock::given(method("DELETE"))
                .and(path_regex(item.as_str()))
                .and(header("authorization", bearer.as_str()))
                .respond_with(route(revoke))
                .mount(&server)
                .await;
        }

        Mock::given(method("POST"))
            .and(path("/payments/v1/payments"))
            .and(header("authorization", bearer.as_str()))
            .and(header_exists("idempotency-key"))
            .respond_with(route(routes::create_payment))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path_regex("^/payments/v1/payments/[^/]+$"))
            .and(header("authorization", bearer.as_str()))
            .respond_with(route(routes::get_payment))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/payments/v1/refunds"))
            .and(header("authorization", bearer.as_str()))
            .and(header_exists("idempotency-key"))
            .respond_with(route(routes::create_refund))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path_regex("^/payments/v1/refunds/[^/]+$"))
            .and(header("authorization", bearer.as_str()))
            .respond_with(route(routes::get_refund))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/payments/v1/meta"))
            .and(header("authorization", bearer.as_str()))
            .respond_with(route(routes::get_meta))
            .mount(&server)
            .await;

        Self { server, state }
    }

    pub fn url(&self) -> Url {
        Url::parse(&self.server.uri()).unwrap()
    }

    /// Simulates the customer acting on the bank authorisation page of a consent.
    pub fn complete_mock_bank_authorisation(
        &self,
        consent_id: &str,
        action: MockBankAction,
    ) -> Result<(), anyhow::Error> {
        let mut storage = self.state.storage.write().unwrap();
        let stored = storage
            .consents
            .get(consent_id)
            .context("Consent not found")?;

        if stored.consent.status != ConsentStatus::AwaitingAuthorisation {
            return Err(anyhow::anyhow!(
                "Consent is {:?}, not awaiting authorisation",
                stored.consent.status
            ));
        }

        match action {
            MockBankAction::Authorise => storage.authorise(consent_id),
            MockBankAction::Reject => {
                if let Some(stored) = storage.consents.get_mut(consent_id) {
                    stored.consent.status = ConsentStatus::Rejected;
                    stored.consent.status_updated_timestamp = Utc::now();
                }
            }
        }

        Ok(())
    }
}

type Handler = fn(&MockServerStateInner, &Request) -> ResponseTemplate;

impl MockServerStorage {
    /// Authorises a consent. Quick payments are paid straight away and end up consumed.
    fn authorise(&mut self, consent_id: &str) {
        let payment = match self.consents.get_mut(consent_id) {
            Some(stored) if stored.kind == ConsentKind::QuickPayment => {
                let payment = new_payment(
                    PaymentRequest {
                        consent_id: consent_id.to_string(),
                        enduring_payment: None,
                        account_reference_id: None,
                    },
                    PaymentType::Single,
                    PaymentStatus::AcceptedSettlementCompleted,
                );
                stored.consent.status = ConsentStatus::Consumed;
                stored.consent.status_updated_timestamp = Utc::now();
                stored.consent.payments.push(payment.clone());
                Some(payment)
            }
            Some(stored) => {
                stored.consent.status = ConsentStatus::Authorised;
                stored.consent.status_updated_timestamp = Utc::now();
                None
            }
            None => None,
        };

        if let Some(payment) = payment {
            self.payments.insert(payment.payment_id.clone(), payment);
        }
    }
}

fn is_decoupled(consent: &Consent) -> bool {
    let flow = match consent.detail {
        ConsentDetail::Single(ref detail) => &detail.flow,
        ConsentDetail::Enduring(ref detail) => &detail.flow,
    };

    matches!(flow.detail, AuthFlowDetail::Decoupled(_))
}

fn new_payment(detail: PaymentRequest, payment_type: PaymentType, status: PaymentStatus) -> Payment {
    let now = Utc::now();

    Payment {
        payment_id: Uuid::new_v4().to_string(),
        payment_type,
        status,
        creation_timestamp: now,
        status_updated_timestamp: now,
        accepted_timestamp: (status == PaymentStatus::AcceptedSettlementCompleted).then(|| now),
        detail,
        refunds: Vec::new(),
    }
}
