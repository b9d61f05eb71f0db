use crate::{
    apis::consents::{Amount, AuthFlow, Consent, Pcr},
    pollable::{Classify, PollStatus, ResourceKind},
    Error,
};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Request to create a quick payment: a single consent that is paid as soon as it is authorised.
#[derive(Serialize, Deserialize, Builder, Debug, Clone, PartialEq, Eq)]
#[builder(setter(into))]
pub struct QuickPaymentRequest {
    pub flow: AuthFlow,
    pub pcr: Pcr,
    pub amount: Amount,
}

impl QuickPaymentRequest {
    pub fn validate(&self) -> Result<(), Error> {
        self.amount.validate()?;
        self.pcr.validate()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CreateQuickPaymentResponse {
    pub quick_payment_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_uri: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct QuickPaymentResponse {
    pub quick_payment_id: String,
    pub consent: Consent,
}

impl Classify for QuickPaymentResponse {
    const KIND: ResourceKind = ResourceKind::QuickPayment;

    fn poll_status(&self) -> PollStatus {
        self.consent.poll_status()
    }
}
