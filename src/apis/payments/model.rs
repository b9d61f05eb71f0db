use crate::{
    apis::{
        consents::{Amount, Pcr},
        refunds::Refund,
    },
    pollable::{Classify, PollStatus, ResourceKind},
    Error,
};
use chrono::{DateTime, Utc};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Request to make a payment against an authorised consent.
#[derive(Serialize, Deserialize, Builder, Debug, Clone, PartialEq, Eq)]
#[builder(setter(into))]
pub struct PaymentRequest {
    pub consent_id: String,
    /// Required for enduring consents: amount and references of this particular payment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into, strip_option))]
    pub enduring_payment: Option<EnduringPaymentRequest>,
    /// Merchant reference used to link the payment to an account.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into, strip_option))]
    pub account_reference_id: Option<String>,
}

impl PaymentRequest {
    pub fn validate(&self) -> Result<(), Error> {
        if self.consent_id.trim().is_empty() {
            return Err(Error::InvalidValue(
                "Consent ID must not be blank".to_string(),
            ));
        }
        if let Some(ref enduring_payment) = self.enduring_payment {
            enduring_payment.amount.validate()?;
            enduring_payment.pcr.validate()?;
        }

        Ok(())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct EnduringPaymentRequest {
    pub amount: Amount,
    pub pcr: Pcr,
}

/// Returned when a payment has been created.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PaymentResponse {
    pub payment_id: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    Single,
    Enduring,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Pending,
    AcceptedSettlementInProcess,
    AcceptedSettlementCompleted,
    Rejected,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Payment {
    pub payment_id: String,
    #[serde(rename = "type")]
    pub payment_type: PaymentType,
    pub status: PaymentStatus,
    pub creation_timestamp: DateTime<Utc>,
    pub status_updated_timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accepted_timestamp: Option<DateTime<Utc>>,
    pub detail: PaymentRequest,
    #[serde(default)]
    pub refunds: Vec<Refund>,
}

impl Classify for Payment {
    const KIND: ResourceKind = ResourceKind::Payment;

    fn poll_status(&self) -> PollStatus {
        match self.status {
            PaymentStatus::AcceptedSettlementCompleted => PollStatus::Success,
            PaymentStatus::Rejected => PollStatus::Rejected {
                status: "Rejected".to_string(),
            },
            PaymentStatus::Pending | PaymentStatus::AcceptedSettlementInProcess => {
                PollStatus::Pending
            }
        }
    }
}
