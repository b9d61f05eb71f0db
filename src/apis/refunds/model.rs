use crate::{
    apis::consents::{Amount, Pcr},
    Error,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The kind of refund to make for a payment.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RefundDetail {
    /// Only retrieves the account number of the payer, so the merchant can refund them manually.
    AccountNumber { payment_id: String },
    /// Refunds the whole payment through a new consent from the merchant.
    FullRefund {
        payment_id: String,
        consent_redirect: String,
        pcr: Pcr,
    },
    /// Refunds part of the payment through a new consent from the merchant.
    PartialRefund {
        payment_id: String,
        consent_redirect: String,
        pcr: Pcr,
        amount: Amount,
    },
}

impl RefundDetail {
    pub fn payment_id(&self) -> &str {
        match self {
            RefundDetail::AccountNumber { payment_id }
            | RefundDetail::FullRefund { payment_id, .. }
            | RefundDetail::PartialRefund { payment_id, .. } => payment_id,
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.payment_id().trim().is_empty() {
            return Err(Error::InvalidValue(
                "Payment ID must not be blank".to_string(),
            ));
        }

        match self {
            RefundDetail::AccountNumber { .. } => Ok(()),
            RefundDetail::FullRefund { pcr, .. } => pcr.validate(),
            RefundDetail::PartialRefund { pcr, amount, .. } => {
                pcr.validate()?;
                amount.validate()
            }
        }
    }
}

/// Returned when a refund has been requested.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RefundResponse {
    pub refund_id: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefundStatus {
    Processing,
    Completed,
    Failed,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Refund {
    pub refund_id: String,
    pub status: RefundStatus,
    pub creation_timestamp: DateTime<Utc>,
    pub status_updated_timestamp: DateTime<Utc>,
    /// Payer account number, present once an account number refund has completed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_number: Option<String>,
    pub detail: RefundDetail,
}
