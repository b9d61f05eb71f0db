use crate::{
    apis::payments::Payment,
    pollable::{Classify, PollStatus, ResourceKind},
    Error,
};
use chrono::{DateTime, Utc};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length of each of the payer/payee reference fields.
pub const PCR_FIELD_MAX_LENGTH: usize = 12;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Currency {
    #[serde(rename = "NZD")]
    Nzd,
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Currency::Nzd => write!(f, "NZD"),
        }
    }
}

/// A monetary amount, expressed as a decimal string (e.g. `"1.25"`).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Amount {
    pub total: String,
    pub currency: Currency,
}

impl Amount {
    pub fn nzd(total: impl Into<String>) -> Self {
        Self {
            total: total.into(),
            currency: Currency::Nzd,
        }
    }

    /// Checks that the total is a positive decimal with at most two fractional digits.
    pub fn validate(&self) -> Result<(), Error> {
        let invalid = || {
            Error::InvalidValue(format!(
                "Amount total must be a positive decimal with at most two fractional digits, got '{}'",
                self.total
            ))
        };

        let (units, cents) = match self.total.split_once('.') {
            Some((units, cents)) => (units, cents),
            None => (self.total.as_str(), ""),
        };

        let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
        if units.is_empty() || !all_digits(units) || !all_digits(cents) || cents.len() > 2 {
            return Err(invalid());
        }
        if self.total.contains('.') && cents.is_empty() {
            return Err(invalid());
        }
        if units.chars().chain(cents.chars()).all(|c| c == '0') {
            return Err(invalid());
        }

        Ok(())
    }
}

/// Particulars, code and reference shown on the payer and payee bank statements.
#[derive(Serialize, Deserialize, Builder, Debug, Clone, PartialEq, Eq)]
#[builder(setter(into))]
pub struct Pcr {
    pub particulars: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into, strip_option))]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into, strip_option))]
    pub reference: Option<String>,
}

impl Pcr {
    pub fn new(particulars: impl Into<String>) -> Self {
        Self {
            particulars: particulars.into(),
            code: None,
            reference: None,
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.particulars.trim().is_empty() {
            return Err(Error::InvalidValue(
                "PCR particulars must not be blank".to_string(),
            ));
        }

        for (name, value) in [
            ("particulars", Some(&self.particulars)),
            ("code", self.code.as_ref()),
            ("reference", self.reference.as_ref()),
        ] {
            if let Some(value) = value {
                if value.chars().count() > PCR_FIELD_MAX_LENGTH {
                    return Err(Error::InvalidValue(format!(
                        "PCR {} must not exceed {} characters",
                        name, PCR_FIELD_MAX_LENGTH
                    )));
                }
            }
        }

        Ok(())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bank {
    #[serde(rename = "ANZ")]
    Anz,
    #[serde(rename = "ASB")]
    Asb,
    #[serde(rename = "BNZ")]
    Bnz,
    Kiwibank,
    #[serde(rename = "PNZ")]
    Pnz,
    Westpac,
}

/// How the customer is identified in a decoupled flow.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierType {
    PhoneNumber,
    ConsentId,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AuthFlow {
    pub detail: AuthFlowDetail,
}

impl From<AuthFlowDetail> for AuthFlow {
    fn from(detail: AuthFlowDetail) -> Self {
        Self { detail }
    }
}

/// The way the customer authorises a consent.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthFlowDetail {
    /// The customer is redirected to their bank.
    Redirect(RedirectFlow),
    /// The customer authorises the consent in their bank app, triggered by the merchant.
    Decoupled(DecoupledFlow),
    /// The customer picks their bank on a Blink hosted page.
    Gateway(GatewayFlow),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RedirectFlow {
    pub bank: Bank,
    pub redirect_uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_to_app: Option<bool>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DecoupledFlow {
    pub bank: Bank,
    pub identifier_type: IdentifierType,
    pub identifier_value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct GatewayFlow {
    pub redirect_uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow_hint: Option<FlowHint>,
}

/// Preselects the flow shown on the gateway page.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FlowHint {
    Redirect {
        bank: Bank,
    },
    Decoupled {
        bank: Bank,
        identifier_type: IdentifierType,
        identifier_value: String,
    },
}

/// Frequency of the amount limit of an enduring consent.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    Daily,
    Weekly,
    Fortnightly,
    Monthly,
    Annual,
}

/// Request to create a single consent.
#[derive(Serialize, Deserialize, Builder, Debug, Clone, PartialEq, Eq)]
#[builder(setter(into))]
pub struct SingleConsentRequest {
    pub flow: AuthFlow,
    pub pcr: Pcr,
    pub amount: Amount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into, strip_option))]
    pub hashed_customer_identifier: Option<String>,
}

impl SingleConsentRequest {
    pub fn validate(&self) -> Result<(), Error> {
        self.amount.validate()?;
        self.pcr.validate()
    }
}

/// Request to create an enduring consent.
#[derive(Serialize, Deserialize, Builder, Debug, Clone, PartialEq, Eq)]
#[builder(setter(into))]
pub struct EnduringConsentRequest {
    pub flow: AuthFlow,
    pub from_timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into, strip_option))]
    pub expiry_timestamp: Option<DateTime<Utc>>,
    pub period: Period,
    pub maximum_amount_period: Amount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into, strip_option))]
    pub maximum_amount_payment: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into, strip_option))]
    pub hashed_customer_identifier: Option<String>,
}

impl EnduringConsentRequest {
    pub fn validate(&self) -> Result<(), Error> {
        self.maximum_amount_period.validate()?;
        if let Some(ref amount) = self.maximum_amount_payment {
            amount.validate()?;
        }
        if let Some(expiry) = self.expiry_timestamp {
            if expiry <= self.from_timestamp {
                return Err(Error::InvalidValue(
                    "Expiry timestamp must be after the start timestamp".to_string(),
                ));
            }
        }

        Ok(())
    }
}

/// Returned when a consent has been created.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CreateConsentResponse {
    pub consent_id: String,
    /// Where to send the customer to authorise the consent. Absent for decoupled flows.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_uri: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsentStatus {
    GatewayTimeout,
    GatewayAwaitingSubmission,
    AwaitingAuthorisation,
    Authorised,
    Consumed,
    Rejected,
    Revoked,
}

/// What the customer consented to.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConsentDetail {
    Single(SingleConsentRequest),
    Enduring(EnduringConsentRequest),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Consent {
    pub consent_id: String,
    pub status: ConsentStatus,
    pub creation_timestamp: DateTime<Utc>,
    pub status_updated_timestamp: DateTime<Utc>,
    pub detail: ConsentDetail,
    #[serde(default)]
    pub payments: Vec<Payment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_network: Option<String>,
}

impl Classify for Consent {
    const KIND: ResourceKind = ResourceKind::Consent;

    fn poll_status(&self) -> PollStatus {
        match self.status {
            ConsentStatus::Authorised | ConsentStatus::Consumed => PollStatus::Success,
            ConsentStatus::Rejected | ConsentStatus::Revoked => PollStatus::Rejected {
                status: format!("{:?}", self.status),
            },
            ConsentStatus::GatewayTimeout => PollStatus::GatewayTimeout,
            ConsentStatus::AwaitingAuthorisation | ConsentStatus::GatewayAwaitingSubmission => {
                PollStatus::Pending
            }
        }
    }
}
