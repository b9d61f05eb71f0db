use crate::apis::consents::{Amount, Bank, IdentifierType};
use serde::{Deserialize, Serialize};

/// Capabilities of a bank supported by Blink Debit.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BankMetadata {
    pub name: Bank,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_limit: Option<Amount>,
    pub features: BankMetadataFeatures,
    pub redirect_flow: BankMetadataRedirectFlow,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct BankMetadataFeatures {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enduring_consent: Option<EnduringConsentFeature>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decoupled_flow: Option<DecoupledFlowFeature>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct EnduringConsentFeature {
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consent_indicator: Option<bool>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DecoupledFlowFeature {
    pub enabled: bool,
    #[serde(default)]
    pub available_identifiers: Vec<AvailableIdentifier>,
    /// ISO 8601 duration, e.g. `PT10M`.
    pub request_timeout: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AvailableIdentifier {
    #[serde(rename = "type")]
    pub identifier_type: IdentifierType,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BankMetadataRedirectFlow {
    pub enabled: bool,
    /// ISO 8601 duration, e.g. `PT10M`.
    pub request_timeout: String,
}
