//! Clients for the various Blink Debit APIs.

use crate::{authenticator::Authenticator, client::Environment, common::API_BASE_PATH, Error};
use reqwest::{header::HeaderMap, StatusCode, Url};
use reqwest_middleware::ClientWithMiddleware;
use serde::de::DeserializeOwned;
use std::fmt::{Debug, Formatter};

pub mod auth;
pub mod consents;
pub mod enduring_consents;
pub mod metadata;
pub mod payments;
pub mod quick_payments;
pub mod refunds;
pub mod single_consents;

pub(crate) struct BlinkDebitClientInner {
    pub(crate) client: ClientWithMiddleware,
    pub(crate) authenticator: Authenticator,
    pub(crate) environment: Environment,
}

impl BlinkDebitClientInner {
    /// Full URL of an endpoint under the payments API base path.
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        self.environment
            .endpoint_url(&format!("{}{}", API_BASE_PATH, path))
    }
}

impl Debug for BlinkDebitClientInner {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlinkDebitClientInner")
            .field("environment", &self.environment)
            .finish_non_exhaustive()
    }
}

/// A successful response together with its HTTP metadata.
#[derive(Debug, Clone)]
pub struct BlinkResponse<T> {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub data: T,
}

impl<T> BlinkResponse<T> {
    /// Discards the HTTP metadata.
    pub fn into_data(self) -> T {
        self.data
    }
}

impl<T: DeserializeOwned> BlinkResponse<T> {
    pub(crate) async fn from_json(response: reqwest::Response) -> Result<Self, Error> {
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        Ok(Self {
            status,
            headers,
            data: serde_json::from_slice(&body)?,
        })
    }
}

impl BlinkResponse<()> {
    pub(crate) fn empty(response: reqwest::Response) -> Self {
        Self {
            status: response.status(),
            headers: response.headers().clone(),
            data: (),
        }
    }
}

/// Fails with [`Error::InvalidValue`] if a required identifier is blank.
pub(crate) fn require_id(value: &str, name: &str) -> Result<(), Error> {
    if value.trim().is_empty() {
        return Err(Error::InvalidValue(format!("{} must not be blank", name)));
    }

    Ok(())
}
