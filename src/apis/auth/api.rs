use crate::{
    apis::{auth::AccessToken, BlinkDebitClientInner},
    Error,
};
use std::sync::Arc;

/// Blink Debit authentication API client.
#[derive(Debug, Clone)]
pub struct AuthApi {
    inner: Arc<BlinkDebitClientInner>,
}

impl AuthApi {
    pub(crate) fn new(inner: Arc<BlinkDebitClientInner>) -> Self {
        Self { inner }
    }

    /// Returns the current [`AccessToken`](crate::apis::auth::AccessToken) used to authenticate to the Blink Debit APIs.
    /// If the client is not authenticated yet, or the token is about to expire, a new authentication request
    /// using the configured credentials will be fired.
    pub async fn get_access_token(&self) -> Result<AccessToken, Error> {
        self.inner.authenticator.get_access_token(false).await
    }

    /// Discards the current access token and requests a new one.
    pub async fn refresh_access_token(&self) -> Result<AccessToken, Error> {
        self.inner.authenticator.get_access_token(true).await
    }
}
