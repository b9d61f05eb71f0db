use crate::{
    apis::{
        consents::{Consent, CreateConsentResponse, SingleConsentRequest},
        require_id, BlinkDebitClientInner, BlinkResponse,
    },
    pollable::{await_terminal, PollMode, PollOptions},
    Error, RequestHeaders,
};
use std::sync::Arc;
use urlencoding::encode;

/// Blink Debit single consents APIs client.
///
/// A single consent authorises exactly one payment.
#[derive(Clone, Debug)]
pub struct SingleConsentsApi {
    inner: Arc<BlinkDebitClientInner>,
}

impl SingleConsentsApi {
    pub(crate) fn new(inner: Arc<BlinkDebitClientInner>) -> Self {
        Self { inner }
    }

    /// Creates a new single consent.
    pub async fn create(
        &self,
        request: &SingleConsentRequest,
        headers: &RequestHeaders,
    ) -> Result<CreateConsentResponse, Error> {
        Ok(self.create_response(request, headers).await?.data)
    }

    /// Creates a new single consent, returning the HTTP metadata alongside it.
    #[tracing::instrument(
        name = "Create Single Consent",
        skip(self, request, headers),
        fields(amount = %request.amount.total, currency = %request.amount.currency)
    )]
    pub async fn create_response(
        &self,
        request: &SingleConsentRequest,
        headers: &RequestHeaders,
    ) -> Result<BlinkResponse<CreateConsentResponse>, Error> {
        request.validate()?;

        let res = headers
            .apply(
                self.inner.client.post(self.inner.api_url("/single-consents")?),
                true,
            )
            .json(request)
            .send()
            .await?;

        BlinkResponse::from_json(res).await
    }

    /// Gets the details of an existing single consent.
    pub async fn get(&self, consent_id: &str, headers: &RequestHeaders) -> Result<Consent, Error> {
        Ok(self.get_response(consent_id, headers).await?.data)
    }

    #[tracing::instrument(name = "Get Single Consent", skip(self, headers))]
    pub async fn get_response(
        &self,
        consent_id: &str,
        headers: &RequestHeaders,
    ) -> Result<BlinkResponse<Consent>, Error> {
        require_id(consent_id, "Consent ID")?;

        let res = headers
            .apply(
                self.inner.client.get(
                    self.inner
                        .api_url(&format!("/single-consents/{}", encode(consent_id)))?,
                ),
                false,
            )
            .send()
            .await?;

        BlinkResponse::from_json(res).await
    }

    /// Revokes an existing single consent.
    pub async fn revoke(&self, consent_id: &str, headers: &RequestHeaders) -> Result<(), Error> {
        self.revoke_response(consent_id, headers).await?;
        Ok(())
    }

    #[tracing::instrument(name = "Revoke Single Consent", skip(self, headers))]
    pub async fn revoke_response(
        &self,
        consent_id: &str,
        headers: &RequestHeaders,
    ) -> Result<BlinkResponse<()>, Error> {
        require_id(consent_id, "Consent ID")?;

        let res = headers
            .apply(
                self.inner.client.delete(
                    self.inner
                        .api_url(&format!("/single-consents/{}", encode(consent_id)))?,
                ),
                false,
            )
            .send()
            .await?;

        Ok(BlinkResponse::empty(res))
    }

    /// Polls a single consent until it is authorised or consumed.
    ///
    /// The consent is revoked if it is still pending when the client gives up waiting.
    #[tracing::instrument(name = "Await Authorised Single Consent", skip(self, options))]
    pub async fn await_authorised(
        &self,
        consent_id: &str,
        options: PollOptions,
        mode: PollMode,
    ) -> Result<Consent, Error> {
        require_id(consent_id, "Consent ID")?;
        let headers = RequestHeaders::default();

        await_terminal(
            consent_id,
            options,
            mode,
            || self.get(consent_id, &headers),
            Some(Box::pin(self.revoke(consent_id, &headers))),
        )
        .await
    }
}
