use crate::{
    apis::{
        consents::{Consent, CreateConsentResponse, EnduringConsentRequest},
        require_id, BlinkDebitClientInner, BlinkResponse,
    },
    pollable::{await_terminal, PollMode, PollOptions},
    Error, RequestHeaders,
};
use std::sync::Arc;
use urlencoding::encode;

/// Blink Debit enduring consents APIs client.
///
/// An enduring consent authorises recurring payments up to a maximum amount per period.
#[derive(Clone, Debug)]
pub struct EnduringConsentsApi {
    inner: Arc<BlinkDebitClientInner>,
}

impl EnduringConsentsApi {
    pub(crate) fn new(inner: Arc<BlinkDebitClientInner>) -> Self {
        Self { inner }
    }

    /// Creates a new enduring consent.
    pub async fn create(
        &self,
        request: &EnduringConsentRequest,
        headers: &RequestHeaders,
    ) -> Result<CreateConsentResponse, Error> {
        Ok(self.create_response(request, headers).await?.data)
    }

    #[tracing::instrument(
        name = "Create Enduring Consent",
        skip(self, request, headers),
        fields(period = ?request.period, maximum_amount = %request.maximum_amount_period.total)
    )]
    pub async fn create_response(
        &self,
        request: &EnduringConsentRequest,
        headers: &RequestHeaders,
    ) -> Result<BlinkResponse<CreateConsentResponse>, Error> {
        request.validate()?;

        let res = headers
            .apply(
                self.inner
                    .client
                    .post(self.inner.api_url("/enduring-consents")?),
                true,
            )
            .json(request)
            .send()
            .await?;

        BlinkResponse::from_json(res).await
    }

    /// Gets the details of an existing enduring consent.
    pub async fn get(&self, consent_id: &str, headers: &RequestHeaders) -> Result<Consent, Error> {
        Ok(self.get_response(consent_id, headers).await?.data)
    }

    #[tracing::instrument(name = "Get Enduring Consent", skip(self, headers))]
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
                        .api_url(&format!("/enduring-consents/{}", encode(consent_id)))?,
                ),
                false,
            )
            .send()
            .await?;

        BlinkResponse::from_json(res).await
    }

    /// Revokes an existing enduring consent. No further payments can be made against it.
    pub async fn revoke(&self, consent_id: &str, headers: &RequestHeaders) -> Result<(), Error> {
        self.revoke_response(consent_id, headers).await?;
        Ok(())
    }

    #[tracing::instrument(name = "Revoke Enduring Consent", skip(self, headers))]
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
                        .api_url(&format!("/enduring-consents/{}", encode(consent_id)))?,
                ),
                false,
            )
            .send()
            .await?;

        Ok(BlinkResponse::empty(res))
    }

    /// Polls an enduring consent until it is authorised.
    ///
    /// The consent is revoked if it is still pending when the client gives up waiting.
    #[tracing::instrument(name = "Await Authorised Enduring Consent", skip(self, options))]
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
