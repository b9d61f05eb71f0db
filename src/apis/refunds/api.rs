use crate::{
    apis::{
        refunds::{Refund, RefundDetail, RefundResponse},
        require_id, BlinkDebitClientInner, BlinkResponse,
    },
    Error, RequestHeaders,
};
use std::sync::Arc;
use urlencoding::encode;

/// Blink Debit refunds APIs client.
#[derive(Clone, Debug)]
pub struct RefundsApi {
    inner: Arc<BlinkDebitClientInner>,
}

impl RefundsApi {
    pub(crate) fn new(inner: Arc<BlinkDebitClientInner>) -> Self {
        Self { inner }
    }

    /// Requests a refund for a payment.
    pub async fn create(
        &self,
        request: &RefundDetail,
        headers: &RequestHeaders,
    ) -> Result<RefundResponse, Error> {
        Ok(self.create_response(request, headers).await?.data)
    }

    #[tracing::instrument(
        name = "Create Refund",
        skip(self, request, headers),
        fields(payment_id = %request.payment_id())
    )]
    pub async fn create_response(
        &self,
        request: &RefundDetail,
        headers: &RequestHeaders,
    ) -> Result<BlinkResponse<RefundResponse>, Error> {
        request.validate()?;

        let res = headers
            .apply(
                self.inner.client.post(self.inner.api_url("/refunds")?),
                true,
            )
            .json(request)
            .send()
            .await?;

        BlinkResponse::from_json(res).await
    }

    /// Gets the details of an existing refund.
    pub async fn get(&self, refund_id: &str, headers: &RequestHeaders) -> Result<Refund, Error> {
        Ok(self.get_response(refund_id, headers).await?.data)
    }

    #[tracing::instrument(name = "Get Refund", skip(self, headers))]
    pub async fn get_response(
        &self,
        refund_id: &str,
        headers: &RequestHeaders,
    ) -> Result<BlinkResponse<Refund>, Error> {
        require_id(refund_id, "Refund ID")?;

        let res = headers
            .apply(
                self.inner
                    .client
                    .get(self.inner.api_url(&format!("/refunds/{}", encode(refund_id)))?),
                false,
            )
            .send()
            .await?;

        BlinkResponse::from_json(res).await
    }
}
