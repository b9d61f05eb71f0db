use crate::{
    apis::{metadata::BankMetadata, BlinkDebitClientInner, BlinkResponse},
    Error, RequestHeaders,
};
use std::sync::Arc;

/// Blink Debit bank metadata APIs client.
#[derive(Clone, Debug)]
pub struct MetadataApi {
    inner: Arc<BlinkDebitClientInner>,
}

impl MetadataApi {
    pub(crate) fn new(inner: Arc<BlinkDebitClientInner>) -> Self {
        Self { inner }
    }

    /// Lists the supported banks and their capabilities.
    pub async fn get(&self, headers: &RequestHeaders) -> Result<Vec<BankMetadata>, Error> {
        Ok(self.get_response(headers).await?.data)
    }

    #[tracing::instrument(name = "Get Bank Metadata", skip_all)]
    pub async fn get_response(
        &self,
        headers: &RequestHeaders,
    ) -> Result<BlinkResponse<Vec<BankMetadata>>, Error> {
        let res = headers
            .apply(self.inner.client.get(self.inner.api_url("/meta")?), false)
            .send()
            .await?;

        BlinkResponse::from_json(res).await
    }
}
