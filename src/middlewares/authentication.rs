use crate::authenticator::Authenticator;
use async_trait::async_trait;
use reqwest::{header::HeaderValue, Request, Response};
use reqwest_middleware::{Middleware, Next};
use task_local_extensions::Extensions;

/// Reqwest middleware to inject the access token into outgoing HTTP requests.
/// On the first request, an additional HTTP request will be fired to get a new access token.
pub struct AuthenticationMiddleware {
    pub(crate) authenticator: Authenticator,
}

#[async_trait]
impl Middleware for AuthenticationMiddleware {
    async fn handle(
        &self,
        mut req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> reqwest_middleware::Result<Response> {
        let access_token = self.authenticator.get_access_token(false).await?;

        let mut header_value =
            HeaderValue::from_str(&format!("Bearer {}", access_token.expose_secret()))
                .map_err(|e| reqwest_middleware::Error::Middleware(e.into()))?;
        header_value.set_sensitive(true);
        req.headers_mut().insert("Authorization", header_value);

        next.run(req, extensions).await
    }
}
