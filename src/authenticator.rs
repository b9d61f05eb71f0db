use crate::{
    apis::auth::{AccessToken, Credentials},
    common::TOKEN_EXPIRY_BUFFER_SECS,
    error::Error,
};
use chrono::{Duration, Utc};
use reqwest::Url;
use reqwest_middleware::ClientWithMiddleware;
use tokio::sync::{mpsc, oneshot};

type Reply = oneshot::Sender<Result<AccessToken, Error>>;

/// Request sent to the authenticator task.
struct GetAccessToken {
    force_refresh: bool,
    reply: Reply,
}

/// Manager for credentials and access tokens.
#[derive(Debug, Clone)]
pub struct Authenticator {
    tx: mpsc::UnboundedSender<GetAccessToken>,
    pub(crate) client_id: String,
}

impl Authenticator {
    /// Starts a new authenticator with the given credentials.
    ///
    /// `token_url` is the full URL of the OAuth2 token endpoint.
    pub fn new(client: ClientWithMiddleware, token_url: Url, credentials: Credentials) -> Self {
        let client_id = credentials.client_id().to_string();
        let state = AuthenticatorState {
            client,
            token_url,
            credentials,
            access_token: None,
        };

        // Spawn a long running task which will run until the authenticator is dropped
        let (tx, rx) = mpsc::unbounded_channel();
        #[cfg(test)]
        tests::mocked_time::spawn(async move {
            // We need to propagate the mocked time task-local in order to control time in the tests
            process_loop(state, rx).await;
        });
        #[cfg(not(test))]
        tokio::spawn(async move {
            process_loop(state, rx).await;
        });

        Self { tx, client_id }
    }

    /// Returns the current access token used for authentication against the Blink Debit APIs.
    ///
    /// A new token is requested from the server if `force_refresh` is set, if there's no token yet,
    /// or if the current one expires within the next 60 seconds. Otherwise the cached token
    /// is returned without any network call.
    ///
    /// Requests are served one at a time by a single task: callers queued behind a refresh
    /// receive the refreshed token instead of starting a refresh of their own.
    pub async fn get_access_token(&self, force_refresh: bool) -> Result<AccessToken, Error> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(GetAccessToken {
                force_refresh,
                reply,
            })
            .map_err(|e| Error::service("Authenticator task is not running", e.to_string()))?;

        rx.await
            .map_err(|e| Error::service("Authenticator task dropped the request", e))?
    }
}

/// Internal state of the authenticator.
struct AuthenticatorState {
    client: ClientWithMiddleware,
    token_url: Url,
    credentials: Credentials,
    access_token: Option<AccessToken>,
}

async fn process_loop(
    mut state: AuthenticatorState,
    mut rx: mpsc::UnboundedReceiver<GetAccessToken>,
) {
    while let Some(GetAccessToken {
        force_refresh,
        reply,
    }) = rx.recv().await
    {
        if reply
            .send(process_get_access_token(&mut state, force_refresh).await)
            .is_err()
        {
            tracing::warn!("Receiver dropped before the reply");
        }
    }
}

#[tracing::instrument(name = "Get Access Token", level = "debug", skip(state))]
async fn process_get_access_token(
    state: &mut AuthenticatorState,
    force_refresh: bool,
) -> Result<AccessToken, Error> {
    if !force_refresh {
        if let Some(token) = &state.access_token {
            if !should_refresh_token(token) {
                tracing::debug!("Reusing existing access token");
                return Ok(token.clone());
            }
        }
    }

    match refresh_token(state).await {
        Ok(token) => {
            state.access_token = Some(token.clone());
            tracing::info!("Got new access token");
            Ok(token)
        }
        Err(e) => {
            // The previous token is either expired or was explicitly invalidated
            state.access_token = None;
            tracing::warn!("Failed to obtain access token: {}", e);
            Err(e)
        }
    }
}

async fn refresh_token(state: &AuthenticatorState) -> Result<AccessToken, Error> {
    let res: RawAuthenticationResponse = state
        .client
        .post(state.token_url.clone())
        .json(&state.credentials)
        .send()
        .await
        .map_err(|e| classify_token_error(e.into()))?
        .json()
        .await
        .map_err(|e| classify_token_error(e.into()))?;

    if !res.token_type.eq_ignore_ascii_case("Bearer") {
        return Err(Error::Service {
            message: format!("Unsupported access token type: {}", res.token_type),
            source: None,
        });
    }

    Ok(AccessToken {
        token: res.access_token.into(),
        expires_at: now() + Duration::seconds(res.expires_in),
    })
}

/// Token endpoint failures are either authentication problems or service errors.
fn classify_token_error(e: Error) -> Error {
    match e.status() {
        Some(401) | Some(403) => e,
        _ => match e {
            Error::Service { .. } => e,
            e => Error::service("Failed to obtain an access token", e),
        },
    }
}

/// Returns `true` if the token expires within the safety buffer and should be refreshed.
fn should_refresh_token(token: &AccessToken) -> bool {
    now() + Duration::seconds(TOKEN_EXPIRY_BUFFER_SECS) >= token.expires_at
}

// Select an implementation of `now()` depending on whether we are testing or not
#[cfg(not(test))]
fn now() -> chrono::DateTime<Utc> {
    Utc::now()
}
#[cfg(test)]
use tests::mocked_time::now;

/// Successful response of an authentication request.
#[derive(serde::Deserialize)]
struct RawAuthenticationResponse {
    access_token: String,
    expires_in: i64,
    token_type: String,
}
