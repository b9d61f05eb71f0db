use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::ops::Deref;

/// Client credentials used to authenticate against the Blink Debit APIs.
///
/// Serializes to the body expected by the token endpoint:
/// `{"grant_type": "client_credentials", "client_id": ..., "client_secret": ...}`.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(tag = "grant_type", rename_all = "snake_case")]
pub enum Credentials {
    ClientCredentials {
        client_id: String,
        client_secret: Token,
    },
}

impl Credentials {
    /// Creates a new set of client credentials.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<Token>) -> Self {
        Credentials::ClientCredentials {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Returns a reference to the client id stored in these [`Credentials`](crate::apis::auth::Credentials).
    pub fn client_id(&self) -> &str {
        match self {
            Credentials::ClientCredentials { client_id, .. } => client_id,
        }
    }

    /// Returns a reference to the client secret stored in these [`Credentials`](crate::apis::auth::Credentials).
    pub fn client_secret(&self) -> &Token {
        match self {
            Credentials::ClientCredentials { client_secret, .. } => client_secret,
        }
    }
}

/// Opaque access token used to authenticate to the Blink Debit APIs.
#[derive(Clone, Debug)]
pub struct AccessToken {
    pub(crate) token: Token,
    pub(crate) expires_at: DateTime<Utc>,
}

impl AccessToken {
    /// Actual token contents held by this `AccessToken` instance.
    pub fn token(&self) -> &Token {
        &self.token
    }

    /// Expiration date of the token.
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }
}

impl Deref for AccessToken {
    type Target = Token;

    fn deref(&self) -> &Self::Target {
        self.token()
    }
}

/// Wrapper for a secret string that makes it harder to accidentally expose secrets
/// and ensures the backing memory is wiped on drop.
///
/// It is a wrapper around a [`secrecy::Secret`](secrecy::Secret).
///
/// ```rust
/// # use blink_debit::apis::auth::Token;
/// let token = Token::new("supersecret");
///
/// // The secret is redacted when printed with Debug
/// assert!(!format!("{:?}", token).contains("supersecret"));
///
/// // But can be manually exposed calling `expose_secret()`...
/// assert_eq!(token.expose_secret(), "supersecret");
///
/// // ... Or if serialized with Serde
/// let serialized = serde_json::to_string(&token).unwrap();
/// assert!(serialized.contains("supersecret"));
/// ```
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Token(#[serde(serialize_with = "serialize_secret")] Secret<String>);

impl Token {
    /// Wraps a secret string in a new `Token`.
    pub fn new<T: Into<String>>(s: T) -> Self {
        Self(Secret::new(s.into()))
    }

    /// Exposes a reference to the underlying secret string.
    pub fn expose_secret(&self) -> &str {
        self.0.expose_secret()
    }
}

impl<T> From<T> for Token
where
    T: Into<String>,
{
    fn from(s: T) -> Self {
        Token::new(s)
    }
}

fn serialize_secret<S>(secret: &Secret<String>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::ser::Serializer,
{
    secret.expose_secret().serialize(serializer)
}
