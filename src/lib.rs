//! Async Rust client for the [Blink Debit](https://blinkpay.co.nz) API, which lets merchants
//! take payments directly from New Zealand bank accounts with the customer's consent.
//!
//! Check out also the official Blink Debit [API documentation](https://blinkpay.co.nz/docs).
//!
//! # Usage
//!
//! ## Prerequisites
//!
//! Ask BlinkPay for a client ID and a client secret for the sandbox environment.
//!
//! ## Initialize a new `BlinkDebitClient`
//!
//! Create a new [`BlinkDebitClient`](crate::client::BlinkDebitClient) and provide your client ID and client secret.
//!
//! ```rust,no_run
//! # use blink_debit::{BlinkDebitClient, Environment, Error, apis::auth::Credentials};
//! # #[tokio::main]
//! # async fn main() -> Result<(), Error> {
//! let client = BlinkDebitClient::builder(Credentials::new("some-client-id", "some-client-secret"))
//!     .with_environment(Environment::Sandbox)
//!     .build()?;
//! # Ok(())
//! # }
//! ```
//!
//! Alternatively, [`BlinkDebitClient::from_env`](crate::client::BlinkDebitClient::from_env) reads
//! the credentials and settings from `BLINKPAY_*` environment variables.
//!
//! Access tokens are requested on the first call and refreshed automatically a minute before
//! they expire. Transient failures (network errors, `429` and `5xx` responses) are retried
//! twice, one and five seconds apart.
//!
//! ## Take a single payment
//!
//! ```rust,no_run
//! # use blink_debit::{BlinkDebitClient, Error, apis::consents::*};
//! #
//! # #[tokio::main]
//! # async fn main() -> Result<(), Error> {
//! # let client: BlinkDebitClient = unreachable!();
//! #
//! let request = SingleConsentRequestBuilder::default()
//!     .flow(AuthFlowDetail::Redirect(RedirectFlow {
//!         bank: Bank::Pnz,
//!         redirect_uri: "https://my.return.uri".to_string(),
//!         redirect_to_app: None,
//!     }))
//!     .pcr(Pcr::new("particulars"))
//!     .amount(Amount::nzd("1.25"))
//!     .build()
//!     .unwrap();
//!
//! let res = client.create_single_consent(&request).await?;
//! println!("Send the customer to {:?}", res.redirect_uri);
//!
//! // Wait up to five minutes for the customer to authorise the consent
//! let consent = client
//!     .await_authorised_single_consent(&res.consent_id, 300)
//!     .await?;
//! println!("Consent {} is {:?}", consent.consent_id, consent.status);
//! # Ok(())
//! # }
//! ```
//!
//! ## More examples
//!
//! Look into the [`demos`](../demos) for more example usages of this library.
//!
//! To run an example, use `cargo run` like this:
//!
//! ```shell
//! cargo run --example await_single_consent
//! ```

#![deny(missing_debug_implementations)]
#![forbid(unsafe_code)]

pub mod apis;
pub(crate) mod authenticator;
pub mod client;
mod common;
pub mod configuration;
pub mod error;
pub mod headers;
mod middlewares;
pub mod pollable;

pub use apis::BlinkResponse;
pub use client::{BlinkDebitClient, Environment};
pub use configuration::BlinkPayConfig;
pub use error::Error;
pub use headers::RequestHeaders;
pub use middlewares::retry::{BlinkRetryPolicy, MAX_RETRIES};
pub use pollable::{PollMode, PollOptions, Pollable};
