//! Types shared by single consents, enduring consents and quick payments.

mod model;

pub use model::*;
