//! Billing backend client
//!
//! The five backend calls this core depends on, behind a mockable trait.
//! Everything HTTP-shaped lives here; the rest of the crate sees canonical
//! types only.

pub mod client;
pub mod types;

pub use client::{BillingApi, HttpBillingClient};
pub use types::CheckoutReply;
