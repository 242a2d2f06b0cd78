//! Scorelift client core
//!
//! Entitlement decisions and checkout orchestration for the Scorelift
//! credit-repair service: whether a user may reach gated functionality
//! (checkout, protected pages, the billing portal, guarantee refund
//! claims), and the sequencing of checkout/portal sessions against the
//! billing backend. Rendering, routing and the backend itself live
//! elsewhere.

pub mod access;
pub mod api;
pub mod checkout;
pub mod config;
pub mod errors;
pub mod guarantee;
pub mod plans;
pub mod serde_utils;
pub mod session;
pub mod subscription;

pub use access::{evaluate, AccessSnapshot, AccessStatus, FlowOrigin, GateAction, GateDecision, GateReason};
pub use api::{BillingApi, CheckoutReply, HttpBillingClient};
pub use checkout::{CheckoutOrchestrator, CheckoutOutcome, CheckoutPhase};
pub use config::Config;
pub use errors::CoreError;
pub use guarantee::is_guarantee_window_open;
pub use plans::{BillingCycle, Plan};
pub use session::{FileSessionStore, MemorySessionStore, Navigator, SessionStore};
pub use subscription::{Subscription, SubscriptionStatus};
