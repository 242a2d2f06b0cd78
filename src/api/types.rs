//! Wire shapes for the billing backend

use serde::{Deserialize, Serialize};

use crate::plans::{BillingCycle, Plan};

/// Response for the list of available plans
#[derive(Debug, Deserialize)]
pub struct PlansResponse {
    #[serde(default)]
    pub plans: Vec<Plan>,
}

/// Request for creating a checkout session
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest<'a> {
    pub plan_id: &'a str,
    pub billing_cycle: BillingCycle,
}

/// Raw checkout-session response. Success carries `checkoutUrl`; rejections
/// carry an `error` message and sometimes a `redirectTo` hint.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSessionResponse {
    #[serde(default)]
    pub checkout_url: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub redirect_to: Option<String>,
}

/// Response for the subscription management portal URL
#[derive(Debug, Deserialize)]
pub struct PortalResponse {
    pub url: String,
}

/// Outcome of a checkout-session request, after transport concerns are
/// stripped away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutReply {
    /// The backend minted a session; hand the user to the checkout surface.
    Session { url: String },
    /// The backend rejected the request. `redirect_to` carries the
    /// backend's hint when onboarding must complete first.
    Rejected {
        message: String,
        redirect_to: Option<String>,
    },
}
