//! Subscription plans and pricing
//!
//! Pricing here is presentation math only: rounded figures feed the pricing
//! page, while any amount that reaches the billing backend for charging
//! keeps its unrounded decimal.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::serde_utils::lenient_number::{lenient_price, lenient_price_opt};

/// Billing period selected by the user. Transient; never persisted here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingCycle {
    Monthly,
    Yearly,
}

impl BillingCycle {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingCycle::Monthly => "monthly",
            BillingCycle::Yearly => "yearly",
        }
    }
}

impl fmt::Display for BillingCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A subscription plan as published by the billing backend.
///
/// Read-only to this core. Malformed price fields degrade to 0 at the serde
/// boundary so a bad catalog entry never takes the pricing page down.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(deserialize_with = "lenient_price", default)]
    pub price_monthly: f64,
    #[serde(deserialize_with = "lenient_price_opt", default)]
    pub price_yearly: Option<f64>,
    #[serde(default)]
    pub features: Vec<String>,
    /// Marks the premium tier on the pricing page.
    #[serde(default)]
    pub includes_ai_analysis: bool,
}

/// Round-half-up to the nearest whole currency unit. Display only.
fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

impl Plan {
    /// The yearly amount, derived from the monthly price when the backend
    /// publishes no yearly price.
    fn yearly_total(&self) -> f64 {
        self.price_yearly.unwrap_or(self.price_monthly * 12.0)
    }

    /// Monthly-equivalent display price for the given billing cycle.
    pub fn price(&self, cycle: BillingCycle) -> i64 {
        match cycle {
            BillingCycle::Monthly => round_half_up(self.price_monthly),
            BillingCycle::Yearly => round_half_up(self.yearly_total() / 12.0),
        }
    }

    /// Amount actually billed per cycle, unrounded.
    pub fn total_price(&self, cycle: BillingCycle) -> f64 {
        match cycle {
            BillingCycle::Monthly => self.price_monthly,
            BillingCycle::Yearly => self.yearly_total(),
        }
    }

    /// Yearly savings over paying monthly, as a display integer. Zero for a
    /// plan with no yearly price; may be negative.
    pub fn savings(&self) -> i64 {
        round_half_up(self.price_monthly * 12.0 - self.yearly_total())
    }

    /// Find a plan by ID
    pub fn find_by_id<'a>(plans: &'a [Plan], id: &str) -> Option<&'a Plan> {
        plans.iter().find(|p| p.id == id)
    }

    /// Built-in catalog mirroring the published tiers, used when the plans
    /// fetch fails so the pricing page still renders.
    pub fn defaults() -> Vec<Self> {
        vec![
            Plan {
                id: "essentials".to_string(),
                name: "Essentials".to_string(),
                description: "Core dispute tools for getting started".to_string(),
                price_monthly: 49.0,
                price_yearly: Some(490.0),
                features: vec![
                    "Credit report import from all three bureaus".to_string(),
                    "Guided dispute letter generation".to_string(),
                    "Monthly score tracking".to_string(),
                    "Email support".to_string(),
                ],
                includes_ai_analysis: false,
            },
            Plan {
                id: "accelerate".to_string(),
                name: "Accelerate".to_string(),
                description: "Automated repair for faster results".to_string(),
                price_monthly: 79.0,
                price_yearly: Some(790.0),
                features: vec![
                    "Everything in Essentials".to_string(),
                    "AI analysis of negative items".to_string(),
                    "Automated dispute scheduling".to_string(),
                    "Priority support".to_string(),
                ],
                includes_ai_analysis: true,
            },
            Plan {
                id: "concierge".to_string(),
                name: "Concierge".to_string(),
                description: "A dedicated team working your file".to_string(),
                price_monthly: 129.0,
                price_yearly: Some(1290.0),
                features: vec![
                    "Everything in Accelerate".to_string(),
                    "Dedicated case manager".to_string(),
                    "Creditor intervention letters".to_string(),
                    "Weekly bureau refresh".to_string(),
                ],
                includes_ai_analysis: true,
            },
        ]
    }
}
