//! Access gating
//!
//! The one real authorization decision in the product: given who the user
//! is, how far through onboarding they are, and what their subscription
//! looks like, may they perform a gated action? Pure; the caller fetches
//! the facts, the gate only combines them.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::subscription::Subscription;

/// Per-request access facts derived from the user's profile. Ephemeral;
/// recomputed on every fetch, never cached across sessions.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessStatus {
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub onboarding_complete: bool,
}

/// Access facts and subscription fetched together. Gate decisions are only
/// meaningful against a pair from the same fetch; after any state-changing
/// event (successful checkout, portal return) re-fetch the whole snapshot.
#[derive(Debug, Clone)]
pub struct AccessSnapshot {
    pub access: AccessStatus,
    pub subscription: Option<Subscription>,
}

impl AccessSnapshot {
    pub fn evaluate(&self, action: &GateAction, origin: FlowOrigin) -> GateDecision {
        evaluate(&self.access, self.subscription.as_ref(), action, origin)
    }
}

/// A gated action the UI may ask about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateAction {
    ViewProtectedPage,
    StartCheckout,
    ManageSubscription,
    /// An action name the engine does not classify. Always denied.
    Other(String),
}

impl GateAction {
    pub fn parse(name: &str) -> Self {
        match name {
            "view-protected-page" => GateAction::ViewProtectedPage,
            "start-checkout" => GateAction::StartCheckout,
            "manage-subscription" => GateAction::ManageSubscription,
            other => GateAction::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            GateAction::ViewProtectedPage => "view-protected-page",
            GateAction::StartCheckout => "start-checkout",
            GateAction::ManageSubscription => "manage-subscription",
            GateAction::Other(name) => name,
        }
    }

    fn requires_onboarding(&self) -> bool {
        matches!(self, GateAction::StartCheckout | GateAction::ViewProtectedPage)
    }
}

impl fmt::Display for GateAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the gate request came from. Checkout started from inside the
/// onboarding flow is allowed to finish by paying before the completeness
/// flag flips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlowOrigin {
    #[default]
    Default,
    Onboarding,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum GateReason {
    None,
    RequiresOnboarding,
    RequiresSubscription,
    AdminOverride,
}

/// Outcome of a gate evaluation. A denial is a normal decision for the
/// caller to render as a prompt, never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateDecision {
    pub allowed: bool,
    pub reason: GateReason,
}

impl GateDecision {
    fn allow(reason: GateReason) -> Self {
        GateDecision { allowed: true, reason }
    }

    fn deny(reason: GateReason) -> Self {
        GateDecision { allowed: false, reason }
    }
}

/// Decide whether the user may perform `action`.
///
/// The rule order is load-bearing: the admin bypass must dominate the
/// onboarding and subscription requirements. The only check ahead of it is
/// the deny-by-default rule for unclassified actions, which nothing may
/// open, admin or not.
pub fn evaluate(
    access: &AccessStatus,
    subscription: Option<&Subscription>,
    action: &GateAction,
    origin: FlowOrigin,
) -> GateDecision {
    if let GateAction::Other(_) = action {
        return GateDecision::deny(GateReason::RequiresSubscription);
    }

    if access.is_admin {
        return GateDecision::allow(GateReason::AdminOverride);
    }

    if action.requires_onboarding() && !access.onboarding_complete {
        let checkout_from_onboarding =
            *action == GateAction::StartCheckout && origin == FlowOrigin::Onboarding;
        if !checkout_from_onboarding {
            return GateDecision::deny(GateReason::RequiresOnboarding);
        }
    }

    if *action == GateAction::ManageSubscription {
        let manageable = subscription.map(|s| s.status.is_manageable()).unwrap_or(false);
        if !manageable {
            return GateDecision::deny(GateReason::RequiresSubscription);
        }
    }

    GateDecision::allow(GateReason::None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subscription::SubscriptionStatus;

    fn status(is_admin: bool, onboarding_complete: bool) -> AccessStatus {
        AccessStatus { is_admin, onboarding_complete }
    }

    fn subscription(status: SubscriptionStatus) -> Subscription {
        Subscription {
            id: "sub_123".to_string(),
            user_id: "user_9".to_string(),
            plan_id: "accelerate".to_string(),
            status,
            current_period_end: None,
            guarantee_eligible: false,
            guarantee_end_date: None,
        }
    }

    #[test]
    fn test_admin_bypass_dominates() {
        let decision = evaluate(
            &status(true, false),
            None,
            &GateAction::ViewProtectedPage,
            FlowOrigin::Default,
        );
        assert!(decision.allowed);
        assert_eq!(decision.reason, GateReason::AdminOverride);

        // admins are not blocked from purchasing either
        let decision = evaluate(
            &status(true, false),
            None,
            &GateAction::StartCheckout,
            FlowOrigin::Default,
        );
        assert!(decision.allowed);
    }

    #[test]
    fn test_onboarding_required_before_checkout() {
        let decision = evaluate(
            &status(false, false),
            None,
            &GateAction::StartCheckout,
            FlowOrigin::Default,
        );
        assert!(!decision.allowed);
        assert_eq!(decision.reason, GateReason::RequiresOnboarding);
    }

    #[test]
    fn test_checkout_from_onboarding_flow_proceeds() {
        let decision = evaluate(
            &status(false, false),
            None,
            &GateAction::StartCheckout,
            FlowOrigin::Onboarding,
        );
        assert!(decision.allowed);
        assert_eq!(decision.reason, GateReason::None);

        // the exception is checkout-only; viewing still needs onboarding
        let decision = evaluate(
            &status(false, false),
            None,
            &GateAction::ViewProtectedPage,
            FlowOrigin::Onboarding,
        );
        assert!(!decision.allowed);
        assert_eq!(decision.reason, GateReason::RequiresOnboarding);
    }

    #[test]
    fn test_manage_subscription_needs_a_live_subscription() {
        let access = status(false, true);

        let active = subscription(SubscriptionStatus::Active);
        assert!(evaluate(&access, Some(&active), &GateAction::ManageSubscription, FlowOrigin::Default).allowed);

        let trial = subscription(SubscriptionStatus::Trial);
        assert!(evaluate(&access, Some(&trial), &GateAction::ManageSubscription, FlowOrigin::Default).allowed);

        let paused = subscription(SubscriptionStatus::Paused);
        assert!(evaluate(&access, Some(&paused), &GateAction::ManageSubscription, FlowOrigin::Default).allowed);

        let cancelled = subscription(SubscriptionStatus::Cancelled);
        let decision =
            evaluate(&access, Some(&cancelled), &GateAction::ManageSubscription, FlowOrigin::Default);
        assert!(!decision.allowed);
        assert_eq!(decision.reason, GateReason::RequiresSubscription);

        let decision = evaluate(&access, None, &GateAction::ManageSubscription, FlowOrigin::Default);
        assert!(!decision.allowed);
        assert_eq!(decision.reason, GateReason::RequiresSubscription);
    }

    #[test]
    fn test_onboarded_user_views_protected_pages() {
        let decision = evaluate(
            &status(false, true),
            None,
            &GateAction::ViewProtectedPage,
            FlowOrigin::Default,
        );
        assert!(decision.allowed);
        assert_eq!(decision.reason, GateReason::None);
    }

    #[test]
    fn test_unclassified_actions_are_denied_even_for_admins() {
        let action = GateAction::parse("export-all-data");
        assert_eq!(action, GateAction::Other("export-all-data".to_string()));

        let decision = evaluate(&status(false, true), None, &action, FlowOrigin::Default);
        assert!(!decision.allowed);
        assert_eq!(decision.reason, GateReason::RequiresSubscription);

        let decision = evaluate(&status(true, true), None, &action, FlowOrigin::Default);
        assert!(!decision.allowed);
    }

    #[test]
    fn test_snapshot_evaluation() {
        let snapshot = AccessSnapshot {
            access: status(false, true),
            subscription: Some(subscription(SubscriptionStatus::Active)),
        };
        let decision = snapshot.evaluate(&GateAction::ManageSubscription, FlowOrigin::Default);
        assert!(decision.allowed);
    }

    #[test]
    fn test_action_parsing_round_trip() {
        for name in ["view-protected-page", "start-checkout", "manage-subscription"] {
            assert_eq!(GateAction::parse(name).as_str(), name);
        }
    }
}
