//! Subscription snapshots
//!
//! The billing backend owns the subscription lifecycle; this core only ever
//! reads a point-in-time snapshot. [`Subscription::normalize`] is the single
//! boundary that absorbs the backend's inconsistent response shapes, so
//! nothing downstream ever branches on envelope layout or key casing.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Canonical subscription lifecycle state.
///
/// Anything the backend sends outside the canonical set lands in `Other`,
/// preserved verbatim for display and never entitled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SubscriptionStatus {
    Trial,
    Active,
    Paused,
    Cancelled,
    Other(String),
}

impl SubscriptionStatus {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "trial" | "trialing" => SubscriptionStatus::Trial,
            "active" => SubscriptionStatus::Active,
            "paused" => SubscriptionStatus::Paused,
            "cancelled" | "canceled" => SubscriptionStatus::Cancelled,
            _ => SubscriptionStatus::Other(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            SubscriptionStatus::Trial => "trial",
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Paused => "paused",
            SubscriptionStatus::Cancelled => "cancelled",
            SubscriptionStatus::Other(raw) => raw,
        }
    }

    /// Entitlement to paid gated features requires an active subscription.
    pub fn is_active(&self) -> bool {
        matches!(self, SubscriptionStatus::Active)
    }

    /// Whether the subscription exists for billing-management purposes.
    /// Trialing and paused customers can open the portal; cancelled and
    /// unknown states read as absent.
    pub fn is_manageable(&self) -> bool {
        matches!(
            self,
            SubscriptionStatus::Active | SubscriptionStatus::Trial | SubscriptionStatus::Paused
        )
    }
}

impl From<String> for SubscriptionStatus {
    fn from(raw: String) -> Self {
        SubscriptionStatus::parse(&raw)
    }
}

impl From<SubscriptionStatus> for String {
    fn from(status: SubscriptionStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user's subscription, as last reported by the billing backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub plan_id: String,
    pub status: SubscriptionStatus,
    pub current_period_end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub guarantee_eligible: bool,
    pub guarantee_end_date: Option<DateTime<Utc>>,
}

impl Subscription {
    /// Normalize a raw backend record into the canonical shape.
    ///
    /// The record may arrive flat, under a `subscription` wrapper, or under
    /// one or two `data` layers; keys show up in camelCase or snake_case and
    /// timestamps as RFC 3339 strings or epoch seconds. Returns `None` when
    /// no subscription exists. Never errors and never mutates its input.
    pub fn normalize(raw: &Value) -> Option<Subscription> {
        let record = unwrap_envelope(raw)?;
        let obj = record.as_object()?;

        let id = string_field(obj, "id", "id");
        let status = string_field(obj, "status", "status");
        // An object carrying neither an id nor a status is an empty
        // envelope, not a subscription.
        if id.is_none() && status.is_none() {
            return None;
        }

        Some(Subscription {
            id: id.unwrap_or_default(),
            user_id: string_field(obj, "userId", "user_id").unwrap_or_default(),
            plan_id: string_field(obj, "planId", "plan_id").unwrap_or_default(),
            status: SubscriptionStatus::parse(&status.unwrap_or_default()),
            current_period_end: timestamp_field(obj, "currentPeriodEnd", "current_period_end"),
            guarantee_eligible: bool_field(obj, "guaranteeEligible", "guarantee_eligible"),
            guarantee_end_date: timestamp_field(obj, "guaranteeEndDate", "guarantee_end_date"),
        })
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// When the current billing period renews, if the backend reported it.
    pub fn renews_at(&self) -> Option<DateTime<Utc>> {
        self.current_period_end
    }
}

/// Peel wrapper layers until the actual record is reached.
fn unwrap_envelope(raw: &Value) -> Option<&Value> {
    let mut current = raw;
    loop {
        let obj = current.as_object()?;
        let flag = field(obj, "hasSubscription", "has_subscription");
        if flag.and_then(Value::as_bool) == Some(false) {
            return None;
        }
        if let Some(inner) = obj.get("subscription") {
            current = inner;
            continue;
        }
        if let Some(inner) = obj.get("data") {
            current = inner;
            continue;
        }
        return Some(current);
    }
}

fn field<'a>(obj: &'a Map<String, Value>, camel: &str, snake: &str) -> Option<&'a Value> {
    obj.get(camel).or_else(|| obj.get(snake))
}

fn string_field(obj: &Map<String, Value>, camel: &str, snake: &str) -> Option<String> {
    match field(obj, camel, snake)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn bool_field(obj: &Map<String, Value>, camel: &str, snake: &str) -> bool {
    field(obj, camel, snake)
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

fn timestamp_field(
    obj: &Map<String, Value>,
    camel: &str,
    snake: &str,
) -> Option<DateTime<Utc>> {
    match field(obj, camel, snake)? {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(n) => {
            let secs = n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))?;
            Utc.timestamp_opt(secs, 0).single()
        }
        _ => None,
    }
}
