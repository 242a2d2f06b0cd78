//! Money-back guarantee window
//!
//! The backend computes the guarantee end date (activation + 90 days); this
//! core only compares a caller-supplied clock against it.

use chrono::{DateTime, Utc};

use crate::subscription::Subscription;

/// Whether a refund-guarantee claim can still be filed at `now`.
///
/// Open only while all three facts hold: the backend marked the
/// subscription guarantee-eligible, it supplied an end date, and `now` has
/// not passed that date. Eligible-but-dateless is not computable and reads
/// as closed.
pub fn is_guarantee_window_open(subscription: &Subscription, now: DateTime<Utc>) -> bool {
    match (subscription.guarantee_eligible, subscription.guarantee_end_date) {
        (true, Some(end_date)) => now <= end_date,
        _ => false,
    }
}
