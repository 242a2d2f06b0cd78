//! Checkout orchestration
//!
//! Sequences a single checkout attempt against the billing backend and maps
//! failures to user-facing outcomes. One attempt per session may be in
//! flight; results of superseded attempts are discarded rather than applied
//! to state.

use log::{debug, info, warn};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

use crate::api::{BillingApi, CheckoutReply};
use crate::config::Config;
use crate::errors::CoreError;
use crate::plans::BillingCycle;
use crate::session::Navigator;

/// Where the current checkout attempt stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutPhase {
    Idle,
    Requesting { attempt: Uuid },
    Redirecting { url: String },
    Failed { message: String },
}

/// Result of one checkout attempt, as handed to the UI layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutOutcome {
    /// The user is being handed to the external checkout surface.
    Redirect { url: String },
    /// The attempt failed. When `onboarding_redirect` is set, a delayed
    /// redirect back to the onboarding flow has been scheduled and the
    /// message should be shown in the meantime.
    Failed {
        message: String,
        onboarding_redirect: bool,
    },
}

pub struct CheckoutOrchestrator {
    api: Arc<dyn BillingApi>,
    navigator: Arc<dyn Navigator>,
    redirect_delay: Duration,
    phase: Mutex<CheckoutPhase>,
}

impl CheckoutOrchestrator {
    pub fn new(api: Arc<dyn BillingApi>, navigator: Arc<dyn Navigator>, config: &Config) -> Self {
        Self {
            api,
            navigator,
            redirect_delay: config.onboarding_redirect_delay,
            phase: Mutex::new(CheckoutPhase::Idle),
        }
    }

    pub fn phase(&self) -> CheckoutPhase {
        self.phase.lock().unwrap().clone()
    }

    /// Begin a checkout attempt for one plan.
    ///
    /// At most one attempt is in flight; a second call while `Requesting`
    /// is rejected with [`CoreError::CheckoutInFlight`]. Backend rejections
    /// and transport failures both come back as [`CheckoutOutcome::Failed`]
    /// with the message passed through for display; retrying takes a new
    /// explicit call.
    pub async fn start_checkout(
        &self,
        plan_id: &str,
        cycle: BillingCycle,
    ) -> Result<CheckoutOutcome, CoreError> {
        let attempt = Uuid::new_v4();
        {
            let mut phase = self.phase.lock().unwrap();
            if matches!(*phase, CheckoutPhase::Requesting { .. }) {
                return Err(CoreError::CheckoutInFlight);
            }
            *phase = CheckoutPhase::Requesting { attempt };
        }
        info!("Starting checkout attempt {} for plan {} ({})", attempt, plan_id, cycle);

        let reply = self.api.create_checkout(plan_id, cycle).await;

        let mut phase = self.phase.lock().unwrap();
        if *phase != (CheckoutPhase::Requesting { attempt }) {
            // The user navigated away or a newer attempt took over; this
            // result must not touch state.
            debug!("Discarding result of superseded checkout attempt {}", attempt);
            return Err(CoreError::AttemptSuperseded);
        }

        match reply {
            Ok(CheckoutReply::Session { url }) => {
                *phase = CheckoutPhase::Redirecting { url: url.clone() };
                drop(phase);
                info!("Checkout attempt {} redirecting to checkout surface", attempt);
                self.navigator.redirect(&url);
                Ok(CheckoutOutcome::Redirect { url })
            }
            Ok(CheckoutReply::Rejected { message, redirect_to }) => {
                *phase = CheckoutPhase::Failed { message: message.clone() };
                drop(phase);
                let onboarding_redirect = redirect_to.is_some();
                if let Some(target) = redirect_to {
                    warn!("Checkout rejected pending onboarding: {}", message);
                    self.schedule_redirect(target);
                } else {
                    warn!("Checkout attempt {} failed: {}", attempt, message);
                }
                Ok(CheckoutOutcome::Failed { message, onboarding_redirect })
            }
            Err(err) => {
                let message = err.to_string();
                *phase = CheckoutPhase::Failed { message: message.clone() };
                drop(phase);
                warn!("Checkout attempt {} failed: {}", attempt, message);
                Ok(CheckoutOutcome::Failed { message, onboarding_redirect: false })
            }
        }
    }

    /// Discard any in-flight attempt, e.g. when the user navigates away.
    /// Its result, if one later arrives, will not be applied.
    pub fn cancel(&self) {
        let mut phase = self.phase.lock().unwrap();
        if matches!(*phase, CheckoutPhase::Requesting { .. }) {
            debug!("Cancelling in-flight checkout attempt");
            *phase = CheckoutPhase::Idle;
        }
    }

    /// Open a billing-management portal session and hand the user to it.
    /// Requires an existing subscription; callers gate on that first.
    pub async fn open_portal(&self) -> Result<String, CoreError> {
        let url = self.api.billing_portal().await?;
        self.navigator.redirect(&url);
        Ok(url)
    }

    // The delay gives the user a beat to read the rejection message before
    // being moved back into onboarding.
    fn schedule_redirect(&self, url: String) {
        let navigator = Arc::clone(&self.navigator);
        let delay = self.redirect_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            navigator.redirect(&url);
        });
    }
}
