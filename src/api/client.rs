use async_trait::async_trait;
use log::{debug, info};
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use super::types::{CheckoutReply, CheckoutRequest, CheckoutSessionResponse, PlansResponse, PortalResponse};
use crate::access::{AccessSnapshot, AccessStatus};
use crate::config::Config;
use crate::errors::CoreError;
use crate::plans::{BillingCycle, Plan};
use crate::session::SessionStore;
use crate::subscription::Subscription;

/// The billing backend, as seen by this core.
#[async_trait]
pub trait BillingApi: Send + Sync {
    async fn plans(&self) -> Result<Vec<Plan>, CoreError>;
    async fn current_subscription(&self) -> Result<Option<Subscription>, CoreError>;
    async fn access_status(&self) -> Result<AccessStatus, CoreError>;
    async fn create_checkout(
        &self,
        plan_id: &str,
        cycle: BillingCycle,
    ) -> Result<CheckoutReply, CoreError>;
    async fn billing_portal(&self) -> Result<String, CoreError>;

    /// Fetch access facts and subscription together so gate evaluations
    /// always see one consistent pair.
    async fn fetch_snapshot(&self) -> Result<AccessSnapshot, CoreError> {
        let access = self.access_status().await?;
        let subscription = self.current_subscription().await?;
        Ok(AccessSnapshot { access, subscription })
    }
}

/// HTTP client for the billing backend.
pub struct HttpBillingClient {
    base_url: String,
    http: reqwest::Client,
    session: Arc<dyn SessionStore>,
}

impl HttpBillingClient {
    pub fn new(config: &Config, session: Arc<dyn SessionStore>) -> Result<Self, CoreError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| CoreError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            http,
            session,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get(&self, path: &str) -> Result<reqwest::Response, CoreError> {
        let mut request = self.http.get(self.url(path));
        if let Some(token) = self.session.token() {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;
        self.reject_stale_session(response)
    }

    async fn post<T: Serialize + Sync>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<reqwest::Response, CoreError> {
        let mut request = self.http.post(self.url(path)).json(body);
        if let Some(token) = self.session.token() {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;
        self.reject_stale_session(response)
    }

    fn reject_stale_session(
        &self,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, CoreError> {
        if response.status() == StatusCode::UNAUTHORIZED {
            // A rejected token will stay rejected; drop it so the shell can
            // send the user back through sign-in.
            debug!("Backend returned 401; clearing stored session token");
            self.session.clear();
            return Err(CoreError::Auth("Session expired".to_string()));
        }
        Ok(response)
    }
}

#[async_trait]
impl BillingApi for HttpBillingClient {
    async fn plans(&self) -> Result<Vec<Plan>, CoreError> {
        let response = self.get("/api/payment/plans").await?;
        if !response.status().is_success() {
            return Err(CoreError::Transport(format!(
                "Failed to fetch plans: HTTP {}",
                response.status()
            )));
        }
        let body: PlansResponse = response.json().await?;
        Ok(body.plans)
    }

    async fn current_subscription(&self) -> Result<Option<Subscription>, CoreError> {
        let response = self.get("/api/payment/subscription").await?;
        if !response.status().is_success() {
            return Err(CoreError::Transport(format!(
                "Failed to fetch subscription: HTTP {}",
                response.status()
            )));
        }
        let raw: Value = response.json().await?;
        Ok(Subscription::normalize(&raw))
    }

    async fn access_status(&self) -> Result<AccessStatus, CoreError> {
        let response = self.get("/api/auth/access").await?;
        if !response.status().is_success() {
            return Err(CoreError::Transport(format!(
                "Failed to fetch access status: HTTP {}",
                response.status()
            )));
        }
        Ok(response.json().await?)
    }

    async fn create_checkout(
        &self,
        plan_id: &str,
        cycle: BillingCycle,
    ) -> Result<CheckoutReply, CoreError> {
        info!("Requesting checkout session for plan {} ({})", plan_id, cycle);
        let request = CheckoutRequest { plan_id, billing_cycle: cycle };
        let response = self.post("/api/payment/checkout", &request).await?;

        let status = response.status();
        let body = response.text().await?;
        // Rejections usually arrive with a JSON payload worth classifying;
        // an unreadable body falls through to the generic message.
        let parsed: CheckoutSessionResponse = serde_json::from_str(&body).unwrap_or_default();

        if let Some(url) = parsed.checkout_url {
            return Ok(CheckoutReply::Session { url });
        }

        let message = parsed.error.unwrap_or_else(|| {
            if status.is_success() {
                "Checkout session response contained no redirect URL".to_string()
            } else {
                format!("Checkout request failed: HTTP {}", status)
            }
        });
        Ok(CheckoutReply::Rejected { message, redirect_to: parsed.redirect_to })
    }

    async fn billing_portal(&self) -> Result<String, CoreError> {
        let response = self.post("/api/payment/portal", &serde_json::json!({})).await?;
        if !response.status().is_success() {
            return Err(CoreError::Payment(format!(
                "Portal session failed: HTTP {}",
                response.status()
            )));
        }
        let body: PortalResponse = response.json().await?;
        Ok(body.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemorySessionStore;
    use mockito::Matcher;
    use serde_json::json;

    fn client_for(server: &mockito::ServerGuard, session: Arc<dyn SessionStore>) -> HttpBillingClient {
        let config = Config {
            api_base_url: server.url(),
            ..Config::default()
        };
        HttpBillingClient::new(&config, session).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_plans_attaches_bearer_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/payment/plans")
            .match_header("authorization", "Bearer tok_abc")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "plans": [{
                        "id": "accelerate",
                        "name": "Accelerate",
                        "priceMonthly": "79",
                        "priceYearly": 790,
                        "features": ["AI analysis of negative items"],
                        "includesAiAnalysis": true
                    }]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let session = Arc::new(MemorySessionStore::with_token("tok_abc"));
        let client = client_for(&server, session);

        let plans = client.plans().await.unwrap();
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].price_monthly, 79.0);
        assert_eq!(plans[0].price_yearly, Some(790.0));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_subscription_envelope_is_normalized() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/payment/subscription")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "hasSubscription": true,
                    "subscription": { "id": "sub_1", "status": "active", "planId": "accelerate" }
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = client_for(&server, Arc::new(MemorySessionStore::new()));
        let sub = client.current_subscription().await.unwrap().unwrap();
        assert_eq!(sub.id, "sub_1");
        assert!(sub.is_active());
    }

    #[tokio::test]
    async fn test_absent_subscription_is_none() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/payment/subscription")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({ "hasSubscription": false }).to_string())
            .create_async()
            .await;

        let client = client_for(&server, Arc::new(MemorySessionStore::new()));
        assert!(client.current_subscription().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_checkout_success_yields_session() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/payment/checkout")
            .match_body(Matcher::Json(json!({
                "planId": "accelerate",
                "billingCycle": "yearly"
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({ "checkoutUrl": "https://pay.example/cs_123" }).to_string())
            .create_async()
            .await;

        let client = client_for(&server, Arc::new(MemorySessionStore::new()));
        let reply = client.create_checkout("accelerate", BillingCycle::Yearly).await.unwrap();
        assert_eq!(reply, CheckoutReply::Session { url: "https://pay.example/cs_123".to_string() });
    }

    #[tokio::test]
    async fn test_checkout_rejection_keeps_redirect_hint() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/payment/checkout")
            .with_status(403)
            .with_header("content-type", "application/json")
            .with_body(
                json!({ "error": "Complete onboarding first", "redirectTo": "/onboarding" })
                    .to_string(),
            )
            .create_async()
            .await;

        let client = client_for(&server, Arc::new(MemorySessionStore::new()));
        let reply = client.create_checkout("accelerate", BillingCycle::Monthly).await.unwrap();
        assert_eq!(
            reply,
            CheckoutReply::Rejected {
                message: "Complete onboarding first".to_string(),
                redirect_to: Some("/onboarding".to_string()),
            }
        );
    }

    #[tokio::test]
    async fn test_success_without_url_is_a_rejection() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/payment/checkout")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({}).to_string())
            .create_async()
            .await;

        let client = client_for(&server, Arc::new(MemorySessionStore::new()));
        let reply = client.create_checkout("accelerate", BillingCycle::Monthly).await.unwrap();
        match reply {
            CheckoutReply::Rejected { redirect_to, .. } => assert_eq!(redirect_to, None),
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unauthorized_clears_stored_token() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/payment/subscription")
            .with_status(401)
            .create_async()
            .await;

        let session = Arc::new(MemorySessionStore::with_token("tok_stale"));
        let client = client_for(&server, session.clone());

        let err = client.current_subscription().await.unwrap_err();
        assert!(matches!(err, CoreError::Auth(_)));
        assert_eq!(session.token(), None);
    }

    #[tokio::test]
    async fn test_fetch_snapshot_combines_both_calls() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/auth/access")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({ "isAdmin": false, "onboardingComplete": true }).to_string())
            .create_async()
            .await;
        server
            .mock("GET", "/api/payment/subscription")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({ "hasSubscription": false }).to_string())
            .create_async()
            .await;

        let client = client_for(&server, Arc::new(MemorySessionStore::new()));
        let snapshot = client.fetch_snapshot().await.unwrap();
        assert!(snapshot.access.onboarding_complete);
        assert!(snapshot.subscription.is_none());
    }
}
