//! Configuration for the Scorelift client core
//!
//! This module handles loading configuration values from the environment.

use std::env;
use std::time::Duration;

use crate::errors::CoreError;

const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8080";
const DEFAULT_ONBOARDING_REDIRECT_DELAY_SECS: u64 = 3;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,
    /// Base URL of the billing backend
    pub api_base_url: String,
    /// How long to let the user read a checkout rejection before the
    /// automatic redirect back to onboarding
    pub onboarding_redirect_delay: Duration,
}

impl Config {
    /// Load configuration from environment variables, with `.env` support
    pub fn from_env() -> Result<Self, CoreError> {
        // A missing .env file is fine; real environments set variables directly
        dotenvy::dotenv().ok();

        let environment =
            env::var("SCORELIFT_ENV").unwrap_or_else(|_| "development".to_string());
        let api_base_url =
            env::var("SCORELIFT_API_URL").unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string());

        let onboarding_redirect_delay = match env::var("SCORELIFT_ONBOARDING_REDIRECT_DELAY_SECS")
        {
            Ok(raw) => {
                let secs = raw.parse::<u64>().map_err(|_| {
                    CoreError::Config(format!(
                        "Invalid SCORELIFT_ONBOARDING_REDIRECT_DELAY_SECS: {}",
                        raw
                    ))
                })?;
                Duration::from_secs(secs)
            }
            Err(_) => Duration::from_secs(DEFAULT_ONBOARDING_REDIRECT_DELAY_SECS),
        };

        Ok(Self {
            environment,
            api_base_url,
            onboarding_redirect_delay,
        })
    }

    /// Check if running in development environment
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            onboarding_redirect_delay: Duration::from_secs(
                DEFAULT_ONBOARDING_REDIRECT_DELAY_SECS,
            ),
        }
    }
}
