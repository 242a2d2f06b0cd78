use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Payment processing error: {0}")]
    Payment(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Session storage error: {0}")]
    Session(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("A checkout attempt is already in progress")]
    CheckoutInFlight,

    #[error("Checkout attempt superseded before its result arrived")]
    AttemptSuperseded,
}

impl From<reqwest::Error> for CoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            CoreError::MalformedResponse(err.to_string())
        } else {
            CoreError::Transport(format!("HTTP request error: {}", err))
        }
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::MalformedResponse(err.to_string())
    }
}
