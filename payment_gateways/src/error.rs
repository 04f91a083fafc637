use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Invalid request: {0}")]
    RequestError(String),
    #[error("Invalid response: {0}")]
    ResponseError(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Provider call failed. Error {status}. {message}")]
    QueryError { status: u16, message: String },
    #[error("Authentication with the provider failed: {0}")]
    AuthFailed(String),
    #[error("The provider did not return a redirect link for {0}")]
    MissingRedirectUrl(String),
    #[error("Refusing to create a payment for a non-positive amount: {0}")]
    NonPositiveAmount(String),
    #[error("Invalid currency amount: {0}")]
    InvalidCurrencyAmount(String),
}
