use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use checkout_engine::{CheckoutError, ReconcileError, ValidationError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("{0}")]
    ValidationFailed(#[from] ValidationError),
    #[error("Order {order_number} was saved, but payment setup failed. Retry payment or choose another method.")]
    PaymentInitiationFailed { order_number: String, reason: String },
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
}

impl ServerError {
    /// The machine-readable reason code included in every error body.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InitializeError(_) => "initialize_error",
            Self::BackendError(_) => "backend_error",
            Self::InvalidRequestBody(_) => "invalid_request_body",
            Self::IOError(_) => "io_error",
            Self::ConfigurationError(_) => "configuration_error",
            Self::ValidationFailed(e) => e.code(),
            Self::PaymentInitiationFailed { .. } => "payment_initiation_failed",
            Self::NoRecordFound(_) => "not_found",
            Self::Unspecified(_) => "unspecified",
        }
    }
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::ValidationFailed(_) => StatusCode::BAD_REQUEST,
            Self::PaymentInitiationFailed { .. } => StatusCode::BAD_GATEWAY,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut body = serde_json::json!({ "code": self.code(), "error": self.to_string() });
        // A saved-but-unpaid order needs its number in the payload so the client can retry
        // payment without re-placing the order.
        if let Self::PaymentInitiationFailed { order_number, .. } = self {
            body["order_number"] = serde_json::json!(order_number);
        }
        HttpResponse::build(self.status_code()).insert_header(ContentType::json()).body(body.to_string())
    }
}

impl From<CheckoutError> for ServerError {
    fn from(e: CheckoutError) -> Self {
        match e {
            CheckoutError::Validation(v) => Self::ValidationFailed(v),
            CheckoutError::PaymentInitiation { order_number, source } => {
                Self::PaymentInitiationFailed { order_number: order_number.to_string(), reason: source.to_string() }
            },
            CheckoutError::CatalogUnavailable(e) => Self::BackendError(format!("Catalog unavailable: {e}")),
            CheckoutError::Database(e) => Self::BackendError(format!("Database error: {e}")),
            CheckoutError::Query(e) => Self::BackendError(format!("Database error: {e}")),
            CheckoutError::OrderNumberExhausted(n) => {
                Self::BackendError(format!("Could not allocate an order number after {n} attempts"))
            },
        }
    }
}

impl From<ReconcileError> for ServerError {
    fn from(e: ReconcileError) -> Self {
        Self::BackendError(e.to_string())
    }
}
