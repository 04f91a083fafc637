use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
    Method,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use sps_common::Money;

use crate::{
    config::HostedCheckoutConfig,
    data_objects::{CheckoutSession, SessionLineItem, SessionStatus},
    error::GatewayApiError,
};

/// Adapter for the hosted-checkout provider (card payments).
///
/// A session is created server-to-server with the authoritative line items and the order number
/// attached as the session reference; the customer is then redirected to the session URL. The
/// session id is the correlation key for the provider's webhook events.
#[derive(Clone)]
pub struct HostedCheckoutApi {
    config: HostedCheckoutConfig,
    client: Arc<Client>,
}

impl HostedCheckoutApi {
    pub fn new(config: HostedCheckoutConfig) -> Result<Self, GatewayApiError> {
        let mut headers = HeaderMap::with_capacity(2);
        let val = HeaderValue::from_str(&format!("Bearer {}", config.api_key.reveal()))
            .map_err(|e| GatewayApiError::Initialization(e.to_string()))?;
        headers.insert("Authorization", val);
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url.trim_end_matches('/'))
    }

    async fn rest_query<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<B>,
    ) -> Result<T, GatewayApiError> {
        let url = self.url(path);
        trace!("🛒️ Sending hosted-checkout REST query: {url}");
        let mut req = self.client.request(method, url);
        if let Some(body) = body {
            req = req.json(&body);
        }
        let response = req.send().await.map_err(|e| GatewayApiError::ResponseError(e.to_string()))?;
        if response.status().is_success() {
            trace!("🛒️ Hosted-checkout REST query successful. {}", response.status());
            response.json::<T>().await.map_err(|e| GatewayApiError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| GatewayApiError::ResponseError(e.to_string()))?;
            Err(GatewayApiError::QueryError { status, message })
        }
    }

    /// Creates a hosted checkout session for the given order.
    ///
    /// `reference` is the order number; it is attached both as the session reference and inside
    /// the metadata so that webhook events can be correlated back to the order without relying on
    /// the line-item payload. Line items carry server-side prices only.
    pub async fn create_session(
        &self,
        reference: &str,
        amount: Money,
        currency: &str,
        items: &[SessionLineItem],
        success_url: &str,
        cancel_url: &str,
    ) -> Result<CheckoutSession, GatewayApiError> {
        if !amount.is_positive() {
            return Err(GatewayApiError::NonPositiveAmount(format!("{amount} {currency} for order {reference}")));
        }
        let body = serde_json::json!({
            "mode": "payment",
            "capture_method": "automatic",
            "reference": reference,
            "currency": currency,
            "amount_total": amount.to_decimal_string(),
            "line_items": items,
            "success_url": success_url,
            "cancel_url": cancel_url,
            "metadata": { "order_number": reference },
        });
        debug!("🛒️ Creating hosted checkout session for {reference} ({amount} {currency})");
        let result = self.rest_query::<Value, Value>(Method::POST, "/v1/checkout/sessions", Some(body)).await?;
        let session = session_from_response(&result)?;
        info!("🛒️ Hosted checkout session {} created for {reference}", session.id);
        Ok(session)
    }

    /// Fetches the current state of a session. Used by the synchronous return-URL flow; the
    /// webhook remains the source of truth for order transitions.
    pub async fn verify_session(&self, session_id: &str) -> Result<CheckoutSession, GatewayApiError> {
        let path = format!("/v1/checkout/sessions/{session_id}");
        debug!("🛒️ Verifying hosted checkout session {session_id}");
        let result = self.rest_query::<Value, ()>(Method::GET, &path, None).await?;
        session_from_response(&result)
    }
}

fn session_from_response(value: &Value) -> Result<CheckoutSession, GatewayApiError> {
    let id = value["id"]
        .as_str()
        .ok_or_else(|| GatewayApiError::ResponseError("session response is missing 'id'".into()))?
        .to_string();
    let status = match value["status"].as_str() {
        Some("complete") => SessionStatus::Complete,
        Some("expired") => SessionStatus::Expired,
        _ => SessionStatus::Open,
    };
    let url = value["url"]
        .as_str()
        .map(String::from)
        .ok_or_else(|| GatewayApiError::MissingRedirectUrl(format!("checkout session {id}")))?;
    Ok(CheckoutSession { id, url, status })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parses_session_response() {
        let response = serde_json::json!({
            "id": "cs_901aa3f2",
            "status": "open",
            "url": "https://pay.hosted-checkout.example/s/cs_901aa3f2",
        });
        let session = session_from_response(&response).unwrap();
        assert_eq!(session.id, "cs_901aa3f2");
        assert_eq!(session.status, SessionStatus::Open);
    }

    #[test]
    fn missing_url_is_a_hard_error() {
        let response = serde_json::json!({ "id": "cs_901aa3f2", "status": "open" });
        let err = session_from_response(&response).unwrap_err();
        assert!(matches!(err, GatewayApiError::MissingRedirectUrl(_)));
    }
}
