use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use log::*;
use reqwest::{Client, Method};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use sps_common::Money;
use tokio::sync::RwLock;

use crate::{config::WalletPayConfig, data_objects::RemoteOrder, error::GatewayApiError};

/// How long before the reported token expiry we treat the cached token as stale. Refreshing a
/// minute early avoids racing a provider-side rejection of an almost-expired token.
const TOKEN_EXPIRY_SKEW_SECS: i64 = 60;

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_fresh(&self) -> bool {
        Utc::now() < self.expires_at
    }
}

/// Adapter for the redirect-wallet provider.
///
/// Authentication is a short-lived bearer token obtained via the OAuth2 client-credentials
/// exchange. The token is cached until near expiry; concurrent readers may occasionally trigger a
/// double refresh, which is harmless.
#[derive(Clone)]
pub struct WalletPayApi {
    config: WalletPayConfig,
    client: Arc<Client>,
    token: Arc<RwLock<Option<CachedToken>>>,
}

#[derive(Debug, Deserialize)]
struct AccessTokenResponse {
    access_token: String,
    expires_in: i64,
}

impl WalletPayApi {
    pub fn new(config: WalletPayConfig) -> Result<Self, GatewayApiError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client), token: Arc::new(RwLock::new(None)) })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url.trim_end_matches('/'))
    }

    /// Returns a valid bearer token, re-authenticating against the provider only when the cached
    /// token is missing or near expiry.
    async fn access_token(&self) -> Result<String, GatewayApiError> {
        if let Some(cached) = self.token.read().await.as_ref() {
            if cached.is_fresh() {
                return Ok(cached.token.clone());
            }
        }
        trace!("💳️ Wallet bearer token missing or stale. Re-authenticating.");
        let response = self
            .client
            .post(self.url("/v1/oauth2/token"))
            .basic_auth(&self.config.client_id, Some(self.config.client_secret.reveal()))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| GatewayApiError::AuthFailed(e.to_string()))?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(GatewayApiError::AuthFailed(format!("token endpoint returned {status}: {message}")));
        }
        let token = response.json::<AccessTokenResponse>().await.map_err(|e| GatewayApiError::JsonError(e.to_string()))?;
        let expires_at = Utc::now() + Duration::seconds((token.expires_in - TOKEN_EXPIRY_SKEW_SECS).max(0));
        debug!("💳️ Wallet bearer token refreshed. Valid until {expires_at}");
        let cached = CachedToken { token: token.access_token.clone(), expires_at };
        *self.token.write().await = Some(cached);
        Ok(token.access_token)
    }

    async fn rest_query<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<B>,
    ) -> Result<T, GatewayApiError> {
        let url = self.url(path);
        trace!("💳️ Sending wallet REST query: {url}");
        let token = self.access_token().await?;
        let mut req = self.client.request(method, url).bearer_auth(token);
        if let Some(body) = body {
            req = req.json(&body);
        }
        let response = req.send().await.map_err(|e| GatewayApiError::ResponseError(e.to_string()))?;
        if response.status().is_success() {
            trace!("💳️ Wallet REST query successful. {}", response.status());
            response.json::<T>().await.map_err(|e| GatewayApiError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| GatewayApiError::ResponseError(e.to_string()))?;
            Err(GatewayApiError::QueryError { status, message })
        }
    }

    /// Creates a remote payment object scoped to the given amount and order number, returning the
    /// provider id and the approval URL the customer must be redirected to.
    ///
    /// A non-2xx response or a response without an approval link is a hard error. The caller
    /// decides what happens to the order in that case; this adapter never proceeds silently.
    pub async fn create_order(
        &self,
        reference: &str,
        amount: Money,
        currency: &str,
        return_url: &str,
        cancel_url: &str,
    ) -> Result<RemoteOrder, GatewayApiError> {
        if !amount.is_positive() {
            return Err(GatewayApiError::NonPositiveAmount(format!("{amount} {currency} for order {reference}")));
        }
        let body = serde_json::json!({
            "intent": "CAPTURE",
            "purchase_units": [{
                "reference_id": reference,
                "invoice_id": reference,
                "amount": {
                    "currency_code": currency,
                    "value": amount.to_decimal_string(),
                },
            }],
            "application_context": {
                "return_url": return_url,
                "cancel_url": cancel_url,
            },
        });
        debug!("💳️ Creating wallet order for {reference} ({amount} {currency})");
        let result = self.rest_query::<Value, Value>(Method::POST, "/v1/checkout/orders", Some(body)).await?;
        let order = remote_order_from_response(&result)?;
        info!("💳️ Wallet order {} created for {reference}", order.id);
        Ok(order)
    }
}

/// Pulls the order id and the `approve` link out of a create-order response.
fn remote_order_from_response(value: &Value) -> Result<RemoteOrder, GatewayApiError> {
    let id = value["id"]
        .as_str()
        .ok_or_else(|| GatewayApiError::ResponseError("create-order response is missing 'id'".into()))?
        .to_string();
    let status = value["status"].as_str().unwrap_or("CREATED").to_string();
    let approval_url = value["links"]
        .as_array()
        .and_then(|links| {
            links
                .iter()
                .find(|l| l["rel"].as_str() == Some("approve"))
                .and_then(|l| l["href"].as_str())
                .map(String::from)
        })
        .ok_or_else(|| GatewayApiError::MissingRedirectUrl(format!("wallet order {id}")))?;
    Ok(RemoteOrder { id, status, approval_url })
}
