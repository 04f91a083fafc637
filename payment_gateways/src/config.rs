use std::time::Duration;

use log::*;
use sps_common::Secret;

const DEFAULT_TIMEOUT_MS: u64 = 15_000;

/// Connection settings for the redirect-wallet provider. The client id / secret pair is used for
/// the OAuth2 client-credentials exchange; the resulting bearer token is cached by the adapter.
#[derive(Debug, Clone)]
pub struct WalletPayConfig {
    /// Base url of the wallet REST API, e.g. "https://api.wallet-pay.example"
    pub base_url: String,
    pub client_id: String,
    pub client_secret: Secret<String>,
    pub timeout: Duration,
}

impl Default for WalletPayConfig {
    fn default() -> Self {
        Self {
            base_url: String::default(),
            client_id: String::default(),
            client_secret: Secret::default(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }
}

impl WalletPayConfig {
    pub fn new_from_env_or_default() -> Self {
        let base_url = std::env::var("SPS_WALLET_BASE_URL").unwrap_or_else(|_| {
            warn!("SPS_WALLET_BASE_URL not set. Wallet-redirect payments will fail until it is configured.");
            "https://api.wallet-pay.example".to_string()
        });
        let client_id = std::env::var("SPS_WALLET_CLIENT_ID").unwrap_or_else(|_| {
            warn!("SPS_WALLET_CLIENT_ID not set, using (probably useless) default");
            "wallet-client-id".to_string()
        });
        let client_secret = Secret::new(std::env::var("SPS_WALLET_CLIENT_SECRET").unwrap_or_else(|_| {
            warn!("SPS_WALLET_CLIENT_SECRET not set, using (probably useless) default");
            "00000000000000".to_string()
        }));
        let timeout = timeout_from_env("SPS_WALLET_TIMEOUT_MS");
        Self { base_url, client_id, client_secret, timeout }
    }
}

/// Connection settings for the hosted-checkout provider. A single API key authenticates all
/// server-to-server calls.
#[derive(Debug, Clone)]
pub struct HostedCheckoutConfig {
    /// Base url of the hosted-checkout REST API, e.g. "https://api.hosted-checkout.example"
    pub base_url: String,
    pub api_key: Secret<String>,
    pub timeout: Duration,
}

impl Default for HostedCheckoutConfig {
    fn default() -> Self {
        Self {
            base_url: String::default(),
            api_key: Secret::default(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }
}

impl HostedCheckoutConfig {
    pub fn new_from_env_or_default() -> Self {
        let base_url = std::env::var("SPS_HOSTED_BASE_URL").unwrap_or_else(|_| {
            warn!("SPS_HOSTED_BASE_URL not set. Card payments will fail until it is configured.");
            "https://api.hosted-checkout.example".to_string()
        });
        let api_key = Secret::new(std::env::var("SPS_HOSTED_API_KEY").unwrap_or_else(|_| {
            warn!("SPS_HOSTED_API_KEY not set, using (probably useless) default");
            "hk_test_00000000000000".to_string()
        }));
        let timeout = timeout_from_env("SPS_HOSTED_TIMEOUT_MS");
        Self { base_url, api_key, timeout }
    }
}

fn timeout_from_env(var: &str) -> Duration {
    let ms = std::env::var(var)
        .ok()
        .and_then(|s| {
            s.parse::<u64>()
                .map_err(|e| warn!("Invalid value for {var}: {e}. Using the default of {DEFAULT_TIMEOUT_MS} ms."))
                .ok()
        })
        .unwrap_or(DEFAULT_TIMEOUT_MS);
    Duration::from_millis(ms)
}
