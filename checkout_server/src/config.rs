use std::{env, time::Duration};

use checkout_engine::BankDetails;
use log::*;
use payment_gateways::{HostedCheckoutConfig, WalletPayConfig};
use sps_common::{parse_boolean_flag, Secret};

const DEFAULT_SPS_HOST: &str = "127.0.0.1";
const DEFAULT_SPS_PORT: u16 = 8360;
const DEFAULT_CATALOG_TIMEOUT_MS: u64 = 5_000;

/// Signature headers the providers attach to their webhook calls.
pub const WALLET_SIGNATURE_HEADER: &str = "X-Wallet-Signature";
pub const HOSTED_SIGNATURE_HEADER: &str = "X-Checkout-Signature";

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Shop display name, used in notification mails
    pub shop_name: String,
    /// If true, the X-Forwarded-For header will be used to determine the client's IP address,
    /// rather than the connection's remote address.
    pub use_x_forwarded_for: bool,
    /// If true, the Forwarded header will be used to determine the client's IP address, rather
    /// than the connection's remote address.
    pub use_forwarded: bool,
    pub wallet_webhook: WebhookAuthConfig,
    pub hosted_webhook: WebhookAuthConfig,
    pub wallet_api: WalletPayConfig,
    pub hosted_api: HostedCheckoutConfig,
    pub return_urls: ReturnUrlConfig,
    pub bank: BankDetails,
    pub catalog: CatalogConfig,
    pub mail: MailConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SPS_HOST.to_string(),
            port: DEFAULT_SPS_PORT,
            database_url: String::default(),
            shop_name: "Storefront".to_string(),
            use_x_forwarded_for: false,
            use_forwarded: false,
            wallet_webhook: WebhookAuthConfig::disabled(WALLET_SIGNATURE_HEADER),
            hosted_webhook: WebhookAuthConfig::disabled(HOSTED_SIGNATURE_HEADER),
            wallet_api: WalletPayConfig::default(),
            hosted_api: HostedCheckoutConfig::default(),
            return_urls: ReturnUrlConfig::default(),
            bank: BankDetails::default(),
            catalog: CatalogConfig::default(),
            mail: MailConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("SPS_HOST").ok().unwrap_or_else(|| DEFAULT_SPS_HOST.into());
        let port = env::var("SPS_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for SPS_PORT. {e} Using the default, {DEFAULT_SPS_PORT}, instead."
                    );
                    DEFAULT_SPS_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_SPS_PORT);
        let database_url = env::var("SPS_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ SPS_DATABASE_URL is not set. Please set it to the URL for the order store.");
            String::default()
        });
        let shop_name = env::var("SPS_SHOP_NAME").ok().unwrap_or_else(|| "Storefront".to_string());
        let use_x_forwarded_for = parse_boolean_flag(env::var("SPS_USE_X_FORWARDED_FOR").ok(), false);
        let use_forwarded = parse_boolean_flag(env::var("SPS_USE_FORWARDED").ok(), false);
        let wallet_webhook = WebhookAuthConfig::from_env("SPS_WALLET", WALLET_SIGNATURE_HEADER);
        let hosted_webhook = WebhookAuthConfig::from_env("SPS_HOSTED", HOSTED_SIGNATURE_HEADER);
        Self {
            host,
            port,
            database_url,
            shop_name,
            use_x_forwarded_for,
            use_forwarded,
            wallet_webhook,
            hosted_webhook,
            wallet_api: WalletPayConfig::new_from_env_or_default(),
            hosted_api: HostedCheckoutConfig::new_from_env_or_default(),
            return_urls: ReturnUrlConfig::from_env_or_default(),
            bank: bank_details_from_env(),
            catalog: CatalogConfig::from_env_or_default(),
            mail: MailConfig::from_env_or_default(),
        }
    }
}

//---------------------------------------  WebhookAuthConfig  ---------------------------------------------------------
/// Signature verification settings for one provider's webhook endpoint.
///
/// Checks are on by default. Running without a secret is a degraded mode for local development
/// only and must be asked for explicitly; either way the choice is logged at startup, never
/// defaulted to silently.
#[derive(Clone, Debug)]
pub struct WebhookAuthConfig {
    pub header: String,
    pub secret: Secret<String>,
    pub checks_enabled: bool,
}

impl WebhookAuthConfig {
    pub fn disabled(header: &str) -> Self {
        Self { header: header.into(), secret: Secret::default(), checks_enabled: false }
    }

    fn from_env(prefix: &str, header: &str) -> Self {
        let checks_flag = parse_boolean_flag(env::var(format!("{prefix}_SIGNATURE_CHECKS")).ok(), true);
        let secret = env::var(format!("{prefix}_WEBHOOK_SECRET")).ok().filter(|s| !s.is_empty());
        let checks_enabled = match (&secret, checks_flag) {
            (Some(_), true) => {
                info!("🪛️ {header} webhook signature checks are enabled.");
                true
            },
            (Some(_), false) => {
                warn!(
                    "🚨️ {prefix}_SIGNATURE_CHECKS is off even though a signing secret is configured. Webhooks on \
                     this endpoint will NOT be verified. Do not run production like this."
                );
                false
            },
            (None, _) => {
                warn!(
                    "🚨️ {prefix}_WEBHOOK_SECRET is not set. Webhook signature checks for {header} are DISABLED. \
                     This is acceptable for local development only."
                );
                false
            },
        };
        let secret = Secret::new(secret.unwrap_or_default());
        Self { header: header.into(), secret, checks_enabled }
    }
}

//---------------------------------------   ReturnUrlConfig   ---------------------------------------------------------
/// Where providers send the customer back to. The order number is appended as a query parameter
/// at payment-initiation time so the storefront can poll the order status on return.
#[derive(Clone, Debug)]
pub struct ReturnUrlConfig {
    pub success_url: String,
    pub cancel_url: String,
}

impl Default for ReturnUrlConfig {
    fn default() -> Self {
        Self {
            success_url: "http://localhost:3000/checkout/success".to_string(),
            cancel_url: "http://localhost:3000/checkout/cancelled".to_string(),
        }
    }
}

impl ReturnUrlConfig {
    fn from_env_or_default() -> Self {
        let defaults = Self::default();
        let success_url = env::var("SPS_CHECKOUT_SUCCESS_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ SPS_CHECKOUT_SUCCESS_URL not set, using {}", defaults.success_url);
            defaults.success_url.clone()
        });
        let cancel_url = env::var("SPS_CHECKOUT_CANCEL_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ SPS_CHECKOUT_CANCEL_URL not set, using {}", defaults.cancel_url);
            defaults.cancel_url.clone()
        });
        Self { success_url, cancel_url }
    }

    pub fn success_for(&self, order_number: &str) -> String {
        append_order_param(&self.success_url, order_number)
    }

    pub fn cancel_for(&self, order_number: &str) -> String {
        append_order_param(&self.cancel_url, order_number)
    }
}

fn append_order_param(url: &str, order_number: &str) -> String {
    let sep = if url.contains('?') { '&' } else { '?' };
    format!("{url}{sep}order={order_number}")
}

fn bank_details_from_env() -> BankDetails {
    let var = |name: &str| {
        env::var(name).ok().unwrap_or_else(|| {
            warn!("🪛️ {name} is not set. Bank-transfer instructions will be incomplete until it is configured.");
            String::default()
        })
    };
    BankDetails {
        recipient: var("SPS_BANK_RECIPIENT"),
        iban: var("SPS_BANK_IBAN"),
        bic: var("SPS_BANK_BIC"),
        bank_name: var("SPS_BANK_NAME"),
    }
}

//---------------------------------------    CatalogConfig    ---------------------------------------------------------
#[derive(Clone, Debug)]
pub struct CatalogConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self { base_url: String::default(), timeout: Duration::from_millis(DEFAULT_CATALOG_TIMEOUT_MS) }
    }
}

impl CatalogConfig {
    fn from_env_or_default() -> Self {
        let base_url = env::var("SPS_CATALOG_BASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ SPS_CATALOG_BASE_URL is not set. Checkout requests cannot be priced without it.");
            String::default()
        });
        let timeout = env::var("SPS_CATALOG_TIMEOUT_MS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(Duration::from_millis(DEFAULT_CATALOG_TIMEOUT_MS));
        Self { base_url, timeout }
    }
}

//---------------------------------------     MailConfig      ---------------------------------------------------------
#[derive(Clone, Debug, Default)]
pub struct MailConfig {
    pub api_url: String,
    pub api_key: Secret<String>,
    pub sender: String,
    pub admin_email: String,
}

impl MailConfig {
    fn from_env_or_default() -> Self {
        let api_url = env::var("SPS_MAIL_API_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ SPS_MAIL_API_URL is not set. Notification mails will be logged and dropped.");
            String::default()
        });
        let api_key = Secret::new(env::var("SPS_MAIL_API_KEY").unwrap_or_default());
        let sender = env::var("SPS_MAIL_SENDER").ok().unwrap_or_else(|| "orders@example.com".to_string());
        let admin_email = env::var("SPS_ADMIN_EMAIL").ok().unwrap_or_else(|| {
            warn!("🪛️ SPS_ADMIN_EMAIL is not set. Admin new-order alerts will not be delivered.");
            String::default()
        });
        Self { api_url, api_key, sender, admin_email }
    }
}

//-------------------------------------------  ServerOptions  ----------------------------------------------------------
/// A subset of the server configuration that is used to configure the server's behaviour.
/// Generally we try to keep this as small as possible, and exclude secrets to avoid passing
/// sensitive information around the system.
#[derive(Clone, Copy, Debug)]
pub struct ServerOptions {
    pub use_x_forwarded_for: bool,
    pub use_forwarded: bool,
}

impl ServerOptions {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self { use_x_forwarded_for: config.use_x_forwarded_for, use_forwarded: config.use_forwarded }
    }
}
