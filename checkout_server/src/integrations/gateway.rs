use checkout_engine::{
    db_types::{PaymentMethod, PaymentProvider},
    traits::{InitiatedPayment, PaymentInitError, PaymentInitRequest, PaymentInitiator},
};
use log::debug;
use payment_gateways::{GatewayApiError, HostedCheckoutApi, SessionLineItem, WalletPayApi};

use crate::config::ReturnUrlConfig;

/// One consolidated payment initiator per process: routes each request to the single adapter for
/// its payment method, parameterized purely by configuration.
#[derive(Clone)]
pub struct GatewayRouter {
    wallet: WalletPayApi,
    hosted: HostedCheckoutApi,
    return_urls: ReturnUrlConfig,
}

impl GatewayRouter {
    pub fn new(wallet: WalletPayApi, hosted: HostedCheckoutApi, return_urls: ReturnUrlConfig) -> Self {
        Self { wallet, hosted, return_urls }
    }
}

impl PaymentInitiator for GatewayRouter {
    async fn create_payment(&self, request: &PaymentInitRequest) -> Result<InitiatedPayment, PaymentInitError> {
        let reference = request.order_number.as_str();
        let success_url = self.return_urls.success_for(reference);
        let cancel_url = self.return_urls.cancel_for(reference);
        match request.method {
            PaymentMethod::WalletRedirect => {
                debug!("💳️ Routing order {reference} to the wallet provider");
                let order = self
                    .wallet
                    .create_order(reference, request.amount, &request.currency, &success_url, &cancel_url)
                    .await
                    .map_err(map_gateway_error)?;
                Ok(InitiatedPayment {
                    provider: PaymentProvider::Wallet,
                    provider_ref: order.id,
                    redirect_url: order.approval_url,
                })
            },
            PaymentMethod::Card => {
                debug!("💳️ Routing order {reference} to the hosted-checkout provider");
                let items = request
                    .items
                    .iter()
                    .map(|i| SessionLineItem {
                        name: i.name.clone(),
                        quantity: i.quantity,
                        unit_amount: i.unit_price.to_decimal_string(),
                    })
                    .collect::<Vec<_>>();
                let session = self
                    .hosted
                    .create_session(reference, request.amount, &request.currency, &items, &success_url, &cancel_url)
                    .await
                    .map_err(map_gateway_error)?;
                Ok(InitiatedPayment {
                    provider: PaymentProvider::HostedCheckout,
                    provider_ref: session.id,
                    redirect_url: session.url,
                })
            },
            PaymentMethod::BankTransfer => Err(PaymentInitError::UnsupportedMethod("bank_transfer".into())),
        }
    }
}

fn map_gateway_error(e: GatewayApiError) -> PaymentInitError {
    match e {
        GatewayApiError::AuthFailed(m) => PaymentInitError::AuthFailed(m),
        GatewayApiError::ResponseError(m) => PaymentInitError::Timeout(m),
        other => PaymentInitError::Rejected(other.to_string()),
    }
}
