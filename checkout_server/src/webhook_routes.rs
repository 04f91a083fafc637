//! Provider webhook handlers.
//!
//! Signature verification happens in the HMAC middleware wrapped around these routes, before any
//! of this code runs. By the provider retry contract, anything this module understands — even an
//! event type we deliberately ignore — is acknowledged with a 2xx. Malformed payloads are
//! rejected with a 400 by the JSON extractor, and backend failures return a 5xx so the provider
//! redelivers against the idempotent transition.
use actix_web::{web, HttpRequest, HttpResponse};
use checkout_engine::{
    db_types::PaymentProvider,
    traits::CheckoutDatabase,
    ProviderEvent,
    ProviderEventKind,
    ReconcileApi,
    ReconcileOutcome,
};
use log::*;
use payment_gateways::webhook_events::{
    HostedEvent,
    WalletEvent,
    HOSTED_SESSION_COMPLETED,
    HOSTED_SESSION_EXPIRED,
    WALLET_ORDER_COMPLETED,
    WALLET_ORDER_EXPIRED,
};

use crate::{config::ServerOptions, data_objects::JsonResponse, errors::ServerError, helpers::get_remote_ip, route};

route!(wallet_webhook => Post "" impl CheckoutDatabase);
pub async fn wallet_webhook<B>(
    req: HttpRequest,
    body: web::Json<WalletEvent>,
    api: web::Data<ReconcileApi<B>>,
    options: web::Data<ServerOptions>,
) -> Result<HttpResponse, ServerError>
where B: CheckoutDatabase
{
    let event = body.into_inner();
    let peer = get_remote_ip(&req, options.use_x_forwarded_for, options.use_forwarded);
    debug!("📨️ Wallet webhook {} ({}) from {peer:?}", event.id, event.event_type);
    let kind = match event.event_type.as_str() {
        WALLET_ORDER_COMPLETED => ProviderEventKind::PaymentSucceeded,
        WALLET_ORDER_EXPIRED => ProviderEventKind::SessionExpired,
        other => {
            info!("📨️ Ignoring unhandled wallet event type '{other}'.");
            return Ok(HttpResponse::Ok().json(JsonResponse::success("Event acknowledged and ignored.")));
        },
    };
    let event = ProviderEvent { provider: PaymentProvider::Wallet, reference: event.resource.id, kind };
    let outcome = api.handle_event(event).await?;
    Ok(ack(outcome))
}

route!(hosted_webhook => Post "" impl CheckoutDatabase);
pub async fn hosted_webhook<B>(
    req: HttpRequest,
    body: web::Json<HostedEvent>,
    api: web::Data<ReconcileApi<B>>,
    options: web::Data<ServerOptions>,
) -> Result<HttpResponse, ServerError>
where B: CheckoutDatabase
{
    let event = body.into_inner();
    let peer = get_remote_ip(&req, options.use_x_forwarded_for, options.use_forwarded);
    debug!("📨️ Hosted-checkout webhook {} ({}) from {peer:?}", event.id, event.event_type);
    let kind = match event.event_type.as_str() {
        HOSTED_SESSION_COMPLETED => ProviderEventKind::PaymentSucceeded,
        HOSTED_SESSION_EXPIRED => ProviderEventKind::SessionExpired,
        other => {
            info!("📨️ Ignoring unhandled hosted-checkout event type '{other}'.");
            return Ok(HttpResponse::Ok().json(JsonResponse::success("Event acknowledged and ignored.")));
        },
    };
    let event =
        ProviderEvent { provider: PaymentProvider::HostedCheckout, reference: event.data.object.id, kind };
    let outcome = api.handle_event(event).await?;
    Ok(ack(outcome))
}

fn ack(outcome: ReconcileOutcome) -> HttpResponse {
    let response = match outcome {
        ReconcileOutcome::Transitioned(order) => {
            JsonResponse::success(format!("Order {} is now {}.", order.order_number, order.status))
        },
        ReconcileOutcome::AlreadyFinal(order) => {
            JsonResponse::success(format!("Order {} already processed. No action taken.", order.order_number))
        },
        ReconcileOutcome::UnknownReference => JsonResponse::success("No matching order. Event ignored."),
    };
    HttpResponse::Ok().json(response)
}
