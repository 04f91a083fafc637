use std::time::Duration;

use actix_web::{http::KeepAlive, middleware::Logger, web, App, HttpServer};
use checkout_engine::{
    events::{EventHandlers, EventProducers},
    CheckoutApi,
    OrderQueryApi,
    ReconcileApi,
    SqliteDatabase,
};
use log::info;
use payment_gateways::{HostedCheckoutApi, WalletPayApi};

use crate::{
    config::{ServerConfig, ServerOptions},
    errors::ServerError,
    integrations::{GatewayRouter, HttpCatalog},
    middleware::HmacMiddlewareFactory,
    notifier::{build_event_hooks, HttpMailer, Notifier},
    routes::{health, OrderStatusRoute, PlaceOrderRoute},
    webhook_routes::{HostedWebhookRoute, WalletWebhookRoute},
};

/// Number of in-flight events each notification hook will buffer before producers briefly await.
const EVENT_BUFFER_SIZE: usize = 100;

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let producers = start_notification_handlers(&config).await?;
    let srv = create_server_instance(config, db, producers)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

/// Wires the notification dispatcher into the engine's event hooks and starts the handler tasks.
/// Everything downstream of the returned producers is best-effort and runs outside any request.
pub async fn start_notification_handlers(config: &ServerConfig) -> Result<EventProducers, ServerError> {
    let mailer = HttpMailer::new(config.mail.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let notifier = Notifier::new(mailer, &config.shop_name, &config.mail.sender, &config.mail.admin_email);
    let hooks = build_event_hooks(notifier, config.bank.clone());
    let handlers = EventHandlers::new(EVENT_BUFFER_SIZE, hooks);
    let producers = handlers.producers();
    handlers.start_handlers().await;
    info!("📬️ Notification handlers started");
    Ok(producers)
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    producers: EventProducers,
) -> Result<actix_web::dev::Server, ServerError> {
    let wallet =
        WalletPayApi::new(config.wallet_api.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let hosted =
        HostedCheckoutApi::new(config.hosted_api.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let catalog = HttpCatalog::new(&config.catalog)?;
    let gateways = GatewayRouter::new(wallet, hosted, config.return_urls.clone());
    let options = ServerOptions::from_config(&config);
    let host = config.host.clone();
    let port = config.port;
    let srv = HttpServer::new(move || {
        let checkout_api = CheckoutApi::new(
            db.clone(),
            catalog.clone(),
            gateways.clone(),
            config.bank.clone(),
            producers.clone(),
        );
        let reconcile_api = ReconcileApi::new(db.clone(), producers.clone());
        let query_api = OrderQueryApi::new(db.clone());
        let app = App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("sps::access_log"))
            .app_data(web::Data::new(checkout_api))
            .app_data(web::Data::new(reconcile_api))
            .app_data(web::Data::new(query_api))
            .app_data(web::Data::new(options));
        // Each provider's webhook scope carries its own signature middleware; verification
        // happens before the route handler ever sees the payload.
        let wallet_hooks = web::scope("/webhook/wallet")
            .wrap(HmacMiddlewareFactory::from_config(&config.wallet_webhook))
            .service(WalletWebhookRoute::<SqliteDatabase>::new());
        let hosted_hooks = web::scope("/webhook/checkout")
            .wrap(HmacMiddlewareFactory::from_config(&config.hosted_webhook))
            .service(HostedWebhookRoute::<SqliteDatabase>::new());
        app.service(health)
            .service(PlaceOrderRoute::<SqliteDatabase, HttpCatalog, GatewayRouter>::new())
            .service(OrderStatusRoute::<SqliteDatabase>::new())
            .service(wallet_hooks)
            .service(hosted_hooks)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((host.as_str(), port))?
    .run();
    Ok(srv)
}
