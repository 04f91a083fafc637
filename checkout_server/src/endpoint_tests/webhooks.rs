use actix_web::{http::StatusCode, web, web::ServiceConfig};
use checkout_engine::{
    db_types::{Address, OrderStatusType, PaymentMethod, PaymentProvider},
    events::EventProducers,
    test_utils::fakes::{FakeCatalog, FakeInitiator},
    traits::OrderManagement,
    CartItem,
    CustomerIdentity,
    PlaceOrderRequest,
    ReconcileApi,
    SqliteDatabase,
};
use serde_json::json;
use sps_common::{Money, Secret};

use super::helpers::{new_test_db, post_request, test_checkout_api};
use crate::{
    config::{ServerOptions, HOSTED_SIGNATURE_HEADER},
    helpers::calculate_hmac,
    middleware::HmacMiddlewareFactory,
    webhook_routes::HostedWebhookRoute,
};

const WEBHOOK_SECRET: &str = "whsec_test_0000000000";

/// Seeds a Pending card order and returns its provider session id.
async fn seed_card_order(db: &SqliteDatabase) -> String {
    let catalog = FakeCatalog::new().with_variant("boots", "boots-42", "Boots (42)", Money::from_cents(7990));
    let api = test_checkout_api(db.clone(), catalog, FakeInitiator::new());
    let request = PlaceOrderRequest {
        items: vec![CartItem { product_id: "boots".into(), variant_id: "boots-42".into(), quantity: 1 }],
        client_total: Money::from_cents(7990),
        currency: "EUR".into(),
        customer: CustomerIdentity::try_new(None, Some("jo@example.com".into())).unwrap(),
        shipping_address: Address {
            name: "Jo Customer".into(),
            line1: "12 Market Lane".into(),
            line2: None,
            city: "Berlin".into(),
            postal_code: "10115".into(),
            country: "DE".into(),
        },
        payment_method: PaymentMethod::Card,
        referral_code: None,
        coupon_code: None,
        idempotency_key: "ik-wh-seed".into(),
    };
    let outcome = api.place_order(request).await.expect("seeding order failed");
    outcome.order.provider_ref.expect("provider ref expected")
}

fn session_completed_payload(session_id: &str) -> String {
    json!({
        "id": "evt_1f00",
        "type": "checkout.session.completed",
        "data": { "object": { "id": session_id } }
    })
    .to_string()
}

/// Registers the hosted-checkout webhook scope, with signature checks on or off.
fn configure_webhook(db: SqliteDatabase, checks_enabled: bool) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg: &mut ServiceConfig| {
        let api = ReconcileApi::new(db, EventProducers::default());
        let scope = web::scope("/webhook/checkout")
            .wrap(HmacMiddlewareFactory::new(
                HOSTED_SIGNATURE_HEADER,
                Secret::new(WEBHOOK_SECRET.to_string()),
                checks_enabled,
            ))
            .service(HostedWebhookRoute::<SqliteDatabase>::new());
        cfg.service(scope)
            .app_data(web::Data::new(api))
            .app_data(web::Data::new(ServerOptions { use_x_forwarded_for: false, use_forwarded: false }));
    }
}

async fn order_status_for(db: &SqliteDatabase, provider_ref: &str) -> OrderStatusType {
    db.fetch_order_by_provider_ref(PaymentProvider::HostedCheckout, provider_ref)
        .await
        .unwrap()
        .expect("order must exist")
        .status
}

#[actix_web::test]
async fn valid_signature_transitions_the_order() {
    let _ = env_logger::try_init().ok();
    let db = new_test_db().await;
    let provider_ref = seed_card_order(&db).await;
    let payload = session_completed_payload(&provider_ref);
    let signature = calculate_hmac(WEBHOOK_SECRET, payload.as_bytes());

    let headers = [(HOSTED_SIGNATURE_HEADER, signature.as_str())];
    let (status, body) =
        post_request("/webhook/checkout", payload, &headers, configure_webhook(db.clone(), true)).await.unwrap();
    assert_eq!(status, StatusCode::OK, "body: {body}");
    assert_eq!(order_status_for(&db, &provider_ref).await, OrderStatusType::Paid);
}

#[actix_web::test]
async fn invalid_signature_never_touches_the_order() {
    let _ = env_logger::try_init().ok();
    let db = new_test_db().await;
    let provider_ref = seed_card_order(&db).await;
    let payload = session_completed_payload(&provider_ref);

    let headers = [(HOSTED_SIGNATURE_HEADER, "bm90LXRoZS1yaWdodC1zaWduYXR1cmU=")];
    let err = post_request("/webhook/checkout", payload, &headers, configure_webhook(db.clone(), true))
        .await
        .expect_err("must be rejected");
    assert_eq!(err, "Invalid HMAC signature.");
    assert_eq!(
        order_status_for(&db, &provider_ref).await,
        OrderStatusType::Pending,
        "A rejected webhook must not mutate the order"
    );
}

#[actix_web::test]
async fn missing_signature_is_rejected() {
    let _ = env_logger::try_init().ok();
    let db = new_test_db().await;
    let provider_ref = seed_card_order(&db).await;
    let payload = session_completed_payload(&provider_ref);

    let err = post_request("/webhook/checkout", payload, &[], configure_webhook(db.clone(), true))
        .await
        .expect_err("must be rejected");
    assert_eq!(err, "No HMAC signature found.");
    assert_eq!(order_status_for(&db, &provider_ref).await, OrderStatusType::Pending);
}

#[actix_web::test]
async fn disabled_checks_allow_unsigned_calls() {
    let _ = env_logger::try_init().ok();
    let db = new_test_db().await;
    let provider_ref = seed_card_order(&db).await;
    let payload = session_completed_payload(&provider_ref);

    let (status, _) =
        post_request("/webhook/checkout", payload, &[], configure_webhook(db.clone(), false)).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order_status_for(&db, &provider_ref).await, OrderStatusType::Paid);
}

#[actix_web::test]
async fn unhandled_event_types_are_acknowledged() {
    let _ = env_logger::try_init().ok();
    let db = new_test_db().await;
    let provider_ref = seed_card_order(&db).await;
    let payload = json!({
        "id": "evt_2a00",
        "type": "checkout.session.async_payment_started",
        "data": { "object": { "id": provider_ref } }
    })
    .to_string();
    let signature = calculate_hmac(WEBHOOK_SECRET, payload.as_bytes());

    let headers = [(HOSTED_SIGNATURE_HEADER, signature.as_str())];
    let (status, body) =
        post_request("/webhook/checkout", payload, &headers, configure_webhook(db.clone(), true)).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("ignored"));
    assert_eq!(order_status_for(&db, &provider_ref).await, OrderStatusType::Pending);
}

#[actix_web::test]
async fn duplicate_deliveries_are_acknowledged_without_side_effects() {
    let _ = env_logger::try_init().ok();
    let db = new_test_db().await;
    let provider_ref = seed_card_order(&db).await;
    let payload = session_completed_payload(&provider_ref);
    let signature = calculate_hmac(WEBHOOK_SECRET, payload.as_bytes());
    let headers = [(HOSTED_SIGNATURE_HEADER, signature.as_str())];

    let (status, _) =
        post_request("/webhook/checkout", payload.clone(), &headers, configure_webhook(db.clone(), true))
            .await
            .unwrap();
    assert_eq!(status, StatusCode::OK);
    let (status, body) =
        post_request("/webhook/checkout", payload, &headers, configure_webhook(db.clone(), true)).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("already processed"));
    assert_eq!(order_status_for(&db, &provider_ref).await, OrderStatusType::Paid);
}
