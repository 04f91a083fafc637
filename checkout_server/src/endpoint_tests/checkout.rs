use actix_web::{http::StatusCode, web, web::ServiceConfig};
use checkout_engine::{
    db_types::{OrderNumber, OrderStatusType, PaymentMethod},
    test_utils::fakes::{FakeCatalog, FakeInitiator},
    OrderQueryApi,
    SqliteDatabase,
};
use chrono::{TimeZone, Utc};
use serde_json::json;
use sps_common::Money;

use super::{
    helpers::{get_request, new_test_db, post_request, test_checkout_api},
    mocks::MockOrderManager,
};
use crate::routes::{OrderStatusRoute, PlaceOrderRoute};

fn checkout_body(method: &str, client_total: i64, idempotency_key: &str) -> String {
    json!({
        "items": [{ "product_id": "tee", "variant_id": "tee-m", "quantity": 2 }],
        "client_total": client_total,
        "currency": "EUR",
        "customer_email": "jo@example.com",
        "shipping_address": {
            "name": "Jo Customer",
            "line1": "12 Market Lane",
            "city": "Berlin",
            "postal_code": "10115",
            "country": "DE"
        },
        "payment_method": method,
        "idempotency_key": idempotency_key
    })
    .to_string()
}

#[actix_web::test]
async fn bank_transfer_checkout_returns_instructions() {
    let _ = env_logger::try_init().ok();
    let db = new_test_db().await;
    let catalog = FakeCatalog::new().with_variant("tee", "tee-m", "Tee (M)", Money::from_cents(2450));
    let api = test_checkout_api(db, catalog, FakeInitiator::new());
    let configure = move |cfg: &mut ServiceConfig| {
        cfg.service(PlaceOrderRoute::<SqliteDatabase, FakeCatalog, FakeInitiator>::new()).app_data(web::Data::new(api));
    };

    let (status, body) =
        post_request("/checkout", checkout_body("bank_transfer", 4900, "ik-ep-1"), &[], configure).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    let response: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(response["status"], "PendingPayment");
    assert_eq!(response["next"]["type"], "bank_transfer");
    let order_number = response["order_number"].as_str().unwrap();
    assert_eq!(response["next"]["instructions"]["reference"], order_number);
    assert_eq!(response["next"]["instructions"]["iban"], "DE02120300000000202051");
}

#[actix_web::test]
async fn empty_cart_is_rejected_with_a_reason_code() {
    let _ = env_logger::try_init().ok();
    let db = new_test_db().await;
    let api = test_checkout_api(db, FakeCatalog::new(), FakeInitiator::new());
    let configure = move |cfg: &mut ServiceConfig| {
        cfg.service(PlaceOrderRoute::<SqliteDatabase, FakeCatalog, FakeInitiator>::new()).app_data(web::Data::new(api));
    };

    let body = json!({
        "items": [],
        "client_total": 0,
        "currency": "EUR",
        "customer_email": "jo@example.com",
        "shipping_address": {
            "name": "Jo Customer",
            "line1": "12 Market Lane",
            "city": "Berlin",
            "postal_code": "10115",
            "country": "DE"
        },
        "payment_method": "bank_transfer",
        "idempotency_key": "ik-ep-2"
    })
    .to_string();
    let (status, body) = post_request("/checkout", body, &[], configure).await.unwrap();
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let response: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(response["code"], "empty_cart");
}

#[actix_web::test]
async fn mismatched_client_total_is_rejected() {
    let _ = env_logger::try_init().ok();
    let db = new_test_db().await;
    let catalog = FakeCatalog::new().with_variant("tee", "tee-m", "Tee (M)", Money::from_cents(2450));
    let api = test_checkout_api(db, catalog, FakeInitiator::new());
    let configure = move |cfg: &mut ServiceConfig| {
        cfg.service(PlaceOrderRoute::<SqliteDatabase, FakeCatalog, FakeInitiator>::new()).app_data(web::Data::new(api));
    };

    let (status, body) =
        post_request("/checkout", checkout_body("bank_transfer", 100, "ik-ep-3"), &[], configure).await.unwrap();
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let response: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(response["code"], "total_mismatch");
}

#[actix_web::test]
async fn failed_payment_initiation_reports_the_saved_order() {
    let _ = env_logger::try_init().ok();
    let db = new_test_db().await;
    let catalog = FakeCatalog::new().with_variant("tee", "tee-m", "Tee (M)", Money::from_cents(2450));
    let api = test_checkout_api(db, catalog, FakeInitiator::failing());
    let configure = move |cfg: &mut ServiceConfig| {
        cfg.service(PlaceOrderRoute::<SqliteDatabase, FakeCatalog, FakeInitiator>::new()).app_data(web::Data::new(api));
    };

    let (status, body) =
        post_request("/checkout", checkout_body("wallet_redirect", 4900, "ik-ep-4"), &[], configure).await.unwrap();
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    let response: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(response["code"], "payment_initiation_failed");
    assert!(response["order_number"].as_str().unwrap().starts_with("SP-"));
}

#[actix_web::test]
async fn order_status_poll() {
    let _ = env_logger::try_init().ok();
    let mut orders = MockOrderManager::new();
    orders.expect_fetch_order_by_number().returning(|number| {
        if number.as_str() == "SP-KNOWN00001" {
            Ok(Some(stored_order()))
        } else {
            Ok(None)
        }
    });
    let api = OrderQueryApi::new(orders);
    let configure = move |cfg: &mut ServiceConfig| {
        cfg.service(OrderStatusRoute::<MockOrderManager>::new()).app_data(web::Data::new(api));
    };
    let (status, body) = get_request("/order/SP-KNOWN00001", configure).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"order_number":"SP-KNOWN00001","status":"Paid"}"#);
}

#[actix_web::test]
async fn unknown_order_number_is_a_404() {
    let _ = env_logger::try_init().ok();
    let mut orders = MockOrderManager::new();
    orders.expect_fetch_order_by_number().returning(|_| Ok(None));
    let api = OrderQueryApi::new(orders);
    let configure = move |cfg: &mut ServiceConfig| {
        cfg.service(OrderStatusRoute::<MockOrderManager>::new()).app_data(web::Data::new(api));
    };
    let (status, body) = get_request("/order/SP-NOPE", configure).await.unwrap();
    assert_eq!(status, StatusCode::NOT_FOUND);
    let response: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(response["code"], "not_found");
}

fn stored_order() -> checkout_engine::db_types::Order {
    checkout_engine::db_types::Order {
        id: 1,
        order_number: OrderNumber("SP-KNOWN00001".into()),
        customer_id: Some("u-1001".into()),
        customer_email: None,
        total_price: Money::from_cents(7990),
        currency: "EUR".into(),
        payment_method: PaymentMethod::Card,
        status: OrderStatusType::Paid,
        shipping_address: "{}".into(),
        referral_code: None,
        coupon_code: None,
        provider: None,
        provider_ref: Some("cs_901aa3f2".into()),
        redirect_url: None,
        idempotency_key: "ik-known".into(),
        admin_notes: None,
        created_at: Utc.with_ymd_and_hms(2024, 6, 12, 9, 30, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2024, 6, 12, 9, 45, 0).unwrap(),
    }
}
