use checkout_engine::{
    db_types::{Address, PaymentMethod},
    events::EventProducers,
    test_utils::{
        fakes::{FakeCatalog, FakeInitiator},
        prepare_env::{prepare_test_env, random_db_path},
    },
    BankDetails,
    CartItem,
    CheckoutApi,
    CustomerIdentity,
    PlaceOrderRequest,
    SqliteDatabase,
};
use sps_common::Money;

pub async fn new_test_db() -> SqliteDatabase {
    let url = random_db_path();
    prepare_test_env(&url).await;
    SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating connection to database")
}

pub fn bank_details() -> BankDetails {
    BankDetails {
        recipient: "Acme Storefront GmbH".into(),
        iban: "DE02120300000000202051".into(),
        bic: "BYLADEM1001".into(),
        bank_name: "Deutsche Kreditbank".into(),
    }
}

pub fn checkout_api(
    db: SqliteDatabase,
    catalog: FakeCatalog,
    initiator: FakeInitiator,
) -> CheckoutApi<SqliteDatabase, FakeCatalog, FakeInitiator> {
    CheckoutApi::new(db, catalog, initiator, bank_details(), EventProducers::default())
}

pub fn shipping_address() -> Address {
    Address {
        name: "Jo Customer".into(),
        line1: "12 Market Lane".into(),
        line2: None,
        city: "Berlin".into(),
        postal_code: "10115".into(),
        country: "DE".into(),
    }
}

pub fn guest_request(
    items: Vec<CartItem>,
    client_total: Money,
    method: PaymentMethod,
    idempotency_key: &str,
) -> PlaceOrderRequest {
    PlaceOrderRequest {
        items,
        client_total,
        currency: "EUR".into(),
        customer: CustomerIdentity::try_new(None, Some("jo@example.com".into())).unwrap(),
        shipping_address: shipping_address(),
        payment_method: method,
        referral_code: None,
        coupon_code: None,
        idempotency_key: idempotency_key.into(),
    }
}

pub fn line(product_id: &str, variant_id: &str, quantity: i64) -> CartItem {
    CartItem { product_id: product_id.into(), variant_id: variant_id.into(), quantity }
}
