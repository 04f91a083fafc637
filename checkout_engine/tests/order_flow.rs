//! Checkout orchestration flow tests against the real SQLite store.
use checkout_engine::{
    db_types::{OrderStatusType, PaymentMethod, PaymentProvider},
    sqlite::db::partners,
    test_utils::fakes::{FakeCatalog, FakeInitiator},
    traits::{CheckoutDatabase, OrderManagement},
    CheckoutError,
    NextAction,
    OrderQueryFilter,
    ValidationError,
};
use sps_common::Money;

use crate::support::{checkout_api, guest_request, line, new_test_db};

mod support;

#[tokio::test]
async fn bank_transfer_order_stores_the_recomputed_total() {
    let db = new_test_db().await;
    // 2 × 24.50 = 49.00 EUR, just under the free-shipping threshold
    let catalog = FakeCatalog::new().with_variant("tee", "tee-m", "Tee (M)", Money::from_cents(2450));
    let initiator = FakeInitiator::new();
    let api = checkout_api(db.clone(), catalog, initiator.clone());

    let request = guest_request(vec![line("tee", "tee-m", 2)], Money::from_cents(4900), PaymentMethod::BankTransfer, "ik-bank-1");
    let outcome = api.place_order(request).await.expect("checkout failed");

    assert_eq!(outcome.order.status, OrderStatusType::PendingPayment);
    assert_eq!(outcome.order.payment_method, PaymentMethod::BankTransfer);
    assert_eq!(outcome.order.total_price, Money::from_cents(4900));
    assert_eq!(outcome.order.currency, "EUR");
    match outcome.action {
        NextAction::BankTransfer { instructions } => {
            assert_eq!(instructions.reference, outcome.order.order_number);
            assert_eq!(instructions.amount, Money::from_cents(4900));
            assert_eq!(instructions.iban, "DE02120300000000202051");
        },
        other => panic!("Expected bank instructions, got {other:?}"),
    }
    // no external call for the bank-transfer path
    assert_eq!(initiator.call_count(), 0);
    // line items were snapshotted with catalog prices
    let items = db.fetch_line_items(outcome.order.id).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].unit_price, Money::from_cents(2450));
    assert_eq!(items[0].line_total, Money::from_cents(4900));
}

#[tokio::test]
async fn client_submitted_total_is_never_trusted() {
    let db = new_test_db().await;
    let catalog = FakeCatalog::new().with_variant("tee", "tee-m", "Tee (M)", Money::from_cents(2450));
    let api = checkout_api(db.clone(), catalog, FakeInitiator::new());

    // The client claims the cart is cheaper than the catalog says
    let request = guest_request(vec![line("tee", "tee-m", 2)], Money::from_cents(100), PaymentMethod::BankTransfer, "ik-cheat");
    let err = api.place_order(request).await.expect_err("mismatched total must be rejected");
    match err {
        CheckoutError::Validation(ValidationError::TotalMismatch { expected, submitted }) => {
            assert_eq!(expected, Money::from_cents(4900));
            assert_eq!(submitted, Money::from_cents(100));
        },
        other => panic!("Expected a total mismatch, got {other}"),
    }
    // nothing was persisted
    let orders = db.search_orders(OrderQueryFilter::default()).await.unwrap();
    assert!(orders.is_empty());
}

#[tokio::test]
async fn empty_cart_is_rejected() {
    let db = new_test_db().await;
    let api = checkout_api(db, FakeCatalog::new(), FakeInitiator::new());
    let request = guest_request(vec![], Money::default(), PaymentMethod::BankTransfer, "ik-empty");
    let err = api.place_order(request).await.expect_err("empty cart must be rejected");
    assert!(matches!(err, CheckoutError::Validation(ValidationError::EmptyCart)));
}

#[tokio::test]
async fn unsellable_variant_is_rejected() {
    let db = new_test_db().await;
    let catalog = FakeCatalog::new().with_unsellable_variant("tee", "tee-xl", "Tee (XL)");
    let api = checkout_api(db, catalog, FakeInitiator::new());
    let request = guest_request(vec![line("tee", "tee-xl", 1)], Money::from_cents(2450), PaymentMethod::BankTransfer, "ik-oos");
    let err = api.place_order(request).await.expect_err("unsellable variant must be rejected");
    match err {
        CheckoutError::Validation(e @ ValidationError::UnsellableVariant { .. }) => {
            assert_eq!(e.code(), "unsellable_variant");
        },
        other => panic!("Expected an unsellable-variant error, got {other}"),
    }
}

#[tokio::test]
async fn fully_discounted_cart_is_rejected_before_any_adapter_call() {
    let db = new_test_db().await;
    // A 100% coupon shows up here as a zero-priced variant
    let catalog = FakeCatalog::new().with_variant("promo", "promo-1", "Giveaway", Money::default());
    let initiator = FakeInitiator::new();
    let api = checkout_api(db.clone(), catalog, initiator.clone());

    let request = guest_request(vec![line("promo", "promo-1", 1)], Money::default(), PaymentMethod::WalletRedirect, "ik-zero");
    let err = api.place_order(request).await.expect_err("zero total must be rejected");
    match err {
        CheckoutError::Validation(e @ ValidationError::NonPositiveAmount(_)) => {
            assert_eq!(e.code(), "non_positive_amount");
        },
        other => panic!("Expected a non-positive-amount error, got {other}"),
    }
    assert_eq!(initiator.call_count(), 0, "The gateway must not be called for a zero amount");
    assert!(db.search_orders(OrderQueryFilter::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn referral_code_freezes_commission_at_order_time() {
    let db = new_test_db().await;
    let mut conn = db.pool().acquire().await.unwrap();
    let partner = partners::insert_partner("AFF-MAY", "May's Reviews", 500, checkout_engine::db_types::PartnerStatus::Active, &mut conn)
        .await
        .unwrap();
    drop(conn);

    let catalog = FakeCatalog::new().with_variant("tee", "tee-m", "Tee (M)", Money::from_cents(2000));
    let api = checkout_api(db.clone(), catalog, FakeInitiator::new());
    let mut request = guest_request(vec![line("tee", "tee-m", 2)], Money::from_cents(4000), PaymentMethod::BankTransfer, "ik-ref");
    request.referral_code = Some("AFF-MAY".into());
    let outcome = api.place_order(request).await.unwrap();

    let record = db.fetch_commission_for_order(outcome.order.id).await.unwrap().expect("commission expected");
    assert_eq!(record.partner_id, partner.id);
    // 5% of 40.00
    assert_eq!(record.amount, Money::from_cents(200));
    assert!(record.eligible_at.is_none());

    // A later rate change must not touch the frozen record
    sqlx::query("UPDATE partners SET rate_basis_points = 1000 WHERE id = $1")
        .bind(partner.id)
        .execute(db.pool())
        .await
        .unwrap();
    let unchanged = db.fetch_commission_for_order(outcome.order.id).await.unwrap().unwrap();
    assert_eq!(unchanged.amount, Money::from_cents(200));
}

#[tokio::test]
async fn unknown_referral_code_still_places_the_order() {
    let db = new_test_db().await;
    let catalog = FakeCatalog::new().with_variant("tee", "tee-m", "Tee (M)", Money::from_cents(2000));
    let api = checkout_api(db.clone(), catalog, FakeInitiator::new());
    let mut request = guest_request(vec![line("tee", "tee-m", 1)], Money::from_cents(2000), PaymentMethod::BankTransfer, "ik-noref");
    request.referral_code = Some("NO-SUCH-PARTNER".into());
    let outcome = api.place_order(request).await.expect("order should still succeed");
    assert!(db.fetch_commission_for_order(outcome.order.id).await.unwrap().is_none());
}

#[tokio::test]
async fn suspended_partner_accrues_no_commission() {
    let db = new_test_db().await;
    let mut conn = db.pool().acquire().await.unwrap();
    partners::insert_partner("AFF-OLD", "Dormant", 500, checkout_engine::db_types::PartnerStatus::Suspended, &mut conn)
        .await
        .unwrap();
    drop(conn);

    let catalog = FakeCatalog::new().with_variant("tee", "tee-m", "Tee (M)", Money::from_cents(2000));
    let api = checkout_api(db.clone(), catalog, FakeInitiator::new());
    let mut request = guest_request(vec![line("tee", "tee-m", 1)], Money::from_cents(2000), PaymentMethod::BankTransfer, "ik-susp");
    request.referral_code = Some("AFF-OLD".into());
    let outcome = api.place_order(request).await.unwrap();
    assert!(db.fetch_commission_for_order(outcome.order.id).await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_idempotency_key_returns_the_original_order() {
    let db = new_test_db().await;
    let catalog = FakeCatalog::new().with_variant("tee", "tee-m", "Tee (M)", Money::from_cents(2450));
    let api = checkout_api(db.clone(), catalog, FakeInitiator::new());

    let request = guest_request(vec![line("tee", "tee-m", 2)], Money::from_cents(4900), PaymentMethod::BankTransfer, "ik-dup");
    let first = api.place_order(request.clone()).await.unwrap();
    let second = api.place_order(request).await.unwrap();

    assert_eq!(first.order.id, second.order.id);
    assert_eq!(first.order.order_number, second.order.order_number);
    let orders = db.search_orders(OrderQueryFilter::default()).await.unwrap();
    assert_eq!(orders.len(), 1, "A double-submitted checkout must not create a second order");
}

#[tokio::test]
async fn failed_payment_initiation_keeps_the_order_and_allows_retry() {
    let db = new_test_db().await;
    let catalog = FakeCatalog::new().with_variant("tee", "tee-m", "Tee (M)", Money::from_cents(2450));
    let failing = checkout_api(db.clone(), catalog.clone(), FakeInitiator::failing());

    let request = guest_request(vec![line("tee", "tee-m", 1)], Money::from_cents(2450), PaymentMethod::WalletRedirect, "ik-retry");
    let err = failing.place_order(request.clone()).await.expect_err("initiation should fail");
    let order_number = match err {
        CheckoutError::PaymentInitiation { order_number, .. } => order_number,
        other => panic!("Expected a payment-initiation error, got {other}"),
    };
    // the order survived in Pending, payable by other means
    let order = db.fetch_order_by_number(&order_number).await.unwrap().expect("order must exist");
    assert_eq!(order.status, OrderStatusType::Pending);
    assert!(order.redirect_url.is_none());

    // replaying the same idempotency key with a healthy gateway retries initiation on the SAME order
    let healthy = checkout_api(db.clone(), catalog, FakeInitiator::new());
    let outcome = healthy.place_order(request).await.expect("retry should succeed");
    assert_eq!(outcome.order.id, order.id);
    match outcome.action {
        NextAction::Redirect { url } => assert!(url.contains(order_number.as_str())),
        other => panic!("Expected a redirect, got {other:?}"),
    }
    assert_eq!(outcome.order.provider, Some(PaymentProvider::Wallet));
    assert!(outcome.order.provider_ref.is_some());
    let orders = db.search_orders(OrderQueryFilter::default()).await.unwrap();
    assert_eq!(orders.len(), 1);
}

#[tokio::test]
async fn admin_notes_are_appended_without_touching_money_fields() {
    let db = new_test_db().await;
    let catalog = FakeCatalog::new().with_variant("tee", "tee-m", "Tee (M)", Money::from_cents(2450));
    let api = checkout_api(db.clone(), catalog, FakeInitiator::new());
    let request = guest_request(vec![line("tee", "tee-m", 2)], Money::from_cents(4900), PaymentMethod::BankTransfer, "ik-note");
    let outcome = api.place_order(request).await.unwrap();

    let noted = db.append_admin_note(outcome.order.id, "customer called about delivery").await.unwrap();
    assert_eq!(noted.admin_notes.as_deref(), Some("customer called about delivery"));
    let noted = db.append_admin_note(outcome.order.id, "refund requested").await.unwrap();
    assert_eq!(noted.admin_notes.as_deref(), Some("customer called about delivery\nrefund requested"));
    // the monetary snapshot is untouched
    assert_eq!(noted.total_price, Money::from_cents(4900));
    assert_eq!(noted.status, OrderStatusType::PendingPayment);
}

#[tokio::test]
async fn card_checkout_creates_a_hosted_session() {
    let db = new_test_db().await;
    let catalog = FakeCatalog::new().with_variant("boots", "boots-42", "Boots (42)", Money::from_cents(7990));
    let api = checkout_api(db.clone(), catalog, FakeInitiator::new());

    let request = guest_request(vec![line("boots", "boots-42", 1)], Money::from_cents(7990), PaymentMethod::Card, "ik-card");
    let outcome = api.place_order(request).await.unwrap();
    assert_eq!(outcome.order.status, OrderStatusType::Pending);
    assert_eq!(outcome.order.provider, Some(PaymentProvider::HostedCheckout));
    assert!(matches!(outcome.action, NextAction::Redirect { .. }));
    let items = db.fetch_line_items(outcome.order.id).await.unwrap();
    let sum: Money = items.iter().map(|i| i.line_total).sum();
    assert_eq!(sum, Money::from_cents(7990));
}
