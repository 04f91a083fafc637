//! Fires a burst of concurrent checkouts at a single store and verifies that order numbers stay
//! unique and that every order lands exactly once.
use std::collections::HashSet;

use checkout_engine::{
    db_types::PaymentMethod,
    test_utils::fakes::{FakeCatalog, FakeInitiator},
    traits::OrderManagement,
    OrderQueryFilter,
};
use sps_common::Money;

use crate::support::{checkout_api, guest_request, line, new_test_db};

mod support;

const NUM_ORDERS: usize = 50;

#[tokio::test]
async fn burst_orders() {
    let db = new_test_db().await;
    let catalog = FakeCatalog::new().with_variant("tee", "tee-m", "Tee (M)", Money::from_cents(2450));

    let mut handles = Vec::with_capacity(NUM_ORDERS);
    for i in 0..NUM_ORDERS {
        let api = checkout_api(db.clone(), catalog.clone(), FakeInitiator::new());
        handles.push(tokio::spawn(async move {
            let request = guest_request(
                vec![line("tee", "tee-m", 1)],
                Money::from_cents(2450),
                PaymentMethod::BankTransfer,
                &format!("ik-burst-{i}"),
            );
            api.place_order(request).await.expect("checkout failed")
        }));
    }

    let mut numbers = HashSet::new();
    for handle in handles {
        let outcome = handle.await.expect("task panicked");
        assert!(numbers.insert(outcome.order.order_number.0.clone()), "duplicate order number issued");
    }
    assert_eq!(numbers.len(), NUM_ORDERS);

    let orders = db.search_orders(OrderQueryFilter::default()).await.expect("query failed");
    assert_eq!(orders.len(), NUM_ORDERS);
}
