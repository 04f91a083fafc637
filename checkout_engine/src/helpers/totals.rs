use sps_common::Money;

use crate::db_types::NewLineItem;

/// The authoritative order total: the sum of the line totals that were themselves derived from
/// catalog unit prices. The client-submitted figure is only ever compared against this; it is
/// never the source of truth.
pub fn compute_authoritative_total(items: &[NewLineItem]) -> Money {
    items.iter().map(|i| i.line_total).sum()
}

#[cfg(test)]
mod test {
    use super::*;

    fn item(unit_cents: i64, quantity: i64) -> NewLineItem {
        NewLineItem {
            product_id: "p1".into(),
            variant_id: "v1".into(),
            name: "Widget".into(),
            quantity,
            unit_price: Money::from_cents(unit_cents),
            line_total: Money::from_cents(unit_cents) * quantity,
        }
    }

    #[test]
    fn sums_line_totals() {
        let items = vec![item(1050, 2), item(900, 3)];
        assert_eq!(compute_authoritative_total(&items), Money::from_cents(4800));
    }

    #[test]
    fn empty_cart_sums_to_zero() {
        assert_eq!(compute_authoritative_total(&[]), Money::default());
    }
}
