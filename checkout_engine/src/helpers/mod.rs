mod order_number;
mod totals;

pub use order_number::new_order_number;
pub use totals::compute_authoritative_total;
