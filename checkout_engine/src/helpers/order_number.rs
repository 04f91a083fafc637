use rand::Rng;

use crate::db_types::OrderNumber;

/// Alphabet for generated order numbers. Excludes 0/O, 1/I and similar pairs, since customers
/// copy these into bank-transfer memo fields by hand.
const ALPHABET: &[u8] = b"23456789ABCDEFGHJKLMNPQRSTUVWXYZ";
const SUFFIX_LEN: usize = 10;

/// Generates a fresh order number of the form `SP-XXXXXXXXXX`.
///
/// 10 characters over a 32-symbol alphabet give 50 bits of randomness, which makes collisions
/// vanishingly rare; the store's unique constraint catches the residual case and the caller
/// simply regenerates.
pub fn new_order_number() -> OrderNumber {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..SUFFIX_LEN).map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char).collect();
    OrderNumber(format!("SP-{suffix}"))
}
