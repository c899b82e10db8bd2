//! Deterministic sale instance addresses

use curve_sale_common::{Address, Pubkey};

/// Seed prefix for sale instance addresses
pub const SALE_SEED: &[u8] = b"sale";

/// Derive the instance address for a sale of `asset`
///
/// blake3(SALE_SEED || program_id || asset). One asset maps to exactly one
/// sale instance per program.
pub fn derive_sale_address(program_id: &Pubkey, asset: &Address) -> Address {
    let mut hasher = blake3::Hasher::new();
    hasher.update(SALE_SEED);
    hasher.update(program_id);
    hasher.update(asset);
    *hasher.finalize().as_bytes()
}
