//! Sale registry - factory and owner of sale instances
//!
//! Instances are keyed by an address derived from the asset they sell and
//! each one sits behind its own mutex, so operations on one sale run one at
//! a time while different sales never share mutable state.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::engine::{InitParams, SaleEngine};
use crate::ledger::AssetLedger;
use crate::pda::derive_sale_address;
use crate::price_model::PriceModel;
use curve_sale_common::{short_address, Address, Pubkey, SaleError, UnixTimestamp};

pub type SaleHandle = Arc<Mutex<SaleEngine>>;

pub struct SaleRegistry {
    /// Program the instance addresses are derived under
    program_id: Pubkey,
    /// Curve shared read-only by every instance
    model: Arc<PriceModel>,
    sales: HashMap<Address, SaleHandle>,
}

impl SaleRegistry {
    pub fn new(program_id: Pubkey, model: Arc<PriceModel>) -> Self {
        Self {
            program_id,
            model,
            sales: HashMap::new(),
        }
    }

    pub fn model(&self) -> &Arc<PriceModel> {
        &self.model
    }

    /// Address the sale of `asset` lives at, whether or not it exists yet
    ///
    /// Creators approve this address for the escrow before `create_sale`.
    pub fn sale_address(&self, asset: &Address) -> Address {
        derive_sale_address(&self.program_id, asset)
    }

    /// Deploy and initialize the sale for `params.asset`
    ///
    /// The instance is only registered if `initialize` succeeds.
    pub fn create_sale(
        &mut self,
        ledger: &mut dyn AssetLedger,
        params: &InitParams,
        now: UnixTimestamp,
    ) -> Result<Address, SaleError> {
        let address = self.sale_address(&params.asset);
        if self.sales.contains_key(&address) {
            log::warn!("Error: sale {} already exists", short_address(&address));
            return Err(SaleError::AlreadyInitialized);
        }

        let mut engine = SaleEngine::new(address, Arc::clone(&self.model));
        engine.initialize(ledger, params, now)?;

        self.sales.insert(address, Arc::new(Mutex::new(engine)));
        log::info!(
            "Registered sale {} for asset {}",
            short_address(&address),
            short_address(&params.asset)
        );
        Ok(address)
    }

    pub fn get(&self, address: &Address) -> Result<SaleHandle, SaleError> {
        self.sales
            .get(address)
            .cloned()
            .ok_or(SaleError::SaleNotFound)
    }

    /// Run `f` with exclusive access to one sale instance
    pub fn with_sale<R>(
        &self,
        address: &Address,
        f: impl FnOnce(&mut SaleEngine) -> Result<R, SaleError>,
    ) -> Result<R, SaleError> {
        let handle = self.sales.get(address).ok_or(SaleError::SaleNotFound)?;
        let mut engine = handle.lock().map_err(|_| SaleError::StateUnavailable)?;
        f(&mut engine)
    }

    /// Registered instance addresses, sorted
    pub fn addresses(&self) -> Vec<Address> {
        let mut addresses: Vec<Address> = self.sales.keys().copied().collect();
        addresses.sort_unstable();
        addresses
    }

    pub fn len(&self) -> usize {
        self.sales.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sales.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::MemoryLedger;
    use crate::price_model::CurveParameters;
    use curve_sale_common::{SalePhase, FULL_SCALE};

    const PROGRAM: Pubkey = [42; 32];
    const CURRENCY: Address = [2; 32];
    const CREATOR: Address = [3; 32];
    const T0: u64 = 1_000_000;

    fn registry() -> SaleRegistry {
        let pct = FULL_SCALE / 100;
        let params = CurveParameters::new(pct, 50 * pct, 200 * pct, 50 * pct).unwrap();
        SaleRegistry::new(PROGRAM, Arc::new(PriceModel::new(params)))
    }

    fn fund(ledger: &mut MemoryLedger, registry: &SaleRegistry, asset: Address) -> InitParams {
        ledger.create_mint(asset, 0).unwrap();
        ledger.mint_to(&asset, &CREATOR, 100).unwrap();
        ledger.approve(&asset, &CREATOR, &registry.sale_address(&asset), 100);

        InitParams {
            asset,
            currency: CURRENCY,
            creator: CREATOR,
            starting_price: 10,
            capacity: 100,
            duration: 7_200,
        }
    }

    #[test]
    fn test_create_and_lookup() {
        let mut registry = registry();
        let mut ledger = MemoryLedger::new();
        ledger.create_mint(CURRENCY, 0).unwrap();

        let params = fund(&mut ledger, &registry, [1; 32]);
        let address = registry.create_sale(&mut ledger, &params, T0).unwrap();

        assert_eq!(address, derive_sale_address(&PROGRAM, &[1; 32]));
        assert_eq!(registry.len(), 1);
        assert_eq!(ledger.balance_of(&[1; 32], &address), 100);

        let phase = registry.with_sale(&address, |engine| Ok(engine.phase(T0))).unwrap();
        assert_eq!(phase, SalePhase::Active);

        let handle = registry.get(&address).unwrap();
        let engine = handle.lock().unwrap();
        assert!(std::ptr::eq(engine.model(), registry.model().as_ref()));
    }

    #[test]
    fn test_duplicate_asset_rejected() {
        let mut registry = registry();
        let mut ledger = MemoryLedger::new();
        ledger.create_mint(CURRENCY, 0).unwrap();

        let params = fund(&mut ledger, &registry, [1; 32]);
        registry.create_sale(&mut ledger, &params, T0).unwrap();

        assert_eq!(
            registry.create_sale(&mut ledger, &params, T0),
            Err(SaleError::AlreadyInitialized)
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_failed_initialize_is_not_registered() {
        let mut registry = registry();
        let mut ledger = MemoryLedger::new();
        ledger.create_mint(CURRENCY, 0).unwrap();

        let mut params = fund(&mut ledger, &registry, [1; 32]);
        params.duration = 60;

        assert_eq!(
            registry.create_sale(&mut ledger, &params, T0),
            Err(SaleError::SaleTooShort)
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn test_instances_are_independent() {
        let mut registry = registry();
        let mut ledger = MemoryLedger::new();
        ledger.create_mint(CURRENCY, 0).unwrap();

        let first = fund(&mut ledger, &registry, [1; 32]);
        let second = fund(&mut ledger, &registry, [5; 32]);
        let a = registry.create_sale(&mut ledger, &first, T0).unwrap();
        let b = registry.create_sale(&mut ledger, &second, T0).unwrap();

        let buyer: Address = [9; 32];
        ledger.mint_to(&CURRENCY, &buyer, 10_000).unwrap();
        ledger.approve(&CURRENCY, &buyer, &a, 10_000);

        registry
            .with_sale(&a, |engine| engine.buy(&mut ledger, &buyer, 10, T0))
            .unwrap();

        let sold_a = registry.with_sale(&a, |e| Ok(e.state().map(|s| s.sold()))).unwrap();
        let sold_b = registry.with_sale(&b, |e| Ok(e.state().map(|s| s.sold()))).unwrap();
        assert_eq!(sold_a, Some(10));
        assert_eq!(sold_b, Some(0));
        assert_eq!(registry.addresses().len(), 2);
    }

    #[test]
    fn test_unknown_sale() {
        let registry = registry();
        assert_eq!(registry.get(&[1; 32]).err(), Some(SaleError::SaleNotFound));
        assert_eq!(
            registry.with_sale(&[1; 32], |_| Ok(())),
            Err(SaleError::SaleNotFound)
        );
    }
}
