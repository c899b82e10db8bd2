//! Per-instance sale accounting

use curve_sale_common::{Address, SaleError, SalePhase, UnixTimestamp};

/// Accounting state of one sale instance
///
/// Everything except `sold` is fixed at initialization. `sold` is measured in
/// atomic asset units and always satisfies `sold <= capacity`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleLedger {
    /// Asset mint being sold
    pub asset: Address,
    /// Mint buyers pay with
    pub currency: Address,
    /// Receives unsold escrow and proceeds on withdraw
    pub creator: Address,
    /// Atomic units per whole asset unit, captured at init
    pub unit_scale: u64,
    /// Total atomic units offered
    pub capacity: u64,
    /// Atomic units currently held by buyers
    sold: u64,
    /// Currency atomic units per whole unit when nothing is sold
    pub starting_price: u64,
    pub start_time: UnixTimestamp,
    /// Window length in seconds
    pub duration: u64,
}

impl SaleLedger {
    pub fn new(
        asset: Address,
        currency: Address,
        creator: Address,
        unit_scale: u64,
        capacity: u64,
        starting_price: u64,
        start_time: UnixTimestamp,
        duration: u64,
    ) -> Result<Self, SaleError> {
        if capacity == 0 || starting_price == 0 || unit_scale == 0 {
            return Err(SaleError::InvalidInput);
        }
        if capacity % unit_scale != 0 {
            return Err(SaleError::InvalidCapacityGranularity);
        }
        start_time
            .checked_add(duration)
            .ok_or(SaleError::Overflow)?;

        Ok(Self {
            asset,
            currency,
            creator,
            unit_scale,
            capacity,
            sold: 0,
            starting_price,
            start_time,
            duration,
        })
    }

    pub fn sold(&self) -> u64 {
        self.sold
    }

    /// Atomic units still held in escrow for buyers
    pub fn remaining(&self) -> u64 {
        self.capacity - self.sold
    }

    pub fn end_time(&self) -> UnixTimestamp {
        // Checked in `new`
        self.start_time.saturating_add(self.duration)
    }

    /// Active strictly before `start_time + duration`, ended from then on
    pub fn phase(&self, now: UnixTimestamp) -> SalePhase {
        if now < self.end_time() {
            SalePhase::Active
        } else {
            SalePhase::Ended
        }
    }

    /// Sold count after a hypothetical purchase of `amount` atomic units
    pub fn sold_after_purchase(&self, amount: u64) -> Result<u64, SaleError> {
        let next = self.sold.checked_add(amount).ok_or(SaleError::ExceedsMaxAmount)?;
        if next > self.capacity {
            return Err(SaleError::ExceedsMaxAmount);
        }
        Ok(next)
    }

    /// Sold count after a hypothetical return of `amount` atomic units
    pub fn sold_after_return(&self, amount: u64) -> Result<u64, SaleError> {
        self.sold.checked_sub(amount).ok_or(SaleError::InvalidSellAmount)
    }

    /// Record a purchase; fails without touching state if capacity would be exceeded
    pub fn record_purchase(&mut self, amount: u64) -> Result<(), SaleError> {
        self.sold = self.sold_after_purchase(amount)?;
        Ok(())
    }

    /// Record a return; fails without touching state if more than sold
    pub fn record_return(&mut self, amount: u64) -> Result<(), SaleError> {
        self.sold = self.sold_after_return(amount)?;
        Ok(())
    }

    /// Restore a sold count captured earlier in the same operation
    pub(crate) fn rollback_sold(&mut self, sold: u64) {
        debug_assert!(sold <= self.capacity);
        self.sold = sold;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCALE: u64 = 1_000_000;

    fn make_ledger() -> SaleLedger {
        SaleLedger::new(
            [1; 32],
            [2; 32],
            [3; 32],
            SCALE,
            1000 * SCALE,
            5_000,
            1_000,
            86_400,
        )
        .unwrap()
    }

    #[test]
    fn test_new_validates() {
        assert_eq!(
            SaleLedger::new([1; 32], [2; 32], [3; 32], SCALE, 0, 1, 0, 10),
            Err(SaleError::InvalidInput)
        );
        assert_eq!(
            SaleLedger::new([1; 32], [2; 32], [3; 32], SCALE, SCALE, 0, 0, 10),
            Err(SaleError::InvalidInput)
        );
        assert_eq!(
            SaleLedger::new([1; 32], [2; 32], [3; 32], SCALE, SCALE + 1, 1, 0, 10),
            Err(SaleError::InvalidCapacityGranularity)
        );
        assert_eq!(
            SaleLedger::new([1; 32], [2; 32], [3; 32], SCALE, SCALE, 1, u64::MAX, 10),
            Err(SaleError::Overflow)
        );
    }

    #[test]
    fn test_phase_boundaries() {
        let ledger = make_ledger();
        assert_eq!(ledger.end_time(), 87_400);
        assert_eq!(ledger.phase(1_000), SalePhase::Active);
        assert_eq!(ledger.phase(87_399), SalePhase::Active);
        assert_eq!(ledger.phase(87_400), SalePhase::Ended);
        assert_eq!(ledger.phase(u64::MAX), SalePhase::Ended);
    }

    #[test]
    fn test_purchase_and_return() {
        let mut ledger = make_ledger();

        ledger.record_purchase(400 * SCALE).unwrap();
        assert_eq!(ledger.sold(), 400 * SCALE);
        assert_eq!(ledger.remaining(), 600 * SCALE);

        ledger.record_return(150 * SCALE).unwrap();
        assert_eq!(ledger.sold(), 250 * SCALE);
    }

    #[test]
    fn test_capacity_guards_leave_state_untouched() {
        let mut ledger = make_ledger();
        ledger.record_purchase(1000 * SCALE).unwrap();

        assert_eq!(ledger.record_purchase(1), Err(SaleError::ExceedsMaxAmount));
        assert_eq!(ledger.sold(), 1000 * SCALE);

        assert_eq!(ledger.record_purchase(u64::MAX), Err(SaleError::ExceedsMaxAmount));

        ledger.record_return(1000 * SCALE).unwrap();
        assert_eq!(ledger.record_return(1), Err(SaleError::InvalidSellAmount));
        assert_eq!(ledger.sold(), 0);
    }
}
