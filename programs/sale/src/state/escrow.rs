//! Escrow balances held by a sale instance

use crate::ledger::AssetLedger;
use crate::state::SaleLedger;
use curve_sale_common::Address;

/// Snapshot of what the instance address holds in the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EscrowBalances {
    /// Asset units held (unsold escrow)
    pub asset: u64,
    /// Currency units held (proceeds)
    pub currency: u64,
}

impl EscrowBalances {
    /// Read the holder's balances in the sale's two mints
    pub fn read(ledger: &dyn AssetLedger, sale: &SaleLedger, holder: &Address) -> Self {
        Self {
            asset: ledger.balance_of(&sale.asset, holder),
            currency: ledger.balance_of(&sale.currency, holder),
        }
    }

    /// Escrow still backs every unsold unit
    pub fn covers(&self, sale: &SaleLedger) -> bool {
        self.asset >= sale.remaining()
    }

    /// Unsold units payable to the creator, bounded by what is actually held
    pub fn unsold_payout(&self, sale: &SaleLedger) -> u64 {
        sale.remaining().min(self.asset)
    }

    pub fn is_empty(&self) -> bool {
        self.asset == 0 && self.currency == 0
    }
}
