//! Observable records emitted by sale operations

use curve_sale_common::{Address, UnixTimestamp};

/// Append-only event stream of a sale instance
///
/// Amounts are atomic asset units; prices are currency units per whole unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaleEvent {
    Initialized {
        creator: Address,
        capacity: u64,
        starting_price: u64,
        start_time: UnixTimestamp,
        duration: u64,
    },
    PurchaseRecorded {
        buyer: Address,
        amount: u64,
        price: u64,
    },
    SaleRecorded {
        seller: Address,
        amount: u64,
        price: u64,
    },
    Withdrawn {
        creator: Address,
        asset_amount: u64,
        currency_amount: u64,
    },
}

/// Settlement summary returned by `buy` and `sell`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TradeReceipt {
    /// Atomic asset units moved
    pub amount: u64,
    /// Unit price applied (post-trade curve point)
    pub price: u64,
    /// Currency units moved: whole units * price
    pub notional: u64,
    /// Sold counter after the trade
    pub sold_after: u64,
}

/// What a `withdraw` call actually moved to the creator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WithdrawReceipt {
    pub asset_amount: u64,
    pub currency_amount: u64,
}

impl WithdrawReceipt {
    /// Nothing left to drain
    pub fn is_noop(&self) -> bool {
        self.asset_amount == 0 && self.currency_amount == 0
    }
}
