//! Sale engine - lifecycle state machine over one sale instance
//!
//! Created -> Active (now < start + duration) -> Ended
//!
//! Every mutating operation updates the `sold` counter before it calls into
//! the asset ledger, and restores it (reversing any completed transfer leg)
//! if a later step fails. A failed call leaves the instance unchanged.

use std::sync::Arc;

use crate::events::{SaleEvent, TradeReceipt, WithdrawReceipt};
use crate::ledger::AssetLedger;
use crate::price_model::PriceModel;
use crate::state::{EscrowBalances, SaleLedger};
use curve_sale_common::{
    is_null_address, short_address, to_u64, whole_to_atomic, Address, LedgerError, SaleError,
    SalePhase, UnixTimestamp,
};

/// Shortest trading window accepted by `initialize` (one hour)
pub const MIN_SALE_DURATION: u64 = 3_600;

/// Arguments to `initialize`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitParams {
    pub asset: Address,
    pub currency: Address,
    pub creator: Address,
    /// Currency units per whole asset unit before any sale
    pub starting_price: u64,
    /// Atomic asset units to escrow; must be a whole number of units
    pub capacity: u64,
    /// Window length in seconds
    pub duration: u64,
}

/// One sale instance: its address, the shared curve and its accounting
#[derive(Debug)]
pub struct SaleEngine {
    address: Address,
    model: Arc<PriceModel>,
    state: Option<SaleLedger>,
    events: Vec<SaleEvent>,
}

impl SaleEngine {
    pub fn new(address: Address, model: Arc<PriceModel>) -> Self {
        Self {
            address,
            model,
            state: None,
            events: Vec::new(),
        }
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn model(&self) -> &PriceModel {
        &self.model
    }

    /// Accounting state; `None` until initialized
    pub fn state(&self) -> Option<&SaleLedger> {
        self.state.as_ref()
    }

    pub fn events(&self) -> &[SaleEvent] {
        &self.events
    }

    pub fn phase(&self, now: UnixTimestamp) -> SalePhase {
        match &self.state {
            None => SalePhase::Created,
            Some(sale) => sale.phase(now),
        }
    }

    /// Initialize the sale and pull `capacity` units of escrow from the creator
    ///
    /// The creator must have approved the instance address for `capacity`
    /// units of the asset beforehand.
    pub fn initialize(
        &mut self,
        ledger: &mut dyn AssetLedger,
        params: &InitParams,
        now: UnixTimestamp,
    ) -> Result<(), SaleError> {
        if self.state.is_some() {
            log::warn!("Error: sale {} already initialized", short_address(&self.address));
            return Err(SaleError::AlreadyInitialized);
        }

        // Safety check: every participant must be a real key
        if [&self.address, &params.asset, &params.currency, &params.creator]
            .iter()
            .any(|address| is_null_address(address))
        {
            return Err(SaleError::NullAddress);
        }
        if params.asset == params.currency {
            return Err(SaleError::InvalidInput);
        }
        if params.starting_price == 0 || params.capacity == 0 {
            return Err(SaleError::InvalidInput);
        }
        if params.duration < MIN_SALE_DURATION {
            return Err(SaleError::SaleTooShort);
        }

        ledger.unit_scale(&params.currency)?;
        let unit_scale = ledger.unit_scale(&params.asset)?;

        let sale = SaleLedger::new(
            params.asset,
            params.currency,
            params.creator,
            unit_scale,
            params.capacity,
            params.starting_price,
            now,
            params.duration,
        )?;

        // State first, then pull the escrow
        self.state = Some(sale);

        if let Err(e) = ledger.transfer_from(
            &params.asset,
            &self.address,
            &params.creator,
            &self.address,
            params.capacity,
        ) {
            self.state = None;
            log::warn!(
                "Error: escrow pull failed for sale {}: {}",
                short_address(&self.address),
                e
            );
            return Err(e.into());
        }

        self.events.push(SaleEvent::Initialized {
            creator: params.creator,
            capacity: params.capacity,
            starting_price: params.starting_price,
            start_time: now,
            duration: params.duration,
        });

        log::info!(
            "Sale {} initialized: capacity={} starting_price={} window=[{}, {})",
            short_address(&self.address),
            params.capacity,
            params.starting_price,
            now,
            now.saturating_add(params.duration)
        );
        Ok(())
    }

    /// Buy `whole_units` from escrow
    ///
    /// The price is read from the curve after this purchase has been counted,
    /// so the buyer pays for their own demand impact.
    pub fn buy(
        &mut self,
        ledger: &mut dyn AssetLedger,
        buyer: &Address,
        whole_units: u64,
        now: UnixTimestamp,
    ) -> Result<TradeReceipt, SaleError> {
        if whole_units == 0 {
            return Err(SaleError::InvalidInput);
        }
        if is_null_address(buyer) {
            return Err(SaleError::NullAddress);
        }

        let sale = self.state.as_mut().ok_or(SaleError::NotInitialized)?;
        if !sale.phase(now).is_active() {
            return Err(SaleError::SaleFinished);
        }

        let amount = whole_to_atomic(whole_units, sale.unit_scale)
            .map_err(|_| SaleError::ExceedsMaxAmount)?;
        let prior_sold = sale.sold();
        sale.record_purchase(amount)?;

        let settled = settle_purchase(
            &self.model,
            sale,
            ledger,
            &self.address,
            buyer,
            whole_units,
            amount,
        );
        let receipt = match settled {
            Ok(receipt) => receipt,
            Err(e) => {
                sale.rollback_sold(prior_sold);
                log::warn!("Error: buy of {} units rolled back: {}", whole_units, e);
                return Err(e);
            }
        };

        self.events.push(SaleEvent::PurchaseRecorded {
            buyer: *buyer,
            amount,
            price: receipt.price,
        });

        log::debug!(
            "Buy {} {} units @ {} (sold {} -> {})",
            short_address(buyer),
            whole_units,
            receipt.price,
            prior_sold,
            receipt.sold_after
        );
        Ok(receipt)
    }

    /// Return `whole_units` to the sale for currency
    ///
    /// The price is read after the return has been counted, so the seller
    /// receives the curve point their own supply pushes it down to.
    pub fn sell(
        &mut self,
        ledger: &mut dyn AssetLedger,
        seller: &Address,
        whole_units: u64,
        now: UnixTimestamp,
    ) -> Result<TradeReceipt, SaleError> {
        if whole_units == 0 {
            return Err(SaleError::InvalidInput);
        }
        if is_null_address(seller) {
            return Err(SaleError::NullAddress);
        }

        let sale = self.state.as_mut().ok_or(SaleError::NotInitialized)?;
        if !sale.phase(now).is_active() {
            return Err(SaleError::SaleFinished);
        }

        let amount = whole_to_atomic(whole_units, sale.unit_scale)
            .map_err(|_| SaleError::InvalidSellAmount)?;
        let prior_sold = sale.sold();
        sale.record_return(amount)?;

        let settled = settle_return(
            &self.model,
            sale,
            ledger,
            &self.address,
            seller,
            whole_units,
            amount,
        );
        let receipt = match settled {
            Ok(receipt) => receipt,
            Err(e) => {
                sale.rollback_sold(prior_sold);
                log::warn!("Error: sell of {} units rolled back: {}", whole_units, e);
                return Err(e);
            }
        };

        self.events.push(SaleEvent::SaleRecorded {
            seller: *seller,
            amount,
            price: receipt.price,
        });

        log::debug!(
            "Sell {} {} units @ {} (sold {} -> {})",
            short_address(seller),
            whole_units,
            receipt.price,
            prior_sold,
            receipt.sold_after
        );
        Ok(receipt)
    }

    /// Drain unsold escrow and all proceeds to the creator once the window closed
    ///
    /// Anyone may call this. Once the instance holds nothing, further calls
    /// succeed with an empty receipt.
    pub fn withdraw(
        &mut self,
        ledger: &mut dyn AssetLedger,
        now: UnixTimestamp,
    ) -> Result<WithdrawReceipt, SaleError> {
        let sale = self.state.as_ref().ok_or(SaleError::NotInitialized)?;
        if !sale.phase(now).is_ended() {
            return Err(SaleError::SaleNotFinished);
        }

        let escrow = EscrowBalances::read(&*ledger, sale, &self.address);
        if !escrow.covers(sale) {
            log::warn!(
                "Sale {} escrow short: holds {} of {} unsold units",
                short_address(&self.address),
                escrow.asset,
                sale.remaining()
            );
        }

        let receipt = WithdrawReceipt {
            asset_amount: escrow.unsold_payout(sale),
            currency_amount: escrow.currency,
        };
        if receipt.is_noop() {
            log::debug!("Sale {} already drained", short_address(&self.address));
            return Ok(receipt);
        }

        // Both legs debit only what the instance holds, so the creator's
        // credit is the one side that can still fail.
        ensure_credit(&*ledger, &sale.asset, &sale.creator, receipt.asset_amount)?;
        ensure_credit(&*ledger, &sale.currency, &sale.creator, receipt.currency_amount)?;

        if receipt.asset_amount > 0 {
            ledger.transfer(&sale.asset, &self.address, &sale.creator, receipt.asset_amount)?;
        }
        if receipt.currency_amount > 0 {
            if let Err(e) =
                ledger.transfer(&sale.currency, &self.address, &sale.creator, receipt.currency_amount)
            {
                if receipt.asset_amount > 0 {
                    if let Err(back) = ledger.transfer_from(
                        &sale.asset,
                        &self.address,
                        &sale.creator,
                        &self.address,
                        receipt.asset_amount,
                    ) {
                        log::error!(
                            "Return of {} asset from {} failed: {}",
                            receipt.asset_amount,
                            short_address(&sale.creator),
                            back
                        );
                    }
                }
                log::warn!(
                    "Error: withdraw of sale {} failed: {}",
                    short_address(&self.address),
                    e
                );
                return Err(e.into());
            }
        }

        self.events.push(SaleEvent::Withdrawn {
            creator: sale.creator,
            asset_amount: receipt.asset_amount,
            currency_amount: receipt.currency_amount,
        });

        log::info!(
            "Sale {} withdrawn to {}: asset={} currency={}",
            short_address(&self.address),
            short_address(&sale.creator),
            receipt.asset_amount,
            receipt.currency_amount
        );
        Ok(receipt)
    }

    /// Price at the current sold count
    pub fn current_price(&self) -> Result<u64, SaleError> {
        let sale = self.state.as_ref().ok_or(SaleError::NotInitialized)?;
        self.model
            .evaluate(sale.capacity, sale.remaining(), sale.starting_price)
    }

    /// Unit price a purchase of `whole_units` would settle at, without mutating state
    pub fn preview_purchase_price(&self, whole_units: u64) -> Result<u64, SaleError> {
        if whole_units == 0 {
            return Err(SaleError::InvalidInput);
        }
        let sale = self.state.as_ref().ok_or(SaleError::NotInitialized)?;
        let amount =
            whole_to_atomic(whole_units, sale.unit_scale).map_err(|_| SaleError::ExceedsMaxAmount)?;
        let sold_after = sale.sold_after_purchase(amount)?;

        self.model
            .evaluate(sale.capacity, sale.capacity - sold_after, sale.starting_price)
    }

    /// Unit price a return of `whole_units` would settle at, without mutating state
    pub fn preview_sale_price(&self, whole_units: u64) -> Result<u64, SaleError> {
        if whole_units == 0 {
            return Err(SaleError::InvalidInput);
        }
        let sale = self.state.as_ref().ok_or(SaleError::NotInitialized)?;
        let amount =
            whole_to_atomic(whole_units, sale.unit_scale).map_err(|_| SaleError::InvalidSellAmount)?;
        let sold_after = sale.sold_after_return(amount)?;

        self.model
            .evaluate(sale.capacity, sale.capacity - sold_after, sale.starting_price)
    }
}

/// Price the purchase and run both transfer legs; `sale` already counts it
fn settle_purchase(
    model: &PriceModel,
    sale: &SaleLedger,
    ledger: &mut dyn AssetLedger,
    instance: &Address,
    buyer: &Address,
    whole_units: u64,
    amount: u64,
) -> Result<TradeReceipt, SaleError> {
    let price = model.evaluate(sale.capacity, sale.remaining(), sale.starting_price)?;
    let notional = notional(whole_units, price)?;

    ledger.transfer_from(&sale.currency, instance, buyer, instance, notional)?;

    if let Err(e) = ledger.transfer(&sale.asset, instance, buyer, amount) {
        if let Err(refund) = ledger.transfer(&sale.currency, instance, buyer, notional) {
            log::error!(
                "Refund of {} currency to {} failed: {}",
                notional,
                short_address(buyer),
                refund
            );
        }
        return Err(e.into());
    }

    Ok(TradeReceipt {
        amount,
        price,
        notional,
        sold_after: sale.sold(),
    })
}

/// Price the return and run both transfer legs; `sale` already counts it
fn settle_return(
    model: &PriceModel,
    sale: &SaleLedger,
    ledger: &mut dyn AssetLedger,
    instance: &Address,
    seller: &Address,
    whole_units: u64,
    amount: u64,
) -> Result<TradeReceipt, SaleError> {
    let price = model.evaluate(sale.capacity, sale.remaining(), sale.starting_price)?;
    let notional = notional(whole_units, price)?;

    ledger.transfer_from(&sale.asset, instance, seller, instance, amount)?;

    if let Err(e) = ledger.transfer(&sale.currency, instance, seller, notional) {
        if let Err(refund) = ledger.transfer(&sale.asset, instance, seller, amount) {
            log::error!(
                "Return of {} asset to {} failed: {}",
                amount,
                short_address(seller),
                refund
            );
        }
        return Err(e.into());
    }

    Ok(TradeReceipt {
        amount,
        price,
        notional,
        sold_after: sale.sold(),
    })
}

/// Fail before any transfer if crediting `amount` to `owner` would overflow
fn ensure_credit(
    ledger: &dyn AssetLedger,
    mint: &Address,
    owner: &Address,
    amount: u64,
) -> Result<(), SaleError> {
    ledger
        .balance_of(mint, owner)
        .checked_add(amount)
        .ok_or(LedgerError::Overflow)?;
    Ok(())
}

/// Currency owed for `whole_units` at `price`
fn notional(whole_units: u64, price: u64) -> Result<u64, SaleError> {
    let value = (whole_units as u128)
        .checked_mul(price as u128)
        .ok_or(SaleError::Overflow)?;
    to_u64(value)
}
