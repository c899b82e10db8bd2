//! Settlement sweep: withdraw every sale whose window has closed

use curve_sale::{AssetLedger, SaleRegistry, WithdrawReceipt};
use curve_sale_common::{short_address, Address, SaleError, UnixTimestamp};

use crate::settlement_queue::{PendingSale, SettlementQueue};

/// Outcome of one sweep
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SweepReport {
    /// Sales drained and dropped from the queue
    pub settled: Vec<(Address, WithdrawReceipt)>,
    /// Sales that failed to settle and stay queued
    pub failed: Vec<(Address, SaleError)>,
}

/// Queue a registered sale for settlement at its end time
pub fn track(
    queue: &mut SettlementQueue,
    registry: &SaleRegistry,
    sale: &Address,
) -> Result<(), SaleError> {
    let pending = registry.with_sale(sale, |engine| {
        let state = engine.state().ok_or(SaleError::NotInitialized)?;
        Ok(PendingSale {
            sale: *sale,
            creator: state.creator,
            end_time: state.end_time(),
        })
    })?;

    log::debug!(
        "Tracking sale {} (ends at {})",
        short_address(sale),
        pending.end_time
    );
    queue.push(pending);
    Ok(())
}

/// Withdraw every due sale
///
/// Settled sales leave the queue. Failures are logged and stay queued for
/// the next sweep.
pub fn sweep_due(
    queue: &mut SettlementQueue,
    registry: &SaleRegistry,
    ledger: &mut dyn AssetLedger,
    now: UnixTimestamp,
) -> SweepReport {
    let mut report = SweepReport::default();

    for pending in queue.due(now) {
        let result = registry.with_sale(&pending.sale, |engine| engine.withdraw(ledger, now));

        match result {
            Ok(receipt) => {
                log::info!(
                    "Settled sale {} to {}: asset={} currency={}",
                    short_address(&pending.sale),
                    short_address(&pending.creator),
                    receipt.asset_amount,
                    receipt.currency_amount
                );
                queue.remove(&pending.sale);
                report.settled.push((pending.sale, receipt));
            }
            Err(e) => {
                log::error!(
                    "Failed to settle sale {}: {}",
                    short_address(&pending.sale),
                    e
                );
                report.failed.push((pending.sale, e));
            }
        }
    }

    report
}
