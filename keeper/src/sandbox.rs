//! In-memory deployment of the configured sales

use anyhow::{Context, Result};
use curve_sale::{AssetLedger, InitParams, MemoryLedger, PriceModel, SaleRegistry};
use curve_sale_common::{short_address, Address, UnixTimestamp};
use std::sync::Arc;

use crate::config::{Config, SandboxSale};
use crate::settlement_queue::SettlementQueue;
use crate::sweeper::track;

/// Currency every sandbox sale is priced in (6 decimals)
const CURRENCY_DECIMALS: u32 = 6;

/// Deterministic sandbox address for a label
pub fn sandbox_address(label: &str) -> Address {
    let mut hasher = blake3::Hasher::new();
    hasher.update(b"sandbox");
    hasher.update(label.as_bytes());
    *hasher.finalize().as_bytes()
}

pub struct Sandbox {
    pub ledger: MemoryLedger,
    pub registry: SaleRegistry,
    pub queue: SettlementQueue,
}

impl Sandbox {
    /// Deploy every configured sale and queue it for settlement
    pub fn build(config: &Config, now: UnixTimestamp) -> Result<Self> {
        let model = PriceModel::new(config.curve.to_params()?);
        let mut sandbox = Self {
            ledger: MemoryLedger::new(),
            registry: SaleRegistry::new(curve_sale::ID, Arc::new(model)),
            queue: SettlementQueue::new(),
        };

        sandbox
            .ledger
            .create_mint(sandbox_address("currency"), CURRENCY_DECIMALS)
            .context("Failed to create sandbox currency")?;

        for sale in &config.sales {
            sandbox
                .deploy(sale, now)
                .context(format!("Failed to deploy sandbox sale '{}'", sale.name))?;
        }
        Ok(sandbox)
    }

    fn deploy(&mut self, sale: &SandboxSale, now: UnixTimestamp) -> Result<Address> {
        let asset = sandbox_address(&sale.name);
        let currency = sandbox_address("currency");
        let creator = sandbox_address(&format!("{}/creator", sale.name));
        let address = self.registry.sale_address(&asset);

        self.ledger.create_mint(asset, sale.decimals)?;
        let unit_scale = self.ledger.unit_scale(&asset)?;
        let capacity = sale
            .capacity_units
            .checked_mul(unit_scale)
            .context("Capacity overflows atomic units")?;

        self.ledger.mint_to(&asset, &creator, capacity)?;
        self.ledger.approve(&asset, &creator, &address, capacity);

        let params = InitParams {
            asset,
            currency,
            creator,
            starting_price: sale.starting_price,
            capacity,
            duration: sale.duration_secs,
        };
        let start = now.saturating_sub(sale.started_secs_ago);
        self.registry.create_sale(&mut self.ledger, &params, start)?;

        if sale.presold_units > 0 {
            self.presell(sale, &address, start)?;
        }

        track(&mut self.queue, &self.registry, &address)?;
        log::info!(
            "Deployed sandbox sale '{}' at {} ({} units @ {})",
            sale.name,
            short_address(&address),
            sale.capacity_units,
            sale.starting_price
        );
        Ok(address)
    }

    /// A sandbox buyer takes `presold_units` at the sale start
    fn presell(
        &mut self,
        sale: &SandboxSale,
        address: &Address,
        start: UnixTimestamp,
    ) -> Result<()> {
        let buyer = sandbox_address(&format!("{}/buyer", sale.name));
        let currency = sandbox_address("currency");

        let quote = self
            .registry
            .with_sale(address, |engine| engine.preview_purchase_price(sale.presold_units))?;
        let cost = sale
            .presold_units
            .checked_mul(quote)
            .context("Presale cost overflows")?;

        self.ledger.mint_to(&currency, &buyer, cost)?;
        self.ledger.approve(&currency, &buyer, address, cost);

        let ledger = &mut self.ledger;
        let receipt = self.registry.with_sale(address, |engine| {
            engine.buy(ledger, &buyer, sale.presold_units, start)
        })?;

        log::info!(
            "Sandbox buyer took {} units of '{}' @ {}",
            sale.presold_units,
            sale.name,
            receipt.price
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: u64 = 1_700_000_000;

    #[test]
    fn test_default_sandbox_builds() {
        let config = Config::default_sandbox();
        let sandbox = Sandbox::build(&config, NOW).unwrap();

        assert_eq!(sandbox.registry.len(), 2);
        assert_eq!(sandbox.queue.len(), 2);

        // "launch" was backdated by its full duration
        let due = sandbox.queue.due(NOW);
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].creator, sandbox_address("launch/creator"));
    }

    #[test]
    fn test_presale_moves_funds() {
        let config = Config::default_sandbox();
        let sandbox = Sandbox::build(&config, NOW).unwrap();

        let asset = sandbox_address("launch");
        let buyer = sandbox_address("launch/buyer");
        let sale = sandbox.registry.sale_address(&asset);

        // 40% of 1000 units at 3 decimals
        assert_eq!(sandbox.ledger.balance_of(&asset, &buyer), 400_000);
        assert_eq!(sandbox.ledger.balance_of(&asset, &sale), 600_000);
        assert_eq!(
            sandbox.ledger.balance_of(&sandbox_address("currency"), &sale),
            400 * 1_402_000
        );
    }

    #[test]
    fn test_sweep_drains_backdated_sale() {
        let config = Config::default_sandbox();
        let mut sandbox = Sandbox::build(&config, NOW).unwrap();

        let report = crate::sweeper::sweep_due(
            &mut sandbox.queue,
            &sandbox.registry,
            &mut sandbox.ledger,
            NOW,
        );
        assert_eq!(report.settled.len(), 1);
        assert_eq!(sandbox.queue.len(), 1);

        let creator = sandbox_address("launch/creator");
        assert_eq!(sandbox.ledger.balance_of(&sandbox_address("launch"), &creator), 600_000);
        assert_eq!(
            sandbox.ledger.balance_of(&sandbox_address("currency"), &creator),
            400 * 1_402_000
        );
    }

    #[test]
    fn test_rejects_short_sale() {
        let mut config = Config::default_sandbox();
        config.sales[1].duration_secs = 60;

        assert!(Sandbox::build(&config, NOW).is_err());
    }
}
