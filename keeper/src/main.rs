//! Curve Sale Settlement Keeper
//!
//! Off-chain service that tracks sale deadlines and drains every sale to its
//! creator once its window has closed.

mod config;
mod sandbox;
mod settlement_queue;
mod sweeper;

use anyhow::{Context, Result};
use config::Config;
use curve_sale_common::{short_address, UnixTimestamp};
use sandbox::Sandbox;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::time;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting Curve Sale Settlement Keeper");

    let config = Config::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({:#}), using default sandbox config", e);
        Config::default_sandbox()
    });

    let mut sandbox = Sandbox::build(&config, unix_now()?)?;
    log_schedule(&sandbox, &config)?;

    log::info!(
        "Keeper service started. Tracking {} sales...",
        sandbox.queue.len()
    );

    let mut interval = time::interval(Duration::from_secs(config.poll_interval_secs));

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let now = unix_now()?;
                let report = sweeper::sweep_due(
                    &mut sandbox.queue,
                    &sandbox.registry,
                    &mut sandbox.ledger,
                    now,
                );

                if !report.failed.is_empty() {
                    log::warn!("{} sales failed to settle, retrying next tick", report.failed.len());
                }

                if let Some(next) = sandbox.queue.peek() {
                    log::debug!(
                        "Next settlement: {} in {}s",
                        short_address(&next.sale),
                        next.end_time.saturating_sub(now)
                    );
                }
            }
            _ = tokio::signal::ctrl_c() => {
                log::info!("Shutting down with {} sales pending", sandbox.queue.len());
                break;
            }
        }
    }

    Ok(())
}

fn unix_now() -> Result<UnixTimestamp> {
    let elapsed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("System clock is before the unix epoch")?;
    Ok(elapsed.as_secs())
}

/// Log the price curve of every sandbox sale at ten evenly spaced points
fn log_schedule(sandbox: &Sandbox, config: &Config) -> Result<()> {
    let model = sandbox.registry.model();

    for sale in &config.sales {
        let schedule = model
            .price_schedule(sale.capacity_units, sale.starting_price, 10)
            .context(format!("Failed to sample curve for '{}'", sale.name))?;

        let points: Vec<String> = schedule
            .iter()
            .map(|(sold, price)| format!("{}:{}", sold, price))
            .collect();
        log::info!("Curve '{}': {}", sale.name, points.join(" "));
    }
    Ok(())
}
