//! Asset ledger boundary
//!
//! The sale never moves balances itself; it asks an `AssetLedger` to do it.
//! Each transfer either moves the exact amount or fails with no effect.

use std::collections::HashMap;

use curve_sale_common::{Address, LedgerError};

/// Fungible-asset transfer interface, one ledger serving many mints
pub trait AssetLedger {
    /// Atomic units per whole unit of `mint`
    fn unit_scale(&self, mint: &Address) -> Result<u64, LedgerError>;

    /// Balance of `owner` in `mint`; unknown owners hold zero
    fn balance_of(&self, mint: &Address, owner: &Address) -> u64;

    /// Move `amount` from `from` to `to`, authorised by `from` itself
    fn transfer(
        &mut self,
        mint: &Address,
        from: &Address,
        to: &Address,
        amount: u64,
    ) -> Result<(), LedgerError>;

    /// Move `amount` from `from` to `to` using an allowance granted to `spender`
    fn transfer_from(
        &mut self,
        mint: &Address,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: u64,
    ) -> Result<(), LedgerError>;
}

/// In-memory ledger with balances and allowances per mint
#[derive(Debug, Default, Clone)]
pub struct MemoryLedger {
    unit_scales: HashMap<Address, u64>,
    balances: HashMap<(Address, Address), u64>,
    allowances: HashMap<(Address, Address, Address), u64>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a mint with `decimals` atomic digits
    pub fn create_mint(&mut self, mint: Address, decimals: u32) -> Result<(), LedgerError> {
        let scale = 10u64.checked_pow(decimals).ok_or(LedgerError::Overflow)?;
        self.unit_scales.insert(mint, scale);
        Ok(())
    }

    /// Credit freshly issued units to `owner`
    pub fn mint_to(&mut self, mint: &Address, owner: &Address, amount: u64) -> Result<(), LedgerError> {
        if !self.unit_scales.contains_key(mint) {
            return Err(LedgerError::UnknownMint);
        }
        let balance = self.balances.entry((*mint, *owner)).or_insert(0);
        *balance = balance.checked_add(amount).ok_or(LedgerError::Overflow)?;
        Ok(())
    }

    /// Set the allowance `owner` grants `spender` (replaces any previous one)
    pub fn approve(&mut self, mint: &Address, owner: &Address, spender: &Address, amount: u64) {
        self.allowances.insert((*mint, *owner, *spender), amount);
    }

    pub fn allowance(&self, mint: &Address, owner: &Address, spender: &Address) -> u64 {
        self.allowances
            .get(&(*mint, *owner, *spender))
            .copied()
            .unwrap_or(0)
    }

    /// Sum of all balances in `mint`
    pub fn total_supply(&self, mint: &Address) -> u128 {
        self.balances
            .iter()
            .filter(|((m, _), _)| m == mint)
            .map(|(_, balance)| *balance as u128)
            .sum()
    }

    fn move_balance(
        &mut self,
        mint: &Address,
        from: &Address,
        to: &Address,
        amount: u64,
    ) -> Result<(), LedgerError> {
        if !self.unit_scales.contains_key(mint) {
            return Err(LedgerError::UnknownMint);
        }

        let have = self.balance_of(mint, from);
        if have < amount {
            return Err(LedgerError::InsufficientBalance { have, need: amount });
        }
        if from == to {
            return Ok(());
        }

        let credited = self
            .balance_of(mint, to)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;

        self.balances.insert((*mint, *from), have - amount);
        self.balances.insert((*mint, *to), credited);
        Ok(())
    }
}

impl AssetLedger for MemoryLedger {
    fn unit_scale(&self, mint: &Address) -> Result<u64, LedgerError> {
        self.unit_scales.get(mint).copied().ok_or(LedgerError::UnknownMint)
    }

    fn balance_of(&self, mint: &Address, owner: &Address) -> u64 {
        self.balances.get(&(*mint, *owner)).copied().unwrap_or(0)
    }

    fn transfer(
        &mut self,
        mint: &Address,
        from: &Address,
        to: &Address,
        amount: u64,
    ) -> Result<(), LedgerError> {
        self.move_balance(mint, from, to, amount)
    }

    fn transfer_from(
        &mut self,
        mint: &Address,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: u64,
    ) -> Result<(), LedgerError> {
        let approved = self.allowance(mint, from, spender);
        if approved < amount {
            return Err(LedgerError::InsufficientAllowance { approved, need: amount });
        }

        self.move_balance(mint, from, to, amount)?;
        self.allowances.insert((*mint, *from, *spender), approved - amount);
        Ok(())
    }
}
