//! Curve Sale Program
//!
//! Fixed-supply sale of one asset for one currency. The creator escrows the
//! full capacity up front, buyers and sellers trade whole units against the
//! escrow for a fixed window, and the unit price follows a dual-slope curve
//! over the fraction of capacity sold.
//!
//! ## Instructions
//!
//! - **Initialize** (0): Deploy a sale and pull the capacity into escrow
//! - **Buy** (1): Pay currency, receive asset
//! - **Sell** (2): Return asset, receive currency
//! - **Withdraw** (3): After the window, drain everything to the creator

pub mod engine;
pub mod entrypoint;
pub mod events;
pub mod instructions;
pub mod ledger;
pub mod pda;
pub mod price_model;
pub mod registry;
pub mod state;

pub use engine::*;
pub use events::*;
pub use instructions::*;
pub use ledger::*;
pub use price_model::*;
pub use registry::*;
pub use state::*;

pinocchio_pubkey::declare_id!("9w5RPq1c9uwmnKBh96aa1sUBDUZKn46NpjqyLJ4GNBbP");
