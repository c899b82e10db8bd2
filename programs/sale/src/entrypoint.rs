//! Instruction dispatch
//!
//! Decodes raw instruction data and routes it to the registry. Errors leave
//! this layer as `ProgramError::Custom(code)`.

use pinocchio::ProgramResult;

use crate::instructions::SaleInstruction;
use crate::ledger::AssetLedger;
use crate::registry::SaleRegistry;
use curve_sale_common::{short_address, Address, SaleError, UnixTimestamp};

/// Process one instruction against `sale`
///
/// `caller` is the buyer or seller for trades. `Initialize` ignores `sale`:
/// the instance address is derived from the asset being sold.
pub fn process_instruction(
    registry: &mut SaleRegistry,
    ledger: &mut dyn AssetLedger,
    sale: &Address,
    caller: &Address,
    now: UnixTimestamp,
    instruction_data: &[u8],
) -> ProgramResult {
    let instruction = SaleInstruction::unpack(instruction_data).map_err(|e| {
        log::warn!("Error: malformed instruction data ({} bytes)", instruction_data.len());
        e
    })?;

    log::debug!("Instruction: {:?}", instruction.tag());

    let result: Result<(), SaleError> = match instruction {
        SaleInstruction::Initialize(params) => registry
            .create_sale(ledger, &params, now)
            .map(|address| {
                log::debug!("Initialized sale {}", short_address(&address));
            }),
        SaleInstruction::Buy { whole_units } => registry
            .with_sale(sale, |engine| engine.buy(ledger, caller, whole_units, now))
            .map(|_| ()),
        SaleInstruction::Sell { whole_units } => registry
            .with_sale(sale, |engine| engine.sell(ledger, caller, whole_units, now))
            .map(|_| ()),
        SaleInstruction::Withdraw => registry
            .with_sale(sale, |engine| engine.withdraw(ledger, now))
            .map(|_| ()),
    };

    result.map_err(Into::into)
}
