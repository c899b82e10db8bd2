//! Sale instruction set and its byte layout

use crate::engine::InitParams;
use curve_sale_common::{InstructionReader, InstructionWriter, SaleError};

/// Instruction discriminator
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaleInstructionTag {
    /// Deploy and initialize a sale
    Initialize = 0,
    /// Buy whole units from escrow
    Buy = 1,
    /// Return whole units for currency
    Sell = 2,
    /// Drain an ended sale to its creator
    Withdraw = 3,
}

impl TryFrom<u8> for SaleInstructionTag {
    type Error = SaleError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(SaleInstructionTag::Initialize),
            1 => Ok(SaleInstructionTag::Buy),
            2 => Ok(SaleInstructionTag::Sell),
            3 => Ok(SaleInstructionTag::Withdraw),
            _ => Err(SaleError::InvalidInstruction),
        }
    }
}

/// Decoded instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaleInstruction {
    Initialize(InitParams),
    Buy { whole_units: u64 },
    Sell { whole_units: u64 },
    Withdraw,
}

impl SaleInstruction {
    /// Decode instruction data
    ///
    /// Layout: tag(1) followed by
    /// - Initialize: asset(32) + currency(32) + creator(32) +
    ///   starting_price(8) + capacity(8) + duration(8)
    /// - Buy / Sell: whole_units(8)
    /// - Withdraw: nothing
    ///
    /// Trailing bytes are rejected.
    pub fn unpack(data: &[u8]) -> Result<Self, SaleError> {
        let mut reader = InstructionReader::new(data);
        let tag = SaleInstructionTag::try_from(reader.read_u8()?)?;

        let instruction = match tag {
            SaleInstructionTag::Initialize => SaleInstruction::Initialize(InitParams {
                asset: reader.read_bytes::<32>()?,
                currency: reader.read_bytes::<32>()?,
                creator: reader.read_bytes::<32>()?,
                starting_price: reader.read_u64()?,
                capacity: reader.read_u64()?,
                duration: reader.read_u64()?,
            }),
            SaleInstructionTag::Buy => SaleInstruction::Buy {
                whole_units: reader.read_u64()?,
            },
            SaleInstructionTag::Sell => SaleInstruction::Sell {
                whole_units: reader.read_u64()?,
            },
            SaleInstructionTag::Withdraw => SaleInstruction::Withdraw,
        };

        if reader.remaining() != 0 {
            return Err(SaleError::InvalidInstruction);
        }
        Ok(instruction)
    }

    /// Encode to the layout `unpack` reads
    pub fn pack(&self) -> Vec<u8> {
        match self {
            SaleInstruction::Initialize(params) => {
                InstructionWriter::new(SaleInstructionTag::Initialize as u8)
                    .write_bytes(&params.asset)
                    .write_bytes(&params.currency)
                    .write_bytes(&params.creator)
                    .write_u64(params.starting_price)
                    .write_u64(params.capacity)
                    .write_u64(params.duration)
                    .finish()
            }
            SaleInstruction::Buy { whole_units } => {
                InstructionWriter::new(SaleInstructionTag::Buy as u8)
                    .write_u64(*whole_units)
                    .finish()
            }
            SaleInstruction::Sell { whole_units } => {
                InstructionWriter::new(SaleInstructionTag::Sell as u8)
                    .write_u64(*whole_units)
                    .finish()
            }
            SaleInstruction::Withdraw => {
                InstructionWriter::new(SaleInstructionTag::Withdraw as u8).finish()
            }
        }
    }

    pub fn tag(&self) -> SaleInstructionTag {
        match self {
            SaleInstruction::Initialize(_) => SaleInstructionTag::Initialize,
            SaleInstruction::Buy { .. } => SaleInstructionTag::Buy,
            SaleInstruction::Sell { .. } => SaleInstructionTag::Sell,
            SaleInstruction::Withdraw => SaleInstructionTag::Withdraw,
        }
    }
}
