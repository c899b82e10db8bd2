//! Error taxonomy for the curve sale program

use pinocchio::program_error::ProgramError;
use thiserror::Error;

/// Failure reported by an asset ledger transfer
///
/// Transfers are all-or-nothing: when one of these is returned no balance
/// has moved.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Insufficient balance: have {have}, need {need}")]
    InsufficientBalance { have: u64, need: u64 },

    #[error("Insufficient allowance: approved {approved}, need {need}")]
    InsufficientAllowance { approved: u64, need: u64 },

    #[error("Unknown mint")]
    UnknownMint,

    #[error("Balance overflow")]
    Overflow,
}

/// Broad error category, so callers can tell "too early/late" from
/// "not enough capacity" from "bad configuration"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidInput,
    InvalidConfiguration,
    SaleWindowViolation,
    CapacityViolation,
    PrecisionViolation,
    Settlement,
}

/// Sale program error
///
/// Every variant is fatal to the call that raised it and leaves the sale
/// state exactly as it was before the call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SaleError {
    #[error("Invalid input")]
    InvalidInput,

    #[error("Null address supplied")]
    NullAddress,

    #[error("Malformed instruction data")]
    InvalidInstruction,

    #[error("Sale instance not found")]
    SaleNotFound,

    #[error("Arithmetic overflow")]
    Overflow,

    #[error("Curve parameters out of order")]
    InvalidConfiguration,

    #[error("Sale duration below the minimum")]
    SaleTooShort,

    #[error("Sale has finished")]
    SaleFinished,

    #[error("Sale has not finished yet")]
    SaleNotFinished,

    #[error("Sale has not been initialized")]
    NotInitialized,

    #[error("Sale is already initialized")]
    AlreadyInitialized,

    #[error("Amount exceeds remaining capacity")]
    ExceedsMaxAmount,

    #[error("Sell amount exceeds sold units")]
    InvalidSellAmount,

    #[error("Capacity is not a whole number of units")]
    InvalidCapacityGranularity,

    #[error("Transfer failed: {0}")]
    Transfer(#[from] LedgerError),

    #[error("Sale state unavailable")]
    StateUnavailable,
}

impl SaleError {
    /// Stable numeric code used on the instruction boundary
    pub fn code(&self) -> u32 {
        match self {
            SaleError::InvalidInput => 0,
            SaleError::NullAddress => 1,
            SaleError::InvalidInstruction => 2,
            SaleError::SaleNotFound => 3,
            SaleError::Overflow => 4,
            SaleError::InvalidConfiguration => 10,
            SaleError::SaleTooShort => 20,
            SaleError::SaleFinished => 21,
            SaleError::SaleNotFinished => 22,
            SaleError::NotInitialized => 23,
            SaleError::AlreadyInitialized => 24,
            SaleError::ExceedsMaxAmount => 30,
            SaleError::InvalidSellAmount => 31,
            SaleError::InvalidCapacityGranularity => 40,
            SaleError::Transfer(_) => 50,
            SaleError::StateUnavailable => 51,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            SaleError::InvalidInput
            | SaleError::NullAddress
            | SaleError::InvalidInstruction
            | SaleError::SaleNotFound
            | SaleError::Overflow => ErrorKind::InvalidInput,
            SaleError::InvalidConfiguration => ErrorKind::InvalidConfiguration,
            SaleError::SaleTooShort
            | SaleError::SaleFinished
            | SaleError::SaleNotFinished
            | SaleError::NotInitialized
            | SaleError::AlreadyInitialized => ErrorKind::SaleWindowViolation,
            SaleError::ExceedsMaxAmount | SaleError::InvalidSellAmount => {
                ErrorKind::CapacityViolation
            }
            SaleError::InvalidCapacityGranularity => ErrorKind::PrecisionViolation,
            SaleError::Transfer(_) | SaleError::StateUnavailable => ErrorKind::Settlement,
        }
    }
}

impl From<SaleError> for ProgramError {
    fn from(e: SaleError) -> Self {
        ProgramError::Custom(e.code())
    }
}

/// Result type for sale operations
pub type SaleResult<T> = Result<T, SaleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(SaleError::SaleFinished.kind(), ErrorKind::SaleWindowViolation);
        assert_eq!(SaleError::SaleNotFinished.kind(), ErrorKind::SaleWindowViolation);
        assert_eq!(SaleError::ExceedsMaxAmount.kind(), ErrorKind::CapacityViolation);
        assert_eq!(SaleError::InvalidSellAmount.kind(), ErrorKind::CapacityViolation);
        assert_eq!(
            SaleError::InvalidCapacityGranularity.kind(),
            ErrorKind::PrecisionViolation
        );
        assert_eq!(
            SaleError::InvalidConfiguration.kind(),
            ErrorKind::InvalidConfiguration
        );
        assert_eq!(
            SaleError::Transfer(LedgerError::UnknownMint).kind(),
            ErrorKind::Settlement
        );
    }

    #[test]
    fn test_program_error_codes() {
        let err: ProgramError = SaleError::ExceedsMaxAmount.into();
        assert_eq!(err, ProgramError::Custom(30));

        let err: ProgramError = SaleError::Transfer(LedgerError::Overflow).into();
        assert_eq!(err, ProgramError::Custom(50));
    }

    #[test]
    fn test_ledger_error_converts() {
        let err: SaleError = LedgerError::InsufficientBalance { have: 1, need: 2 }.into();
        assert_eq!(err.code(), 50);
        assert_eq!(
            err.to_string(),
            "Transfer failed: Insufficient balance: have 1, need 2"
        );
    }
}
