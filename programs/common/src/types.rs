//! Address and lifecycle primitives

pub use pinocchio::pubkey::Pubkey;

/// 32-byte account key. Sale instances, mints and users all share this space.
pub type Address = Pubkey;

/// Unix timestamp in seconds
pub type UnixTimestamp = u64;

/// The all-zero key, never a valid participant
pub const NULL_ADDRESS: Address = [0u8; 32];

/// Check whether an address is the null key
#[inline]
pub fn is_null_address(address: &Address) -> bool {
    address == &NULL_ADDRESS
}

/// Short hex form of an address for log lines
pub fn short_address(address: &Address) -> String {
    address[..4].iter().map(|b| format!("{:02x}", b)).collect()
}

/// Lifecycle phase of a sale instance
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SalePhase {
    /// Deployed but `initialize` has not run yet
    Created = 0,
    /// Trading window is open (now < start + duration)
    Active = 1,
    /// Window closed; state is frozen, only withdraw is allowed
    Ended = 2,
}

impl SalePhase {
    pub fn is_active(&self) -> bool {
        matches!(self, SalePhase::Active)
    }

    pub fn is_ended(&self) -> bool {
        matches!(self, SalePhase::Ended)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_address() {
        assert!(is_null_address(&NULL_ADDRESS));
        assert!(!is_null_address(&[1u8; 32]));

        let mut almost = [0u8; 32];
        almost[31] = 1;
        assert!(!is_null_address(&almost));
    }

    #[test]
    fn test_short_address() {
        let mut address = [0u8; 32];
        address[0] = 0xab;
        address[3] = 0x01;
        assert_eq!(short_address(&address), "ab000001");
    }

    #[test]
    fn test_phase_predicates() {
        assert!(SalePhase::Active.is_active());
        assert!(!SalePhase::Created.is_active());
        assert!(SalePhase::Ended.is_ended());
        assert!(!SalePhase::Active.is_ended());
    }
}
