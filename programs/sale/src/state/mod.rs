pub mod sale;
pub mod escrow;

pub use sale::*;
pub use escrow::*;
