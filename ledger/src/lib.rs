//! Token ledger seam for the Custos custody wallet.
//!
//! The wallet never touches balance accounting directly; it consumes the
//! [`TokenLedger`] capability set. [`InMemoryLedger`] is the reference
//! implementation used by tests and the demo binary.

pub mod error;
pub mod ledger;
pub mod memory;

pub use error::LedgerError;
pub use ledger::TokenLedger;
pub use memory::InMemoryLedger;
