//! Fundamental types for the Custos custody wallet.
//!
//! This crate defines the core types shared across every other crate in the
//! workspace: account identifiers, token amounts, and transfer-request ids.

pub mod account;
pub mod amount;
pub mod transfer_id;

pub use account::AccountId;
pub use amount::TokenAmount;
pub use transfer_id::TransferId;
