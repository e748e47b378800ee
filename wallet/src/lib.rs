//! The Custos authorization wallet.
//!
//! A custodial wallet that holds token funds and releases them only after a
//! quorum of designated signers has approved a specific transfer request.
//! Anyone may propose a transfer; only signers may approve; the ledger
//! transfer fires exactly once, on the approval that reaches the threshold.
//!
//! [`AuthorizationWallet`] is the single-owner state machine;
//! [`SharedWallet`] wraps it for use from multiple threads, funneling every
//! operation through one lock.

pub mod error;
pub mod event;
pub mod request;
pub mod shared;
pub mod wallet;

pub use error::WalletError;
pub use event::{EventBus, WalletEvent};
pub use request::{ApprovalOutcome, TransferRequest};
pub use shared::SharedWallet;
pub use wallet::AuthorizationWallet;
