//! Notifications emitted by the wallet for subscribers.

use custos_types::{AccountId, TokenAmount, TransferId};
use serde::{Deserialize, Serialize};

/// Wallet-level events that observers can subscribe to via the [`EventBus`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WalletEvent {
    /// A transfer request was created.
    TransferRequested {
        transfer_id: TransferId,
        recipient: AccountId,
        amount: TokenAmount,
        requestor: AccountId,
    },
    /// A signer's approval was recorded.
    ApprovalRecorded {
        transfer_id: TransferId,
        signer: AccountId,
    },
    /// A request reached quorum and the ledger transfer completed.
    TransferExecuted {
        transfer_id: TransferId,
        recipient: AccountId,
        amount: TokenAmount,
    },
}

/// Synchronous fan-out event bus for wallet events.
///
/// Listeners are invoked inline on the emitting thread; keep handlers fast
/// to avoid stalling the approval path.
pub struct EventBus {
    listeners: Vec<Box<dyn Fn(&WalletEvent) + Send + Sync>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&WalletEvent) + Send + Sync>) {
        self.listeners.push(listener);
    }

    pub fn emit(&self, event: &WalletEvent) {
        for listener in &self.listeners {
            listener(event);
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
