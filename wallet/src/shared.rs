//! Thread-safe handle over the authorization wallet.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use custos_ledger::TokenLedger;
use custos_types::{AccountId, TokenAmount, TransferId};

use crate::error::WalletError;
use crate::event::WalletEvent;
use crate::request::{ApprovalOutcome, TransferRequest};
use crate::wallet::AuthorizationWallet;

/// Cheaply cloneable handle serializing all wallet operations.
///
/// Every operation takes the one lock, so no two approvals for the same
/// request can both observe a sub-threshold count and both trigger
/// execution. The wallet restores its invariants before every public call
/// returns (including error returns), so a poisoned lock is recovered
/// rather than propagated.
pub struct SharedWallet<L: TokenLedger> {
    inner: Arc<Mutex<AuthorizationWallet<L>>>,
}

impl<L: TokenLedger> Clone for SharedWallet<L> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<L: TokenLedger> SharedWallet<L> {
    pub fn new(wallet: AuthorizationWallet<L>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(wallet)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, AuthorizationWallet<L>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// See [`AuthorizationWallet::request_transfer`].
    pub fn request_transfer(
        &self,
        caller: &AccountId,
        recipient: &AccountId,
        amount: TokenAmount,
    ) -> Result<TransferId, WalletError> {
        self.lock().request_transfer(caller, recipient, amount)
    }

    /// See [`AuthorizationWallet::approve_transfer`].
    pub fn approve_transfer(
        &self,
        caller: &AccountId,
        transfer_id: TransferId,
    ) -> Result<ApprovalOutcome, WalletError> {
        self.lock().approve_transfer(caller, transfer_id)
    }

    /// Subscribe to wallet notifications.
    pub fn subscribe(&self, listener: Box<dyn Fn(&WalletEvent) + Send + Sync>) {
        self.lock().subscribe(listener);
    }

    /// Snapshot of a transfer request.
    pub fn request(&self, transfer_id: TransferId) -> Option<TransferRequest> {
        self.lock().request(transfer_id).cloned()
    }

    pub fn request_count(&self) -> usize {
        self.lock().request_count()
    }

    pub fn approval_count(&self, transfer_id: TransferId) -> Option<usize> {
        self.lock().approval_count(transfer_id)
    }

    pub fn is_executed(&self, transfer_id: TransferId) -> Option<bool> {
        self.lock().is_executed(transfer_id)
    }

    pub fn is_signer(&self, account: &AccountId) -> bool {
        self.lock().is_signer(account)
    }

    pub fn threshold(&self) -> usize {
        self.lock().threshold()
    }

    /// Run `f` against the locked wallet. For reads that need the ledger
    /// (e.g. balance checks) or several consistent lookups at once.
    pub fn with_wallet<T>(&self, f: impl FnOnce(&AuthorizationWallet<L>) -> T) -> T {
        f(&self.lock())
    }

    /// Run `f` with mutable access, for funding the ledger in tests/demos.
    pub fn with_wallet_mut<T>(&self, f: impl FnOnce(&mut AuthorizationWallet<L>) -> T) -> T {
        f(&mut self.lock())
    }
}
