//! Core authorization wallet state machine.

use std::collections::{BTreeMap, HashSet};

use custos_ledger::TokenLedger;
use custos_types::{AccountId, TokenAmount, TransferId};
use tracing::{debug, info, warn};

use crate::error::WalletError;
use crate::event::{EventBus, WalletEvent};
use crate::request::{ApprovalOutcome, TransferRequest};

/// A custodial wallet releasing funds only on quorum approval.
///
/// The wallet owns the signer registry, the quorum threshold, and the full
/// collection of transfer requests; nothing else mutates that state. Anyone
/// may propose a transfer, only registered signers may approve one, and the
/// ledger transfer fires exactly once, on the approval that first reaches
/// the threshold.
///
/// Requests that never reach quorum stay pending forever: there is no
/// expiry and no cancellation, so the collection doubles as a permanent
/// audit record.
pub struct AuthorizationWallet<L: TokenLedger> {
    /// The wallet's own account on the token ledger (the holding account).
    account: AccountId,
    /// The token ledger collaborator.
    ledger: L,
    /// Authorized signers, fixed at construction, duplicate-free.
    signers: Vec<AccountId>,
    /// Distinct approvals required to execute a transfer.
    threshold: usize,
    /// All requests ever created, keyed by id. Never pruned.
    requests: BTreeMap<TransferId, TransferRequest>,
    /// Next id to allocate. Monotonic, starts at 1.
    next_id: TransferId,
    /// Fan-out bus for request/approval/execution notifications.
    events: EventBus,
}

impl<L: TokenLedger> AuthorizationWallet<L> {
    /// Create a wallet holding funds on `account`, guarded by `signers`
    /// with the given approval `threshold`.
    ///
    /// Fails with `InvalidConfiguration` if the signer set is empty or
    /// contains duplicates, or if the threshold falls outside
    /// `1..=signers.len()`.
    pub fn new(
        account: AccountId,
        ledger: L,
        signers: Vec<AccountId>,
        threshold: usize,
    ) -> Result<Self, WalletError> {
        if signers.is_empty() {
            return Err(WalletError::InvalidConfiguration {
                reason: "signer set is empty".into(),
            });
        }
        let distinct: HashSet<&AccountId> = signers.iter().collect();
        if distinct.len() != signers.len() {
            return Err(WalletError::InvalidConfiguration {
                reason: "signer set contains duplicates".into(),
            });
        }
        if threshold == 0 || threshold > signers.len() {
            return Err(WalletError::InvalidConfiguration {
                reason: format!(
                    "threshold {} outside 1..={} (signer count)",
                    threshold,
                    signers.len()
                ),
            });
        }

        info!(
            account = %account,
            signers = signers.len(),
            threshold,
            "authorization wallet created"
        );

        Ok(Self {
            account,
            ledger,
            signers,
            threshold,
            requests: BTreeMap::new(),
            next_id: TransferId::new(1),
            events: EventBus::new(),
        })
    }

    /// Propose moving `amount` from the wallet to `recipient`.
    ///
    /// Any account may propose — proposing and approving are deliberately
    /// separate powers. The wallet's balance is NOT checked here; requests
    /// may be queued ahead of funding and the balance only matters at the
    /// execution moment. Each call allocates a fresh id, even for identical
    /// recipient/amount pairs.
    pub fn request_transfer(
        &mut self,
        caller: &AccountId,
        recipient: &AccountId,
        amount: TokenAmount,
    ) -> Result<TransferId, WalletError> {
        if amount.is_zero() {
            return Err(WalletError::InvalidAmount);
        }

        let transfer_id = self.next_id;
        self.next_id = self.next_id.next();

        self.requests.insert(
            transfer_id,
            TransferRequest::new(transfer_id, recipient.clone(), amount, caller.clone()),
        );

        info!(
            %transfer_id,
            recipient = %recipient,
            amount = %amount,
            requestor = %caller,
            "transfer requested"
        );
        self.events.emit(&WalletEvent::TransferRequested {
            transfer_id,
            recipient: recipient.clone(),
            amount,
            requestor: caller.clone(),
        });

        Ok(transfer_id)
    }

    /// Record `caller`'s approval of `transfer_id`.
    ///
    /// The approval that brings the count to the threshold atomically marks
    /// the request executed and performs the ledger transfer. If the ledger
    /// rejects the transfer (typically: the wallet is not yet funded), the
    /// call surfaces `ExecutionFailed` and leaves the request untouched —
    /// neither the approval nor the executed mark is retained, so the same
    /// signer may approve again once funds arrive.
    pub fn approve_transfer(
        &mut self,
        caller: &AccountId,
        transfer_id: TransferId,
    ) -> Result<ApprovalOutcome, WalletError> {
        if !self.signers.contains(caller) {
            return Err(WalletError::NotAuthorized(caller.clone()));
        }

        let threshold = self.threshold;
        let request = self
            .requests
            .get_mut(&transfer_id)
            .ok_or(WalletError::UnknownTransfer(transfer_id))?;

        if request.executed {
            return Err(WalletError::AlreadyExecuted(transfer_id));
        }
        if request.has_approved(caller) {
            return Err(WalletError::DuplicateApproval {
                transfer_id,
                signer: caller.clone(),
            });
        }

        if request.approval_count() + 1 < threshold {
            request.approvals.push(caller.clone());
            let approvals = request.approval_count();
            debug!(%transfer_id, signer = %caller, approvals, threshold, "approval recorded");
            self.events.emit(&WalletEvent::ApprovalRecorded {
                transfer_id,
                signer: caller.clone(),
            });
            return Ok(ApprovalOutcome::Pending { approvals });
        }

        // This approval reaches quorum. The approval record, the executed
        // mark, and the ledger transfer form one atomic unit: the ledger is
        // asked to move the funds first, and the request is only mutated
        // once the move succeeded. A ledger failure therefore leaves the
        // call without any trace.
        let recipient = request.recipient.clone();
        let amount = request.amount;
        if let Err(source) = self.ledger.transfer(&self.account, &recipient, amount) {
            warn!(%transfer_id, error = %source, "quorum reached but ledger transfer failed");
            return Err(WalletError::ExecutionFailed {
                transfer_id,
                source,
            });
        }

        request.approvals.push(caller.clone());
        request.executed = true;

        info!(%transfer_id, recipient = %recipient, amount = %amount, "transfer executed");
        self.events.emit(&WalletEvent::ApprovalRecorded {
            transfer_id,
            signer: caller.clone(),
        });
        self.events.emit(&WalletEvent::TransferExecuted {
            transfer_id,
            recipient,
            amount,
        });

        Ok(ApprovalOutcome::Executed)
    }

    /// Subscribe to wallet notifications.
    pub fn subscribe(&mut self, listener: Box<dyn Fn(&WalletEvent) + Send + Sync>) {
        self.events.subscribe(listener);
    }

    // ── Read-only audit surface ─────────────────────────────────────────

    /// Look up a transfer request by id.
    pub fn request(&self, transfer_id: TransferId) -> Option<&TransferRequest> {
        self.requests.get(&transfer_id)
    }

    /// Total number of requests ever created.
    pub fn request_count(&self) -> usize {
        self.requests.len()
    }

    /// Approvals recorded for `transfer_id`, if it exists.
    pub fn approval_count(&self, transfer_id: TransferId) -> Option<usize> {
        self.requests
            .get(&transfer_id)
            .map(TransferRequest::approval_count)
    }

    /// Whether `transfer_id` has executed, if it exists.
    pub fn is_executed(&self, transfer_id: TransferId) -> Option<bool> {
        self.requests.get(&transfer_id).map(|r| r.executed)
    }

    /// Whether `account` is a registered signer.
    pub fn is_signer(&self, account: &AccountId) -> bool {
        self.signers.contains(account)
    }

    /// The registered signers, in registration order.
    pub fn signers(&self) -> &[AccountId] {
        &self.signers
    }

    /// The quorum threshold.
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// The wallet's own holding account on the ledger.
    pub fn account(&self) -> &AccountId {
        &self.account
    }

    /// The token ledger collaborator.
    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Mutable access to the ledger, for funding in tests and demos.
    pub fn ledger_mut(&mut self) -> &mut L {
        &mut self.ledger
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use custos_ledger::{InMemoryLedger, LedgerError};

    fn acct(s: &str) -> AccountId {
        AccountId::new(s)
    }

    fn funded_wallet(
        threshold: usize,
        balance: u128,
    ) -> AuthorizationWallet<InMemoryLedger> {
        let mut ledger = InMemoryLedger::new();
        ledger.mint(&acct("wallet"), TokenAmount::new(balance));
        AuthorizationWallet::new(
            acct("wallet"),
            ledger,
            vec![acct("signer1"), acct("signer2"), acct("signer3")],
            threshold,
        )
        .unwrap()
    }

    #[test]
    fn test_rejects_empty_signer_set() {
        let err = AuthorizationWallet::new(acct("wallet"), InMemoryLedger::new(), vec![], 1)
            .err()
            .unwrap();
        assert!(matches!(err, WalletError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_rejects_duplicate_signers() {
        let err = AuthorizationWallet::new(
            acct("wallet"),
            InMemoryLedger::new(),
            vec![acct("signer1"), acct("signer1")],
            1,
        )
        .err()
        .unwrap();
        assert!(matches!(err, WalletError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_rejects_threshold_out_of_range() {
        for threshold in [0usize, 4] {
            let err = AuthorizationWallet::new(
                acct("wallet"),
                InMemoryLedger::new(),
                vec![acct("signer1"), acct("signer2"), acct("signer3")],
                threshold,
            )
            .err()
            .unwrap();
            assert!(matches!(err, WalletError::InvalidConfiguration { .. }));
        }
    }

    #[test]
    fn test_new_request_starts_empty_and_unexecuted() {
        let mut wallet = funded_wallet(2, 1000);
        let id = wallet
            .request_transfer(&acct("anyone"), &acct("recipient"), TokenAmount::new(100))
            .unwrap();

        let request = wallet.request(id).unwrap();
        assert_eq!(request.approval_count(), 0);
        assert!(!request.executed);
        assert_eq!(request.recipient, acct("recipient"));
        assert_eq!(request.amount, TokenAmount::new(100));
        assert_eq!(request.requestor, acct("anyone"));
    }

    #[test]
    fn test_zero_amount_rejected() {
        let mut wallet = funded_wallet(2, 1000);
        let err = wallet
            .request_transfer(&acct("anyone"), &acct("recipient"), TokenAmount::ZERO)
            .unwrap_err();
        assert!(matches!(err, WalletError::InvalidAmount));
        assert_eq!(wallet.request_count(), 0);
    }

    #[test]
    fn test_non_signer_may_request_but_not_approve() {
        let mut wallet = funded_wallet(2, 1000);
        let id = wallet
            .request_transfer(&acct("outsider"), &acct("recipient"), TokenAmount::new(10))
            .unwrap();

        let err = wallet.approve_transfer(&acct("outsider"), id).unwrap_err();
        assert!(matches!(err, WalletError::NotAuthorized(_)));
        assert_eq!(wallet.approval_count(id), Some(0));
    }

    #[test]
    fn test_duplicate_requests_get_fresh_ids() {
        let mut wallet = funded_wallet(2, 1000);
        let a = wallet
            .request_transfer(&acct("anyone"), &acct("recipient"), TokenAmount::new(10))
            .unwrap();
        let b = wallet
            .request_transfer(&acct("anyone"), &acct("recipient"), TokenAmount::new(10))
            .unwrap();
        assert_ne!(a, b);
        assert_eq!(wallet.request_count(), 2);
    }

    #[test]
    fn test_unknown_transfer_rejected() {
        let mut wallet = funded_wallet(2, 1000);
        let err = wallet
            .approve_transfer(&acct("signer1"), TransferId::new(99))
            .unwrap_err();
        assert!(matches!(err, WalletError::UnknownTransfer(_)));
    }

    #[test]
    fn test_duplicate_approval_rejected_and_state_unchanged() {
        let mut wallet = funded_wallet(2, 1000);
        let id = wallet
            .request_transfer(&acct("anyone"), &acct("recipient"), TokenAmount::new(100))
            .unwrap();

        wallet.approve_transfer(&acct("signer1"), id).unwrap();
        let err = wallet.approve_transfer(&acct("signer1"), id).unwrap_err();
        assert!(matches!(err, WalletError::DuplicateApproval { .. }));
        assert_eq!(wallet.approval_count(id), Some(1));
        assert_eq!(wallet.is_executed(id), Some(false));
    }

    #[test]
    fn test_execution_exactly_on_threshold_approval() {
        let mut wallet = funded_wallet(2, 1000);
        let id = wallet
            .request_transfer(&acct("anyone"), &acct("recipient"), TokenAmount::new(100))
            .unwrap();

        let first = wallet.approve_transfer(&acct("signer1"), id).unwrap();
        assert_eq!(first, ApprovalOutcome::Pending { approvals: 1 });
        assert_eq!(
            wallet.ledger().balance_of(&acct("recipient")),
            TokenAmount::ZERO
        );
        assert_eq!(
            wallet.ledger().balance_of(&acct("wallet")),
            TokenAmount::new(1000)
        );

        let second = wallet.approve_transfer(&acct("signer2"), id).unwrap();
        assert_eq!(second, ApprovalOutcome::Executed);
        assert_eq!(
            wallet.ledger().balance_of(&acct("recipient")),
            TokenAmount::new(100)
        );
        assert_eq!(
            wallet.ledger().balance_of(&acct("wallet")),
            TokenAmount::new(900)
        );
    }

    #[test]
    fn test_late_approval_always_rejected_after_execution() {
        let mut wallet = funded_wallet(2, 1000);
        let id = wallet
            .request_transfer(&acct("anyone"), &acct("recipient"), TokenAmount::new(100))
            .unwrap();
        wallet.approve_transfer(&acct("signer1"), id).unwrap();
        wallet.approve_transfer(&acct("signer2"), id).unwrap();

        // No second ledger transfer for any caller, ever.
        for caller in ["signer3", "signer1", "signer2"] {
            let err = wallet.approve_transfer(&acct(caller), id).unwrap_err();
            assert!(matches!(err, WalletError::AlreadyExecuted(_)));
        }
        assert_eq!(
            wallet.ledger().balance_of(&acct("recipient")),
            TokenAmount::new(100)
        );
        assert_eq!(wallet.approval_count(id), Some(2));
    }

    #[test]
    fn test_threshold_one_executes_on_first_approval() {
        let mut wallet = funded_wallet(1, 1000);
        let id = wallet
            .request_transfer(&acct("anyone"), &acct("recipient"), TokenAmount::new(5))
            .unwrap();
        let outcome = wallet.approve_transfer(&acct("signer1"), id).unwrap();
        assert_eq!(outcome, ApprovalOutcome::Executed);
        assert_eq!(
            wallet.ledger().balance_of(&acct("recipient")),
            TokenAmount::new(5)
        );
    }

    #[test]
    fn test_threshold_equal_to_signer_count_requires_unanimity() {
        let mut wallet = funded_wallet(3, 1000);
        let id = wallet
            .request_transfer(&acct("anyone"), &acct("recipient"), TokenAmount::new(5))
            .unwrap();

        assert_eq!(
            wallet.approve_transfer(&acct("signer1"), id).unwrap(),
            ApprovalOutcome::Pending { approvals: 1 }
        );
        assert_eq!(
            wallet.approve_transfer(&acct("signer2"), id).unwrap(),
            ApprovalOutcome::Pending { approvals: 2 }
        );
        assert_eq!(
            wallet.approve_transfer(&acct("signer3"), id).unwrap(),
            ApprovalOutcome::Executed
        );
    }

    #[test]
    fn test_execution_failure_rolls_back_and_allows_retry() {
        // Unfunded wallet: quorum is reached but the ledger rejects the move.
        let mut wallet = funded_wallet(2, 0);
        let id = wallet
            .request_transfer(&acct("anyone"), &acct("recipient"), TokenAmount::new(100))
            .unwrap();

        wallet.approve_transfer(&acct("signer1"), id).unwrap();
        let err = wallet.approve_transfer(&acct("signer2"), id).unwrap_err();
        match err {
            WalletError::ExecutionFailed { transfer_id, source } => {
                assert_eq!(transfer_id, id);
                assert!(matches!(source, LedgerError::InsufficientBalance { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }

        // The failed call left no trace: one approval, not executed.
        assert_eq!(wallet.approval_count(id), Some(1));
        assert_eq!(wallet.is_executed(id), Some(false));

        // Fund the wallet and retry with the same signer.
        wallet
            .ledger_mut()
            .mint(&acct("wallet"), TokenAmount::new(1000));
        let outcome = wallet.approve_transfer(&acct("signer2"), id).unwrap();
        assert_eq!(outcome, ApprovalOutcome::Executed);
        assert_eq!(
            wallet.ledger().balance_of(&acct("recipient")),
            TokenAmount::new(100)
        );
        assert_eq!(
            wallet.ledger().balance_of(&acct("wallet")),
            TokenAmount::new(900)
        );
    }

    #[test]
    fn test_no_balance_check_at_request_time() {
        let mut wallet = funded_wallet(2, 0);
        // Requesting more than the wallet holds succeeds; the balance only
        // matters at the execution moment.
        let id = wallet
            .request_transfer(&acct("anyone"), &acct("recipient"), TokenAmount::new(1_000_000))
            .unwrap();
        assert!(wallet.request(id).is_some());
    }

    #[test]
    fn test_events_emitted_in_order() {
        use std::sync::{Arc, Mutex};

        let mut wallet = funded_wallet(2, 1000);
        let seen: Arc<Mutex<Vec<WalletEvent>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        wallet.subscribe(Box::new(move |event| {
            sink.lock().unwrap().push(event.clone());
        }));

        let id = wallet
            .request_transfer(&acct("anyone"), &acct("recipient"), TokenAmount::new(100))
            .unwrap();
        wallet.approve_transfer(&acct("signer1"), id).unwrap();
        wallet.approve_transfer(&acct("signer2"), id).unwrap();

        let events = seen.lock().unwrap();
        assert_eq!(events.len(), 4);
        assert!(matches!(events[0], WalletEvent::TransferRequested { .. }));
        assert!(matches!(events[1], WalletEvent::ApprovalRecorded { .. }));
        assert!(matches!(events[2], WalletEvent::ApprovalRecorded { .. }));
        assert!(matches!(events[3], WalletEvent::TransferExecuted { .. }));
    }

    #[test]
    fn test_no_events_from_failed_execution() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let mut wallet = funded_wallet(1, 0);
        let count = Arc::new(AtomicUsize::new(0));
        let sink = Arc::clone(&count);
        wallet.subscribe(Box::new(move |event| {
            if !matches!(event, WalletEvent::TransferRequested { .. }) {
                sink.fetch_add(1, Ordering::SeqCst);
            }
        }));

        let id = wallet
            .request_transfer(&acct("anyone"), &acct("recipient"), TokenAmount::new(100))
            .unwrap();
        wallet.approve_transfer(&acct("signer1"), id).unwrap_err();
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
