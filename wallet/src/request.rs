//! Transfer requests and their lifecycle.

use custos_types::{AccountId, TokenAmount, TransferId};
use serde::{Deserialize, Serialize};

/// A request to move funds out of the wallet.
///
/// Created by `request_transfer`, mutated only by `approve_transfer`, never
/// deleted — executed requests remain as a permanent audit record.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransferRequest {
    /// Unique within one wallet instance.
    pub transfer_id: TransferId,
    /// Where the funds go on execution.
    pub recipient: AccountId,
    /// How much moves. Always greater than zero.
    pub amount: TokenAmount,
    /// Who proposed the transfer. Need not be a signer.
    pub requestor: AccountId,
    /// Signers who have approved, in approval order, duplicate-free.
    pub approvals: Vec<AccountId>,
    /// Set exactly once, on the approval that reaches the threshold.
    /// Once true the request is immutable.
    pub executed: bool,
}

impl TransferRequest {
    pub(crate) fn new(
        transfer_id: TransferId,
        recipient: AccountId,
        amount: TokenAmount,
        requestor: AccountId,
    ) -> Self {
        Self {
            transfer_id,
            recipient,
            amount,
            requestor,
            approvals: Vec::new(),
            executed: false,
        }
    }

    /// Number of distinct signer approvals recorded so far.
    pub fn approval_count(&self) -> usize {
        self.approvals.len()
    }

    /// Whether `signer` has already approved this request.
    pub fn has_approved(&self, signer: &AccountId) -> bool {
        self.approvals.iter().any(|s| s == signer)
    }
}

/// Outcome of a successful `approve_transfer` call.
///
/// Lets the caller distinguish "recorded, quorum not yet reached" from
/// "recorded, transfer executed".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApprovalOutcome {
    /// The approval was recorded; the threshold has not been reached yet.
    Pending {
        /// Approvals recorded so far, including this one.
        approvals: usize,
    },
    /// This approval reached the threshold and the ledger transfer ran.
    Executed,
}

impl ApprovalOutcome {
    pub fn is_executed(&self) -> bool {
        matches!(self, Self::Executed)
    }
}
