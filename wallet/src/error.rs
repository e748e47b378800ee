use custos_ledger::LedgerError;
use custos_types::{AccountId, TransferId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("invalid wallet configuration: {reason}")]
    InvalidConfiguration { reason: String },

    #[error("transfer amount must be greater than zero")]
    InvalidAmount,

    #[error("account {0} is not an authorized signer")]
    NotAuthorized(AccountId),

    #[error("unknown transfer request: {0}")]
    UnknownTransfer(TransferId),

    #[error("transfer request {0} has already been executed")]
    AlreadyExecuted(TransferId),

    #[error("signer {signer} has already approved {transfer_id}")]
    DuplicateApproval {
        transfer_id: TransferId,
        signer: AccountId,
    },

    #[error("ledger transfer failed for {transfer_id}: {source}")]
    ExecutionFailed {
        transfer_id: TransferId,
        #[source]
        source: LedgerError,
    },
}
