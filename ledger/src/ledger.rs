//! The `TokenLedger` trait — the capability set the wallet consumes.

use custos_types::{AccountId, TokenAmount};

use crate::error::LedgerError;

/// Fungible-token ledger interface.
///
/// Implementors provide standard transfer semantics; the custody wallet
/// calls [`transfer`](TokenLedger::transfer) with itself as `from` (the
/// wallet is the token-holding account). Balance reads are for external
/// observers; the approval protocol itself never checks balances before
/// the execution moment.
pub trait TokenLedger {
    /// Move `amount` from `from` to `to`.
    ///
    /// Either the full amount moves or nothing does; a failed transfer
    /// leaves both balances untouched.
    fn transfer(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        amount: TokenAmount,
    ) -> Result<(), LedgerError>;

    /// Current balance of `account`. Unknown accounts read as zero.
    fn balance_of(&self, account: &AccountId) -> TokenAmount;

    /// Whether the ledger knows this account. The default implementation
    /// treats any non-zero balance as existence; implementors with a real
    /// account table should override it.
    fn account_exists(&self, account: &AccountId) -> bool {
        !self.balance_of(account).is_zero()
    }
}
