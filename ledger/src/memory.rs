//! In-memory reference ledger.

use std::collections::HashMap;

use custos_types::{AccountId, TokenAmount};
use tracing::debug;

use crate::error::LedgerError;
use crate::ledger::TokenLedger;

/// A simple in-memory balance map implementing [`TokenLedger`].
///
/// Used by the test suites and the demo binary. Minting stands in for
/// whatever issuance mechanism the real ledger has; the wallet itself is
/// funded by ordinary transfers addressed to its account.
#[derive(Clone, Debug, Default)]
pub struct InMemoryLedger {
    balances: HashMap<AccountId, TokenAmount>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit `amount` to `account` out of thin air.
    pub fn mint(&mut self, account: &AccountId, amount: TokenAmount) {
        let balance = self
            .balances
            .entry(account.clone())
            .or_insert(TokenAmount::ZERO);
        // Mint overflow is a test-harness concern, not a protocol one.
        *balance = balance.checked_add(amount).unwrap_or(TokenAmount::new(u128::MAX));
        debug!(account = %account, amount = %amount, "minted");
    }

    /// Number of accounts that have ever held a balance.
    pub fn account_count(&self) -> usize {
        self.balances.len()
    }
}

impl TokenLedger for InMemoryLedger {
    fn transfer(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        amount: TokenAmount,
    ) -> Result<(), LedgerError> {
        if !from.is_valid() {
            return Err(LedgerError::InvalidAccount(from.to_string()));
        }
        if !to.is_valid() {
            return Err(LedgerError::InvalidAccount(to.to_string()));
        }

        let available = self
            .balances
            .get(from)
            .copied()
            .unwrap_or(TokenAmount::ZERO);
        let debited = available
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientBalance {
                needed: amount,
                available,
            })?;

        // Debit first, then credit; the checked_sub above guarantees the
        // debit cannot fail once we start mutating.
        self.balances.insert(from.clone(), debited);
        let credit = self.balances.entry(to.clone()).or_insert(TokenAmount::ZERO);
        *credit = credit
            .checked_add(amount)
            .unwrap_or(TokenAmount::new(u128::MAX));

        debug!(from = %from, to = %to, amount = %amount, "transfer applied");
        Ok(())
    }

    fn balance_of(&self, account: &AccountId) -> TokenAmount {
        self.balances
            .get(account)
            .copied()
            .unwrap_or(TokenAmount::ZERO)
    }

    fn account_exists(&self, account: &AccountId) -> bool {
        self.balances.contains_key(account)
    }
}
