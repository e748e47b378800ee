//! Transfer-request identifier type.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a transfer request within one wallet instance.
///
/// Allocated from the wallet's monotonic counter, starting at 1, so ids are
/// collision-free across the wallet's lifetime. Ids carry no meaning across
/// wallet instances.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TransferId(u64);

impl TransferId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }

    /// The id that follows this one in allocation order.
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for TransferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "transfer#{}", self.0)
    }
}
