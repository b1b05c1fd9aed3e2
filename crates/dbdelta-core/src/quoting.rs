//! Object quoting strategies
//!
//! The quoting strategy controls whether identifiers are quoted when a
//! database's metadata is captured or rendered. Forcing `QuoteAll` during
//! capture yields case-exact literal identifiers, which is what the
//! cross-engine identity matching in the diff engine relies on.

use serde::{Deserialize, Serialize};

/// Policy for quoting object identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectQuotingStrategy {
    /// Engine-default quoting; identifiers are folded to the engine's
    /// preferred case unless they require quoting
    Legacy,

    /// Quote every identifier, preserving literal casing
    QuoteAll,

    /// Quote only identifiers that collide with reserved words
    QuoteOnlyReserved,
}

impl Default for ObjectQuotingStrategy {
    fn default() -> Self {
        Self::Legacy
    }
}

impl std::fmt::Display for ObjectQuotingStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Legacy => write!(f, "legacy"),
            Self::QuoteAll => write!(f, "quote_all"),
            Self::QuoteOnlyReserved => write!(f, "quote_only_reserved"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_strategy_is_legacy() {
        assert_eq!(ObjectQuotingStrategy::default(), ObjectQuotingStrategy::Legacy);
    }
}
