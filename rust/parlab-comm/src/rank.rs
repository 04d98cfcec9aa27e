//! Participant and message identities.

use std::fmt;

/// A participant's identity within a process group, in `[0, size)`.
///
/// Rank 0 is the coordinator by convention; nothing else distinguishes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Rank(pub u32);

impl Rank {
    /// The coordinator rank.
    pub const COORDINATOR: Rank = Rank(0);

    /// `true` for the coordinator.
    pub fn is_coordinator(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A label separating logical exchanges between the same pair of ranks.
///
/// A receive only matches envelopes carrying the requested tag; others are
/// held back for later receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tag(pub u32);

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_coordinator_is_zero() {
        assert!(Rank::COORDINATOR.is_coordinator());
        assert!(Rank(0).is_coordinator());
        assert!(!Rank(3).is_coordinator());
    }

    #[test]
    fn rank_orders_numerically() {
        let mut ranks = vec![Rank(2), Rank(0), Rank(1)];
        ranks.sort();
        assert_eq!(ranks, vec![Rank(0), Rank(1), Rank(2)]);
    }

    #[test]
    fn rank_and_tag_display() {
        assert_eq!(Rank(7).to_string(), "7");
        assert_eq!(Tag(1).to_string(), "1");
    }
}
