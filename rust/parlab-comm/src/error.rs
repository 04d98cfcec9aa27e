//! Error types for rank-addressed messaging.

use crate::rank::Rank;
use thiserror::Error;

/// Errors raised by the fabric and by process-group teardown.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommError {
    /// The addressed rank is outside the group.
    #[error("peer rank {peer} does not exist in a group of {size}")]
    UnknownPeer { peer: Rank, size: usize },

    /// A rank tried to exchange a message with itself; a rendezvous with
    /// yourself never completes.
    #[error("rank {rank} cannot exchange messages with itself")]
    SelfMessage { rank: Rank },

    /// The peer's endpoint was dropped before the exchange completed.
    #[error("peer rank {peer} disconnected")]
    Disconnected { peer: Rank },

    /// A participant thread panicked; the panic message is captured.
    #[error("rank {rank} panicked: {message}")]
    RankPanicked { rank: Rank, message: String },
}
