//! Communication errors.  Every variant is fatal to the run.

use std::fmt;
use std::time::Duration;

use ca_core::Rank;
use ca_partition::PartitionError;
use thiserror::Error;

/// The message operation that failed.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Op {
    Send,
    Post,
    Recv,
    WaitAll,
    Scatter,
    Reduce,
    Gather,
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Op::Send    => "send",
            Op::Post    => "post",
            Op::Recv    => "recv",
            Op::WaitAll => "wait_all",
            Op::Scatter => "scatter",
            Op::Reduce  => "reduce",
            Op::Gather  => "gather",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error)]
pub enum CommError {
    #[error("{op} failed: {peer} disconnected")]
    PeerDisconnected { peer: Rank, op: Op },

    #[error("{op} with {peer} timed out after {after:?}")]
    Timeout { peer: Rank, op: Op, after: Duration },

    #[error("{op} to {peer} would block on a rendezvous fabric")]
    WouldBlock { peer: Rank, op: Op },

    #[error("{rank} has no {tag} link with {peer}")]
    NotNeighbour { rank: Rank, peer: Rank, tag: crate::Tag },

    #[error("{op}: expected {expected} cells for {peer}, got {got}")]
    SizeMismatch { peer: Rank, op: Op, expected: usize, got: usize },

    #[error("{op} from {peer}: expected a {expected} message")]
    Unexpected { peer: Rank, op: Op, expected: &'static str },

    #[error("coordinator called {op} without the full road")]
    MissingRootData { op: Op },

    #[error(transparent)]
    Partition(#[from] PartitionError),
}

impl CommError {
    /// `true` for errors that merely echo a failure elsewhere on the ring.
    ///
    /// When a run aborts, every surviving worker reports a disconnection; the
    /// root cause is the first error for which this returns `false`.
    pub fn is_disconnect(&self) -> bool {
        matches!(self, CommError::PeerDisconnected { .. })
    }
}

pub type CommResult<T> = Result<T, CommError>;
