use ca_comm::CommError;
use ca_core::{CaError, Rank};
use ca_partition::PartitionError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Core(#[from] CaError),

    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error("road has {got} cells but the configuration expects {expected}")]
    RoadLengthMismatch { expected: usize, got: usize },

    #[error("{what} has {got} cells, expected {expected}")]
    SegmentLength {
        expected: usize,
        got:      usize,
        what:     &'static str,
    },

    #[error(transparent)]
    Partition(#[from] PartitionError),

    #[error("{rank}: {source}")]
    Comm {
        rank:   Rank,
        #[source]
        source: CommError,
    },

    #[error("failed to start worker thread for {rank}: {source}")]
    Spawn {
        rank:   Rank,
        #[source]
        source: std::io::Error,
    },

    #[error("worker thread for {0} panicked")]
    WorkerPanicked(Rank),
}

impl SimError {
    /// `true` if this error only reports that a peer went away.
    pub fn is_disconnect(&self) -> bool {
        matches!(self, SimError::Comm { source, .. } if source.is_disconnect())
    }
}

pub type SimResult<T> = Result<T, SimError>;
