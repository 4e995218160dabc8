use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PartitionError {
    #[error("cannot partition an empty road")]
    EmptyRoad,

    #[error("cannot partition across zero workers")]
    NoWorkers,

    #[error("{workers} workers exceed road length {cells}; every segment needs at least one cell")]
    TooManyWorkers { workers: usize, cells: usize },

    #[error("rank {rank} out of range for {workers} workers")]
    RankOutOfRange { rank: usize, workers: usize },
}

pub type PartitionResult<T> = Result<T, PartitionError>;
