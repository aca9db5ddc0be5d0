use thiserror::Error;

/// Reasons a [`WavlTree`](crate::WavlTree) operation is rejected.
///
/// A rejected operation leaves the tree exactly as it was.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum WavlError {
    /// An insert named a key that is already present.
    #[error("key is already present in the tree")]
    DuplicateKey,

    /// A removal named a key that is not present.
    #[error("key is not present in the tree")]
    NotFound,

    /// A selection asked for a position outside `1..=len`.
    #[error("rank {rank} is out of range for a tree of {len} elements")]
    OutOfRange { rank: usize, len: usize },
}
