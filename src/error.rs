use thiserror::Error;

use crate::handle::{EdgeId, VertexId};

pub type Result<T> = std::result::Result<T, GraphError>;

/// Everything that can go wrong while building or editing a graph.
///
/// A failed edit never leaves partial changes behind: all checks run
/// before the first mutation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// A precondition of an edit operation does not hold.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    #[error("vertex {0} does not exist")]
    VertexNotFound(VertexId),

    #[error("edge {0} does not exist")]
    EdgeNotFound(EdgeId),

    /// The k-mer has no entry in the position index.
    #[error("k-mer {0} is not in the index")]
    KmerNotFound(String),

    /// A walk handed to a path operation is not a simple path.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("invalid nucleotide {byte:?} at position {position}")]
    InvalidNucleotide { byte: char, position: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
