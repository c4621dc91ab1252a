/*!
# Errors

All fallible operations of this crate return [`Result`] with a [`GraphError`].

Construction is the only place where user input is checked: out-of-range indices and
structurally broken encodings are rejected there and never clamped or dropped. Once a
[`RelationGraph`](crate::graph::RelationGraph) exists, every conversion between the three
encodings is a total function, so format requests on a handle do not return errors.
*/

use thiserror::Error;

use crate::Node;

/// Errors raised while building or querying a relation graph.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// An index in an input encoding is out of the declared bounds
    #[error("{what}[{position}] = {value} is out of bounds (must be < {bound})")]
    DimensionMismatch {
        what: &'static str,
        position: usize,
        value: Node,
        bound: u64,
    },

    /// A matrix whose dimensions do not match the declared vertex counts
    #[error("{what} matrix has shape {actual:?}, expected {expected:?}")]
    ShapeMismatch {
        what: &'static str,
        expected: (Node, Node),
        actual: (Node, Node),
    },

    /// Two arrays of an encoding disagree in length
    #[error("{what} has length {actual}, expected {expected}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// The offset array of a compressed encoding is not a valid prefix sum
    #[error("malformed indptr: {0}")]
    MalformedIndptr(String),

    /// A format value that does not name one of the three encodings
    #[error("invalid sparse format: {0}")]
    InvalidFormat(String),

    /// A format cache without any materialized format.
    /// This is a logic error and never returned from a public API.
    #[error("format cache has no materialized format")]
    EmptyCache,
}

pub type Result<T> = std::result::Result<T, GraphError>;
