/*!
Data policies decide what vertices and edges carry, and how that data
behaves under conjugation and the composite edits of the graph.

The graph itself only knows about topology and conjugate pairing. Any
time an edit has to produce new data (merging a path into one edge,
splitting an edge in two, gluing two edges) it asks the policy.

Two policies are provided:

* [`CondensedPolicy`] stores nucleotide sequences on vertices and
  leaves edges as bare links, with adjacent vertices overlapping by
  `k - 1` bases. This is the layout the constructors produce.
* [`EdgeSequencePolicy`] stores sequences (and coverage) on edges and
  uses vertices as junctions, the classic condensed de Bruijn layout
  where paths are merged and edges split and glued.
*/

use std::fmt::Debug;

use crate::error::Result;

mod condensed;
mod sequence;

pub use self::condensed::{CondensedPolicy, Link};
pub use self::sequence::{EdgeSequence, EdgeSequencePolicy};

/// Payload behavior for a [`Graph`](crate::graph::Graph).
pub trait DataPolicy {
    type VertexData: Clone + Debug;
    type EdgeData: Clone + Debug;

    /// The k-mer length sequences in the graph are built from.
    fn k(&self) -> usize;

    fn conjugate_vertex_data(&self, data: &Self::VertexData)
        -> Self::VertexData;

    fn conjugate_edge_data(&self, data: &Self::EdgeData) -> Self::EdgeData;

    /// Reject vertex data the graph cannot hold.
    fn validate_vertex_data(&self, _data: &Self::VertexData) -> Result<()> {
        Ok(())
    }

    /// Reject edge data the graph cannot hold.
    fn validate_edge_data(&self, _data: &Self::EdgeData) -> Result<()> {
        Ok(())
    }

    /// A vertex whose data is its own conjugate is stored once and is
    /// its own conjugate vertex.
    fn is_self_conjugate_vertex(&self, _data: &Self::VertexData) -> bool {
        false
    }

    /// Whether an edge `v -> conj(v)` with this data can be stored as
    /// its own conjugate.
    fn is_self_conjugate_edge(&self, data: &Self::EdgeData) -> bool;

    /// The nucleotides of a vertex, if vertices carry any.
    fn vertex_nucls<'a>(&self, _data: &'a Self::VertexData) -> Option<&'a [u8]> {
        None
    }

    /// The nucleotides of an edge, if edges carry any.
    fn edge_nucls<'a>(&self, _data: &'a Self::EdgeData) -> Option<&'a [u8]> {
        None
    }

    fn vertex_length(&self, data: &Self::VertexData) -> usize;

    fn edge_length(&self, data: &Self::EdgeData) -> usize;

    /// Combine the data along a walk into the data of the single edge
    /// replacing it.
    fn merge_data(&self, to_merge: &[&Self::EdgeData]) -> Result<Self::EdgeData>;

    /// Split edge data so that the first part keeps `position` k-mers.
    /// Returns the data of the new middle vertex and of both parts.
    fn split_data(
        &self,
        data: &Self::EdgeData,
        position: usize,
    ) -> Result<(Self::VertexData, Self::EdgeData, Self::EdgeData)>;

    /// Data of the edge replacing `first` and `second`, which
    /// represent the same sequence.
    fn glue_data(
        &self,
        first: &Self::EdgeData,
        second: &Self::EdgeData,
    ) -> Self::EdgeData;

    fn vertex_str(&self, data: &Self::VertexData) -> String;

    fn edge_str(&self, data: &Self::EdgeData) -> String;
}

/// Policies whose vertices carry the sequence, which enables the
/// vertex level edits used by read threading.
pub trait VertexSequencePolicy: DataPolicy {
    /// Vertex data holding the given nucleotides.
    fn vertex_data(&self, nucls: &[u8]) -> Result<Self::VertexData>;

    /// Concatenate two vertices that overlap by `k - 1` bases.
    fn merge_vertex_data(
        &self,
        left: &Self::VertexData,
        right: &Self::VertexData,
    ) -> Result<Self::VertexData>;

    /// Split a vertex after its first `position` bases. Both parts
    /// keep the `k - 1` bases they share, so the k-mer ending at
    /// `position` is the last of the first part and the one after it
    /// is the first of the second part.
    fn split_vertex_data(
        &self,
        data: &Self::VertexData,
        position: usize,
    ) -> Result<(Self::VertexData, Self::VertexData)>;

    /// Payload of an edge joining two overlapping vertices.
    fn link_data(&self) -> Self::EdgeData;
}
