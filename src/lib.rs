/*!
Condensed, double-stranded de Bruijn graphs that stay consistent under
incremental editing.

# Overview

A condensed de Bruijn graph collapses every maximal non-branching run
of k-mers into a single element. This crate keeps such a graph, along
with its reverse complement strand, in a mutable multigraph where every
vertex and every edge has a *conjugate*, and offers a small set of
edits that keep the conjugate pairing intact.

Edits are announced on a notification bus, and the listeners on the
bus keep derived structures current. The most important one is the
[`IndexRenewer`](index::IndexRenewer), which maintains a map from every
k-mer to the element holding it and the offset it starts at.

# The graph

* [`GraphStore`](graph::GraphStore) holds the vertices and edges and
  answers all read-only queries.
* [`Graph`](graph::Graph) wraps a store with a
  [`NotificationBus`](observer::NotificationBus) and implements the
  edits: adding and deleting vertices and edges, compressing vertices,
  merging paths, splitting and gluing edges, and, for graphs whose
  vertices carry sequences, merging, splitting and linking vertices.
* What a vertex or an edge carries is decided by a
  [`DataPolicy`](policy::DataPolicy). [`CondensedPolicy`](policy::CondensedPolicy)
  puts the sequences on the vertices and uses bare links as edges,
  [`EdgeSequencePolicy`](policy::EdgeSequencePolicy) puts sequences
  with coverage on the edges.

Elements are referred to by [`VertexId`](handle::VertexId) and
[`EdgeId`](handle::EdgeId), generation-checked handles into an
[`Arena`](arena::Arena). A handle to a deleted element is never
resolved to whatever reuses its slot.

# Construction

* [`IncrementalConstructor`](construction::IncrementalConstructor)
  threads reads through the graph, one pair of consecutive k-mers at a
  time.
* [`CondenseConstructor`](construction::CondenseConstructor) condenses
  an uncondensed graph given as a [`KmerAdjacency`](origin::KmerAdjacency),
  such as a [`KmerTable`](origin::KmerTable) counted from reads.

# Misc.

* [`kmer`] has the 2-bit packed k-mer type
* [`conversion`] exports a graph with vertex sequences to GFA
* [`util::validate`] checks the structural invariants of a graph
*/

pub mod arena;
pub mod config;
pub mod error;
pub mod handle;
pub mod kmer;

pub mod graph;
pub mod index;
pub mod observer;
pub mod policy;

pub mod construction;
pub mod origin;

pub mod conversion;
pub mod util;

pub use self::config::GraphConfig;
pub use self::error::{GraphError, Result};
pub use self::graph::{Graph, GraphStore};
pub use self::handle::{EdgeId, Owner, VertexId};
pub use self::kmer::Kmer;
