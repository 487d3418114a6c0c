/*!
Building condensed graphs from reads.

* [`IncrementalConstructor`] threads reads through the graph one k-mer
  at a time, merging, splitting, and linking vertices as it goes.
* [`CondenseConstructor`] walks the maximal non-branching runs of an
  already built [`KmerAdjacency`](crate::origin::KmerAdjacency) and
  links the resulting vertices at its branch points.

Both produce a `Graph<CondensedPolicy>` with a registered
[`IndexRenewer`](crate::index::IndexRenewer), so the position of every
k-mer can be looked up once construction is done.
*/

use crate::error::{GraphError, Result};
use crate::graph::Graph;
use crate::handle::VertexId;
use crate::index::KmerIndex;
use crate::kmer::Kmer;
use crate::policy::DataPolicy;

pub mod condense;
pub mod threading;

pub use self::condense::CondenseConstructor;
pub use self::threading::IncrementalConstructor;

pub(crate) fn kmer_index<P: DataPolicy>(graph: &Graph<P>) -> Result<&KmerIndex> {
    graph.kmer_index().ok_or_else(|| {
        GraphError::InvariantViolation("graph has no k-mer index".to_string())
    })
}

/// The vertex holding `kmer` and the offset it starts at.
pub(crate) fn vertex_position<P: DataPolicy>(
    graph: &Graph<P>,
    kmer: &Kmer,
) -> Result<(VertexId, usize)> {
    let pos = kmer_index(graph)?.get(kmer)?;
    let v = pos.owner.vertex().ok_or_else(|| {
        GraphError::InvariantViolation(format!(
            "k-mer {} is owned by edge {}",
            kmer, pos.owner
        ))
    })?;
    Ok((v, pos.offset))
}
