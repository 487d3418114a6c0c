use crate::{
    error::{GraphError, Result},
    graph::GraphStore,
    handle::VertexId,
    policy::DataPolicy,
};

use gfa::gfa::{Link, Orientation, Segment, GFA};

use fnv::FnvHashMap;

#[allow(unused_imports)]
use log::{debug, error, info, trace};

/// Export a graph whose vertices carry sequences as GFA.
///
/// Each conjugate pair of vertices becomes one segment, named from 1
/// up, holding the sequence of the pair member with the lower slot
/// index; the other member is that segment in `Backward` orientation.
/// Likewise each conjugate pair of edges becomes one link, with the
/// policy's rendering of the edge as the overlap.
pub fn to_gfa<P: DataPolicy>(graph: &GraphStore<P>) -> Result<GFA<usize, ()>> {
    let mut gfa = GFA::new();
    let mut segments: FnvHashMap<VertexId, (usize, Orientation)> =
        FnvHashMap::default();

    for v in graph.vertices() {
        let conj = graph.conjugate_vertex(v)?;
        if conj.index() < v.index() {
            continue;
        }
        let sequence = match graph.vertex_sequence(v)? {
            Some(seq) => seq.to_vec(),
            None => {
                return Err(GraphError::InvariantViolation(format!(
                    "vertex {} has no sequence to export",
                    v
                )))
            }
        };
        let name = gfa.segments.len() + 1;
        segments.insert(v, (name, Orientation::Forward));
        segments.insert(conj, (name, Orientation::Backward));
        gfa.segments.push(Segment {
            name,
            sequence,
            optional: (),
        });
    }

    let segment_of = |v: VertexId| {
        segments.get(&v).copied().ok_or(GraphError::VertexNotFound(v))
    };

    for e in graph.edges() {
        let conj = graph.conjugate_edge(e)?;
        if conj.index() < e.index() {
            continue;
        }
        let (from_segment, from_orient) = segment_of(graph.edge_start(e)?)?;
        let (to_segment, to_orient) = segment_of(graph.edge_end(e)?)?;
        let overlap = graph.edge_str(e)?.into_bytes();

        gfa.links.push(Link {
            from_segment,
            from_orient,
            to_segment,
            to_orient,
            overlap,
            optional: (),
        });
    }

    debug!(
        "exported {} segments and {} links",
        gfa.segments.len(),
        gfa.links.len()
    );
    Ok(gfa)
}
