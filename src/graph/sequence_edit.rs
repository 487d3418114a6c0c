use fnv::FnvHashSet;

use crate::error::{GraphError, Result};
use crate::handle::{EdgeId, VertexId};
use crate::observer::GraphEvent;
use crate::policy::{DataPolicy, VertexSequencePolicy};

use super::{Graph, GraphStore};

#[allow(unused_imports)]
use log::{debug, error, info, trace};

/// An edge as it stood before an edit, kept around so it can be
/// recreated between other vertices.
struct EdgeLayout<E> {
    edge: EdgeId,
    start: VertexId,
    end: VertexId,
    data: E,
}

fn remap(v: VertexId, table: &[(VertexId, VertexId)]) -> VertexId {
    table
        .iter()
        .find(|(from, _)| *from == v)
        .map(|&(_, to)| to)
        .unwrap_or(v)
}

impl<P: DataPolicy> GraphStore<P> {
    /// True if the k-mer at `offset` is the first one of `v`.
    pub fn is_first_kmer(&self, v: VertexId, offset: usize) -> Result<bool> {
        self.vertex(v)?;
        Ok(offset == 0)
    }

    /// True if the k-mer at `offset` is the last one of `v`.
    pub fn is_last_kmer(&self, v: VertexId, offset: usize) -> Result<bool> {
        Ok(offset + self.k() == self.vertex_length(v)?)
    }

    /// Whether `v2` can be appended to `v1` by
    /// [`Graph::merge_vertices`]: two distinct vertices with nothing
    /// leaving `v1` and nothing entering `v2`. A vertex can be merged
    /// with its own conjugate only when no edge touches it.
    pub fn is_merge_possible(&self, v1: VertexId, v2: VertexId) -> Result<bool> {
        if v1 == v2
            || self.outgoing_count(v1)? != 0
            || self.incoming_count(v2)? != 0
        {
            return Ok(false);
        }
        if v2 == self.conjugate_vertex(v1)? {
            return Ok(self.incoming_count(v1)? == 0);
        }
        Ok(true)
    }

    /// The edges touching any of `vertices`, one per conjugate pair.
    fn edge_layouts(
        &self,
        vertices: &[VertexId],
    ) -> Result<Vec<EdgeLayout<P::EdgeData>>> {
        let mut seen: FnvHashSet<EdgeId> = FnvHashSet::default();
        let mut layouts = Vec::new();
        for &v in vertices {
            let record = self.vertex(v)?;
            for &e in record.outgoing.iter().chain(record.incoming.iter()) {
                let edge = self.edge(e)?;
                if seen.contains(&e) || seen.contains(&edge.conjugate) {
                    continue;
                }
                seen.insert(e);
                layouts.push(EdgeLayout {
                    edge: e,
                    start: edge.start,
                    end: edge.end,
                    data: edge.data.clone(),
                });
            }
        }
        Ok(layouts)
    }

    /// Recreate `layouts` with their starts and ends moved according
    /// to the two tables.
    fn hidden_rewire(
        &mut self,
        layouts: &[EdgeLayout<P::EdgeData>],
        starts: &[(VertexId, VertexId)],
        ends: &[(VertexId, VertexId)],
    ) -> Result<Vec<EdgeId>> {
        let mut added = Vec::with_capacity(layouts.len());
        for layout in layouts {
            let start = remap(layout.start, starts);
            let end = remap(layout.end, ends);
            added.push(self.hidden_add_edge(start, end, layout.data.clone())?);
        }
        Ok(added)
    }
}

impl<P: VertexSequencePolicy> Graph<P> {
    /// Append `v2` to `v1`, the two overlapping by `k - 1` bases.
    /// Edges entering `v1` and leaving `v2` are moved to the merged
    /// vertex, which is returned.
    ///
    /// When `v2` is the conjugate of `v1` the k-mers of `v2` are
    /// already held by the pair, and `v1` only grows by the last base
    /// of the first k-mer of `v2`. The merged vertex and its conjugate
    /// then share k-mers.
    pub fn merge_vertices(&mut self, v1: VertexId, v2: VertexId) -> Result<VertexId> {
        if !self.is_merge_possible(v1, v2)? {
            return Err(GraphError::InvariantViolation(format!(
                "vertices {} and {} can't be merged",
                v1, v2
            )));
        }
        let conj1 = self.conjugate_vertex(v1)?;
        let conj2 = self.conjugate_vertex(v2)?;
        let fold = v2 == conj1;

        let data = if fold {
            let head = match self.vertex_sequence(v2)? {
                Some(seq) => self.store.policy.vertex_data(&seq[..self.k()])?,
                None => {
                    return Err(GraphError::InvariantViolation(format!(
                        "vertex {} has no sequence",
                        v2
                    )))
                }
            };
            self.store
                .policy
                .merge_vertex_data(self.vertex_data(v1)?, &head)?
        } else {
            self.store
                .policy
                .merge_vertex_data(self.vertex_data(v1)?, self.vertex_data(v2)?)?
        };
        let layouts = self.store.edge_layouts(&[v1, v2, conj1, conj2])?;

        let merged = self.store.hidden_add_vertex(data);
        let merged_conj = self.conjugate_vertex(merged)?;
        let added = self.store.hidden_rewire(
            &layouts,
            &[(v2, merged), (conj1, merged_conj)],
            &[(v1, merged), (conj2, merged_conj)],
        )?;
        if fold {
            debug!("folded {} onto its conjugate as {}", v1, merged);
        } else {
            debug!("merged {} and {} into {}", v1, v2, merged);
        }

        self.fire(GraphEvent::MergeVertices {
            first: v1,
            second: v2,
            merged,
        });
        self.fire(GraphEvent::AddVertex(merged));
        for &e in added.iter() {
            self.fire(GraphEvent::AddEdge(e));
        }
        for layout in layouts.iter() {
            self.fire(GraphEvent::DeleteEdge(layout.edge));
        }
        self.fire(GraphEvent::DeleteVertex(v1));
        if !fold {
            self.fire(GraphEvent::DeleteVertex(v2));
        }

        for layout in layouts.iter() {
            self.store.hidden_delete_edge(layout.edge)?;
        }
        self.store.hidden_delete_vertex(v1)?;
        if !fold {
            self.store.hidden_delete_vertex(v2)?;
        }
        Ok(merged)
    }

    /// Split `v` after its first `position` bases, with
    /// `k <= position <= len`. The parts share `k - 1` bases and are
    /// joined by a link; edges entering `v` now enter the first part
    /// and edges leaving `v` leave the second. Returns the first
    /// part, or `v` itself when `position` is its length.
    ///
    /// A vertex that is its own conjugate can only be split at its
    /// centre, which makes the two parts conjugates of each other.
    pub fn split_vertex(&mut self, v: VertexId, position: usize) -> Result<VertexId> {
        Ok(self
            .split_vertex_parts(v, position)?
            .map(|(first, _)| first)
            .unwrap_or(v))
    }

    /// Like [`split_vertex`](Graph::split_vertex), but returns both
    /// parts, or `None` when `position` is the length of `v` and
    /// nothing was split.
    pub fn split_vertex_parts(
        &mut self,
        v: VertexId,
        position: usize,
    ) -> Result<Option<(VertexId, VertexId)>> {
        let len = self.vertex_length(v)?;
        if position == len {
            return Ok(None);
        }
        let conj = self.conjugate_vertex(v)?;
        let self_conjugate = conj == v;
        if self_conjugate && 2 * position != len + self.k() - 1 {
            return Err(GraphError::InvariantViolation(format!(
                "self-conjugate vertex {} of length {} can't be split at {}",
                v, len, position
            )));
        }
        let (first_data, second_data) = self
            .store
            .policy
            .split_vertex_data(self.vertex_data(v)?, position)?;
        let layouts = self.store.edge_layouts(&[v, conj])?;

        let first = self.store.hidden_add_vertex(first_data);
        let first_conj = self.conjugate_vertex(first)?;
        let second = if self_conjugate {
            first_conj
        } else {
            self.store.hidden_add_vertex(second_data)
        };
        let second_conj = self.conjugate_vertex(second)?;

        let link_data = self.store.policy.link_data();
        let link = self.store.hidden_add_edge(first, second, link_data)?;
        let added = self.store.hidden_rewire(
            &layouts,
            &[(v, second), (conj, first_conj)],
            &[(v, first), (conj, second_conj)],
        )?;
        debug!("split {} at {} into {} and {}", v, position, first, second);

        self.fire(GraphEvent::SplitVertex {
            old: v,
            first,
            second,
        });
        self.fire(GraphEvent::AddVertex(first));
        if !self_conjugate {
            self.fire(GraphEvent::AddVertex(second));
        }
        self.fire(GraphEvent::AddEdge(link));
        for &e in added.iter() {
            self.fire(GraphEvent::AddEdge(e));
        }
        for layout in layouts.iter() {
            self.fire(GraphEvent::DeleteEdge(layout.edge));
        }
        self.fire(GraphEvent::DeleteVertex(v));

        for layout in layouts.iter() {
            self.store.hidden_delete_edge(layout.edge)?;
        }
        self.store.hidden_delete_vertex(v)?;
        Ok(Some((first, second)))
    }

    /// The edge from `v1` to `v2`, adding a link if there is none.
    pub fn link_vertices(&mut self, v1: VertexId, v2: VertexId) -> Result<EdgeId> {
        if let Some(&e) = self.edges_between(v1, v2)?.first() {
            return Ok(e);
        }
        let data = self.store.policy.link_data();
        self.add_edge(v1, v2, data)
    }
}
