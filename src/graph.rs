/*!
The condensed graph: conjugate-paired vertices and edges in a pair of
slot arenas, plus the edit algebra that mutates them.

[`GraphStore`] owns the topology and the data policy, and provides all
read access. [`Graph`] wraps a store together with a
[`NotificationBus`], and is the only way to edit the store: every edit
goes through the edit operations defined on [`Graph`], which keep
the conjugate pairing intact and announce each step to the listeners.

Adding a vertex also adds its conjugate, unless the policy considers
the data its own conjugate; adding an edge `v1 -> v2` also adds
`conj(v2) -> conj(v1)`, unless that would be the edge itself. Deleting
either half of a pair deletes both.
*/

use std::ops::Deref;

use crate::arena::Arena;
use crate::error::{GraphError, Result};
use crate::handle::{EdgeId, VertexId};
use crate::index::{IndexRenewer, KmerIndex};
use crate::observer::{EventLog, GraphEvent, Listener, NotificationBus};
use crate::policy::DataPolicy;

#[allow(unused_imports)]
use log::{debug, error, info, trace};

mod edit;
mod sequence_edit;

#[derive(Debug, Clone)]
struct VertexRecord<V> {
    data: V,
    conjugate: VertexId,
    outgoing: Vec<EdgeId>,
    incoming: Vec<EdgeId>,
}

#[derive(Debug, Clone)]
struct EdgeRecord<E> {
    data: E,
    start: VertexId,
    end: VertexId,
    conjugate: EdgeId,
}

/// Vertex and edge storage with read-only accessors.
#[derive(Debug, Clone)]
pub struct GraphStore<P: DataPolicy> {
    policy: P,
    vertices: Arena<VertexId, VertexRecord<P::VertexData>>,
    edges: Arena<EdgeId, EdgeRecord<P::EdgeData>>,
}

impl<P: DataPolicy> GraphStore<P> {
    pub fn new(policy: P) -> Self {
        GraphStore {
            policy,
            vertices: Arena::new(),
            edges: Arena::new(),
        }
    }

    #[inline]
    pub fn policy(&self) -> &P {
        &self.policy
    }

    #[inline]
    pub fn k(&self) -> usize {
        self.policy.k()
    }

    /// Number of vertices, counting both halves of every conjugate
    /// pair.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of edges, counting both halves of every conjugate pair.
    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn vertices(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.vertices.handles()
    }

    pub fn edges(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.edges.handles()
    }

    #[inline]
    pub fn contains_vertex(&self, v: VertexId) -> bool {
        self.vertices.contains(v)
    }

    #[inline]
    pub fn contains_edge(&self, e: EdgeId) -> bool {
        self.edges.contains(e)
    }

    fn vertex(&self, v: VertexId) -> Result<&VertexRecord<P::VertexData>> {
        self.vertices.get(v).ok_or(GraphError::VertexNotFound(v))
    }

    fn edge(&self, e: EdgeId) -> Result<&EdgeRecord<P::EdgeData>> {
        self.edges.get(e).ok_or(GraphError::EdgeNotFound(e))
    }

    pub fn vertex_data(&self, v: VertexId) -> Result<&P::VertexData> {
        Ok(&self.vertex(v)?.data)
    }

    pub fn edge_data(&self, e: EdgeId) -> Result<&P::EdgeData> {
        Ok(&self.edge(e)?.data)
    }

    pub fn conjugate_vertex(&self, v: VertexId) -> Result<VertexId> {
        Ok(self.vertex(v)?.conjugate)
    }

    pub fn conjugate_edge(&self, e: EdgeId) -> Result<EdgeId> {
        Ok(self.edge(e)?.conjugate)
    }

    pub fn edge_start(&self, e: EdgeId) -> Result<VertexId> {
        Ok(self.edge(e)?.start)
    }

    pub fn edge_end(&self, e: EdgeId) -> Result<VertexId> {
        Ok(self.edge(e)?.end)
    }

    pub fn outgoing_edges(&self, v: VertexId) -> Result<&[EdgeId]> {
        Ok(&self.vertex(v)?.outgoing)
    }

    pub fn incoming_edges(&self, v: VertexId) -> Result<&[EdgeId]> {
        Ok(&self.vertex(v)?.incoming)
    }

    pub fn outgoing_count(&self, v: VertexId) -> Result<usize> {
        Ok(self.vertex(v)?.outgoing.len())
    }

    pub fn incoming_count(&self, v: VertexId) -> Result<usize> {
        Ok(self.vertex(v)?.incoming.len())
    }

    /// All edges starting at `from` and ending at `to`.
    pub fn edges_between(
        &self,
        from: VertexId,
        to: VertexId,
    ) -> Result<Vec<EdgeId>> {
        self.vertex(to)?;
        let mut result = Vec::new();
        for &e in self.vertex(from)?.outgoing.iter() {
            if self.edge(e)?.end == to {
                result.push(e);
            }
        }
        Ok(result)
    }

    pub fn vertex_length(&self, v: VertexId) -> Result<usize> {
        Ok(self.policy.vertex_length(&self.vertex(v)?.data))
    }

    pub fn edge_length(&self, e: EdgeId) -> Result<usize> {
        Ok(self.policy.edge_length(&self.edge(e)?.data))
    }

    pub fn vertex_str(&self, v: VertexId) -> Result<String> {
        Ok(self.policy.vertex_str(&self.vertex(v)?.data))
    }

    pub fn edge_str(&self, e: EdgeId) -> Result<String> {
        Ok(self.policy.edge_str(&self.edge(e)?.data))
    }

    /// The nucleotides of `v`, if the policy puts sequences on
    /// vertices.
    pub fn vertex_sequence(&self, v: VertexId) -> Result<Option<&[u8]>> {
        Ok(self.policy.vertex_nucls(&self.vertex(v)?.data))
    }

    /// The nucleotides of `e`, if the policy puts sequences on edges.
    pub fn edge_sequence(&self, e: EdgeId) -> Result<Option<&[u8]>> {
        Ok(self.policy.edge_nucls(&self.edge(e)?.data))
    }

    #[inline]
    pub fn is_dead_end(&self, v: VertexId) -> Result<bool> {
        Ok(self.outgoing_count(v)? == 0)
    }

    #[inline]
    pub fn is_dead_start(&self, v: VertexId) -> Result<bool> {
        Ok(self.incoming_count(v)? == 0)
    }

    pub fn unique_outgoing_edge(&self, v: VertexId) -> Result<Option<EdgeId>> {
        let out = self.outgoing_edges(v)?;
        Ok(if out.len() == 1 { Some(out[0]) } else { None })
    }

    pub fn unique_incoming_edge(&self, v: VertexId) -> Result<Option<EdgeId>> {
        let inc = self.incoming_edges(v)?;
        Ok(if inc.len() == 1 { Some(inc[0]) } else { None })
    }

    /// True if `v` has exactly one incoming and one outgoing edge and
    /// the two form a path that can be merged.
    pub fn can_compress_vertex(&self, v: VertexId) -> Result<bool> {
        let (inc, out) = match (
            self.unique_incoming_edge(v)?,
            self.unique_outgoing_edge(v)?,
        ) {
            (Some(inc), Some(out)) => (inc, out),
            _ => return Ok(false),
        };
        Ok(self.check_path(&[inc, out]).is_ok())
    }

    /// Check that `path` is a walk that [`Graph::merge_path`] accepts:
    /// contiguous, no edge used twice or together with its conjugate,
    /// and every interior vertex with exactly one incoming and one
    /// outgoing edge.
    pub fn check_path(&self, path: &[EdgeId]) -> Result<()> {
        if path.is_empty() {
            return Err(GraphError::InvalidPath("path is empty".to_string()));
        }

        let mut seen: Vec<EdgeId> = Vec::with_capacity(path.len());
        for &e in path {
            let conj = self.conjugate_edge(e)?;
            if seen.contains(&e) {
                return Err(GraphError::InvalidPath(format!(
                    "edge {} occurs more than once",
                    e
                )));
            }
            if path.len() > 1 && (conj == e || seen.contains(&conj)) {
                return Err(GraphError::InvalidPath(format!(
                    "edge {} occurs together with its conjugate",
                    e
                )));
            }
            seen.push(e);
        }

        for pair in path.windows(2) {
            let (prev, next) = (pair[0], pair[1]);
            let joint = self.edge_end(prev)?;
            if joint != self.edge_start(next)? {
                return Err(GraphError::InvalidPath(format!(
                    "edge {} does not continue edge {}",
                    next, prev
                )));
            }
            if self.incoming_count(joint)? != 1
                || self.outgoing_count(joint)? != 1
            {
                return Err(GraphError::InvalidPath(format!(
                    "interior vertex {} branches",
                    joint
                )));
            }
        }
        Ok(())
    }

    // Hidden operations change the storage without telling anyone.
    // They assume the caller has validated every handle involved.

    fn hidden_add_vertex(&mut self, data: P::VertexData) -> VertexId {
        if self.policy.is_self_conjugate_vertex(&data) {
            return self.vertices.insert_with(|v| VertexRecord::new(data, v));
        }
        let conj_data = self.policy.conjugate_vertex_data(&data);
        let v = self.vertices.insert_with(|v| VertexRecord::new(data, v));
        let conj = self
            .vertices
            .insert_with(|_| VertexRecord::new(conj_data, v));
        if let Some(record) = self.vertices.get_mut(v) {
            record.conjugate = conj;
        }
        trace!("added vertex pair {} / {}", v, conj);
        v
    }

    fn hidden_delete_vertex(&mut self, v: VertexId) -> Result<()> {
        let conj = self.conjugate_vertex(v)?;
        self.vertices.remove(v);
        if conj != v {
            self.vertices.remove(conj);
        }
        trace!("removed vertex pair {} / {}", v, conj);
        Ok(())
    }

    fn attach_edge(&mut self, e: EdgeId, start: VertexId, end: VertexId) {
        if let Some(record) = self.vertices.get_mut(start) {
            record.outgoing.push(e);
        }
        if let Some(record) = self.vertices.get_mut(end) {
            record.incoming.push(e);
        }
    }

    fn detach_edge(&mut self, e: EdgeId) {
        let (start, end) = match self.edges.get(e) {
            Some(record) => (record.start, record.end),
            None => return,
        };
        if let Some(record) = self.vertices.get_mut(start) {
            record.outgoing.retain(|&x| x != e);
        }
        if let Some(record) = self.vertices.get_mut(end) {
            record.incoming.retain(|&x| x != e);
        }
        self.edges.remove(e);
    }

    fn hidden_add_edge(
        &mut self,
        start: VertexId,
        end: VertexId,
        data: P::EdgeData,
    ) -> Result<EdgeId> {
        let conj_start = self.conjugate_vertex(end)?;
        let conj_end = self.conjugate_vertex(start)?;

        if end == conj_end && self.policy.is_self_conjugate_edge(&data) {
            let e = self.edges.insert_with(|e| EdgeRecord {
                data,
                start,
                end,
                conjugate: e,
            });
            self.attach_edge(e, start, end);
            trace!("added self-conjugate edge {} ({} -> {})", e, start, end);
            return Ok(e);
        }

        let conj_data = self.policy.conjugate_edge_data(&data);
        let e = self.edges.insert_with(|e| EdgeRecord {
            data,
            start,
            end,
            conjugate: e,
        });
        let conj = self.edges.insert(EdgeRecord {
            data: conj_data,
            start: conj_start,
            end: conj_end,
            conjugate: e,
        });
        if let Some(record) = self.edges.get_mut(e) {
            record.conjugate = conj;
        }
        self.attach_edge(e, start, end);
        self.attach_edge(conj, conj_start, conj_end);
        trace!("added edge pair {} / {} ({} -> {})", e, conj, start, end);
        Ok(e)
    }

    fn hidden_delete_edge(&mut self, e: EdgeId) -> Result<()> {
        let conj = self.conjugate_edge(e)?;
        self.detach_edge(e);
        if conj != e {
            self.detach_edge(conj);
        }
        trace!("removed edge pair {} / {}", e, conj);
        Ok(())
    }
}

impl<P> GraphStore<P>
where
    P: DataPolicy,
    P::EdgeData: PartialEq,
{
    /// The first edge from `from` to `to` that carries `data`.
    pub fn find_edge(
        &self,
        from: VertexId,
        to: VertexId,
        data: &P::EdgeData,
    ) -> Result<Option<EdgeId>> {
        for e in self.edges_between(from, to)? {
            if self.edge(e)?.data == *data {
                return Ok(Some(e));
            }
        }
        Ok(None)
    }

    pub fn has_edge(
        &self,
        from: VertexId,
        to: VertexId,
        data: &P::EdgeData,
    ) -> Result<bool> {
        Ok(self.find_edge(from, to, data)?.is_some())
    }
}

impl<V> VertexRecord<V> {
    fn new(data: V, conjugate: VertexId) -> Self {
        VertexRecord {
            data,
            conjugate,
            outgoing: Vec::new(),
            incoming: Vec::new(),
        }
    }
}

/// A [`GraphStore`] together with the listeners that are told about
/// every edit to it.
///
/// All read accessors of the store are available through `Deref`.
#[derive(Debug)]
pub struct Graph<P: DataPolicy> {
    store: GraphStore<P>,
    bus: NotificationBus<P>,
}

impl<P: DataPolicy> Deref for Graph<P> {
    type Target = GraphStore<P>;

    fn deref(&self) -> &GraphStore<P> {
        &self.store
    }
}

impl<P: DataPolicy> Graph<P> {
    /// An empty graph without any listeners.
    pub fn new(policy: P) -> Self {
        Graph {
            store: GraphStore::new(policy),
            bus: NotificationBus::new(),
        }
    }

    /// An empty graph with an [`IndexRenewer`] registered.
    pub fn with_index(policy: P) -> Self {
        let k = policy.k();
        let mut graph = Graph::new(policy);
        graph.register(Listener::IndexRenewer(IndexRenewer::new(k)));
        graph
    }

    pub fn store(&self) -> &GraphStore<P> {
        &self.store
    }

    /// Register a listener; it receives events after all the
    /// listeners registered before it.
    pub fn register(&mut self, listener: Listener<P>) {
        self.bus.register(listener);
    }

    pub fn bus(&self) -> &NotificationBus<P> {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut NotificationBus<P> {
        &mut self.bus
    }

    /// The index of the first registered [`IndexRenewer`].
    pub fn kmer_index(&self) -> Option<&KmerIndex> {
        self.bus.listeners().find_map(|l| match l {
            Listener::IndexRenewer(renewer) => Some(renewer.index()),
            _ => None,
        })
    }

    /// The first registered [`EventLog`].
    pub fn event_log(&self) -> Option<&EventLog> {
        self.bus.listeners().find_map(|l| match l {
            Listener::EventLog(log) => Some(log),
            _ => None,
        })
    }

    pub fn event_log_mut(&mut self) -> Option<&mut EventLog> {
        self.bus.listeners_mut().find_map(|l| match l {
            Listener::EventLog(log) => Some(log),
            _ => None,
        })
    }

    fn fire(&mut self, event: GraphEvent) {
        self.bus.fire(&self.store, &event);
    }
}
