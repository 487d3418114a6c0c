use crate::error::{GraphError, Result};
use crate::handle::{EdgeId, VertexId};
use crate::observer::GraphEvent;
use crate::policy::DataPolicy;

use super::Graph;

#[allow(unused_imports)]
use log::{debug, error, info, trace};

impl<P: DataPolicy> Graph<P> {
    /// Add a vertex and its conjugate, returning the vertex holding
    /// `data`.
    pub fn add_vertex(&mut self, data: P::VertexData) -> Result<VertexId> {
        self.store.policy.validate_vertex_data(&data)?;
        let v = self.store.hidden_add_vertex(data);
        self.fire(GraphEvent::AddVertex(v));
        Ok(v)
    }

    /// Delete a vertex that has no edges, along with its conjugate.
    pub fn delete_vertex(&mut self, v: VertexId) -> Result<()> {
        if self.outgoing_count(v)? != 0 || self.incoming_count(v)? != 0 {
            return Err(GraphError::InvariantViolation(format!(
                "vertex {} still has edges",
                v
            )));
        }
        self.fire(GraphEvent::DeleteVertex(v));
        self.store.hidden_delete_vertex(v)
    }

    /// Delete every edge of `v`, then `v` itself.
    pub fn force_delete_vertex(&mut self, v: VertexId) -> Result<()> {
        let mut edges = self.outgoing_edges(v)?.to_vec();
        edges.extend_from_slice(self.incoming_edges(v)?);
        debug!("force deleting {} with {} edges", v, edges.len());

        for e in edges {
            // loops and conjugates show up twice
            if self.contains_edge(e) {
                self.delete_edge(e)?;
            }
        }
        self.delete_vertex(v)
    }

    /// Add an edge from `start` to `end` and its conjugate.
    pub fn add_edge(
        &mut self,
        start: VertexId,
        end: VertexId,
        data: P::EdgeData,
    ) -> Result<EdgeId> {
        self.conjugate_vertex(start)?;
        self.conjugate_vertex(end)?;
        self.store.policy.validate_edge_data(&data)?;
        let e = self.store.hidden_add_edge(start, end, data)?;
        self.fire(GraphEvent::AddEdge(e));
        Ok(e)
    }

    /// Delete an edge and its conjugate. Endpoints are left alone even
    /// when they become isolated.
    pub fn delete_edge(&mut self, e: EdgeId) -> Result<()> {
        self.conjugate_edge(e)?;
        self.fire(GraphEvent::DeleteEdge(e));
        self.store.hidden_delete_edge(e)
    }

    /// Merge the edges into and out of `v` when it has exactly one of
    /// each. Returns the new edge, or `None` if `v` can't be
    /// compressed.
    pub fn compress_vertex(&mut self, v: VertexId) -> Result<Option<EdgeId>> {
        if !self.can_compress_vertex(v)? {
            return Ok(None);
        }
        let path = [self.incoming_edges(v)?[0], self.outgoing_edges(v)?[0]];
        self.merge_path(&path).map(Some)
    }

    /// Replace a walk by a single edge carrying the merged data of
    /// the walk. The interior vertices of the walk are deleted.
    pub fn merge_path(&mut self, path: &[EdgeId]) -> Result<EdgeId> {
        self.check_path(path)?;
        if path.len() == 1 {
            return Ok(path[0]);
        }

        let data = {
            let datas = path
                .iter()
                .map(|&e| self.edge_data(e))
                .collect::<Result<Vec<_>>>()?;
            self.store.policy.merge_data(&datas)?
        };

        let start = self.edge_start(path[0])?;
        let end = self.edge_end(path[path.len() - 1])?;
        let interior = path[..path.len() - 1]
            .iter()
            .map(|&e| self.edge_end(e))
            .collect::<Result<Vec<_>>>()?;

        let new = self.store.hidden_add_edge(start, end, data)?;
        debug!("merging {} edges into {}", path.len(), new);

        self.fire(GraphEvent::Merge {
            old: path.to_vec(),
            new,
        });
        self.fire(GraphEvent::AddEdge(new));
        for &e in path {
            self.fire(GraphEvent::DeleteEdge(e));
        }
        for &v in interior.iter() {
            self.fire(GraphEvent::DeleteVertex(v));
        }

        for &e in path {
            self.store.hidden_delete_edge(e)?;
        }
        for &v in interior.iter() {
            self.store.hidden_delete_vertex(v)?;
        }
        Ok(new)
    }

    /// Split `e` so that its first part keeps `position` k-mers,
    /// joining the parts at a new vertex.
    pub fn split_edge(
        &mut self,
        e: EdgeId,
        position: usize,
    ) -> Result<(EdgeId, EdgeId)> {
        if self.conjugate_edge(e)? == e {
            return Err(GraphError::InvariantViolation(format!(
                "self-conjugate edge {} can't be split",
                e
            )));
        }
        let (vertex_data, first_data, second_data) = self
            .store
            .policy
            .split_data(self.edge_data(e)?, position)?;
        let start = self.edge_start(e)?;
        let end = self.edge_end(e)?;

        let middle = self.store.hidden_add_vertex(vertex_data);
        let first = self.store.hidden_add_edge(start, middle, first_data)?;
        let second = self.store.hidden_add_edge(middle, end, second_data)?;
        debug!("split {} at {} into {} and {}", e, position, first, second);

        self.fire(GraphEvent::Split {
            old: e,
            first,
            second,
        });
        self.fire(GraphEvent::AddVertex(middle));
        self.fire(GraphEvent::AddEdge(first));
        self.fire(GraphEvent::AddEdge(second));
        self.fire(GraphEvent::DeleteEdge(e));

        self.store.hidden_delete_edge(e)?;
        Ok((first, second))
    }

    /// Replace two edges standing for the same sequence by one edge
    /// between the endpoints of `second`.
    pub fn glue_edges(&mut self, first: EdgeId, second: EdgeId) -> Result<EdgeId> {
        let first_conj = self.conjugate_edge(first)?;
        self.conjugate_edge(second)?;
        if first == second || second == first_conj {
            return Err(GraphError::InvariantViolation(format!(
                "can't glue {} onto itself or its conjugate",
                first
            )));
        }

        let data = self
            .store
            .policy
            .glue_data(self.edge_data(first)?, self.edge_data(second)?);
        let start = self.edge_start(second)?;
        let end = self.edge_end(second)?;

        let new = self.store.hidden_add_edge(start, end, data)?;
        debug!("glued {} and {} into {}", first, second, new);

        self.fire(GraphEvent::Glue { new, first, second });
        self.fire(GraphEvent::AddEdge(new));
        self.fire(GraphEvent::DeleteEdge(first));
        self.fire(GraphEvent::DeleteEdge(second));

        self.store.hidden_delete_edge(first)?;
        self.store.hidden_delete_edge(second)?;
        Ok(new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::{EventLog, Listener};
    use crate::policy::{CondensedPolicy, EdgeSequence, EdgeSequencePolicy};

    fn seq(s: &str) -> EdgeSequence {
        EdgeSequence::new(s.as_bytes(), 1)
    }

    #[test]
    fn delete_vertex_requires_isolation() {
        let mut graph = Graph::new(EdgeSequencePolicy::new(3));
        let a = graph.add_vertex(()).unwrap();
        let b = graph.add_vertex(()).unwrap();
        let e = graph.add_edge(a, b, seq("ACGG")).unwrap();

        assert!(matches!(
            graph.delete_vertex(a),
            Err(GraphError::InvariantViolation(_))
        ));
        assert!(graph.contains_vertex(a));

        graph.delete_edge(e).unwrap();
        assert_eq!(graph.edge_count(), 0);
        assert!(graph.contains_vertex(b));
        graph.delete_vertex(a).unwrap();
        assert_eq!(graph.vertex_count(), 2);
        assert_eq!(graph.delete_vertex(a), Err(GraphError::VertexNotFound(a)));
    }

    #[test]
    fn force_delete_removes_loops_once() {
        let mut graph = Graph::new(EdgeSequencePolicy::new(3));
        let a = graph.add_vertex(()).unwrap();
        let b = graph.add_vertex(()).unwrap();
        graph.add_edge(a, a, seq("ACAC")).unwrap();
        graph.add_edge(a, b, seq("ACGG")).unwrap();
        graph.add_edge(b, a, seq("GGAC")).unwrap();

        graph.force_delete_vertex(a).unwrap();
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.vertex_count(), 2);
        assert!(graph.contains_vertex(b));
    }

    #[test]
    fn compress_only_simple_vertices() {
        let mut graph = Graph::new(EdgeSequencePolicy::new(3));
        graph.register(Listener::EventLog(EventLog::new()));
        let a = graph.add_vertex(()).unwrap();
        let b = graph.add_vertex(()).unwrap();
        let c = graph.add_vertex(()).unwrap();
        graph.add_edge(a, b, seq("AACGG")).unwrap();
        graph.add_edge(b, c, seq("GGTA")).unwrap();

        assert_eq!(graph.compress_vertex(a).unwrap(), None);
        let merged = graph.compress_vertex(b).unwrap().unwrap();
        assert_eq!(graph.edge_str(merged).unwrap(), "AACGGTA");
        assert!(!graph.contains_vertex(b));
        assert_eq!(graph.edge_start(merged).unwrap(), a);
        assert_eq!(graph.edge_end(merged).unwrap(), c);
    }

    #[test]
    fn links_cannot_be_merged() {
        let mut graph = Graph::new(CondensedPolicy::new(3));
        let a = graph.add_vertex(b"AAC".to_vec()).unwrap();
        let b = graph.add_vertex(b"ACG".to_vec()).unwrap();
        let c = graph.add_vertex(b"CGG".to_vec()).unwrap();
        let ab = graph.add_edge(a, b, crate::policy::Link).unwrap();
        let bc = graph.add_edge(b, c, crate::policy::Link).unwrap();

        assert!(graph.merge_path(&[ab, bc]).is_err());
        assert_eq!(graph.merge_path(&[ab]).unwrap(), ab);
        assert_eq!(graph.edge_count(), 4);
    }

    #[test]
    fn glue_rejects_conjugates() {
        let mut graph = Graph::new(EdgeSequencePolicy::new(3));
        let a = graph.add_vertex(()).unwrap();
        let b = graph.add_vertex(()).unwrap();
        let e = graph.add_edge(a, b, seq("ACGG")).unwrap();
        let conj = graph.conjugate_edge(e).unwrap();
        assert!(graph.glue_edges(e, e).is_err());
        assert!(graph.glue_edges(e, conj).is_err());
        assert_eq!(graph.edge_count(), 2);
    }
}
