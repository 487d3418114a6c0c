/*!
The k-mer position index and the listener that keeps it current.

[`KmerIndex`] maps every k-mer of the graph's sequences to the element
that holds it and the offset it starts at. [`IndexRenewer`] owns an
index and updates it from the graph events, which is what keeps the
index synchronized with every edit.
*/

use fnv::FnvHashMap;

use crate::error::{GraphError, Result};
use crate::graph::GraphStore;
use crate::handle::{EdgeId, Owner, VertexId};
use crate::kmer::Kmer;
use crate::observer::GraphListener;
use crate::policy::DataPolicy;

#[allow(unused_imports)]
use log::{debug, error, info, trace};

/// Where a k-mer currently lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KmerPosition {
    pub owner: Owner,
    pub offset: usize,
}

#[derive(Debug, Clone, Default)]
pub struct KmerIndex {
    k: usize,
    positions: FnvHashMap<Kmer, KmerPosition>,
}

impl KmerIndex {
    pub fn new(k: usize) -> KmerIndex {
        KmerIndex {
            k,
            positions: Default::default(),
        }
    }

    #[inline]
    pub fn k(&self) -> usize {
        self.k
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Insert or overwrite the position of `kmer`.
    pub fn put(&mut self, kmer: Kmer, owner: Owner, offset: usize) {
        self.positions.insert(kmer, KmerPosition { owner, offset });
    }

    #[inline]
    pub fn contains(&self, kmer: &Kmer) -> bool {
        self.positions.contains_key(kmer)
    }

    pub fn get(&self, kmer: &Kmer) -> Result<KmerPosition> {
        self.positions
            .get(kmer)
            .copied()
            .ok_or_else(|| GraphError::KmerNotFound(kmer.to_string()))
    }

    /// Remove the entry for `kmer`, but only if it still points at
    /// `owner`. Returns `true` if an entry was removed.
    pub fn delete_if_owned_by(&mut self, kmer: &Kmer, owner: Owner) -> bool {
        match self.positions.get(kmer) {
            Some(pos) if pos.owner == owner => {
                self.positions.remove(kmer);
                true
            }
            _ => false,
        }
    }

    /// Point every k-mer window of `seq` at `owner`.
    pub fn put_sequence(&mut self, seq: &[u8], owner: Owner) {
        for (offset, kmer) in Kmer::windows(seq, self.k) {
            self.put(kmer, owner, offset);
        }
    }

    /// Remove the entries of the k-mer windows of `seq` that still
    /// point at `owner`.
    pub fn delete_sequence(&mut self, seq: &[u8], owner: Owner) -> usize {
        Kmer::windows(seq, self.k)
            .filter(|(_, kmer)| self.delete_if_owned_by(kmer, owner))
            .count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Kmer, &KmerPosition)> + '_ {
        self.positions.iter()
    }
}

/// Listener that keeps a [`KmerIndex`] in sync with the graph.
///
/// When an element is added, the windows of its conjugate are indexed
/// first and its own windows second, so k-mers shared by the two end
/// up pointing at the element that was announced.
#[derive(Debug, Clone, Default)]
pub struct IndexRenewer {
    index: KmerIndex,
}

impl IndexRenewer {
    pub fn new(k: usize) -> IndexRenewer {
        IndexRenewer {
            index: KmerIndex::new(k),
        }
    }

    pub fn index(&self) -> &KmerIndex {
        &self.index
    }

    pub fn into_index(self) -> KmerIndex {
        self.index
    }

    fn put_vertex<P: DataPolicy>(&mut self, graph: &GraphStore<P>, v: VertexId) {
        if let Ok(Some(seq)) = graph.vertex_sequence(v) {
            self.index.put_sequence(seq, Owner::Vertex(v));
        }
    }

    fn delete_vertex<P: DataPolicy>(
        &mut self,
        graph: &GraphStore<P>,
        v: VertexId,
    ) {
        if let Ok(Some(seq)) = graph.vertex_sequence(v) {
            self.index.delete_sequence(seq, Owner::Vertex(v));
        }
    }

    fn put_edge<P: DataPolicy>(&mut self, graph: &GraphStore<P>, e: EdgeId) {
        if let Ok(Some(seq)) = graph.edge_sequence(e) {
            self.index.put_sequence(seq, Owner::Edge(e));
        }
    }

    fn delete_edge<P: DataPolicy>(&mut self, graph: &GraphStore<P>, e: EdgeId) {
        if let Ok(Some(seq)) = graph.edge_sequence(e) {
            self.index.delete_sequence(seq, Owner::Edge(e));
        }
    }
}

impl<P: DataPolicy> GraphListener<P> for IndexRenewer {
    fn name(&self) -> &str {
        "index renewer"
    }

    fn on_add_vertex(&mut self, graph: &GraphStore<P>, v: VertexId) {
        if let Ok(conj) = graph.conjugate_vertex(v) {
            if conj != v {
                self.put_vertex(graph, conj);
            }
        }
        self.put_vertex(graph, v);
    }

    fn on_delete_vertex(&mut self, graph: &GraphStore<P>, v: VertexId) {
        self.delete_vertex(graph, v);
        if let Ok(conj) = graph.conjugate_vertex(v) {
            if conj != v {
                self.delete_vertex(graph, conj);
            }
        }
    }

    fn on_add_edge(&mut self, graph: &GraphStore<P>, e: EdgeId) {
        if let Ok(conj) = graph.conjugate_edge(e) {
            if conj != e {
                self.put_edge(graph, conj);
            }
        }
        self.put_edge(graph, e);
    }

    fn on_delete_edge(&mut self, graph: &GraphStore<P>, e: EdgeId) {
        self.delete_edge(graph, e);
        if let Ok(conj) = graph.conjugate_edge(e) {
            if conj != e {
                self.delete_edge(graph, conj);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::ArenaHandle;

    fn kmer(s: &str) -> Kmer {
        Kmer::from_slice(s.as_bytes()).unwrap()
    }

    #[test]
    fn conditional_delete() {
        let a = Owner::Vertex(VertexId::from_parts(0, 0));
        let b = Owner::Vertex(VertexId::from_parts(1, 0));

        let mut index = KmerIndex::new(3);
        index.put(kmer("ACG"), a, 0);
        index.put(kmer("ACG"), b, 2);

        assert!(!index.delete_if_owned_by(&kmer("ACG"), a));
        assert_eq!(
            index.get(&kmer("ACG")).unwrap(),
            KmerPosition {
                owner: b,
                offset: 2
            }
        );
        assert!(index.delete_if_owned_by(&kmer("ACG"), b));
        assert!(!index.contains(&kmer("ACG")));
        assert_eq!(
            index.get(&kmer("ACG")),
            Err(GraphError::KmerNotFound("ACG".to_string()))
        );
    }

    #[test]
    fn sequences_are_indexed_by_window() {
        let a = Owner::Edge(EdgeId::from_parts(0, 0));
        let b = Owner::Edge(EdgeId::from_parts(1, 0));

        let mut index = KmerIndex::new(3);
        index.put_sequence(b"ACGTTA", a);
        assert_eq!(index.len(), 4);
        assert_eq!(index.get(&kmer("TTA")).unwrap().offset, 3);

        index.put(kmer("GTT"), b, 0);
        assert_eq!(index.delete_sequence(b"ACGTTA", a), 3);
        assert_eq!(index.len(), 1);
        assert_eq!(index.get(&kmer("GTT")).unwrap().owner, b);
    }
}
