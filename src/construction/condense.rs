use crate::error::Result;
use crate::graph::Graph;
use crate::kmer::Kmer;
use crate::origin::KmerAdjacency;
use crate::policy::{CondensedPolicy, VertexSequencePolicy};

use super::{kmer_index, vertex_position};

#[allow(unused_imports)]
use log::{debug, error, info, trace};

/// Builds a condensed graph out of an uncondensed one by collapsing
/// every maximal non-branching run of k-mers into a vertex.
///
/// A walk along a run stops at a branch, when it would step onto the
/// reverse complement of the current k-mer, when it comes back to the
/// k-mer it started from, and at palindromic k-mers. The last two make
/// sure cycles and self-complementary runs terminate; a palindromic
/// k-mer always ends up as a vertex of its own.
pub struct CondenseConstructor<'a, A: KmerAdjacency + ?Sized> {
    origin: &'a A,
    graph: Graph<CondensedPolicy>,
}

impl<'a, A: KmerAdjacency + ?Sized> CondenseConstructor<'a, A> {
    pub fn new(origin: &'a A) -> Self {
        CondenseConstructor {
            origin,
            graph: Graph::with_index(CondensedPolicy::new(origin.k())),
        }
    }

    /// The single predecessor of `kmer`, if the run containing `kmer`
    /// continues to the left.
    fn step_left(&self, kmer: &Kmer, initial: &Kmer) -> Option<Kmer> {
        if kmer.is_palindrome() || self.origin.prev_count(kmer) != 1 {
            return None;
        }
        let prev = self.origin.predecessors(kmer).next()?;
        if self.origin.next_count(&prev) != 1
            || prev == kmer.rev_comp()
            || prev == *initial
            || prev.is_palindrome()
        {
            return None;
        }
        Some(prev)
    }

    /// The single successor of `kmer`, if the run containing `kmer`
    /// continues to the right.
    fn step_right(&self, kmer: &Kmer, initial: &Kmer) -> Option<Kmer> {
        if kmer.is_palindrome() || self.origin.next_count(kmer) != 1 {
            return None;
        }
        let next = self.origin.successors(kmer).next()?;
        if self.origin.prev_count(&next) != 1
            || next == kmer.rev_comp()
            || next == *initial
            || next.is_palindrome()
        {
            return None;
        }
        Some(next)
    }

    fn go_left(&self, initial: &Kmer) -> Kmer {
        let mut kmer = initial.clone();
        while let Some(prev) = self.step_left(&kmer, initial) {
            kmer = prev;
        }
        kmer
    }

    fn construct_seq_going_right(&self, leftmost: &Kmer) -> Vec<u8> {
        let mut seq = leftmost.to_bytes();
        let mut kmer = leftmost.clone();
        while let Some(next) = self.step_right(&kmer, leftmost) {
            seq.push(next.last());
            kmer = next;
        }
        seq
    }

    fn condense_runs(&mut self) -> Result<()> {
        for kmer in self.origin.kmers() {
            if kmer_index(&self.graph)?.contains(&kmer) {
                continue;
            }
            let leftmost = self.go_left(&kmer);
            let seq = self.construct_seq_going_right(&leftmost);
            trace!("run of {} k-mers from {}", seq.len() + 1 - kmer.len(), leftmost);
            let data = self.graph.policy().vertex_data(&seq)?;
            self.graph.add_vertex(data)?;
        }
        Ok(())
    }

    /// Link every vertex to the vertices holding the successors of its
    /// last k-mer.
    fn make_links(&mut self) -> Result<()> {
        let k = self.graph.k();
        let vertices = self.graph.vertices().collect::<Vec<_>>();
        for v in vertices {
            let last = match self.graph.vertex_sequence(v)? {
                Some(seq) => Kmer::from_suffix(seq, k)?,
                None => continue,
            };
            for next in self.origin.successors(&last) {
                let (to, offset) = vertex_position(&self.graph, &next)?;
                if offset != 0 {
                    debug!("{} follows {} but starts at {} of {}", next, last, offset, to);
                }
                self.graph.link_vertices(v, to)?;
            }
        }
        Ok(())
    }

    pub fn construct(mut self) -> Result<Graph<CondensedPolicy>> {
        self.condense_runs()?;
        self.make_links()?;
        info!(
            "condensed into {} vertices and {} edges",
            self.graph.vertex_count(),
            self.graph.edge_count()
        );
        Ok(self.graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::origin::KmerTable;

    fn table(k: usize, kmers: &[&str]) -> KmerTable {
        KmerTable::from_kmers(
            k,
            kmers
                .iter()
                .map(|s| Kmer::from_slice(s.as_bytes()).unwrap()),
        )
    }

    #[test]
    fn palindromic_kmer_stands_alone() {
        let origin = table(4, &["AACG", "ACGT", "CGTA"]);
        let graph = CondenseConstructor::new(&origin).construct().unwrap();
        let acgt = Kmer::from_slice(b"ACGT").unwrap();
        let (v, _) = vertex_position(&graph, &acgt).unwrap();
        assert_eq!(graph.vertex_str(v).unwrap(), "ACGT");
        assert_eq!(graph.conjugate_vertex(v).unwrap(), v);
    }

    #[test]
    fn cycle_becomes_one_looped_vertex() {
        // ACA -> CAC -> ACA
        let origin = table(3, &["ACA", "CAC"]);
        let graph = CondenseConstructor::new(&origin).construct().unwrap();
        assert_eq!(graph.vertex_count(), 2);
        for v in graph.vertices() {
            assert_eq!(graph.vertex_length(v).unwrap(), 4);
            assert_eq!(graph.edges_between(v, v).unwrap().len(), 1);
        }
    }
}
