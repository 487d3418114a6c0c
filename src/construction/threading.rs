use fnv::FnvHashSet;

use crate::config::GraphConfig;
use crate::error::Result;
use crate::graph::Graph;
use crate::handle::VertexId;
use crate::kmer::Kmer;
use crate::policy::{CondensedPolicy, VertexSequencePolicy};
use crate::util::dna;

use super::{kmer_index, vertex_position};

#[allow(unused_imports)]
use log::{debug, error, info, trace};

/// Builds a condensed graph by threading reads through it.
///
/// Every pair of consecutive k-mers in a read ends up as either two
/// consecutive k-mers of one vertex, or as the last k-mer of one vertex
/// and the first k-mer of another, with a link between the two.
/// Threading a read a second time changes nothing.
///
/// A read that runs from the end of a vertex into the start of its
/// conjugate folds the vertex onto itself, after which the pair holds
/// some k-mers twice. The index names one copy of each; those k-mers
/// are remembered so the other copy can be found.
#[derive(Debug)]
pub struct IncrementalConstructor {
    graph: Graph<CondensedPolicy>,
    folded: FnvHashSet<Kmer>,
    reads: usize,
}

impl IncrementalConstructor {
    pub fn new(config: &GraphConfig) -> Result<Self> {
        config.validate()?;
        Ok(IncrementalConstructor {
            graph: Graph::with_index(CondensedPolicy::new(config.k)),
            folded: FnvHashSet::default(),
            reads: 0,
        })
    }

    pub fn graph(&self) -> &Graph<CondensedPolicy> {
        &self.graph
    }

    pub fn into_graph(self) -> Graph<CondensedPolicy> {
        info!(
            "threaded {} reads into {} vertices and {} edges",
            self.reads,
            self.graph.vertex_count(),
            self.graph.edge_count()
        );
        self.graph
    }

    pub fn thread_reads<I, R>(&mut self, reads: I) -> Result<()>
    where
        I: IntoIterator<Item = R>,
        R: AsRef<[u8]>,
    {
        for read in reads {
            self.thread_read(read.as_ref())?;
        }
        Ok(())
    }

    /// Thread one read. Bases other than ACGT split the read into
    /// chunks that are threaded separately; chunks shorter than k are
    /// ignored.
    pub fn thread_read(&mut self, read: &[u8]) -> Result<()> {
        let k = self.graph.k();
        for chunk in dna::acgt_runs(read, k) {
            self.thread_chunk(&chunk)?;
        }
        self.reads += 1;
        Ok(())
    }

    /// The position of `kmer`, adding a vertex for it if it hasn't
    /// been seen yet.
    fn position_or_insert(&mut self, kmer: &Kmer) -> Result<(VertexId, usize)> {
        if kmer_index(&self.graph)?.contains(kmer) {
            return vertex_position(&self.graph, kmer);
        }
        let data = self.graph.policy().vertex_data(&kmer.to_bytes())?;
        let v = self.graph.add_vertex(data)?;
        trace!("new vertex {} for {}", v, kmer);
        vertex_position(&self.graph, kmer)
    }

    fn thread_chunk(&mut self, seq: &[u8]) -> Result<()> {
        let k = self.graph.k();
        let mut kmer = Kmer::from_prefix(seq, k)?;
        self.position_or_insert(&kmer)?;

        for &base in seq[k..].iter() {
            let prev = kmer.clone();
            kmer.shift_append(base)?;
            self.thread_step(&prev, &kmer)?;
        }
        Ok(())
    }

    fn thread_step(&mut self, prev: &Kmer, curr: &Kmer) -> Result<()> {
        let k = self.graph.k();
        let (prev_v, prev_offset) = self.position_or_insert(prev)?;
        let (curr_v, curr_offset) = self.position_or_insert(curr)?;

        if self.graph.is_last_kmer(prev_v, prev_offset)?
            && self.graph.is_first_kmer(curr_v, curr_offset)?
            && self.graph.is_merge_possible(prev_v, curr_v)?
        {
            trace!("{} -> {}: merging {} and {}", prev, curr, prev_v, curr_v);
            let fold = curr_v == self.graph.conjugate_vertex(prev_v)?;
            let merged = self.graph.merge_vertices(prev_v, curr_v)?;
            if fold {
                self.remember_fold(merged)?;
            }
            return Ok(());
        }

        if self.is_threaded(prev, curr)? {
            return Ok(());
        }

        debug!("{} -> {}: branch between {} and {}", prev, curr, prev_v, curr_v);
        // make prev the last k-mer of its vertex
        let mut from = match self.graph.split_vertex_parts(prev_v, prev_offset + k)? {
            Some((first, _)) => first,
            None => prev_v,
        };

        // make curr the first k-mer of its vertex, by cutting the
        // conjugate right after the complement of curr
        let (curr_v, curr_offset) = vertex_position(&self.graph, curr)?;
        let curr_len = self.graph.vertex_length(curr_v)?;
        let curr_conj = self.graph.conjugate_vertex(curr_v)?;
        let to = match self
            .graph
            .split_vertex_parts(curr_conj, curr_len - curr_offset)?
        {
            Some((head, tail)) => {
                // prev ends whichever part of the old pair covers the
                // end of its vertex
                let head_conj = self.graph.conjugate_vertex(head)?;
                if from == curr_conj {
                    from = tail;
                } else if from == curr_v {
                    from = head_conj;
                }
                head_conj
            }
            None => curr_v,
        };
        self.graph.link_vertices(from, to)?;
        Ok(())
    }

    /// Record the k-mers a fold left on both strands of `v`.
    fn remember_fold(&mut self, v: VertexId) -> Result<()> {
        let k = self.graph.k();
        let kmers = match self.graph.vertex_sequence(v)? {
            Some(seq) => Kmer::windows(seq, k)
                .map(|(_, kmer)| kmer)
                .collect::<FnvHashSet<_>>(),
            None => return Ok(()),
        };
        for kmer in kmers.iter() {
            let rc = kmer.rev_comp();
            if rc != *kmer && kmers.contains(&rc) {
                self.folded.insert(kmer.clone());
            }
        }
        debug!("fold into {} stores {} k-mers twice", v, self.folded.len());
        Ok(())
    }

    /// Whether `curr` already follows `prev` somewhere in the graph,
    /// on either strand.
    fn is_threaded(&self, prev: &Kmer, curr: &Kmer) -> Result<bool> {
        let rc_prev = prev.rev_comp();
        let rc_curr = curr.rev_comp();
        for &(a, b) in [(prev, curr), (&rc_curr, &rc_prev)].iter() {
            if self.any_adjacent(&self.candidates(a)?, &self.candidates(b)?)? {
                return Ok(true);
            }
        }
        if self.folded.contains(prev) || self.folded.contains(curr) {
            return self.any_adjacent(&self.occurrences(prev)?, &self.occurrences(curr)?);
        }
        Ok(false)
    }

    /// The indexed position of `kmer`, and the one mirrored from the
    /// indexed position of its reverse complement.
    fn candidates(&self, kmer: &Kmer) -> Result<Vec<(VertexId, usize)>> {
        let k = self.graph.k();
        let mut found = vec![vertex_position(&self.graph, kmer)?];
        let (v, offset) = vertex_position(&self.graph, &kmer.rev_comp())?;
        let mirrored = (
            self.graph.conjugate_vertex(v)?,
            self.graph.vertex_length(v)? - k - offset,
        );
        if !found.contains(&mirrored) {
            found.push(mirrored);
        }
        Ok(found)
    }

    /// Every position of `kmer` in the graph.
    fn occurrences(&self, kmer: &Kmer) -> Result<Vec<(VertexId, usize)>> {
        let k = self.graph.k();
        let mut found = Vec::new();
        for v in self.graph.vertices() {
            if let Some(seq) = self.graph.vertex_sequence(v)? {
                found.extend(
                    Kmer::windows(seq, k)
                        .filter(|(_, window)| window == kmer)
                        .map(|(offset, _)| (v, offset)),
                );
            }
        }
        Ok(found)
    }

    fn any_adjacent(
        &self,
        prevs: &[(VertexId, usize)],
        currs: &[(VertexId, usize)],
    ) -> Result<bool> {
        for &(prev_v, prev_offset) in prevs {
            for &(curr_v, curr_offset) in currs {
                if prev_v == curr_v && prev_offset + 1 == curr_offset {
                    return Ok(true);
                }
                if self.graph.is_last_kmer(prev_v, prev_offset)?
                    && self.graph.is_first_kmer(curr_v, curr_offset)?
                    && !self.graph.edges_between(prev_v, curr_v)?.is_empty()
                {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::validate::validate;

    fn construct(k: usize, reads: &[&str]) -> Graph<CondensedPolicy> {
        let mut constructor =
            IncrementalConstructor::new(&GraphConfig::new(k)).unwrap();
        constructor.thread_reads(reads.iter().map(|r| r.as_bytes())).unwrap();
        constructor.into_graph()
    }

    #[test]
    fn unbranched_read_is_one_vertex() {
        let graph = construct(3, &["ACCGTA"]);
        assert_eq!(graph.vertex_count(), 2);
        assert_eq!(graph.edge_count(), 0);

        let cgt = Kmer::from_slice(b"CGT").unwrap();
        let (v, offset) = vertex_position(&graph, &cgt).unwrap();
        assert_eq!(graph.vertex_str(v).unwrap(), "ACCGTA");
        assert_eq!(offset, 2);
        validate(&graph).unwrap();
    }

    #[test]
    fn self_complementary_read_is_one_vertex() {
        let mut constructor =
            IncrementalConstructor::new(&GraphConfig::new(3)).unwrap();
        constructor.thread_read(b"ACGTAC").unwrap();
        let graph = constructor.graph();
        assert_eq!(graph.vertex_count(), 2);
        assert_eq!(graph.edge_count(), 0);

        let cgt = Kmer::from_slice(b"CGT").unwrap();
        let (v, offset) = vertex_position(graph, &cgt).unwrap();
        assert_eq!(graph.vertex_str(v).unwrap(), "ACGTAC");
        assert_eq!(offset, 1);
        let conj = graph.conjugate_vertex(v).unwrap();
        assert_eq!(graph.vertex_str(conj).unwrap(), "GTACGT");
        assert_eq!(constructor.folded.len(), 4);
        validate(graph).unwrap();

        constructor.thread_read(b"ACGTAC").unwrap();
        assert_eq!(constructor.graph().vertex_count(), 2);
        assert_eq!(constructor.graph().edge_count(), 0);
    }

    #[test]
    fn single_kmer_chunks_are_kept() {
        let graph = construct(3, &["ACCNNAAC", "GA"]);
        // ACC and AAC, the short read contributes nothing
        assert_eq!(graph.vertex_count(), 4);
        validate(&graph).unwrap();
    }
}
