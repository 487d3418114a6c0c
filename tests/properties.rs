use condensedgraph::{
    construction::{CondenseConstructor, IncrementalConstructor},
    graph::Graph,
    kmer::Kmer,
    origin::KmerTable,
    policy::CondensedPolicy,
    util::{dna, validate::validate},
    GraphConfig, VertexId,
};

use fnv::FnvHashSet;
use quickcheck::{Arbitrary, Gen, QuickCheck};

use std::collections::BTreeSet;

/// A handful of short reads over ACGT, with the occasional N, and an
/// odd k to cut them with.
#[derive(Debug, Clone)]
struct Reads {
    k: usize,
    reads: Vec<Vec<u8>>,
}

impl Arbitrary for Reads {
    fn arbitrary<G: Gen>(g: &mut G) -> Reads {
        let k = [3, 5, 7][usize::arbitrary(g) % 3];
        let count = 1 + usize::arbitrary(g) % 4;
        let bases = b"ACGTACGTACGTN";
        let reads = (0..count)
            .map(|_| {
                let len = usize::arbitrary(g) % 26;
                (0..len)
                    .map(|_| bases[usize::arbitrary(g) % bases.len()])
                    .collect::<Vec<u8>>()
            })
            .collect();
        Reads { k, reads }
    }
}

impl Reads {
    fn config(&self) -> GraphConfig {
        GraphConfig::new(self.k)
    }

    fn chunks(&self) -> Vec<Vec<u8>> {
        self.reads
            .iter()
            .flat_map(|read| dna::acgt_runs(read, self.k))
            .collect()
    }

    /// Every k-mer of the reads and its reverse complement.
    fn kmers(&self) -> FnvHashSet<Kmer> {
        let mut kmers = FnvHashSet::default();
        for read in self.reads.iter() {
            for (_, kmer) in Kmer::windows(read, self.k) {
                kmers.insert(kmer.rev_comp());
                kmers.insert(kmer);
            }
        }
        kmers
    }
}

fn thread(input: &Reads) -> IncrementalConstructor {
    let mut constructor = IncrementalConstructor::new(&input.config()).unwrap();
    constructor.thread_reads(input.reads.iter()).unwrap();
    constructor
}

fn canonical(seq: &[u8]) -> Vec<u8> {
    let rc = dna::rev_comp(seq);
    std::cmp::min(rc, seq.to_vec())
}

/// Vertex sequences and links, each conjugate pair written the same
/// way.
fn signature(graph: &Graph<CondensedPolicy>) -> (BTreeSet<Vec<u8>>, BTreeSet<(String, String)>) {
    let vertices = graph
        .vertices()
        .map(|v| canonical(graph.vertex_sequence(v).unwrap().unwrap()))
        .collect();
    let link = |e| {
        (
            graph.vertex_str(graph.edge_start(e).unwrap()).unwrap(),
            graph.vertex_str(graph.edge_end(e).unwrap()).unwrap(),
        )
    };
    let links = graph
        .edges()
        .map(|e| std::cmp::min(link(e), link(graph.conjugate_edge(e).unwrap())))
        .collect();
    (vertices, links)
}

/// Every k-mer of the reads is indexed, nothing else is, and conjugate
/// vertices hold reverse complement sequences.
fn indexes_every_kmer(graph: &Graph<CondensedPolicy>, kmers: &FnvHashSet<Kmer>) -> bool {
    let index = graph.kmer_index().unwrap();
    for v in graph.vertices() {
        let seq = graph.vertex_sequence(v).unwrap().unwrap();
        let conj = graph.conjugate_vertex(v).unwrap();
        let conj_seq = graph.vertex_sequence(conj).unwrap().unwrap();
        if dna::rev_comp(seq) != conj_seq {
            return false;
        }
    }
    validate(graph).is_ok()
        && index.len() == kmers.len()
        && kmers.iter().all(|kmer| index.contains(kmer))
}

/// Number of k-mer windows over all vertex sequences.
fn stored_kmers(graph: &Graph<CondensedPolicy>) -> usize {
    let k = graph.k();
    graph
        .vertices()
        .map(|v| graph.vertex_sequence(v).unwrap().unwrap().len() + 1 - k)
        .sum()
}

/// Every vertex and offset holding `kmer`.
fn occurrences(graph: &Graph<CondensedPolicy>, kmer: &Kmer) -> Vec<(VertexId, usize)> {
    let k = graph.k();
    let mut found = Vec::new();
    for v in graph.vertices() {
        let seq = graph.vertex_sequence(v).unwrap().unwrap();
        for (offset, window) in Kmer::windows(seq, k) {
            if &window == kmer {
                found.push((v, offset));
            }
        }
    }
    found
}

fn threading_keeps_index_consistent(input: Reads) -> bool {
    let constructor = thread(&input);
    let graph = constructor.graph();
    let kmers = input.kmers();
    // folded reads keep some k-mers on both strands of a vertex
    indexes_every_kmer(graph, &kmers) && stored_kmers(graph) >= kmers.len()
}

/// Consecutive k-mers of a read end up consecutive in a vertex, or at
/// the end and start of two linked vertices.
fn threading_follows_reads(input: Reads) -> bool {
    let constructor = thread(&input);
    let graph = constructor.graph();
    let k = input.k;

    for chunk in input.chunks() {
        let kmers = Kmer::windows(&chunk, k).map(|(_, kmer)| kmer).collect::<Vec<_>>();
        for pair in kmers.windows(2) {
            let prevs = occurrences(graph, &pair[0]);
            let currs = occurrences(graph, &pair[1]);
            let follows = prevs.iter().any(|&(pv, prev_offset)| {
                currs.iter().any(|&(cv, curr_offset)| {
                    let consecutive = pv == cv && prev_offset + 1 == curr_offset;
                    let linked = prev_offset + k == graph.vertex_length(pv).unwrap()
                        && curr_offset == 0
                        && !graph.edges_between(pv, cv).unwrap().is_empty();
                    consecutive || linked
                })
            });
            if !follows {
                return false;
            }
        }
    }
    true
}

fn threading_is_idempotent(input: Reads) -> bool {
    let mut constructor = thread(&input);
    let before = signature(constructor.graph());
    let vertices = constructor.graph().vertex_count();
    let edges = constructor.graph().edge_count();
    let indexed = constructor.graph().kmer_index().unwrap().len();

    constructor.thread_reads(input.reads.iter()).unwrap();
    let graph = constructor.graph();
    signature(graph) == before
        && graph.vertex_count() == vertices
        && graph.edge_count() == edges
        && graph.kmer_index().unwrap().len() == indexed
}

fn condensation_is_complete(input: Reads) -> bool {
    let table = KmerTable::from_reads(&input.reads[..], &input.config()).unwrap();
    let graph = CondenseConstructor::new(&table).construct().unwrap();
    let kmers = input.kmers();
    table.len() == kmers.len()
        && indexes_every_kmer(&graph, &kmers)
        && stored_kmers(&graph) == kmers.len()
}

/// No vertex could still be merged with its only successor.
fn condensation_is_maximal(input: Reads) -> bool {
    let table = KmerTable::from_reads(&input.reads[..], &input.config()).unwrap();
    let graph = CondenseConstructor::new(&table).construct().unwrap();
    let maximal = graph.vertices().all(|v| {
        let conj = graph.conjugate_vertex(v).unwrap();
        let e = match graph.unique_outgoing_edge(v).unwrap() {
            Some(e) => e,
            None => return true,
        };
        let w = graph.edge_end(e).unwrap();
        let w_conj = graph.conjugate_vertex(w).unwrap();
        if w == v || w == conj || conj == v || w_conj == w {
            return true;
        }
        graph.incoming_count(w).unwrap() > 1
    });
    maximal
}

#[test]
fn threaded_index_is_consistent() {
    QuickCheck::new()
        .tests(300)
        .quickcheck(threading_keeps_index_consistent as fn(Reads) -> bool);
}

#[test]
fn threaded_graph_follows_reads() {
    QuickCheck::new()
        .tests(300)
        .quickcheck(threading_follows_reads as fn(Reads) -> bool);
}

#[test]
fn threading_twice_is_a_no_op() {
    QuickCheck::new()
        .tests(300)
        .quickcheck(threading_is_idempotent as fn(Reads) -> bool);
}

#[test]
fn condensed_graph_holds_every_kmer() {
    QuickCheck::new()
        .tests(300)
        .quickcheck(condensation_is_complete as fn(Reads) -> bool);
}

#[test]
fn condensed_graph_is_maximal() {
    QuickCheck::new()
        .tests(300)
        .quickcheck(condensation_is_maximal as fn(Reads) -> bool);
}
