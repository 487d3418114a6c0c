/*!
Uncondensed de Bruijn graphs, the input of the batch condenser.

The condenser only needs to enumerate k-mers and ask for the
neighbors of each, which is what [`KmerAdjacency`] describes.
[`KmerTable`] is a plain hash-set implementation built from reads.
*/

use fnv::{FnvHashMap, FnvHashSet};
use rayon::prelude::*;

use crate::config::GraphConfig;
use crate::error::Result;
use crate::kmer::Kmer;

#[allow(unused_imports)]
use log::{debug, error, info, trace, warn};

const BASES: &[u8; 4] = b"ACGT";

/// Read access to the k-mers of an uncondensed, double-stranded de
/// Bruijn graph. Implementations must contain the reverse complement
/// of every k-mer they contain.
pub trait KmerAdjacency {
    fn k(&self) -> usize;

    fn kmers(&self) -> Box<dyn Iterator<Item = Kmer> + '_>;

    fn contains(&self, kmer: &Kmer) -> bool;

    /// K-mers that follow `kmer`, i.e. overlap its last `k - 1`
    /// bases.
    fn successors(&self, kmer: &Kmer) -> Box<dyn Iterator<Item = Kmer> + '_>;

    /// K-mers that precede `kmer`, i.e. overlap its first `k - 1`
    /// bases.
    fn predecessors(&self, kmer: &Kmer) -> Box<dyn Iterator<Item = Kmer> + '_>;

    fn next_count(&self, kmer: &Kmer) -> usize {
        self.successors(kmer).count()
    }

    fn prev_count(&self, kmer: &Kmer) -> usize {
        self.predecessors(kmer).count()
    }
}

/// K-mer counts of a read set, over both strands.
#[derive(Debug, Clone)]
pub struct KmerTable {
    k: usize,
    counts: FnvHashMap<Kmer, usize>,
    sorted: Vec<Kmer>,
}

impl KmerTable {
    /// Count the k-mers of `reads` and their reverse complements in
    /// parallel, keeping those seen at least
    /// `config.min_kmer_count` times.
    pub fn from_reads<R>(reads: &[R], config: &GraphConfig) -> Result<KmerTable>
    where
        R: AsRef<[u8]> + Sync,
    {
        config.validate()?;
        let k = config.k;

        let counts = reads
            .par_iter()
            .fold(FnvHashMap::<Kmer, usize>::default, |mut counts, read| {
                for (_, kmer) in Kmer::windows(read.as_ref(), k) {
                    let rc = kmer.rev_comp();
                    // a palindrome is its own reverse complement
                    if rc != kmer {
                        *counts.entry(rc).or_insert(0) += 1;
                    }
                    *counts.entry(kmer).or_insert(0) += 1;
                }
                counts
            })
            .reduce(FnvHashMap::<Kmer, usize>::default, |mut left, right| {
                for (kmer, count) in right {
                    *left.entry(kmer).or_insert(0) += count;
                }
                left
            });

        let total = counts.len();
        let counts: FnvHashMap<Kmer, usize> = counts
            .into_iter()
            .filter(|(_, count)| *count >= config.min_kmer_count)
            .collect();
        if counts.len() < total {
            debug!(
                "dropped {} k-mers seen fewer than {} times",
                total - counts.len(),
                config.min_kmer_count
            );
        }

        Ok(KmerTable::from_counts(k, counts))
    }

    /// Table over the given k-mers and their reverse complements,
    /// each counted once.
    pub fn from_kmers<I>(k: usize, kmers: I) -> KmerTable
    where
        I: IntoIterator<Item = Kmer>,
    {
        let mut counts: FnvHashMap<Kmer, usize> = FnvHashMap::default();
        for kmer in kmers {
            if kmer.len() != k {
                warn!("skipping {} which is not a {}-mer", kmer, k);
                continue;
            }
            counts.insert(kmer.rev_comp(), 1);
            counts.insert(kmer, 1);
        }
        KmerTable::from_counts(k, counts)
    }

    fn from_counts(k: usize, counts: FnvHashMap<Kmer, usize>) -> KmerTable {
        let mut sorted = counts.keys().cloned().collect::<Vec<_>>();
        sorted.par_sort();
        info!("k-mer table holds {} {}-mers", sorted.len(), k);
        KmerTable { k, counts, sorted }
    }

    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }

    /// How often `kmer` occurred in the reads, 0 if it was dropped.
    pub fn count(&self, kmer: &Kmer) -> usize {
        self.counts.get(kmer).copied().unwrap_or(0)
    }

    /// The distinct canonical k-mers, i.e. the smaller of each k-mer
    /// and its reverse complement.
    pub fn canonical_kmers(&self) -> FnvHashSet<Kmer> {
        self.sorted
            .iter()
            .map(|kmer| {
                let rc = kmer.rev_comp();
                if rc < *kmer {
                    rc
                } else {
                    kmer.clone()
                }
            })
            .collect()
    }
}

impl KmerAdjacency for KmerTable {
    fn k(&self) -> usize {
        self.k
    }

    fn kmers(&self) -> Box<dyn Iterator<Item = Kmer> + '_> {
        Box::new(self.sorted.iter().cloned())
    }

    fn contains(&self, kmer: &Kmer) -> bool {
        self.counts.contains_key(kmer)
    }

    fn successors(&self, kmer: &Kmer) -> Box<dyn Iterator<Item = Kmer> + '_> {
        let kmer = kmer.clone();
        Box::new(
            BASES
                .iter()
                .filter_map(move |&b| kmer.successor(b).ok())
                .filter(move |next| self.contains(next)),
        )
    }

    fn predecessors(&self, kmer: &Kmer) -> Box<dyn Iterator<Item = Kmer> + '_> {
        let kmer = kmer.clone();
        Box::new(
            BASES
                .iter()
                .filter_map(move |&b| kmer.predecessor(b).ok())
                .filter(move |prev| self.contains(prev)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kmer(s: &str) -> Kmer {
        Kmer::from_slice(s.as_bytes()).unwrap()
    }

    #[test]
    fn counts_both_strands() {
        let reads = vec![b"ACCGT".to_vec(), b"ACGGT".to_vec()];
        let table = KmerTable::from_reads(&reads, &GraphConfig::new(3)).unwrap();
        // ACC CCG CGT and their complements GGT CGG ACG
        assert_eq!(table.len(), 6);
        assert_eq!(table.count(&kmer("ACC")), 2);
        assert_eq!(table.count(&kmer("CGT")), 2);
        assert_eq!(table.canonical_kmers().len(), 3);

        let strict = KmerTable::from_reads(
            &reads,
            &GraphConfig::new(3).with_min_kmer_count(3),
        )
        .unwrap();
        assert!(strict.is_empty());
    }

    #[test]
    fn palindromes_count_once() {
        let reads = vec![&b"ACGTT"[..]];
        let table = KmerTable::from_reads(&reads, &GraphConfig::new(4)).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.count(&kmer("ACGT")), 1);
        assert_eq!(table.count(&kmer("AACG")), 1);

        let strict = KmerTable::from_reads(
            &reads,
            &GraphConfig::new(4).with_min_kmer_count(2),
        )
        .unwrap();
        assert!(strict.is_empty());
    }

    #[test]
    fn adjacency_lists_extensions() {
        let table = KmerTable::from_kmers(
            3,
            vec![kmer("ACC"), kmer("CCG"), kmer("CCT")],
        );
        let next = table.successors(&kmer("ACC")).collect::<Vec<_>>();
        assert_eq!(next, vec![kmer("CCG"), kmer("CCT")]);
        assert_eq!(table.next_count(&kmer("ACC")), 2);
        assert_eq!(table.prev_count(&kmer("CCG")), 1);
        assert_eq!(table.prev_count(&kmer("ACC")), 0);
        // complement strand: CGG and AGG both precede GGT
        assert_eq!(table.prev_count(&kmer("GGT")), 2);
    }

    #[test]
    fn rejects_bad_config() {
        let reads = vec![&b"ACGT"[..]];
        assert!(KmerTable::from_reads(&reads, &GraphConfig::new(0)).is_err());
    }
}
