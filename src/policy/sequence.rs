use bstr::ByteSlice;

use crate::error::{GraphError, Result};
use crate::util::dna;

use super::DataPolicy;

/// Sequence and k-mer coverage carried by an edge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct EdgeSequence {
    pub nucls: Vec<u8>,
    pub coverage: u64,
}

impl EdgeSequence {
    pub fn new(nucls: &[u8], coverage: u64) -> EdgeSequence {
        EdgeSequence {
            nucls: nucls.to_ascii_uppercase(),
            coverage,
        }
    }
}

/// Edges own nucleotide sequences of at least `k` bases; vertices are
/// the `k - 1` base junctions between them and carry no data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeSequencePolicy {
    k: usize,
}

impl EdgeSequencePolicy {
    pub fn new(k: usize) -> EdgeSequencePolicy {
        EdgeSequencePolicy { k }
    }

    /// Bases shared by adjacent edges.
    fn overlap(&self) -> Result<usize> {
        self.k
            .checked_sub(1)
            .ok_or_else(|| GraphError::InvalidConfig("k must be positive".to_string()))
    }

    fn kmer_count(&self, data: &EdgeSequence) -> usize {
        (data.nucls.len() + 1).saturating_sub(self.k)
    }
}

impl DataPolicy for EdgeSequencePolicy {
    type VertexData = ();
    type EdgeData = EdgeSequence;

    fn k(&self) -> usize {
        self.k
    }

    fn conjugate_vertex_data(&self, _data: &()) {}

    fn conjugate_edge_data(&self, data: &EdgeSequence) -> EdgeSequence {
        EdgeSequence {
            nucls: dna::rev_comp(&data.nucls),
            coverage: data.coverage,
        }
    }

    fn validate_edge_data(&self, data: &EdgeSequence) -> Result<()> {
        if data.nucls.len() < self.k {
            return Err(GraphError::InvariantViolation(format!(
                "edge sequence of length {} is shorter than k = {}",
                data.nucls.len(),
                self.k
            )));
        }
        match data.nucls.iter().position(|&b| !dna::is_nucleotide(b)) {
            Some(position) => Err(GraphError::InvalidNucleotide {
                byte: data.nucls[position] as char,
                position,
            }),
            None => Ok(()),
        }
    }

    fn is_self_conjugate_edge(&self, data: &EdgeSequence) -> bool {
        dna::is_palindrome(&data.nucls)
    }

    fn edge_nucls<'a>(&self, data: &'a EdgeSequence) -> Option<&'a [u8]> {
        Some(data.nucls.as_slice())
    }

    fn vertex_length(&self, _data: &()) -> usize {
        self.k.saturating_sub(1)
    }

    fn edge_length(&self, data: &EdgeSequence) -> usize {
        data.nucls.len()
    }

    fn merge_data(&self, to_merge: &[&EdgeSequence]) -> Result<EdgeSequence> {
        let overlap = self.overlap()?;
        let (first, rest) = to_merge.split_first().ok_or_else(|| {
            GraphError::InvalidPath("nothing to merge".to_string())
        })?;
        if first.nucls.len() < self.k {
            return Err(GraphError::InvariantViolation(format!(
                "edge {} is shorter than k = {}",
                self.edge_str(first),
                self.k
            )));
        }

        let mut merged = (*first).clone();
        for next in rest {
            let tail = &merged.nucls[merged.nucls.len() - overlap..];
            if next.nucls.len() < self.k || tail != &next.nucls[..overlap] {
                return Err(GraphError::InvariantViolation(format!(
                    "{} does not continue {} with a {} base overlap",
                    self.edge_str(next),
                    self.edge_str(&merged),
                    overlap
                )));
            }
            merged.nucls.extend_from_slice(&next.nucls[overlap..]);
            merged.coverage += next.coverage;
        }
        Ok(merged)
    }

    fn split_data(
        &self,
        data: &EdgeSequence,
        position: usize,
    ) -> Result<((), EdgeSequence, EdgeSequence)> {
        let kmers = self.kmer_count(data);
        if position == 0 || position >= kmers {
            return Err(GraphError::InvariantViolation(format!(
                "cannot split an edge of {} k-mers after {} of them",
                kmers, position
            )));
        }
        let first_coverage =
            ((data.coverage as u128 * position as u128) / kmers as u128) as u64;
        let first = EdgeSequence {
            nucls: data.nucls[..position + self.k - 1].to_vec(),
            coverage: first_coverage,
        };
        let second = EdgeSequence {
            nucls: data.nucls[position..].to_vec(),
            coverage: data.coverage - first_coverage,
        };
        Ok(((), first, second))
    }

    fn glue_data(
        &self,
        first: &EdgeSequence,
        second: &EdgeSequence,
    ) -> EdgeSequence {
        EdgeSequence {
            nucls: second.nucls.clone(),
            coverage: first.coverage + second.coverage,
        }
    }

    fn vertex_str(&self, _data: &()) -> String {
        String::new()
    }

    fn edge_str(&self, data: &EdgeSequence) -> String {
        data.nucls.as_bstr().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(s: &str, coverage: u64) -> EdgeSequence {
        EdgeSequence::new(s.as_bytes(), coverage)
    }

    #[test]
    fn merge_overlapping_edges() {
        let policy = EdgeSequencePolicy::new(3);
        let a = seq("ACGTT", 3);
        let b = seq("TTGCA", 2);
        let c = seq("CAA", 1);
        let merged = policy.merge_data(&[&a, &b, &c]).unwrap();
        assert_eq!(merged.nucls, b"ACGTTGCAA".to_vec());
        assert_eq!(merged.coverage, 6);
        assert_eq!(merged.nucls.len(), 5 + 5 + 3 - 2 * 2);

        assert!(policy.merge_data(&[&a, &c]).is_err());
        assert!(policy.merge_data(&[]).is_err());
    }

    #[test]
    fn split_then_merge_restores_sequence() {
        let policy = EdgeSequencePolicy::new(3);
        let edge = seq("ACGTTGCA", 12);
        for position in 1..6 {
            let ((), first, second) = policy.split_data(&edge, position).unwrap();
            assert_eq!(first.nucls.len() + 1 - 3, position);
            assert_eq!(first.coverage + second.coverage, 12);
            let merged = policy.merge_data(&[&first, &second]).unwrap();
            assert_eq!(merged, edge);
        }
        assert!(policy.split_data(&edge, 0).is_err());
        assert!(policy.split_data(&edge, 6).is_err());
    }

    #[test]
    fn conjugate_reverses_sequence() {
        let policy = EdgeSequencePolicy::new(3);
        let edge = seq("AACG", 4);
        let conj = policy.conjugate_edge_data(&edge);
        assert_eq!(conj.nucls, b"CGTT".to_vec());
        assert_eq!(conj.coverage, 4);
        assert!(policy.is_self_conjugate_edge(&seq("ACGT", 1)));
        assert!(!policy.is_self_conjugate_edge(&edge));
    }

    #[test]
    fn zero_k_is_rejected() {
        let policy = EdgeSequencePolicy::new(0);
        let a = seq("ACG", 1);
        assert!(matches!(
            policy.merge_data(&[&a, &a]),
            Err(GraphError::InvalidConfig(_))
        ));
    }
}
