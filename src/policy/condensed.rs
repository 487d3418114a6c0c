use bstr::ByteSlice;

use crate::error::{GraphError, Result};
use crate::util::dna;

use super::{DataPolicy, VertexSequencePolicy};

/// Payload of an edge in a vertex-sequence graph. The `k - 1` base
/// overlap it stands for is implied by its endpoints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Link;

/// Vertices own uppercase nucleotide sequences of at least `k` bases,
/// edges are [`Link`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CondensedPolicy {
    k: usize,
}

impl CondensedPolicy {
    pub fn new(k: usize) -> CondensedPolicy {
        CondensedPolicy { k }
    }

    /// Bases shared by adjacent vertices.
    fn overlap(&self) -> Result<usize> {
        self.k
            .checked_sub(1)
            .ok_or_else(|| GraphError::InvalidConfig("k must be positive".to_string()))
    }

    fn check_sequence(&self, seq: &[u8]) -> Result<()> {
        self.overlap()?;
        if seq.len() < self.k {
            return Err(GraphError::InvariantViolation(format!(
                "vertex sequence of length {} is shorter than k = {}",
                seq.len(),
                self.k
            )));
        }
        if let Some(position) = seq.iter().position(|&b| !dna::is_nucleotide(b))
        {
            return Err(GraphError::InvalidNucleotide {
                byte: seq[position] as char,
                position,
            });
        }
        Ok(())
    }
}

impl DataPolicy for CondensedPolicy {
    type VertexData = Vec<u8>;
    type EdgeData = Link;

    fn k(&self) -> usize {
        self.k
    }

    fn conjugate_vertex_data(&self, data: &Vec<u8>) -> Vec<u8> {
        dna::rev_comp(data)
    }

    fn conjugate_edge_data(&self, _data: &Link) -> Link {
        Link
    }

    fn validate_vertex_data(&self, data: &Vec<u8>) -> Result<()> {
        self.check_sequence(data)
    }

    fn is_self_conjugate_vertex(&self, data: &Vec<u8>) -> bool {
        dna::is_palindrome(data)
    }

    fn is_self_conjugate_edge(&self, _data: &Link) -> bool {
        true
    }

    fn vertex_nucls<'a>(&self, data: &'a Vec<u8>) -> Option<&'a [u8]> {
        Some(data.as_slice())
    }

    fn vertex_length(&self, data: &Vec<u8>) -> usize {
        data.len()
    }

    fn edge_length(&self, _data: &Link) -> usize {
        0
    }

    fn merge_data(&self, to_merge: &[&Link]) -> Result<Link> {
        if to_merge.len() == 1 {
            Ok(Link)
        } else {
            Err(GraphError::InvariantViolation(
                "links carry no sequence to merge, merge the vertices instead"
                    .to_string(),
            ))
        }
    }

    fn split_data(
        &self,
        _data: &Link,
        _position: usize,
    ) -> Result<(Vec<u8>, Link, Link)> {
        Err(GraphError::InvariantViolation(
            "links carry no sequence to split".to_string(),
        ))
    }

    fn glue_data(&self, _first: &Link, _second: &Link) -> Link {
        Link
    }

    fn vertex_str(&self, data: &Vec<u8>) -> String {
        data.as_bstr().to_string()
    }

    fn edge_str(&self, _data: &Link) -> String {
        format!("{}M", self.k.saturating_sub(1))
    }
}

impl VertexSequencePolicy for CondensedPolicy {
    fn vertex_data(&self, nucls: &[u8]) -> Result<Vec<u8>> {
        self.check_sequence(nucls)?;
        Ok(nucls.to_ascii_uppercase())
    }

    fn merge_vertex_data(&self, left: &Vec<u8>, right: &Vec<u8>) -> Result<Vec<u8>> {
        let overlap = self.overlap()?;
        if left.len() < self.k || right.len() < self.k {
            return Err(GraphError::InvariantViolation(format!(
                "cannot merge vertices of lengths {} and {} with k = {}",
                left.len(),
                right.len(),
                self.k
            )));
        }
        if left[left.len() - overlap..] != right[..overlap] {
            return Err(GraphError::InvariantViolation(format!(
                "{} and {} do not overlap by {} bases",
                self.vertex_str(left),
                self.vertex_str(right),
                overlap
            )));
        }
        let mut merged = Vec::with_capacity(left.len() + right.len() - overlap);
        merged.extend_from_slice(left);
        merged.extend_from_slice(&right[overlap..]);
        Ok(merged)
    }

    fn split_vertex_data(
        &self,
        data: &Vec<u8>,
        position: usize,
    ) -> Result<(Vec<u8>, Vec<u8>)> {
        if position < self.k || position >= data.len() {
            return Err(GraphError::InvariantViolation(format!(
                "cannot split vertex of length {} at {} with k = {}",
                data.len(),
                position,
                self.k
            )));
        }
        let first = data[..position].to_vec();
        let second = data[position + 1 - self.k..].to_vec();
        Ok((first, second))
    }

    fn link_data(&self) -> Link {
        Link
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_requires_overlap() {
        let policy = CondensedPolicy::new(3);
        let merged = policy
            .merge_vertex_data(&b"ACGT".to_vec(), &b"GTAC".to_vec())
            .unwrap();
        assert_eq!(merged, b"ACGTAC".to_vec());
        assert!(policy
            .merge_vertex_data(&b"ACGT".to_vec(), &b"GAAC".to_vec())
            .is_err());
    }

    #[test]
    fn split_keeps_overlap() {
        let policy = CondensedPolicy::new(3);
        let (first, second) =
            policy.split_vertex_data(&b"ACCGTA".to_vec(), 4).unwrap();
        assert_eq!(first, b"ACCG".to_vec());
        assert_eq!(second, b"CGTA".to_vec());
        let merged = policy.merge_vertex_data(&first, &second).unwrap();
        assert_eq!(merged, b"ACCGTA".to_vec());

        assert!(policy.split_vertex_data(&b"ACCGTA".to_vec(), 2).is_err());
        assert!(policy.split_vertex_data(&b"ACCGTA".to_vec(), 6).is_err());
    }

    #[test]
    fn vertex_data_is_checked() {
        let policy = CondensedPolicy::new(3);
        assert_eq!(policy.vertex_data(b"acg").unwrap(), b"ACG".to_vec());
        assert!(policy.vertex_data(b"AC").is_err());
        assert_eq!(
            policy.vertex_data(b"ANG"),
            Err(GraphError::InvalidNucleotide {
                byte: 'N',
                position: 1
            })
        );
    }

    #[test]
    fn palindromes_are_self_conjugate() {
        let policy = CondensedPolicy::new(3);
        assert!(policy.is_self_conjugate_vertex(&b"ACGT".to_vec()));
        assert!(!policy.is_self_conjugate_vertex(&b"ACG".to_vec()));
        assert_eq!(policy.conjugate_vertex_data(&b"AAC".to_vec()), b"GTT".to_vec());
    }

    #[test]
    fn zero_k_is_rejected() {
        let policy = CondensedPolicy::new(0);
        assert!(matches!(
            policy.merge_vertex_data(&b"A".to_vec(), &b"C".to_vec()),
            Err(GraphError::InvalidConfig(_))
        ));
        assert!(policy.vertex_data(b"ACG").is_err());
    }
}
