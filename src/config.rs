use serde::{Deserialize, Serialize};

use crate::error::{GraphError, Result};

#[allow(unused_imports)]
use log::{debug, error, info, trace, warn};

/// Parameters shared by the graph constructors.
///
/// Missing fields fall back to their defaults when deserializing, so a
/// document that only sets `k` is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Length of the k-mers the graph is built over.
    pub k: usize,
    /// K-mers seen fewer times than this across all reads (counting
    /// both strands) are dropped by
    /// [`KmerTable`](crate::origin::KmerTable).
    pub min_kmer_count: usize,
}

impl Default for GraphConfig {
    fn default() -> GraphConfig {
        GraphConfig {
            k: 21,
            min_kmer_count: 1,
        }
    }
}

impl GraphConfig {
    pub fn new(k: usize) -> GraphConfig {
        GraphConfig {
            k,
            ..Default::default()
        }
    }

    pub fn with_k(mut self, k: usize) -> GraphConfig {
        self.k = k;
        self
    }

    pub fn with_min_kmer_count(mut self, min_kmer_count: usize) -> Self {
        self.min_kmer_count = min_kmer_count;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.k == 0 {
            return Err(GraphError::InvalidConfig(
                "k must be at least 1".to_string(),
            ));
        }
        if self.min_kmer_count == 0 {
            return Err(GraphError::InvalidConfig(
                "min_kmer_count must be at least 1".to_string(),
            ));
        }
        if self.k % 2 == 0 {
            warn!(
                "k = {} is even, palindromic k-mers will become single k-mer vertices",
                self.k
            );
        }
        Ok(())
    }
}
