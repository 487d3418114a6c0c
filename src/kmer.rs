/*!
Packed nucleotide windows of a fixed, runtime-chosen length.

A [`Kmer`] stores its bases with 2 bits each (A=0, C=1, G=2, T=3) in a
vector of `u64` words, 32 bases per word, base `i` in the bits `2 * (i %
32)` of word `i / 32`. Bits past the last base are always zero, which
keeps the derived equality and hashing bitwise.

`k` is a runtime value rather than a const generic parameter, so one
binary handles every k-mer size at the price of a heap allocation per
k-mer and a loop over the words on each shift. For the k ≤ 32 case this
is a single word.
*/

use std::fmt;

use crate::error::{GraphError, Result};
use crate::util::dna::{decode_base, encode_base};

const BASES_PER_WORD: usize = 32;

#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Kmer {
    k: usize,
    words: Vec<u64>,
}

impl Kmer {
    /// All-`A` k-mer of length `k`.
    fn zeroed(k: usize) -> Kmer {
        let n_words = (k + BASES_PER_WORD - 1) / BASES_PER_WORD;
        Kmer {
            k,
            words: vec![0; n_words.max(1)],
        }
    }

    /// Build a k-mer from every base of `seq`.
    pub fn from_slice(seq: &[u8]) -> Result<Kmer> {
        if seq.is_empty() {
            return Err(GraphError::InvariantViolation(
                "k-mers must contain at least one base".to_string(),
            ));
        }
        let mut kmer = Kmer::zeroed(seq.len());
        for (i, &b) in seq.iter().enumerate() {
            let code = encode_base(b).ok_or(GraphError::InvalidNucleotide {
                byte: b as char,
                position: i,
            })?;
            kmer.set_code(i, code);
        }
        Ok(kmer)
    }

    /// The k-mer made of the first `k` bases of `seq`.
    pub fn from_prefix(seq: &[u8], k: usize) -> Result<Kmer> {
        if seq.len() < k {
            return Err(GraphError::InvariantViolation(format!(
                "sequence of length {} has no {}-mer prefix",
                seq.len(),
                k
            )));
        }
        Kmer::from_slice(&seq[..k])
    }

    /// The k-mer made of the last `k` bases of `seq`.
    pub fn from_suffix(seq: &[u8], k: usize) -> Result<Kmer> {
        if seq.len() < k {
            return Err(GraphError::InvariantViolation(format!(
                "sequence of length {} has no {}-mer suffix",
                seq.len(),
                k
            )));
        }
        Kmer::from_slice(&seq[seq.len() - k..])
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.k
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.k == 0
    }

    #[inline]
    fn code(&self, i: usize) -> u64 {
        let word = self.words[i / BASES_PER_WORD];
        (word >> (2 * (i % BASES_PER_WORD))) & 3
    }

    #[inline]
    fn set_code(&mut self, i: usize, code: u64) {
        let shift = 2 * (i % BASES_PER_WORD);
        let word = &mut self.words[i / BASES_PER_WORD];
        *word = (*word & !(3 << shift)) | ((code & 3) << shift);
    }

    /// The base at `i`, as an uppercase ASCII byte.
    #[inline]
    pub fn base(&self, i: usize) -> u8 {
        decode_base(self.code(i))
    }

    #[inline]
    pub fn first(&self) -> u8 {
        self.base(0)
    }

    #[inline]
    pub fn last(&self) -> u8 {
        self.base(self.k - 1)
    }

    fn push_back_code(&mut self, code: u64) {
        let n = self.words.len();
        for w in 0..n {
            let carry = if w + 1 < n { self.words[w + 1] & 3 } else { 0 };
            self.words[w] = (self.words[w] >> 2) | (carry << 62);
        }
        self.set_code(self.k - 1, code);
    }

    fn push_front_code(&mut self, code: u64) {
        let n = self.words.len();
        for w in (0..n).rev() {
            let carry = if w > 0 { self.words[w - 1] >> 62 } else { 0 };
            self.words[w] = (self.words[w] << 2) | carry;
        }
        let used = self.k - BASES_PER_WORD * (n - 1);
        if used < BASES_PER_WORD {
            self.words[n - 1] &= (1u64 << (2 * used)) - 1;
        }
        self.set_code(0, code);
    }

    /// Drop the first base and append `base` at the end.
    pub fn shift_append(&mut self, base: u8) -> Result<()> {
        let code = encode_base(base).ok_or(GraphError::InvalidNucleotide {
            byte: base as char,
            position: self.k,
        })?;
        self.push_back_code(code);
        Ok(())
    }

    /// Drop the last base and prepend `base` at the start.
    pub fn shift_prepend(&mut self, base: u8) -> Result<()> {
        let code = encode_base(base).ok_or(GraphError::InvalidNucleotide {
            byte: base as char,
            position: 0,
        })?;
        self.push_front_code(code);
        Ok(())
    }

    /// The k-mer following this one when `base` is read next.
    pub fn successor(&self, base: u8) -> Result<Kmer> {
        let mut next = self.clone();
        next.shift_append(base)?;
        Ok(next)
    }

    /// The k-mer preceding this one when `base` comes before it.
    pub fn predecessor(&self, base: u8) -> Result<Kmer> {
        let mut prev = self.clone();
        prev.shift_prepend(base)?;
        Ok(prev)
    }

    pub fn rev_comp(&self) -> Kmer {
        let mut rc = Kmer::zeroed(self.k);
        for i in 0..self.k {
            rc.set_code(i, 3 - self.code(self.k - 1 - i));
        }
        rc
    }

    /// True if the k-mer equals its reverse complement, which can only
    /// happen for even `k`.
    pub fn is_palindrome(&self) -> bool {
        self.k % 2 == 0 && *self == self.rev_comp()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        (0..self.k).map(|i| self.base(i)).collect()
    }

    /// Iterate through the k-mer windows of `seq` along with their
    /// offsets. Windows that would contain a non-ACGT base are
    /// skipped.
    pub fn windows(seq: &[u8], k: usize) -> Windows<'_> {
        Windows {
            seq,
            pos: 0,
            valid: 0,
            kmer: Kmer::zeroed(k),
        }
    }
}

impl fmt::Display for Kmer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.k {
            write!(f, "{}", self.base(i) as char)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Kmer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Kmer({})", self)
    }
}

/// Iterator over the `(offset, kmer)` windows of a sequence, produced
/// by shifting one base at a time.
pub struct Windows<'a> {
    seq: &'a [u8],
    pos: usize,
    valid: usize,
    kmer: Kmer,
}

impl<'a> Iterator for Windows<'a> {
    type Item = (usize, Kmer);

    fn next(&mut self) -> Option<(usize, Kmer)> {
        let k = self.kmer.len();
        if k == 0 {
            return None;
        }
        while self.pos < self.seq.len() {
            let base = self.seq[self.pos];
            self.pos += 1;
            match encode_base(base) {
                Some(code) => {
                    self.kmer.push_back_code(code);
                    self.valid += 1;
                    if self.valid >= k {
                        return Some((self.pos - k, self.kmer.clone()));
                    }
                }
                None => self.valid = 0,
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::dna::rev_comp;

    fn kmer(s: &str) -> Kmer {
        Kmer::from_slice(s.as_bytes()).unwrap()
    }

    #[test]
    fn display_round_trips() {
        let s = "ACGTTGCAAC";
        assert_eq!(kmer(s).to_string(), s);
        assert_eq!(kmer("acg").to_string(), "ACG");
        assert!(Kmer::from_slice(b"ACNG").is_err());
    }

    #[test]
    fn shift_append_and_prepend() {
        let mut k = kmer("ACG");
        k.shift_append(b'T').unwrap();
        assert_eq!(k, kmer("CGT"));
        k.shift_prepend(b'A').unwrap();
        assert_eq!(k, kmer("ACG"));
        assert_eq!(k.successor(b'A').unwrap(), kmer("CGA"));
        assert_eq!(k.predecessor(b'T').unwrap(), kmer("TAC"));
    }

    #[test]
    fn shifts_cross_word_boundaries() {
        let long: String = "ACGTTGCA".repeat(9);
        let seq = long.as_bytes();
        let k = 37;
        let mut km = Kmer::from_prefix(seq, k).unwrap();
        for i in k..seq.len() {
            km.shift_append(seq[i]).unwrap();
            let expected = Kmer::from_slice(&seq[i + 1 - k..=i]).unwrap();
            assert_eq!(km, expected);
        }
        for i in (0..seq.len() - k).rev() {
            km.shift_prepend(seq[i]).unwrap();
            let expected = Kmer::from_slice(&seq[i..i + k]).unwrap();
            assert_eq!(km, expected);
        }
    }

    #[test]
    fn reverse_complement() {
        assert_eq!(kmer("AACG").rev_comp(), kmer("CGTT"));
        let long = "ACGTTGCAAGGCTTAACGTTGCAAGGCTTAACGTTGCAA";
        let rc = rev_comp(long.as_bytes());
        assert_eq!(kmer(long).rev_comp().to_bytes(), rc);
        assert!(kmer("ACGT").is_palindrome());
        assert!(!kmer("ACG").is_palindrome());
    }

    #[test]
    fn suffix_and_prefix() {
        assert_eq!(Kmer::from_suffix(b"ACGTAC", 3).unwrap(), kmer("TAC"));
        assert_eq!(Kmer::from_prefix(b"ACGTAC", 3).unwrap(), kmer("ACG"));
        assert!(Kmer::from_suffix(b"AC", 3).is_err());
    }

    #[test]
    fn windows_skip_ambiguous_bases() {
        let windows = Kmer::windows(b"ACGTNACGA", 3)
            .map(|(i, k)| (i, k.to_string()))
            .collect::<Vec<_>>();
        assert_eq!(
            windows,
            vec![
                (0, "ACG".to_string()),
                (1, "CGT".to_string()),
                (5, "ACG".to_string()),
                (6, "CGA".to_string()),
            ]
        );
    }
}
