pub mod validate;

pub mod dna {

    const fn comp_base_impl(base: u8) -> u8 {
        match base {
            b'A' => b'T',
            b'G' => b'C',
            b'C' => b'G',
            b'T' => b'A',
            b'a' => b't',
            b'g' => b'c',
            b'c' => b'g',
            b't' => b'a',
            _ => b'N',
        }
    }

    // loops can be used in const fns since Rust 1.46, meaning we can
    // build a lookup table at compile time
    const fn comp_base_table() -> [u8; 256] {
        let mut i = 0;
        let mut table: [u8; 256] = [0; 256];
        while i <= 255 {
            table[i] = comp_base_impl(i as u8);
            i += 1;
        }
        table
    }

    const DNA_COMP_TABLE: [u8; 256] = comp_base_table();

    /// Retrieves the DNA complement for the provided base using a
    /// lookup-table built at compile time using the `const fn`
    /// `comp_base_table()`.
    #[inline]
    pub const fn comp_base(base: u8) -> u8 {
        DNA_COMP_TABLE[base as usize]
    }

    /// 2-bit code of a nucleotide, `None` for anything but ACGT
    /// (either case).
    #[inline]
    pub const fn encode_base(base: u8) -> Option<u64> {
        match base {
            b'a' | b'A' => Some(0),
            b'c' | b'C' => Some(1),
            b'g' | b'G' => Some(2),
            b't' | b'T' => Some(3),
            _ => None,
        }
    }

    #[inline]
    pub const fn decode_base(code: u64) -> u8 {
        match code & 3 {
            0 => b'A',
            1 => b'C',
            2 => b'G',
            _ => b'T',
        }
    }

    #[inline]
    pub const fn is_nucleotide(base: u8) -> bool {
        encode_base(base).is_some()
    }

    /// Calculates the reverse complement for a sequence provided as a
    /// double-ended iterator. Collects into a `Vec<u8>` for
    /// convenience.
    #[inline]
    pub fn rev_comp<I, B>(seq: I) -> Vec<u8>
    where
        B: std::borrow::Borrow<u8>,
        I: IntoIterator<Item = B>,
        I::IntoIter: DoubleEndedIterator,
    {
        seq.into_iter()
            .rev()
            .map(|b| comp_base(*b.borrow()))
            .collect()
    }

    /// True if the sequence equals its own reverse complement.
    pub fn is_palindrome(seq: &[u8]) -> bool {
        let n = seq.len();
        (0..n).all(|i| seq[i] == comp_base(seq[n - 1 - i]))
    }

    /// Split a read into the maximal runs of ACGT bases that are at
    /// least `min_len` long, uppercased.
    pub fn acgt_runs(seq: &[u8], min_len: usize) -> Vec<Vec<u8>> {
        seq.split(|&b| !is_nucleotide(b))
            .filter(|run| !run.is_empty() && run.len() >= min_len)
            .map(|run| run.to_ascii_uppercase())
            .collect()
    }

}
