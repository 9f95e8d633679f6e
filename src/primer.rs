use crate::{
    dna_sequence::DNAsequence,
    error::{PcrError, PcrResult},
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Single-stranded oligo, always read 5'->3'.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Primer {
    name: String,
    seq: DNAsequence,
}

impl Primer {
    pub fn new(name: &str, sequence: &str) -> PcrResult<Self> {
        Self::from_dna(name, DNAsequence::from_sequence(sequence)?)
    }

    /// Takes over a parsed record; primers are linear no matter what the record said.
    pub fn from_dna(name: &str, mut seq: DNAsequence) -> PcrResult<Self> {
        if seq.is_empty() {
            return Err(PcrError::invalid_sequence(format!(
                "Primer '{name}' has no sequence"
            )));
        }
        seq.set_circular(false);
        seq.set_name(name);
        Ok(Self {
            name: name.to_string(),
            seq,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dna(&self) -> &DNAsequence {
        &self.seq
    }

    pub fn bases(&self) -> &[u8] {
        self.seq.forward()
    }

    pub fn len(&self) -> usize {
        self.seq.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seq.is_empty()
    }

    /// The 3'-terminal `n` bases (all of them if the primer is shorter)
    pub fn three_prime_end(&self, n: usize) -> &[u8] {
        let bases = self.bases();
        &bases[bases.len().saturating_sub(n)..]
    }

    /// The 5' part left over once the 3'-terminal `footprint` bases are annealed
    pub fn tail(&self, footprint: usize) -> &[u8] {
        let bases = self.bases();
        &bases[..bases.len().saturating_sub(footprint)]
    }
}

impl fmt::Display for Primer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.seq)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primer_is_always_linear() {
        let mut dna = DNAsequence::from_sequence("ATGCATGC").unwrap();
        dna.set_circular(true);
        let primer = Primer::from_dna("p1", dna).unwrap();
        assert!(!primer.dna().is_circular());
        assert_eq!(primer.dna().name(), Some("p1"));
    }

    #[test]
    fn test_empty_primer_is_rejected() {
        let err = Primer::new("p", "  ").unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::InvalidSequence);
    }

    #[test]
    fn test_three_prime_end_and_tail() {
        let primer = Primer::new("p", "GGATCCATGAAA").unwrap();
        assert_eq!(primer.three_prime_end(6), b"ATGAAA");
        assert_eq!(primer.tail(6), b"GGATCC");
        assert_eq!(primer.three_prime_end(20), b"GGATCCATGAAA");
        assert_eq!(primer.tail(20), b"");
    }
}
