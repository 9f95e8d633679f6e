use crate::{
    error::{PcrError, PcrResult},
    iupac_code::IupacCode,
};
use bio::io::fasta;
use gb_io::seq::{Seq, Topology};
use serde::{Deserialize, Serialize};
use std::fmt;

type DNAstring = Vec<u8>;

/// Nucleotide sequence with topology, validated against the IUPAC alphabet on construction.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DNAsequence {
    seq: Seq,
}

impl DNAsequence {
    pub fn from_sequence(sequence: &str) -> PcrResult<DNAsequence> {
        Self::from_u8(sequence.as_bytes())
    }

    pub fn from_named_sequence(name: &str, sequence: &str) -> PcrResult<DNAsequence> {
        let mut ret = Self::from_sequence(sequence)?;
        ret.set_name(name);
        Ok(ret)
    }

    pub fn from_bases(bases: &[u8]) -> PcrResult<DNAsequence> {
        Self::from_u8(bases)
    }

    pub fn from_genbank_seq(mut seq: Seq) -> PcrResult<Self> {
        seq.seq = Self::validate_dna_sequence(&seq.seq)?;
        seq.len = Some(seq.seq.len());
        Ok(Self { seq })
    }

    pub fn from_fasta_record(record: &fasta::Record) -> PcrResult<Self> {
        let mut ret = Self::from_u8(record.seq())?;
        ret.seq.name = Some(record.id().to_string());
        if let Some(desc) = record.desc() {
            if desc.to_ascii_lowercase().split_whitespace().any(|w| w == "circular") {
                ret.set_circular(true);
            }
            ret.seq.comments.push(desc.to_string());
        }
        Ok(ret)
    }

    fn from_u8(s: &[u8]) -> PcrResult<Self> {
        let s = Self::validate_dna_sequence(s)?;
        let seq = Seq {
            name: None,
            topology: Topology::Linear,
            date: None,
            len: Some(s.len()),
            molecule_type: Some("DNA".to_string()),
            division: String::new(),
            definition: None,
            accession: None,
            version: None,
            source: None,
            dblink: None,
            keywords: None,
            references: vec![],
            comments: vec![],
            seq: s,
            contig: None,
            features: vec![],
        };
        Ok(Self { seq })
    }

    /// Strips whitespace and upper-cases; anything outside the IUPAC alphabet is rejected.
    pub fn validate_dna_sequence(v: &[u8]) -> PcrResult<DNAstring> {
        let mut ret = Vec::with_capacity(v.len());
        for c in v.iter().filter(|c| !c.is_ascii_whitespace()) {
            if !IupacCode::is_valid_letter(*c) {
                return Err(PcrError::invalid_sequence(format!(
                    "Invalid nucleotide '{}' at position {}",
                    char::from(*c),
                    ret.len() + 1
                )));
            }
            ret.push(c.to_ascii_uppercase());
        }
        Ok(ret)
    }

    /// Maps any position onto the sequence: modulo length for circular sequences,
    /// `None` outside `0..len` for linear ones.
    #[inline(always)]
    pub fn wrap_position(&self, pos: isize) -> Option<usize> {
        let len = self.len() as isize;
        if len == 0 {
            return None;
        }
        if self.is_circular() {
            Some(pos.rem_euclid(len) as usize)
        } else if (0..len).contains(&pos) {
            Some(pos as usize)
        } else {
            None
        }
    }

    #[inline(always)]
    pub fn get_base_safe(&self, pos: isize) -> Option<u8> {
        self.wrap_position(pos).map(|i| self.forward()[i])
    }

    /// `length` bases starting at `start`, crossing the origin of circular sequences.
    /// At most one full turn is returned.
    pub fn get_wrapped(&self, start: isize, length: usize) -> Option<DNAstring> {
        if length > self.len() {
            return None;
        }
        if length == 0 {
            return Some(vec![]);
        }
        let first = self.wrap_position(start)?;
        let last = self.wrap_position(start + length as isize - 1)?;
        if first <= last && last - first + 1 == length {
            Some(self.forward()[first..=last].to_vec())
        } else if self.is_circular() {
            Some(
                self.forward()[first..]
                    .iter()
                    .chain(self.forward()[..=last].iter())
                    .copied()
                    .collect(),
            )
        } else {
            None
        }
    }

    #[inline(always)]
    pub fn forward(&self) -> &[u8] {
        &self.seq.seq
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.forward().len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward().is_empty()
    }

    pub fn name(&self) -> Option<&str> {
        self.seq.name.as_deref()
    }

    pub fn name_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.name().unwrap_or(default)
    }

    pub fn set_name(&mut self, name: &str) {
        self.seq.name = Some(name.to_string());
    }

    pub fn description(&self) -> &[String] {
        &self.seq.comments
    }

    pub fn set_description(&mut self, description: &str) {
        self.seq.comments = vec![description.to_string()];
    }

    pub fn get_forward_string(&self) -> String {
        String::from_utf8_lossy(self.forward()).to_string()
    }

    pub fn is_circular(&self) -> bool {
        self.seq.topology == Topology::Circular
    }

    pub fn set_circular(&mut self, is_circular: bool) {
        self.seq.topology = match is_circular {
            true => Topology::Circular,
            false => Topology::Linear,
        };
    }

    /// Same name and topology, opposite strand
    pub fn reverse_complement(&self) -> Self {
        let mut seq = self.seq.clone();
        seq.seq = IupacCode::reverse_complement_bytes(self.forward());
        seq.features = vec![];
        Self { seq }
    }

    pub fn complement(&self) -> Self {
        let mut seq = self.seq.clone();
        seq.seq = IupacCode::complement_bytes(self.forward());
        seq.features = vec![];
        Self { seq }
    }

    /// Fraction of G, C and S over the full length
    pub fn gc_fraction(&self) -> f64 {
        gc_fraction(self.forward())
    }

    pub fn to_fasta(&self) -> String {
        let mut header = format!(">{}", self.name_or("sequence"));
        if let Some(desc) = self.description().first() {
            header.push(' ');
            header.push_str(desc);
        }
        format!("{header}\n{}\n", self.get_forward_string())
    }
}

pub fn gc_fraction(seq: &[u8]) -> f64 {
    if seq.is_empty() {
        return 0.0;
    }
    let gc = seq.iter().filter(|c| IupacCode::is_gc_letter(**c)).count();
    gc as f64 / seq.len() as f64
}

impl fmt::Display for DNAsequence {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(self.forward()))
    }
}

impl PartialEq for DNAsequence {
    fn eq(&self, other: &Self) -> bool {
        self.forward() == other.forward() && self.is_circular() == other.is_circular()
    }
}
