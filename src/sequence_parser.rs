//! Turns pasted text or files into sequences. The last sequence is the template,
//! everything before it is a primer.

use crate::{
    dna_sequence::DNAsequence,
    error::{ErrorCode, PcrError, PcrResult},
    primer::Primer,
};
use bio::io::fasta;
use gb_io::reader::SeqReader;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputFormat {
    Fasta,
    GenBank,
    /// Nothing but bases, read as one unnamed sequence
    Raw,
}

impl InputFormat {
    pub fn detect(text: &str) -> Self {
        let text = text.trim_start();
        if text.starts_with('>') {
            Self::Fasta
        } else if text.starts_with("LOCUS") {
            Self::GenBank
        } else {
            Self::Raw
        }
    }
}

pub fn parse_text(text: &str) -> PcrResult<Vec<DNAsequence>> {
    let ret = match InputFormat::detect(text) {
        InputFormat::Fasta => parse_fasta(text)?,
        InputFormat::GenBank => parse_genbank(text)?,
        InputFormat::Raw => {
            let mut seq = DNAsequence::from_sequence(text)?;
            seq.set_name("sequence");
            vec![seq]
        }
    };
    if ret.iter().all(|seq| seq.is_empty()) {
        return Err(PcrError::invalid_sequence("No sequence found in input"));
    }
    Ok(ret)
}

pub fn parse_file(path: &str) -> PcrResult<Vec<DNAsequence>> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        PcrError::new(
            ErrorCode::Io,
            format!("Could not read sequence file '{path}': {e}"),
        )
    })?;
    parse_text(&text)
}

fn parse_fasta(text: &str) -> PcrResult<Vec<DNAsequence>> {
    fasta::Reader::new(text.as_bytes())
        .records()
        .map(|record| {
            let record = record.map_err(|e| {
                PcrError::invalid_sequence(format!("Could not parse FASTA: {e}"))
            })?;
            DNAsequence::from_fasta_record(&record)
        })
        .collect()
}

fn parse_genbank(text: &str) -> PcrResult<Vec<DNAsequence>> {
    SeqReader::new(text.as_bytes())
        .map(|seq| {
            let seq = seq.map_err(|e| {
                PcrError::invalid_sequence(format!("Could not parse GenBank: {e}"))
            })?;
            DNAsequence::from_genbank_seq(seq)
        })
        .collect()
}

/// Splits parsed records into primers and the template (the last record).
/// Unnamed primers are called `primer1`, `primer2`, ...
pub fn split_template(mut records: Vec<DNAsequence>) -> PcrResult<(Vec<Primer>, DNAsequence)> {
    let template = records
        .pop()
        .ok_or_else(|| PcrError::invalid_sequence("No template sequence given"))?;
    if template.is_empty() {
        return Err(PcrError::invalid_sequence(format!(
            "Template {} has no sequence",
            template.name_or("template")
        )));
    }
    let primers = records
        .into_iter()
        .enumerate()
        .map(|(i, seq)| {
            let name = match seq.name() {
                Some(name) if !name.is_empty() => name.to_string(),
                _ => format!("primer{}", i + 1),
            };
            Primer::from_dna(&name, seq)
        })
        .collect::<PcrResult<Vec<Primer>>>()?;
    Ok((primers, template))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const FASTA: &str = ">fwd\nATGGCAGTTG\nAGAAGA\n>rev\nACCTTTTACCAAAAAC\n>pUC circular plasmid\nATGGCAGTTGAGAAGAAACCCGTTTTTGGTAAAAGGT\n";

    #[test]
    fn test_detect_format() {
        assert_eq!(InputFormat::detect("\n >x\nACGT"), InputFormat::Fasta);
        assert_eq!(InputFormat::detect("LOCUS  x"), InputFormat::GenBank);
        assert_eq!(InputFormat::detect("acgt acgt"), InputFormat::Raw);
    }

    #[test]
    fn test_fasta_records_and_split() {
        let records = parse_text(FASTA).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].get_forward_string(), "ATGGCAGTTGAGAAGA");
        let (primers, template) = split_template(records).unwrap();
        assert_eq!(primers.len(), 2);
        assert_eq!(primers[0].name(), "fwd");
        assert_eq!(primers[1].name(), "rev");
        assert_eq!(template.name(), Some("pUC"));
        assert!(template.is_circular());
        assert_eq!(template.len(), 37);
    }

    #[test]
    fn test_genbank_topology_is_kept() {
        let text = "LOCUS       pTEST                     24 bp    DNA     circular SYN 01-JAN-2024\n\
                    DEFINITION  test plasmid.\n\
                    ORIGIN\n\
                    \x20       1 atgcatgcat gcatgcatgc atgc\n\
                    //\n";
        let records = parse_text(text).unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].is_circular());
        assert_eq!(records[0].get_forward_string(), "ATGCATGCATGCATGCATGCATGC");
        assert_eq!(records[0].name(), Some("pTEST"));
    }

    #[test]
    fn test_raw_sequence() {
        let records = parse_text("atggca gttgag\naagaaa\n").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get_forward_string(), "ATGGCAGTTGAGAAGAAA");
        assert!(!records[0].is_circular());
    }

    #[test]
    fn test_bad_input() {
        assert_eq!(
            parse_text("ATGXXX").unwrap_err().code,
            ErrorCode::InvalidSequence
        );
        assert!(parse_text("   ").is_err());
        assert!(split_template(vec![]).is_err());
    }

    #[test]
    fn test_parse_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(FASTA.as_bytes()).unwrap();
        let records = parse_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(
            parse_file("/no/such/input.fasta").unwrap_err().code,
            ErrorCode::Io
        );
    }
}
