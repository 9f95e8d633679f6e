//! Request handlers for the three tools and a caller-owned history of their results.

use crate::{
    about,
    amplicon::Amplicon,
    anneal::Anneal,
    dna_sequence::DNAsequence,
    error::PcrResult,
    melting_temp::TmParameters,
    parameters::PcrParameters,
    pcr_program::{PcrProgram, Polymerase},
    primer_design::{DesignTarget, design},
    sequence_parser::{parse_text, split_template},
};
use log::{debug, info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

fn now_unix_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimerTm {
    pub name: String,
    pub sequence: String,
    pub length: usize,
    pub tm: f64,
}

impl PrimerTm {
    /// FASTA record with the Tm as description
    pub fn to_fasta(&self) -> String {
        format!(">{} tm={:.3}\n{}\n", self.name, self.tm, self.sequence)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TmReport {
    pub created_at_unix_ms: u64,
    pub table: String,
    pub salt_correction: String,
    pub primers: Vec<PrimerTm>,
}

impl TmReport {
    pub fn to_fasta(&self) -> String {
        self.primers.iter().map(PrimerTm::to_fasta).collect()
    }
}

/// Everything shown for one product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmpliconDetail {
    pub forward_primer_name: String,
    pub forward_primer_length: usize,
    pub forward_primer_sequence: String,
    pub reverse_primer_name: String,
    pub reverse_primer_length: usize,
    pub reverse_primer_sequence: String,
    pub template_name: String,
    pub template_sequence: String,
    pub template_circular: bool,
    pub product_name: String,
    pub product_sequence: String,
    pub size: usize,
    pub start: usize,
    pub end: usize,
    pub gc_fraction: f64,
    pub taq_elongation_seconds: f64,
    pub pfu_sso7d_elongation_seconds: f64,
    /// Missing when a primer footprint has no Tm, see `program_error`
    pub taq_program: Option<PcrProgram>,
    pub pfu_sso7d_program: Option<PcrProgram>,
    pub program_error: Option<String>,
}

impl AmpliconDetail {
    pub fn from_amplicon(amplicon: &Amplicon, tm_params: &TmParameters) -> Self {
        let programs = amplicon
            .program(Polymerase::Taq, tm_params)
            .and_then(|taq| {
                amplicon
                    .program(Polymerase::PfuSso7d, tm_params)
                    .map(|pfu| (taq, pfu))
            });
        let (taq_program, pfu_sso7d_program, program_error) = match programs {
            Ok((taq, pfu)) => (Some(taq), Some(pfu), None),
            Err(e) => {
                warn!("No PCR program for {}: {}", amplicon.name(), e.message);
                (None, None, Some(e.message))
            }
        };
        let forward = amplicon.forward_primer();
        let reverse = amplicon.reverse_primer();
        Self {
            forward_primer_name: forward.name().to_string(),
            forward_primer_length: forward.len(),
            forward_primer_sequence: forward.dna().get_forward_string(),
            reverse_primer_name: reverse.name().to_string(),
            reverse_primer_length: reverse.len(),
            reverse_primer_sequence: reverse.dna().get_forward_string(),
            template_name: amplicon.template_name().to_string(),
            template_sequence: amplicon.template().get_forward_string(),
            template_circular: amplicon.template().is_circular(),
            product_name: amplicon.name().to_string(),
            product_sequence: amplicon.product().get_forward_string(),
            size: amplicon.size(),
            start: amplicon.start(),
            end: amplicon.end(),
            gc_fraction: amplicon.gc_fraction(),
            taq_elongation_seconds: amplicon.taq_elongation_seconds(),
            pfu_sso7d_elongation_seconds: amplicon.pfu_sso7d_elongation_seconds(),
            taq_program,
            pfu_sso7d_program,
            program_error,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PcrReport {
    pub created_at_unix_ms: u64,
    pub version: String,
    pub product_count: usize,
    pub anneal_report: String,
    /// Filled only for 1..=detail_cutoff products
    pub products: Vec<AmpliconDetail>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignReport {
    pub created_at_unix_ms: u64,
    pub version: String,
    pub amplicon: AmpliconDetail,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StoredResult {
    Tm(TmReport),
    Pcr(PcrReport),
    Design(DesignReport),
}

/// History of one session's results, oldest first
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResultStore {
    results: Vec<StoredResult>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn results(&self) -> &[StoredResult] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn clear(&mut self) {
        self.results.clear();
    }

    pub fn annotate_tm(&mut self, text: &str, params: &PcrParameters) -> PcrResult<TmReport> {
        let report = annotate_tm(text, params)?;
        self.results.push(report.clone().into());
        Ok(report)
    }

    pub fn simulate_pcr(&mut self, text: &str, params: &PcrParameters) -> PcrResult<PcrReport> {
        let report = simulate_pcr(text, params)?;
        self.results.push(report.clone().into());
        Ok(report)
    }

    pub fn design_primers(&mut self, text: &str, params: &PcrParameters) -> PcrResult<DesignReport> {
        let report = design_primers(text, params)?;
        self.results.push(report.clone().into());
        Ok(report)
    }
}

/// Tm of every sequence in `text`; all of them count as primers.
pub fn annotate_tm(text: &str, params: &PcrParameters) -> PcrResult<TmReport> {
    let tm_params = params.tm_parameters()?;
    let records = parse_text(text)?;
    debug!("Tm for {} sequences with {:?}", records.len(), tm_params);
    let primers = records
        .par_iter()
        .enumerate()
        .map(|(i, seq)| {
            Ok(PrimerTm {
                name: seq
                    .name()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("primer{}", i + 1)),
                sequence: seq.get_forward_string(),
                length: seq.len(),
                tm: tm_params.tm(seq.forward())?,
            })
        })
        .collect::<PcrResult<Vec<PrimerTm>>>()?;
    info!("Annotated {} primers with Tm", primers.len());
    Ok(TmReport {
        created_at_unix_ms: now_unix_ms(),
        table: tm_params.table.to_string(),
        salt_correction: tm_params.salt.to_string(),
        primers,
    })
}

pub fn simulate_pcr(text: &str, params: &PcrParameters) -> PcrResult<PcrReport> {
    params.validate()?;
    let tm_params = params.tm_parameters()?;
    let (primers, template) = split_template(parse_text(text)?)?;
    let anneal = Anneal::new(&primers, &template, params.homology_limit);
    let products = anneal.products();
    info!(
        "PCR with {} primers on {} ({} bp): {} products",
        primers.len(),
        template.name_or("template"),
        template.len(),
        products.len()
    );
    let details = if products.len() <= params.detail_cutoff {
        products
            .iter()
            .map(|amplicon| AmpliconDetail::from_amplicon(amplicon, &tm_params))
            .collect()
    } else {
        debug!(
            "{} products exceed the detail cutoff of {}",
            products.len(),
            params.detail_cutoff
        );
        vec![]
    };
    Ok(PcrReport {
        created_at_unix_ms: now_unix_ms(),
        version: about::version_short_text(),
        product_count: products.len(),
        anneal_report: anneal.report(),
        products: details,
    })
}

/// The last sequence is the template; a sequence before it is taken as the fixed primer.
/// Its partner is matched to its Tm.
pub fn design_primers(text: &str, params: &PcrParameters) -> PcrResult<DesignReport> {
    params.validate()?;
    let tm_params = params.tm_parameters()?;
    let (mut primers, template) = split_template(parse_text(text)?)?;
    let fixed = primers.pop();
    let target = match fixed {
        Some(_) => DesignTarget {
            target_tm: None,
            ..params.design_target()
        },
        None => params.design_target(),
    };
    let amplicon = design(
        &template,
        fixed.as_ref(),
        params.homology_limit,
        &target,
        &tm_params,
    )
    .inspect_err(|e| info!("Design on {} failed: {e}", template_label(&template)))?;
    info!(
        "Designed {} / {} for {}",
        amplicon.forward_primer().name(),
        amplicon.reverse_primer().name(),
        template_label(&template)
    );
    Ok(DesignReport {
        created_at_unix_ms: now_unix_ms(),
        version: about::version_short_text(),
        amplicon: AmpliconDetail::from_amplicon(&amplicon, &tm_params),
    })
}

fn template_label(template: &DNAsequence) -> String {
    format!("{} ({} bp)", template.name_or("template"), template.len())
}

impl From<TmReport> for StoredResult {
    fn from(report: TmReport) -> Self {
        Self::Tm(report)
    }
}

impl From<PcrReport> for StoredResult {
    fn from(report: PcrReport) -> Self {
        Self::Pcr(report)
    }
}

impl From<DesignReport> for StoredResult {
    fn from(report: DesignReport) -> Self {
        Self::Design(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    const TEMPLATE: &str = "ATGGCAGTTGAGAAGAAACCCGCTAAAGACAATTACATAACATACACGTCAGCACGAAACTGTTTTTGGTAAAAGGT";

    fn pcr_input() -> String {
        format!(">f\nATGGCAGTTGAGAAGA\n>r\nACCTTTTACCAAAAAC\n>tpl\n{TEMPLATE}\n")
    }

    #[test]
    fn test_annotate_tm_fasta() {
        let report = annotate_tm(">p1\nATGGCAGTTGAGAAGA\n>p2\nGCGGATAACAATTTCACACAGGAAAC\n", &PcrParameters::default())
            .unwrap();
        assert_eq!(report.primers.len(), 2);
        assert_eq!(report.primers[0].name, "p1");
        assert_eq!(report.primers[1].length, 26);
        let fasta = report.to_fasta();
        assert!(fasta.starts_with(">p1 tm=52.6"));
        assert_eq!(fasta.lines().count(), 4);
    }

    #[test]
    fn test_annotate_tm_strict_error() {
        let err = annotate_tm(">p\nATGNNNATG\n", &PcrParameters::default()).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidSequence);
    }

    #[test]
    fn test_simulate_pcr_details() {
        let report = simulate_pcr(&pcr_input(), &PcrParameters::default()).unwrap();
        assert_eq!(report.product_count, 1);
        assert_eq!(report.products.len(), 1);
        let detail = &report.products[0];
        assert_eq!(detail.product_sequence, TEMPLATE);
        assert_eq!(detail.product_name, "77bp_PCR_prod");
        assert_eq!(detail.forward_primer_length, 16);
        assert_eq!(detail.template_name, "tpl");
        assert_eq!(detail.taq_program.as_ref().unwrap().length, 77);
        assert!(report.anneal_report.contains("Primer f anneals forward"));
    }

    #[test]
    fn test_detail_cutoff() {
        let params = PcrParameters {
            detail_cutoff: 0,
            ..PcrParameters::default()
        };
        let report = simulate_pcr(&pcr_input(), &params).unwrap();
        assert_eq!(report.product_count, 1);
        assert!(report.products.is_empty());
    }

    #[test]
    fn test_products_without_primer_tm_keep_their_details() {
        let params = PcrParameters {
            homology_limit: 1,
            ..PcrParameters::default()
        };
        let report = simulate_pcr(">f\nA\n>r\nT\n>t\nGGGAGGGTGGG\n", &params).unwrap();
        assert_eq!(report.product_count, 3);
        assert_eq!(report.products.len(), 3);
        assert_eq!(report.products[2].product_sequence, "AGGGT");
        for detail in &report.products {
            assert!(detail.taq_program.is_none());
            assert!(detail.pfu_sso7d_program.is_none());
            assert!(detail.program_error.is_some());
            assert!(detail.taq_elongation_seconds > 0.0);
        }
    }

    #[test]
    fn test_design_primers_with_and_without_fixed_primer() {
        let params = PcrParameters::default();
        let free = design_primers(&format!(">tpl\n{TEMPLATE}\n"), &params).unwrap();
        assert_eq!(free.amplicon.forward_primer_name, "ftpl");
        assert_eq!(free.amplicon.product_sequence, TEMPLATE);

        let fixed = design_primers(&format!(">myrev\nACCTTTTACCAAAAAC\n>tpl\n{TEMPLATE}\n"), &params)
            .unwrap();
        assert_eq!(fixed.amplicon.reverse_primer_name, "myrev");
        assert_eq!(fixed.amplicon.forward_primer_sequence, "ATGGCAGTTGAGAA");

        let err = design_primers(&format!(">inner\nCGCTAAAGACAATTAC\n>tpl\n{TEMPLATE}\n"), &params)
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NoAnnealing);
    }

    #[test]
    fn test_store_accumulates_in_order() {
        let params = PcrParameters::default();
        let mut store = ResultStore::new();
        assert!(store.is_empty());
        store.annotate_tm(">p\nATGGCAGTTGAGAAGA\n", &params).unwrap();
        let pcr = store.simulate_pcr(&pcr_input(), &params).unwrap();
        assert_eq!(pcr.product_count, 1);
        store
            .design_primers(&format!(">tpl\n{TEMPLATE}\n"), &params)
            .unwrap();
        assert!(store.simulate_pcr("ATGXYZ", &params).is_err());
        assert_eq!(store.len(), 3);
        assert!(matches!(store.results()[0], StoredResult::Tm(_)));
        assert!(matches!(store.results()[1], StoredResult::Pcr(_)));
        assert!(matches!(store.results()[2], StoredResult::Design(_)));

        match &store.results()[1] {
            StoredResult::Pcr(report) => assert_eq!(report.product_count, 1),
            other => panic!("unexpected {other:?}"),
        }

        store.clear();
        assert!(store.is_empty());
    }
}
