use crate::{
    anneal::{AnnealingSite, Strand},
    dna_sequence::DNAsequence,
    error::PcrResult,
    iupac_code::IupacCode,
    melting_temp::TmParameters,
    pcr_program::{PcrProgram, Polymerase},
    primer::Primer,
};
use itertools::iproduct;
use serde::{Deserialize, Serialize};

/// A product formed by one forward and one reverse annealing site facing each other.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Amplicon {
    forward: AnnealingSite,
    reverse: AnnealingSite,
    template: DNAsequence,
    product: DNAsequence,
    start: usize,
    end: usize,
}

/// Template bases covered from the forward start to the reverse end, if the pair converges
fn product_span(
    forward: &AnnealingSite,
    reverse: &AnnealingSite,
    template: &DNAsequence,
) -> Option<usize> {
    let n = template.len();
    if n == 0 {
        return None;
    }
    if template.is_circular() {
        let span = match (reverse.end() as isize - forward.start as isize).rem_euclid(n as isize) {
            0 => n,
            d => d as usize,
        };
        (forward.length <= span && reverse.length <= span).then_some(span)
    } else {
        let converges = forward.start <= reverse.start
            && forward.end() <= reverse.end()
            && reverse.end() <= n;
        converges.then(|| reverse.end() - forward.start)
    }
}

impl Amplicon {
    /// `None` when the two sites do not face each other on `template`.
    pub fn new(
        forward: &AnnealingSite,
        reverse: &AnnealingSite,
        template: &DNAsequence,
    ) -> Option<Self> {
        if forward.strand != Strand::Forward || reverse.strand != Strand::Reverse {
            return None;
        }
        let span = product_span(forward, reverse, template)?;
        let covered = template.get_wrapped(forward.start as isize, span)?;

        let mut bases = forward.tail().to_vec();
        bases.extend(covered);
        bases.extend(IupacCode::reverse_complement_bytes(reverse.tail()));
        let mut product = DNAsequence::from_bases(&bases).ok()?;
        product.set_name(&format!("{}bp_PCR_prod", bases.len()));

        let end = template.wrap_position(reverse.end() as isize - 1)? + 1;
        Some(Self {
            forward: forward.clone(),
            reverse: reverse.clone(),
            template: template.clone(),
            product,
            start: forward.start,
            end,
        })
    }

    pub fn forward_site(&self) -> &AnnealingSite {
        &self.forward
    }

    pub fn reverse_site(&self) -> &AnnealingSite {
        &self.reverse
    }

    pub fn forward_primer(&self) -> &Primer {
        &self.forward.primer
    }

    pub fn reverse_primer(&self) -> &Primer {
        &self.reverse.primer
    }

    pub fn template(&self) -> &DNAsequence {
        &self.template
    }

    pub fn template_name(&self) -> &str {
        self.template.name_or("template")
    }

    pub fn product(&self) -> &DNAsequence {
        &self.product
    }

    pub fn name(&self) -> &str {
        self.product.name_or("PCR_prod")
    }

    /// Template position of the first base copied into the product
    pub fn start(&self) -> usize {
        self.start
    }

    /// Exclusive template position after the last copied base, in `1..=template.len()`
    pub fn end(&self) -> usize {
        self.end
    }

    /// Product length including both primer tails
    pub fn size(&self) -> usize {
        self.product.len()
    }

    pub fn len(&self) -> usize {
        self.size()
    }

    pub fn is_empty(&self) -> bool {
        self.product.is_empty()
    }

    pub fn gc_fraction(&self) -> f64 {
        self.product.gc_fraction()
    }

    pub fn taq_elongation_seconds(&self) -> f64 {
        Polymerase::Taq.elongation_seconds(self.len())
    }

    pub fn pfu_sso7d_elongation_seconds(&self) -> f64 {
        Polymerase::PfuSso7d.elongation_seconds(self.len())
    }

    pub fn program(&self, polymerase: Polymerase, params: &TmParameters) -> PcrResult<PcrProgram> {
        PcrProgram::for_amplicon(self, polymerase, params)
    }
}

/// Pairs every forward site with every reverse site and keeps the converging pairs,
/// ordered by size, then forward start, then reverse start.
pub fn build_amplicons<'a>(
    sites: impl IntoIterator<Item = &'a AnnealingSite>,
    template: &DNAsequence,
) -> Vec<Amplicon> {
    let (forward, reverse): (Vec<&AnnealingSite>, Vec<&AnnealingSite>) = sites
        .into_iter()
        .partition(|site| site.strand == Strand::Forward);
    let mut ret: Vec<Amplicon> = iproduct!(forward.iter(), reverse.iter())
        .filter_map(|(fwd, rev)| Amplicon::new(fwd, rev, template))
        .collect();
    ret.sort_by_key(|amplicon| (amplicon.size(), amplicon.start, amplicon.reverse.start));
    ret
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anneal::Anneal;

    const TEMPLATE: &str = "ATGGCAGTTGAGAAGAAACCCGCTAAAGACAATTACATAACATACACGTCAGCACGAAACTGTTTTTGGTAAAAGGT";

    fn template(circular: bool) -> DNAsequence {
        let mut ret = DNAsequence::from_named_sequence("tpl", TEMPLATE).unwrap();
        ret.set_circular(circular);
        ret
    }

    fn rc(s: &str) -> String {
        String::from_utf8(IupacCode::reverse_complement_bytes(s.as_bytes())).unwrap()
    }

    fn products(primers: &[(&str, &str)], tpl: &DNAsequence) -> Vec<Amplicon> {
        let primers: Vec<Primer> = primers
            .iter()
            .map(|(name, seq)| Primer::new(name, seq).unwrap())
            .collect();
        Anneal::new(&primers, tpl, 12).products()
    }

    #[test]
    fn test_flanking_pair_copies_whole_template() {
        let tpl = template(false);
        let rev = rc(&TEMPLATE[61..]);
        let found = products(&[("f", &TEMPLATE[..16]), ("r", rev.as_str())], &tpl);
        assert_eq!(found.len(), 1);
        let amplicon = &found[0];
        assert_eq!(amplicon.product().get_forward_string(), TEMPLATE);
        assert_eq!(amplicon.size(), 77);
        assert_eq!(amplicon.start(), 0);
        assert_eq!(amplicon.end(), 77);
        assert_eq!(amplicon.name(), "77bp_PCR_prod");
        assert_eq!(amplicon.forward_primer().name(), "f");
        assert_eq!(amplicon.reverse_primer().name(), "r");
        assert_eq!(amplicon.template_name(), "tpl");
        assert!(!amplicon.product().is_circular());
    }

    #[test]
    fn test_tails_are_spliced_into_product() {
        let tpl = template(false);
        let fwd = format!("GGATCC{}", &TEMPLATE[..16]);
        let rev = format!("GAATTC{}", rc(&TEMPLATE[61..]));
        let found = products(&[("f", fwd.as_str()), ("r", rev.as_str())], &tpl);
        assert_eq!(found.len(), 1);
        let expected = format!("GGATCC{TEMPLATE}GAATTC");
        assert_eq!(found[0].product().get_forward_string(), expected);
        assert_eq!(found[0].size(), 89);
        assert_eq!(found[0].name(), "89bp_PCR_prod");
    }

    #[test]
    fn test_circular_product_wraps_origin() {
        let fwd = &TEMPLATE[50..66];
        let rev = rc(&TEMPLATE[5..21]);

        let found = products(&[("f", fwd), ("r", rev.as_str())], &template(true));
        assert_eq!(found.len(), 1);
        let expected = format!("{}{}", &TEMPLATE[50..], &TEMPLATE[..21]);
        assert_eq!(found[0].product().get_forward_string(), expected);
        assert_eq!(found[0].size(), 48);
        assert_eq!(found[0].start(), 50);
        assert_eq!(found[0].end(), 21);

        assert!(products(&[("f", fwd), ("r", rev.as_str())], &template(false)).is_empty());
    }

    #[test]
    fn test_circular_flanking_pair_spans_whole_template() {
        let rev = rc(&TEMPLATE[61..]);
        let found = products(&[("f", &TEMPLATE[..16]), ("r", rev.as_str())], &template(true));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].size(), 77);
    }

    #[test]
    fn test_products_ordered_by_size() {
        let rev = rc(&TEMPLATE[61..]);
        let found = products(
            &[("f1", &TEMPLATE[..16]), ("f2", &TEMPLATE[20..36]), ("r", rev.as_str())],
            &template(false),
        );
        let summary: Vec<(usize, usize)> = found.iter().map(|a| (a.size(), a.start())).collect();
        assert_eq!(summary, vec![(57, 20), (77, 0)]);
    }

    #[test]
    fn test_unpaired_sites_give_no_products() {
        let tpl = template(false);
        assert!(products(&[("f", &TEMPLATE[..16])], &tpl).is_empty());
        let rev = rc(&TEMPLATE[61..]);
        assert!(products(&[("r", rev.as_str())], &tpl).is_empty());
        assert!(build_amplicons(std::iter::empty(), &tpl).is_empty());
    }

    #[test]
    fn test_elongation_times_are_linear_in_length() {
        let tpl = template(false);
        let rev = rc(&TEMPLATE[61..]);
        let found = products(&[("f", &TEMPLATE[..16]), ("r", rev.as_str())], &tpl);
        let amplicon = &found[0];
        assert!((amplicon.taq_elongation_seconds() - (30.0 + 30.0 * 77.0 / 1000.0)).abs() < 1e-9);
        assert!(
            (amplicon.pfu_sso7d_elongation_seconds() - (10.0 + 15.0 * 77.0 / 1000.0)).abs() < 1e-9
        );
        assert!((amplicon.gc_fraction() - 30.0 / 77.0).abs() < 1e-12);
    }
}
