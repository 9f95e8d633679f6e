use crate::{
    amplicon::{Amplicon, build_amplicons},
    dna_sequence::DNAsequence,
    iupac_code::IupacCode,
    primer::Primer,
};
use bio::pattern_matching::horspool::Horspool;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, collections::BTreeSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Strand {
    /// Primer has the template's forward-strand sequence and extends to the right
    Forward,
    /// Primer binds the forward strand and extends to the left
    Reverse,
}

/// Where the 3' end of a primer binds a template.
///
/// `start` and `length` describe the annealed footprint in forward-strand coordinates;
/// on circular templates `start + length` may run past the origin. The footprint is an
/// exact match anchored at the primer's 3' end, so `matched == length` and every primer
/// base beyond it (`overhang`) hangs off as a 5' tail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnealingSite {
    pub primer: Primer,
    pub strand: Strand,
    pub start: usize,
    pub length: usize,
    pub matched: usize,
    pub overhang: usize,
}

impl AnnealingSite {
    /// Exclusive end of the footprint, unwrapped
    pub fn end(&self) -> usize {
        self.start + self.length
    }

    /// Template position paired with the primer's 3'-terminal base, unwrapped
    pub fn three_prime_position(&self) -> usize {
        match self.strand {
            Strand::Forward => self.end() - 1,
            Strand::Reverse => self.start,
        }
    }

    /// Primer bases not present in the template, 5'->3' as in the primer
    pub fn tail(&self) -> &[u8] {
        self.primer.tail(self.matched)
    }

    fn key(&self) -> (Strand, usize, &str) {
        (self.strand, self.start, self.primer.name())
    }
}

impl PartialEq for AnnealingSite {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for AnnealingSite {}

impl PartialOrd for AnnealingSite {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for AnnealingSite {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

/// Template bytes to search in; circular templates get their first bases appended so
/// that a core spanning the origin is found once, at its real start.
fn searchable_template(template: &DNAsequence, core_len: usize) -> Vec<u8> {
    let mut ret = template.forward().to_vec();
    if template.is_circular() {
        let extra = core_len.saturating_sub(1).min(template.len());
        ret.extend_from_slice(&template.forward()[..extra]);
    }
    ret
}

/// Grows the footprint from `core_len` towards the primer's 5' end while bases keep
/// pairing. `step` is -1 when the primer reads along the forward strand, +1 when it
/// reads along the reverse strand.
fn footprint_length(
    primer: &Primer,
    template: &DNAsequence,
    three_prime: isize,
    core_len: usize,
    strand: Strand,
) -> usize {
    let bases = primer.bases();
    let limit = bases.len().min(template.len());
    let mut footprint = core_len;
    while footprint < limit {
        let primer_base = bases[bases.len() - 1 - footprint];
        let (template_pos, expected) = match strand {
            Strand::Forward => (three_prime - footprint as isize, primer_base),
            Strand::Reverse => (
                three_prime + footprint as isize,
                IupacCode::letter_complement(primer_base),
            ),
        };
        match template.get_base_safe(template_pos) {
            Some(base) if base == expected => footprint += 1,
            _ => break,
        }
    }
    footprint
}

/// All places where the 3'-terminal `min_homology` bases of `primer` match `template`
/// exactly, on either strand. An empty set means the primer does not anneal.
pub fn find_sites(
    primer: &Primer,
    template: &DNAsequence,
    min_homology: usize,
) -> BTreeSet<AnnealingSite> {
    let core_len = min_homology.max(1);
    let mut ret = BTreeSet::new();
    if primer.len() < core_len || template.len() < core_len {
        return ret;
    }

    let haystack = searchable_template(template, core_len);
    let core = primer.three_prime_end(core_len);
    let core_rc = IupacCode::reverse_complement_bytes(core);

    for (strand, pattern) in [(Strand::Forward, core.to_vec()), (Strand::Reverse, core_rc)] {
        let matcher = Horspool::new(&pattern);
        for pos in matcher.find_all(&haystack).filter(|pos| *pos < template.len()) {
            let three_prime = match strand {
                Strand::Forward => (pos + core_len - 1) as isize,
                Strand::Reverse => pos as isize,
            };
            let footprint = footprint_length(primer, template, three_prime, core_len, strand);
            let start = match strand {
                Strand::Forward => template.wrap_position(three_prime + 1 - footprint as isize),
                Strand::Reverse => Some(pos),
            };
            let Some(start) = start else {
                continue;
            };
            ret.insert(AnnealingSite {
                primer: primer.clone(),
                strand,
                start,
                length: footprint,
                matched: footprint,
                overhang: primer.len() - footprint,
            });
        }
    }
    ret
}

/// Annealing of a primer set to one template, with the products it would give.
#[derive(Debug, Clone)]
pub struct Anneal {
    template: DNAsequence,
    limit: usize,
    primer_names: Vec<String>,
    forward_sites: Vec<AnnealingSite>,
    reverse_sites: Vec<AnnealingSite>,
}

impl Anneal {
    pub fn new(primers: &[Primer], template: &DNAsequence, limit: usize) -> Self {
        let sites: Vec<AnnealingSite> = primers
            .par_iter()
            .map(|primer| find_sites(primer, template, limit))
            .collect::<Vec<_>>()
            .into_iter()
            .flatten()
            .collect();
        let (forward_sites, reverse_sites) = sites
            .into_iter()
            .partition(|site| site.strand == Strand::Forward);
        Self {
            template: template.clone(),
            limit,
            primer_names: primers.iter().map(|p| p.name().to_string()).collect(),
            forward_sites,
            reverse_sites,
        }
    }

    pub fn template(&self) -> &DNAsequence {
        &self.template
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn forward_sites(&self) -> &[AnnealingSite] {
        &self.forward_sites
    }

    pub fn reverse_sites(&self) -> &[AnnealingSite] {
        &self.reverse_sites
    }

    pub fn sites(&self) -> impl Iterator<Item = &AnnealingSite> {
        self.forward_sites.iter().chain(self.reverse_sites.iter())
    }

    pub fn products(&self) -> Vec<Amplicon> {
        build_amplicons(self.sites(), &self.template)
    }

    /// Plain-text summary of where each primer anneals, one line each
    pub fn report(&self) -> String {
        let mut lines = vec![format!(
            "Template {} {} bp {} limit={}:",
            self.template.name_or("template"),
            self.template.len(),
            if self.template.is_circular() { "circular" } else { "linear" },
            self.limit
        )];
        if self.forward_sites.is_empty() {
            lines.push("No forward primers anneal...".to_string());
        }
        lines.extend(self.forward_sites.iter().map(|site| {
            format!(
                "Primer {} anneals forward (--->) at {}",
                site.primer.name(),
                self.template.wrap_position(site.three_prime_position() as isize).unwrap_or(0)
            )
        }));
        if self.reverse_sites.is_empty() {
            lines.push("No reverse primers anneal...".to_string());
        }
        lines.extend(self.reverse_sites.iter().map(|site| {
            format!(
                "Primer {} anneals reverse (<---) at {}",
                site.primer.name(),
                site.three_prime_position()
            )
        }));
        let silent: Vec<&str> = self
            .primer_names
            .iter()
            .filter(|name| !self.sites().any(|site| site.primer.name() == name.as_str()))
            .map(|name| name.as_str())
            .collect();
        if !silent.is_empty() {
            lines.push(format!("Not annealing: {}", silent.join(", ")));
        }
        lines.iter().map(|line| format!("{line}\n")).collect()
    }
}
