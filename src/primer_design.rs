use crate::{
    amplicon::Amplicon,
    anneal::{Anneal, AnnealingSite, Strand, find_sites},
    dna_sequence::DNAsequence,
    error::{PcrError, PcrResult},
    melting_temp::TmParameters,
    primer::Primer,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_TARGET_TM: f64 = 55.0;
pub const DEFAULT_MAX_PRIMER_LENGTH: usize = 60;

/// What a designed primer has to reach besides the homology limit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignTarget {
    /// Grow until this Tm in °C is reached; `None` stops at the homology limit.
    /// With a fixed primer `None` means "match the fixed primer".
    pub target_tm: Option<f64>,
    pub max_primer_length: usize,
}

impl Default for DesignTarget {
    fn default() -> Self {
        Self {
            target_tm: Some(DEFAULT_TARGET_TM),
            max_primer_length: DEFAULT_MAX_PRIMER_LENGTH,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Forward,
    Reverse,
}

/// Designs primers amplifying the whole of `template`.
///
/// Without `fixed` both primers are grown from the template ends. With `fixed`, the
/// primer has to anneal at the template start (forward role) or end (reverse role)
/// and only its partner is designed.
pub fn design(
    template: &DNAsequence,
    fixed: Option<&Primer>,
    min_homology: usize,
    target: &DesignTarget,
    params: &TmParameters,
) -> PcrResult<Amplicon> {
    let name = template.name_or("template");
    let forward_strand = template.forward().to_vec();
    let reverse_strand = template.reverse_complement().forward().to_vec();

    let (forward, reverse) = match fixed {
        None => {
            let f = grow(&forward_strand, min_homology, target.target_tm, target, params)?;
            let r = grow(&reverse_strand, min_homology, target.target_tm, target, params)?;
            (
                designed_primer(&format!("f{name}"), &forward_strand[..f])?,
                designed_primer(&format!("r{name}"), &reverse_strand[..r])?,
            )
        }
        Some(fixed) => {
            let (role, site) = fixed_role(fixed, template, min_homology)?;
            let target_tm = match target.target_tm {
                Some(tm) => tm,
                None => params.tm(fixed.three_prime_end(site.matched))?,
            };
            match role {
                Role::Forward => {
                    let r = grow(&reverse_strand, min_homology, Some(target_tm), target, params)?;
                    (
                        fixed.clone(),
                        designed_primer(&format!("r{name}"), &reverse_strand[..r])?,
                    )
                }
                Role::Reverse => {
                    let f = grow(&forward_strand, min_homology, Some(target_tm), target, params)?;
                    (
                        designed_primer(&format!("f{name}"), &forward_strand[..f])?,
                        fixed.clone(),
                    )
                }
            }
        }
    };

    let n = template.len();
    Anneal::new(&[forward, reverse], template, min_homology)
        .products()
        .into_iter()
        .find(|amplicon| amplicon.start() == 0 && amplicon.end() == n)
        .ok_or_else(|| {
            PcrError::no_annealing(format!(
                "Designed primers do not amplify {name} from end to end"
            ))
        })
}

fn designed_primer(name: &str, bases: &[u8]) -> PcrResult<Primer> {
    Primer::from_dna(name, DNAsequence::from_bases(bases)?)
}

/// Forward role wins when the primer anneals at both ends
fn fixed_role(
    fixed: &Primer,
    template: &DNAsequence,
    min_homology: usize,
) -> PcrResult<(Role, AnnealingSite)> {
    let sites = find_sites(fixed, template, min_homology);
    if let Some(site) = sites
        .iter()
        .find(|site| site.strand == Strand::Forward && site.start == 0)
    {
        return Ok((Role::Forward, site.clone()));
    }
    if let Some(site) = sites
        .iter()
        .find(|site| site.strand == Strand::Reverse && site.end() == template.len())
    {
        return Ok((Role::Reverse, site.clone()));
    }
    Err(PcrError::no_annealing(format!(
        "Primer {} anneals to neither end of {} with {} bases of homology",
        fixed.name(),
        template.name_or("template"),
        min_homology
    )))
}

/// Length of the primer taken from the start of `strand`: at least `min_homology`,
/// extended one base at a time until `target_tm` is reached, never beyond
/// `max_primer_length`. The first length reaching the target competes with the one
/// base shorter; whichever Tm lies closer to the target wins.
fn grow(
    strand: &[u8],
    min_homology: usize,
    target_tm: Option<f64>,
    target: &DesignTarget,
    params: &TmParameters,
) -> PcrResult<usize> {
    let shortest = min_homology.max(1);
    if shortest > strand.len() {
        return Err(PcrError::no_annealing(format!(
            "Homology limit {min_homology} is longer than the {} bp template",
            strand.len()
        )));
    }
    let longest = target.max_primer_length.min(strand.len());
    if shortest > longest {
        return Err(PcrError::no_annealing(format!(
            "Homology limit {min_homology} exceeds the maximum primer length {}",
            target.max_primer_length
        )));
    }
    let Some(target_tm) = target_tm else {
        return Ok(shortest);
    };

    let mut previous: Option<f64> = None;
    for length in shortest.max(2)..=longest {
        let tm = params.tm(&strand[..length])?;
        if tm >= target_tm {
            return Ok(match previous {
                Some(shorter) if (target_tm - shorter).abs() < (tm - target_tm).abs() => length - 1,
                _ => length,
            });
        }
        previous = Some(tm);
    }
    Err(PcrError::no_annealing(format!(
        "No primer up to {longest} bases reaches Tm {target_tm:.1}°C"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::ErrorCode, iupac_code::IupacCode};

    const TEMPLATE: &str = "ATGGCAGTTGAGAAGAAACCCGCTAAAGACAATTACATAACATACACGTCAGCACGAAACTGTTTTTGGTAAAAGGT";

    fn template() -> DNAsequence {
        DNAsequence::from_named_sequence("tpl", TEMPLATE).unwrap()
    }

    fn rc(s: &str) -> String {
        String::from_utf8(IupacCode::reverse_complement_bytes(s.as_bytes())).unwrap()
    }

    #[test]
    fn test_design_both_primers_to_target_tm() {
        let params = TmParameters::default();
        let amplicon = design(&template(), None, 12, &DesignTarget::default(), &params).unwrap();
        assert_eq!(amplicon.forward_primer().name(), "ftpl");
        assert_eq!(amplicon.reverse_primer().name(), "rtpl");
        // 18 bases (54.6°C) lie closer to 55°C than 19 bases do
        assert_eq!(amplicon.forward_primer().dna().get_forward_string(), "ATGGCAGTTGAGAAGAAA");
        assert_eq!(
            amplicon.reverse_primer().dna().get_forward_string(),
            "ACCTTTTACCAAAAACAGTT"
        );
        for primer in [amplicon.forward_primer(), amplicon.reverse_primer()] {
            let tm = params.tm(primer.bases()).unwrap();
            assert!((tm - DEFAULT_TARGET_TM).abs() < 0.5, "{primer} {tm}");
        }
        assert_eq!(amplicon.product().get_forward_string(), TEMPLATE);
    }

    #[test]
    fn test_design_round_trip() {
        let tpl = template();
        let amplicon = design(&tpl, None, 12, &DesignTarget::default(), &TmParameters::default())
            .unwrap();
        let primers = [
            amplicon.forward_primer().clone(),
            amplicon.reverse_primer().clone(),
        ];
        let again = Anneal::new(&primers, &tpl, 12).products();
        assert_eq!(again.len(), 1);
        assert_eq!(again[0].product(), amplicon.product());
    }

    #[test]
    fn test_design_without_tm_stops_at_homology_limit() {
        let target = DesignTarget {
            target_tm: None,
            ..DesignTarget::default()
        };
        let amplicon = design(&template(), None, 12, &target, &TmParameters::default()).unwrap();
        assert_eq!(amplicon.forward_primer().len(), 12);
        assert_eq!(amplicon.reverse_primer().len(), 12);
        assert_eq!(amplicon.size(), 77);
    }

    #[test]
    fn test_fixed_forward_primer_gets_matching_partner() {
        let params = TmParameters::default();
        let fixed = Primer::new("myfwd", &format!("GGATCC{}", &TEMPLATE[..16])).unwrap();
        let target = DesignTarget {
            target_tm: None,
            ..DesignTarget::default()
        };
        let amplicon = design(&template(), Some(&fixed), 12, &target, &params).unwrap();
        assert_eq!(amplicon.forward_primer().name(), "myfwd");
        assert_eq!(amplicon.reverse_primer().name(), "rtpl");
        assert_eq!(
            amplicon.reverse_primer().dna().get_forward_string(),
            "ACCTTTTACCAAAAACAG"
        );
        assert_eq!(
            amplicon.product().get_forward_string(),
            format!("GGATCC{TEMPLATE}")
        );
    }

    #[test]
    fn test_fixed_reverse_primer_gets_forward_partner() {
        let fixed = Primer::new("myrev", &rc(&TEMPLATE[61..])).unwrap();
        let target = DesignTarget {
            target_tm: None,
            ..DesignTarget::default()
        };
        let amplicon =
            design(&template(), Some(&fixed), 12, &target, &TmParameters::default()).unwrap();
        assert_eq!(amplicon.forward_primer().name(), "ftpl");
        assert_eq!(amplicon.reverse_primer().name(), "myrev");
        assert_eq!(
            amplicon.forward_primer().dna().get_forward_string(),
            "ATGGCAGTTGAGAA"
        );
        assert_eq!(amplicon.product().get_forward_string(), TEMPLATE);
    }

    #[test]
    fn test_fixed_primer_inside_template_is_rejected() {
        let fixed = Primer::new("inner", &TEMPLATE[20..36]).unwrap();
        let err = design(
            &template(),
            Some(&fixed),
            12,
            &DesignTarget::default(),
            &TmParameters::default(),
        )
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::NoAnnealing);
    }

    #[test]
    fn test_unreachable_targets_fail() {
        let params = TmParameters::default();
        let hot = DesignTarget {
            target_tm: Some(95.0),
            ..DesignTarget::default()
        };
        assert_eq!(
            design(&template(), None, 12, &hot, &params).unwrap_err().code,
            ErrorCode::NoAnnealing
        );
        assert_eq!(
            design(&template(), None, 100, &DesignTarget::default(), &params)
                .unwrap_err()
                .code,
            ErrorCode::NoAnnealing
        );
    }

    fn at_rich() -> Vec<u8> {
        format!("{}{}{}", "ATTAT".repeat(30), "GC".repeat(18), "TAATA".repeat(30)).into_bytes()
    }

    #[test]
    fn test_growth_stops_at_max_primer_length() {
        let params = TmParameters::default();
        let strand = at_rich();
        let capped = DesignTarget {
            target_tm: Some(60.0),
            max_primer_length: 60,
        };
        let err = grow(&strand, 12, capped.target_tm, &capped, &params).unwrap_err();
        assert_eq!(err.code, ErrorCode::NoAnnealing);

        let roomy = DesignTarget {
            max_primer_length: 200,
            ..capped
        };
        assert_eq!(grow(&strand, 12, roomy.target_tm, &roomy, &params).unwrap(), 80);

        let reachable = DesignTarget {
            target_tm: Some(55.0),
            ..capped
        };
        assert_eq!(grow(&strand, 12, reachable.target_tm, &reachable, &params).unwrap(), 48);

        let template =
            DNAsequence::from_named_sequence("at", &String::from_utf8(strand).unwrap()).unwrap();
        assert_eq!(
            design(&template, None, 12, &capped, &params).unwrap_err().code,
            ErrorCode::NoAnnealing
        );
    }

    #[test]
    fn test_homology_limit_above_max_primer_length() {
        let target = DesignTarget {
            target_tm: None,
            max_primer_length: 10,
        };
        let err = design(&template(), None, 12, &target, &TmParameters::default()).unwrap_err();
        assert_eq!(err.code, ErrorCode::NoAnnealing);
    }

    #[test]
    fn test_shorter_primer_wins_when_closer_to_target() {
        let params = TmParameters::default();
        let target = DesignTarget::default();
        let length = grow(TEMPLATE.as_bytes(), 12, Some(55.0), &target, &params).unwrap();
        assert_eq!(length, 18);
        let chosen = params.tm(&TEMPLATE.as_bytes()[..length]).unwrap();
        let longer = params.tm(&TEMPLATE.as_bytes()[..length + 1]).unwrap();
        assert!(chosen < 55.0);
        assert!(longer >= 55.0);
        assert!((55.0 - chosen).abs() < (longer - 55.0).abs());
    }
}
