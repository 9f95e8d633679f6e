use crate::{
    dna_sequence::gc_fraction,
    error::{PcrError, PcrResult},
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ion and strand concentrations. Ions are millimolar, strands nanomolar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Concentrations {
    pub na: f64,
    pub k: f64,
    pub tris: f64,
    pub mg: f64,
    pub dntps: f64,
    pub dnac1: f64,
    pub dnac2: f64,
}

impl Default for Concentrations {
    /// 10X Taq buffer with (NH4)2SO4, 1.5 mM Mg2+, 200 µM of each dNTP, 500 nM primer
    fn default() -> Self {
        Self {
            na: 40.0,
            k: 0.0,
            tris: 75.0,
            mg: 1.5,
            dntps: 0.8,
            dnac1: 250.0,
            dnac2: 250.0,
        }
    }
}

impl Concentrations {
    pub fn validate(&self) -> PcrResult<()> {
        let fields = [
            ("Na", self.na),
            ("K", self.k),
            ("Tris", self.tris),
            ("Mg", self.mg),
            ("dNTPs", self.dntps),
            ("dnac1", self.dnac1),
            ("dnac2", self.dnac2),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(PcrError::invalid_configuration(format!(
                    "{name} concentration must be a non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Monovalent cations in mM: Na+ + K+ + Tris/2, plus the von Ahsen et al. (2001)
    /// sodium equivalent of free Mg2+ when asked for
    pub fn monovalent_mm(&self, with_mg_equivalent: bool) -> f64 {
        let mut mon = self.na + self.k + self.tris / 2.0;
        let anything_but_na = self.k + self.mg + self.tris + self.dntps > 0.0;
        // dNTPs bind Mg2+ strongly; once they outnumber it free Mg2+ is irrelevant
        if with_mg_equivalent && anything_but_na && self.dntps < self.mg {
            mon += 120.0 * (self.mg - self.dntps).sqrt();
        }
        mon
    }
}

/// How the melting temperature is corrected for ionic strength. Exactly one applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SaltCorrection {
    /// 16.6 x log[Na+], Schildkraut & Lifson (1965), Biopolymers 3: 195-208
    SchildkrautLifson1965,
    /// 16.6 x log([Na+]/(1.0 + 0.7*[Na+])), Wetmur (1991), Crit Rev Biochem Mol Biol 126: 227-259
    Wetmur1991,
    /// 12.5 x log[Na+], SantaLucia et al. (1996), Biochemistry 35: 3555-3562
    SantaLucia1996,
    /// 11.7 x log[Na+], SantaLucia (1998), Proc Natl Acad Sci USA 95: 1460-1465
    SantaLucia1998,
    /// 0.368 x (N-1) x ln[Na+] on deltaS, SantaLucia (1998), Proc Natl Acad Sci USA 95: 1460-1465
    SantaLucia1998Entropy,
    /// (4.29(%GC)-3.95)x1e-5 x ln[Na+] + 9.40e-6 x ln[Na+]^2, Owczarzy et al. (2004), Biochemistry 43: 3537-3554
    Owczarzy2004,
    /// Mg2+/dNTP/monovalent decision tree, Owczarzy et al. (2008), Biochemistry 47: 5336-5353
    #[default]
    Owczarzy2008,
}

/// Where a correction value enters the two-state equation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SaltTerm {
    /// Added to Tm in °C
    Shift(f64),
    /// Added to ΔS in cal/K·mol
    Entropy(f64),
    /// Added to 1/Tm in 1/K
    Reciprocal(f64),
}

impl SaltCorrection {
    pub const ALL: [SaltCorrection; 7] = [
        Self::SchildkrautLifson1965,
        Self::Wetmur1991,
        Self::SantaLucia1996,
        Self::SantaLucia1998,
        Self::SantaLucia1998Entropy,
        Self::Owczarzy2004,
        Self::Owczarzy2008,
    ];

    pub fn id(self) -> u8 {
        match self {
            Self::SchildkrautLifson1965 => 1,
            Self::Wetmur1991 => 2,
            Self::SantaLucia1996 => 3,
            Self::SantaLucia1998 => 4,
            Self::SantaLucia1998Entropy => 5,
            Self::Owczarzy2004 => 6,
            Self::Owczarzy2008 => 7,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::SchildkrautLifson1965 => {
                "16.6 x log[Na+] (Schildkraut & Lifson (1965), Biopolymers 3: 195-208)"
            }
            Self::Wetmur1991 => {
                "16.6 x log([Na+]/(1.0 + 0.7*[Na+])) (Wetmur (1991), Crit Rev Biochem Mol Biol 126: 227-259)"
            }
            Self::SantaLucia1996 => {
                "12.5 x log[Na+] (SantaLucia et al. (1996), Biochemistry 35: 3555-3562)"
            }
            Self::SantaLucia1998 => {
                "11.7 x log[Na+] (SantaLucia (1998), Proc Natl Acad Sci USA 95: 1460-1465)"
            }
            Self::SantaLucia1998Entropy => {
                "Correction for deltaS: 0.368 x (N-1) x ln[Na+] (SantaLucia (1998), Proc Natl Acad Sci USA 95: 1460-1465)"
            }
            Self::Owczarzy2004 => {
                "(4.29(%GC)-3.95)x1e-5 x ln[Na+] + 9.40e-6 x ln[Na+]^2 (Owczarzy et al. (2004), Biochemistry 43: 3537-3554)"
            }
            Self::Owczarzy2008 => "Complex formula with decision tree and 7 empirical constants",
        }
    }

    /// Correction for `seq` (upper case, at least two bases) under `conc`.
    /// No ions at all means no correction.
    pub fn term(self, conc: &Concentrations, seq: &[u8]) -> SaltTerm {
        let with_mg_equivalent = self != Self::Owczarzy2008;
        let mon = conc.monovalent_mm(with_mg_equivalent) * 1e-3;
        let value = if self == Self::Owczarzy2008 {
            owczarzy_2008(conc, mon, seq)
        } else if mon <= 0.0 {
            0.0
        } else {
            match self {
                Self::SchildkrautLifson1965 => 16.6 * mon.log10(),
                Self::Wetmur1991 => 16.6 * (mon / (1.0 + 0.7 * mon)).log10(),
                Self::SantaLucia1996 => 12.5 * mon.log10(),
                Self::SantaLucia1998 => 11.7 * mon.log10(),
                Self::SantaLucia1998Entropy => 0.368 * (seq.len() as f64 - 1.0) * mon.ln(),
                Self::Owczarzy2004 | Self::Owczarzy2008 => owczarzy_2004(mon, gc_fraction(seq)),
            }
        };
        match self {
            Self::SantaLucia1998Entropy => SaltTerm::Entropy(value),
            Self::Owczarzy2004 | Self::Owczarzy2008 => SaltTerm::Reciprocal(value),
            _ => SaltTerm::Shift(value),
        }
    }
}

fn owczarzy_2004(mon: f64, gc: f64) -> f64 {
    let ln_mon = mon.ln();
    (4.29 * gc - 3.95) * 1e-5 * ln_mon + 9.40e-6 * ln_mon.powi(2)
}

/// `mon` in molar, Mg2+ and dNTPs taken from `conc`
fn owczarzy_2008(conc: &Concentrations, mon: f64, seq: &[u8]) -> f64 {
    let (mut a, b, c, mut d) = (3.92, -0.911, 6.26, 1.42);
    let (e, f, mut g) = (-48.2, 52.5, 8.31);
    let gc = gc_fraction(seq);

    let mut mg = conc.mg * 1e-3;
    if conc.dntps > 0.0 {
        // Free Mg2+ left over from Mg:dNTP complex formation
        let dntps = conc.dntps * 1e-3;
        let ka = 3e4;
        let p = ka * dntps - ka * mg + 1.0;
        mg = (-p + (p.powi(2) + 4.0 * ka * mg).sqrt()) / (2.0 * ka);
    }
    if mon > 0.0 {
        let ratio = mg.sqrt() / mon;
        if ratio < 0.22 {
            return owczarzy_2004(mon, gc);
        } else if ratio < 6.0 {
            let ln_mon = mon.ln();
            a = 3.92 * (0.843 - 0.352 * mon.sqrt() * ln_mon);
            d = 1.42 * (1.279 - 4.03e-3 * ln_mon - 8.03e-3 * ln_mon.powi(2));
            g = 8.31 * (0.486 - 0.258 * ln_mon + 5.25e-3 * ln_mon.powi(3));
        }
    }
    if mg <= 0.0 {
        return 0.0;
    }
    let ln_mg = mg.ln();
    let length_term = 1.0 / (2.0 * (seq.len() as f64 - 1.0));
    (a + b * ln_mg + gc * (c + d * ln_mg) + length_term * (e + f * ln_mg + g * ln_mg.powi(2)))
        * 1e-5
}

impl TryFrom<u8> for SaltCorrection {
    type Error = PcrError;

    fn try_from(value: u8) -> PcrResult<Self> {
        Self::ALL
            .into_iter()
            .find(|salt| salt.id() == value)
            .ok_or_else(|| {
                PcrError::invalid_configuration(format!(
                    "Unknown salt correction {value}, expected 1-7"
                ))
            })
    }
}

impl fmt::Display for SaltCorrection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}. {}", self.id(), self.description())
    }
}
