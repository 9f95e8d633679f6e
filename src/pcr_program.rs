//! Thermocycler programs for an amplicon.
//!
//! Taq annealing temperature follows Rychlik et al. (1990), Nucleic Acids Res 18: 6409-6412.
//! Pfu-Sso7d fusion polymerases (Phusion and friends) anneal 3 °C above the lower primer
//! Tm when both primers are longer than 20 nt, and switch to a two-step program when
//! that reaches the extension temperature.

use crate::{amplicon::Amplicon, error::PcrResult, melting_temp::TmParameters};
use serde::{Deserialize, Serialize};
use std::fmt;

const EXTENSION_TEMPERATURE: f64 = 72.0;
const CYCLES: u32 = 30;
/// K+ concentration in mol/l assumed for the product melting temperature
const PRODUCT_TM_POTASSIUM: f64 = 0.050;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Polymerase {
    Taq,
    PfuSso7d,
}

impl Polymerase {
    pub const ALL: [Polymerase; 2] = [Self::Taq, Self::PfuSso7d];

    pub fn name(self) -> &'static str {
        match self {
            Self::Taq => "Taq DNA polymerase",
            Self::PfuSso7d => "Pfu-Sso7d DNA polymerase",
        }
    }

    pub fn seconds_per_kb(self) -> f64 {
        match self {
            Self::Taq => 30.0,
            Self::PfuSso7d => 15.0,
        }
    }

    pub fn overhead_seconds(self) -> f64 {
        match self {
            Self::Taq => 30.0,
            Self::PfuSso7d => 10.0,
        }
    }

    /// Extension time for a product of `length` bases
    pub fn elongation_seconds(self, length: usize) -> f64 {
        self.overhead_seconds() + self.seconds_per_kb() * length as f64 / 1000.0
    }

    fn denaturation_temperature(self) -> f64 {
        match self {
            Self::Taq => 95.0,
            Self::PfuSso7d => 98.0,
        }
    }

    fn initial_denaturation_seconds(self) -> f64 {
        match self {
            Self::Taq => 180.0,
            Self::PfuSso7d => 30.0,
        }
    }

    fn step_seconds(self) -> f64 {
        match self {
            Self::Taq => 30.0,
            Self::PfuSso7d => 10.0,
        }
    }

    fn final_extension_seconds(self) -> f64 {
        match self {
            Self::Taq => 300.0,
            Self::PfuSso7d => 600.0,
        }
    }
}

impl fmt::Display for Polymerase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub temperature: f64,
    pub seconds: f64,
}

impl Step {
    fn new(temperature: f64, seconds: f64) -> Self {
        Self {
            temperature,
            seconds,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:.1}°C {:.0} s", self.temperature, self.seconds)
    }
}

/// Basic melting temperature of a long product,
/// `81.5 + 16.6·log10[K+] + 0.41·%GC − 675/N`
pub fn product_tm(length: usize, gc_fraction: f64) -> f64 {
    let length = length.max(1) as f64;
    81.5 + 16.6 * PRODUCT_TM_POTASSIUM.log10() + 0.41 * gc_fraction * 100.0 - 675.0 / length
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PcrProgram {
    pub polymerase: Polymerase,
    pub initial_denaturation: Step,
    pub denaturation: Step,
    /// `None` for two-step programs, where annealing happens during extension
    pub annealing: Option<Step>,
    pub extension: Step,
    pub final_extension: Step,
    pub cycles: u32,
    pub tm_forward: f64,
    pub tm_reverse: f64,
    pub tm_product: f64,
    pub gc_fraction: f64,
    pub length: usize,
}

impl PcrProgram {
    /// Primer Tms are taken over the annealed footprints, not the 5' tails.
    pub fn for_amplicon(
        amplicon: &Amplicon,
        polymerase: Polymerase,
        params: &TmParameters,
    ) -> PcrResult<Self> {
        let forward = amplicon.forward_site();
        let reverse = amplicon.reverse_site();
        let tm_forward = params.tm(forward.primer.three_prime_end(forward.matched))?;
        let tm_reverse = params.tm(reverse.primer.three_prime_end(reverse.matched))?;
        let both_long = forward.primer.len() > 20 && reverse.primer.len() > 20;
        Ok(Self::new(
            polymerase,
            tm_forward,
            tm_reverse,
            both_long,
            amplicon.len(),
            amplicon.gc_fraction(),
        ))
    }

    pub fn new(
        polymerase: Polymerase,
        tm_forward: f64,
        tm_reverse: f64,
        both_primers_long: bool,
        length: usize,
        gc_fraction: f64,
    ) -> Self {
        let tm_min = tm_forward.min(tm_reverse);
        let tm_product = product_tm(length, gc_fraction);
        let ta = match polymerase {
            Polymerase::Taq => 0.3 * tm_min + 0.7 * tm_product - 14.9,
            Polymerase::PfuSso7d if both_primers_long => tm_min + 3.0,
            Polymerase::PfuSso7d => tm_min,
        };
        let step = polymerase.step_seconds();
        let annealing = match polymerase {
            Polymerase::PfuSso7d if ta >= EXTENSION_TEMPERATURE => None,
            _ => Some(Step::new(ta, step)),
        };
        let denaturation = polymerase.denaturation_temperature();
        Self {
            polymerase,
            initial_denaturation: Step::new(denaturation, polymerase.initial_denaturation_seconds()),
            denaturation: Step::new(denaturation, step),
            annealing,
            extension: Step::new(EXTENSION_TEMPERATURE, polymerase.elongation_seconds(length)),
            final_extension: Step::new(EXTENSION_TEMPERATURE, polymerase.final_extension_seconds()),
            cycles: CYCLES,
            tm_forward,
            tm_reverse,
            tm_product,
            gc_fraction,
            length,
        }
    }

    pub fn is_two_step(&self) -> bool {
        self.annealing.is_none()
    }
}

impl fmt::Display for PcrProgram {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.polymerase)?;
        writeln!(f, "{}", self.initial_denaturation)?;
        write!(f, "{} cycles: {}", self.cycles, self.denaturation)?;
        if let Some(annealing) = &self.annealing {
            write!(f, " | {annealing}")?;
        }
        writeln!(f, " | {}", self.extension)?;
        writeln!(f, "{}", self.final_extension)?;
        write!(
            f,
            "tmf:{:.1} tmr:{:.1} GC {:.0}% {}bp",
            self.tm_forward,
            self.tm_reverse,
            self.gc_fraction * 100.0,
            self.length
        )
    }
}
