use crate::{
    dna_sequence::gc_fraction,
    error::{PcrError, PcrResult},
    iupac_code::IupacCode,
    nn_tables::ThermodynamicTable,
    salt_correction::{Concentrations, SaltCorrection, SaltTerm},
};
use serde::{Deserialize, Serialize};

/// Gas constant in cal/K·mol
const R: f64 = 1.987;
const KELVIN: f64 = 273.15;

/// Everything the nearest-neighbor Tm depends on besides the sequence
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TmParameters {
    pub table: ThermodynamicTable,
    pub salt: SaltCorrection,
    pub concentrations: Concentrations,
    /// Reject ambiguous bases instead of skipping the stacks they are part of
    pub strict: bool,
}

impl Default for TmParameters {
    fn default() -> Self {
        Self::new(
            ThermodynamicTable::default(),
            SaltCorrection::default(),
            Concentrations::default(),
        )
    }
}

impl TmParameters {
    pub fn new(table: ThermodynamicTable, salt: SaltCorrection, concentrations: Concentrations) -> Self {
        Self {
            table,
            salt,
            concentrations,
            strict: true,
        }
    }

    pub fn tm(&self, seq: &[u8]) -> PcrResult<f64> {
        tm_nn(seq, self)
    }
}

/// Melting temperature in °C of `sequence` paired with its perfect complement,
/// ambiguous bases rejected.
pub fn melting_temperature(
    sequence: &[u8],
    table: ThermodynamicTable,
    salt: SaltCorrection,
    concentrations: &Concentrations,
) -> PcrResult<f64> {
    TmParameters::new(table, salt, *concentrations).tm(sequence)
}

/// ΔH (kcal/mol) and ΔS (cal/K·mol) of the duplex, before any salt correction
pub fn duplex_thermodynamics(seq: &[u8], params: &TmParameters) -> PcrResult<(f64, f64)> {
    let nn = params.table.parameters();
    let c_seq = IupacCode::complement_bytes(seq);
    let mut delta_h = 0.0;
    let mut delta_s = 0.0;
    let mut add = |(h, s): (f64, f64)| {
        delta_h += h;
        delta_s += s;
    };

    add(nn.term("init"));
    if gc_fraction(seq) == 0.0 {
        add(nn.term("init_allA/T"));
    } else {
        add(nn.term("init_oneG/C"));
    }
    if seq.first() == Some(&b'T') {
        add(nn.term("init_5T/A"));
    }
    if seq.last() == Some(&b'A') {
        add(nn.term("init_5T/A"));
    }
    for end in [seq[0], seq[seq.len() - 1]] {
        match end {
            b'A' | b'T' => add(nn.term("init_A/T")),
            b'G' | b'C' => add(nn.term("init_G/C")),
            _ => {}
        }
    }

    for (pair, comp) in seq.windows(2).zip(c_seq.windows(2)) {
        match nn.stack(pair, comp) {
            Some(thermo) => add(thermo),
            None if params.strict => {
                return Err(PcrError::invalid_sequence(format!(
                    "No nearest-neighbor parameters for {}/{}",
                    String::from_utf8_lossy(pair),
                    String::from_utf8_lossy(comp)
                )));
            }
            None => {}
        }
    }
    Ok((delta_h, delta_s))
}

fn tm_nn(seq: &[u8], params: &TmParameters) -> PcrResult<f64> {
    params.concentrations.validate()?;
    let seq = normalize(seq, params.strict)?;
    let (mut delta_h, mut delta_s) = duplex_thermodynamics(&seq, params)?;

    let conc = &params.concentrations;
    let mut k = (conc.dnac1 - conc.dnac2 / 2.0) * 1e-9;
    if seq == IupacCode::reverse_complement_bytes(&seq) {
        k = conc.dnac1 * 1e-9;
        let (h, s) = params.table.parameters().term("sym");
        delta_h += h;
        delta_s += s;
    }
    if k <= 0.0 {
        return Err(PcrError::invalid_configuration(format!(
            "Strand concentrations dnac1={} dnac2={} leave no duplex-forming strand",
            conc.dnac1, conc.dnac2
        )));
    }

    let salt = params.salt.term(conc, &seq);
    if let SaltTerm::Entropy(corr) = salt {
        delta_s += corr;
    }
    let mut tm = (1000.0 * delta_h) / (delta_s + R * k.ln()) - KELVIN;
    match salt {
        SaltTerm::Shift(corr) => tm += corr,
        SaltTerm::Reciprocal(corr) => tm = 1.0 / (1.0 / (tm + KELVIN) + corr) - KELVIN,
        SaltTerm::Entropy(_) => {}
    }
    Ok(tm)
}

/// Upper case, U read as T, at least one stack. Strict mode wants A/C/G/T only.
fn normalize(seq: &[u8], strict: bool) -> PcrResult<Vec<u8>> {
    let seq: Vec<u8> = seq
        .iter()
        .filter(|c| !c.is_ascii_whitespace())
        .map(|c| match c.to_ascii_uppercase() {
            b'U' => b'T',
            other => other,
        })
        .collect();
    if seq.len() < 2 {
        return Err(PcrError::invalid_sequence(
            "Melting temperature needs at least two bases",
        ));
    }
    for (i, c) in seq.iter().enumerate() {
        let known = if strict {
            IupacCode::is_unambiguous_letter(*c)
        } else {
            IupacCode::is_valid_letter(*c)
        };
        if !known {
            return Err(PcrError::invalid_sequence(format!(
                "Base '{}' at position {} not usable for melting temperature",
                char::from(*c),
                i + 1
            )));
        }
    }
    Ok(seq)
}
