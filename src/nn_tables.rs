//! Nearest-neighbor enthalpy and entropy parameters for DNA/DNA duplexes.
//!
//! Values are (ΔH kcal/mol, ΔS cal/K·mol). Stacks are keyed `XY/X'Y'`, the upper
//! strand dinucleotide 5'->3' over its complement 3'->5'.

use crate::error::{PcrError, PcrResult};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt};

pub type Thermo = (f64, f64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ThermodynamicTable {
    Breslauer1986,
    Sugimoto1996,
    AllawiSantaLucia1997,
    #[default]
    SantaLuciaHicks2004,
}

impl ThermodynamicTable {
    pub const ALL: [ThermodynamicTable; 4] = [
        Self::Breslauer1986,
        Self::Sugimoto1996,
        Self::AllawiSantaLucia1997,
        Self::SantaLuciaHicks2004,
    ];

    pub fn id(self) -> u8 {
        match self {
            Self::Breslauer1986 => 1,
            Self::Sugimoto1996 => 2,
            Self::AllawiSantaLucia1997 => 3,
            Self::SantaLuciaHicks2004 => 4,
        }
    }

    pub fn reference(self) -> &'static str {
        match self {
            Self::Breslauer1986 => {
                "DNA_NN1 - Breslauer et al. (1986), Proc Natl Acad Sci USA 83: 3746-3750"
            }
            Self::Sugimoto1996 => "DNA_NN2 - Sugimoto et al. (1996), Nuc Acids Res 24: 4501-4505",
            Self::AllawiSantaLucia1997 => {
                "DNA_NN3 - Allawi and SantaLucia (1997), Biochemistry 36: 10581-10594"
            }
            Self::SantaLuciaHicks2004 => {
                "DNA_NN4 - SantaLucia & Hicks (2004), Annu. Rev. Biophys. Biomol. Struct 33: 415-440"
            }
        }
    }

    pub fn parameters(self) -> &'static NnParameters {
        match self {
            Self::Breslauer1986 => &DNA_NN1,
            Self::Sugimoto1996 => &DNA_NN2,
            Self::AllawiSantaLucia1997 => &DNA_NN3,
            Self::SantaLuciaHicks2004 => &DNA_NN4,
        }
    }
}

impl TryFrom<u8> for ThermodynamicTable {
    type Error = PcrError;

    fn try_from(value: u8) -> PcrResult<Self> {
        Self::ALL
            .into_iter()
            .find(|table| table.id() == value)
            .ok_or_else(|| {
                PcrError::invalid_configuration(format!(
                    "Unknown nearest-neighbor table {value}, expected 1-4"
                ))
            })
    }
}

impl fmt::Display for ThermodynamicTable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.reference())
    }
}

#[derive(Debug, Clone, Default)]
pub struct NnParameters {
    values: HashMap<Vec<u8>, Thermo>,
}

impl NnParameters {
    fn from_rows(rows: &[(&[u8], Thermo)]) -> Self {
        Self {
            values: rows.iter().map(|(k, v)| (k.to_vec(), *v)).collect(),
        }
    }

    /// Initiation and symmetry terms; absent terms contribute nothing
    pub fn term(&self, name: &str) -> Thermo {
        self.values
            .get(name.as_bytes())
            .copied()
            .unwrap_or((0.0, 0.0))
    }

    /// Looks up the stack of `pair` over `complement`, also in the reversed orientation
    pub fn stack(&self, pair: &[u8], complement: &[u8]) -> Option<Thermo> {
        let key: Vec<u8> = pair
            .iter()
            .chain(b"/".iter())
            .chain(complement.iter())
            .copied()
            .collect();
        self.values.get(&key).copied().or_else(|| {
            let reversed: Vec<u8> = key.iter().rev().copied().collect();
            self.values.get(&reversed).copied()
        })
    }
}

// Breslauer et al. (1986), Proc Natl Acad Sci USA 83: 3746-3750
static RAW_DNA_NN1: [(&[u8], Thermo); 17] = [
    (b"init", (0.0, 0.0)),
    (b"init_A/T", (0.0, 0.0)),
    (b"init_G/C", (0.0, 0.0)),
    (b"init_oneG/C", (0.0, -16.8)),
    (b"init_allA/T", (0.0, -20.1)),
    (b"init_5T/A", (0.0, 0.0)),
    (b"sym", (0.0, -1.3)),
    (b"AA/TT", (-9.1, -24.0)),
    (b"AT/TA", (-8.6, -23.9)),
    (b"TA/AT", (-6.0, -16.9)),
    (b"CA/GT", (-5.8, -12.9)),
    (b"GT/CA", (-6.5, -17.3)),
    (b"CT/GA", (-7.8, -20.8)),
    (b"GA/CT", (-5.6, -13.5)),
    (b"CG/GC", (-11.9, -27.8)),
    (b"GC/CG", (-11.1, -26.7)),
    (b"GG/CC", (-11.0, -26.6)),
];

// Sugimoto et al. (1996), Nuc Acids Res 24: 4501-4505
static RAW_DNA_NN2: [(&[u8], Thermo); 17] = [
    (b"init", (0.6, -9.0)),
    (b"init_A/T", (0.0, 0.0)),
    (b"init_G/C", (0.0, 0.0)),
    (b"init_oneG/C", (0.0, 0.0)),
    (b"init_allA/T", (0.0, 0.0)),
    (b"init_5T/A", (0.0, 0.0)),
    (b"sym", (0.0, -1.4)),
    (b"AA/TT", (-8.0, -21.9)),
    (b"AT/TA", (-5.6, -15.2)),
    (b"TA/AT", (-6.6, -18.4)),
    (b"CA/GT", (-8.2, -21.0)),
    (b"GT/CA", (-9.4, -25.5)),
    (b"CT/GA", (-6.6, -16.4)),
    (b"GA/CT", (-8.8, -23.5)),
    (b"CG/GC", (-11.8, -29.0)),
    (b"GC/CG", (-10.5, -26.4)),
    (b"GG/CC", (-10.9, -28.4)),
];

// Allawi and SantaLucia (1997), Biochemistry 36: 10581-10594
static RAW_DNA_NN3: [(&[u8], Thermo); 17] = [
    (b"init", (0.0, 0.0)),
    (b"init_A/T", (2.3, 4.1)),
    (b"init_G/C", (0.1, -2.8)),
    (b"init_oneG/C", (0.0, 0.0)),
    (b"init_allA/T", (0.0, 0.0)),
    (b"init_5T/A", (0.0, 0.0)),
    (b"sym", (0.0, -1.4)),
    (b"AA/TT", (-7.9, -22.2)),
    (b"AT/TA", (-7.2, -20.4)),
    (b"TA/AT", (-7.2, -21.3)),
    (b"CA/GT", (-8.5, -22.7)),
    (b"GT/CA", (-8.4, -22.4)),
    (b"CT/GA", (-7.8, -21.0)),
    (b"GA/CT", (-8.2, -22.2)),
    (b"CG/GC", (-10.6, -27.2)),
    (b"GC/CG", (-9.8, -24.4)),
    (b"GG/CC", (-8.0, -19.9)),
];

// SantaLucia & Hicks (2004), Annu. Rev. Biophys. Biomol. Struct 33: 415-440
static RAW_DNA_NN4: [(&[u8], Thermo); 17] = [
    (b"init", (0.2, -5.7)),
    (b"init_A/T", (2.2, 6.9)),
    (b"init_G/C", (0.0, 0.0)),
    (b"init_oneG/C", (0.0, 0.0)),
    (b"init_allA/T", (0.0, 0.0)),
    (b"init_5T/A", (0.0, 0.0)),
    (b"sym", (0.0, -1.4)),
    (b"AA/TT", (-7.6, -21.3)),
    (b"AT/TA", (-7.2, -20.4)),
    (b"TA/AT", (-7.2, -20.4)),
    (b"CA/GT", (-8.5, -22.7)),
    (b"GT/CA", (-8.4, -22.4)),
    (b"CT/GA", (-7.8, -21.0)),
    (b"GA/CT", (-8.2, -22.2)),
    (b"CG/GC", (-10.6, -27.2)),
    (b"GC/CG", (-9.8, -24.4)),
    (b"GG/CC", (-8.0, -19.0)),
];

lazy_static! {
    static ref DNA_NN1: NnParameters = NnParameters::from_rows(&RAW_DNA_NN1);
    static ref DNA_NN2: NnParameters = NnParameters::from_rows(&RAW_DNA_NN2);
    static ref DNA_NN3: NnParameters = NnParameters::from_rows(&RAW_DNA_NN3);
    static ref DNA_NN4: NnParameters = NnParameters::from_rows(&RAW_DNA_NN4);
}
