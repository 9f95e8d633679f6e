use crate::{
    error::{ErrorCode, PcrError, PcrResult},
    melting_temp::TmParameters,
    nn_tables::ThermodynamicTable,
    primer_design::{DEFAULT_MAX_PRIMER_LENGTH, DEFAULT_TARGET_TM, DesignTarget},
    salt_correction::{Concentrations, SaltCorrection},
};
use serde::{Deserialize, Serialize};

/// Request settings as users write them: integer selectors and flat concentrations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PcrParameters {
    /// Nearest-neighbor table, 1-4
    pub table: u8,
    /// Salt correction, 1-7
    pub salt: u8,
    pub na: f64,
    pub k: f64,
    pub tris: f64,
    pub mg: f64,
    pub dntps: f64,
    pub dnac1: f64,
    pub dnac2: f64,
    pub strict: bool,
    pub homology_limit: usize,
    /// Products listed in detail only up to this count
    pub detail_cutoff: usize,
    pub target_tm: f64,
    pub max_primer_length: usize,
}

impl Default for PcrParameters {
    fn default() -> Self {
        let conc = Concentrations::default();
        Self {
            table: ThermodynamicTable::default().id(),
            salt: SaltCorrection::default().id(),
            na: conc.na,
            k: conc.k,
            tris: conc.tris,
            mg: conc.mg,
            dntps: conc.dntps,
            dnac1: conc.dnac1,
            dnac2: conc.dnac2,
            strict: true,
            homology_limit: 12,
            detail_cutoff: 5,
            target_tm: DEFAULT_TARGET_TM,
            max_primer_length: DEFAULT_MAX_PRIMER_LENGTH,
        }
    }
}

impl PcrParameters {
    pub fn load_from_path(path: &str) -> PcrResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            PcrError::new(
                ErrorCode::Io,
                format!("Could not read parameter file '{path}': {e}"),
            )
        })?;
        let ret: Self = serde_json::from_str(&text).map_err(|e| {
            PcrError::invalid_configuration(format!("Could not parse parameter JSON '{path}': {e}"))
        })?;
        ret.validate()?;
        Ok(ret)
    }

    pub fn save_to_path(&self, path: &str) -> PcrResult<()> {
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text).map_err(|e| {
            PcrError::new(
                ErrorCode::Io,
                format!("Could not write parameter file '{path}': {e}"),
            )
        })
    }

    pub fn concentrations(&self) -> Concentrations {
        Concentrations {
            na: self.na,
            k: self.k,
            tris: self.tris,
            mg: self.mg,
            dntps: self.dntps,
            dnac1: self.dnac1,
            dnac2: self.dnac2,
        }
    }

    pub fn tm_parameters(&self) -> PcrResult<TmParameters> {
        let concentrations = self.concentrations();
        concentrations.validate()?;
        Ok(TmParameters {
            table: ThermodynamicTable::try_from(self.table)?,
            salt: SaltCorrection::try_from(self.salt)?,
            concentrations,
            strict: self.strict,
        })
    }

    pub fn design_target(&self) -> DesignTarget {
        DesignTarget {
            target_tm: Some(self.target_tm),
            max_primer_length: self.max_primer_length,
        }
    }

    pub fn validate(&self) -> PcrResult<()> {
        self.tm_parameters()?;
        if self.homology_limit == 0 {
            return Err(PcrError::invalid_configuration(
                "homology_limit must be >= 1",
            ));
        }
        if !self.target_tm.is_finite() {
            return Err(PcrError::invalid_configuration(format!(
                "target_tm must be a number, got {}",
                self.target_tm
            )));
        }
        Ok(())
    }

    /// Sets one field by name, the value given as JSON
    pub fn set_parameter(&mut self, name: &str, value: &serde_json::Value) -> PcrResult<()> {
        let number = || {
            value.as_f64().ok_or_else(|| {
                PcrError::invalid_configuration(format!("Parameter '{name}' requires a number"))
            })
        };
        let integer = || {
            value.as_u64().ok_or_else(|| {
                PcrError::invalid_configuration(format!(
                    "Parameter '{name}' requires a non-negative integer"
                ))
            })
        };
        let mut updated = self.clone();
        match name {
            "table" => updated.table = small_selector(name, integer()?)?,
            "salt" => updated.salt = small_selector(name, integer()?)?,
            "na" => updated.na = number()?,
            "k" => updated.k = number()?,
            "tris" => updated.tris = number()?,
            "mg" => updated.mg = number()?,
            "dntps" => updated.dntps = number()?,
            "dnac1" => updated.dnac1 = number()?,
            "dnac2" => updated.dnac2 = number()?,
            "strict" => {
                updated.strict = value.as_bool().ok_or_else(|| {
                    PcrError::invalid_configuration("Parameter 'strict' requires true or false")
                })?
            }
            "homology_limit" => updated.homology_limit = integer()? as usize,
            "detail_cutoff" => updated.detail_cutoff = integer()? as usize,
            "target_tm" => updated.target_tm = number()?,
            "max_primer_length" => updated.max_primer_length = integer()? as usize,
            _ => {
                return Err(PcrError::invalid_configuration(format!(
                    "Unknown parameter '{name}'"
                )));
            }
        }
        updated.validate()?;
        *self = updated;
        Ok(())
    }
}

fn small_selector(name: &str, raw: u64) -> PcrResult<u8> {
    u8::try_from(raw).map_err(|_| {
        PcrError::invalid_configuration(format!("Parameter '{name}' out of range: {raw}"))
    })
}
