use serde::{Deserialize, Serialize};

use crate::error::{Result, SdcError};

pub const UCUM_URI: &str = "http://unitsofmeasure.org";

/// Code system recorded for questions whose code falls back to their linkId.
pub const LINK_ID_CODE_SYSTEM: &str = "LinkId";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SdcConfig {
    pub fhir_version: FhirVersion,
    pub link_id_code_system: String,
    pub unit_config: UnitConfig,
    pub prefetch_config: PrefetchConfig,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum FhirVersion {
    #[serde(rename = "3.0.1")]
    Stu3,
    #[serde(rename = "4.0.1")]
    R4,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitConfig {
    /// Canonical unit system; only quantities in this system are converted.
    pub unit_system_uri: String,
    /// Some servers send the unit system with a trailing slash.
    pub strip_trailing_slash: bool,
    pub convert_units: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrefetchConfig {
    pub max_concurrent_expansions: usize,
    pub expansion_path: String,
}

impl Default for SdcConfig {
    fn default() -> Self {
        Self {
            fhir_version: FhirVersion::R4,
            link_id_code_system: LINK_ID_CODE_SYSTEM.to_string(),
            unit_config: UnitConfig::default(),
            prefetch_config: PrefetchConfig::default(),
        }
    }
}

impl Default for UnitConfig {
    fn default() -> Self {
        Self {
            unit_system_uri: UCUM_URI.to_string(),
            strip_trailing_slash: true,
            convert_units: true,
        }
    }
}

impl Default for PrefetchConfig {
    fn default() -> Self {
        Self {
            max_concurrent_expansions: num_cpus::get() * 2,
            expansion_path: "ValueSet/$expand".to_string(),
        }
    }
}

impl SdcConfig {
    pub fn for_version(version: FhirVersion) -> Self {
        Self {
            fhir_version: version,
            ..Default::default()
        }
    }

    pub fn with_unit_config(mut self, unit_config: UnitConfig) -> Self {
        self.unit_config = unit_config;
        self
    }

    pub fn with_prefetch_config(mut self, prefetch_config: PrefetchConfig) -> Self {
        self.prefetch_config = prefetch_config;
        self
    }

    pub fn with_link_id_code_system(mut self, code_system: impl Into<String>) -> Self {
        self.link_id_code_system = code_system.into();
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.prefetch_config.validate()?;
        if self.unit_config.unit_system_uri.is_empty() {
            return Err(SdcError::configuration_error(
                "Unit system URI cannot be empty",
            ));
        }
        Ok(())
    }
}

impl UnitConfig {
    /// Exact unit matching only; the conversion service is never consulted.
    pub fn exact_only() -> Self {
        Self {
            convert_units: false,
            ..Default::default()
        }
    }
}

impl PrefetchConfig {
    pub fn with_max_concurrent_expansions(mut self, limit: usize) -> Self {
        self.max_concurrent_expansions = limit;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_concurrent_expansions == 0 {
            return Err(SdcError::configuration_error(
                "Expansion concurrency cannot be zero",
            ));
        }
        if self.expansion_path.trim_matches('/').is_empty() {
            return Err(SdcError::configuration_error(
                "Expansion path cannot be empty",
            ));
        }
        Ok(())
    }
}

impl std::fmt::Display for FhirVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FhirVersion::Stu3 => write!(f, "3.0.1"),
            FhirVersion::R4 => write!(f, "4.0.1"),
        }
    }
}

impl FhirVersion {
    pub fn parse_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "stu3" | "3.0.1" | "3.0" => Some(FhirVersion::Stu3),
            "r4" | "4.0.1" | "4.0" => Some(FhirVersion::R4),
            _ => None,
        }
    }
}
