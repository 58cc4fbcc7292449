pub mod config;

pub use config::{
    FhirVersion, LINK_ID_CODE_SYSTEM, PrefetchConfig, SdcConfig, UCUM_URI, UnitConfig,
};
