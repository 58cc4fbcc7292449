//! Value normalization shared by the importers: code system names,
//! significant digits and unit reconciliation.

pub mod code_system;
pub mod conversion;
pub mod digits;
pub mod units;

pub use code_system::{LOINC, LOINC_URI, to_external_code_system, to_internal_code_system};
pub use conversion::{ConversionStatus, NoUnitConversion, UnitConversion, UnitConverter};
pub use digits::{round_to_significant, significant_digits};
pub use units::{UnitMatch, UnitMatcher};
