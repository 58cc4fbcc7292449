//! # OctoFHIR SDC
//!
//! Structured Data Capture import for FHIR Questionnaires: turns a
//! Questionnaire into a form model, merges QuestionnaireResponse answers back
//! into that model and resolves externally defined answer lists.
//!
//! ## Features
//!
//! - **Import**: Questionnaire (R4 and STU3) to [`FormDefinition`], including
//!   cardinality, display control, units, answer options and skip logic
//! - **Merge**: QuestionnaireResponse data into a form, expanding repeating
//!   questions and sections
//! - **Units**: quantity units matched against each question's unit list, with
//!   conversion through a pluggable [`UnitConverter`]
//! - **Answer sets**: async value set expansion with a shared [`AnswerSetCache`]
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use octofhir_sdc::*;
//!
//! # fn example(questionnaire: &str, response: &str) -> Result<()> {
//! let converter = QuestionnaireConverter::new();
//! let mut form = converter.convert_json(questionnaire)?;
//!
//! let merger = ResponseMerger::new(converter.value_importer().clone());
//! let report = merger.merge_json(&mut form, response)?;
//! assert!(report.unmatched_link_ids.is_empty());
//! # Ok(())
//! # }
//! ```

pub mod converter;
pub mod core;
pub mod error;
pub mod fhir;
pub mod form;
pub mod merge;
pub mod normalize;
pub mod terminology;
pub mod value_import;

pub use converter::{ImportContext, ImportStats, QuestionnaireConverter, QuestionnaireImporter};
pub use core::{FhirVersion, PrefetchConfig, SdcConfig, UnitConfig};
pub use error::Result; // Our Result type takes precedence
pub use error::SdcError;
pub use fhir::{Observation, Questionnaire, QuestionnaireResponse, ValueSet};
pub use form::{AnswerOption, DataType, FieldValue, FormDefinition, FormItem, ItemValue, Unit};
pub use merge::{MergeReport, ResponseMerger};
pub use normalize::{NoUnitConversion, UnitConversion, UnitConverter, UnitMatch, UnitMatcher};
pub use terminology::{
    AnswerListRefresh, AnswerSetCache, AnswerSetLoader, InMemoryValueSetResolver,
    PrefetchReport, ResolutionError, ValueSetResolver,
};
pub use value_import::{ValueImporter, ValueTarget};
