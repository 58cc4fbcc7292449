mod context;
mod data_type;
pub mod extensions;
mod item_importer;
mod skip_logic;

pub use context::*;
pub use data_type::*;
pub use item_importer::*;
pub use skip_logic::*;

use std::sync::Arc;

use serde_json::Value;

use crate::core::SdcConfig;
use crate::error::{Result, SdcError};
use crate::fhir::{Questionnaire, find_extension};
use crate::form::FormDefinition;
use crate::normalize::{UnitConverter, UnitMatcher};
use crate::value_import::ValueImporter;

/// Resource fields copied verbatim onto the form definition.
pub const FORM_LEVEL_FIELDS: [&str; 14] = [
    "meta",
    "implicitRules",
    "language",
    "contact",
    "useContext",
    "jurisdiction",
    "purpose",
    "copyright",
    "approvalDate",
    "lastReviewDate",
    "effectivePeriod",
    "experimental",
    "derivedFrom",
    "modifierExtension",
];

pub trait QuestionnaireImporter {
    fn convert(&self, questionnaire: &Questionnaire) -> Result<FormDefinition>;
    fn convert_with_context(
        &self,
        questionnaire: &Questionnaire,
        context: &mut ImportContext,
    ) -> Result<FormDefinition>;
}

/// Imports Questionnaires into form definitions.
#[derive(Debug, Clone)]
pub struct QuestionnaireConverter {
    config: SdcConfig,
    values: ValueImporter,
}

impl QuestionnaireConverter {
    pub fn new() -> Self {
        Self::with_config(SdcConfig::default())
    }

    pub fn with_config(config: SdcConfig) -> Self {
        let values = ValueImporter::new(UnitMatcher::new(
            Arc::new(crate::normalize::NoUnitConversion),
            config.unit_config.clone(),
        ));
        Self { config, values }
    }

    /// Uses `converter` when initial quantities need a unit conversion.
    pub fn with_unit_converter(mut self, converter: Arc<dyn UnitConverter>) -> Self {
        self.values = ValueImporter::new(UnitMatcher::new(
            converter,
            self.config.unit_config.clone(),
        ));
        self
    }

    pub fn config(&self) -> &SdcConfig {
        &self.config
    }

    pub fn value_importer(&self) -> &ValueImporter {
        &self.values
    }

    pub fn convert_json(&self, json: &str) -> Result<FormDefinition> {
        let value: Value = serde_json::from_str(json)?;
        self.convert_value(value)
    }

    pub fn convert_value(&self, value: Value) -> Result<FormDefinition> {
        let resource_type = value.get("resourceType").and_then(Value::as_str);
        if resource_type != Some("Questionnaire") {
            return Err(SdcError::import_error(format!(
                "Expected a Questionnaire resource, found {}",
                resource_type.unwrap_or("no resourceType")
            )));
        }
        let questionnaire: Questionnaire = serde_json::from_value(value)?;
        self.convert(&questionnaire)
    }

    /// Converts and returns the statistics gathered along the way.
    pub fn convert_with_stats(&self, questionnaire: &Questionnaire) -> Result<(FormDefinition, ImportStats)> {
        let mut context = ImportContext::new(&self.config);
        let form = self.convert_with_context(questionnaire, &mut context)?;
        Ok((form, context.import_stats))
    }

    fn import_form_fields(&self, questionnaire: &Questionnaire, form: &mut FormDefinition) {
        form.id = questionnaire.id.clone();
        form.url = questionnaire.url.clone();
        form.version = questionnaire.version.clone();
        form.name = questionnaire.name.clone();
        form.title = questionnaire.title.clone();
        form.status = questionnaire.status.clone();
        form.date = questionnaire.date.clone();
        form.publisher = questionnaire.publisher.clone();
        form.description = questionnaire.description.clone();
        form.identifier = questionnaire.identifier.clone();
        form.subject_type = questionnaire.subject_type.clone();
        form.extension = questionnaire.extension.clone();
        form.code_list = questionnaire.code.clone();

        if let Some((code, system)) = preferred_code(&questionnaire.code, &questionnaire.identifier) {
            form.code = Some(code);
            form.code_system = system;
        }

        form.terminology_server = find_extension(&questionnaire.extension, extensions::TERMINOLOGY_SERVER)
            .and_then(|extension| extension.value_str("valueUrl"))
            .map(str::to_string);

        form.fhir_fields = questionnaire
            .other
            .iter()
            .filter(|(key, _)| FORM_LEVEL_FIELDS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
    }
}

impl Default for QuestionnaireConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl QuestionnaireImporter for QuestionnaireConverter {
    fn convert(&self, questionnaire: &Questionnaire) -> Result<FormDefinition> {
        let mut context = ImportContext::new(&self.config);
        self.convert_with_context(questionnaire, &mut context)
    }

    fn convert_with_context(
        &self,
        questionnaire: &Questionnaire,
        context: &mut ImportContext,
    ) -> Result<FormDefinition> {
        if questionnaire.resource_type != "Questionnaire" {
            return Err(SdcError::import_error(format!(
                "Expected a Questionnaire resource, found {}",
                questionnaire.resource_type
            )));
        }
        context.begin_import(questionnaire);

        let mut form = FormDefinition::new(self.config.fhir_version);
        self.import_form_fields(questionnaire, &mut form);

        let importer = ItemImporter::new(&self.values);
        form.items = questionnaire
            .item
            .iter()
            .map(|item| importer.import_item(item, context))
            .collect();

        context.end_import(&form);
        Ok(form)
    }
}
