use serde::{Deserialize, Serialize};

use super::{Extension, find_extension};
use crate::form::AnswerOption;
use crate::normalize::to_internal_code_system;

pub const ORDINAL_VALUE_EXTENSION: &str =
    "http://hl7.org/fhir/StructureDefinition/valueset-ordinalValue";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ValueSet {
    pub id: Option<String>,
    pub url: Option<String>,
    pub expansion: Option<ValueSetExpansion>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ValueSetExpansion {
    #[serde(default)]
    pub contains: Vec<ValueSetContains>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ValueSetContains {
    pub system: Option<String>,
    pub code: Option<String>,
    pub display: Option<String>,
    #[serde(default)]
    pub extension: Vec<Extension>,
}

impl ValueSet {
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Default::default()
        }
    }

    pub fn with_concept(mut self, system: Option<&str>, code: &str, display: &str) -> Self {
        self.expansion
            .get_or_insert_with(ValueSetExpansion::default)
            .contains
            .push(ValueSetContains {
                system: system.map(str::to_string),
                code: Some(code.to_string()),
                display: Some(display.to_string()),
                extension: Vec::new(),
            });
        self
    }

    /// Converts the expansion into answer options. Returns `None` when the
    /// expansion is missing or empty.
    pub fn answer_options(&self) -> Option<Vec<AnswerOption>> {
        let contains = &self.expansion.as_ref()?.contains;
        if contains.is_empty() {
            return None;
        }

        let answers = contains
            .iter()
            .map(|concept| AnswerOption {
                code: concept.code.clone(),
                text: concept.display.clone(),
                code_system: concept.system.as_deref().map(to_internal_code_system),
                score: find_extension(&concept.extension, ORDINAL_VALUE_EXTENSION)
                    .and_then(Extension::value_decimal),
                label: None,
            })
            .collect();
        Some(answers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_expansion_to_answers() {
        let value_set: ValueSet = serde_json::from_value(json!({
            "resourceType": "ValueSet",
            "url": "http://example.org/vs/severity",
            "expansion": {"contains": [
                {"system": "http://loinc.org", "code": "LA6752-5", "display": "Mild",
                 "extension": [{"url": ORDINAL_VALUE_EXTENSION, "valueDecimal": 1}]},
                {"system": "http://snomed.info/sct", "code": "24484000", "display": "Severe"}
            ]}
        }))
        .unwrap();

        let answers = value_set.answer_options().unwrap();
        assert_eq!(answers.len(), 2);
        assert_eq!(answers[0].code_system.as_deref(), Some("LOINC"));
        assert_eq!(answers[0].score, Some(1.0));
        assert_eq!(answers[1].code_system.as_deref(), Some("http://snomed.info/sct"));
        assert_eq!(answers[1].score, None);
    }

    #[test]
    fn test_empty_expansion_yields_nothing() {
        assert!(ValueSet::with_url("http://example.org/vs").answer_options().is_none());

        let empty: ValueSet =
            serde_json::from_value(json!({"expansion": {"contains": []}})).unwrap();
        assert!(empty.answer_options().is_none());
    }
}
