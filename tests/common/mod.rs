use async_trait::async_trait;
use octofhir_sdc::terminology::ResolverResult;
use octofhir_sdc::*;
use serde_json::{Value, json};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

pub const UCUM: &str = "http://unitsofmeasure.org";

#[allow(dead_code)]
pub fn unit_option(code: &str, display: &str) -> Value {
    json!({
        "url": "http://hl7.org/fhir/StructureDefinition/questionnaire-unitOption",
        "valueCoding": {"system": UCUM, "code": code, "display": display}
    })
}

#[allow(dead_code)]
pub fn loinc_option(code: &str, display: &str) -> Value {
    json!({"valueCoding": {"system": "http://loinc.org", "code": code, "display": display}})
}

/// A personal health record style questionnaire covering repeating
/// questions, repeating answers, repeating groups and units.
#[allow(dead_code)]
pub fn health_record_questionnaire() -> Value {
    json!({
        "resourceType": "Questionnaire",
        "id": "phr",
        "title": "Personal health record",
        "status": "draft",
        "item": [
            {"linkId": "/name", "type": "string", "text": "Name", "repeats": true},
            {"linkId": "/gender", "type": "choice", "text": "Gender",
             "code": [{"system": "http://loinc.org", "code": "54131-8"}],
             "answerOption": [loinc_option("LA2-8", "Male"), loinc_option("LA3-6", "Female")]},
            {"linkId": "/allergies", "type": "open-choice", "text": "Allergies", "repeats": true,
             "answerOption": [
                loinc_option("LA15679-5", "Peanut"),
                loinc_option("LA15680-3", "Shellfish"),
                loinc_option("LA15681-1", "Latex")
             ]},
            {"linkId": "/weight", "type": "decimal", "text": "Weight",
             "extension": [unit_option("kg", "kilogram")]},
            {"linkId": "/smoker", "type": "boolean", "text": "Smoker", "item": [
                {"linkId": "/smoker/packs", "type": "integer", "text": "Packs per day"}
            ]},
            {"linkId": "/meds", "type": "group", "text": "Medications", "repeats": true, "item": [
                {"linkId": "/meds/name", "type": "string", "text": "Medication"},
                {"linkId": "/meds/dose", "type": "quantity", "text": "Dose",
                 "extension": [unit_option("mg", "milligram")]}
            ]},
            {"linkId": "/contact", "type": "group", "text": "Contact", "item": [
                {"linkId": "/contact/phone", "type": "string"}
            ]}
        ]
    })
}

#[allow(dead_code)]
pub fn import_health_record() -> FormDefinition {
    QuestionnaireConverter::new()
        .convert_value(health_record_questionnaire())
        .unwrap()
}

#[allow(dead_code)]
pub fn response(items: Value) -> QuestionnaireResponse {
    serde_json::from_value(json!({
        "resourceType": "QuestionnaireResponse",
        "status": "completed",
        "item": items
    }))
    .unwrap()
}

#[allow(dead_code)]
pub fn string_values(item: &FormItem) -> Vec<String> {
    item.value
        .iter()
        .flat_map(|value| value.values())
        .filter_map(|value| match value {
            ItemValue::Value(fhir::AnswerValue::String(text)) => Some(text.clone()),
            _ => None,
        })
        .collect()
}

/// Converts pounds and milligrams the way a UCUM service would.
#[allow(dead_code)]
pub fn ucum_converter() -> Arc<dyn UnitConverter> {
    Arc::new(|from: &str, value: f64, to: &str| match (from, to) {
        ("[lb_av]", "kg") => UnitConversion::succeeded(value * 0.45359237),
        ("g", "mg") => UnitConversion::succeeded(value * 1000.0),
        ("mg", "g") => UnitConversion::succeeded(value / 1000.0),
        _ => UnitConversion::failed(),
    })
}

#[allow(dead_code)]
pub fn value_set(url: &str, codes: &[(&str, &str)]) -> ValueSet {
    codes
        .iter()
        .fold(ValueSet::with_url(url), |value_set, (code, display)| {
            value_set.with_concept(Some("http://snomed.info/sct"), code, display)
        })
}

/// Resolver that counts calls and fails for selected value sets.
#[allow(dead_code)]
#[derive(Default)]
pub struct CountingResolver {
    pub value_sets: HashMap<String, ValueSet>,
    pub failing: HashSet<String>,
    pub calls: AtomicUsize,
    pub server_calls: AtomicUsize,
}

#[allow(dead_code)]
impl CountingResolver {
    pub fn with_value_set(mut self, value_set: ValueSet) -> Self {
        let url = value_set.url.clone().unwrap_or_default();
        self.value_sets.insert(url, value_set);
        self
    }

    pub fn failing_for(mut self, url: &str) -> Self {
        self.failing.insert(url.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn server_calls(&self) -> usize {
        self.server_calls.load(Ordering::SeqCst)
    }

    fn lookup(&self, value_set: &str) -> ResolverResult<ValueSet> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(value_set) {
            return Err(ResolutionError::NetworkError(format!(
                "connection refused for {value_set}"
            )));
        }
        self.value_sets
            .get(value_set)
            .cloned()
            .ok_or_else(|| ResolutionError::ValueSetNotFound {
                url: value_set.to_string(),
            })
    }
}

#[async_trait]
impl ValueSetResolver for CountingResolver {
    async fn expand(&self, value_set: &str) -> ResolverResult<ValueSet> {
        self.lookup(value_set)
    }

    async fn expand_from_server(
        &self,
        _terminology_server: &str,
        value_set: &str,
    ) -> ResolverResult<ValueSet> {
        self.server_calls.fetch_add(1, Ordering::SeqCst);
        self.lookup(value_set)
    }
}
