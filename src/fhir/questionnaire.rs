use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{AnswerValue, Coding, Extension, Identifier, ValueSet};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Questionnaire {
    #[serde(default = "questionnaire_resource_type")]
    pub resource_type: String,
    pub id: Option<String>,
    pub url: Option<String>,
    pub version: Option<String>,
    pub name: Option<String>,
    pub title: Option<String>,
    pub status: Option<String>,
    pub date: Option<String>,
    pub publisher: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub identifier: Vec<Identifier>,
    #[serde(default)]
    pub code: Vec<Coding>,
    #[serde(default)]
    pub subject_type: Vec<String>,
    #[serde(default)]
    pub extension: Vec<Extension>,
    #[serde(default)]
    pub contained: Vec<Value>,
    #[serde(default)]
    pub item: Vec<QuestionnaireItem>,

    /// Remaining resource fields (meta, contact, useContext, ...).
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuestionnaireItem {
    #[serde(default)]
    pub link_id: String,
    pub definition: Option<String>,
    pub prefix: Option<String>,
    pub text: Option<String>,

    #[serde(rename = "type")]
    pub item_type: Option<String>,

    #[serde(default)]
    pub code: Vec<Coding>,
    #[serde(default)]
    pub enable_when: Vec<EnableWhen>,
    pub enable_behavior: Option<String>,
    pub required: Option<bool>,
    pub repeats: Option<bool>,
    pub read_only: Option<bool>,
    pub max_length: Option<u32>,
    pub answer_value_set: Option<String>,

    /// `answerOption` in R4, `option` in STU3.
    #[serde(default, alias = "option")]
    pub answer_option: Vec<AnswerOptionDefinition>,

    #[serde(default)]
    pub initial: Vec<InitialValue>,
    #[serde(default)]
    pub extension: Vec<Extension>,
    #[serde(default)]
    pub item: Vec<QuestionnaireItem>,

    /// Unmodelled fields, including the STU3 `initial[x]` choice.
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EnableWhen {
    #[serde(default)]
    pub question: String,
    pub operator: Option<String>,
    /// STU3 form of the `exists` operator.
    pub has_answer: Option<bool>,
    #[serde(flatten)]
    pub answer: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOptionDefinition {
    #[serde(default)]
    pub extension: Vec<Extension>,
    pub initial_selected: Option<bool>,
    #[serde(flatten)]
    pub value: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct InitialValue {
    #[serde(flatten)]
    pub value: Map<String, Value>,
}

fn questionnaire_resource_type() -> String {
    "Questionnaire".to_string()
}

impl Questionnaire {
    /// ValueSets carried in `contained`, skipping other resource types.
    pub fn contained_value_sets(&self) -> Vec<ValueSet> {
        self.contained
            .iter()
            .filter(|resource| {
                resource.get("resourceType").and_then(Value::as_str) == Some("ValueSet")
            })
            .filter_map(|resource| serde_json::from_value(resource.clone()).ok())
            .collect()
    }
}

impl QuestionnaireItem {
    pub fn new(link_id: impl Into<String>, item_type: impl Into<String>) -> Self {
        Self {
            link_id: link_id.into(),
            item_type: Some(item_type.into()),
            ..Default::default()
        }
    }

    /// Initial values from R4 `initial[]`, or the STU3 `initial[x]` element.
    pub fn initial_values(&self) -> Vec<AnswerValue> {
        if !self.initial.is_empty() {
            return self
                .initial
                .iter()
                .filter_map(|initial| AnswerValue::from_prefixed(&initial.value, "value"))
                .collect();
        }
        AnswerValue::from_prefixed(&self.other, "initial")
            .into_iter()
            .collect()
    }
}

impl EnableWhen {
    pub fn answer_value(&self) -> Option<AnswerValue> {
        AnswerValue::from_prefixed(&self.answer, "answer")
    }
}

impl AnswerOptionDefinition {
    pub fn answer_value(&self) -> Option<AnswerValue> {
        AnswerValue::from_prefixed(&self.value, "value")
    }
}
