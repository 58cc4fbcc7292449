use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::AnswerValue;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuestionnaireResponse {
    #[serde(default = "response_resource_type")]
    pub resource_type: String,
    pub id: Option<String>,
    pub questionnaire: Option<String>,
    pub status: Option<String>,
    pub authored: Option<String>,
    #[serde(default)]
    pub item: Vec<QuestionnaireResponseItem>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuestionnaireResponseItem {
    #[serde(default)]
    pub link_id: String,
    pub text: Option<String>,
    #[serde(default)]
    pub answer: Vec<QuestionnaireResponseAnswer>,
    #[serde(default)]
    pub item: Vec<QuestionnaireResponseItem>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct QuestionnaireResponseAnswer {
    /// Child items nested under an answer (R4).
    #[serde(default)]
    pub item: Vec<QuestionnaireResponseItem>,
    #[serde(flatten)]
    pub value: Map<String, Value>,
}

/// The subset of an Observation the value importer reads.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Observation {
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

fn response_resource_type() -> String {
    "QuestionnaireResponse".to_string()
}

impl QuestionnaireResponseItem {
    pub fn new(link_id: impl Into<String>) -> Self {
        Self {
            link_id: link_id.into(),
            ..Default::default()
        }
    }

    pub fn with_answer(mut self, answer: QuestionnaireResponseAnswer) -> Self {
        self.answer.push(answer);
        self
    }

    pub fn with_item(mut self, item: QuestionnaireResponseItem) -> Self {
        self.item.push(item);
        self
    }

    /// Child items, whether nested directly or under answers.
    pub fn children(&self) -> impl Iterator<Item = &QuestionnaireResponseItem> {
        self.item
            .iter()
            .chain(self.answer.iter().flat_map(|answer| answer.item.iter()))
    }
}

impl QuestionnaireResponseAnswer {
    pub fn new(kind: &str, value: Value) -> Self {
        let mut fields = Map::new();
        fields.insert(format!("value{kind}"), value);
        Self {
            item: Vec::new(),
            value: fields,
        }
    }

    pub fn payload(&self) -> Option<AnswerValue> {
        AnswerValue::from_prefixed(&self.value, "value")
    }
}

impl Observation {
    pub fn value(&self) -> Option<AnswerValue> {
        AnswerValue::from_prefixed(&self.fields, "value")
    }
}
