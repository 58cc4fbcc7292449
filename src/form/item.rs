use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::{FieldValue, SkipLogic};
use crate::fhir::Coding;

/// Form-side data types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    #[serde(rename = "ST")]
    String,
    #[serde(rename = "SECTION")]
    Section,
    #[serde(rename = "CNE")]
    CodedNoExceptions,
    #[serde(rename = "CWE")]
    CodedWithExceptions,
    #[serde(rename = "INT")]
    Integer,
    #[serde(rename = "REAL")]
    Real,
    #[serde(rename = "TX")]
    Text,
    #[serde(rename = "BL")]
    Boolean,
    #[serde(rename = "DT")]
    Date,
    #[serde(rename = "DTM")]
    DateTime,
    #[serde(rename = "TM")]
    Time,
    #[serde(rename = "TITLE")]
    Title,
    #[serde(rename = "URL")]
    Url,
    #[serde(rename = "QTY")]
    Quantity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cardinality {
    pub min: u32,
    /// `None` means unbounded.
    pub max: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Unit {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOption {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnswerLayout {
    #[serde(rename = "COMBO_BOX")]
    ComboBox,
    #[serde(rename = "RADIO_CHECKBOX")]
    RadioCheckbox,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionLayout {
    Horizontal,
    Matrix,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayControl {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer_layout: Option<AnswerLayout>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question_layout: Option<QuestionLayout>,
}

/// A node of the form tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormItem {
    pub link_id: String,
    pub data_type: DataType,
    pub question_code: String,
    pub question_code_system: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub code_list: Vec<Coding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    pub question_cardinality: Cardinality,
    pub answer_cardinality: Cardinality,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub answers: Vec<AnswerOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer_value_set: Option<String>,
    /// Cache key the answer list was (or will be) resolved under. With a
    /// terminology server this is the expansion URL, whose `url` query value
    /// is percent-encoded (`?url=http%3A%2F%2F...`), so it differs from a key
    /// built by raw string concatenation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer_value_set_key: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub units: Vec<Unit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<Unit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<FieldValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_answer: Option<FieldValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_control: Option<DisplayControl>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terminology_server: Option<String>,
    #[serde(default)]
    pub is_search_autocomplete: bool,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub restrictions: BTreeMap<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_logic: Option<SkipLogic>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<FormItem>,
}

impl DataType {
    pub fn code(&self) -> &'static str {
        match self {
            DataType::String => "ST",
            DataType::Section => "SECTION",
            DataType::CodedNoExceptions => "CNE",
            DataType::CodedWithExceptions => "CWE",
            DataType::Integer => "INT",
            DataType::Real => "REAL",
            DataType::Text => "TX",
            DataType::Boolean => "BL",
            DataType::Date => "DT",
            DataType::DateTime => "DTM",
            DataType::Time => "TM",
            DataType::Title => "TITLE",
            DataType::Url => "URL",
            DataType::Quantity => "QTY",
        }
    }

    pub fn is_coded(&self) -> bool {
        matches!(
            self,
            DataType::CodedNoExceptions | DataType::CodedWithExceptions
        )
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            DataType::Integer | DataType::Real | DataType::Quantity
        )
    }

    /// Sections and titles never hold a value.
    pub fn is_container(&self) -> bool {
        matches!(self, DataType::Section | DataType::Title)
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl Cardinality {
    pub fn new(min: u32, max: Option<u32>) -> Self {
        Self { min, max }
    }

    pub fn single() -> Self {
        Self::new(1, Some(1))
    }

    pub fn optional() -> Self {
        Self::new(0, Some(1))
    }

    pub fn unbounded(min: u32) -> Self {
        Self::new(min, None)
    }

    /// More than one occurrence allowed.
    pub fn repeats(&self) -> bool {
        self.max.is_none_or(|max| max > 1)
    }
}

impl Default for Cardinality {
    fn default() -> Self {
        Self::single()
    }
}

impl AnswerOption {
    pub fn new(code: &str, text: &str) -> Self {
        Self {
            code: Some(code.to_string()),
            text: Some(text.to_string()),
            ..Default::default()
        }
    }

    pub fn with_code_system(mut self, code_system: impl Into<String>) -> Self {
        self.code_system = Some(code_system.into());
        self
    }
}

impl Unit {
    pub fn new(code: &str) -> Self {
        Self {
            code: Some(code.to_string()),
            ..Default::default()
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl FormItem {
    pub fn new(link_id: impl Into<String>, data_type: DataType) -> Self {
        let link_id = link_id.into();
        Self {
            question_code: link_id.clone(),
            link_id,
            data_type,
            question_code_system: None,
            code_list: Vec::new(),
            question: None,
            prefix: None,
            question_cardinality: Cardinality::single(),
            answer_cardinality: Cardinality::optional(),
            answers: Vec::new(),
            answer_value_set: None,
            answer_value_set_key: None,
            units: Vec::new(),
            unit: None,
            value: None,
            default_answer: None,
            display_control: None,
            terminology_server: None,
            is_search_autocomplete: false,
            read_only: false,
            restrictions: BTreeMap::new(),
            skip_logic: None,
            items: Vec::new(),
        }
    }

    pub fn with_items(mut self, items: Vec<FormItem>) -> Self {
        self.items = items;
        self
    }

    pub fn with_question_cardinality(mut self, cardinality: Cardinality) -> Self {
        self.question_cardinality = cardinality;
        self
    }

    pub fn with_answer_cardinality(mut self, cardinality: Cardinality) -> Self {
        self.answer_cardinality = cardinality;
        self
    }

    pub fn with_answers(mut self, answers: Vec<AnswerOption>) -> Self {
        self.answers = answers;
        self
    }

    pub fn with_units(mut self, units: Vec<Unit>) -> Self {
        self.units = units;
        self
    }

    /// The item itself may occur more than once among its siblings.
    pub fn question_repeats(&self) -> bool {
        self.question_cardinality.repeats()
    }

    /// A single occurrence may hold more than one answer.
    pub fn answer_repeats(&self) -> bool {
        self.answer_cardinality.repeats()
    }

    pub fn is_container(&self) -> bool {
        self.data_type.is_container()
    }

    /// Drops entered values on this item and its descendants, keeping defaults.
    pub fn clear_values(&mut self) {
        self.value = None;
        self.unit = None;
        for child in &mut self.items {
            child.clear_values();
        }
    }

    /// Depth-first search for the first item with the given linkId.
    pub fn find_item(&self, link_id: &str) -> Option<&FormItem> {
        self.items.iter().find_map(|child| {
            if child.link_id == link_id {
                Some(child)
            } else {
                child.find_item(link_id)
            }
        })
    }
}
