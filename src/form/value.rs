use serde::{Deserialize, Serialize};

use super::AnswerOption;
use crate::fhir::AnswerValue;

/// One stored answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ItemValue {
    /// An entry selected from the item's answer list.
    Answer(AnswerOption),
    /// The numeric part of a quantity; its unit lives on the item.
    Number(f64),
    /// Any other payload, kept as received.
    Value(AnswerValue),
}

/// The value of a question: one answer, or a list when answers repeat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Single(ItemValue),
    List(Vec<ItemValue>),
}

impl FieldValue {
    pub fn as_single(&self) -> Option<&ItemValue> {
        match self {
            FieldValue::Single(value) => Some(value),
            FieldValue::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ItemValue]> {
        match self {
            FieldValue::Single(_) => None,
            FieldValue::List(values) => Some(values),
        }
    }

    /// All stored answers in order.
    pub fn values(&self) -> &[ItemValue] {
        match self {
            FieldValue::Single(value) => std::slice::from_ref(value),
            FieldValue::List(values) => values,
        }
    }
}

impl ItemValue {
    pub fn as_answer(&self) -> Option<&AnswerOption> {
        match self {
            ItemValue::Answer(answer) => Some(answer),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            ItemValue::Number(number) => Some(*number),
            _ => None,
        }
    }
}
