use serde::{Deserialize, Serialize};

use super::DataType;
use crate::fhir::AnswerValue;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkipLogic {
    pub action: SkipLogicAction,
    pub logic: SkipLogicLogic,
    pub conditions: Vec<SkipCondition>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkipLogicAction {
    Show,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SkipLogicLogic {
    All,
    Any,
}

/// A condition on the answer of another question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkipCondition {
    /// linkId of the source question.
    pub source: String,
    pub source_code: String,
    pub source_data_type: DataType,
    pub trigger: Trigger,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trigger {
    pub operator: TriggerOperator,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<AnswerValue>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TriggerOperator {
    Exists,
    Equal,
    NotEqual,
    GreaterThan,
    LessThan,
    GreaterOrEqual,
    LessOrEqual,
}

impl TriggerOperator {
    pub fn parse_str(s: &str) -> Option<Self> {
        match s {
            "exists" => Some(TriggerOperator::Exists),
            "=" => Some(TriggerOperator::Equal),
            "!=" => Some(TriggerOperator::NotEqual),
            ">" => Some(TriggerOperator::GreaterThan),
            "<" => Some(TriggerOperator::LessThan),
            ">=" => Some(TriggerOperator::GreaterOrEqual),
            "<=" => Some(TriggerOperator::LessOrEqual),
            _ => None,
        }
    }
}
