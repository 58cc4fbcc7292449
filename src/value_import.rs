//! Assigning typed answer payloads to form items.
//!
//! The importer is lenient: payloads that do not fit the item's data type,
//! coded payloads with no matching answer and quantities whose unit cannot be
//! reconciled are dropped without an error.

use crate::fhir::{AnswerValue, Coding, Observation};
use crate::form::{AnswerOption, DataType, FieldValue, FormItem, ItemValue, Unit};
use crate::normalize::{UnitMatch, UnitMatcher, to_external_code_system};

/// Which slot of the item receives the imported values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueTarget {
    Value,
    Default,
}

#[derive(Debug, Clone, Default)]
pub struct ValueImporter {
    units: UnitMatcher,
}

impl ValueImporter {
    pub fn new(units: UnitMatcher) -> Self {
        Self { units }
    }

    pub fn unit_matcher(&self) -> &UnitMatcher {
        &self.units
    }

    /// Imports `values` into `item`, returning how many were accepted.
    ///
    /// When the item's answers repeat every accepted value is stored as a
    /// list; otherwise only the first accepted one is kept.
    pub fn import_values(
        &self,
        item: &mut FormItem,
        values: &[AnswerValue],
        target: ValueTarget,
    ) -> usize {
        let mut accepted = Vec::new();
        let mut unit = None;
        for value in values {
            match self.accept(item, value) {
                Some((item_value, matched_unit)) => {
                    if unit.is_none() {
                        unit = matched_unit;
                    }
                    accepted.push(item_value);
                }
                None => tracing::debug!(
                    "Dropping {} value for item {} ({})",
                    value.kind(),
                    item.link_id,
                    item.data_type
                ),
            }
        }

        let count = if item.answer_repeats() {
            accepted.len()
        } else {
            accepted.len().min(1)
        };
        let field = if item.answer_repeats() {
            (!accepted.is_empty()).then_some(FieldValue::List(accepted))
        } else {
            accepted.into_iter().next().map(FieldValue::Single)
        };

        match target {
            ValueTarget::Value => {
                item.value = field;
                if unit.is_some() {
                    item.unit = unit;
                }
            }
            ValueTarget::Default => {
                item.default_answer = field;
                if item.unit.is_none() {
                    item.unit = unit;
                }
            }
        }
        count
    }

    /// Imports the `value[x]` of an Observation, provided its type suits the
    /// item. Returns whether a value was stored.
    pub fn import_observation_value(&self, item: &mut FormItem, observation: &Observation) -> bool {
        let Some(value) = observation.value() else {
            return false;
        };
        if !observation_value_fits(item.data_type, &value) {
            tracing::debug!(
                "Observation value of type {} does not fit item {} ({})",
                value.kind(),
                item.link_id,
                item.data_type
            );
            return false;
        }
        self.import_values(item, std::slice::from_ref(&value), ValueTarget::Value) > 0
    }

    fn accept(&self, item: &FormItem, value: &AnswerValue) -> Option<(ItemValue, Option<Unit>)> {
        if item.data_type.is_coded() {
            return match value {
                AnswerValue::Coding(coding) => {
                    match_answer(item, std::slice::from_ref(coding)).map(|a| (a, None))
                }
                AnswerValue::CodeableConcept(concept) => {
                    match_answer(item, &concept.coding).map(|a| (a, None))
                }
                AnswerValue::String(_) if item.data_type == DataType::CodedWithExceptions => {
                    Some((ItemValue::Value(value.clone()), None))
                }
                _ => None,
            };
        }

        match value {
            AnswerValue::Quantity(quantity) if item.data_type.is_numeric() => {
                if item.units.is_empty() {
                    return quantity.value.map(|number| (ItemValue::Number(number), None));
                }
                match self.units.match_unit(quantity, &item.units) {
                    UnitMatch::Matched { unit, quantity, .. } => {
                        quantity.value.map(|number| (ItemValue::Number(number), Some(unit)))
                    }
                    UnitMatch::NotMatched => None,
                }
            }
            other => Some((ItemValue::Value(other.clone()), None)),
        }
    }
}

/// First answer matching any of the codings, trying codings in order.
fn match_answer(item: &FormItem, codings: &[Coding]) -> Option<ItemValue> {
    codings.iter().find_map(|coding| {
        item.answers
            .iter()
            .find(|answer| coding_matches(coding, answer))
            .map(|answer| ItemValue::Answer(answer.clone()))
    })
}

fn coding_matches(coding: &Coding, answer: &AnswerOption) -> bool {
    let answer_system = answer.code_system.as_deref().map(to_external_code_system);
    let same_system = match (coding.system.as_deref(), answer_system.as_deref()) {
        (None, None) => true,
        (Some(system), Some(answer_system)) => system == answer_system,
        _ => false,
    };
    same_system && coding.code.is_some() && coding.code == answer.code
}

fn observation_value_fits(data_type: DataType, value: &AnswerValue) -> bool {
    match data_type {
        DataType::CodedNoExceptions | DataType::CodedWithExceptions => matches!(
            value,
            AnswerValue::CodeableConcept(_) | AnswerValue::Coding(_)
        ),
        DataType::Integer => matches!(value, AnswerValue::Integer(_) | AnswerValue::Quantity(_)),
        DataType::Real => matches!(value, AnswerValue::Decimal(_) | AnswerValue::Quantity(_)),
        DataType::Quantity => matches!(value, AnswerValue::Quantity(_)),
        DataType::String | DataType::Text => matches!(value, AnswerValue::String(_)),
        DataType::Boolean => matches!(value, AnswerValue::Boolean(_)),
        DataType::Date => matches!(value, AnswerValue::Date(_)),
        DataType::DateTime => matches!(value, AnswerValue::DateTime(_)),
        DataType::Time => matches!(value, AnswerValue::Time(_)),
        DataType::Url => matches!(value, AnswerValue::Uri(_)),
        DataType::Section | DataType::Title => false,
    }
}
