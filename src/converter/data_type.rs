use super::extensions::ITEM_CONTROL;
use crate::fhir::{Extension, find_extension};
use crate::form::{AnswerLayout, DataType, DisplayControl, QuestionLayout};

/// Maps a Questionnaire item type to the form data type. Unknown or missing
/// types become [`DataType::String`].
pub fn map_item_type(item_type: Option<&str>) -> DataType {
    match item_type.unwrap_or_default() {
        "string" => DataType::String,
        "group" => DataType::Section,
        "choice" => DataType::CodedNoExceptions,
        "open-choice" => DataType::CodedWithExceptions,
        "integer" => DataType::Integer,
        "decimal" => DataType::Real,
        "text" => DataType::Text,
        "boolean" => DataType::Boolean,
        "date" => DataType::Date,
        "dateTime" => DataType::DateTime,
        "time" => DataType::Time,
        "display" => DataType::Title,
        "url" => DataType::Url,
        "quantity" => DataType::Quantity,
        _ => DataType::String,
    }
}

/// Display hints derived from the item-control extension.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemControl {
    pub display_control: Option<DisplayControl>,
    pub search_autocomplete: bool,
}

/// Reads the item-control code and maps it to answer or question layout.
/// Codes from older exports (`Lookup`, `Combo-box`, `Checkbox`, `Radio`,
/// `Table`, `Matrix`) are accepted alongside the current ones.
pub fn item_control(extensions: &[Extension], data_type: DataType) -> ItemControl {
    let Some(code) = find_extension(extensions, ITEM_CONTROL).and_then(Extension::first_code)
    else {
        return ItemControl::default();
    };

    let mut control = DisplayControl::default();
    let mut search_autocomplete = false;
    match code.as_str() {
        "Lookup" | "Combo-box" | "autocomplete" => {
            search_autocomplete = true;
            control.answer_layout = Some(AnswerLayout::ComboBox);
        }
        "drop-down" => control.answer_layout = Some(AnswerLayout::ComboBox),
        "Checkbox" | "check-box" | "Radio" | "radio-button" => {
            control.answer_layout = Some(AnswerLayout::RadioCheckbox)
        }
        "Table" | "gtable" if data_type == DataType::Section => {
            control.question_layout = Some(QuestionLayout::Horizontal)
        }
        "Matrix" | "table" if data_type == DataType::Section => {
            control.question_layout = Some(QuestionLayout::Matrix)
        }
        other => tracing::debug!("Ignoring item control code {}", other),
    }

    let has_layout = control.answer_layout.is_some() || control.question_layout.is_some();
    ItemControl {
        display_control: has_layout.then_some(control),
        search_autocomplete,
    }
}
