use serde_json::Value;

use super::data_type::{item_control, map_item_type};
use super::extensions::{
    ANSWER_REPEATS, MAX_OCCURS, MIN_OCCURS, OPTION_PREFIX, RESTRICTIONS, SCORE_EXTENSIONS,
    TERMINOLOGY_SERVER, UNIT, UNIT_OPTION,
};
use super::skip_logic::import_skip_logic;
use super::{ImportContext, preferred_code};
use crate::fhir::{AnswerOptionDefinition, AnswerValue, Extension, QuestionnaireItem, find_extension};
use crate::form::{AnswerOption, Cardinality, FormItem, Unit};
use crate::normalize::to_internal_code_system;
use crate::value_import::{ValueImporter, ValueTarget};

/// Converts one Questionnaire item, and its children, into a form item.
pub struct ItemImporter<'a> {
    values: &'a ValueImporter,
}

impl<'a> ItemImporter<'a> {
    pub fn new(values: &'a ValueImporter) -> Self {
        Self { values }
    }

    pub fn import_item(&self, source: &QuestionnaireItem, context: &mut ImportContext) -> FormItem {
        let data_type = map_item_type(source.item_type.as_deref());
        let mut item = FormItem::new(source.link_id.clone(), data_type);

        self.import_code(&mut item, source, context);
        item.question = source.text.clone();
        item.prefix = source.prefix.clone();
        self.import_cardinality(&mut item, source);

        let control = item_control(&source.extension, data_type);
        item.display_control = control.display_control;
        item.is_search_autocomplete = control.search_autocomplete;

        item.terminology_server = find_extension(&source.extension, TERMINOLOGY_SERVER)
            .and_then(|extension| extension.value_str("valueUrl"))
            .map(str::to_string);

        self.import_answers(&mut item, source, context);
        item.units = import_units(&source.extension);
        import_restrictions(&mut item, source);
        item.read_only = source.read_only.unwrap_or(false);
        item.skip_logic = import_skip_logic(source, context);
        self.import_defaults(&mut item, source, context);

        context.mark_item_imported();
        item.items = source
            .item
            .iter()
            .map(|child| self.import_item(child, context))
            .collect();
        item
    }

    fn import_code(&self, item: &mut FormItem, source: &QuestionnaireItem, context: &ImportContext) {
        item.code_list = source.code.clone();
        match preferred_code(&source.code, &[]) {
            Some((code, system)) => {
                item.question_code = code;
                item.question_code_system = system;
            }
            None => {
                item.question_code = source.link_id.clone();
                item.question_code_system = Some(context.config.link_id_code_system.clone());
            }
        }
    }

    fn import_cardinality(&self, item: &mut FormItem, source: &QuestionnaireItem) {
        let repeats = source.repeats.unwrap_or(false);
        let coded = item.data_type.is_coded();

        let min_occurs = find_extension(&source.extension, MIN_OCCURS)
            .and_then(Extension::value_integer)
            .and_then(|min| u32::try_from(min).ok());
        let max_occurs = find_extension(&source.extension, MAX_OCCURS)
            .and_then(Extension::value_integer)
            .and_then(|max| u32::try_from(max).ok());

        let question_max = match max_occurs {
            Some(max) => Some(max),
            None if repeats && !coded => None,
            None => Some(1),
        };
        item.question_cardinality = Cardinality::new(min_occurs.unwrap_or(1), question_max);

        let answer_repeats = find_extension(&source.extension, ANSWER_REPEATS)
            .and_then(Extension::value_boolean)
            .unwrap_or(false);
        let answer_min = u32::from(source.required.unwrap_or(false));
        let answer_max = if (repeats && coded) || answer_repeats {
            None
        } else {
            Some(1)
        };
        item.answer_cardinality = Cardinality::new(answer_min, answer_max);
    }

    fn import_answers(&self, item: &mut FormItem, source: &QuestionnaireItem, context: &mut ImportContext) {
        if !source.answer_option.is_empty() {
            item.answers = source.answer_option.iter().filter_map(answer_option).collect();
        }

        let Some(value_set) = source.answer_value_set.as_deref() else {
            return;
        };
        item.answer_value_set = Some(value_set.to_string());
        if value_set.starts_with('#') {
            match context.contained_answers(value_set) {
                Some(answers) => {
                    item.answers = answers.clone();
                    item.answer_value_set_key = Some(value_set.to_string());
                    context.import_stats.contained_answer_lists += 1;
                }
                None => context.add_warning(format!(
                    "Item {} references missing contained ValueSet {value_set}",
                    source.link_id
                )),
            }
        }
    }

    fn import_defaults(&self, item: &mut FormItem, source: &QuestionnaireItem, context: &mut ImportContext) {
        let mut initial = source.initial_values();
        initial.extend(
            source
                .answer_option
                .iter()
                .filter(|option| option.initial_selected == Some(true))
                .filter_map(AnswerOptionDefinition::answer_value),
        );
        if initial.is_empty() {
            return;
        }
        if self.values.import_values(item, &initial, ValueTarget::Default) > 0 {
            context.import_stats.default_values += 1;
        } else {
            tracing::debug!("No initial value of item {} fits its data type", item.link_id);
        }
    }
}

fn answer_option(option: &AnswerOptionDefinition) -> Option<AnswerOption> {
    let mut answer = match option.answer_value()? {
        AnswerValue::Coding(coding) => AnswerOption {
            code: coding.code,
            text: coding.display,
            code_system: coding.system.as_deref().map(to_internal_code_system),
            ..Default::default()
        },
        AnswerValue::String(text)
        | AnswerValue::Date(text)
        | AnswerValue::Time(text)
        | AnswerValue::DateTime(text) => AnswerOption {
            text: Some(text),
            ..Default::default()
        },
        AnswerValue::Integer(number) => AnswerOption {
            text: Some(number.to_string()),
            ..Default::default()
        },
        other => {
            tracing::debug!("Ignoring answer option of type {}", other.kind());
            return None;
        }
    };

    answer.score = SCORE_EXTENSIONS.iter().find_map(|url| {
        let extension = find_extension(&option.extension, url)?;
        extension
            .value_decimal()
            .or_else(|| extension.value_integer().map(|score| score as f64))
    });
    answer.label = find_extension(&option.extension, OPTION_PREFIX)
        .and_then(|extension| extension.value_str("valueString"))
        .map(str::to_string);
    Some(answer)
}

fn unit_from(extension: &Extension) -> Option<Unit> {
    let coding = extension.value_coding()?;
    Some(Unit {
        name: coding.display.or_else(|| coding.code.clone()),
        code: coding.code,
        system: coding.system,
    })
}

/// The `questionnaire-unit` unit first, followed by any `unitOption` entries
/// not already listed.
fn import_units(extensions: &[Extension]) -> Vec<Unit> {
    let mut units: Vec<Unit> = find_extension(extensions, UNIT)
        .and_then(unit_from)
        .into_iter()
        .collect();
    for unit in extensions
        .iter()
        .filter(|extension| extension.url == UNIT_OPTION)
        .filter_map(unit_from)
    {
        if !units.contains(&unit) {
            units.push(unit);
        }
    }
    units
}

fn import_restrictions(item: &mut FormItem, source: &QuestionnaireItem) {
    for (url, name) in RESTRICTIONS {
        let value = find_extension(&source.extension, url).and_then(|extension| {
            extension
                .value
                .iter()
                .find(|(key, _)| key.starts_with("value"))
                .map(|(_, value)| value.clone())
        });
        if let Some(value) = value {
            item.restrictions.insert(name.to_string(), value);
        }
    }
    if let Some(max_length) = source.max_length {
        item.restrictions
            .insert("maxLength".to_string(), Value::from(max_length));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{LINK_ID_CODE_SYSTEM, SdcConfig};
    use crate::fhir::Questionnaire;
    use crate::form::{DataType, FieldValue};
    use serde_json::json;

    fn import(item: Value) -> (FormItem, ImportContext) {
        let questionnaire: Questionnaire = serde_json::from_value(json!({
            "resourceType": "Questionnaire",
            "contained": [{"resourceType": "ValueSet", "id": "yn", "expansion": {"contains": [
                {"system": "http://terminology.hl7.org/CodeSystem/v2-0136", "code": "Y", "display": "Yes"},
                {"system": "http://terminology.hl7.org/CodeSystem/v2-0136", "code": "N", "display": "No"}
            ]}}],
            "item": [item]
        }))
        .unwrap();
        let mut context = ImportContext::new(&SdcConfig::default());
        context.begin_import(&questionnaire);
        let values = ValueImporter::default();
        let item = ItemImporter::new(&values).import_item(&questionnaire.item[0], &mut context);
        (item, context)
    }

    #[test]
    fn test_link_id_fallback_code() {
        let (item, _) = import(json!({"linkId": "/name", "type": "string", "text": "Name"}));
        assert_eq!(item.question_code, "/name");
        assert_eq!(item.question_code_system.as_deref(), Some(LINK_ID_CODE_SYSTEM));
        assert_eq!(item.question.as_deref(), Some("Name"));
    }

    #[test]
    fn test_cardinality_from_repeats_and_extensions() {
        let (choice, _) = import(json!({
            "linkId": "symptoms", "type": "choice", "repeats": true, "required": true
        }));
        assert_eq!(choice.question_cardinality, Cardinality::single());
        assert_eq!(choice.answer_cardinality, Cardinality::unbounded(1));

        let (text, _) = import(json!({
            "linkId": "notes", "type": "string", "repeats": true,
            "extension": [
                {"url": MIN_OCCURS, "valueInteger": 2},
                {"url": MAX_OCCURS, "valueInteger": 4}
            ]
        }));
        assert_eq!(text.question_cardinality, Cardinality::new(2, Some(4)));
        assert_eq!(text.answer_cardinality, Cardinality::optional());

        let (open, _) = import(json!({
            "linkId": "other", "type": "string", "repeats": true
        }));
        assert_eq!(open.question_cardinality, Cardinality::unbounded(1));
    }

    #[test]
    fn test_answer_options_with_score_and_prefix() {
        let (item, _) = import(json!({
            "linkId": "phq1", "type": "choice",
            "answerOption": [
                {"valueCoding": {"system": "http://loinc.org", "code": "LA6568-5", "display": "Not at all"},
                 "extension": [
                    {"url": "http://hl7.org/fhir/StructureDefinition/ordinalValue", "valueDecimal": 0},
                    {"url": OPTION_PREFIX, "valueString": "A."}
                 ]},
                {"valueCoding": {"system": "http://loinc.org", "code": "LA6569-3", "display": "Several days"},
                 "extension": [{"url": "http://hl7.org/fhir/StructureDefinition/itemWeight", "valueInteger": 1}],
                 "initialSelected": true}
            ]
        }));

        assert_eq!(item.answers.len(), 2);
        assert_eq!(item.answers[0].code_system.as_deref(), Some("LOINC"));
        assert_eq!(item.answers[0].score, Some(0.0));
        assert_eq!(item.answers[0].label.as_deref(), Some("A."));
        assert_eq!(item.answers[1].score, Some(1.0));

        let default = item.default_answer.as_ref().and_then(FieldValue::as_single).unwrap();
        assert_eq!(default.as_answer().unwrap().code.as_deref(), Some("LA6569-3"));
        assert!(item.value.is_none());
    }

    #[test]
    fn test_contained_value_set_answers() {
        let (item, context) = import(json!({
            "linkId": "agree", "type": "choice", "answerValueSet": "#yn"
        }));
        assert_eq!(item.answers.len(), 2);
        assert_eq!(item.answer_value_set_key.as_deref(), Some("#yn"));
        assert_eq!(context.get_stats().contained_answer_lists, 1);

        let (missing, context) = import(json!({
            "linkId": "agree", "type": "choice", "answerValueSet": "#nope"
        }));
        assert!(missing.answers.is_empty());
        assert!(context.has_warnings());
    }

    #[test]
    fn test_units_restrictions_and_server() {
        let (item, _) = import(json!({
            "linkId": "weight", "type": "decimal", "maxLength": 6, "readOnly": true,
            "extension": [
                {"url": UNIT, "valueCoding": {"system": "http://unitsofmeasure.org", "code": "kg", "display": "kilogram"}},
                {"url": UNIT_OPTION, "valueCoding": {"system": "http://unitsofmeasure.org", "code": "kg", "display": "kilogram"}},
                {"url": UNIT_OPTION, "valueCoding": {"system": "http://unitsofmeasure.org", "code": "[lb_av]", "display": "pound"}},
                {"url": "http://hl7.org/fhir/StructureDefinition/minValue", "valueDecimal": 0.5},
                {"url": TERMINOLOGY_SERVER, "valueUrl": "https://tx.example.org/fhir"}
            ]
        }));

        assert_eq!(item.units.len(), 2);
        assert_eq!(item.units[0].name.as_deref(), Some("kilogram"));
        assert_eq!(item.restrictions.get("minInclusive"), Some(&json!(0.5)));
        assert_eq!(item.restrictions.get("maxLength"), Some(&json!(6)));
        assert!(item.read_only);
        assert_eq!(item.terminology_server.as_deref(), Some("https://tx.example.org/fhir"));
    }

    #[test]
    fn test_stu3_initial_value() {
        let (item, _) = import(json!({
            "linkId": "age", "type": "integer", "initialInteger": 42
        }));
        assert_eq!(
            item.default_answer,
            Some(FieldValue::Single(crate::form::ItemValue::Value(AnswerValue::Integer(42))))
        );
    }

    #[test]
    fn test_children_keep_source_order() {
        let (group, context) = import(json!({
            "linkId": "g", "type": "group", "item": [
                {"linkId": "a", "type": "string"},
                {"linkId": "b", "type": "display"},
                {"linkId": "c", "type": "group", "item": [{"linkId": "d", "type": "quantity"}]}
            ]
        }));
        let order: Vec<_> = group.items.iter().map(|i| i.link_id.as_str()).collect();
        assert_eq!(order, ["a", "b", "c"]);
        assert_eq!(group.items[2].items[0].data_type, DataType::Quantity);
        assert_eq!(context.get_stats().items_imported, 5);
    }
}
