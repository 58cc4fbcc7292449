use std::collections::HashMap;
use std::time::{Duration, Instant};

use super::data_type::map_item_type;
use crate::core::SdcConfig;
use crate::fhir::{Questionnaire, QuestionnaireItem};
use crate::form::{AnswerOption, DataType, FormDefinition};
use crate::normalize::to_internal_code_system;

/// What skip logic needs to know about the question an `enableWhen` points at.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceQuestion {
    pub question_code: String,
    pub data_type: DataType,
}

pub struct ImportContext {
    pub config: SdcConfig,
    source_questions: HashMap<String, SourceQuestion>,
    contained_answers: HashMap<String, Vec<AnswerOption>>,
    pub import_stats: ImportStats,
    start_time: Option<Instant>,
}

#[derive(Debug, Clone, Default)]
pub struct ImportStats {
    pub items_imported: usize,
    pub contained_answer_lists: usize,
    pub skip_conditions: usize,
    pub default_values: usize,
    pub import_duration: Option<Duration>,
    pub warnings: Vec<String>,
}

impl ImportContext {
    pub fn new(config: &SdcConfig) -> Self {
        Self {
            config: config.clone(),
            source_questions: HashMap::new(),
            contained_answers: HashMap::new(),
            import_stats: ImportStats::default(),
            start_time: None,
        }
    }

    pub fn begin_import(&mut self, questionnaire: &Questionnaire) {
        self.start_time = Some(Instant::now());
        self.import_stats = ImportStats::default();
        self.source_questions.clear();
        self.contained_answers.clear();

        index_items(&questionnaire.item, &mut self.source_questions);

        for value_set in questionnaire.contained_value_sets() {
            let Some(id) = value_set.id.as_deref() else {
                continue;
            };
            match value_set.answer_options() {
                Some(answers) => {
                    self.contained_answers.insert(format!("#{id}"), answers);
                }
                None => self.add_warning(format!("Contained ValueSet {id} has no expansion")),
            }
        }

        tracing::debug!(
            "Importing Questionnaire {} with {} indexed items",
            questionnaire.url.as_deref().or(questionnaire.id.as_deref()).unwrap_or("<anonymous>"),
            self.source_questions.len()
        );
    }

    pub fn end_import(&mut self, form: &FormDefinition) {
        if let Some(start_time) = self.start_time {
            self.import_stats.import_duration = Some(start_time.elapsed());
        }
        tracing::info!(
            "Imported {} items ({} top-level) with {} warnings",
            self.import_stats.items_imported,
            form.items.len(),
            self.import_stats.warnings.len()
        );
    }

    pub fn source_question(&self, link_id: &str) -> Option<&SourceQuestion> {
        self.source_questions.get(link_id)
    }

    /// Answers of a contained ValueSet referenced as `#id`.
    pub fn contained_answers(&self, reference: &str) -> Option<&Vec<AnswerOption>> {
        self.contained_answers.get(reference)
    }

    pub fn mark_item_imported(&mut self) {
        self.import_stats.items_imported += 1;
    }

    pub fn add_warning(&mut self, message: String) {
        tracing::warn!("{}", message);
        self.import_stats.warnings.push(message);
    }

    pub fn get_stats(&self) -> &ImportStats {
        &self.import_stats
    }

    pub fn has_warnings(&self) -> bool {
        !self.import_stats.warnings.is_empty()
    }
}

fn index_items(items: &[QuestionnaireItem], index: &mut HashMap<String, SourceQuestion>) {
    for item in items {
        let question_code = item
            .code
            .first()
            .and_then(|coding| coding.code.clone())
            .unwrap_or_else(|| item.link_id.clone());
        index.insert(
            item.link_id.clone(),
            SourceQuestion {
                question_code,
                data_type: map_item_type(item.item_type.as_deref()),
            },
        );
        index_items(&item.item, index);
    }
}

/// Code and code system for a questionnaire or item: the first `code` entry,
/// else the first identifier.
pub(crate) fn preferred_code(
    code: &[crate::fhir::Coding],
    identifier: &[crate::fhir::Identifier],
) -> Option<(String, Option<String>)> {
    if let Some(coding) = code.first() {
        return coding.code.clone().map(|value| {
            (
                value,
                coding.system.as_deref().map(to_internal_code_system),
            )
        });
    }
    identifier.first().and_then(|identifier| {
        identifier.value.clone().map(|value| {
            (
                value,
                identifier.system.as_deref().map(to_internal_code_system),
            )
        })
    })
}
