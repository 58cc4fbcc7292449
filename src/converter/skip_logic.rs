use super::ImportContext;
use crate::fhir::{AnswerValue, EnableWhen, QuestionnaireItem};
use crate::form::{SkipCondition, SkipLogic, SkipLogicAction, SkipLogicLogic, Trigger, TriggerOperator};

/// Builds skip logic from `enableWhen`. Conditions pointing at unknown
/// questions, or using operators the form model cannot express, are dropped
/// with a warning.
pub fn import_skip_logic(item: &QuestionnaireItem, context: &mut ImportContext) -> Option<SkipLogic> {
    if item.enable_when.is_empty() {
        return None;
    }

    let mut conditions = Vec::with_capacity(item.enable_when.len());
    for enable_when in &item.enable_when {
        match condition(enable_when, context) {
            Ok(condition) => conditions.push(condition),
            Err(reason) => context.add_warning(format!(
                "Skipping enableWhen on item {}: {reason}",
                item.link_id
            )),
        }
    }
    if conditions.is_empty() {
        return None;
    }
    context.import_stats.skip_conditions += conditions.len();

    let logic = match item.enable_behavior.as_deref() {
        Some("any") => SkipLogicLogic::Any,
        _ => SkipLogicLogic::All,
    };
    Some(SkipLogic {
        action: SkipLogicAction::Show,
        logic,
        conditions,
    })
}

fn condition(enable_when: &EnableWhen, context: &ImportContext) -> Result<SkipCondition, String> {
    let source = context
        .source_question(&enable_when.question)
        .ok_or_else(|| format!("unknown source question {}", enable_when.question))?;

    let exists_check =
        enable_when.has_answer.is_some() || enable_when.operator.as_deref() == Some("exists");
    let trigger = if exists_check {
        let exists = enable_when
            .has_answer
            .or_else(|| enable_when.answer.get("answerBoolean").and_then(|v| v.as_bool()))
            .unwrap_or(true);
        Trigger {
            operator: TriggerOperator::Exists,
            value: Some(AnswerValue::Boolean(exists)),
        }
    } else {
        let operator = match enable_when.operator.as_deref() {
            None => TriggerOperator::Equal,
            Some(operator) => TriggerOperator::parse_str(operator)
                .ok_or_else(|| format!("unsupported operator {operator}"))?,
        };
        Trigger {
            operator,
            value: enable_when.answer_value(),
        }
    };

    Ok(SkipCondition {
        source: enable_when.question.clone(),
        source_code: source.question_code.clone(),
        source_data_type: source.data_type,
        trigger,
    })
}
