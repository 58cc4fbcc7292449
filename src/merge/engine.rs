use serde_json::Value;

use super::MergeReport;
use super::structure::{Expansion, ResolvedOccurrence, group_occurrences, resolve_level};
use crate::error::{Result, SdcError};
use crate::fhir::{QuestionnaireResponse, QuestionnaireResponseItem};
use crate::form::{FormDefinition, FormItem};
use crate::value_import::{ValueImporter, ValueTarget};

/// Merges QuestionnaireResponse answers into an imported form.
#[derive(Debug, Clone, Default)]
pub struct ResponseMerger {
    values: ValueImporter,
}

impl ResponseMerger {
    pub fn new(values: ValueImporter) -> Self {
        Self { values }
    }

    /// Merges `response` into `form` in place. Unknown linkIds and
    /// occurrences the form cannot hold are reported, never raised.
    pub fn merge(&self, form: &mut FormDefinition, response: &QuestionnaireResponse) -> MergeReport {
        let mut report = MergeReport::default();
        self.merge_level(&mut form.items, response.item.iter().collect(), &mut report);

        if !report.unmatched_link_ids.is_empty() {
            tracing::warn!(
                "Response items with unknown linkIds were ignored: {:?}",
                report.unmatched_link_ids
            );
        }
        tracing::info!(
            "Merged {} items, added {} repeats, dropped {} occurrences",
            report.merged_items,
            report.expanded_items,
            report.dropped_occurrences
        );
        report
    }

    pub fn merge_json(&self, form: &mut FormDefinition, json: &str) -> Result<MergeReport> {
        let value: Value = serde_json::from_str(json)?;
        let resource_type = value.get("resourceType").and_then(Value::as_str);
        if resource_type != Some("QuestionnaireResponse") {
            return Err(SdcError::import_error(format!(
                "Expected a QuestionnaireResponse resource, found {}",
                resource_type.unwrap_or("no resourceType")
            )));
        }
        let response: QuestionnaireResponse = serde_json::from_value(value)?;
        Ok(self.merge(form, &response))
    }

    fn merge_level(
        &self,
        items: &mut Vec<FormItem>,
        response_items: Vec<&QuestionnaireResponseItem>,
        report: &mut MergeReport,
    ) {
        let groups = group_occurrences(response_items);
        let plan = resolve_level(items, &groups);

        report
            .unmatched_link_ids
            .extend(plan.unmatched.iter().map(|link_id| link_id.to_string()));
        report.dropped_occurrences += plan.dropped;

        for expansion in &plan.expansions {
            report.expanded_items += ensure_repeats(items, expansion);
        }
        for occurrence in plan.occurrences {
            self.apply(items, occurrence, report);
        }
    }

    fn apply(&self, items: &mut Vec<FormItem>, occurrence: ResolvedOccurrence<'_>, report: &mut MergeReport) {
        let Some(item) = items
            .iter_mut()
            .filter(|item| item.link_id == occurrence.link_id)
            .nth(occurrence.index)
        else {
            report.dropped_occurrences += 1;
            return;
        };

        if !item.is_container() && !occurrence.answers.is_empty() {
            let payloads: Vec<_> = occurrence
                .answers
                .iter()
                .filter_map(|answer| answer.payload())
                .collect();
            self.values.import_values(item, &payloads, ValueTarget::Value);
        }
        report.merged_items += 1;

        if !occurrence.children.is_empty() {
            self.merge_level(&mut item.items, occurrence.children, report);
        }
    }
}

/// Makes sure `expansion.count` items with the linkId exist, cloning the
/// first one (values cleared) after the last existing one. Returns how many
/// items were added.
fn ensure_repeats(items: &mut Vec<FormItem>, expansion: &Expansion<'_>) -> usize {
    let positions: Vec<usize> = items
        .iter()
        .enumerate()
        .filter(|(_, item)| item.link_id == expansion.link_id)
        .map(|(position, _)| position)
        .collect();
    let (Some(&first), Some(&last)) = (positions.first(), positions.last()) else {
        return 0;
    };
    let missing = expansion.count.saturating_sub(positions.len());
    if missing == 0 {
        return 0;
    }

    let mut template = items[first].clone();
    template.clear_values();
    let clones = std::iter::repeat_n(template, missing);
    items.splice(last + 1..last + 1, clones);

    tracing::debug!("Added {} repeats of {}", missing, expansion.link_id);
    missing
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::{Cardinality, DataType};

    #[test]
    fn test_ensure_repeats_inserts_after_last_existing() {
        let mut items = vec![
            FormItem::new("a", DataType::String),
            FormItem::new("b", DataType::String),
            FormItem::new("a", DataType::String),
            FormItem::new("c", DataType::String),
        ];
        let added = ensure_repeats(&mut items, &Expansion { link_id: "a", count: 4 });

        assert_eq!(added, 2);
        let order: Vec<_> = items.iter().map(|i| i.link_id.as_str()).collect();
        assert_eq!(order, ["a", "b", "a", "a", "a", "c"]);

        assert_eq!(ensure_repeats(&mut items, &Expansion { link_id: "a", count: 3 }), 0);
        assert_eq!(ensure_repeats(&mut items, &Expansion { link_id: "zzz", count: 3 }), 0);
    }

    #[test]
    fn test_clones_start_without_values() {
        let importer = ValueImporter::default();
        let mut first = FormItem::new("a", DataType::String)
            .with_question_cardinality(Cardinality::unbounded(1))
            .with_items(vec![FormItem::new("a.1", DataType::String)]);
        importer.import_values(
            &mut first.items[0],
            &[crate::fhir::AnswerValue::String("kept".into())],
            ValueTarget::Value,
        );
        let mut items = vec![first];

        ensure_repeats(&mut items, &Expansion { link_id: "a", count: 2 });
        assert!(items[0].items[0].value.is_some());
        assert!(items[1].items[0].value.is_none());
    }
}
