//! Alignment of one level of a response tree against the matching level of
//! the form tree.
//!
//! Everything here is computed from shared references before the form tree
//! is touched: the result says which items need extra repeats and which
//! `(linkId, index)` receives which answers.

use crate::fhir::{QuestionnaireResponseAnswer, QuestionnaireResponseItem};
use crate::form::FormItem;

/// Same-linkId response items on one level, in response order.
#[derive(Debug, Clone)]
pub struct OccurrenceGroup<'r> {
    pub link_id: &'r str,
    pub occurrences: Vec<&'r QuestionnaireResponseItem>,
}

impl OccurrenceGroup<'_> {
    pub fn total(&self) -> usize {
        self.occurrences.len()
    }
}

/// Groups response items by linkId, ordered by first appearance.
pub fn group_occurrences<'r>(
    items: impl IntoIterator<Item = &'r QuestionnaireResponseItem>,
) -> Vec<OccurrenceGroup<'r>> {
    let mut groups: Vec<OccurrenceGroup<'r>> = Vec::new();
    for item in items {
        match groups.iter_mut().find(|group| group.link_id == item.link_id) {
            Some(group) => group.occurrences.push(item),
            None => groups.push(OccurrenceGroup {
                link_id: &item.link_id,
                occurrences: vec![item],
            }),
        }
    }
    groups
}

/// Answers and children destined for the `index`-th form item with `link_id`.
#[derive(Debug, Clone)]
pub struct ResolvedOccurrence<'r> {
    pub link_id: &'r str,
    pub index: usize,
    pub answers: Vec<&'r QuestionnaireResponseAnswer>,
    pub children: Vec<&'r QuestionnaireResponseItem>,
}

/// Form items that must exist `count` times among their siblings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expansion<'r> {
    pub link_id: &'r str,
    pub count: usize,
}

#[derive(Debug, Clone, Default)]
pub struct LevelPlan<'r> {
    pub expansions: Vec<Expansion<'r>>,
    pub occurrences: Vec<ResolvedOccurrence<'r>>,
    pub unmatched: Vec<&'r str>,
    pub dropped: usize,
}

/// Decides how every occurrence group of a level maps onto `form_items`.
pub fn resolve_level<'r>(form_items: &[FormItem], groups: &[OccurrenceGroup<'r>]) -> LevelPlan<'r> {
    let mut plan = LevelPlan::default();
    for group in groups {
        let Some(template) = form_items.iter().find(|item| item.link_id == group.link_id) else {
            plan.unmatched.push(group.link_id);
            continue;
        };
        if template.is_container() {
            resolve_section(template, group, &mut plan);
        } else {
            resolve_question(template, group, &mut plan);
        }
    }
    plan
}

fn resolve_section<'r>(template: &FormItem, group: &OccurrenceGroup<'r>, plan: &mut LevelPlan<'r>) {
    if group.total() > 1 && template.question_repeats() {
        plan.expansions.push(Expansion {
            link_id: group.link_id,
            count: group.total(),
        });
        for (index, occurrence) in group.occurrences.iter().enumerate() {
            plan.occurrences.push(whole_occurrence(group.link_id, index, occurrence));
        }
    } else {
        plan.occurrences
            .push(whole_occurrence(group.link_id, 0, group.occurrences[0]));
        plan.dropped += group.total() - 1;
    }
}

fn resolve_question<'r>(template: &FormItem, group: &OccurrenceGroup<'r>, plan: &mut LevelPlan<'r>) {
    let first = group.occurrences[0];

    if group.total() > 1 {
        if template.question_repeats() {
            plan.expansions.push(Expansion {
                link_id: group.link_id,
                count: group.total(),
            });
            for (index, occurrence) in group.occurrences.iter().enumerate() {
                plan.occurrences.push(whole_occurrence(group.link_id, index, occurrence));
            }
        } else if template.answer_repeats() {
            plan.occurrences.push(ResolvedOccurrence {
                link_id: group.link_id,
                index: 0,
                answers: group
                    .occurrences
                    .iter()
                    .flat_map(|occurrence| occurrence.answer.iter())
                    .collect(),
                children: group
                    .occurrences
                    .iter()
                    .copied()
                    .flat_map(QuestionnaireResponseItem::children)
                    .collect(),
            });
        } else {
            plan.occurrences.push(whole_occurrence(group.link_id, 0, first));
            plan.dropped += group.total() - 1;
        }
        return;
    }

    // A single response item holding several answers for a question that
    // repeats as a whole: one form item per answer.
    let answers = first.answer.len();
    if answers > 1 && template.question_repeats() && !template.answer_repeats() {
        plan.expansions.push(Expansion {
            link_id: group.link_id,
            count: answers,
        });
        for (index, answer) in first.answer.iter().enumerate() {
            let mut children: Vec<_> = if index == 0 {
                first.item.iter().collect()
            } else {
                Vec::new()
            };
            children.extend(answer.item.iter());
            plan.occurrences.push(ResolvedOccurrence {
                link_id: group.link_id,
                index,
                answers: vec![answer],
                children,
            });
        }
    } else {
        plan.occurrences.push(whole_occurrence(group.link_id, 0, first));
    }
}

fn whole_occurrence<'r>(
    link_id: &'r str,
    index: usize,
    occurrence: &'r QuestionnaireResponseItem,
) -> ResolvedOccurrence<'r> {
    ResolvedOccurrence {
        link_id,
        index,
        answers: occurrence.answer.iter().collect(),
        children: occurrence.children().collect(),
    }
}
