//! Merging QuestionnaireResponse data into a form tree.
//!
//! Each level of the response is grouped by linkId and aligned with the form
//! level first ([`structure`]); only then is the form tree expanded for
//! repeats and filled in ([`engine`]). Merging is lenient: response items
//! that have no place in the form are counted in the [`MergeReport`] and
//! otherwise ignored.

mod engine;
pub mod structure;

pub use engine::ResponseMerger;
pub use structure::{OccurrenceGroup, ResolvedOccurrence, group_occurrences};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeReport {
    /// Form items that received response data.
    pub merged_items: usize,
    /// Items cloned into the form to hold repeats.
    pub expanded_items: usize,
    pub unmatched_link_ids: Vec<String>,
    /// Response occurrences with no form item to receive them.
    pub dropped_occurrences: usize,
}

impl MergeReport {
    /// Nothing in the response was ignored.
    pub fn is_complete(&self) -> bool {
        self.unmatched_link_ids.is_empty() && self.dropped_occurrences == 0
    }
}
