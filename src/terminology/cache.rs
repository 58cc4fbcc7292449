use papaya::HashMap as PapayaMap;
use std::sync::Arc;

use crate::form::AnswerOption;

/// Resolved answer lists keyed by resolution key. Entries live as long as the
/// cache; there is no eviction. A later insert for the same key replaces the
/// earlier list.
#[derive(Debug)]
pub struct AnswerSetCache {
    entries: PapayaMap<String, Arc<Vec<AnswerOption>>>,
}

impl AnswerSetCache {
    pub fn new() -> Self {
        Self {
            entries: PapayaMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<Arc<Vec<AnswerOption>>> {
        let guard = self.entries.pin();
        guard.get(key).cloned()
    }

    pub fn insert(&self, key: impl Into<String>, answers: Arc<Vec<AnswerOption>>) {
        let guard = self.entries.pin();
        guard.insert(key.into(), answers);
    }

    pub fn contains(&self, key: &str) -> bool {
        let guard = self.entries.pin();
        guard.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for AnswerSetCache {
    fn default() -> Self {
        Self::new()
    }
}
