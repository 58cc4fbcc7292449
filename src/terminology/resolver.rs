use async_trait::async_trait;
use papaya::HashMap as PapayaMap;

use super::{ResolutionError, ResolverResult, ValueSetResolver};
use crate::fhir::ValueSet;

/// Serves value sets registered up front, by canonical URL. The terminology
/// server argument is ignored.
#[derive(Debug)]
pub struct InMemoryValueSetResolver {
    value_sets: PapayaMap<String, ValueSet>,
}

impl InMemoryValueSetResolver {
    pub fn new() -> Self {
        Self {
            value_sets: PapayaMap::new(),
        }
    }

    pub fn with_value_set(self, value_set: ValueSet) -> Self {
        self.add_value_set(value_set);
        self
    }

    /// Registers `value_set` under its url, or its id when it has no url.
    /// Value sets with neither are ignored.
    pub fn add_value_set(&self, value_set: ValueSet) -> bool {
        let Some(key) = value_set.url.clone().or_else(|| value_set.id.clone()) else {
            return false;
        };
        self.value_sets.pin().insert(key, value_set);
        true
    }

    pub fn len(&self) -> usize {
        self.value_sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.value_sets.is_empty()
    }
}

impl Default for InMemoryValueSetResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ValueSetResolver for InMemoryValueSetResolver {
    async fn expand(&self, value_set: &str) -> ResolverResult<ValueSet> {
        let guard = self.value_sets.pin();
        guard
            .get(value_set)
            .cloned()
            .ok_or_else(|| ResolutionError::ValueSetNotFound {
                url: value_set.to_string(),
            })
    }

    async fn expand_from_server(
        &self,
        _terminology_server: &str,
        value_set: &str,
    ) -> ResolverResult<ValueSet> {
        self.expand(value_set).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lookup_by_url() {
        let resolver = InMemoryValueSetResolver::new().with_value_set(
            ValueSet::with_url("http://example.org/vs/yn").with_concept(None, "Y", "Yes"),
        );

        let value_set = resolver.expand("http://example.org/vs/yn").await.unwrap();
        assert_eq!(value_set.answer_options().unwrap().len(), 1);
        assert!(
            resolver
                .expand_from_server("https://tx.example.org", "http://example.org/vs/yn")
                .await
                .is_ok()
        );
        assert_eq!(
            resolver.expand("http://example.org/vs/missing").await,
            Err(ResolutionError::ValueSetNotFound {
                url: "http://example.org/vs/missing".to_string()
            })
        );
    }

    #[test]
    fn test_value_sets_without_identity_are_ignored() {
        let resolver = InMemoryValueSetResolver::new();
        assert!(!resolver.add_value_set(ValueSet::default()));
        assert!(resolver.is_empty());
    }
}
