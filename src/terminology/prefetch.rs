use futures::stream::{self, StreamExt};
use std::sync::Arc;
use url::Url;

use super::{AnswerSetCache, ResolutionError, ResolverResult, ValueSetResolver};
use crate::core::PrefetchConfig;
use crate::error::Result;
use crate::form::{AnswerOption, FormDefinition, FormItem};

/// Called after an item's answer list has been replaced.
pub trait AnswerListRefresh: Send + Sync {
    fn refresh(&self, item: &FormItem);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoRefresh;

impl AnswerListRefresh for NoRefresh {
    fn refresh(&self, _item: &FormItem) {}
}

impl<F> AnswerListRefresh for F
where
    F: Fn(&FormItem) + Send + Sync,
{
    fn refresh(&self, item: &FormItem) {
        self(item)
    }
}

/// One value set to resolve, and the key its answers are cached under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerSetRequest {
    pub key: String,
    pub value_set: String,
    pub terminology_server: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrefetchFailure {
    pub key: String,
    pub link_ids: Vec<String>,
    pub error: ResolutionError,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrefetchReport {
    /// Items filled straight from the cache.
    pub from_cache: usize,
    /// Keys resolved during this call.
    pub resolved: usize,
    /// Keys whose expansion had no entries.
    pub empty: usize,
    pub failures: Vec<PrefetchFailure>,
}

impl PrefetchReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// `{server}/{expansion_path}?url={value_set}`, with the value set url
/// percent-encoded.
pub fn expansion_url(server: &str, expansion_path: &str, value_set: &str) -> ResolverResult<Url> {
    let invalid = |message: String| ResolutionError::InvalidServer {
        server: server.to_string(),
        message,
    };

    let mut url = Url::parse(server.trim_end_matches('/')).map_err(|e| invalid(e.to_string()))?;
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|_| invalid("cannot be a base URL".to_string()))?;
        segments.pop_if_empty();
        for segment in expansion_path.split('/').filter(|s| !s.is_empty()) {
            segments.push(segment);
        }
    }
    url.query_pairs_mut().append_pair("url", value_set);
    Ok(url)
}

/// Items waiting for the same key.
struct PendingKey {
    request: AnswerSetRequest,
    paths: Vec<Vec<usize>>,
    link_ids: Vec<String>,
}

/// Resolves answer value sets and back-fills them into form items.
pub struct AnswerSetLoader {
    resolver: Arc<dyn ValueSetResolver>,
    cache: Arc<AnswerSetCache>,
    config: PrefetchConfig,
}

impl AnswerSetLoader {
    pub fn new(resolver: Arc<dyn ValueSetResolver>, cache: Arc<AnswerSetCache>) -> Self {
        Self {
            resolver,
            cache,
            config: PrefetchConfig::default(),
        }
    }

    pub fn with_config(
        resolver: Arc<dyn ValueSetResolver>,
        cache: Arc<AnswerSetCache>,
        config: PrefetchConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            resolver,
            cache,
            config,
        })
    }

    pub fn cache(&self) -> &Arc<AnswerSetCache> {
        &self.cache
    }

    /// Builds the request for `value_set`. With a terminology server the key
    /// is the expansion URL; otherwise it is the value set itself.
    pub fn request_for(
        &self,
        value_set: &str,
        terminology_server: Option<&str>,
    ) -> ResolverResult<AnswerSetRequest> {
        let key = match terminology_server {
            Some(server) => {
                expansion_url(server, &self.config.expansion_path, value_set)?.to_string()
            }
            None => value_set.to_string(),
        };
        Ok(AnswerSetRequest {
            key,
            value_set: value_set.to_string(),
            terminology_server: terminology_server.map(str::to_string),
        })
    }

    /// Resolves one request and caches the answers. An expansion without
    /// entries yields `None` and leaves the cache alone.
    pub async fn resolve(
        &self,
        request: &AnswerSetRequest,
    ) -> ResolverResult<Option<Arc<Vec<AnswerOption>>>> {
        let value_set = match &request.terminology_server {
            Some(server) => self
                .resolver
                .expand_from_server(server, &request.value_set)
                .await
                .map_err(|error| ResolutionError::Expansion {
                    url: request.key.clone(),
                    message: error.to_string(),
                })?,
            None => self
                .resolver
                .expand(&request.value_set)
                .await
                .map_err(|error| ResolutionError::Context {
                    value_set: request.value_set.clone(),
                    message: error.to_string(),
                })?,
        };

        let Some(answers) = value_set.answer_options() else {
            tracing::debug!("Expansion of {} has no entries", request.key);
            return Ok(None);
        };
        let answers = Arc::new(answers);
        self.cache.insert(request.key.clone(), answers.clone());
        Ok(Some(answers))
    }

    /// Loads the answer lists of every item with an answer value set that is
    /// neither a search autocomplete nor a contained reference.
    ///
    /// Items whose key is cached are filled at once. The remaining keys are
    /// resolved concurrently, each once, and applied after all have settled.
    /// A failed key is reported and leaves its items untouched.
    pub async fn load_answer_value_sets(
        &self,
        form: &mut FormDefinition,
        refresh: &dyn AnswerListRefresh,
    ) -> PrefetchReport {
        let mut report = PrefetchReport::default();
        let mut pending: Vec<PendingKey> = Vec::new();

        let mut wanted = Vec::new();
        collect_requests(
            &form.items,
            form.terminology_server.as_deref(),
            &mut Vec::new(),
            &mut wanted,
        );

        for (path, link_id, value_set, server) in wanted {
            let request = match self.request_for(&value_set, server.as_deref()) {
                Ok(request) => request,
                Err(error) => {
                    report.failures.push(PrefetchFailure {
                        key: value_set,
                        link_ids: vec![link_id],
                        error,
                    });
                    continue;
                }
            };
            let Some(item) = form.item_at_path_mut(&path) else {
                continue;
            };
            item.answer_value_set_key = Some(request.key.clone());

            if let Some(answers) = self.cache.get(&request.key) {
                item.answers = answers.as_ref().clone();
                refresh.refresh(item);
                report.from_cache += 1;
                continue;
            }

            match pending.iter_mut().find(|p| p.request.key == request.key) {
                Some(entry) => {
                    entry.paths.push(path);
                    entry.link_ids.push(link_id);
                }
                None => pending.push(PendingKey {
                    request,
                    paths: vec![path],
                    link_ids: vec![link_id],
                }),
            }
        }

        if pending.is_empty() {
            return report;
        }
        tracing::info!(
            "Resolving {} answer value sets (limit {})",
            pending.len(),
            self.config.max_concurrent_expansions
        );

        let results: Vec<(usize, ResolverResult<Option<Arc<Vec<AnswerOption>>>>)> =
            stream::iter(pending.iter().enumerate())
                .map(|(index, entry)| async move { (index, self.resolve(&entry.request).await) })
                .buffer_unordered(self.config.max_concurrent_expansions)
                .collect()
                .await;

        for (index, result) in results {
            let entry = &pending[index];
            match result {
                Ok(Some(answers)) => {
                    report.resolved += 1;
                    for path in &entry.paths {
                        if let Some(item) = form.item_at_path_mut(path) {
                            item.answers = answers.as_ref().clone();
                            refresh.refresh(item);
                        }
                    }
                }
                Ok(None) => report.empty += 1,
                Err(error) => {
                    tracing::warn!("{}", error);
                    report.failures.push(PrefetchFailure {
                        key: entry.request.key.clone(),
                        link_ids: entry.link_ids.clone(),
                        error,
                    });
                }
            }
        }
        report
    }
}

/// Walks the tree, passing the nearest terminology server down.
fn collect_requests(
    items: &[FormItem],
    inherited_server: Option<&str>,
    path: &mut Vec<usize>,
    out: &mut Vec<(Vec<usize>, String, String, Option<String>)>,
) {
    for (index, item) in items.iter().enumerate() {
        path.push(index);
        let server = item.terminology_server.as_deref().or(inherited_server);
        let value_set = item
            .answer_value_set
            .as_deref()
            .filter(|value_set| !item.is_search_autocomplete && !value_set.starts_with('#'));
        if let Some(value_set) = value_set {
            out.push((
                path.clone(),
                item.link_id.clone(),
                value_set.to_string(),
                server.map(str::to_string),
            ));
        }
        collect_requests(&item.items, server, path, out);
        path.pop();
    }
}
