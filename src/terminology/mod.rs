//! Externally defined answer lists.
//!
//! Questions that reference a value set by URL get their options from a
//! [`ValueSetResolver`]. Resolved lists are memoized in an [`AnswerSetCache`]
//! under a resolution key and back-filled into every item that shares the
//! key by the [`AnswerSetLoader`].

mod cache;
mod prefetch;
mod resolver;

pub use cache::AnswerSetCache;
pub use prefetch::{
    AnswerListRefresh, AnswerSetLoader, AnswerSetRequest, NoRefresh, PrefetchFailure,
    PrefetchReport, expansion_url,
};
pub use resolver::InMemoryValueSetResolver;

use async_trait::async_trait;
use thiserror::Error;

use crate::fhir::ValueSet;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ResolutionError {
    #[error("Unable to load ValueSet from {url}: {message}")]
    Expansion { url: String, message: String },

    #[error("Unable to load ValueSet {value_set} from FHIR server: {message}")]
    Context { value_set: String, message: String },

    #[error("Value set not found: {url}")]
    ValueSetNotFound { url: String },

    #[error("Invalid terminology server {server}: {message}")]
    InvalidServer { server: String, message: String },

    #[error("Network error: {0}")]
    NetworkError(String),
}

pub type ResolverResult<T> = Result<T, ResolutionError>;

/// Expands value sets. Implementations talk to a terminology server or to
/// the FHIR server of the current context.
#[async_trait]
pub trait ValueSetResolver: Send + Sync {
    /// Expands `value_set` through the context server.
    async fn expand(&self, value_set: &str) -> ResolverResult<ValueSet>;

    /// Expands `value_set` on an explicit terminology server.
    async fn expand_from_server(
        &self,
        terminology_server: &str,
        value_set: &str,
    ) -> ResolverResult<ValueSet>;
}
