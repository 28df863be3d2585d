use async_trait::async_trait;

use crate::{
    error::ClassifyError,
    query::UaQuery,
    result::{IpResult, UaResult},
};

/// The classification backend consulted by every parse endpoint.
///
/// Implementations own their data sources and any caching; callers make at
/// most one call per sub-operation and never retry. Stored as
/// `Arc<dyn Classifier>` so tests can substitute a stub.
#[async_trait]
pub trait Classifier: Send + Sync + 'static {
    async fn classify_user_agent(&self, query: &UaQuery) -> Result<UaResult, ClassifyError>;

    async fn classify_address(&self, ip: &str) -> Result<IpResult, ClassifyError>;
}
