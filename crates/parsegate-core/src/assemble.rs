//! Response assembly.
//!
//! Each endpoint operation runs through [`Assembler`], which normalizes the
//! input, consults the classifier, flattens the result and collapses every
//! failure into a single [`Outcome`]. Exactly one timing sample is recorded
//! per sub-operation the endpoint covers, on every path.

use std::future::Future;
use std::time::Instant;

use crate::{
    classifier::Classifier,
    document::{flatten_ip, flatten_ua, CombinedDocument, Document},
    error::ClassifyError,
    query::{CombinedParams, CombinedQuery, IpQuery, MalformedInput, UaQuery, UaRequest},
    stats::{OperationKind, StatsSink},
};

/// Body returned when an address specimen cannot be resolved.
pub const UNKNOWN_HOST_MESSAGE: &str = "error: unknown host.";

/// Terminal state of one endpoint call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Success(T),
    /// The client's fault. Carries the message to return, if any.
    ValidationFailure(Option<String>),
    InternalFailure,
}

#[derive(Debug)]
enum Failure {
    Validation(Option<String>),
    Internal,
}

impl<T> From<Result<T, Failure>> for Outcome<T> {
    fn from(result: Result<T, Failure>) -> Self {
        match result {
            Ok(value) => Outcome::Success(value),
            Err(Failure::Validation(message)) => Outcome::ValidationFailure(message),
            Err(Failure::Internal) => Outcome::InternalFailure,
        }
    }
}

fn classify_failure(kind: OperationKind, specimen: &str, err: ClassifyError) -> Failure {
    match err {
        ClassifyError::Rejected(message) => {
            tracing::warn!(?kind, specimen, error = %message, "Specimen rejected");
            Failure::Validation(Some(message))
        }
        ClassifyError::UnknownHost(host) => {
            tracing::debug!(?kind, host = %host, "Host lookup failed");
            Failure::Validation(Some(UNKNOWN_HOST_MESSAGE.to_string()))
        }
        ClassifyError::Store(e) => {
            tracing::error!(?kind, specimen, error = %e, "Backing store failure");
            Failure::Internal
        }
        ClassifyError::Other(e) => {
            tracing::error!(?kind, specimen, error = %e, "Classification failed");
            Failure::Internal
        }
    }
}

fn malformed<T>(kind: OperationKind, err: MalformedInput) -> Outcome<T> {
    tracing::debug!(?kind, error = %err, "Malformed request");
    Outcome::ValidationFailure(None)
}

/// Records its elapsed time for every kind when dropped.
struct Sample<'a> {
    stats: &'a dyn StatsSink,
    kinds: &'a [OperationKind],
    started: Instant,
}

impl Drop for Sample<'_> {
    fn drop(&mut self) {
        let elapsed = self.started.elapsed();
        for kind in self.kinds {
            self.stats.record_duration(*kind, elapsed);
        }
    }
}

/// Orchestrates classifier calls for a single inbound request.
pub struct Assembler<'a> {
    classifier: &'a dyn Classifier,
    stats: &'a dyn StatsSink,
}

impl<'a> Assembler<'a> {
    pub fn new(classifier: &'a dyn Classifier, stats: &'a dyn StatsSink) -> Self {
        Self { classifier, stats }
    }

    /// `GET /parse/ua/{ua}`
    pub async fn user_agent(
        &self,
        raw: Result<Option<String>, MalformedInput>,
    ) -> Outcome<Document> {
        self.timed(&[OperationKind::Ua], async {
            match raw.map(UaQuery::legacy) {
                Ok(Some(query)) => self.ua_document(&query).await.into(),
                Ok(None) => Outcome::ValidationFailure(None),
                Err(e) => malformed(OperationKind::Ua, e),
            }
        })
        .await
    }

    /// `POST /parse/ua-v4`. A readable body is always a structured query,
    /// even when every field is absent.
    pub async fn client_hints(
        &self,
        request: Result<UaRequest, MalformedInput>,
    ) -> Outcome<Document> {
        self.timed(&[OperationKind::Ua], async {
            match request {
                Ok(request) => self.ua_document(&UaQuery::from(request)).await.into(),
                Err(e) => malformed(OperationKind::Ua, e),
            }
        })
        .await
    }

    /// `GET /parse/ip/{ip}`
    pub async fn address(
        &self,
        raw: Result<Option<String>, MalformedInput>,
    ) -> Outcome<Document> {
        self.timed(&[OperationKind::Ip], async {
            match raw.map(IpQuery::new) {
                Ok(Some(query)) => self.ip_document(&query).await.into(),
                Ok(None) => Outcome::ValidationFailure(None),
                Err(e) => malformed(OperationKind::Ip, e),
            }
        })
        .await
    }

    /// `GET /parse?ua=&ip=`. Both kinds are sampled with the same elapsed
    /// time, measured once around the whole attempt.
    pub async fn combined(
        &self,
        raw: Result<CombinedParams, MalformedInput>,
    ) -> Outcome<CombinedDocument> {
        self.timed(&[OperationKind::Ua, OperationKind::Ip], async {
            let params = match raw {
                Ok(params) => params,
                Err(e) => return malformed(OperationKind::Ua, e),
            };
            match CombinedQuery::new(params.ua, params.ip) {
                Ok(query) => self.combined_document(&query).await.into(),
                Err(_) => Outcome::ValidationFailure(None),
            }
        })
        .await
    }

    /// Run `work`, recording one sample per kind once it finishes or is
    /// dropped unfinished.
    async fn timed<T>(
        &self,
        kinds: &[OperationKind],
        work: impl Future<Output = Outcome<T>>,
    ) -> Outcome<T> {
        let _sample = Sample {
            stats: self.stats,
            kinds,
            started: Instant::now(),
        };
        work.await
    }

    async fn ua_document(&self, query: &UaQuery) -> Result<Document, Failure> {
        let result = self
            .classifier
            .classify_user_agent(query)
            .await
            .map_err(|e| classify_failure(OperationKind::Ua, query.ua_string(), e))?;
        Ok(flatten_ua(query.echo(), &result))
    }

    async fn ip_document(&self, query: &IpQuery) -> Result<Document, Failure> {
        let result = self
            .classifier
            .classify_address(query.as_str())
            .await
            .map_err(|e| classify_failure(OperationKind::Ip, query.as_str(), e))?;
        Ok(flatten_ip(query.as_str(), &result))
    }

    /// Any failing side fails the whole request; no partial document.
    async fn combined_document(&self, query: &CombinedQuery) -> Result<CombinedDocument, Failure> {
        let user_agent = match query.ua() {
            Some(ua) => Some(self.ua_document(ua).await?),
            None => None,
        };
        let ip_address = match query.ip() {
            Some(ip) => Some(self.ip_document(ip).await?),
            None => None,
        };
        Ok(CombinedDocument {
            user_agent,
            ip_address,
        })
    }
}
