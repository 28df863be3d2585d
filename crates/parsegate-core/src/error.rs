use thiserror::Error;

/// Failures surfaced by a [`Classifier`](crate::classifier::Classifier).
///
/// The variants are the failure classes the response assembler distinguishes
/// when choosing a status; everything the backend cannot place into one of
/// the first three buckets belongs in `Other`.
#[derive(Debug, Error)]
pub enum ClassifyError {
    /// The specimen was understood to be malformed. The message is returned
    /// to the client verbatim.
    #[error("{0}")]
    Rejected(String),

    /// An address specimen could not be resolved to a host.
    #[error("unknown host: {0}")]
    UnknownHost(String),

    /// The backing data source is unavailable or returned an error.
    #[error("backing store failure: {0}")]
    Store(#[source] anyhow::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
