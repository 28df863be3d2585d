use std::sync::Arc;

use parsegate_core::{
    assemble::Assembler,
    classifier::Classifier,
    config::Config,
    stats::{ParserStatistics, StatsSink},
};

/// Shared application state injected into every Axum handler via
/// [`axum::extract::State`].
///
/// The classifier and the statistics sink are trait objects so tests can
/// substitute stubs for the local databases.
pub struct AppState {
    /// Parsed configuration, loaded once at startup from environment variables.
    pub config: Arc<Config>,

    pub classifier: Arc<dyn Classifier>,

    /// Per-kind timing samples, shared by every request for the process lifetime.
    pub stats: Arc<dyn StatsSink>,
}

impl AppState {
    /// Construct state with a fresh in-memory [`ParserStatistics`].
    pub fn new(classifier: Arc<dyn Classifier>, config: Config) -> Self {
        Self::with_stats(classifier, Arc::new(ParserStatistics::new()), config)
    }

    pub fn with_stats(
        classifier: Arc<dyn Classifier>,
        stats: Arc<dyn StatsSink>,
        config: Config,
    ) -> Self {
        Self {
            config: Arc::new(config),
            classifier,
            stats,
        }
    }

    /// An assembler borrowing this state's classifier and sink.
    pub fn assembler(&self) -> Assembler<'_> {
        Assembler::new(self.classifier.as_ref(), self.stats.as_ref())
    }
}
