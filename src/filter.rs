//! Filtering contract for crash report batches.
//!
//! Defines [`ReportFilter`], the shape shared by every stage of a report
//! pipeline (compression, encryption, delivery). A filter receives a whole
//! [`ReportBatch`], and either hands it on through a [`CompletionCallback`] or
//! returns it inside a [`FilteringFailed`] error.

use std::error::Error;

use thiserror::Error;

/// One serialized crash report. Opaque to every filter in this crate.
pub type Report = Vec<u8>;

/// Ordered collection of reports processed together.
pub type ReportBatch = Vec<Report>;

/// Success notification invoked once per delivered batch.
pub type CompletionCallback = Box<dyn FnOnce(ReportBatch) + Send>;

/// Boxed cause carried by [`FilteringFailed`].
pub type BoxedCause = Box<dyn Error + Send + Sync + 'static>;

/// Trait implemented by all report filters.
///
/// Filters are `Send + Sync` so a pipeline can hold them as
/// `Arc<dyn ReportFilter>` and drive them from worker threads.
pub trait ReportFilter: Send + Sync {
    /// Process `reports`, invoking `completion` with the same batch on success.
    ///
    /// # Errors
    ///
    /// Returns [`FilteringFailed`] holding the cause and the untouched batch.
    /// `completion` is never invoked when an error is returned.
    fn filter_reports(
        &self,
        reports: ReportBatch,
        completion: CompletionCallback,
    ) -> Result<(), FilteringFailed>;
}

/// A filter stage failed for the whole batch.
///
/// The batch is returned to the caller so an orchestrator can retry, park or
/// discard it as a unit.
#[derive(Debug, Error)]
#[error("filtering {} report(s) failed: {cause}", .reports.len())]
pub struct FilteringFailed {
    #[source]
    cause: BoxedCause,
    reports: ReportBatch,
}

impl FilteringFailed {
    /// Wrap `cause` together with the batch that failed.
    pub fn new(cause: impl Into<BoxedCause>, reports: ReportBatch) -> Self {
        Self {
            cause: cause.into(),
            reports,
        }
    }

    /// Underlying error that stopped the batch.
    pub fn cause(&self) -> &(dyn Error + Send + Sync + 'static) {
        self.cause.as_ref()
    }

    /// Borrow the batch that failed.
    pub fn reports(&self) -> &[Report] {
        &self.reports
    }

    /// Take back ownership of the failed batch.
    pub fn into_reports(self) -> ReportBatch {
        self.reports
    }

    /// Split into the cause and the failed batch.
    pub fn into_parts(self) -> (BoxedCause, ReportBatch) {
        (self.cause, self.reports)
    }
}
