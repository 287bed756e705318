//! Filter builders and associated traits.
//!
//! Builders collect user supplied settings, validate them, and produce a
//! ready-to-use filter. [`FilterBuilderTrait::build`] erases the concrete type
//! so orchestration code can hold any stage as `Arc<dyn ReportFilter>`.

use std::{io, sync::Arc};

use thiserror::Error;

use crate::filter::ReportFilter;

pub mod http_builder;

pub use http_builder::HttpFilterBuilder;

/// Errors that may occur while building a filter.
#[derive(Debug, Error)]
pub enum FilterBuildError {
    /// Invalid user supplied configuration.
    #[error("invalid filter configuration: {0}")]
    InvalidConfig(String),
    /// Underlying I/O error whilst reading configuration.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// The platform TLS connector could not be created.
    #[error("failed to initialise TLS: {0}")]
    Tls(#[from] native_tls::Error),
}

/// Trait implemented by all filter builders.
pub trait FilterBuilderTrait: Send + Sync {
    type Filter: ReportFilter + 'static;

    fn build_inner(&self) -> Result<Self::Filter, FilterBuildError>;

    fn build(&self) -> Result<Arc<dyn ReportFilter>, FilterBuildError> {
        Ok(Arc::new(self.build_inner()?))
    }
}
