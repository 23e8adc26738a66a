//! Ingestion pipeline: employment aggregation and edge building

use thiserror::Error;

use crate::graph::EmployerId;
use crate::store::StoreError;

pub mod aggregate;
pub mod builder;
pub mod progress;

pub use aggregate::{aggregate_employments, EmploymentAggregate, EmploymentRecord, EmploymentSpan};
pub use builder::{BuildReport, BuilderConfig, CoemploymentEdgeBuilder};
pub use progress::{progress_channel, BuildEvent};

/// Pipeline errors
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Underlying store failure
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Pair expansion for one employer exceeds the configured cap
    #[error("employer {employer}: {pairs} pairs exceeds cap of {cap}")]
    EmployerTooLarge {
        employer: EmployerId,
        pairs: usize,
        cap: usize,
    },
}

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;
