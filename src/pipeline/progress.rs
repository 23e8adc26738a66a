//! Build progress events
//!
//! The edge builder optionally streams progress over an unbounded channel
//! so long runs can be observed without blocking the build loop. Events
//! are fire-and-forget: a dropped receiver never fails the build.

use crate::graph::EmployerId;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use super::builder::BuildReport;

/// Progress emitted while building co-employment edges
#[derive(Debug, Clone, PartialEq)]
pub enum BuildEvent {
    /// Build started, after aggregation and employer filtering
    Started { employers_total: usize },
    /// One batch of employers committed to the store
    BatchCommitted {
        employers_processed: usize,
        employers_total: usize,
        edges_written: usize,
        elapsed_seconds: f64,
        /// Linear projection from throughput so far; None until the first
        /// batch lands
        eta_seconds: Option<f64>,
    },
    /// One employer was skipped; the batch keeps going
    EmployerFailed {
        employer_id: EmployerId,
        message: String,
    },
    /// Build finished
    Completed { report: BuildReport },
}

/// Channel pair for observing a build.
pub fn progress_channel() -> (UnboundedSender<BuildEvent>, UnboundedReceiver<BuildEvent>) {
    mpsc::unbounded_channel()
}
