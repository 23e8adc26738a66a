//! Co-employment edge builder
//!
//! Turns aggregated employment spans into persisted co-employment edges,
//! one row per (pair, employer). Employers are processed smallest first
//! and committed in batches, so an interrupted run can simply be rerun:
//! writes are idempotent upserts and already-written employers converge
//! to the same rows. A failing employer is counted and skipped without
//! aborting its batch.

use chrono::{Datelike, NaiveDate, Utc};
use rustc_hash::FxHashMap;
use std::time::Instant;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

use crate::graph::{EmployerId, PairKey, PersonId};
use crate::store::{CoemploymentRow, SourceStore};

use super::aggregate::{aggregate_employments, EmploymentRecord, EmploymentSpan};
use super::progress::BuildEvent;
use super::{PipelineError, PipelineResult};

/// Tuning for one build run
#[derive(Debug, Clone)]
pub struct BuilderConfig {
    /// Employers per committed write batch
    pub batch_size: usize,
    /// Substitute end date for ongoing employment; injectable for tests
    pub as_of: NaiveDate,
    /// Truncate the co-employment store before building
    pub rebuild: bool,
    /// Skip employers whose pair expansion exceeds this count
    pub max_pairs_per_employer: usize,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        BuilderConfig {
            batch_size: 50,
            as_of: Utc::now().date_naive(),
            rebuild: false,
            max_pairs_per_employer: 2_000_000,
        }
    }
}

/// Outcome of a build run
#[derive(Debug, Clone, PartialEq)]
pub struct BuildReport {
    pub employers_total: usize,
    pub employers_processed: usize,
    pub employers_failed: usize,
    pub edges_written: usize,
    /// Input rows dropped during aggregation for missing identifiers
    pub rows_skipped: usize,
    pub elapsed_seconds: f64,
}

/// Batched, resumable builder for the co-employment edge family
pub struct CoemploymentEdgeBuilder {
    config: BuilderConfig,
    progress: Option<UnboundedSender<BuildEvent>>,
}

impl CoemploymentEdgeBuilder {
    pub fn new(config: BuilderConfig) -> Self {
        CoemploymentEdgeBuilder {
            config,
            progress: None,
        }
    }

    /// Stream [`BuildEvent`]s to the given sender. A dropped receiver is
    /// ignored.
    pub fn with_progress(mut self, sender: UnboundedSender<BuildEvent>) -> Self {
        self.progress = Some(sender);
        self
    }

    /// Aggregate raw employment rows and write co-employment edges.
    pub fn run(
        &self,
        store: &mut SourceStore,
        rows: impl IntoIterator<Item = EmploymentRecord>,
    ) -> PipelineResult<BuildReport> {
        let started = Instant::now();

        let aggregate = aggregate_employments(rows);
        if aggregate.rows_skipped > 0 {
            debug!(
                skipped = aggregate.rows_skipped,
                "employment rows dropped: missing person or employer id"
            );
        }

        let mut by_employer: FxHashMap<EmployerId, Vec<(PersonId, EmploymentSpan)>> =
            FxHashMap::default();
        for ((person, employer), span) in aggregate.spans {
            by_employer.entry(employer).or_default().push((person, span));
        }

        // Employers with a single known employee yield no pairs. Smallest
        // employers first keeps early batches cheap and makes progress
        // reporting meaningful on skewed company sizes.
        let mut employers: Vec<(EmployerId, Vec<(PersonId, EmploymentSpan)>)> = by_employer
            .into_iter()
            .filter(|(_, employees)| employees.len() >= 2)
            .collect();
        employers.sort_by_key(|(id, employees)| (employees.len(), *id));

        if self.config.rebuild {
            store.truncate_coemployment()?;
        }

        self.emit(BuildEvent::Started {
            employers_total: employers.len(),
        });

        let mut report = BuildReport {
            employers_total: employers.len(),
            employers_processed: 0,
            employers_failed: 0,
            edges_written: 0,
            rows_skipped: aggregate.rows_skipped,
            elapsed_seconds: 0.0,
        };

        for chunk in employers.chunks(self.config.batch_size.max(1)) {
            let mut batch_rows = Vec::new();
            for (employer, employees) in chunk {
                match self.employer_rows(*employer, employees) {
                    Ok(rows) => {
                        batch_rows.extend(rows);
                        report.employers_processed += 1;
                    }
                    Err(err) => {
                        warn!(employer = %employer, error = %err, "employer skipped");
                        report.employers_failed += 1;
                        self.emit(BuildEvent::EmployerFailed {
                            employer_id: *employer,
                            message: err.to_string(),
                        });
                    }
                }
            }

            store.write_coemployment_batch(&batch_rows)?;
            report.edges_written += batch_rows.len();

            let done = report.employers_processed + report.employers_failed;
            let elapsed = started.elapsed().as_secs_f64();
            let eta = (done > 0 && done < report.employers_total)
                .then(|| elapsed / done as f64 * (report.employers_total - done) as f64);
            self.emit(BuildEvent::BatchCommitted {
                employers_processed: done,
                employers_total: report.employers_total,
                edges_written: report.edges_written,
                elapsed_seconds: elapsed,
                eta_seconds: eta,
            });
        }

        report.elapsed_seconds = started.elapsed().as_secs_f64();
        info!(
            employers = report.employers_processed,
            failed = report.employers_failed,
            edges = report.edges_written,
            elapsed_seconds = report.elapsed_seconds,
            "co-employment build finished"
        );
        self.emit(BuildEvent::Completed {
            report: report.clone(),
        });

        Ok(report)
    }

    fn employer_rows(
        &self,
        employer: EmployerId,
        employees: &[(PersonId, EmploymentSpan)],
    ) -> PipelineResult<Vec<CoemploymentRow>> {
        let pairs = employees.len() * (employees.len() - 1) / 2;
        if pairs > self.config.max_pairs_per_employer {
            return Err(PipelineError::EmployerTooLarge {
                employer,
                pairs,
                cap: self.config.max_pairs_per_employer,
            });
        }

        let mut employees: Vec<&(PersonId, EmploymentSpan)> = employees.iter().collect();
        employees.sort_by_key(|(person, _)| *person);

        let mut rows = Vec::with_capacity(pairs);
        for (i, (x, span_x)) in employees.iter().enumerate() {
            for (y, span_y) in employees.iter().skip(i + 1) {
                // Distinct sorted persons, so the pair always exists.
                let Some(pair) = PairKey::new(*x, *y) else {
                    continue;
                };
                let (overlap_months, overlap_start, overlap_end) =
                    tenure_overlap(span_x, span_y, self.config.as_of);
                rows.push(CoemploymentRow {
                    pair,
                    employer_id: employer,
                    overlap_months,
                    overlap_start,
                    overlap_end,
                });
            }
        }
        Ok(rows)
    }

    fn emit(&self, event: BuildEvent) {
        if let Some(sender) = &self.progress {
            let _ = sender.send(event);
        }
    }
}

/// Whole months between two dates, negative when `end` precedes `start`.
fn months_between(start: NaiveDate, end: NaiveDate) -> i32 {
    (end.year() - start.year()) * 12 + end.month() as i32 - start.month() as i32
}

/// Overlap of two employment spans at the same employer.
///
/// A span missing its start yields an unknown overlap (None), which is
/// distinct from a measured zero. Ongoing spans end at `as_of`. Disjoint
/// tenures yield zero months and no overlap window.
fn tenure_overlap(
    a: &EmploymentSpan,
    b: &EmploymentSpan,
    as_of: NaiveDate,
) -> (Option<u32>, Option<NaiveDate>, Option<NaiveDate>) {
    let (Some(start_a), Some(start_b)) = (a.start, b.start) else {
        return (None, None, None);
    };
    let start = start_a.max(start_b);
    let end = a.end.unwrap_or(as_of).min(b.end.unwrap_or(as_of));
    if end < start {
        return (Some(0), None, None);
    }
    let months = months_between(start, end).max(0) as u32;
    (Some(months), Some(start), Some(end))
}
