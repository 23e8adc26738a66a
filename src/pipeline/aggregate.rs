//! Employment aggregation
//!
//! Collapses multiple employment stints per (person, employer) into one
//! date range before pair generation. Missing dates stay missing: a null
//! end means "ongoing" and dominates any dated end, and a span with no
//! known start produces an unknown overlap downstream rather than a zero.

use crate::graph::{EmployerId, PersonId};
use chrono::NaiveDate;
use rustc_hash::FxHashMap;

/// One raw employment stint as imported from the source tables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmploymentRecord {
    pub person_id: Option<PersonId>,
    pub employer_id: Option<EmployerId>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Aggregated range for one (person, employer) pair.
///
/// `end` of None means at least one contributing stint is ongoing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmploymentSpan {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl EmploymentSpan {
    fn from_record(record: &EmploymentRecord) -> Self {
        EmploymentSpan {
            start: record.start_date,
            end: record.end_date,
        }
    }

    fn merge(&mut self, record: &EmploymentRecord) {
        self.start = match (self.start, record.start_date) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        // None (ongoing) dominates: the person is still plausibly there.
        self.end = match (self.end, record.end_date) {
            (Some(a), Some(b)) => Some(a.max(b)),
            _ => None,
        };
    }
}

/// Result of aggregating raw employment rows
#[derive(Debug)]
pub struct EmploymentAggregate {
    pub spans: FxHashMap<(PersonId, EmployerId), EmploymentSpan>,
    /// Rows dropped for lacking a person or employer identifier
    pub rows_skipped: usize,
}

/// Collapse raw stints into one span per (person, employer).
pub fn aggregate_employments(
    rows: impl IntoIterator<Item = EmploymentRecord>,
) -> EmploymentAggregate {
    let mut spans: FxHashMap<(PersonId, EmployerId), EmploymentSpan> = FxHashMap::default();
    let mut rows_skipped = 0usize;

    for record in rows {
        let (Some(person), Some(employer)) = (record.person_id, record.employer_id) else {
            rows_skipped += 1;
            continue;
        };

        spans
            .entry((person, employer))
            .and_modify(|span| span.merge(&record))
            .or_insert_with(|| EmploymentSpan::from_record(&record));
    }

    EmploymentAggregate { spans, rows_skipped }
}
