//! End-to-end tests for the ingestion pipeline: aggregation, edge
//! building, persistence and graph assembly.

use chrono::NaiveDate;
use talentgraph::graph::GraphAssembler;
use talentgraph::pipeline::{
    progress_channel, BuildEvent, BuilderConfig, CoemploymentEdgeBuilder, EmploymentRecord,
};
use talentgraph::store::{PersonRecord, SourceStore};
use talentgraph::{EmployerId, PersonId};
use tempfile::TempDir;

fn date(y: i32, m: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, 1).unwrap()
}

fn employment(
    person: u64,
    employer: u64,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> EmploymentRecord {
    EmploymentRecord {
        person_id: Some(PersonId::new(person)),
        employer_id: Some(EmployerId::new(employer)),
        start_date: start,
        end_date: end,
    }
}

fn person(id: u64) -> PersonRecord {
    PersonRecord {
        person_id: PersonId::new(id),
        full_name: format!("person-{id}"),
        headline: None,
        location: None,
        external_handle: None,
        external_follower_count: None,
        external_repo_count: None,
    }
}

fn config() -> BuilderConfig {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    BuilderConfig {
        as_of: date(2024, 1),
        ..Default::default()
    }
}

/// Three employers: two with three overlapping employees each, one with a
/// single employee. Six edges total, none from the lone employee, and the
/// assembled graph holds exactly the union of employees.
#[test]
fn test_end_to_end_build_and_assembly() {
    let dir = TempDir::new().unwrap();
    let mut store = SourceStore::open(dir.path()).unwrap();

    let mut rows = Vec::new();
    for p in [1, 2, 3] {
        rows.push(employment(p, 100, Some(date(2019, 1)), Some(date(2022, 1))));
    }
    for p in [4, 5, 6] {
        rows.push(employment(p, 200, Some(date(2020, 6)), None));
    }
    rows.push(employment(7, 300, Some(date(2021, 1)), None));

    let report = CoemploymentEdgeBuilder::new(config())
        .run(&mut store, rows)
        .unwrap();

    assert_eq!(report.employers_total, 2);
    assert_eq!(report.edges_written, 6); // C(3,2) + C(3,2)
    assert_eq!(report.employers_failed, 0);
    assert_eq!(store.coemployment_count().unwrap(), 6);

    let people: Vec<PersonRecord> = (1..=7).map(person).collect();
    store.put_persons(&people).unwrap();

    let graph = GraphAssembler::assemble(&store, None).unwrap();
    assert_eq!(graph.node_count(), 7);
    assert_eq!(graph.edge_count(), 6);
    assert_eq!(graph.degree(PersonId::new(7)), 0);

    // No self-loops and one edge per unordered pair, by construction of
    // the canonical pair key.
    for edge in graph.edges() {
        assert!(edge.pair.a() < edge.pair.b());
    }
}

#[test]
fn test_overlap_arithmetic_through_the_store() {
    let dir = TempDir::new().unwrap();
    let mut store = SourceStore::open(dir.path()).unwrap();

    let rows = vec![
        // Overlapping: 2021-01 .. 2021-06 = 5 months.
        employment(1, 10, Some(date(2020, 1)), Some(date(2021, 6))),
        employment(2, 10, Some(date(2021, 1)), Some(date(2022, 1))),
        // Sequential, never overlapping.
        employment(3, 20, Some(date(2020, 1)), Some(date(2020, 6))),
        employment(4, 20, Some(date(2021, 1)), Some(date(2021, 6))),
        // Unknown start on one side.
        employment(5, 30, None, Some(date(2021, 1))),
        employment(6, 30, Some(date(2020, 1)), None),
    ];
    CoemploymentEdgeBuilder::new(config())
        .run(&mut store, rows)
        .unwrap();

    let by_employer = |id: u64| {
        store
            .scan_coemployment()
            .unwrap()
            .into_iter()
            .find(|r| r.employer_id == EmployerId::new(id))
            .unwrap()
    };

    assert_eq!(by_employer(10).overlap_months, Some(5));
    assert_eq!(by_employer(20).overlap_months, Some(0));
    // Unknown is null, never zero.
    assert_eq!(by_employer(30).overlap_months, None);
}

#[test]
fn test_builder_is_idempotent_and_rebuild_matches_fresh() {
    let dir = TempDir::new().unwrap();
    let mut store = SourceStore::open(dir.path()).unwrap();

    let rows: Vec<EmploymentRecord> = (1..=4)
        .map(|p| employment(p, 10, Some(date(2020, 1)), None))
        .collect();

    CoemploymentEdgeBuilder::new(config())
        .run(&mut store, rows.clone())
        .unwrap();
    let fresh_count = store.coemployment_count().unwrap();
    assert_eq!(fresh_count, 6);

    // Rerun without rebuild: same edge set size, no duplicates.
    CoemploymentEdgeBuilder::new(config())
        .run(&mut store, rows.clone())
        .unwrap();
    assert_eq!(store.coemployment_count().unwrap(), fresh_count);

    // Truncate-and-rebuild converges to the same count as a fresh build.
    let rebuild = BuilderConfig {
        rebuild: true,
        ..config()
    };
    CoemploymentEdgeBuilder::new(rebuild)
        .run(&mut store, rows)
        .unwrap();
    assert_eq!(store.coemployment_count().unwrap(), fresh_count);
}

#[test]
fn test_progress_events_arrive_in_order_with_matching_totals() {
    let dir = TempDir::new().unwrap();
    let mut store = SourceStore::open(dir.path()).unwrap();
    let (tx, mut rx) = progress_channel();

    let mut rows = Vec::new();
    for employer in [10, 20, 30] {
        rows.push(employment(employer * 2, employer, Some(date(2020, 1)), None));
        rows.push(employment(employer * 2 + 1, employer, Some(date(2020, 1)), None));
    }

    let cfg = BuilderConfig {
        batch_size: 2,
        ..config()
    };
    let report = CoemploymentEdgeBuilder::new(cfg)
        .with_progress(tx)
        .run(&mut store, rows)
        .unwrap();

    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }

    assert!(matches!(
        events.first(),
        Some(BuildEvent::Started { employers_total: 3 })
    ));

    let mut last_processed = 0;
    let mut last_edges = 0;
    for event in &events {
        if let BuildEvent::BatchCommitted {
            employers_processed,
            employers_total,
            edges_written,
            ..
        } = event
        {
            assert!(*employers_processed > last_processed);
            assert!(*edges_written >= last_edges);
            assert_eq!(*employers_total, 3);
            last_processed = *employers_processed;
            last_edges = *edges_written;
        }
    }
    assert_eq!(last_processed, 3);

    match events.last() {
        Some(BuildEvent::Completed { report: emitted }) => {
            assert_eq!(emitted.edges_written, report.edges_written);
            assert_eq!(emitted.employers_processed, 3);
            assert_eq!(emitted.edges_written, last_edges);
        }
        other => panic!("expected Completed as the final event, got {other:?}"),
    }
}
