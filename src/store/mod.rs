//! Persisted source store
//!
//! RocksDB-backed storage for the three record families the graph is
//! assembled from: person/profile records, collaboration edges, and
//! derived co-employment edges. One column family per record family;
//! values are bincode rows, keys are big-endian ids so scans come back in
//! a deterministic order.
//!
//! The co-employment family may be truncated and rebuilt at any time by
//! the edge builder. External readers must not assume point-in-time
//! consistency during a rebuild window; there is no transactional
//! isolation across the clear+rebuild sequence.

use crate::graph::{EmployerId, PairKey, PersonId};
use chrono::NaiveDate;
use rocksdb::{ColumnFamilyDescriptor, IteratorMode, Options, WriteBatch, DB};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Storage errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// RocksDB error
    #[error("RocksDB error: {0}")]
    RocksDb(#[from] rocksdb::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    /// Column family error
    #[error("Column family error: {0}")]
    ColumnFamily(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A person/profile record as imported from the source tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonRecord {
    pub person_id: PersonId,
    pub full_name: String,
    pub headline: Option<String>,
    pub location: Option<String>,
    pub external_handle: Option<String>,
    pub external_follower_count: Option<u32>,
    pub external_repo_count: Option<u32>,
}

/// A collaboration edge record, canonically ordered
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollaborationRow {
    pub pair: PairKey,
    pub strength: f64,
    pub shared_repo_count: Option<u32>,
    pub shared_contribution_count: Option<u32>,
}

impl CollaborationRow {
    /// Canonicalize the pair; None for a self-pair.
    pub fn new(
        a: PersonId,
        b: PersonId,
        strength: f64,
        shared_repo_count: Option<u32>,
        shared_contribution_count: Option<u32>,
    ) -> Option<Self> {
        PairKey::new(a, b).map(|pair| CollaborationRow {
            pair,
            strength,
            shared_repo_count,
            shared_contribution_count,
        })
    }
}

/// One persisted co-employment row per (pair, employer).
///
/// Two people who overlapped at several employers get several rows; the
/// in-memory assembly merges them onto one edge. `overlap_months` of None
/// means "overlap unknown", never "no overlap".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoemploymentRow {
    pub pair: PairKey,
    pub employer_id: EmployerId,
    pub overlap_months: Option<u32>,
    pub overlap_start: Option<NaiveDate>,
    pub overlap_end: Option<NaiveDate>,
}

const CF_PERSONS: &str = "persons";
const CF_COLLABORATION: &str = "collaboration";
const CF_COEMPLOYMENT: &str = "coemployment";

/// RocksDB-backed source store
pub struct SourceStore {
    db: DB,
}

impl SourceStore {
    /// Open or create the store at the given path.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);
        opts.set_compression_type(rocksdb::DBCompressionType::Lz4);

        let cf_descriptors = vec![
            ColumnFamilyDescriptor::new("default", Options::default()),
            ColumnFamilyDescriptor::new(CF_PERSONS, Self::cf_options()),
            ColumnFamilyDescriptor::new(CF_COLLABORATION, Self::cf_options()),
            ColumnFamilyDescriptor::new(CF_COEMPLOYMENT, Self::cf_options()),
        ];

        let db = DB::open_cf_descriptors(&opts, path.as_ref(), cf_descriptors)?;
        info!(path = %path.as_ref().display(), "source store opened");

        Ok(SourceStore { db })
    }

    fn cf_options() -> Options {
        let mut opts = Options::default();
        opts.set_compression_type(rocksdb::DBCompressionType::Lz4);
        opts
    }

    fn cf(&self, name: &str) -> StoreResult<&rocksdb::ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::ColumnFamily(name.to_string()))
    }

    fn person_key(id: PersonId) -> [u8; 8] {
        id.as_u64().to_be_bytes()
    }

    fn pair_key_bytes(pair: PairKey) -> [u8; 16] {
        let mut key = [0u8; 16];
        key[..8].copy_from_slice(&pair.a().as_u64().to_be_bytes());
        key[8..].copy_from_slice(&pair.b().as_u64().to_be_bytes());
        key
    }

    fn coemployment_key(pair: PairKey, employer: EmployerId) -> [u8; 24] {
        let mut key = [0u8; 24];
        key[..16].copy_from_slice(&Self::pair_key_bytes(pair));
        key[16..].copy_from_slice(&employer.as_u64().to_be_bytes());
        key
    }

    // ============================================================
    // Persons
    // ============================================================

    pub fn put_person(&self, record: &PersonRecord) -> StoreResult<()> {
        let cf = self.cf(CF_PERSONS)?;
        let value = bincode::serialize(record)?;
        self.db.put_cf(cf, Self::person_key(record.person_id), value)?;
        Ok(())
    }

    pub fn put_persons<'a>(
        &self,
        records: impl IntoIterator<Item = &'a PersonRecord>,
    ) -> StoreResult<()> {
        let cf = self.cf(CF_PERSONS)?;
        let mut batch = WriteBatch::default();
        for record in records {
            let value = bincode::serialize(record)?;
            batch.put_cf(cf, Self::person_key(record.person_id), value);
        }
        self.db.write(batch)?;
        Ok(())
    }

    /// Scan person records in ascending id order, optionally capped.
    pub fn scan_persons(&self, limit: Option<usize>) -> StoreResult<Vec<PersonRecord>> {
        let cf = self.cf(CF_PERSONS)?;
        let mut records = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            if let Some(cap) = limit {
                if records.len() >= cap {
                    break;
                }
            }
            let (_key, value) = item?;
            records.push(bincode::deserialize(&value)?);
        }
        Ok(records)
    }

    pub fn person_count(&self) -> StoreResult<usize> {
        self.count(CF_PERSONS)
    }

    // ============================================================
    // Collaboration edges
    // ============================================================

    pub fn put_collaboration(&self, row: &CollaborationRow) -> StoreResult<()> {
        let cf = self.cf(CF_COLLABORATION)?;
        let value = bincode::serialize(row)?;
        self.db.put_cf(cf, Self::pair_key_bytes(row.pair), value)?;
        Ok(())
    }

    pub fn scan_collaborations(&self) -> StoreResult<Vec<CollaborationRow>> {
        let cf = self.cf(CF_COLLABORATION)?;
        let mut rows = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_key, value) = item?;
            rows.push(bincode::deserialize(&value)?);
        }
        Ok(rows)
    }

    pub fn collaboration_count(&self) -> StoreResult<usize> {
        self.count(CF_COLLABORATION)
    }

    // ============================================================
    // Co-employment edges
    // ============================================================

    /// Idempotent upsert keyed on (pair, employer): re-running the edge
    /// builder over identical input converges to the same row set.
    pub fn upsert_coemployment(&self, row: &CoemploymentRow) -> StoreResult<()> {
        let cf = self.cf(CF_COEMPLOYMENT)?;
        let value = bincode::serialize(row)?;
        self.db
            .put_cf(cf, Self::coemployment_key(row.pair, row.employer_id), value)?;
        Ok(())
    }

    /// Write one builder batch atomically. A crash between batches loses
    /// at most the in-flight batch.
    pub fn write_coemployment_batch(&self, rows: &[CoemploymentRow]) -> StoreResult<()> {
        let cf = self.cf(CF_COEMPLOYMENT)?;
        let mut batch = WriteBatch::default();
        for row in rows {
            let value = bincode::serialize(row)?;
            batch.put_cf(cf, Self::coemployment_key(row.pair, row.employer_id), value);
        }
        self.db.write(batch)?;
        Ok(())
    }

    pub fn scan_coemployment(&self) -> StoreResult<Vec<CoemploymentRow>> {
        let cf = self.cf(CF_COEMPLOYMENT)?;
        let mut rows = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_key, value) = item?;
            rows.push(bincode::deserialize(&value)?);
        }
        Ok(rows)
    }

    pub fn coemployment_count(&self) -> StoreResult<usize> {
        self.count(CF_COEMPLOYMENT)
    }

    /// Bulk-clear the co-employment family by dropping and recreating the
    /// column family. Far cheaper than row-by-row deletes before a full
    /// rebuild; readers see an empty family until the rebuild completes.
    pub fn truncate_coemployment(&mut self) -> StoreResult<()> {
        self.db.drop_cf(CF_COEMPLOYMENT)?;
        self.db.create_cf(CF_COEMPLOYMENT, &Self::cf_options())?;
        info!("co-employment edge store truncated");
        Ok(())
    }

    fn count(&self, cf_name: &str) -> StoreResult<usize> {
        let cf = self.cf(cf_name)?;
        let mut n = 0;
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            item?;
            n += 1;
        }
        Ok(n)
    }
}
