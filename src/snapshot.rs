//! Immutable model snapshots and atomic reload.
//!
//! A [`Snapshot`] bundles everything one build produced: the record store,
//! the resolved-slot table, the graph and its reverse index, and the build
//! report. It is never modified after construction, so any number of
//! threads can read it through an `Arc` without locking.
//!
//! [`SharedSchemaGraph`] holds the snapshot currently being served. A reload
//! builds the replacement completely before taking the write lock for a
//! single pointer swap; readers see either the old or the new model, never a
//! half-built one.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::config::BuildConfig;
use crate::graph::{self, GraphData};
use crate::index::RelationshipIndex;
use crate::report::BuildReport;
use crate::resolver::SlotTable;
use crate::storage::{RecordStore, SchemaRecords};
use crate::{Result, SchemaGraph};

/// One complete, read-only model.
#[derive(Debug)]
pub struct Snapshot {
    pub(crate) store: RecordStore,
    pub(crate) slots: SlotTable,
    pub(crate) graph: GraphData,
    pub(crate) index: RelationshipIndex,
    pub(crate) report: BuildReport,
    pub(crate) built_at: DateTime<Utc>,
}

impl Snapshot {
    /// Register `records` and build the full model.
    ///
    /// Fails on duplicate names and hierarchy cycles. Non-fatal defects are
    /// logged and kept in the report.
    pub fn build(records: SchemaRecords, config: BuildConfig) -> Result<Self> {
        let store = RecordStore::from_records(records)?;
        Self::from_store(store, config)
    }

    /// Build from an already-filled store.
    pub fn from_store(store: RecordStore, config: BuildConfig) -> Result<Self> {
        let out = graph::build(&store, &config)?;
        out.report.log();

        Ok(Self {
            store,
            slots: out.slots,
            graph: out.graph,
            index: out.index,
            report: out.report,
            built_at: Utc::now(),
        })
    }

    pub fn report(&self) -> &BuildReport {
        &self.report
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }
}

// ============================================================================
// SharedSchemaGraph
// ============================================================================

/// The snapshot currently being served, swappable as a whole.
#[derive(Debug)]
pub struct SharedSchemaGraph {
    current: RwLock<Arc<Snapshot>>,
    config: BuildConfig,
}

impl SharedSchemaGraph {
    /// Build the first snapshot. Nothing is served if this fails.
    pub fn build(records: SchemaRecords, config: BuildConfig) -> Result<Self> {
        let snapshot = Snapshot::build(records, config.clone())?;
        Ok(Self { current: RwLock::new(Arc::new(snapshot)), config })
    }

    /// A facade over the current snapshot. Later reloads do not affect it.
    pub fn load(&self) -> SchemaGraph {
        SchemaGraph::from_snapshot(Arc::clone(&*self.current.read()))
    }

    /// Build a new snapshot and swap it in.
    ///
    /// On error the previous snapshot keeps serving and the error is returned
    /// to the caller.
    pub fn reload(&self, records: SchemaRecords) -> Result<()> {
        let next = match Snapshot::build(records, self.config.clone()) {
            Ok(s) => Arc::new(s),
            Err(e) => {
                tracing::error!(error = %e, "schema reload failed; keeping previous snapshot");
                return Err(e);
            }
        };
        *self.current.write() = next;
        tracing::info!("schema snapshot swapped");
        Ok(())
    }
}
