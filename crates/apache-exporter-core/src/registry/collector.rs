use std::sync::Arc;

use dashmap::DashMap;

use crate::error::Result;

use super::desc::{MetricDesc, MetricFamily, MetricKind};
use super::memory::InMemoryStorage;
use super::render::render_text;
use super::storage::{MetricStorage, SeriesWrite, WriteOp};

/// Registry of metric families over a shared storage backend.
///
/// Cheap to clone. Several registries may share one storage; each keeps its
/// own view of registered descriptors and rejects conflicting definitions,
/// both against itself and against families the storage already holds.
#[derive(Clone)]
pub struct Registry {
    storage: Arc<dyn MetricStorage>,
    descs: Arc<DashMap<String, Arc<MetricDesc>>>,
}

impl Registry {
    pub fn new(storage: Arc<dyn MetricStorage>) -> Self {
        Self {
            storage,
            descs: Arc::new(DashMap::new()),
        }
    }

    /// Registry over a fresh [`InMemoryStorage`].
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryStorage::new()))
    }

    pub fn register_counter(
        &self,
        namespace: &str,
        name: &str,
        help: &str,
        label_names: &[&str],
    ) -> Result<Counter> {
        let desc = self.register(namespace, name, help, MetricKind::Counter, label_names)?;
        Ok(Counter {
            desc,
            storage: Arc::clone(&self.storage),
        })
    }

    pub fn register_gauge(
        &self,
        namespace: &str,
        name: &str,
        help: &str,
        label_names: &[&str],
    ) -> Result<Gauge> {
        let desc = self.register(namespace, name, help, MetricKind::Gauge, label_names)?;
        Ok(Gauge {
            desc,
            storage: Arc::clone(&self.storage),
        })
    }

    fn register(
        &self,
        namespace: &str,
        name: &str,
        help: &str,
        kind: MetricKind,
        label_names: &[&str],
    ) -> Result<Arc<MetricDesc>> {
        let desc = MetricDesc::new(namespace, name, help, kind, label_names)?;
        if let Some(known) = self.descs.get(&desc.name) {
            known.ensure_compatible(&desc)?;
            return Ok(Arc::clone(known.value()));
        }

        // first registration of this name: the store may already hold it
        self.storage.check_compatible(&desc)?;
        let registered = self
            .descs
            .entry(desc.name.clone())
            .or_insert_with(|| Arc::new(desc.clone()))
            .value()
            .clone();
        registered.ensure_compatible(&desc)?;
        Ok(registered)
    }

    /// Apply every write in `batch` at once; nothing lands if one is rejected.
    pub fn commit(&self, batch: &WriteBatch) -> Result<()> {
        self.storage.apply_batch(&batch.writes)
    }

    /// Snapshot every family held by the storage.
    pub fn gather(&self) -> Result<Vec<MetricFamily>> {
        self.storage.collect()
    }

    /// [`gather`](Self::gather) rendered in text exposition format.
    pub fn render(&self) -> Result<String> {
        Ok(render_text(&self.gather()?))
    }
}

/// Handle to a registered counter family.
#[derive(Clone)]
pub struct Counter {
    desc: Arc<MetricDesc>,
    storage: Arc<dyn MetricStorage>,
}

impl Counter {
    /// Increment by 1.
    pub fn inc(&self, label_values: &[&str]) -> Result<()> {
        self.inc_by(1, label_values)
    }

    /// Increment by an arbitrary value. Zero materializes the series.
    pub fn inc_by(&self, v: u64, label_values: &[&str]) -> Result<()> {
        self.storage.counter_inc_by(&self.desc, label_values, v)
    }
}

/// Handle to a registered gauge family.
#[derive(Clone)]
pub struct Gauge {
    desc: Arc<MetricDesc>,
    storage: Arc<dyn MetricStorage>,
}

impl Gauge {
    pub fn set(&self, v: i64, label_values: &[&str]) -> Result<()> {
        self.storage.gauge_set(&self.desc, label_values, v)
    }
}

/// Writes collected from several handles, committed together with
/// [`Registry::commit`].
#[derive(Debug, Default)]
pub struct WriteBatch {
    writes: Vec<SeriesWrite>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc_by(&mut self, counter: &Counter, v: u64, label_values: &[&str]) -> &mut Self {
        self.push(&counter.desc, label_values, WriteOp::IncBy(v))
    }

    pub fn set(&mut self, gauge: &Gauge, v: i64, label_values: &[&str]) -> &mut Self {
        self.push(&gauge.desc, label_values, WriteOp::Set(v))
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    fn push(&mut self, desc: &Arc<MetricDesc>, label_values: &[&str], op: WriteOp) -> &mut Self {
        self.writes.push(SeriesWrite {
            desc: Arc::clone(desc),
            label_values: label_values.iter().map(|v| v.to_string()).collect(),
            op,
        });
        self
    }
}
