use std::sync::Arc;

use crate::error::{ExporterError, Result};

use super::desc::{MetricDesc, MetricFamily, MetricKind};

/// One pending write to a single series.
#[derive(Debug, Clone)]
pub struct SeriesWrite {
    pub desc: Arc<MetricDesc>,
    pub label_values: Vec<String>,
    pub op: WriteOp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOp {
    IncBy(u64),
    Set(i64),
}

impl SeriesWrite {
    pub fn labels(&self) -> Vec<&str> {
        self.label_values.iter().map(String::as_str).collect()
    }

    /// Arity and kind checks that need no stored state.
    pub fn validate(&self) -> Result<()> {
        self.desc.check_labels(&self.labels())?;
        match (self.desc.kind, self.op) {
            (MetricKind::Counter, WriteOp::IncBy(_)) | (MetricKind::Gauge, WriteOp::Set(_)) => {
                Ok(())
            }
            (MetricKind::Gauge, WriteOp::IncBy(_)) => Err(ExporterError::Registration(format!(
                "{} is a gauge, cannot increase it as a counter",
                self.desc.name
            ))),
            (MetricKind::Counter, WriteOp::Set(_)) => Err(ExporterError::Registration(format!(
                "{} is a counter, cannot set it as a gauge",
                self.desc.name
            ))),
        }
    }
}

/// Backing store for metric series.
///
/// Implementations keep the descriptor next to the samples so that any
/// registry opened over the same store can render the families it holds.
/// Single-series calls must be atomic per series.
pub trait MetricStorage: Send + Sync {
    /// Increase a counter series by `v` (creating it at zero first).
    fn counter_inc_by(&self, desc: &MetricDesc, label_values: &[&str], v: u64) -> Result<()>;

    /// Set a gauge series to `v`.
    fn gauge_set(&self, desc: &MetricDesc, label_values: &[&str], v: i64) -> Result<()>;

    /// Fail if the store already holds a family named like `desc` with a
    /// different shape.
    fn check_compatible(&self, desc: &MetricDesc) -> Result<()>;

    /// Apply several writes. Every write is checked before the first one
    /// lands, so a rejected batch leaves the store untouched.
    fn apply_batch(&self, writes: &[SeriesWrite]) -> Result<()> {
        for w in writes {
            w.validate()?;
            self.check_compatible(&w.desc)?;
        }
        for w in writes {
            match w.op {
                WriteOp::IncBy(v) => self.counter_inc_by(&w.desc, &w.labels(), v)?,
                WriteOp::Set(v) => self.gauge_set(&w.desc, &w.labels(), v)?,
            }
        }
        Ok(())
    }

    /// All stored families sorted by name, samples sorted by label values.
    fn collect(&self) -> Result<Vec<MetricFamily>>;
}
