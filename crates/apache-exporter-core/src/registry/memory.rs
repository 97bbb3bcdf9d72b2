//! In-process metric storage.
//!
//! Families live in a `DashMap` keyed by name. Series are keyed by their
//! label value tuple and hold an atomic, so concurrent scrapes only contend
//! on the shard that owns a series.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;

use crate::error::{ExporterError, Result};

use super::desc::{MetricDesc, MetricFamily, MetricKind, Sample};
use super::storage::MetricStorage;

enum Series {
    Counter(DashMap<Vec<String>, AtomicU64>),
    Gauge(DashMap<Vec<String>, AtomicI64>),
}

struct FamilyEntry {
    desc: MetricDesc,
    series: Series,
}

impl FamilyEntry {
    fn new(desc: MetricDesc) -> Self {
        let series = match desc.kind {
            MetricKind::Counter => Series::Counter(DashMap::new()),
            MetricKind::Gauge => Series::Gauge(DashMap::new()),
        };
        Self { desc, series }
    }

    fn samples(&self) -> Vec<Sample> {
        let mut out: Vec<Sample> = match &self.series {
            Series::Counter(m) => m
                .iter()
                .map(|r| Sample {
                    label_values: r.key().clone(),
                    value: r.value().load(Ordering::Relaxed) as f64,
                })
                .collect(),
            Series::Gauge(m) => m
                .iter()
                .map(|r| Sample {
                    label_values: r.key().clone(),
                    value: r.value().load(Ordering::Relaxed) as f64,
                })
                .collect(),
        };
        out.sort_by(|a, b| a.label_values.cmp(&b.label_values));
        out
    }
}

/// Metric storage that lives as long as the process.
#[derive(Default)]
pub struct InMemoryStorage {
    families: DashMap<String, Arc<FamilyEntry>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn family(&self, desc: &MetricDesc, label_values: &[&str]) -> Result<Arc<FamilyEntry>> {
        desc.check_labels(label_values)?;
        let family = self
            .families
            .entry(desc.name.clone())
            .or_insert_with(|| Arc::new(FamilyEntry::new(desc.clone())))
            .value()
            .clone();
        family.desc.ensure_compatible(desc)?;
        Ok(family)
    }
}

fn series_key(label_values: &[&str]) -> Vec<String> {
    label_values.iter().map(|v| v.to_string()).collect()
}

impl MetricStorage for InMemoryStorage {
    fn counter_inc_by(&self, desc: &MetricDesc, label_values: &[&str], v: u64) -> Result<()> {
        let family = self.family(desc, label_values)?;
        match &family.series {
            Series::Counter(m) => {
                let counter = m
                    .entry(series_key(label_values))
                    .or_insert_with(|| AtomicU64::new(0));
                counter.fetch_add(v, Ordering::Relaxed);
                Ok(())
            }
            Series::Gauge(_) => Err(ExporterError::Registration(format!(
                "{} is a gauge, cannot increase it as a counter",
                desc.name
            ))),
        }
    }

    fn gauge_set(&self, desc: &MetricDesc, label_values: &[&str], v: i64) -> Result<()> {
        let family = self.family(desc, label_values)?;
        match &family.series {
            Series::Gauge(m) => {
                let gauge = m
                    .entry(series_key(label_values))
                    .or_insert_with(|| AtomicI64::new(0));
                gauge.store(v, Ordering::Relaxed);
                Ok(())
            }
            Series::Counter(_) => Err(ExporterError::Registration(format!(
                "{} is a counter, cannot set it as a gauge",
                desc.name
            ))),
        }
    }

    fn check_compatible(&self, desc: &MetricDesc) -> Result<()> {
        match self.families.get(&desc.name) {
            Some(family) => family.desc.ensure_compatible(desc),
            None => Ok(()),
        }
    }

    fn collect(&self) -> Result<Vec<MetricFamily>> {
        let mut out: Vec<MetricFamily> = self
            .families
            .iter()
            .map(|r| MetricFamily {
                desc: r.value().desc.clone(),
                samples: r.value().samples(),
            })
            .collect();
        out.sort_by(|a, b| a.desc.name.cmp(&b.desc.name));
        Ok(out)
    }
}
