//! File-backed metric storage.
//!
//! The whole store is one JSON document. Every operation holds an advisory
//! lock on a `<file>.lock` sidecar (exclusive for writes, shared for reads),
//! so several handles or processes on one path serialize their
//! read-modify-write cycles. Writes land via a per-writer temp file + rename,
//! so readers never observe a torn file and values survive restarts.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use fs2::FileExt;
use serde::{Deserialize, Serialize};

use crate::error::{ExporterError, Result};

use super::desc::{MetricDesc, MetricFamily, Sample};
use super::storage::{MetricStorage, SeriesWrite, WriteOp};

const DOCUMENT_VERSION: u32 = 1;

static TMP_SEQ: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct StoreDocument {
    version: u32,
    #[serde(default)]
    families: BTreeMap<String, StoredFamily>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct StoredFamily {
    desc: MetricDesc,
    #[serde(default)]
    series: Vec<StoredSeries>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct StoredSeries {
    labels: Vec<String>,
    value: StoredValue,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum StoredValue {
    Counter(u64),
    Gauge(i64),
}

impl StoredValue {
    fn as_f64(self) -> f64 {
        match self {
            StoredValue::Counter(v) => v as f64,
            StoredValue::Gauge(v) => v as f64,
        }
    }
}

impl StoredFamily {
    fn series_mut(&mut self, label_values: &[String], init: StoredValue) -> &mut StoredValue {
        let pos = self.series.iter().position(|s| s.labels == label_values);
        let idx = match pos {
            Some(i) => i,
            None => {
                self.series.push(StoredSeries {
                    labels: label_values.to_vec(),
                    value: init,
                });
                self.series.len() - 1
            }
        };
        &mut self.series[idx].value
    }
}

impl StoreDocument {
    fn empty() -> Self {
        Self {
            version: DOCUMENT_VERSION,
            families: BTreeMap::new(),
        }
    }

    /// Apply one already validated write.
    fn apply(&mut self, write: &SeriesWrite) -> Result<()> {
        let desc = write.desc.as_ref();
        let family = self
            .families
            .entry(desc.name.clone())
            .or_insert_with(|| StoredFamily {
                desc: desc.clone(),
                series: Vec::new(),
            });
        family.desc.ensure_compatible(desc)?;

        match write.op {
            WriteOp::IncBy(v) => {
                match family.series_mut(&write.label_values, StoredValue::Counter(0)) {
                    StoredValue::Counter(n) => {
                        *n = n.saturating_add(v);
                        Ok(())
                    }
                    StoredValue::Gauge(_) => Err(ExporterError::Storage(format!(
                        "{} holds a gauge value in a counter family",
                        desc.name
                    ))),
                }
            }
            WriteOp::Set(v) => {
                *family.series_mut(&write.label_values, StoredValue::Gauge(0)) =
                    StoredValue::Gauge(v);
                Ok(())
            }
        }
    }
}

/// Metric storage persisted to a JSON file.
pub struct FileStorage {
    path: PathBuf,
    lock_path: PathBuf,
}

/// Held advisory lock; released when the handle is dropped.
struct StoreLock {
    _file: File,
}

impl FileStorage {
    /// Open (or lazily create) a store at `path`.
    ///
    /// An existing file is read once so that a corrupt store fails at startup
    /// instead of on the first scrape.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let storage = Self {
            lock_path: sibling(&path, ".lock"),
            path,
        };
        if let Some(parent) = storage.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    ExporterError::Storage(format!("create {} failed: {e}", parent.display()))
                })?;
            }
        }
        let _lock = storage.lock(false)?;
        storage.load()?;
        Ok(storage)
    }

    fn lock(&self, exclusive: bool) -> Result<StoreLock> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.lock_path)
            .map_err(|e| {
                ExporterError::Storage(format!("open {} failed: {e}", self.lock_path.display()))
            })?;
        let locked = if exclusive {
            FileExt::lock_exclusive(&file)
        } else {
            FileExt::lock_shared(&file)
        };
        locked.map_err(|e| {
            ExporterError::Storage(format!("lock {} failed: {e}", self.lock_path.display()))
        })?;
        Ok(StoreLock { _file: file })
    }

    fn load(&self) -> Result<StoreDocument> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(s) => s,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(StoreDocument::empty()),
            Err(e) => {
                return Err(ExporterError::Storage(format!(
                    "read {} failed: {e}",
                    self.path.display()
                )))
            }
        };
        let doc: StoreDocument = serde_json::from_str(&raw).map_err(|e| {
            ExporterError::Storage(format!("invalid store {}: {e}", self.path.display()))
        })?;
        if doc.version != DOCUMENT_VERSION {
            return Err(ExporterError::Storage(format!(
                "unsupported store version {} in {}",
                doc.version,
                self.path.display()
            )));
        }
        Ok(doc)
    }

    fn store(&self, doc: &StoreDocument) -> Result<()> {
        let body = serde_json::to_vec_pretty(doc)
            .map_err(|e| ExporterError::Storage(format!("encode store failed: {e}")))?;
        let tmp = sibling(
            &self.path,
            &format!(
                ".{}.{}.tmp",
                std::process::id(),
                TMP_SEQ.fetch_add(1, Ordering::Relaxed)
            ),
        );
        if let Err(e) = fs::write(&tmp, body) {
            let _ = fs::remove_file(&tmp);
            return Err(ExporterError::Storage(format!(
                "write {} failed: {e}",
                tmp.display()
            )));
        }
        fs::rename(&tmp, &self.path).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            ExporterError::Storage(format!("rename to {} failed: {e}", self.path.display()))
        })
    }

    /// Validate and apply `writes` with one load and at most one rewrite.
    fn write_all(&self, writes: &[SeriesWrite]) -> Result<()> {
        for w in writes {
            w.validate()?;
        }
        if writes.is_empty() {
            return Ok(());
        }

        let _lock = self.lock(true)?;
        let mut doc = self.load()?;
        for w in writes {
            doc.apply(w)?;
        }
        self.store(&doc)
    }

    fn single(desc: &MetricDesc, label_values: &[&str], op: WriteOp) -> SeriesWrite {
        SeriesWrite {
            desc: desc.clone().into(),
            label_values: label_values.iter().map(|v| v.to_string()).collect(),
            op,
        }
    }
}

/// `path` with `suffix` appended to its file name.
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(suffix);
    path.with_file_name(name)
}

impl MetricStorage for FileStorage {
    fn counter_inc_by(&self, desc: &MetricDesc, label_values: &[&str], v: u64) -> Result<()> {
        self.write_all(&[Self::single(desc, label_values, WriteOp::IncBy(v))])
    }

    fn gauge_set(&self, desc: &MetricDesc, label_values: &[&str], v: i64) -> Result<()> {
        self.write_all(&[Self::single(desc, label_values, WriteOp::Set(v))])
    }

    fn check_compatible(&self, desc: &MetricDesc) -> Result<()> {
        let doc = {
            let _lock = self.lock(false)?;
            self.load()?
        };
        match doc.families.get(&desc.name) {
            Some(family) => family.desc.ensure_compatible(desc),
            None => Ok(()),
        }
    }

    fn apply_batch(&self, writes: &[SeriesWrite]) -> Result<()> {
        self.write_all(writes)
    }

    fn collect(&self) -> Result<Vec<MetricFamily>> {
        let doc = {
            let _lock = self.lock(false)?;
            self.load()?
        };

        // BTreeMap iteration is already name-ordered.
        Ok(doc
            .families
            .into_values()
            .map(|family| {
                let mut samples: Vec<Sample> = family
                    .series
                    .into_iter()
                    .map(|s| Sample {
                        label_values: s.labels,
                        value: s.value.as_f64(),
                    })
                    .collect();
                samples.sort_by(|a, b| a.label_values.cmp(&b.label_values));
                MetricFamily {
                    desc: family.desc,
                    samples,
                }
            })
            .collect())
    }
}
