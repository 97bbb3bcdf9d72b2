//! Metric registry (counters and gauges with fixed label names).
//!
//! Descriptors are registered once and handed out as `Counter`/`Gauge`
//! handles; values go to a pluggable `MetricStorage`:
//! - `InMemoryStorage`: `DashMap` + atomics, process lifetime.
//! - `FileStorage`: JSON document on disk, survives restarts.
//!
//! `render` turns collected families into the text exposition format.

pub mod collector;
pub mod desc;
pub mod file;
pub mod memory;
pub mod render;
pub mod storage;

pub use collector::{Counter, Gauge, Registry, WriteBatch};
pub use desc::{MetricDesc, MetricFamily, MetricKind, Sample};
pub use file::FileStorage;
pub use memory::InMemoryStorage;
pub use render::{render_text, TEXT_CONTENT_TYPE};
pub use storage::{MetricStorage, SeriesWrite, WriteOp};
