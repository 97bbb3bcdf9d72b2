//! Status fields -> registry writes.
//!
//! | field            | metric                               | kind    |
//! |------------------|--------------------------------------|---------|
//! | `Total Accesses` | `apache_accesses_total`              | counter |
//! | `Total kBytes`   | `apache_sent_kilobytes_total`        | counter |
//! | `Uptime`         | `apache_uptime_seconds_total`        | counter |
//! | `BusyWorkers`    | `apache_workers{status="busy"}`      | gauge   |
//! | `IdleWorkers`    | `apache_workers{status="idle"}`      | gauge   |
//! | `Scoreboard`     | `apache_scoreboard{status=<label>}`  | gauge   |
//!
//! The three counters are increased by the value the status page reports,
//! not by the delta since the previous scrape. A registry that outlives one
//! scrape therefore accumulates snapshots.

use crate::error::{ExporterError, Result};
use crate::registry::{Counter, Gauge, Registry, WriteBatch};
use crate::status::{ParsedStatus, ScoreboardHistogram};

/// Metric namespace (name prefix).
pub const NAMESPACE: &str = "apache";

/// Status page field names read by the updater.
pub mod fields {
    pub const TOTAL_ACCESSES: &str = "Total Accesses";
    pub const TOTAL_KBYTES: &str = "Total kBytes";
    pub const UPTIME: &str = "Uptime";
    pub const BUSY_WORKERS: &str = "BusyWorkers";
    pub const IDLE_WORKERS: &str = "IdleWorkers";
    pub const SCOREBOARD: &str = "Scoreboard";
}

/// Every field needed for one update, already validated.
///
/// Built before any write so a bad page never leaves partial updates behind.
#[derive(Debug, Clone)]
pub struct StatusSnapshot {
    pub accesses: u64,
    pub kbytes: u64,
    pub uptime: u64,
    pub busy_workers: i64,
    pub idle_workers: i64,
    pub scoreboard: ScoreboardHistogram,
}

impl StatusSnapshot {
    pub fn from_status(status: &ParsedStatus) -> Result<Self> {
        Ok(Self {
            accesses: status.require_u64(fields::TOTAL_ACCESSES)?,
            kbytes: status.require_u64(fields::TOTAL_KBYTES)?,
            uptime: status.require_u64(fields::UPTIME)?,
            busy_workers: require_gauge(status, fields::BUSY_WORKERS)?,
            idle_workers: require_gauge(status, fields::IDLE_WORKERS)?,
            scoreboard: ScoreboardHistogram::from_scoreboard(
                status.require(fields::SCOREBOARD)?,
            ),
        })
    }
}

fn require_gauge(status: &ParsedStatus, field: &str) -> Result<i64> {
    let v = status.require_u64(field)?;
    i64::try_from(v).map_err(|_| ExporterError::InvalidValue {
        field: field.to_string(),
        value: v.to_string(),
    })
}

/// Registered handles for the status metrics.
pub struct StatusMetrics {
    accesses: Counter,
    kbytes: Counter,
    uptime: Counter,
    workers: Gauge,
    scoreboard: Gauge,
}

impl StatusMetrics {
    pub fn register(registry: &Registry) -> Result<Self> {
        Ok(Self {
            accesses: registry.register_counter(
                NAMESPACE,
                "accesses_total",
                "Current total apache accesses",
                &[],
            )?,
            kbytes: registry.register_counter(
                NAMESPACE,
                "sent_kilobytes_total",
                "Current total kbytes sent",
                &[],
            )?,
            uptime: registry.register_counter(
                NAMESPACE,
                "uptime_seconds_total",
                "Current uptime in seconds",
                &[],
            )?,
            workers: registry.register_gauge(
                NAMESPACE,
                "workers",
                "Apache worker statuses",
                &["status"],
            )?,
            scoreboard: registry.register_gauge(
                NAMESPACE,
                "scoreboard",
                "Apache scoreboard statuses",
                &["status"],
            )?,
        })
    }

    /// Queue every write for `snapshot` into `batch`.
    pub fn stage(&self, snapshot: &StatusSnapshot, batch: &mut WriteBatch) {
        batch
            .inc_by(&self.accesses, snapshot.accesses, &[])
            .inc_by(&self.kbytes, snapshot.kbytes, &[])
            .inc_by(&self.uptime, snapshot.uptime, &[]);

        batch
            .set(&self.workers, snapshot.busy_workers, &["busy"])
            .set(&self.workers, snapshot.idle_workers, &["idle"]);

        for (label, count) in snapshot.scoreboard.labeled() {
            // A scoreboard never has more than i64::MAX slots.
            let count = i64::try_from(count).unwrap_or(i64::MAX);
            batch.set(&self.scoreboard, count, &[label]);
        }
    }
}

/// Validate `status` and write it into `registry` as one batch.
///
/// Missing or non-numeric fields fail before anything is written.
pub fn update_registry(registry: &Registry, status: &ParsedStatus) -> Result<()> {
    let snapshot = StatusSnapshot::from_status(status)?;
    let mut batch = WriteBatch::new();
    StatusMetrics::register(registry)?.stage(&snapshot, &mut batch);
    registry.commit(&batch)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::status::parse_status;

    const PAGE: &str = "Total Accesses: 1\nTotal kBytes: 1\nUptime: 18\n\
                        BusyWorkers: 1\nIdleWorkers: 5\nScoreboard: W_____...\n";

    fn update(registry: &Registry, page: &str) -> Result<()> {
        update_registry(registry, &parse_status(page))
    }

    fn value(registry: &Registry, name: &str, label: Option<&str>) -> Option<f64> {
        registry
            .gather()
            .unwrap()
            .into_iter()
            .find(|f| f.desc.name == name)?
            .samples
            .into_iter()
            .find(|s| s.label_values.first().map(String::as_str) == label)
            .map(|s| s.value)
    }

    #[test]
    fn maps_fields_to_metrics() {
        let r = Registry::in_memory();
        update(&r, PAGE).unwrap();

        assert_eq!(value(&r, "apache_accesses_total", None), Some(1.0));
        assert_eq!(value(&r, "apache_sent_kilobytes_total", None), Some(1.0));
        assert_eq!(value(&r, "apache_uptime_seconds_total", None), Some(18.0));
        assert_eq!(value(&r, "apache_workers", Some("busy")), Some(1.0));
        assert_eq!(value(&r, "apache_workers", Some("idle")), Some(5.0));
        assert_eq!(value(&r, "apache_scoreboard", Some("open_slot")), Some(3.0));
        assert_eq!(value(&r, "apache_scoreboard", Some("keepalive")), Some(0.0));
    }

    #[test]
    fn scoreboard_always_has_every_label() {
        let r = Registry::in_memory();
        update(&r, PAGE).unwrap();
        let fam = r
            .gather()
            .unwrap()
            .into_iter()
            .find(|f| f.desc.name == "apache_scoreboard")
            .unwrap();
        assert_eq!(fam.samples.len(), 11);
    }

    #[test]
    fn one_page_is_one_batch() {
        let r = Registry::in_memory();
        let snapshot = StatusSnapshot::from_status(&parse_status(PAGE)).unwrap();
        let mut batch = WriteBatch::new();
        StatusMetrics::register(&r).unwrap().stage(&snapshot, &mut batch);
        // 3 counters + 2 worker gauges + 11 scoreboard states
        assert_eq!(batch.len(), 16);
    }

    #[test]
    fn counters_add_snapshots_gauges_overwrite() {
        let r = Registry::in_memory();
        update(&r, PAGE).unwrap();
        update(&r, &PAGE.replace("BusyWorkers: 1", "BusyWorkers: 4")).unwrap();

        assert_eq!(value(&r, "apache_accesses_total", None), Some(2.0));
        assert_eq!(value(&r, "apache_uptime_seconds_total", None), Some(36.0));
        assert_eq!(value(&r, "apache_workers", Some("busy")), Some(4.0));
    }

    #[test]
    fn missing_field_writes_nothing() {
        let r = Registry::in_memory();
        let page = PAGE.replace("Total Accesses: 1\n", "");
        let err = update(&r, &page).unwrap_err();
        assert!(matches!(err, ExporterError::MissingField(ref f) if f == fields::TOTAL_ACCESSES));
        assert!(r.gather().unwrap().is_empty());
    }

    #[test]
    fn non_numeric_field_writes_nothing() {
        let r = Registry::in_memory();
        let page = PAGE.replace("IdleWorkers: 5", "IdleWorkers: five");
        let err = update(&r, &page).unwrap_err();
        assert_eq!(err.kind().as_str(), "INVALID_VALUE");
        assert!(r.gather().unwrap().is_empty());
    }
}
