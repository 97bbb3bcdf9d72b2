//! Metric descriptors and collected samples.

use serde::{Deserialize, Serialize};

use crate::error::{ExporterError, Result};

/// Series kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    /// Monotonic; only supports "increase by".
    Counter,
    /// Supports "set to value".
    Gauge,
}

impl MetricKind {
    /// Name used on the `# TYPE` line.
    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
        }
    }
}

/// Shape of one metric family. Fixed at registration time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricDesc {
    pub name: String,
    pub help: String,
    pub kind: MetricKind,
    #[serde(default)]
    pub label_names: Vec<String>,
}

impl MetricDesc {
    /// Build a validated descriptor named `<namespace>_<name>`.
    pub fn new(
        namespace: &str,
        name: &str,
        help: &str,
        kind: MetricKind,
        label_names: &[&str],
    ) -> Result<Self> {
        let full = if namespace.is_empty() {
            name.to_string()
        } else {
            format!("{namespace}_{name}")
        };
        if !is_valid_metric_name(&full) {
            return Err(ExporterError::Registration(format!(
                "invalid metric name: {full}"
            )));
        }
        for label in label_names {
            if !is_valid_label_name(label) {
                return Err(ExporterError::Registration(format!(
                    "invalid label name for {full}: {label}"
                )));
            }
        }
        Ok(Self {
            name: full,
            help: help.to_string(),
            kind,
            label_names: label_names.iter().map(|l| l.to_string()).collect(),
        })
    }

    /// Reject label value tuples that do not match the declared label names.
    pub fn check_labels(&self, label_values: &[&str]) -> Result<()> {
        if label_values.len() != self.label_names.len() {
            return Err(ExporterError::Registration(format!(
                "{} expects {} label value(s), got {}",
                self.name,
                self.label_names.len(),
                label_values.len()
            )));
        }
        Ok(())
    }

    /// Two definitions of the same name must agree on everything.
    pub fn ensure_compatible(&self, other: &MetricDesc) -> Result<()> {
        if self != other {
            return Err(ExporterError::Registration(format!(
                "metric {} already registered with a different definition ({} {:?} vs {} {:?})",
                self.name,
                self.kind.as_str(),
                self.label_names,
                other.kind.as_str(),
                other.label_names
            )));
        }
        Ok(())
    }
}

/// One labeled value of a family.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub label_values: Vec<String>,
    pub value: f64,
}

/// Snapshot of a family and all its series.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricFamily {
    pub desc: MetricDesc,
    pub samples: Vec<Sample>,
}

fn is_valid_metric_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}

fn is_valid_label_name(name: &str) -> bool {
    if name.starts_with("__") {
        return false;
    }
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
