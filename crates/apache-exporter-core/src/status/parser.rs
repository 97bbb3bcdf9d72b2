//! `server-status?auto` page parsing (tolerant, panic-free).
//!
//! Parsing rules:
//! - One `Key: Value` pair per line; empty lines are skipped.
//! - A line is kept only if `": "` occurs in it exactly once.
//! - Malformed lines are dropped silently. Values stay strings.

use std::collections::HashMap;

use crate::error::{ExporterError, Result};

/// Field/value separator used by the status page.
pub const FIELD_DELIMITER: &str = ": ";

/// Flat `field -> value` view of one status page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedStatus {
    fields: HashMap<String, String>,
}

impl ParsedStatus {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    /// Value of a field that must be present.
    pub fn require(&self, field: &str) -> Result<&str> {
        self.get(field)
            .ok_or_else(|| ExporterError::MissingField(field.to_string()))
    }

    /// Value of a field that must be present and hold an unsigned integer.
    pub fn require_u64(&self, field: &str) -> Result<u64> {
        let raw = self.require(field)?;
        raw.trim().parse().map_err(|_| ExporterError::InvalidValue {
            field: field.to_string(),
            value: raw.to_string(),
        })
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Parse a status page into a [`ParsedStatus`].
///
/// Later occurrences of a field overwrite earlier ones.
pub fn parse_status(text: &str) -> ParsedStatus {
    let mut fields = HashMap::new();

    for line in text.lines() {
        if line.is_empty() {
            continue;
        }
        if let Some((key, value)) = split_field(line) {
            fields.insert(key.to_string(), value.to_string());
        }
    }

    tracing::debug!(fields = fields.len(), "parsed status page");
    ParsedStatus { fields }
}

fn split_field(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once(FIELD_DELIMITER)?;
    if value.contains(FIELD_DELIMITER) {
        return None;
    }
    Some((key, value))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn parses_simple_pairs() {
        let parsed = parse_status("foo: 1\nbar: 2\n");
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed.get("foo"), Some("1"));
        assert_eq!(parsed.get("bar"), Some("2"));
    }

    #[test]
    fn drops_empty_and_malformed_lines() {
        let parsed = parse_status("\n\nnodelimiter\nkey:nospace\na: b: c\nok: yes\n\n");
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed.get("ok"), Some("yes"));
        assert_eq!(parsed.get("a"), None);
    }

    #[test]
    fn last_duplicate_wins() {
        let parsed = parse_status("Uptime: 1\nUptime: 2\n");
        assert_eq!(parsed.get("Uptime"), Some("2"));
    }

    #[test]
    fn keeps_empty_value_and_crlf_lines() {
        let parsed = parse_status("ServerVersion: \r\nUptime: 18\r\n");
        assert_eq!(parsed.get("ServerVersion"), Some(""));
        assert_eq!(parsed.get("Uptime"), Some("18"));
    }

    #[test]
    fn leaves_values_as_strings() {
        let parsed = parse_status("ReqPerSec: .0555556\n");
        assert_eq!(parsed.get("ReqPerSec"), Some(".0555556"));
    }

    #[test]
    fn require_reports_missing_and_invalid_fields() {
        let parsed = parse_status("Uptime: 18\nBusyWorkers: many\n");
        assert_eq!(parsed.require_u64("Uptime").unwrap(), 18);

        let err = parsed.require_u64("Total Accesses").unwrap_err();
        assert!(matches!(err, ExporterError::MissingField(ref f) if f == "Total Accesses"));

        let err = parsed.require_u64("BusyWorkers").unwrap_err();
        assert!(matches!(err, ExporterError::InvalidValue { ref value, .. } if value == "many"));
    }

    #[test]
    fn empty_input_yields_empty_status() {
        assert!(parse_status("").is_empty());
    }
}
