//! Prometheus text exposition (format 0.0.4).

use std::fmt::Write;

use super::desc::MetricFamily;

/// Content type of [`render_text`] output.
pub const TEXT_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Helper to escape label values.
fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

fn escape_help(v: &str) -> String {
    v.replace('\\', "\\\\").replace('\n', "\\n")
}

/// Render families in the order given.
pub fn render_text(families: &[MetricFamily]) -> String {
    let mut out = String::new();
    for family in families {
        let name = &family.desc.name;
        let _ = writeln!(out, "# HELP {} {}", name, escape_help(&family.desc.help));
        let _ = writeln!(out, "# TYPE {} {}", name, family.desc.kind.as_str());

        for sample in &family.samples {
            if sample.label_values.is_empty() {
                let _ = writeln!(out, "{} {}", name, sample.value);
                continue;
            }
            let label_str = family
                .desc
                .label_names
                .iter()
                .zip(&sample.label_values)
                .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
                .collect::<Vec<_>>()
                .join(",");
            let _ = writeln!(out, "{}{{{}}} {}", name, label_str, sample.value);
        }
    }
    out
}
