#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use apache_exporter_server::config::{self, StorageMode};

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
exporter:
  listen: "0.0.0.0:9117"
  status_ur: "http://localhost/server-status?auto" # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.kind().as_str(), "CONFIG");
}

#[test]
fn ok_minimal_config() {
    let cfg = config::load_from_str("version: 1\n").expect("must parse");
    assert_eq!(cfg.version, 1);
    assert_eq!(cfg.exporter.listen, "0.0.0.0:9117");
    assert_eq!(cfg.exporter.status_url, "http://localhost/server-status?auto");
    assert_eq!(cfg.exporter.timeout_ms, 10000);
    assert_eq!(cfg.storage.mode, StorageMode::Ephemeral);
}

#[test]
fn ok_file_storage() {
    let ok = r#"
version: 1
exporter:
  status_url: "http://10.0.0.5:8080/server-status?auto"
  timeout_ms: 2500
storage:
  mode: file
  path: "/var/lib/apache-exporter/metrics.json"
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.storage.mode, StorageMode::File);
    assert_eq!(cfg.storage.path.as_deref(), Some("/var/lib/apache-exporter/metrics.json"));
    assert_eq!(cfg.exporter.timeout_ms, 2500);
}

#[test]
fn rejects_unsupported_version() {
    let err = config::load_from_str("version: 2\n").expect_err("must fail");
    assert!(err.to_string().contains("unsupported config version"));
}

#[test]
fn file_mode_requires_path() {
    let bad = "version: 1\nstorage:\n  mode: file\n";
    let err = config::load_from_str(bad).expect_err("must fail");
    assert!(err.to_string().contains("storage.path is required"));
}

#[test]
fn path_rejected_outside_file_mode() {
    let bad = "version: 1\nstorage:\n  mode: memory\n  path: /tmp/m.json\n";
    assert!(config::load_from_str(bad).is_err());
}

#[test]
fn rejects_out_of_range_timeout_and_bad_url() {
    assert!(config::load_from_str("version: 1\nexporter:\n  timeout_ms: 5\n").is_err());
    assert!(config::load_from_str(
        "version: 1\nexporter:\n  status_url: \"https://localhost/server-status?auto\"\n"
    )
    .is_err());
    assert!(config::load_from_str("version: 1\nexporter:\n  listen: \"nowhere\"\n").is_err());
}

#[test]
fn explicit_missing_file_is_an_error() {
    let err = config::load(Some("/nonexistent/apache-exporter.yaml".into())).expect_err("must fail");
    assert_eq!(err.kind().as_str(), "CONFIG");
}
