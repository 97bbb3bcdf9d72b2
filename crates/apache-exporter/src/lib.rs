//! Top-level facade crate for apache-exporter.
//!
//! Re-exports the core pipeline and the HTTP server library so users can depend on a single crate.

pub mod core {
    pub use apache_exporter_core::*;
}

pub mod server {
    pub use apache_exporter_server::*;
}
