//! Status page model.
//!
//! - `parser`: `server-status?auto` text into a flat field map.
//! - `scoreboard`: worker scoreboard characters into labeled counts.
//!
//! Parsing never fails: malformed lines are expected on real servers and are
//! dropped. Missing or non-numeric fields surface later as `ExporterError`.

pub mod parser;
pub mod scoreboard;

pub use parser::{parse_status, ParsedStatus};
pub use scoreboard::{ScoreboardHistogram, SCOREBOARD_LABELS};
