//! Worker scoreboard decoding.
//!
//! The `Scoreboard` field holds one character per worker slot. Each known
//! character maps to a worker state label; unknown characters are counted
//! but never reported.

/// Known scoreboard characters and their state labels.
pub const SCOREBOARD_LABELS: [(u8, &str); 11] = [
    (b'_', "idle"),
    (b'S', "startup"),
    (b'R', "read"),
    (b'W', "reply"),
    (b'K', "keepalive"),
    (b'D', "dns"),
    (b'C', "closing"),
    (b'L', "logging"),
    (b'G', "graceful_stop"),
    (b'I', "idle_cleanup"),
    (b'.', "open_slot"),
];

/// Per-byte occurrence counts of one scoreboard string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreboardHistogram {
    counts: [u64; 256],
}

impl ScoreboardHistogram {
    pub fn from_scoreboard(scoreboard: &str) -> Self {
        let mut counts = [0u64; 256];
        for b in scoreboard.bytes() {
            counts[usize::from(b)] += 1;
        }
        Self { counts }
    }

    pub fn count(&self, ch: u8) -> u64 {
        self.counts[usize::from(ch)]
    }

    /// Total number of slots, known or not.
    pub fn slots(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// `(label, count)` for every known state, in table order, zeros included.
    pub fn labeled(&self) -> impl Iterator<Item = (&'static str, u64)> + '_ {
        SCOREBOARD_LABELS
            .iter()
            .map(move |(ch, label)| (*label, self.count(*ch)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_has_unique_entries() {
        for (i, (c, l)) in SCOREBOARD_LABELS.iter().enumerate() {
            for (c2, l2) in &SCOREBOARD_LABELS[i + 1..] {
                assert_ne!(c, c2);
                assert_ne!(l, l2);
            }
        }
    }

    #[test]
    fn counts_reference_scoreboard() {
        let board = format!("W_____{}", ".".repeat(82));
        let hist = ScoreboardHistogram::from_scoreboard(&board);

        let labeled: Vec<_> = hist.labeled().collect();
        assert_eq!(labeled.len(), 11);
        for (label, count) in labeled {
            let expected = match label {
                "reply" => 1,
                "idle" => 5,
                "open_slot" => 82,
                _ => 0,
            };
            assert_eq!(count, expected, "label={label}");
        }
        assert_eq!(hist.slots(), 88);
    }

    #[test]
    fn unknown_characters_are_counted_not_labeled() {
        let hist = ScoreboardHistogram::from_scoreboard("XX_");
        assert_eq!(hist.count(b'X'), 2);
        assert!(SCOREBOARD_LABELS.iter().all(|(c, _)| *c != b'X'));
        assert_eq!(hist.labeled().map(|(_, n)| n).sum::<u64>(), 1);
    }

    #[test]
    fn graceful_states_are_labeled() {
        let hist = ScoreboardHistogram::from_scoreboard("GGI");
        let labeled: Vec<_> = hist.labeled().filter(|(_, n)| *n > 0).collect();
        assert_eq!(labeled, vec![("graceful_stop", 2), ("idle_cleanup", 1)]);
    }
}
