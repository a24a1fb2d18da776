use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, Instant};

use crate::gesture::GestureKind;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StatEntry {
    pub attempts: u32,
    pub successes: u32,
    /// Summed response time of successful attempts.
    pub response_ms: f64,
}

impl StatEntry {
    /// Success percentage, `None` before the first attempt.
    pub fn accuracy(&self) -> Option<f64> {
        if self.attempts == 0 {
            return None;
        }
        Some(self.successes as f64 / self.attempts as f64 * 100.0)
    }

    pub fn average_response_ms(&self) -> f64 {
        if self.successes == 0 {
            0.0
        } else {
            self.response_ms / self.successes as f64
        }
    }
}

/// Per-gesture accuracy and latency counters for the whole session.
#[derive(Debug, Clone)]
pub struct GestureStats {
    entries: BTreeMap<GestureKind, StatEntry>,
}

impl Default for GestureStats {
    fn default() -> Self {
        Self {
            entries: GestureKind::ALL.iter().map(|k| (*k, StatEntry::default())).collect(),
        }
    }
}

impl GestureStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one attempt started at `start` and finished at `now`.
    pub fn update_stats(&mut self, kind: GestureKind, success: bool, start: Instant, now: Instant) {
        self.record(kind, success, now.saturating_duration_since(start));
    }

    pub fn record(&mut self, kind: GestureKind, success: bool, elapsed: Duration) {
        let entry = self.entries.entry(kind).or_default();
        entry.attempts += 1;
        if success {
            entry.successes += 1;
            entry.response_ms += elapsed.as_secs_f64() * 1000.0;
        }
    }

    pub fn entry(&self, kind: GestureKind) -> StatEntry {
        self.entries.get(&kind).copied().unwrap_or_default()
    }

    pub fn total_attempts(&self) -> u32 {
        self.entries.values().map(|e| e.attempts).sum()
    }

    pub fn report(&self) -> String {
        self.to_string()
    }

    pub fn print_stats(&self) {
        println!();
        print!("{}", self);
    }
}

impl fmt::Display for GestureStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Gesture Accuracy Report:")?;
        for (kind, entry) in &self.entries {
            match entry.accuracy() {
                Some(acc) => writeln!(
                    f,
                    "  {:<12}  Acc: {:5.1}% ({}/{})   Avg resp: {:.2} ms",
                    kind.label(),
                    acc,
                    entry.successes,
                    entry.attempts,
                    entry.average_response_ms()
                )?,
                None => writeln!(f, "  {:<12}  No attempts yet", kind.label())?,
            }
        }
        writeln!(f, "{}", "-".repeat(50))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accuracy_and_average() {
        let mut stats = GestureStats::new();
        stats.record(GestureKind::LeftClick, true, Duration::from_millis(5));
        stats.record(GestureKind::LeftClick, false, Duration::from_millis(100));
        stats.record(GestureKind::LeftClick, true, Duration::from_millis(15));
        stats.record(GestureKind::LeftClick, false, Duration::from_millis(100));

        let entry = stats.entry(GestureKind::LeftClick);
        assert_eq!(entry.attempts, 4);
        assert_eq!(entry.successes, 2);
        assert!((entry.response_ms - 20.0).abs() < 1e-9);

        let report = stats.report();
        assert!(report.contains("  Left_Click    Acc:  50.0% (2/4)   Avg resp: 10.00 ms"), "{}", report);
        assert!(report.contains("  Cursor        No attempts yet"), "{}", report);
    }

    #[test]
    fn test_failures_add_no_response_time() {
        let mut stats = GestureStats::new();
        stats.record(GestureKind::ScrollUp, false, Duration::from_secs(3));
        let entry = stats.entry(GestureKind::ScrollUp);
        assert_eq!(entry.successes, 0);
        assert_eq!(entry.response_ms, 0.0);
        assert_eq!(entry.average_response_ms(), 0.0);
        assert!(stats.report().contains("Acc:   0.0% (0/1)   Avg resp: 0.00 ms"));
    }

    #[test]
    fn test_report_lists_every_kind_in_order() {
        let report = GestureStats::new().report();
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines[0], "Gesture Accuracy Report:");
        let names: Vec<&str> = lines[1..6].iter().map(|l| l.split_whitespace().next().unwrap()).collect();
        assert_eq!(names, ["Cursor", "Left_Click", "Right_Click", "Scroll_Up", "Scroll_Down"]);
        assert_eq!(lines[6], "-".repeat(50));
    }

    #[test]
    fn test_update_stats_measures_elapsed() {
        let mut stats = GestureStats::new();
        let start = Instant::now();
        stats.update_stats(GestureKind::Cursor, true, start, start + Duration::from_millis(4));
        assert!((stats.entry(GestureKind::Cursor).response_ms - 4.0).abs() < 1e-6);
        assert_eq!(stats.total_attempts(), 1);
    }
}
