//! End-of-run accounting.

use std::collections::BTreeMap;
use std::fmt;

/// Totals accumulated across one run.
///
/// `tally` counts every record that reached a terminal non-excluded state,
/// keyed by region name (or the no-region sentinel), so its sum always
/// equals `dispatched + failures` plus match-only records when no
/// destination was configured.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Image files seen by the walk, including skipped ones.
    pub candidates: usize,
    /// Candidates dropped for missing metadata.
    pub skipped: usize,
    /// Records whose file operation completed (same-path no-ops included).
    pub dispatched: u64,
    /// Orphans dropped by the include-orphans policy.
    pub excluded: u64,
    /// Records whose copy/move failed.
    pub failures: u64,
    /// Best-effort tag writes that failed (placement stands).
    pub tag_failures: u64,
    /// Per-region record counts.
    pub tally: BTreeMap<String, u64>,
}

impl RunSummary {
    pub fn bump(&mut self, bucket: &str) {
        *self.tally.entry(bucket.to_string()).or_insert(0) += 1;
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} candidates, {} skipped (missing metadata), {} dispatched, {} excluded, {} failed",
            self.candidates, self.skipped, self.dispatched, self.excluded, self.failures
        )?;
        if self.tag_failures > 0 {
            writeln!(f, "{} tag writes failed", self.tag_failures)?;
        }
        for (region, count) in &self.tally {
            writeln!(f, "  {region}: {count}")?;
        }
        Ok(())
    }
}
