use crate::types::JobStats;

/// Share of a job's items per outcome, in percent of `total`.
///
/// Derived on demand from [`JobStats`]; nothing is stored. The three shares
/// are not normalized and need not add up to exactly 100.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ProgressShares {
    pub matched: f64,
    pub uncertain: f64,
    pub failed: f64,
}

impl ProgressShares {
    /// A job without items yields zero for every share.
    pub fn from_stats(stats: &JobStats) -> Self {
        if stats.total == 0 {
            return Self::default();
        }

        let total = stats.total as f64;
        let share = |part: u32| part as f64 * 100.0 / total;
        Self {
            matched: share(stats.matched),
            uncertain: share(stats.uncertain),
            failed: share(stats.failed),
        }
    }
}
