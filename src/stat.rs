use std::fmt::Display;

use serde::Serialize;

use crate::cache::AccessResult;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}
impl CacheStats {
    pub const fn new() -> Self {
        Self { hits: 0, misses: 0 }
    }
    pub fn hit(&mut self) {
        self.hits += 1;
    }
    pub fn miss(&mut self) {
        self.misses += 1;
    }
    pub fn record(&mut self, result: AccessResult) {
        match result {
            AccessResult::Hit => self.hit(),
            AccessResult::Miss => self.miss(),
        }
    }
    pub const fn total(&self) -> u64 {
        self.hits + self.misses
    }
    /// Hits as a percentage of all accesses, `0.0` before the first access.
    pub fn hit_ratio(&self) -> f64 {
        percent(self.hits, self.total())
    }
    pub fn miss_ratio(&self) -> f64 {
        percent(self.misses, self.total())
    }
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

fn percent(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        100.0 * part as f64 / total as f64
    }
}

impl Display for CacheStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Number of hits   = {}", self.hits)?;
        writeln!(f, "Number of misses = {}", self.misses)?;
        writeln!(f, "Hit ratio        = {:.4}%", self.hit_ratio())?;
        write!(f, "Miss ratio       = {:.4}%", self.miss_ratio())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratios() {
        let mut stats = CacheStats::new();
        assert_eq!(stats.hit_ratio(), 0.0);
        assert_eq!(stats.miss_ratio(), 0.0);

        for _ in 0..3 {
            stats.record(AccessResult::Hit);
        }
        stats.record(AccessResult::Miss);
        assert_eq!(stats.total(), 4);
        assert_eq!(stats.hit_ratio(), 75.0);
        assert_eq!(stats.miss_ratio(), 25.0);

        stats.reset();
        assert_eq!(stats, CacheStats::default());
    }

    #[test]
    fn display_lists_counts_and_ratios() {
        let stats = CacheStats { hits: 1, misses: 3 };
        let text = stats.to_string();
        assert!(text.contains("Number of hits   = 1"));
        assert!(text.contains("Miss ratio       = 75.0000%"));
    }
}
