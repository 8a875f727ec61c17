//! Search statistics

use std::collections::VecDeque;
use std::time::Duration;

use crate::agent::SearchReport;

/// Rolling statistics over background path searches
#[derive(Debug)]
pub struct SearchStats {
    /// Latency history for averaging
    latencies: VecDeque<Duration>,
    /// Maximum samples to keep
    max_samples: usize,
    /// Average search time in milliseconds
    avg_search_ms: f32,
    /// Minimum search time in milliseconds
    min_search_ms: f32,
    /// Maximum search time in milliseconds
    max_search_ms: f32,
    /// Requests handed to the worker pool
    dispatched: u64,
    /// Searches that produced a route
    completed: u64,
    /// Searches that found no route
    unreachable: u64,
    /// Searches that failed with an error
    failed: u64,
    /// Cells expanded across all searches
    expanded: u64,
}

impl SearchStats {
    /// Create a new stats tracker
    pub fn new() -> Self {
        Self {
            latencies: VecDeque::with_capacity(120),
            max_samples: 120,
            avg_search_ms: 0.0,
            min_search_ms: 0.0,
            max_search_ms: 0.0,
            dispatched: 0,
            completed: 0,
            unreachable: 0,
            failed: 0,
            expanded: 0,
        }
    }

    /// Count a request sent to the worker pool
    pub fn record_dispatch(&mut self) {
        self.dispatched += 1;
    }

    /// Record a finished search
    pub fn record(&mut self, report: &SearchReport) {
        match &report.result {
            Ok(path) if path.is_empty() => self.unreachable += 1,
            Ok(_) => self.completed += 1,
            Err(_) => self.failed += 1,
        }
        self.expanded += report.expanded as u64;

        if self.latencies.len() >= self.max_samples {
            self.latencies.pop_front();
        }
        self.latencies.push_back(report.elapsed);

        self.update_stats();
    }

    fn update_stats(&mut self) {
        if self.latencies.is_empty() {
            return;
        }

        let mut total = Duration::ZERO;
        let mut min = Duration::MAX;
        let mut max = Duration::ZERO;

        for &dt in &self.latencies {
            total += dt;
            min = min.min(dt);
            max = max.max(dt);
        }

        let count = self.latencies.len() as f32;
        self.avg_search_ms = total.as_secs_f32() / count * 1000.0;
        self.min_search_ms = min.as_secs_f32() * 1000.0;
        self.max_search_ms = max.as_secs_f32() * 1000.0;
    }

    /// Average search time in milliseconds
    pub fn avg_search_ms(&self) -> f32 {
        self.avg_search_ms
    }

    /// Minimum search time in milliseconds
    pub fn min_search_ms(&self) -> f32 {
        self.min_search_ms
    }

    /// Maximum search time in milliseconds
    pub fn max_search_ms(&self) -> f32 {
        self.max_search_ms
    }

    /// Requests handed to the worker pool
    pub fn dispatched(&self) -> u64 {
        self.dispatched
    }

    /// Searches that produced a route
    pub fn completed(&self) -> u64 {
        self.completed
    }

    /// Searches that found no route
    pub fn unreachable(&self) -> u64 {
        self.unreachable
    }

    /// Searches that failed with an error
    pub fn failed(&self) -> u64 {
        self.failed
    }

    /// Searches that have reported back
    pub fn finished(&self) -> u64 {
        self.completed + self.unreachable + self.failed
    }

    /// Cells expanded across all searches
    pub fn expanded(&self) -> u64 {
        self.expanded
    }

    /// Get a formatted stats string
    pub fn format_stats(&self) -> String {
        format!(
            "Searches: {} sent, {} routed, {} unreachable, {} failed | Time: {:.3}ms (min: {:.3}, max: {:.3})",
            self.dispatched,
            self.completed,
            self.unreachable,
            self.failed,
            self.avg_search_ms,
            self.min_search_ms,
            self.max_search_ms
        )
    }
}

impl Default for SearchStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::NavError;
    use crate::nav::Path;

    fn report(result: Result<Path, NavError>, ms: u64) -> SearchReport {
        SearchReport {
            result,
            elapsed: Duration::from_millis(ms),
            expanded: 3,
        }
    }

    #[test]
    fn test_outcomes_are_counted() {
        let mut stats = SearchStats::new();
        stats.record_dispatch();
        stats.record_dispatch();
        stats.record_dispatch();

        stats.record(&report(Ok(Path::empty()), 1));
        stats.record(&report(Err(NavError::NoActiveCell), 1));

        assert_eq!(stats.dispatched(), 3);
        assert_eq!(stats.unreachable(), 1);
        assert_eq!(stats.failed(), 1);
        assert_eq!(stats.finished(), 2);
        assert_eq!(stats.expanded(), 6);
    }

    #[test]
    fn test_latency_window() {
        let mut stats = SearchStats::new();

        stats.record(&report(Ok(Path::empty()), 2));
        stats.record(&report(Ok(Path::empty()), 4));

        assert!((stats.avg_search_ms() - 3.0).abs() < 0.01);
        assert!((stats.min_search_ms() - 2.0).abs() < 0.01);
        assert!((stats.max_search_ms() - 4.0).abs() < 0.01);
        assert!(stats.format_stats().contains("2 unreachable"));
    }
}
