use std::collections::VecDeque;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

/// How much history the live charts keep on screen.
pub const DEFAULT_WINDOW_MS: u64 = 60_000;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub timestamp_ms: u64,
    pub value: f64,
}

/// Trailing window over one scalar signal, fed in timestamp order by a single
/// producer. After every push each retained point satisfies
/// `timestamp_ms >= latest - window_ms`; eviction only ever removes from the
/// oldest end, so the points stay in arrival order.
#[derive(Debug, Clone)]
pub struct WindowedSeries {
    window_ms: u64,
    points: VecDeque<SeriesPoint>,
}

impl WindowedSeries {
    pub fn new(window_ms: u64) -> Self {
        Self {
            window_ms,
            points: VecDeque::new(),
        }
    }

    /// Appends a sample and drops everything that fell out of the window.
    /// A missing sample (`None`) adds no point and does not shift the window.
    pub fn push(&mut self, value: Option<f64>, timestamp_ms: u64) {
        let Some(value) = value else { return };

        self.points.push_back(SeriesPoint {
            timestamp_ms,
            value,
        });

        let cutoff = timestamp_ms.saturating_sub(self.window_ms);
        while self
            .points
            .front()
            .is_some_and(|p| p.timestamp_ms < cutoff)
        {
            self.points.pop_front();
        }
    }

    /// Read-only view of the retained points, oldest first. Valid until the
    /// next push.
    pub fn snapshot(&self) -> &VecDeque<SeriesPoint> {
        &self.points
    }

    pub fn latest(&self) -> Option<SeriesPoint> {
        self.points.back().copied()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl Default for WindowedSeries {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_MS)
    }
}

/// Milliseconds since the Unix epoch. Callers feeding several aligned series
/// take one timestamp per update cycle and push it to each buffer.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn points_older_than_the_window_are_evicted() {
        let mut series = WindowedSeries::new(60_000);
        series.push(Some(2.0), 0);
        series.push(Some(2.1), 30_000);
        series.push(Some(2.2), 65_000);

        let points: Vec<_> = series.snapshot().iter().copied().collect();
        assert_eq!(
            points,
            vec![
                SeriesPoint {
                    timestamp_ms: 30_000,
                    value: 2.1
                },
                SeriesPoint {
                    timestamp_ms: 65_000,
                    value: 2.2
                },
            ]
        );
    }

    #[test]
    fn a_point_exactly_at_the_cutoff_is_retained() {
        let mut series = WindowedSeries::new(60_000);
        series.push(Some(1.0), 0);
        series.push(Some(2.0), 60_000);

        assert_eq!(series.len(), 2);
    }

    #[test]
    fn missing_sample_is_a_no_op() {
        let mut series = WindowedSeries::new(60_000);
        series.push(Some(2.0), 0);
        series.push(None, 120_000);

        // No new point, and the stale one is still there: the window only
        // moves when a real sample arrives.
        assert_eq!(series.len(), 1);
        assert_eq!(series.latest().unwrap().timestamp_ms, 0);
    }

    #[test]
    fn window_invariant_holds_after_every_push() {
        let mut series = WindowedSeries::new(10_000);
        let timestamps = [0u64, 1_000, 5_000, 11_000, 11_500, 30_000, 30_001];

        for (i, t) in timestamps.into_iter().enumerate() {
            series.push(Some(i as f64), t);
            let latest = series.latest().unwrap().timestamp_ms;
            assert!(series
                .snapshot()
                .iter()
                .all(|p| p.timestamp_ms >= latest.saturating_sub(10_000)));
        }
    }

    #[test]
    fn two_buffers_align_on_a_shared_timestamp() {
        let mut pressure = WindowedSeries::new(60_000);
        let mut after_filter = WindowedSeries::new(60_000);

        for tick in 0..5u64 {
            let t = tick * 1_000;
            pressure.push(Some(2.0 + tick as f64 * 0.1), t);
            after_filter.push(Some(1.8 + tick as f64 * 0.1), t);
        }

        let aligned = pressure
            .snapshot()
            .iter()
            .zip(after_filter.snapshot())
            .all(|(a, b)| a.timestamp_ms == b.timestamp_ms);
        assert!(aligned);
    }
}
