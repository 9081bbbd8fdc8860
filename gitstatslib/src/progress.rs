//! Progress tracking for the pipeline.
//!
//! Workers call [`Progress::step`] after each file. The counter is atomic and
//! the reporter runs at most once per interval: the worker that wins a
//! compare-and-swap on the last-report timestamp calls it, the others move on
//! without waiting.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Callback receiving `(done, total)`.
pub type Reporter = Box<dyn Fn(usize, usize) + Send + Sync>;

pub struct Progress {
    total: usize,
    done: AtomicUsize,
    start: Instant,
    interval: Duration,
    /// Milliseconds since `start` of the last report
    last_report: AtomicU64,
    reporter: Option<Reporter>,
}

impl Progress {
    /// Progress over `total` items with no reporter.
    pub fn new(total: usize) -> Self {
        Self {
            total,
            done: AtomicUsize::new(0),
            start: Instant::now(),
            interval: Duration::from_secs(1),
            last_report: AtomicU64::new(0),
            reporter: None,
        }
    }

    /// Set the callback.
    pub fn with_reporter(mut self, reporter: impl Fn(usize, usize) + Send + Sync + 'static) -> Self {
        self.reporter = Some(Box::new(reporter));
        self
    }

    /// Change the minimum time between two reports.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn done(&self) -> usize {
        self.done.load(Ordering::Relaxed)
    }

    /// Record one finished item, reporting if the interval has elapsed.
    pub fn step(&self) {
        let done = self.done.fetch_add(1, Ordering::Relaxed) + 1;

        let Some(reporter) = &self.reporter else {
            return;
        };

        let now = self.start.elapsed().as_millis() as u64;
        let last = self.last_report.load(Ordering::Relaxed);
        if now.saturating_sub(last) < self.interval.as_millis() as u64 {
            return;
        }
        if self
            .last_report
            .compare_exchange(last, now, Ordering::AcqRel, Ordering::Relaxed)
            .is_ok()
        {
            reporter(done, self.total);
        }
    }

    /// Report the final count.
    pub fn finish(&self) {
        if let Some(reporter) = &self.reporter {
            reporter(self.done(), self.total);
        }
    }
}

impl std::fmt::Debug for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Progress")
            .field("total", &self.total)
            .field("done", &self.done())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recording(progress: Progress) -> (Progress, Arc<Mutex<Vec<(usize, usize)>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&calls);
        let progress = progress.with_reporter(move |done, total| {
            sink.lock().unwrap().push((done, total));
        });
        (progress, calls)
    }

    #[test]
    fn test_reports_are_rate_limited() {
        let (progress, calls) = recording(Progress::new(100).with_interval(Duration::from_secs(3600)));
        for _ in 0..100 {
            progress.step();
        }
        assert_eq!(progress.done(), 100);
        assert!(calls.lock().unwrap().is_empty());

        progress.finish();
        assert_eq!(*calls.lock().unwrap(), vec![(100, 100)]);
    }

    #[test]
    fn test_zero_interval_reports_every_step() {
        let (progress, calls) = recording(Progress::new(3).with_interval(Duration::ZERO));
        progress.step();
        progress.step();
        progress.step();
        let calls = calls.lock().unwrap();
        assert!(!calls.is_empty());
        assert_eq!(calls.last(), Some(&(3, 3)));
    }

    #[test]
    fn test_concurrent_steps() {
        let progress = Progress::new(400);
        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for _ in 0..100 {
                        progress.step();
                    }
                });
            }
        });
        assert_eq!(progress.done(), 400);
    }
}
