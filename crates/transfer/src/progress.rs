use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::types::{Progress, SessionState};

/// Default observation interval.
const DEFAULT_INTERVAL: Duration = Duration::from_millis(65);

/// Callback invoked with each progress snapshot.
pub type ProgressCallback = Box<dyn Fn(Progress) + Send + Sync>;

/// Periodically reports the state of one running upload session.
///
/// The observer never writes to the session; it stops by itself after
/// reporting a finished state, or when [`ProgressHandle::stop`] is called.
pub struct ProgressTracker {
    callbacks: Vec<ProgressCallback>,
    interval: Duration,
}

/// Handle to a started [`ProgressTracker`].
pub struct ProgressHandle {
    stop: oneshot::Sender<()>,
    task: JoinHandle<Progress>,
}

impl ProgressTracker {
    /// Creates a tracker with the given interval (65 ms if `None`).
    pub fn new(interval: Option<Duration>) -> Self {
        Self {
            callbacks: Vec::new(),
            interval: interval.unwrap_or(DEFAULT_INTERVAL),
        }
    }

    /// Registers a progress callback.
    pub fn on_progress(&mut self, callback: ProgressCallback) {
        self.callbacks.push(callback);
    }

    /// Starts observing `state` in a background tokio task.
    pub fn start(self, state: Arc<SessionState>) -> ProgressHandle {
        let (stop, mut rx) = oneshot::channel();
        let Self {
            callbacks,
            interval,
        } = self;

        let task = tokio::spawn(async move {
            let emit = |progress: Progress| {
                for cb in &callbacks {
                    cb(progress);
                }
            };
            let mut ticker = tokio::time::interval(interval);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let progress = state.progress();
                        emit(progress);
                        if progress.finished {
                            return progress;
                        }
                    }
                    // A dropped handle stops the observer too.
                    _ = &mut rx => {
                        let progress = state.progress();
                        emit(progress);
                        return progress;
                    }
                }
            }
        });

        ProgressHandle { stop, task }
    }
}

impl ProgressHandle {
    /// Stops observing and returns the last reported snapshot.
    pub async fn stop(self) -> Option<Progress> {
        let _ = self.stop.send(());
        self.task.await.ok()
    }

    /// Waits until the observer has reported a finished session.
    pub async fn finished(self) -> Option<Progress> {
        let Self { stop, task } = self;
        let progress = task.await.ok();
        drop(stop);
        progress
    }
}

// ---------------------------------------------------------------------------
// SpeedCalculator
// ---------------------------------------------------------------------------

/// Transfer speed over a sliding window of offset samples.
pub struct SpeedCalculator {
    samples: VecDeque<(u64, Instant)>,
    max_samples: usize,
    window_size: Duration,
}

impl SpeedCalculator {
    /// Creates a new calculator.
    ///
    /// - `window_size`: time window for speed calculation (default 5 s).
    /// - `max_samples`: maximum retained samples (default 100).
    pub fn new(window_size: Option<Duration>, max_samples: Option<usize>) -> Self {
        Self {
            samples: VecDeque::new(),
            max_samples: max_samples.unwrap_or(100).max(2),
            window_size: window_size.unwrap_or(Duration::from_secs(5)),
        }
    }

    /// Records the cumulative offset reached now.
    pub fn record(&mut self, offset: u64) {
        self.record_at(offset, Instant::now());
    }

    /// Records the cumulative offset reached at `at`.
    pub fn record_at(&mut self, offset: u64, at: Instant) {
        self.samples.push_back((offset, at));

        while let Some(&(_, first)) = self.samples.front() {
            if at.duration_since(first) > self.window_size && self.samples.len() > 2 {
                self.samples.pop_front();
            } else {
                break;
            }
        }
        while self.samples.len() > self.max_samples {
            self.samples.pop_front();
        }
    }

    /// Average speed in bytes/second within the window.
    ///
    /// Returns 0.0 if fewer than 2 samples.
    pub fn bytes_per_second(&self) -> f64 {
        let (Some(&(first, t0)), Some(&(last, t1))) = (self.samples.front(), self.samples.back())
        else {
            return 0.0;
        };
        let elapsed = t1.duration_since(t0);
        if elapsed.is_zero() {
            return 0.0;
        }
        last.saturating_sub(first) as f64 / elapsed.as_secs_f64()
    }

    /// Estimated time to transfer `remaining_bytes`.
    ///
    /// Returns `None` if speed is zero.
    pub fn eta(&self, remaining_bytes: u64) -> Option<Duration> {
        let speed = self.bytes_per_second();
        if speed <= 0.0 {
            return None;
        }
        Some(Duration::from_secs_f64(remaining_bytes as f64 / speed))
    }

    pub fn reset(&mut self) {
        self.samples.clear();
    }
}
