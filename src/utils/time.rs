use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// A monotonic source of "now", in seconds from an arbitrary origin.
pub trait TimeSource {
    fn now(&self) -> f64;
}

/// Wall-clock time backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct SystemTime {
    origin: Instant,
}

impl Default for SystemTime {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemTime {
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl TimeSource for SystemTime {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same underlying time, so a test can keep one handle and
/// advance it while the scheduler owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualTime {
    bits: Arc<AtomicU64>,
}

impl ManualTime {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, seconds: f64) {
        self.bits.store(seconds.to_bits(), Ordering::Relaxed);
    }

    pub fn advance(&self, seconds: f64) {
        self.set(self.now() + seconds);
    }
}

impl TimeSource for ManualTime {
    fn now(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Relaxed))
    }
}

/// Tracks elapsed time since start and delta time between ticks.
pub struct SimulationClock {
    source: Box<dyn TimeSource>,
    start: f64,
    /// Elapsed time observed by the previous tick
    previous_elapsed: f64,
    /// Time since last tick. May be zero or negative if the source misbehaves.
    pub delta: f64,
    /// Total elapsed time since creation
    pub elapsed: f64,
    /// Total number of ticks
    pub frame_count: u64,
}

impl Default for SimulationClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulationClock {
    /// Creates a clock reading wall-clock time, starting from now.
    #[must_use]
    pub fn new() -> Self {
        Self::with_source(SystemTime::new())
    }

    #[must_use]
    pub fn with_source(source: impl TimeSource + 'static) -> Self {
        let start = source.now();
        Self {
            source: Box::new(source),
            start,
            previous_elapsed: 0.0,
            delta: 0.0,
            elapsed: 0.0,
            frame_count: 0,
        }
    }

    /// Reads the source and returns `(elapsed, delta)`.
    pub fn tick(&mut self) -> (f64, f64) {
        self.elapsed = self.source.now() - self.start;
        self.delta = self.elapsed - self.previous_elapsed;
        self.previous_elapsed = self.elapsed;
        self.frame_count += 1;
        (self.elapsed, self.delta)
    }

    #[must_use]
    pub fn previous_elapsed(&self) -> f64 {
        self.previous_elapsed
    }

    #[must_use]
    pub fn dt_seconds(&self) -> f32 {
        self.delta as f32
    }
}
