/// Frame-rate meter fed with per-tick deltas.
///
/// Reads the delta the scheduler already measured instead of sampling the
/// wall clock again, so manually clocked runs report manual frame rates.
pub struct FpsCounter {
    frame_count: u32,
    accumulated_time: f64,
    pub current_fps: f32,
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl FpsCounter {
    #[must_use]
    pub fn new() -> Self {
        Self {
            frame_count: 0,
            accumulated_time: 0.0,
            current_fps: 0.0,
        }
    }

    /// Records one frame. Returns the frame rate once per second of accumulated time.
    pub fn update(&mut self, delta: f64) -> Option<f32> {
        self.frame_count += 1;
        if delta > 0.0 {
            self.accumulated_time += delta;
        }

        if self.accumulated_time >= 1.0 {
            self.current_fps = (f64::from(self.frame_count) / self.accumulated_time) as f32;

            self.accumulated_time = 0.0;
            self.frame_count = 0;

            return Some(self.current_fps);
        }

        None
    }
}
