//! Host Driver
//!
//! [`App`] wires a [`SimulationContext`], a [`FrameScheduler`] and a
//! [`FrameSurface`] together and drives them from a [`DisplayLink`], the
//! headless stand-in for a display's refresh callback.
//!
//! ```rust,ignore
//! let mut app = App::new().with_title("Physics").with_frame_limit(600);
//! app.set_setup_fn(|ctx| {
//!     ctx.add_ground(10.0);
//!     ctx.spawn_sphere(0.5, Vec3::new(0.0, 3.0, 0.0));
//!     Ok(())
//! });
//! app.set_update_fn(|ctx, frame| { /* animate */ });
//! let summary = app.run()?;
//! ```

use std::time::{Duration, Instant};

use crate::config::SimulationConfig;
use crate::context::SimulationContext;
use crate::errors::Result;
use crate::scheduler::{FrameScheduler, FrameState, UpdateFn};
use crate::surface::{FrameSurface, LogSurface};
use crate::utils::time::SimulationClock;

/// The "call me before the next repaint" primitive.
pub trait FrameRequester {
    fn request_frame(&mut self);
}

/// Paces frame requests to a fixed refresh interval.
///
/// A request arms the link; [`DisplayLink::wait_for_frame`] then sleeps
/// until the next refresh boundary and consumes the request. Only one
/// request is ever pending.
#[derive(Debug)]
pub struct DisplayLink {
    interval: Duration,
    next_refresh: Instant,
    pending: bool,
}

impl DisplayLink {
    /// `refresh_rate` in Hz; non-positive rates do not pace at all.
    #[must_use]
    pub fn new(refresh_rate: f64) -> Self {
        let interval = if refresh_rate.is_finite() && refresh_rate > 0.0 {
            Duration::from_secs_f64(1.0 / refresh_rate)
        } else {
            Duration::ZERO
        };
        Self {
            interval,
            next_refresh: Instant::now(),
            pending: false,
        }
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Blocks until the next refresh if a frame was requested.
    ///
    /// Returns false, without blocking, when nothing is pending.
    pub fn wait_for_frame(&mut self) -> bool {
        if !self.pending {
            return false;
        }
        self.pending = false;

        let now = Instant::now();
        if self.next_refresh > now {
            std::thread::sleep(self.next_refresh - now);
        }
        // A late frame starts a new cadence instead of bursting to catch up.
        self.next_refresh = Instant::now().max(self.next_refresh) + self.interval;
        true
    }
}

impl FrameRequester for DisplayLink {
    fn request_frame(&mut self) {
        self.pending = true;
    }
}

/// Run statistics returned by [`App::run`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub frames: u64,
    /// Simulation time at the last tick
    pub elapsed: f64,
}

type SetupFn = Box<dyn FnOnce(&mut SimulationContext) -> Result<()>>;

pub struct App {
    pub title: String,
    pub config: SimulationConfig,

    setup_fn: Option<SetupFn>,
    update_fn: Option<UpdateFn>,
    frame_limit: Option<u64>,
    surface: Box<dyn FrameSurface>,
    clock: Option<SimulationClock>,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    #[must_use]
    pub fn new() -> Self {
        Self {
            title: "Orrery".into(),
            config: SimulationConfig::default(),
            setup_fn: None,
            update_fn: None,
            frame_limit: None,
            surface: Box::new(LogSurface::new()),
            clock: None,
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: SimulationConfig) -> Self {
        self.config = config;
        self
    }

    /// Stops the scheduler after `frames` ticks. Without a limit `run` never returns.
    #[must_use]
    pub fn with_frame_limit(mut self, frames: u64) -> Self {
        self.frame_limit = Some(frames);
        self
    }

    #[must_use]
    pub fn with_surface(mut self, surface: impl FrameSurface + 'static) -> Self {
        self.surface = Box::new(surface);
        self
    }

    /// Replaces the wall clock, e.g. with a manually advanced one.
    #[must_use]
    pub fn with_clock(mut self, clock: SimulationClock) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Runs once, after the context is built and before the first tick.
    pub fn set_setup_fn<F>(&mut self, f: F) -> &mut Self
    where
        F: FnOnce(&mut SimulationContext) -> Result<()> + 'static,
    {
        self.setup_fn = Some(Box::new(f));
        self
    }

    pub fn set_update_fn<F>(&mut self, f: F) -> &mut Self
    where
        F: FnMut(&mut SimulationContext, &FrameState) + 'static,
    {
        self.update_fn = Some(Box::new(f));
        self
    }

    /// Builds the context, runs the loop until the frame limit, then shuts
    /// the context down.
    pub fn run(self) -> Result<RunSummary> {
        let Self {
            title,
            config,
            setup_fn,
            update_fn,
            frame_limit,
            mut surface,
            clock,
        } = self;

        log::info!("Starting '{title}'");
        let mut ctx = SimulationContext::new(&config)?;
        if let Some(setup) = setup_fn {
            setup(&mut ctx)?;
        }

        let mut scheduler = match clock {
            Some(clock) => FrameScheduler::with_clock(&config, clock),
            None => FrameScheduler::new(&config),
        };
        if let Some(update) = update_fn {
            scheduler.set_update_fn(update);
        }

        let mut link = DisplayLink::new(config.refresh_rate);
        let mut summary = RunSummary {
            frames: 0,
            elapsed: 0.0,
        };

        if frame_limit != Some(0) {
            scheduler.start(&mut link);
        }
        while link.wait_for_frame() {
            let Some(report) = scheduler.tick(&mut ctx, surface.as_mut(), &mut link) else {
                break;
            };
            summary.frames += 1;
            summary.elapsed = report.elapsed;
            if frame_limit.is_some_and(|limit| summary.frames >= limit) {
                scheduler.stop();
                break;
            }
        }

        log::info!("'{title}' finished after {} frames", summary.frames);
        ctx.shutdown();
        Ok(summary)
    }
}
