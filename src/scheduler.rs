//! Frame Scheduler
//!
//! Drives one tick at a time. A tick:
//!
//! 1. applies finished asset loads ([`AssetServer::pump`](crate::assets::AssetServer::pump)),
//! 2. reads the clock,
//! 3. steps the physics world in fixed increments covering the measured delta,
//! 4. copies every body's pose onto its node,
//! 5. runs the user update callback,
//! 6. updates the orbit controls and world matrices,
//! 7. draws,
//! 8. asks the host for the next frame if still scheduled.
//!
//! What is drawn in a tick is therefore always derived from that same tick's
//! simulation state.

use crate::app::FrameRequester;
use crate::assets::AssetEvent;
use crate::config::SimulationConfig;
use crate::context::SimulationContext;
use crate::surface::FrameSurface;
use crate::utils::FpsCounter;
use crate::utils::time::SimulationClock;

/// Per-tick user callback.
pub type UpdateFn = Box<dyn FnMut(&mut SimulationContext, &FrameState)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchedulerState {
    /// No tick pending.
    #[default]
    Idle,
    /// One future tick has been requested.
    Scheduled,
}

/// Timing handed to the update callback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameState {
    pub frame: u64,
    pub elapsed: f64,
    pub delta: f64,
    /// Physics steps run this tick
    pub sub_steps: u32,
}

/// What a tick did.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub frame: u64,
    pub elapsed: f64,
    pub delta: f64,
    pub sub_steps: u32,
    /// The physics step hit `max_sub_steps` and dropped time
    pub capped: bool,
    pub entities_synced: usize,
    /// False when the scene had no active camera
    pub drawn: bool,
    pub asset_events: Vec<AssetEvent>,
}

pub struct FrameScheduler {
    state: SchedulerState,
    clock: SimulationClock,
    fixed_time_step: f64,
    max_sub_steps: u32,
    fps: FpsCounter,
    update_fn: Option<UpdateFn>,
}

impl FrameScheduler {
    /// A scheduler reading wall-clock time.
    #[must_use]
    pub fn new(config: &SimulationConfig) -> Self {
        Self::with_clock(config, SimulationClock::new())
    }

    #[must_use]
    pub fn with_clock(config: &SimulationConfig, clock: SimulationClock) -> Self {
        Self {
            state: SchedulerState::Idle,
            clock,
            fixed_time_step: config.fixed_time_step,
            max_sub_steps: config.max_sub_steps,
            fps: FpsCounter::new(),
            update_fn: None,
        }
    }

    pub fn set_update_fn<F>(&mut self, f: F) -> &mut Self
    where
        F: FnMut(&mut SimulationContext, &FrameState) + 'static,
    {
        self.update_fn = Some(Box::new(f));
        self
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> SchedulerState {
        self.state
    }

    #[inline]
    #[must_use]
    pub fn is_scheduled(&self) -> bool {
        self.state == SchedulerState::Scheduled
    }

    #[inline]
    #[must_use]
    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    /// `Idle -> Scheduled`; requests the first frame. Does nothing if already scheduled.
    pub fn start(&mut self, requester: &mut dyn FrameRequester) {
        if self.state == SchedulerState::Scheduled {
            return;
        }
        log::info!("Frame scheduler started");
        self.state = SchedulerState::Scheduled;
        requester.request_frame();
    }

    /// `Scheduled -> Idle`. The tick in progress, if any, finishes but requests nothing.
    pub fn stop(&mut self) {
        if self.state == SchedulerState::Scheduled {
            log::info!("Frame scheduler stopped after {} frames", self.clock.frame_count);
        }
        self.state = SchedulerState::Idle;
    }

    /// Runs one tick. Returns `None` without touching anything when idle.
    pub fn tick(
        &mut self,
        ctx: &mut SimulationContext,
        surface: &mut dyn FrameSurface,
        requester: &mut dyn FrameRequester,
    ) -> Option<FrameReport> {
        if self.state == SchedulerState::Idle {
            return None;
        }

        let asset_events = ctx.assets.pump();

        let (elapsed, delta) = self.clock.tick();
        let step = ctx.world.step(self.fixed_time_step, delta, self.max_sub_steps);
        let entities_synced = ctx.entities.sync(&mut ctx.scene, &ctx.world);

        let frame = FrameState {
            frame: self.clock.frame_count,
            elapsed,
            delta,
            sub_steps: step.sub_steps,
        };
        if let Some(update) = self.update_fn.as_mut() {
            update(ctx, &frame);
        }

        ctx.update_controls(delta as f32);
        ctx.scene.update_matrix_world();

        let drawn = match ctx.scene.active_camera() {
            Some((_, camera)) => {
                surface.draw(&ctx.scene, camera);
                true
            }
            None => {
                log::trace!("No active camera, skipping draw");
                false
            }
        };

        log::trace!(
            "Tick {}: delta {:.4}s, {} sub-steps, {} entities synced",
            frame.frame,
            delta,
            step.sub_steps,
            entities_synced
        );
        if let Some(fps) = self.fps.update(delta) {
            log::debug!(
                "{fps:.1} fps, {} bodies, {} entities",
                ctx.world.body_count(),
                ctx.entities.len()
            );
        }

        if self.state == SchedulerState::Scheduled {
            requester.request_frame();
        }

        Some(FrameReport {
            frame: frame.frame,
            elapsed,
            delta,
            sub_steps: step.sub_steps,
            capped: step.capped,
            entities_synced,
            drawn,
            asset_events,
        })
    }
}
