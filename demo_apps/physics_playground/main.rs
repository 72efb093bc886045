//! Physics Playground
//!
//! Drops a sphere onto a floor, then keeps adding random spheres and boxes.
//! Hard impacts are logged with the volume a sound would play at, and the
//! pile is cleared every ten seconds.
//!
//! ```text
//! cargo run -p physics_playground -- [config.json]
//! ```

use glam::Vec3;
use orrery::{App, ImpactFeedback, SimulationConfig};
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};

const SPAWN_EVERY: u64 = 60;
const RESET_EVERY: u64 = 600;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::default(),
    };
    let threshold = config.impact_threshold;

    let mut app = App::new()
        .with_title("Physics Playground")
        .with_config(config)
        .with_frame_limit(3 * RESET_EVERY);

    app.set_setup_fn(|ctx| {
        ctx.add_ground(10.0);
        ctx.add_default_lights();
        ctx.spawn_sphere(0.5, Vec3::new(0.0, 3.0, 0.0));
        Ok(())
    });

    let mut rng = StdRng::seed_from_u64(2024);
    let mut feedback: Option<ImpactFeedback> = None;

    app.set_update_fn(move |ctx, frame| {
        let feedback = feedback.get_or_insert_with(|| ImpactFeedback::new(&mut ctx.world, threshold));
        for cue in feedback.poll() {
            log::info!(
                "Impact at {:.2} m/s, volume {:.2}",
                cue.impact_velocity,
                cue.volume
            );
        }

        if frame.frame % RESET_EVERY == 0 {
            let removed = ctx.reset();
            log::info!("Cleared {removed} bodies");
            return;
        }

        if frame.frame % SPAWN_EVERY == 0 {
            let position = Vec3::new(
                (rng.random::<f32>() - 0.5) * 3.0,
                3.0,
                (rng.random::<f32>() - 0.5) * 3.0,
            );
            if rng.random::<bool>() {
                ctx.spawn_sphere(rng.random::<f32>() * 0.5, position);
            } else {
                let w = rng.random::<f32>();
                let h = rng.random::<f32>();
                let d = rng.random::<f32>();
                ctx.spawn_box(w, h, d, position);
            }
        }
    });

    let summary = app.run()?;
    log::info!(
        "Ran {} frames covering {:.1}s of simulation",
        summary.frames,
        summary.elapsed
    );
    Ok(())
}
