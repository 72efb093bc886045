//! Galaxy
//!
//! A spinning spiral galaxy beside a field of particles rippling as a sine
//! wave. Every few seconds the galaxy is regenerated with one more branch.
//! If a particle sprite exists under the asset root it is loaded in the
//! background and applied once ready.
//!
//! ```text
//! cargo run -p galaxy -- [galaxy.json]
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec3;
use orrery::assets::TextureHandle;
use orrery::procedural::{Galaxy, GalaxyParameters, ParticleField, ParticleFieldOptions};
use orrery::{App, ColorSpace, FrameState, PendingAsset, SimulationConfig, SimulationContext};

const REGENERATE_EVERY: u64 = 240;
const SPRITE: &str = "textures/particles/2.png";

struct GalaxyScene {
    galaxy: Galaxy,
    particles: ParticleField,
    sprite: Option<PendingAsset<TextureHandle>>,
}

impl GalaxyScene {
    fn new(ctx: &mut SimulationContext, params: GalaxyParameters) -> orrery::Result<Self> {
        let mut galaxy = Galaxy::new(params, 7);
        galaxy.regenerate(&mut ctx.scene)?;

        let particles = ParticleField::spawn(
            &mut ctx.scene,
            ParticleFieldOptions {
                count: 20_000,
                random_colors: true,
                ..ParticleFieldOptions::default()
            },
            7,
        );
        if let Some(node) = ctx.scene.get_node_mut(particles.node()) {
            node.transform.position = Vec3::new(0.0, -4.0, 0.0);
        }

        let sprite = ctx.assets.load_texture(SPRITE, ColorSpace::Srgb);

        Ok(Self {
            galaxy,
            particles,
            sprite: Some(sprite),
        })
    }

    fn update(&mut self, ctx: &mut SimulationContext, frame: &FrameState) {
        let elapsed = frame.elapsed as f32;
        self.galaxy.update(&mut ctx.scene, elapsed);
        self.particles.animate_wave(&mut ctx.scene, elapsed);

        if let Some(result) = self.sprite.as_mut().and_then(PendingAsset::try_take) {
            self.sprite = None;
            match result {
                Ok(handle) => {
                    if let Some(mesh) = ctx
                        .scene
                        .get_node_mut(self.particles.node())
                        .and_then(|n| n.mesh.as_mut())
                    {
                        mesh.material.alpha_map = Some(handle);
                    }
                }
                Err(e) => log::warn!("Particles keep plain sprites: {e}"),
            }
        }

        if frame.frame % REGENERATE_EVERY == 0 {
            self.galaxy.params.branches = self.galaxy.params.branches % 6 + 2;
            if let Err(e) = self.galaxy.regenerate(&mut ctx.scene) {
                log::error!("Galaxy regeneration failed: {e}");
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let params = match std::env::args().nth(1) {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => GalaxyParameters::default(),
    };

    let mut config = SimulationConfig::default();
    config.camera.position = [3.0, 3.0, 3.0];
    config.gravity = [0.0, 0.0, 0.0];

    let mut app = App::new()
        .with_title("Galaxy")
        .with_config(config)
        .with_frame_limit(4 * REGENERATE_EVERY);

    let state: Rc<RefCell<Option<GalaxyScene>>> = Rc::new(RefCell::new(None));

    let setup_state = Rc::clone(&state);
    app.set_setup_fn(move |ctx| {
        *setup_state.borrow_mut() = Some(GalaxyScene::new(ctx, params)?);
        Ok(())
    });

    app.set_update_fn(move |ctx, frame| {
        if let Some(scene) = state.borrow_mut().as_mut() {
            scene.update(ctx, frame);
        }
    });

    let summary = app.run()?;
    log::info!("Galaxy ran for {} frames", summary.frames);
    Ok(())
}
