use glam::Vec3;
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};

use crate::scene::{Geometry, Material, Mesh, NodeHandle, PointCloud, Scene};
use crate::utils::color;

/// A cube of randomly placed particles.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleFieldOptions {
    pub count: usize,
    /// Edge length of the cube the particles fill, centered on the origin
    pub extent: f32,
    pub size: f32,
    /// One random color per particle instead of `color`
    pub random_colors: bool,
    pub color: Vec3,
}

impl Default for ParticleFieldOptions {
    fn default() -> Self {
        Self {
            count: 5000,
            extent: 10.0,
            size: 0.1,
            random_colors: false,
            color: color::from_rgb_u32(0xff88cc),
        }
    }
}

#[must_use]
pub fn random_field(options: &ParticleFieldOptions, seed: u64) -> PointCloud {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut cloud = PointCloud {
        positions: Vec::with_capacity(options.count),
        colors: Vec::new(),
    };
    for _ in 0..options.count {
        let p = Vec3::new(rng.random::<f32>(), rng.random::<f32>(), rng.random::<f32>()) - 0.5;
        cloud.positions.push(p * options.extent);
    }
    if options.random_colors {
        cloud.colors = (0..options.count)
            .map(|_| Vec3::new(rng.random::<f32>(), rng.random::<f32>(), rng.random::<f32>()))
            .collect();
    }
    cloud
}

/// Particle cloud node whose heights ripple as a sine wave over X.
pub struct ParticleField {
    pub options: ParticleFieldOptions,
    pub wave_amplitude: f32,
    node: NodeHandle,
}

impl ParticleField {
    /// Generates the field and adds it to the scene root.
    pub fn spawn(scene: &mut Scene, options: ParticleFieldOptions, seed: u64) -> Self {
        let cloud = random_field(&options, seed);
        let mut material = Material::points(options.size, true).with_color(options.color);
        material.vertex_colors = options.random_colors;
        material.transparent = true;
        material.depth_write = false;

        let node = scene.add_mesh("Particles", Mesh::new(Geometry::Points(cloud), material), Vec3::ZERO);
        Self {
            options,
            wave_amplitude: 1.0,
            node,
        }
    }

    #[must_use]
    pub fn node(&self) -> NodeHandle {
        self.node
    }

    /// Sets each particle's height to `amplitude * sin(elapsed + x)`.
    ///
    /// Returns false if the node is gone.
    pub fn animate_wave(&self, scene: &mut Scene, elapsed: f32) -> bool {
        let Some(Geometry::Points(cloud)) = scene
            .get_node_mut(self.node)
            .and_then(|n| n.mesh.as_mut())
            .map(|m| &mut m.geometry)
        else {
            return false;
        };
        for p in &mut cloud.positions {
            p.y = (elapsed + p.x).sin() * self.wave_amplitude;
        }
        true
    }
}
