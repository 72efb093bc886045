use glam::Vec3;

use crate::assets::TextureHandle;

/// How a material's fragments combine with what is already drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Blending {
    #[default]
    Normal,
    Additive,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MaterialKind {
    /// Unlit color.
    Basic,
    /// Metalness/roughness PBR.
    Standard { metalness: f32, roughness: f32 },
    /// Lighting baked into a matcap texture.
    Matcap { matcap: Option<TextureHandle> },
    /// Point sprites.
    Points { size: f32, size_attenuation: bool },
}

/// Surface description handed to the drawing surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub kind: MaterialKind,
    pub color: Vec3,
    pub map: Option<TextureHandle>,
    pub alpha_map: Option<TextureHandle>,
    pub env_map: Option<TextureHandle>,
    pub env_map_intensity: f32,
    pub transparent: bool,
    pub opacity: f32,
    pub depth_write: bool,
    pub blending: Blending,
    /// Use per-vertex (per-point) colors instead of `color`
    pub vertex_colors: bool,
}

impl Material {
    #[must_use]
    pub fn new(kind: MaterialKind) -> Self {
        Self {
            kind,
            color: Vec3::ONE,
            map: None,
            alpha_map: None,
            env_map: None,
            env_map_intensity: 1.0,
            transparent: false,
            opacity: 1.0,
            depth_write: true,
            blending: Blending::Normal,
            vertex_colors: false,
        }
    }

    #[must_use]
    pub fn basic(color: Vec3) -> Self {
        Self {
            color,
            ..Self::new(MaterialKind::Basic)
        }
    }

    #[must_use]
    pub fn standard(metalness: f32, roughness: f32) -> Self {
        Self::new(MaterialKind::Standard {
            metalness,
            roughness,
        })
    }

    #[must_use]
    pub fn points(size: f32, size_attenuation: bool) -> Self {
        Self::new(MaterialKind::Points {
            size,
            size_attenuation,
        })
    }

    #[must_use]
    pub fn with_color(mut self, color: Vec3) -> Self {
        self.color = color;
        self
    }

    #[must_use]
    pub fn with_env_map(mut self, env_map: Option<TextureHandle>, intensity: f32) -> Self {
        self.env_map = env_map;
        self.env_map_intensity = intensity;
        self
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::standard(0.3, 0.4)
    }
}
