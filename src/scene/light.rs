use glam::Vec3;

/// Shadow map settings of a light.
///
/// `near`/`far` bound the shadow camera; `extent` is the half-size of the
/// orthographic box a directional light renders its shadow map from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowConfig {
    pub map_size: u32,
    pub near: f32,
    pub far: f32,
    pub extent: f32,
    pub bias: f32,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            map_size: 512,
            near: 0.5,
            far: 500.0,
            extent: 5.0,
            bias: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightKind {
    /// Lights everything evenly, from no particular place.
    Ambient,
    /// Parallel rays along the node's -Z.
    Directional,
    Point {
        range: f32,
    },
    /// Cone along the node's -Z. Angles in radians.
    Spot {
        range: f32,
        inner_cone: f32,
        outer_cone: f32,
    },
}

/// Light component of a scene node. Position and aim come from the node.
#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    pub color: Vec3,
    pub intensity: f32,
    pub kind: LightKind,

    pub cast_shadow: bool,
    pub shadow: ShadowConfig,
}

impl Light {
    fn with_kind(kind: LightKind, color: Vec3, intensity: f32) -> Self {
        Self {
            color,
            intensity,
            kind,
            cast_shadow: false,
            shadow: ShadowConfig::default(),
        }
    }

    #[must_use]
    pub fn new_ambient(color: Vec3, intensity: f32) -> Self {
        Self::with_kind(LightKind::Ambient, color, intensity)
    }

    #[must_use]
    pub fn new_directional(color: Vec3, intensity: f32) -> Self {
        Self::with_kind(LightKind::Directional, color, intensity)
    }

    #[must_use]
    pub fn new_point(color: Vec3, intensity: f32, range: f32) -> Self {
        Self::with_kind(LightKind::Point { range }, color, intensity)
    }

    #[must_use]
    pub fn new_spot(color: Vec3, intensity: f32, range: f32, inner_cone: f32, outer_cone: f32) -> Self {
        Self::with_kind(
            LightKind::Spot {
                range,
                inner_cone,
                outer_cone,
            },
            color,
            intensity,
        )
    }

    /// Turns shadow casting on with the given settings.
    #[must_use]
    pub fn with_shadow(mut self, shadow: ShadowConfig) -> Self {
        self.cast_shadow = true;
        self.shadow = shadow;
        self
    }

    /// Ambient light has no direction, so it never casts a shadow.
    #[must_use]
    pub fn casts_shadow(&self) -> bool {
        self.cast_shadow && self.kind != LightKind::Ambient
    }

    /// Whether the node's orientation matters for this light.
    #[must_use]
    pub fn is_aimed(&self) -> bool {
        matches!(self.kind, LightKind::Directional | LightKind::Spot { .. })
    }
}
