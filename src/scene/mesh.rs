use crate::scene::geometry::Geometry;
use crate::scene::material::Material;

/// A drawable: geometry plus material, attached to a scene node.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub geometry: Geometry,
    pub material: Material,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

impl Mesh {
    #[must_use]
    pub fn new(geometry: Geometry, material: Material) -> Self {
        Self {
            geometry,
            material,
            cast_shadow: false,
            receive_shadow: false,
        }
    }

    #[must_use]
    pub fn casting_shadow(mut self) -> Self {
        self.cast_shadow = true;
        self
    }

    #[must_use]
    pub fn receiving_shadow(mut self) -> Self {
        self.receive_shadow = true;
        self
    }
}
