use glam::{Affine3A, Vec3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    #[must_use]
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// An inverted box that any `expand` call will overwrite.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            min: Vec3::splat(f32::INFINITY),
            max: Vec3::splat(f32::NEG_INFINITY),
        }
    }

    #[must_use]
    pub fn from_half_extents(half: Vec3) -> Self {
        Self {
            min: -half,
            max: half,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    #[must_use]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    #[must_use]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn expand(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    #[must_use]
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    #[must_use]
    pub fn translate(&self, offset: Vec3) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    #[must_use]
    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// Axis-aligned bounds of this box after `matrix` is applied.
    #[must_use]
    pub fn transform(&self, matrix: &Affine3A) -> Self {
        let corners = [
            Vec3::new(self.min.x, self.min.y, self.min.z),
            Vec3::new(self.min.x, self.min.y, self.max.z),
            Vec3::new(self.min.x, self.max.y, self.min.z),
            Vec3::new(self.min.x, self.max.y, self.max.z),
            Vec3::new(self.max.x, self.min.y, self.min.z),
            Vec3::new(self.max.x, self.min.y, self.max.z),
            Vec3::new(self.max.x, self.max.y, self.min.z),
            Vec3::new(self.max.x, self.max.y, self.max.z),
        ];

        let mut out = Self::empty();
        for point in corners {
            out.expand(matrix.transform_point3(point));
        }
        out
    }
}

/// A flat list of points with optional per-point colors.
#[derive(Debug, Clone, Default)]
pub struct PointCloud {
    pub positions: Vec<Vec3>,
    /// Empty, or one RGB color per position
    pub colors: Vec<Vec3>,
}

impl PointCloud {
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    #[must_use]
    pub fn bounding_box(&self) -> BoundingBox {
        let mut bbox = BoundingBox::empty();
        for &p in &self.positions {
            bbox.expand(p);
        }
        bbox
    }
}

/// Shape description handed to the drawing surface.
///
/// Tessellation is the renderer's business; the scene only keeps the
/// parameters and the bounds that picking and culling need.
#[derive(Debug, Clone)]
pub enum Geometry {
    Sphere {
        radius: f32,
        width_segments: u32,
        height_segments: u32,
    },
    Box {
        width: f32,
        height: f32,
        depth: f32,
    },
    /// Lies in the local XY plane, facing +Z.
    Plane {
        width: f32,
        height: f32,
    },
    Torus {
        radius: f32,
        tube: f32,
        radial_segments: u32,
        tubular_segments: u32,
    },
    Points(PointCloud),
    /// Extruded text; glyph outlines stay with the font.
    Text {
        bounds: BoundingBox,
        glyph_count: usize,
    },
    /// Imported primitive data, reduced to what the engine needs.
    Model {
        bounds: BoundingBox,
        vertex_count: usize,
    },
}

impl Geometry {
    #[must_use]
    pub fn sphere(radius: f32) -> Self {
        Geometry::Sphere {
            radius,
            width_segments: 32,
            height_segments: 32,
        }
    }

    #[must_use]
    pub fn cuboid(width: f32, height: f32, depth: f32) -> Self {
        Geometry::Box {
            width,
            height,
            depth,
        }
    }

    #[must_use]
    pub fn plane(width: f32, height: f32) -> Self {
        Geometry::Plane { width, height }
    }

    #[must_use]
    pub fn bounding_box(&self) -> BoundingBox {
        match self {
            Geometry::Sphere { radius, .. } => BoundingBox::from_half_extents(Vec3::splat(*radius)),
            Geometry::Box {
                width,
                height,
                depth,
            } => BoundingBox::from_half_extents(Vec3::new(*width, *height, *depth) * 0.5),
            Geometry::Plane { width, height } => {
                BoundingBox::from_half_extents(Vec3::new(width * 0.5, height * 0.5, 0.0))
            }
            Geometry::Torus { radius, tube, .. } => {
                let outer = radius + tube;
                BoundingBox::from_half_extents(Vec3::new(outer, outer, *tube))
            }
            Geometry::Points(cloud) => cloud.bounding_box(),
            Geometry::Text { bounds, .. } | Geometry::Model { bounds, .. } => *bounds,
        }
    }
}
