use glam::Vec2;
use uuid::Uuid;

use crate::errors::AssetError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorSpace {
    /// Color textures (albedo, matcaps, environment maps).
    #[default]
    Srgb,
    /// Data textures (alpha, normal, roughness maps).
    Linear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WrapMode {
    #[default]
    ClampToEdge,
    Repeat,
    MirroredRepeat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    Nearest,
    #[default]
    Linear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sampler {
    pub wrap_s: WrapMode,
    pub wrap_t: WrapMode,
    pub mag_filter: FilterMode,
    pub min_filter: FilterMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureKind {
    D2,
    /// Six square faces in +X, -X, +Y, -Y, +Z, -Z order.
    Cube,
}

/// Decoded RGBA8 pixels plus sampling state.
#[derive(Debug, Clone)]
pub struct Texture {
    pub uuid: Uuid,
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub kind: TextureKind,
    pub color_space: ColorSpace,
    /// Tightly packed RGBA8 rows; cube faces are concatenated.
    pub data: Vec<u8>,

    pub sampler: Sampler,
    pub generate_mipmaps: bool,

    pub repeat: Vec2,
    pub offset: Vec2,
    /// Rotation around `center`, radians
    pub rotation: f32,
    pub center: Vec2,
}

impl Texture {
    #[must_use]
    pub fn new_2d(name: &str, width: u32, height: u32, data: Vec<u8>, color_space: ColorSpace) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.to_string(),
            width,
            height,
            kind: TextureKind::D2,
            color_space,
            data,
            sampler: Sampler::default(),
            generate_mipmaps: true,
            repeat: Vec2::ONE,
            offset: Vec2::ZERO,
            rotation: 0.0,
            center: Vec2::ZERO,
        }
    }

    #[must_use]
    pub fn new_cube(name: &str, size: u32, data: Vec<u8>, color_space: ColorSpace) -> Self {
        Self {
            kind: TextureKind::Cube,
            ..Self::new_2d(name, size, size, data, color_space)
        }
    }

    #[must_use]
    pub fn is_power_of_two(&self) -> bool {
        self.width.is_power_of_two() && self.height.is_power_of_two()
    }

    /// Mip levels a renderer should allocate.
    ///
    /// Non-power-of-two textures and textures sampled with nearest
    /// minification do not need a chain.
    #[must_use]
    pub fn mip_level_count(&self) -> u32 {
        if !self.generate_mipmaps || !self.is_power_of_two() || self.sampler.min_filter == FilterMode::Nearest {
            return 1;
        }
        32 - self.width.max(self.height).max(1).leading_zeros()
    }

    /// Logs a warning when mipmaps are requested for a non-power-of-two texture.
    ///
    /// Returns whether the texture is fine as configured.
    pub fn validate_mipmaps(&self) -> bool {
        if self.generate_mipmaps && !self.is_power_of_two() {
            log::warn!(
                "Texture '{}' is {}x{}, not a power of two; mipmaps will be skipped",
                self.name,
                self.width,
                self.height
            );
            return false;
        }
        true
    }

    pub fn set_wrap(&mut self, mode: WrapMode) {
        self.sampler.wrap_s = mode;
        self.sampler.wrap_t = mode;
    }

    /// Pixel-art look: nearest filtering both ways and no mipmaps.
    pub fn use_nearest_filtering(&mut self) {
        self.sampler.mag_filter = FilterMode::Nearest;
        self.sampler.min_filter = FilterMode::Nearest;
        self.generate_mipmaps = false;
    }

    #[must_use]
    pub fn face_count(&self) -> usize {
        match self.kind {
            TextureKind::D2 => 1,
            TextureKind::Cube => 6,
        }
    }

    #[must_use]
    pub fn face(&self, index: usize) -> Option<&[u8]> {
        if index >= self.face_count() {
            return None;
        }
        let len = self.width as usize * self.height as usize * 4;
        self.data.get(index * len..(index + 1) * len)
    }

    /// RGBA of one pixel on the first face.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

/// Decodes PNG/JPEG bytes into RGBA8.
pub fn decode_image(bytes: &[u8]) -> Result<(u32, u32, Vec<u8>), AssetError> {
    let img = image::load_from_memory(bytes)?;
    let rgba = img.into_rgba8();
    let (width, height) = rgba.dimensions();
    Ok((width, height, rgba.into_raw()))
}

/// Decodes a 2D texture. CPU-bound; run it off the tick thread.
pub fn decode_texture(bytes: &[u8], name: &str, color_space: ColorSpace) -> Result<Texture, AssetError> {
    let (width, height, data) = decode_image(bytes)?;
    let texture = Texture::new_2d(name, width, height, data, color_space);
    texture.validate_mipmaps();
    Ok(texture)
}

/// Assembles six decoded faces into a cube texture. Faces must be square and equally sized.
pub fn assemble_cube(
    name: &str,
    faces: Vec<(u32, u32, Vec<u8>)>,
    color_space: ColorSpace,
) -> Result<Texture, AssetError> {
    if faces.len() != 6 {
        return Err(AssetError::CubeMap(format!("expected 6 faces, got {}", faces.len())));
    }
    let size = faces[0].0;
    let mut data = Vec::with_capacity(size as usize * size as usize * 4 * 6);
    for (i, (w, h, pixels)) in faces.into_iter().enumerate() {
        if w != h {
            return Err(AssetError::CubeMap(format!("face {i} is {w}x{h}, faces must be square")));
        }
        if w != size {
            return Err(AssetError::CubeMap(format!(
                "face {i} is {w}x{h} but face 0 is {size}x{size}"
            )));
        }
        data.extend_from_slice(&pixels);
    }
    Ok(Texture::new_cube(name, size, data, color_space))
}
