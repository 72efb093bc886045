//! Typeface Fonts
//!
//! Reads the typeface JSON format produced by the usual TTF-to-typeface
//! converters (one entry per glyph with its advance, horizontal extent and
//! outline commands) and lays out text from it.
//!
//! Outlines are kept as raw command strings: tessellating them is the
//! renderer's job. Layout only needs advances and extents, which is enough
//! to size, center and pick text meshes.

use glam::{Vec2, Vec3};
use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::errors::AssetError;
use crate::scene::geometry::{BoundingBox, Geometry};

#[derive(Debug, Clone, Deserialize)]
pub struct Glyph {
    /// Horizontal advance, font units
    pub ha: f32,
    #[serde(default)]
    pub x_min: f32,
    #[serde(default)]
    pub x_max: f32,
    /// Outline commands (`m`, `l`, `q`, `b`), absent for blank glyphs
    #[serde(default)]
    pub o: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontBounds {
    pub x_min: f32,
    pub x_max: f32,
    pub y_min: f32,
    pub y_max: f32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Font {
    #[serde(default)]
    pub family_name: String,
    pub resolution: f32,
    pub bounding_box: FontBounds,
    #[serde(default)]
    pub underline_thickness: f32,
    #[serde(default)]
    pub underline_position: f32,
    pub glyphs: FxHashMap<String, Glyph>,
}

/// Extrusion parameters for text meshes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextOptions {
    /// Em size in world units.
    pub size: f32,
    /// Extrusion depth.
    pub depth: f32,
    pub curve_segments: u32,
    pub bevel_enabled: bool,
    pub bevel_thickness: f32,
    pub bevel_size: f32,
    pub bevel_segments: u32,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            size: 100.0,
            depth: 50.0,
            curve_segments: 12,
            bevel_enabled: false,
            bevel_thickness: 10.0,
            bevel_size: 8.0,
            bevel_segments: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedGlyph {
    pub ch: char,
    /// Pen position of the glyph origin.
    pub offset: Vec2,
    pub advance: f32,
}

/// Text laid out in the XY plane, extruded along +Z.
#[derive(Debug, Clone)]
pub struct TextLayout {
    pub text: String,
    pub glyphs: Vec<PlacedGlyph>,
    pub bounds: BoundingBox,
    pub options: TextOptions,
}

impl Font {
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, AssetError> {
        let font: Font = serde_json::from_slice(bytes)
            .map_err(|e| AssetError::Format(format!("typeface JSON: {e}")))?;
        if font.resolution <= 0.0 {
            return Err(AssetError::Format(format!(
                "typeface '{}' has a non-positive resolution",
                font.family_name
            )));
        }
        Ok(font)
    }

    #[must_use]
    pub fn glyph(&self, ch: char) -> Option<&Glyph> {
        let mut buf = [0u8; 4];
        self.glyphs.get(&*ch.encode_utf8(&mut buf))
    }

    /// Distance between baselines at `size`.
    #[must_use]
    pub fn line_height(&self, size: f32) -> f32 {
        let bb = &self.bounding_box;
        (bb.y_max - bb.y_min + self.underline_thickness) * size / self.resolution
    }

    /// Lays out `text`. `\n` starts a new line below.
    ///
    /// Characters missing from the font fall back to `?`, or are skipped
    /// with an error log when the font has no `?` either.
    #[must_use]
    pub fn layout(&self, text: &str, options: TextOptions) -> TextLayout {
        let scale = options.size / self.resolution;
        let line_height = self.line_height(options.size);
        let mut pen = Vec2::ZERO;
        let mut glyphs = Vec::new();
        let mut bounds = BoundingBox::empty();

        let bevel = if options.bevel_enabled {
            Vec2::new(options.bevel_size, options.bevel_thickness)
        } else {
            Vec2::ZERO
        };
        let y_min = self.bounding_box.y_min * scale;
        let y_max = self.bounding_box.y_max * scale;

        for ch in text.chars() {
            if ch == '\n' {
                pen.x = 0.0;
                pen.y -= line_height;
                continue;
            }
            let Some(glyph) = self.glyph(ch).or_else(|| self.glyph('?')) else {
                log::error!(
                    "Character '{ch}' does not exist in font family '{}'",
                    self.family_name
                );
                continue;
            };

            let advance = glyph.ha * scale;
            if glyph.o.is_some() {
                bounds.expand(Vec3::new(
                    pen.x + glyph.x_min * scale - bevel.x,
                    pen.y + y_min - bevel.x,
                    -bevel.y,
                ));
                bounds.expand(Vec3::new(
                    pen.x + glyph.x_max * scale + bevel.x,
                    pen.y + y_max + bevel.x,
                    options.depth + bevel.y,
                ));
            }
            glyphs.push(PlacedGlyph {
                ch,
                offset: pen,
                advance,
            });
            pen.x += advance;
        }

        if bounds.is_empty() {
            bounds = BoundingBox::new(Vec3::ZERO, Vec3::ZERO);
        }

        TextLayout {
            text: text.to_string(),
            glyphs,
            bounds,
            options,
        }
    }
}

impl TextLayout {
    /// Translates the layout so its bounding box is centered on the origin.
    pub fn center(&mut self) {
        let center = self.bounds.center();
        for glyph in &mut self.glyphs {
            glyph.offset -= center.truncate();
        }
        self.bounds = self.bounds.translate(-center);
    }

    #[must_use]
    pub fn width(&self) -> f32 {
        self.bounds.size().x
    }

    /// Glyphs that produce geometry (everything but blanks).
    #[must_use]
    pub fn visible_glyph_count(&self, font: &Font) -> usize {
        self.glyphs
            .iter()
            .filter(|g| {
                font.glyph(g.ch)
                    .or_else(|| font.glyph('?'))
                    .is_some_and(|glyph| glyph.o.is_some())
            })
            .count()
    }
}

impl From<&TextLayout> for Geometry {
    fn from(layout: &TextLayout) -> Self {
        Geometry::Text {
            bounds: layout.bounds,
            glyph_count: layout.glyphs.len(),
        }
    }
}
