//! Signed-distance-field glyph atlas.
//!
//! Printable ASCII is rasterized once with `fontdue` at an upsampled size,
//! converted to a distance field (0.5 on the glyph edge, 1.0 deep inside)
//! and shelf-packed into a single `R8Unorm` atlas.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Pixel size glyphs are laid out at before `TEXT_SCALE` is applied.
pub const GLYPH_PX: f32 = 16.0;

/// Distance field reach on each side of the edge, in atlas texels.
pub const SDF_SPREAD: u32 = 3;

/// Supersampling factor of the coverage raster used to build the field.
const UPSAMPLE: u32 = 4;

const ATLAS_WIDTH: u32 = 256;
const GLYPH_PADDING: u32 = 1;

/// Candidate monospace bold fonts, most preferred first.
pub const SYSTEM_FONT_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSansMono-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSansMono-Bold.ttf",
    "/usr/share/fonts/dejavu/DejaVuSansMono-Bold.ttf",
    "/usr/share/fonts/dejavu-sans-mono-fonts/DejaVuSansMono-Bold.ttf",
    "/usr/share/fonts/truetype/ttf-bitstream-vera/VeraMoBd.ttf",
    "/Library/Fonts/Menlo.ttc",
    "/System/Library/Fonts/Menlo.ttc",
    "C:\\Windows\\Fonts\\consolab.ttf",
];

/// Placement of one glyph in the atlas, with layout metrics in glyph pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SdfGlyph {
    /// Atlas rect in texels, top-left origin.
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Left edge of the rect relative to the pen position.
    pub x_offset: f32,
    /// Top edge of the rect above the baseline (+Y up).
    pub y_offset: f32,
    pub advance: f32,
}

impl SdfGlyph {
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// CPU copy of the glyph atlas. Uploaded by the debug renderer on first use.
pub struct SdfAtlas {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    glyphs: HashMap<char, SdfGlyph>,
}

impl std::fmt::Debug for SdfAtlas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SdfAtlas")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("glyphs", &self.glyphs.len())
            .finish()
    }
}

impl SdfAtlas {
    /// Builds the atlas from TrueType/OpenType font bytes.
    pub fn from_font_bytes(bytes: &[u8]) -> Result<Self> {
        let font = fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default())
            .map_err(|e| anyhow::anyhow!("failed to parse font: {e}"))?;

        let raster_px = GLYPH_PX * UPSAMPLE as f32;
        let up = UPSAMPLE as f32;

        let mut packer = ShelfPacker::new(ATLAS_WIDTH);
        let mut fields = Vec::new();
        let mut glyphs = HashMap::new();

        for c in (32u8..=126).map(char::from) {
            let (metrics, coverage) = font.rasterize(c, raster_px);
            let advance = metrics.advance_width / up;

            if metrics.width == 0 || metrics.height == 0 {
                glyphs.insert(c, SdfGlyph {
                    x: 0,
                    y: 0,
                    width: 0,
                    height: 0,
                    x_offset: 0.0,
                    y_offset: 0.0,
                    advance,
                });
                continue;
            }

            let field = signed_distance_field(
                &coverage,
                metrics.width as u32,
                metrics.height as u32,
                UPSAMPLE,
                SDF_SPREAD,
            );
            let (x, y) = packer
                .place(field.width, field.height)
                .with_context(|| format!("glyph {c:?} does not fit the atlas"))?;

            let spread = SDF_SPREAD as f32;
            glyphs.insert(c, SdfGlyph {
                x,
                y,
                width: field.width,
                height: field.height,
                x_offset: metrics.xmin as f32 / up - spread,
                y_offset: (metrics.ymin as f32 + metrics.height as f32) / up + spread,
                advance,
            });
            fields.push((x, y, field));
        }

        let width = ATLAS_WIDTH;
        let height = packer.used_height().next_power_of_two().max(1);
        let mut pixels = vec![0u8; (width * height) as usize];

        for (x, y, field) in &fields {
            for row in 0..field.height {
                let src = (row * field.width) as usize;
                let dst = ((y + row) * width + x) as usize;
                pixels[dst..dst + field.width as usize]
                    .copy_from_slice(&field.values[src..src + field.width as usize]);
            }
        }

        log::debug!("sdf atlas: {width}x{height}, {} glyphs", glyphs.len());

        Ok(Self { width, height, pixels, glyphs })
    }

    pub fn from_font_file(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read font {}", path.display()))?;
        Self::from_font_bytes(&bytes).with_context(|| format!("font {}", path.display()))
    }

    /// Loads `explicit` if given, otherwise the first readable entry of
    /// [`SYSTEM_FONT_PATHS`].
    pub fn find_system_font(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_font_file(path);
        }

        let path = SYSTEM_FONT_PATHS
            .iter()
            .map(PathBuf::from)
            .find(|p| p.is_file())
            .context("no monospace font found; pass one with --font")?;

        log::info!("using font {}", path.display());
        Self::from_font_file(&path)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn glyph(&self, c: char) -> Option<&SdfGlyph> {
        self.glyphs.get(&c)
    }

    /// Normalized `[u0, v0, u1, v1]` of a glyph, v growing downwards.
    pub fn uv_rect(&self, g: &SdfGlyph) -> [f32; 4] {
        let w = self.width as f32;
        let h = self.height as f32;
        [
            g.x as f32 / w,
            g.y as f32 / h,
            (g.x + g.width) as f32 / w,
            (g.y + g.height) as f32 / h,
        ]
    }
}

// ── distance field ────────────────────────────────────────────────────────

/// Distance field of one glyph in atlas texels.
#[derive(Debug)]
pub(crate) struct DistanceField {
    pub width: u32,
    pub height: u32,
    pub values: Vec<u8>,
}

/// Converts an upsampled coverage bitmap into a distance field downsampled by
/// `upsample`, padded by `spread` texels on every side.
///
/// Each output texel stores `0.5 + d / (2 * spread)` where `d` is the signed
/// distance to the nearest opposite coverage sample (positive inside).
pub(crate) fn signed_distance_field(
    coverage: &[u8],
    width: u32,
    height: u32,
    upsample: u32,
    spread: u32,
) -> DistanceField {
    let inside = |x: i64, y: i64| -> bool {
        x >= 0
            && y >= 0
            && x < width as i64
            && y < height as i64
            && coverage[(y as u64 * width as u64 + x as u64) as usize] >= 128
    };

    let out_w = width.div_ceil(upsample) + 2 * spread;
    let out_h = height.div_ceil(upsample) + 2 * spread;
    let reach = (spread * upsample) as i64;
    let max_dist = reach as f32;

    let mut values = Vec::with_capacity((out_w * out_h) as usize);
    for oy in 0..out_h {
        for ox in 0..out_w {
            // Sample center in upsampled pixels.
            let cx = (ox as f32 - spread as f32 + 0.5) * upsample as f32;
            let cy = (oy as f32 - spread as f32 + 0.5) * upsample as f32;
            let px = cx.floor() as i64;
            let py = cy.floor() as i64;
            let here = inside(px, py);

            let mut best = max_dist * max_dist;
            for sy in (py - reach)..=(py + reach) {
                let dy = sy as f32 + 0.5 - cy;
                if dy * dy >= best {
                    continue;
                }
                for sx in (px - reach)..=(px + reach) {
                    if inside(sx, sy) == here {
                        continue;
                    }
                    let dx = sx as f32 + 0.5 - cx;
                    best = best.min(dx * dx + dy * dy);
                }
            }

            let edge = (best.sqrt() - 0.5).max(0.0).min(max_dist);
            let signed = if here { edge } else { -edge };
            let v = 0.5 + 0.5 * signed / max_dist;
            values.push((v.clamp(0.0, 1.0) * 255.0).round() as u8);
        }
    }

    DistanceField { width: out_w, height: out_h, values }
}

// ── packing ───────────────────────────────────────────────────────────────

struct ShelfPacker {
    width: u32,
    cursor_x: u32,
    cursor_y: u32,
    row_height: u32,
}

impl ShelfPacker {
    fn new(width: u32) -> Self {
        Self {
            width,
            cursor_x: GLYPH_PADDING,
            cursor_y: GLYPH_PADDING,
            row_height: 0,
        }
    }

    fn place(&mut self, w: u32, h: u32) -> Option<(u32, u32)> {
        if w + 2 * GLYPH_PADDING > self.width {
            return None;
        }
        if self.cursor_x + w + GLYPH_PADDING > self.width {
            self.cursor_y += self.row_height + GLYPH_PADDING;
            self.cursor_x = GLYPH_PADDING;
            self.row_height = 0;
        }
        let at = (self.cursor_x, self.cursor_y);
        self.cursor_x += w + GLYPH_PADDING;
        self.row_height = self.row_height.max(h);
        Some(at)
    }

    fn used_height(&self) -> u32 {
        self.cursor_y + self.row_height + GLYPH_PADDING
    }
}
