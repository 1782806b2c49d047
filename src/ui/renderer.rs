//! Toggle screen rendering
//!
//! Draws the toggle screen with tiny-skia. Layout calculation is separate
//! from rasterization so that geometry (hit region, radii) can be tested
//! without touching pixels.

use std::path::Path;

use ab_glyph::{Font, FontVec, PxScale, ScaleFont, point};
use tiny_skia::{
    Color, FillRule, LineCap, Paint, PathBuilder, Pixmap, PremultipliedColorU8, Stroke, Transform,
};

use crate::app::state::ToggleFrame;
use crate::domain::Rgb;
use crate::domain::core::{Point, Rect};

/// Rendering errors
#[derive(Debug, thiserror::Error)]
pub enum RendererError {
    #[error("Failed to create pixmap for rendering")]
    PixmapCreationFailed,

    #[error("Invalid canvas dimensions: {width}x{height}")]
    InvalidCanvasDimensions { width: u32, height: u32 },

    #[error("Failed to load caption font {path}: {reason}")]
    FontLoadFailed { path: String, reason: String },
}

/// Halo radii relative to the toggle side
const HALO_RADII: [f32; 2] = [0.36, 0.5];
const HALO_ALPHA: f32 = 0.3;
const CORE_RADIUS: f32 = 0.25;
/// Icon box relative to the toggle side
const ICON_SIZE: f32 = 70.0 / 260.0;
/// Half-width of the gap at the top of the power arc, in degrees
const ICON_GAP_DEGREES: f32 = 40.0;
const ARC_SEGMENTS: usize = 48;
/// Press ripple, unbounded, relative to the toggle side
const RIPPLE_RADIUS: f32 = 300.0 / 260.0;
const RIPPLE_ALPHA: f32 = 0.24;

/// Power symbol geometry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerIcon {
    pub center: Point,
    pub radius: f32,
    pub stroke_width: f32,
}

/// Caption placement below the toggle
#[derive(Debug, Clone, PartialEq)]
pub struct Caption {
    pub text: &'static str,
    pub center_x: f32,
    pub baseline: f32,
    pub font_size: f32,
}

/// Pre-calculated geometry and colors for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct ToggleLayout {
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// Clickable square around the circles
    pub toggle_rect: Rect,
    pub center: Point,
    pub halo_radii: [f32; 2],
    pub core_radius: f32,
    pub icon: PowerIcon,
    pub caption: Caption,
    pub background: Rgb,
    pub switch: Rgb,
    /// White ripple shown while the toggle is held down
    pub pressed: bool,
    pub ripple_radius: f32,
}

impl ToggleLayout {
    /// Lays out `frame` on a canvas, the toggle centered and at most
    /// `toggle_size` pixels wide
    pub fn from_frame(
        frame: &ToggleFrame,
        canvas_width: u32,
        canvas_height: u32,
        toggle_size: f32,
    ) -> Result<Self, RendererError> {
        if canvas_width == 0 || canvas_height == 0 {
            return Err(RendererError::InvalidCanvasDimensions {
                width: canvas_width,
                height: canvas_height,
            });
        }

        let width = canvas_width as f32;
        let height = canvas_height as f32;
        let side = toggle_size.min(width * 0.9).min(height * 0.9).max(1.0);
        let center = Point::new(width / 2.0, height / 2.0);
        let toggle_rect = Rect::centered_square(center, side);

        let icon_size = side * ICON_SIZE;

        Ok(Self {
            canvas_width,
            canvas_height,
            toggle_rect,
            center,
            halo_radii: HALO_RADII.map(|r| r * side),
            core_radius: side * CORE_RADIUS,
            icon: PowerIcon {
                center,
                radius: icon_size * 0.38,
                stroke_width: (icon_size * 0.1).max(1.5),
            },
            caption: Caption {
                text: frame.description,
                center_x: center.x,
                baseline: toggle_rect.bottom() + side * 0.15,
                font_size: (side * 0.08).max(12.0),
            },
            background: frame.background,
            switch: frame.switch,
            pressed: false,
            ripple_radius: side * RIPPLE_RADIUS,
        })
    }

    /// Same layout with the press ripple shown or hidden
    pub fn with_press(mut self, pressed: bool) -> Self {
        self.pressed = pressed;
        self
    }
}

fn skia_color(color: Rgb, alpha: f32) -> Color {
    Color::from_rgba8(color.r, color.g, color.b, (alpha.clamp(0.0, 1.0) * 255.0).round() as u8)
}

/// Toggle screen renderer using tiny-skia
pub struct ToggleRenderer {
    caption_font: Option<FontVec>,
}

impl ToggleRenderer {
    /// A renderer without caption text
    pub fn new() -> Self {
        Self { caption_font: None }
    }

    pub fn with_font(font: FontVec) -> Self {
        Self {
            caption_font: Some(font),
        }
    }

    /// Reads a TrueType/OpenType font for the caption
    pub fn load_font(path: &Path) -> Result<FontVec, RendererError> {
        let failed = |reason: String| RendererError::FontLoadFailed {
            path: path.display().to_string(),
            reason,
        };
        let data = std::fs::read(path).map_err(|e| failed(e.to_string()))?;
        FontVec::try_from_vec(data).map_err(|e| failed(e.to_string()))
    }

    /// Renderer with the caption font at `path`, if any
    ///
    /// An unreadable font only disables the caption.
    pub fn with_optional_font(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::new();
        };
        match Self::load_font(path) {
            Ok(font) => {
                tracing::debug!(path = %path.display(), "caption font loaded");
                Self::with_font(font)
            }
            Err(err) => {
                tracing::warn!(error = %err, "caption disabled");
                Self::new()
            }
        }
    }

    pub fn has_caption_font(&self) -> bool {
        self.caption_font.is_some()
    }

    /// Render a layout to a new pixmap
    pub fn render(&self, layout: &ToggleLayout) -> Result<Pixmap, RendererError> {
        let mut pixmap = Pixmap::new(layout.canvas_width, layout.canvas_height)
            .ok_or(RendererError::PixmapCreationFailed)?;

        pixmap.fill(skia_color(layout.background, 1.0));

        // Halos first, largest at the bottom
        for radius in layout.halo_radii.iter().rev() {
            Self::fill_circle(&mut pixmap, layout.center, *radius, skia_color(layout.switch, HALO_ALPHA));
        }
        Self::fill_circle(&mut pixmap, layout.center, layout.core_radius, skia_color(layout.switch, 1.0));

        Self::draw_power_icon(&mut pixmap, &layout.icon);

        if layout.pressed {
            Self::fill_circle(
                &mut pixmap,
                layout.center,
                layout.ripple_radius,
                skia_color(Rgb::WHITE, RIPPLE_ALPHA),
            );
        }

        if let Some(font) = &self.caption_font {
            Self::draw_caption(&mut pixmap, font, &layout.caption);
        }

        Ok(pixmap)
    }

    fn fill_circle(pixmap: &mut Pixmap, center: Point, radius: f32, color: Color) {
        let Some(path) = PathBuilder::from_circle(center.x, center.y, radius) else {
            return;
        };
        let mut paint = Paint::default();
        paint.set_color(color);
        paint.anti_alias = true;
        pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
    }

    /// Open ring with a vertical bar through the gap at the top
    fn draw_power_icon(pixmap: &mut Pixmap, icon: &PowerIcon) {
        let mut builder = PathBuilder::new();

        // Screen y grows downwards, so -90 degrees points up
        let start = (-90.0 + ICON_GAP_DEGREES).to_radians();
        let sweep = (360.0 - 2.0 * ICON_GAP_DEGREES).to_radians();
        for step in 0..=ARC_SEGMENTS {
            let angle = start + sweep * step as f32 / ARC_SEGMENTS as f32;
            let x = icon.center.x + icon.radius * angle.cos();
            let y = icon.center.y + icon.radius * angle.sin();
            if step == 0 {
                builder.move_to(x, y);
            } else {
                builder.line_to(x, y);
            }
        }

        builder.move_to(icon.center.x, icon.center.y - icon.radius * 1.15);
        builder.line_to(icon.center.x, icon.center.y - icon.radius * 0.2);

        let Some(path) = builder.finish() else {
            return;
        };

        let mut paint = Paint::default();
        paint.set_color(Color::WHITE);
        paint.anti_alias = true;
        let stroke = Stroke {
            width: icon.stroke_width,
            line_cap: LineCap::Round,
            ..Stroke::default()
        };
        pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }

    fn draw_caption(pixmap: &mut Pixmap, font: &FontVec, caption: &Caption) {
        let scale = PxScale::from(caption.font_size);
        let scaled = font.as_scaled(scale);

        let width: f32 = caption
            .text
            .chars()
            .map(|c| scaled.h_advance(scaled.glyph_id(c)))
            .sum();
        let mut caret = caption.center_x - width / 2.0;

        let canvas_width = pixmap.width() as i32;
        let canvas_height = pixmap.height() as i32;
        let pixels = pixmap.pixels_mut();

        for c in caption.text.chars() {
            let mut glyph = scaled.scaled_glyph(c);
            glyph.position = point(caret, caption.baseline);
            caret += scaled.h_advance(glyph.id);

            let Some(outlined) = font.outline_glyph(glyph) else {
                continue; // whitespace has no outline
            };
            let bounds = outlined.px_bounds();
            outlined.draw(|gx, gy, coverage| {
                let x = bounds.min.x as i32 + gx as i32;
                let y = bounds.min.y as i32 + gy as i32;
                if x < 0 || y < 0 || x >= canvas_width || y >= canvas_height {
                    return;
                }
                let index = (y * canvas_width + x) as usize;
                pixels[index] = blend_white(pixels[index], coverage);
            });
        }
    }

    /// Convert pixmap to the BGRA byte order GDI expects for 32-bit DIBs
    pub fn pixmap_to_bgra(pixmap: &Pixmap) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(pixmap.data().len());
        for pixel in pixmap.pixels() {
            bytes.extend_from_slice(&[pixel.blue(), pixel.green(), pixel.red(), pixel.alpha()]);
        }
        bytes
    }
}

impl Default for ToggleRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Source-over of white with `coverage` alpha onto a premultiplied pixel
fn blend_white(dst: PremultipliedColorU8, coverage: f32) -> PremultipliedColorU8 {
    let src = (coverage.clamp(0.0, 1.0) * 255.0).round();
    let keep = 1.0 - src / 255.0;
    let mix = |channel: u8| (src + channel as f32 * keep).round().min(255.0) as u8;

    let alpha = mix(dst.alpha());
    // Channels never exceed alpha because white is the brightest source
    PremultipliedColorU8::from_rgba(
        mix(dst.red()).min(alpha),
        mix(dst.green()).min(alpha),
        mix(dst.blue()).min(alpha),
        alpha,
    )
    .unwrap_or(dst)
}
