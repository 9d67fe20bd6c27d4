//! # Drawing Surface
//!
//! Abstract 2D immediate-mode drawing target. Renderers only ever talk to a
//! [`DrawSurface`]; a windowing backend, an offscreen raster or the
//! [`RecordingSurface`] used by the headless binary and by tests all fit
//! behind it.
//!
//! Coordinates are screen pixels after the current transform. Alpha,
//! composite mode, shadow and transform are saved and restored as a stack.

use crate::foundation::math::Vec2;

/// RGBA colour; alpha in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
    /// Opacity
    pub a: f32,
}

impl Color {
    /// Opaque white
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    /// Opaque black
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Fully transparent
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0.0);

    /// Opaque colour
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Colour with alpha
    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa`
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        let channel = |range: std::ops::Range<usize>| {
            digits.get(range).and_then(|s| u8::from_str_radix(s, 16).ok())
        };
        match digits.len() {
            3 => {
                let short = |i: usize| channel(i..i + 1).map(|v| v * 17);
                Some(Self::rgb(short(0)?, short(1)?, short(2)?))
            }
            6 => Some(Self::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
            8 => Some(Self::rgba(
                channel(0..2)?,
                channel(2..4)?,
                channel(4..6)?,
                f32::from(channel(6..8)?) / 255.0,
            )),
            _ => None,
        }
    }

    /// Parse a hex colour, falling back when it is malformed
    pub fn from_hex_or(hex: &str, fallback: Self) -> Self {
        Self::from_hex(hex).unwrap_or_else(|| {
            log::warn!("Invalid colour '{}', using fallback", hex);
            fallback
        })
    }

    /// Same colour with a different alpha
    pub fn with_alpha(self, a: f32) -> Self {
        Self {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }

    /// Channel-wise blend toward `other`
    pub fn mix(self, other: Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let blend = |a: u8, b: u8| (f32::from(a) + (f32::from(b) - f32::from(a)) * t).round() as u8;
        Self {
            r: blend(self.r, other.r),
            g: blend(self.g, other.g),
            b: blend(self.b, other.b),
            a: self.a + (other.a - self.a) * t,
        }
    }
}

/// Colour stop of a gradient
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    /// Position in `[0, 1]`
    pub offset: f32,
    /// Colour at the stop
    pub color: Color,
}

/// Linear gradient between two screen points
#[derive(Debug, Clone, PartialEq)]
pub struct LinearGradient {
    /// Start point
    pub start: Vec2,
    /// End point
    pub end: Vec2,
    /// Ordered colour stops
    pub stops: Vec<GradientStop>,
}

impl LinearGradient {
    /// Gradient without stops
    pub fn new(start: Vec2, end: Vec2) -> Self {
        Self {
            start,
            end,
            stops: Vec::new(),
        }
    }

    /// Append a colour stop
    pub fn with_stop(mut self, offset: f32, color: Color) -> Self {
        self.stops.push(GradientStop {
            offset: offset.clamp(0.0, 1.0),
            color,
        });
        self
    }
}

/// Radial gradient from a centre outward
#[derive(Debug, Clone, PartialEq)]
pub struct RadialGradient {
    /// Centre point
    pub center: Vec2,
    /// Radius at which the last stop applies
    pub radius: f32,
    /// Ordered colour stops
    pub stops: Vec<GradientStop>,
}

impl RadialGradient {
    /// Gradient without stops
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self {
            center,
            radius,
            stops: Vec::new(),
        }
    }

    /// Append a colour stop
    pub fn with_stop(mut self, offset: f32, color: Color) -> Self {
        self.stops.push(GradientStop {
            offset: offset.clamp(0.0, 1.0),
            color,
        });
        self
    }
}

/// Fill or stroke style
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    /// Flat colour
    Solid(Color),
    /// Linear gradient
    Linear(LinearGradient),
    /// Radial gradient
    Radial(RadialGradient),
}

impl From<Color> for Paint {
    fn from(color: Color) -> Self {
        Self::Solid(color)
    }
}

impl From<LinearGradient> for Paint {
    fn from(gradient: LinearGradient) -> Self {
        Self::Linear(gradient)
    }
}

impl From<RadialGradient> for Paint {
    fn from(gradient: RadialGradient) -> Self {
        Self::Radial(gradient)
    }
}

/// How new pixels combine with existing ones
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompositeMode {
    /// Normal alpha blending
    #[default]
    SourceOver,
    /// Additive blending for glows
    Lighter,
}

/// Horizontal text anchoring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    /// Anchor at the left edge
    Left,
    /// Anchor at the centre
    #[default]
    Center,
    /// Anchor at the right edge
    Right,
}

/// Reference to an image that may still be loading
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageHandle {
    /// Backend identifier
    pub id: String,
    /// Natural width in pixels
    pub width: u32,
    /// Natural height in pixels
    pub height: u32,
    /// Whether decoding finished and the image can be drawn
    pub complete: bool,
}

impl ImageHandle {
    /// Handle for a fully loaded image
    pub fn loaded(id: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            id: id.into(),
            width,
            height,
            complete: true,
        }
    }

    /// Handle for an image still loading
    pub fn pending(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            width: 0,
            height: 0,
            complete: false,
        }
    }
}

/// Immediate-mode 2D drawing target
pub trait DrawSurface {
    /// Width in pixels
    fn width(&self) -> f32;

    /// Height in pixels
    fn height(&self) -> f32;

    /// Whether the surface can currently be drawn to
    fn is_available(&self) -> bool {
        self.width() > 0.0 && self.height() > 0.0
    }

    /// Change the surface size
    fn resize(&mut self, width: f32, height: f32);

    /// Push alpha, composite, shadow and transform
    fn save(&mut self);

    /// Pop the state pushed by the matching [`DrawSurface::save`]
    fn restore(&mut self);

    /// Number of saved states not yet restored
    fn save_depth(&self) -> usize;

    /// Global opacity multiplier
    fn set_alpha(&mut self, alpha: f32);

    /// Blend mode for following draws
    fn set_composite(&mut self, mode: CompositeMode);

    /// Shadow for following draws; zero blur disables it
    fn set_shadow(&mut self, color: Color, blur: f32);

    /// Translate the current transform
    fn translate(&mut self, x: f32, y: f32);

    /// Rotate the current transform by radians
    fn rotate(&mut self, angle: f32);

    /// Scale the current transform
    fn scale(&mut self, sx: f32, sy: f32);

    /// Fill the whole surface, ignoring the transform
    fn clear(&mut self, color: Color);

    /// Fill an axis-aligned rectangle
    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, paint: &Paint);

    /// Outline an axis-aligned rectangle
    fn stroke_rect(&mut self, x: f32, y: f32, width: f32, height: f32, paint: &Paint, line_width: f32);

    /// Fill a circle
    fn fill_circle(&mut self, x: f32, y: f32, radius: f32, paint: &Paint);

    /// Outline a circle
    fn stroke_circle(&mut self, x: f32, y: f32, radius: f32, paint: &Paint, line_width: f32);

    /// Fill a closed polygon
    fn fill_polygon(&mut self, points: &[Vec2], paint: &Paint);

    /// Stroke an open polyline
    fn stroke_polyline(&mut self, points: &[Vec2], paint: &Paint, line_width: f32);

    /// Draw a line segment
    fn stroke_line(&mut self, from: Vec2, to: Vec2, paint: &Paint, line_width: f32) {
        self.stroke_polyline(&[from, to], paint, line_width);
    }

    /// Draw text anchored at a baseline point
    fn fill_text(&mut self, text: &str, x: f32, y: f32, size: f32, paint: &Paint, align: TextAlign);

    /// Draw an image into a rectangle
    fn draw_image(&mut self, image: &ImageHandle, x: f32, y: f32, width: f32, height: f32);
}

/// One recorded draw operation
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Surface cleared
    Clear(Color),
    /// State pushed
    Save,
    /// State popped
    Restore,
    /// Translation applied
    Translate(Vec2),
    /// Rotation applied
    Rotate(f32),
    /// Scale applied
    Scale(Vec2),
    /// Shadow changed
    Shadow {
        /// Shadow colour
        color: Color,
        /// Blur radius
        blur: f32,
    },
    /// Rectangle filled
    FillRect {
        /// Top-left corner
        origin: Vec2,
        /// Width and height
        size: Vec2,
        /// Fill style
        paint: Paint,
        /// Effective alpha
        alpha: f32,
    },
    /// Rectangle outlined
    StrokeRect {
        /// Top-left corner
        origin: Vec2,
        /// Width and height
        size: Vec2,
        /// Stroke style
        paint: Paint,
        /// Line width
        line_width: f32,
    },
    /// Circle filled
    FillCircle {
        /// Centre
        center: Vec2,
        /// Radius
        radius: f32,
        /// Fill style
        paint: Paint,
        /// Effective alpha
        alpha: f32,
        /// Blend mode
        composite: CompositeMode,
    },
    /// Circle outlined
    StrokeCircle {
        /// Centre
        center: Vec2,
        /// Radius
        radius: f32,
        /// Stroke style
        paint: Paint,
        /// Line width
        line_width: f32,
    },
    /// Polygon filled
    FillPolygon {
        /// Vertices
        points: Vec<Vec2>,
        /// Fill style
        paint: Paint,
        /// Effective alpha
        alpha: f32,
    },
    /// Polyline stroked
    StrokePolyline {
        /// Vertices
        points: Vec<Vec2>,
        /// Stroke style
        paint: Paint,
        /// Line width
        line_width: f32,
    },
    /// Text drawn
    Text {
        /// Content
        text: String,
        /// Anchor point
        position: Vec2,
        /// Font size in pixels
        size: f32,
        /// Alignment
        align: TextAlign,
    },
    /// Image drawn
    Image {
        /// Image identifier
        id: String,
        /// Top-left corner
        origin: Vec2,
        /// Width and height
        size: Vec2,
    },
}

#[derive(Debug, Clone, Copy)]
struct SurfaceState {
    alpha: f32,
    composite: CompositeMode,
}

impl Default for SurfaceState {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            composite: CompositeMode::SourceOver,
        }
    }
}

/// Surface that records every call instead of rasterizing
///
/// Backs headless runs and lets tests assert on what a renderer drew.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    width: f32,
    height: f32,
    commands: Vec<DrawCommand>,
    state: SurfaceState,
    stack: Vec<SurfaceState>,
}

impl RecordingSurface {
    /// Create a recording surface of the given size
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Everything recorded since the last [`RecordingSurface::take_commands`]
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Drain the recorded commands
    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Number of commands matching a predicate
    pub fn count(&self, predicate: impl Fn(&DrawCommand) -> bool) -> usize {
        self.commands.iter().filter(|command| predicate(command)).count()
    }

    /// Text strings drawn, in order
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Current global alpha
    pub const fn alpha(&self) -> f32 {
        self.state.alpha
    }

    fn record(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }
}

impl DrawSurface for RecordingSurface {
    fn width(&self) -> f32 {
        self.width
    }

    fn height(&self) -> f32 {
        self.height
    }

    fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }

    fn save(&mut self) {
        self.stack.push(self.state);
        self.record(DrawCommand::Save);
    }

    fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        } else {
            log::warn!("RecordingSurface::restore without matching save");
        }
        self.record(DrawCommand::Restore);
    }

    fn save_depth(&self) -> usize {
        self.stack.len()
    }

    fn set_alpha(&mut self, alpha: f32) {
        self.state.alpha = alpha.clamp(0.0, 1.0);
    }

    fn set_composite(&mut self, mode: CompositeMode) {
        self.state.composite = mode;
    }

    fn set_shadow(&mut self, color: Color, blur: f32) {
        self.record(DrawCommand::Shadow { color, blur });
    }

    fn translate(&mut self, x: f32, y: f32) {
        self.record(DrawCommand::Translate(Vec2::new(x, y)));
    }

    fn rotate(&mut self, angle: f32) {
        self.record(DrawCommand::Rotate(angle));
    }

    fn scale(&mut self, sx: f32, sy: f32) {
        self.record(DrawCommand::Scale(Vec2::new(sx, sy)));
    }

    fn clear(&mut self, color: Color) {
        self.record(DrawCommand::Clear(color));
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, paint: &Paint) {
        self.record(DrawCommand::FillRect {
            origin: Vec2::new(x, y),
            size: Vec2::new(width, height),
            paint: paint.clone(),
            alpha: self.state.alpha,
        });
    }

    fn stroke_rect(&mut self, x: f32, y: f32, width: f32, height: f32, paint: &Paint, line_width: f32) {
        self.record(DrawCommand::StrokeRect {
            origin: Vec2::new(x, y),
            size: Vec2::new(width, height),
            paint: paint.clone(),
            line_width,
        });
    }

    fn fill_circle(&mut self, x: f32, y: f32, radius: f32, paint: &Paint) {
        self.record(DrawCommand::FillCircle {
            center: Vec2::new(x, y),
            radius,
            paint: paint.clone(),
            alpha: self.state.alpha,
            composite: self.state.composite,
        });
    }

    fn stroke_circle(&mut self, x: f32, y: f32, radius: f32, paint: &Paint, line_width: f32) {
        self.record(DrawCommand::StrokeCircle {
            center: Vec2::new(x, y),
            radius,
            paint: paint.clone(),
            line_width,
        });
    }

    fn fill_polygon(&mut self, points: &[Vec2], paint: &Paint) {
        self.record(DrawCommand::FillPolygon {
            points: points.to_vec(),
            paint: paint.clone(),
            alpha: self.state.alpha,
        });
    }

    fn stroke_polyline(&mut self, points: &[Vec2], paint: &Paint, line_width: f32) {
        self.record(DrawCommand::StrokePolyline {
            points: points.to_vec(),
            paint: paint.clone(),
            line_width,
        });
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32, size: f32, _paint: &Paint, align: TextAlign) {
        self.record(DrawCommand::Text {
            text: text.to_string(),
            position: Vec2::new(x, y),
            size,
            align,
        });
    }

    fn draw_image(&mut self, image: &ImageHandle, x: f32, y: f32, width: f32, height: f32) {
        self.record(DrawCommand::Image {
            id: image.id.clone(),
            origin: Vec2::new(x, y),
            size: Vec2::new(width, height),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_hex_parsing() {
        assert_eq!(Color::from_hex("#ff8000"), Some(Color::rgb(255, 128, 0)));
        assert_eq!(Color::from_hex("#fff"), Some(Color::WHITE));
        let translucent = Color::from_hex("#00000080").unwrap();
        assert_relative_eq!(translucent.a, 128.0 / 255.0);
        assert_eq!(Color::from_hex("#12"), None);
        assert_eq!(Color::from_hex("#zzzzzz"), None);
        assert_eq!(Color::from_hex_or("nope", Color::BLACK), Color::BLACK);
    }

    #[test]
    fn test_mix_endpoints() {
        let a = Color::rgb(0, 0, 0);
        let b = Color::rgb(200, 100, 50);
        assert_eq!(a.mix(b, 0.0), a);
        assert_eq!(a.mix(b, 1.0), b);
        assert_eq!(a.mix(b, 0.5), Color::rgb(100, 50, 25));
    }

    #[test]
    fn test_save_restore_alpha() {
        let mut surface = RecordingSurface::new(100.0, 100.0);
        surface.save();
        surface.set_alpha(0.25);
        surface.fill_circle(1.0, 2.0, 3.0, &Color::WHITE.into());
        surface.restore();
        assert_relative_eq!(surface.alpha(), 1.0);
        assert_eq!(surface.save_depth(), 0);

        match &surface.commands()[1] {
            DrawCommand::FillCircle { alpha, .. } => assert_relative_eq!(*alpha, 0.25),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_zero_size_unavailable() {
        assert!(!RecordingSurface::new(0.0, 600.0).is_available());
        assert!(RecordingSurface::new(1.0, 1.0).is_available());
    }
}
