//! Renderer trait abstraction.

use kurbo::Size;
use peniko::Color;
use topolink_core::Editor;

/// Background grid style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GridStyle {
    /// Plain background.
    None,
    /// Full grid lines.
    #[default]
    Lines,
    /// Only intersection dots.
    Dots,
}

/// Colours used for diagram entities.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub group_fill: Color,
    pub group_stroke: Color,
    pub device_fill: Color,
    pub device_stroke: Color,
    pub port: Color,
    pub connection: Color,
    /// Line drawn while a connection gesture is active.
    pub temporary_connection: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            group_fill: Color::from_rgba8(241, 245, 249, 255),
            group_stroke: Color::from_rgba8(100, 116, 139, 255),
            device_fill: Color::from_rgba8(255, 255, 255, 255),
            device_stroke: Color::from_rgba8(30, 41, 59, 255),
            port: Color::from_rgba8(16, 185, 129, 255),
            connection: Color::from_rgba8(71, 85, 105, 255),
            temporary_connection: Color::from_rgba8(59, 130, 246, 255), // Blue
        }
    }
}

/// Context for a single render frame.
pub struct RenderContext<'a> {
    /// The editor to render.
    pub editor: &'a Editor,
    /// Viewport size in physical pixels.
    pub viewport_size: Size,
    /// Device pixel ratio (for HiDPI).
    pub scale_factor: f64,
    pub background_color: Color,
    pub grid_style: GridStyle,
    /// Grid spacing in content units.
    pub grid_spacing: f64,
    pub palette: Palette,
}

impl<'a> RenderContext<'a> {
    /// Create a new render context.
    pub fn new(editor: &'a Editor, viewport_size: Size) -> Self {
        Self {
            editor,
            viewport_size,
            scale_factor: 1.0,
            background_color: Color::from_rgba8(250, 250, 250, 255),
            grid_style: GridStyle::Lines,
            grid_spacing: 20.0,
            palette: Palette::default(),
        }
    }

    /// Set the scale factor for HiDPI.
    pub fn with_scale_factor(mut self, scale_factor: f64) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    /// Set the grid style.
    pub fn with_grid(mut self, style: GridStyle) -> Self {
        self.grid_style = style;
        self
    }
}

/// Trait for rendering backends.
pub trait Renderer {
    /// Build the draw commands for a frame.
    ///
    /// Called once per frame; connection geometry must be derived from the
    /// entity positions in `ctx`, never cached across frames.
    fn build_scene(&mut self, ctx: &RenderContext);
}
