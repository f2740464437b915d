use serde::{Deserialize, Serialize};

pub const MIN_STROKE_WIDTH: u32 = 1;
pub const MAX_STROKE_WIDTH: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    #[default]
    Pencil,
    Eraser,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const RED: Self = Self::rgba(255, 0, 0, 255);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_rgba_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn from_rgba_array(color: [u8; 4]) -> Self {
        Self::rgba(color[0], color[1], color[2], color[3])
    }
}

/// Brush diameter in pixels, always within `1..=20`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub struct StrokeWidth(u32);

impl StrokeWidth {
    pub fn new(width: u32) -> Self {
        Self(width.clamp(MIN_STROKE_WIDTH, MAX_STROKE_WIDTH))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl From<u32> for StrokeWidth {
    fn from(width: u32) -> Self {
        Self::new(width)
    }
}

impl From<StrokeWidth> for u32 {
    fn from(width: StrokeWidth) -> Self {
        width.0
    }
}

/// The tool selection shown in the toolbar. Only explicit user selection
/// mutates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolState {
    active_tool: Tool,
    color: Color,
    pencil_width: StrokeWidth,
    eraser_width: StrokeWidth,
}

impl Default for ToolState {
    fn default() -> Self {
        Self::new(Color::RED, 3, 10)
    }
}

impl ToolState {
    pub fn new(color: Color, pencil_width: u32, eraser_width: u32) -> Self {
        Self {
            active_tool: Tool::Pencil,
            color,
            pencil_width: StrokeWidth::new(pencil_width),
            eraser_width: StrokeWidth::new(eraser_width),
        }
    }

    pub fn active_tool(&self) -> Tool {
        self.active_tool
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn pencil_width(&self) -> StrokeWidth {
        self.pencil_width
    }

    pub fn eraser_width(&self) -> StrokeWidth {
        self.eraser_width
    }

    pub fn select_tool(&mut self, tool: Tool) {
        self.active_tool = tool;
    }

    /// Picking a color always switches back to the pencil.
    pub fn select_color(&mut self, color: Color) {
        self.color = color;
        self.active_tool = Tool::Pencil;
    }

    /// Sets the width of whichever tool is active; out-of-range values clamp.
    pub fn set_active_width(&mut self, width: u32) {
        match self.active_tool {
            Tool::Pencil => self.pencil_width = StrokeWidth::new(width),
            Tool::Eraser => self.eraser_width = StrokeWidth::new(width),
        }
    }

    pub fn active_width(&self) -> StrokeWidth {
        match self.active_tool {
            Tool::Pencil => self.pencil_width,
            Tool::Eraser => self.eraser_width,
        }
    }
}
