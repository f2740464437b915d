use crate::draw::capture::InkBounds;
use crate::draw::composite::{CompositeMode, RgbaBuffer};
use crate::draw::input::StrokePoint;
use crate::draw::model::{Color, StrokeWidth, Tool};
use crate::error::SurfaceError;

#[derive(Debug, Clone, Copy, PartialEq)]
struct OpenStroke {
    last: (i32, i32),
    mode: CompositeMode,
    width: u32,
}

/// The raster the user draws on. Sole owner and writer of pixel data.
///
/// Strokes are rasterized incrementally: every `extend_stroke` commits its
/// segment to the buffer right away, so a half-finished stroke is visible.
#[derive(Debug, Default)]
pub struct StrokeSurface {
    buffer: Option<RgbaBuffer>,
    stroke: Option<OpenStroke>,
    revision: u64,
}

impl StrokeSurface {
    pub fn new(width: u32, height: u32) -> Self {
        let mut surface = Self::default();
        surface.resize(width, height);
        surface
    }

    /// Reallocates the backing buffer. Existing ink is discarded, the same way
    /// resizing a raster canvas drops its contents. A zero dimension detaches
    /// the surface.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.stroke = None;
        self.buffer = if width == 0 || height == 0 {
            None
        } else {
            Some(RgbaBuffer::transparent(width, height))
        };
        self.bump();
    }

    pub fn is_attached(&self) -> bool {
        self.buffer.is_some()
    }

    pub fn size(&self) -> Option<(u32, u32)> {
        self.buffer.as_ref().map(|b| (b.width, b.height))
    }

    pub fn buffer(&self) -> Option<&RgbaBuffer> {
        self.buffer.as_ref()
    }

    /// Incremented on every pixel mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_stroking(&self) -> bool {
        self.stroke.is_some()
    }

    pub fn begin_stroke(&mut self, point: StrokePoint, tool: Tool, color: Color, width: StrokeWidth) {
        let Some(buffer) = self.buffer.as_mut() else {
            return;
        };
        let mode = match tool {
            Tool::Pencil => CompositeMode::SourceOver(color),
            Tool::Eraser => CompositeMode::DestinationOut,
        };
        let start = point.to_pixel();
        let stroke = OpenStroke {
            last: start,
            mode,
            width: width.get(),
        };
        stamp_brush(buffer, start, stroke.width, mode);
        self.stroke = Some(stroke);
        self.bump();
    }

    pub fn extend_stroke(&mut self, point: StrokePoint) {
        let (Some(buffer), Some(stroke)) = (self.buffer.as_mut(), self.stroke.as_mut()) else {
            return;
        };
        let next = point.to_pixel();
        draw_segment(buffer, stroke.last, next, stroke.width, stroke.mode);
        stroke.last = next;
        self.bump();
    }

    pub fn end_stroke(&mut self) {
        self.stroke = None;
    }

    pub fn clear(&mut self) {
        self.stroke = None;
        if let Some(buffer) = self.buffer.as_mut() {
            buffer.clear();
            self.bump();
        }
    }

    pub fn capture_as_image(&self) -> Result<String, SurfaceError> {
        let buffer = self.buffer.as_ref().ok_or(SurfaceError::Detached)?;
        crate::draw::capture::encode_png_data_uri(buffer)
    }

    pub fn scan_opaque_bounds(&self) -> Option<InkBounds> {
        self.buffer
            .as_ref()
            .and_then(crate::draw::capture::scan_opaque_bounds)
    }

    fn bump(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}

/// Walks the segment with Bresenham and stamps a round dab at every step.
fn draw_segment(
    buffer: &mut RgbaBuffer,
    start: (i32, i32),
    end: (i32, i32),
    stroke_width: u32,
    mode: CompositeMode,
) {
    let (mut x0, mut y0) = start;
    let (x1, y1) = end;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        stamp_brush(buffer, (x0, y0), stroke_width, mode);
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

fn stamp_brush(buffer: &mut RgbaBuffer, center: (i32, i32), stroke_width: u32, mode: CompositeMode) {
    let radius = (stroke_width.saturating_sub(1) / 2) as i32;
    for y in (center.1 - radius)..=(center.1 + radius) {
        for x in (center.0 - radius)..=(center.0 + radius) {
            let dx = x - center.0;
            let dy = y - center.1;
            if dx * dx + dy * dy <= radius * radius {
                buffer.composite_pixel(x, y, mode);
            }
        }
    }
}
