pub mod capture;
pub mod composite;
pub mod input;
pub mod model;
pub mod surface;

pub use capture::{Anchor, InkBounds};
pub use input::{PointerInput, RawPointerEvent, StrokePoint, SurfaceOrigin};
pub use model::{Color, StrokeWidth, Tool, ToolState};
pub use surface::StrokeSurface;
