pub mod controller;
pub mod overlay;
pub mod scheduler;
pub mod state;
pub mod variables;

pub use controller::SessionController;
pub use overlay::{OverlayMessage, OverlayState, PlacedResult, ResultId};
pub use state::{LayoutMode, SessionConfig};
