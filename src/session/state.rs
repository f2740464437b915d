use crate::draw::model::ToolState;
use crate::session::overlay::OverlayManager;
use crate::session::variables::VariableStore;
use std::time::Duration;

pub const DEFAULT_MOBILE_BREAKPOINT: f32 = 768.0;
pub const DEFAULT_PLACEMENT_DELAY: Duration = Duration::from_millis(1000);
pub const DEFAULT_ERROR_DISMISS: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutMode {
    Mobile,
    #[default]
    Desktop,
}

impl LayoutMode {
    /// Widths at or below the breakpoint are mobile.
    pub fn from_viewport_width(width: f32, breakpoint: f32) -> Self {
        if width <= breakpoint {
            LayoutMode::Mobile
        } else {
            LayoutMode::Desktop
        }
    }

    pub fn is_mobile(self) -> bool {
        matches!(self, LayoutMode::Mobile)
    }
}

/// Engine timing and defaults, usually derived from `Settings`.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub placement_delay: Duration,
    pub error_dismiss: Duration,
    pub mobile_breakpoint: f32,
    pub initial_tools: ToolState,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            placement_delay: DEFAULT_PLACEMENT_DELAY,
            error_dismiss: DEFAULT_ERROR_DISMISS,
            mobile_breakpoint: DEFAULT_MOBILE_BREAKPOINT,
            initial_tools: ToolState::default(),
        }
    }
}

#[derive(Debug, Default)]
pub struct SessionState {
    pub tools: ToolState,
    pub variables: VariableStore,
    pub overlays: OverlayManager,
    pub error_visible: bool,
    pub reset_in_progress: bool,
    pub layout: LayoutMode,
}

impl SessionState {
    pub fn new(tools: ToolState) -> Self {
        Self {
            tools,
            ..Self::default()
        }
    }
}
