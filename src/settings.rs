use crate::draw::model::{Color, StrokeWidth, ToolState};
use crate::session::state::SessionConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const API_URL_ENV: &str = "MATH_CANVAS_API_URL";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Settings {
    /// Base URL of the evaluation service; requests go to `<api_url>/calculate`.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Delay before each recognized result appears, chained per result.
    #[serde(default = "default_placement_delay")]
    pub placement_delay_ms: u64,
    /// How long the error banner stays up.
    #[serde(default = "default_error_dismiss")]
    pub error_dismiss_ms: u64,
    /// Viewport widths at or below this use the mobile layout.
    #[serde(default = "default_mobile_breakpoint")]
    pub mobile_breakpoint: f32,
    #[serde(default = "default_color")]
    pub default_color: Color,
    #[serde(default = "default_pencil_width")]
    pub pencil_width: StrokeWidth,
    #[serde(default = "default_eraser_width")]
    pub eraser_width: StrokeWidth,
    /// When enabled the application initialises the logger at debug level.
    #[serde(default)]
    pub debug_logging: bool,
    /// Directory for daily rolling log files. Console only when absent.
    #[serde(default)]
    pub log_dir: Option<String>,
    #[serde(default)]
    pub window_size: Option<(f32, f32)>,
}

fn default_api_url() -> String {
    "http://localhost:8900".into()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_placement_delay() -> u64 {
    1000
}

fn default_error_dismiss() -> u64 {
    3000
}

fn default_mobile_breakpoint() -> f32 {
    768.0
}

fn default_color() -> Color {
    Color::RED
}

fn default_pencil_width() -> StrokeWidth {
    StrokeWidth::new(3)
}

fn default_eraser_width() -> StrokeWidth {
    StrokeWidth::new(10)
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            request_timeout_secs: default_request_timeout(),
            placement_delay_ms: default_placement_delay(),
            error_dismiss_ms: default_error_dismiss(),
            mobile_breakpoint: default_mobile_breakpoint(),
            default_color: default_color(),
            pencil_width: default_pencil_width(),
            eraser_width: default_eraser_width(),
            debug_logging: false,
            log_dir: None,
            window_size: None,
        }
    }
}

impl Settings {
    /// A missing or empty file yields the defaults.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &str) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// `MATH_CANVAS_API_URL` replaces `api_url` when set and non-empty.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            let url = url.trim();
            if !url.is_empty() {
                tracing::debug!(%url, "api url overridden from environment");
                self.api_url = url.to_string();
            }
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            placement_delay: Duration::from_millis(self.placement_delay_ms),
            error_dismiss: Duration::from_millis(self.error_dismiss_ms),
            mobile_breakpoint: self.mobile_breakpoint,
            initial_tools: ToolState::new(
                self.default_color,
                self.pencil_width.get(),
                self.eraser_width.get(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_fills_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"api_url":"http://calc.local","pencil_width":50}"#)
                .expect("settings json");
        assert_eq!(settings.api_url, "http://calc.local");
        assert_eq!(settings.pencil_width.get(), 20);
        assert_eq!(settings.placement_delay_ms, 1000);
        assert_eq!(settings.error_dismiss_ms, 3000);
        assert_eq!(settings.default_color, Color::RED);
    }

    #[test]
    fn session_config_uses_configured_timings() {
        let settings = Settings {
            placement_delay_ms: 250,
            error_dismiss_ms: 500,
            ..Settings::default()
        };
        let config = settings.session_config();
        assert_eq!(config.placement_delay, Duration::from_millis(250));
        assert_eq!(config.error_dismiss, Duration::from_millis(500));
        assert_eq!(config.initial_tools.eraser_width().get(), 10);
    }
}
