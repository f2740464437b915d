use anyhow::Context;
use eframe::egui;
use math_canvas::eval::HttpEvaluationClient;
use math_canvas::gui::MathCanvasApp;
use math_canvas::session::SessionController;
use math_canvas::settings::Settings;
use std::path::Path;
use std::sync::Arc;

const SETTINGS_FILE: &str = "settings.json";

fn main() -> anyhow::Result<()> {
    let mut settings = Settings::load(SETTINGS_FILE).context("failed to read settings.json")?;
    let _log_guard =
        math_canvas::logging::init(settings.debug_logging, settings.log_dir.as_deref().map(Path::new));
    settings.apply_env_overrides();
    tracing::info!(api_url = %settings.api_url, "starting math canvas");

    let client = HttpEvaluationClient::new(&settings.api_url, settings.request_timeout())
        .context("invalid evaluation service configuration")?;
    let controller = SessionController::new(settings.session_config(), Arc::new(client));

    let (width, height) = settings.window_size.unwrap_or((1280.0, 800.0));
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([width, height])
            .with_min_inner_size([320.0, 240.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Math Canvas",
        native_options,
        Box::new(move |_cc| Box::new(MathCanvasApp::new(controller))),
    )
    .map_err(|e| anyhow::anyhow!("window closed with error: {e}"))?;
    Ok(())
}
