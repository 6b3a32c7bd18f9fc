mod app;
mod backend;
mod canvas;
mod chat;
mod config;
mod conversation;
mod event;
mod logging;
mod theme;
mod view;

use app::AskAshaApp;
use backend::BackendClient;
use eframe::egui;
use std::sync::mpsc;
use view::ViewSignal;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_tracing();

    let (config, warnings) = config::load();
    for warning in &warnings {
        tracing::warn!(error = %warning, "configuration warning");
    }
    tracing::info!(
        api = %config.api_base_url,
        view = %config.initial_view,
        "starting askasha"
    );

    let (tx, rx) = mpsc::channel();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("askasha-runtime")
        .build()?;

    let backend = runtime.block_on(async { BackendClient::new(&config, tx) })?;
    let views = ViewSignal::new(config.initial_view);

    let mut app = AskAshaApp::new(rx, backend, views, &config);
    for warning in warnings {
        app.log_diagnostic(format!("config warning: {warning}"));
    }
    let _runtime = runtime;

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([900.0, 600.0]),
        ..Default::default()
    };

    eframe::run_native(
        "AskAsha",
        native_options,
        Box::new(move |_creation_context| Ok(Box::new(app))),
    )?;

    Ok(())
}
