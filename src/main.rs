mod app;

use anyhow::{anyhow, Result};
use app::BulkUploader;
use bulk_uploader::upload::SchemaRegistry;
use bulk_uploader::AppConfig;
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bulk_uploader=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load();
    let registry = config.registry().unwrap_or_else(|e| {
        warn!("{}. Falling back to the built-in upload types", e);
        SchemaRegistry::builtin()
    });

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([760.0, 720.0])
            .with_min_inner_size([480.0, 520.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Bulk Upload",
        options,
        Box::new(move |cc: &eframe::CreationContext<'_>| {
            Box::new(BulkUploader::new(cc, config, registry))
        }),
    )
    .map_err(|e| anyhow!("Failed to start the upload window: {}", e))
}
