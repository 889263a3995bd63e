mod app;
mod config;
mod logging;
mod picker;
mod upload;
mod utils;

#[cfg(test)]
mod test_support;

use anyhow::{anyhow, Context};
use app::NikoUploader;
use clap::Parser;
use config::Config;
use eframe::CreationContext;
use upload::UploadClient;

fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    logging::init(&config.log_filter);

    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    let client = UploadClient::new(&config.origin, config.timeout())
        .context("failed to build HTTP client")?;
    let handle = runtime.handle().clone();

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([520.0, 560.0])
            .with_min_inner_size([400.0, 420.0]),
        ..Default::default()
    };

    eframe::run_native(
        "PDF Compress Upload",
        options,
        Box::new(move |_cc: &CreationContext| Box::new(NikoUploader::new(&config, client, handle))),
    )
    .map_err(|e| anyhow!("failed to run UI: {}", e))?;

    drop(runtime);
    Ok(())
}
