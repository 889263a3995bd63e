use crate::picker::PickerConfig;
use crate::utils::file_size::FileSizeUtils;
use clap::Parser;
use reqwest::Url;
use std::time::Duration;

/// Desktop uploader for the PDF compression service.
#[derive(Debug, Clone, Parser)]
#[command(name = "niko_uploader", version, about)]
pub struct Config {
    /// Origin of the server hosting /niko/compress-upload
    #[arg(long, env = "NIKO_ORIGIN", default_value = "http://127.0.0.1:8080")]
    pub origin: Url,

    /// Largest file the picker accepts, in MiB
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..))]
    pub max_size_mb: u64,

    /// Request timeout for the whole upload, in seconds
    #[arg(long, default_value_t = 120)]
    pub timeout_secs: u64,

    /// Log filter, e.g. "info" or "niko_uploader=debug"
    #[arg(long = "log", env = "RUST_LOG", default_value = "info")]
    pub log_filter: String,
}

impl Config {
    pub fn picker_config(&self) -> PickerConfig {
        PickerConfig::default().with_max_size(FileSizeUtils::from_megabytes(self.max_size_mb))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
