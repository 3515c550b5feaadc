//! Runtime settings read from `QRFORM_*` environment variables.

use std::path::PathBuf;

use crate::application::{DEFAULT_DOWNLOAD_NAME, ExportFormat};

pub const ENV_EXPORT_DIR: &str = "QRFORM_EXPORT_DIR";
pub const ENV_EXPORT_NAME: &str = "QRFORM_EXPORT_NAME";
pub const ENV_EXPORT_FORMAT: &str = "QRFORM_EXPORT_FORMAT";
pub const ENV_LOG_FILE: &str = "QRFORM_LOG_FILE";
pub const ENV_THEME: &str = "QRFORM_THEME";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Directory downloads and exported options are written to.
    pub export_dir: PathBuf,
    pub export_name: String,
    pub export_format: ExportFormat,
    pub log_file: PathBuf,
    pub dark_theme: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            export_dir: PathBuf::from("."),
            export_name: DEFAULT_DOWNLOAD_NAME.to_string(),
            export_format: ExportFormat::Json,
            log_file: PathBuf::from("qrform.log"),
            dark_theme: true,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup, ignoring unparsable values.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(dir) = lookup(ENV_EXPORT_DIR) {
            config.export_dir = PathBuf::from(dir);
        }
        if let Some(name) = lookup(ENV_EXPORT_NAME).filter(|name| !name.trim().is_empty()) {
            config.export_name = name;
        }
        if let Some(format) = lookup(ENV_EXPORT_FORMAT) {
            match format.parse::<ExportFormat>() {
                Ok(format) => config.export_format = format,
                Err(err) => tracing::warn!(%err, "ignoring {}", ENV_EXPORT_FORMAT),
            }
        }
        if let Some(file) = lookup(ENV_LOG_FILE) {
            config.log_file = PathBuf::from(file);
        }
        if let Some(theme) = lookup(ENV_THEME) {
            config.dark_theme = !theme.eq_ignore_ascii_case("light");
        }

        config
    }
}
