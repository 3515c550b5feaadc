//! Contract of the rendering engine the form drives.

use std::cell::RefCell;
use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;
use std::str::FromStr;

use thiserror::Error;

use crate::domain::NestedState;

/// Base name used for downloads when none is configured.
pub const DEFAULT_DOWNLOAD_NAME: &str = "qr-code-styling";

/// Output formats offered by the download select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Png,
    Jpeg,
    Webp,
    Svg,
    Json,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 5] = [
        ExportFormat::Png,
        ExportFormat::Jpeg,
        ExportFormat::Webp,
        ExportFormat::Svg,
        ExportFormat::Json,
    ];

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpeg",
            ExportFormat::Webp => "webp",
            ExportFormat::Svg => "svg",
            ExportFormat::Json => "json",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        let wanted = if wanted == "jpg" { "jpeg".to_string() } else { wanted };
        ExportFormat::ALL
            .into_iter()
            .find(|format| format.extension() == wanted)
            .ok_or_else(|| format!("Unknown export format: {}", s))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOptions {
    pub extension: ExportFormat,
    /// File name without extension.
    pub name: String,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            extension: ExportFormat::default(),
            name: DEFAULT_DOWNLOAD_NAME.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Export as {0} is not supported by this renderer")]
    UnsupportedFormat(ExportFormat),
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Surface a renderer mounts its output into.
///
/// Cloning yields another handle to the same surface.
#[derive(Debug, Clone, Default)]
pub struct PreviewTarget {
    content: Rc<RefCell<String>>,
}

impl PreviewTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&self, content: String) {
        *self.content.borrow_mut() = content;
    }

    pub fn content(&self) -> String {
        self.content.borrow().clone()
    }
}

/// A rendering engine configured through partial option updates.
pub trait QrRenderer {
    /// Merges a partial options tree into the current options.
    fn update(&mut self, options: &NestedState);

    /// Mounts the rendered output into `target` and keeps it current.
    fn append(&mut self, target: PreviewTarget);

    /// Exports the current output, returning the written file.
    fn download(&self, options: &DownloadOptions) -> Result<PathBuf, ExportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_format_parsing() {
        assert_eq!("PNG".parse::<ExportFormat>(), Ok(ExportFormat::Png));
        assert_eq!("jpg".parse::<ExportFormat>(), Ok(ExportFormat::Jpeg));
        assert_eq!("json".parse::<ExportFormat>(), Ok(ExportFormat::Json));
        assert!("gif".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_download_defaults() {
        let options = DownloadOptions::default();
        assert_eq!(options.extension, ExportFormat::Png);
        assert_eq!(options.name, "qr-code-styling");
    }

    #[test]
    fn test_preview_target_is_shared() {
        let target = PreviewTarget::new();
        let mounted = target.clone();
        mounted.show("{}".to_string());
        assert_eq!(target.content(), "{}");
    }
}
