//! A renderer that shows the merged options instead of a symbol.

use std::fs;
use std::path::PathBuf;

use crate::application::{DownloadOptions, ExportError, ExportFormat, PreviewTarget, QrRenderer};
use crate::domain::{NestedState, deep_merge};

/// Keeps the options document a real renderer would receive and mirrors it
/// as pretty JSON into its mounted target.
///
/// Only [`ExportFormat::Json`] can be downloaded; image encoding is left to
/// a real rendering engine.
#[derive(Debug)]
pub struct OptionsPreview {
    options: NestedState,
    target: Option<PreviewTarget>,
    export_dir: PathBuf,
    updates: usize,
}

impl OptionsPreview {
    pub fn new(initial: NestedState, export_dir: impl Into<PathBuf>) -> Self {
        Self {
            options: initial,
            target: None,
            export_dir: export_dir.into(),
            updates: 0,
        }
    }

    pub fn options(&self) -> &NestedState {
        &self.options
    }

    /// Number of updates applied since creation.
    pub fn update_count(&self) -> usize {
        self.updates
    }

    pub fn render(&self) -> String {
        serde_json::to_string_pretty(&self.options)
            .unwrap_or_else(|err| format!("<unrenderable options: {err}>"))
    }

    fn refresh(&self) {
        if let Some(target) = &self.target {
            target.show(self.render());
        }
    }
}

impl QrRenderer for OptionsPreview {
    fn update(&mut self, options: &NestedState) {
        deep_merge(&mut self.options, options);
        self.updates += 1;
        self.refresh();
    }

    fn append(&mut self, target: PreviewTarget) {
        self.target = Some(target);
        self.refresh();
    }

    fn download(&self, options: &DownloadOptions) -> Result<PathBuf, ExportError> {
        tracing::info!(format = %options.extension, name = %options.name, "downloading QR code");
        if options.extension != ExportFormat::Json {
            return Err(ExportError::UnsupportedFormat(options.extension));
        }

        fs::create_dir_all(&self.export_dir)?;
        let path = self
            .export_dir
            .join(format!("{}.{}", options.name, options.extension.extension()));
        fs::write(&path, serde_json::to_string_pretty(&self.options)?)?;
        Ok(path)
    }
}
