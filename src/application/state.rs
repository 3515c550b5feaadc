//! Application state management for the QR styling form.
//!
//! This module contains the main application state and mode management
//! for the terminal user interface.

use std::cell::RefCell;
use std::rc::Rc;

use super::binder::StateBinder;
use super::controller::{Controller, sync_options};
use super::form::{ControlKind, Form, FormControl, FormRow};
use super::renderer::{DownloadOptions, ExportFormat, PreviewTarget, QrRenderer};
use crate::domain::{BinderResult, NestedState, OptionGroup, is_default_color};
use crate::infrastructure::{AppConfig, OptionsPreview};

/// Represents the current mode of the application.
///
/// The application can be in different modes that determine how user input
/// is interpreted and what UI elements are displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    /// Navigation mode - arrow keys move between rows, shortcuts available
    Normal,
    /// A text, number, color or file control is being typed into
    Editing,
    /// Help screen is displayed
    Help,
    /// Save options dialog is open
    SaveOptions,
    /// Load options dialog is open
    LoadOptions,
}

/// Color scheme of the terminal UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

const DEFAULT_OPTIONS_FILE: &str = "qr-options.json";

/// Main application state containing the form and UI state.
///
/// # Examples
///
/// ```
/// use qrform::application::{App, AppMode};
/// use qrform::infrastructure::AppConfig;
///
/// let app = App::new(&AppConfig::default()).unwrap();
/// assert_eq!(app.selected, 0);
/// assert_eq!(app.mode, AppMode::Normal);
/// ```
pub struct App {
    /// The form document the binder is attached to
    pub form: Rc<Form>,
    pub controller: Controller<OptionsPreview>,
    /// Where the renderer mounts its output
    pub preview: PreviewTarget,
    /// Index of the selected row in [`App::rows`]
    pub selected: usize,
    pub mode: AppMode,
    /// Current input buffer (for editing mode)
    pub input: String,
    /// Cursor position within the input buffer
    pub cursor_position: usize,
    pub help_scroll: usize,
    pub preview_scroll: usize,
    /// Temporary status message to display
    pub status_message: Option<String>,
    /// Input buffer for filename entry
    pub filename_input: String,
    /// Options file last saved or loaded
    pub options_file: Option<String>,
    pub export_format: ExportFormat,
    pub export_name: String,
    pub theme: Theme,
}

impl App {
    /// Builds the form, binds it and mounts the preview renderer.
    pub fn new(config: &AppConfig) -> BinderResult<Self> {
        let form = Rc::new(Form::qr_options());
        let binder = StateBinder::new(form.as_ref())?;

        let initial = sync_options(&binder.get_state());
        let renderer = Rc::new(RefCell::new(OptionsPreview::new(initial, &config.export_dir)));
        let preview = PreviewTarget::new();
        renderer.borrow_mut().append(preview.clone());

        let controller = Controller::attach(binder, renderer, form.clone());
        controller.initialize();

        Ok(Self {
            form,
            controller,
            preview,
            selected: 0,
            mode: AppMode::Normal,
            input: String::new(),
            cursor_position: 0,
            help_scroll: 0,
            preview_scroll: 0,
            status_message: None,
            filename_input: String::new(),
            options_file: None,
            export_format: config.export_format,
            export_name: config.export_name.clone(),
            theme: if config.dark_theme { Theme::Dark } else { Theme::Light },
        })
    }

    /// Navigable rows of the form.
    pub fn rows(&self) -> Vec<FormRow> {
        self.form.rows()
    }

    pub fn selected_row(&self) -> Option<FormRow> {
        self.rows().into_iter().nth(self.selected)
    }

    pub fn selected_control(&self) -> Option<Rc<FormControl>> {
        match self.selected_row()? {
            FormRow::Control(control) => Some(control),
            FormRow::Section(_) => None,
        }
    }

    pub fn select_next(&mut self) {
        let len = self.rows().len();
        if self.selected + 1 < len {
            self.selected += 1;
        }
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Keeps the selection inside the rows after visibility changes.
    fn clamp_selection(&mut self) {
        let len = self.rows().len();
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }

    /// Opens the section holding `path` and selects its control.
    pub fn focus_path(&mut self, path: &str) -> bool {
        let Some(control) = self.form.control_by_path(path) else {
            return false;
        };
        let section = self
            .form
            .sections()
            .iter()
            .position(|section| section.controls.iter().any(|c| Rc::ptr_eq(c, &control)));
        if let Some(index) = section {
            if !self.form.sections()[index].is_open() {
                self.form.toggle_section(index);
            }
        }

        match self.rows().iter().position(|row| {
            matches!(row, FormRow::Control(candidate) if Rc::ptr_eq(candidate, &control))
        }) {
            Some(position) => {
                self.selected = position;
                true
            }
            None => false,
        }
    }

    /// Option group styled by the section holding the selection.
    pub fn focused_group(&self) -> Option<OptionGroup> {
        match self.selected_row()? {
            FormRow::Section(index) => self.form.sections().get(index)?.group,
            FormRow::Control(control) => self.form.section_of(&control)?.group,
        }
    }

    /// Acts on the selected row the way pressing it would.
    ///
    /// Section headers open or close, checkboxes toggle, radios check,
    /// selects advance and typed controls enter editing mode.
    pub fn activate(&mut self) {
        let Some(row) = self.selected_row() else {
            return;
        };

        match row {
            FormRow::Section(index) => {
                self.form.toggle_section(index);
                if let Some(position) = self
                    .rows()
                    .iter()
                    .position(|row| matches!(row, FormRow::Section(i) if *i == index))
                {
                    self.selected = position;
                }
            }
            FormRow::Control(control) => {
                if !control.is_enabled() {
                    self.status_message = Some(format!("{} is disabled", control.label()));
                    return;
                }
                match control.kind() {
                    ControlKind::Checkbox => {
                        control.toggle();
                        control.fire_change();
                    }
                    ControlKind::Radio { .. } => {
                        if control.current().as_bool() != Some(true) {
                            self.form.check_radio(&control);
                            control.fire_change();
                        }
                    }
                    ControlKind::Select => {
                        if control.cycle(1) {
                            control.fire_change();
                        }
                    }
                    _ => self.start_editing(),
                }
                self.clamp_selection();
            }
        }
    }

    /// Steps a number or moves a select by `delta`.
    pub fn adjust(&mut self, delta: i32) {
        let Some(control) = self.selected_control() else {
            return;
        };
        if !control.is_enabled() {
            return;
        }
        let changed = match control.kind() {
            ControlKind::Select => control.cycle(delta),
            ControlKind::Number { .. } => control.step(delta),
            _ => false,
        };
        if changed {
            control.fire_change();
        }
    }

    /// Switches to editing mode for the selected typed control.
    ///
    /// Loads the control's value into the input buffer and positions the
    /// cursor at the end.
    pub fn start_editing(&mut self) {
        let Some(control) = self.selected_control() else {
            return;
        };
        if !control.kind().is_typed() || !control.is_enabled() {
            return;
        }
        self.mode = AppMode::Editing;
        self.input = control.display_value();
        self.cursor_position = self.input.chars().count();
        self.status_message = None;
    }

    /// Commits the input buffer to the selected control and fires its
    /// change event. Invalid input keeps the editor open.
    pub fn finish_editing(&mut self) {
        let Some(control) = self.selected_control() else {
            self.cancel_editing();
            return;
        };

        match control.commit_input(&self.input) {
            Ok(()) => {
                control.fire_change();
                self.mode = AppMode::Normal;
                self.input.clear();
                self.cursor_position = 0;
                self.status_message = None;
                self.clamp_selection();
            }
            Err(error) => {
                self.status_message = Some(error);
            }
        }
    }

    /// Cancels editing and returns to normal mode without saving changes.
    pub fn cancel_editing(&mut self) {
        self.mode = AppMode::Normal;
        self.input.clear();
        self.cursor_position = 0;
    }

    /// Restores the default color of the focused option group.
    pub fn reset_focused_color(&mut self) {
        let Some(group) = self.focused_group() else {
            self.status_message = Some("Select a color section first".to_string());
            return;
        };
        if !self.can_reset_color(group) {
            self.status_message = Some(format!("{} color is already the default", group.label()));
            return;
        }
        self.status_message = Some(match self.controller.reset_color(group) {
            Ok(_) => format!("{} color reset", group.label()),
            Err(error) => format!("Reset failed: {}", error),
        });
    }

    /// Whether the color of `group` differs from its default.
    pub fn can_reset_color(&self, group: OptionGroup) -> bool {
        self.controller
            .binder()
            .value_of(&group.color_path())
            .and_then(|color| color.as_str().map(|color| !is_default_color(group, color)))
            .unwrap_or(false)
    }

    /// Copies the dots color into the focused option group.
    pub fn copy_dots_color(&mut self) {
        let group = match self.focused_group() {
            Some(OptionGroup::Dots) | None => {
                self.status_message =
                    Some("Select a corners or background section first".to_string());
                return;
            }
            Some(group) => group,
        };
        self.status_message = Some(match self.controller.copy_dots_color(group) {
            Ok(_) => format!("Copied dots color to {}", group.label().to_lowercase()),
            Err(error) => format!("Copy failed: {}", error),
        });
    }

    pub fn reset_image(&mut self) {
        self.status_message = Some(match self.controller.reset_image() {
            Ok(_) => "Image removed".to_string(),
            Err(error) => format!("Reset failed: {}", error),
        });
    }

    /// Asks the renderer for a download in the chosen format.
    pub fn download(&mut self) {
        let options = DownloadOptions {
            extension: self.export_format,
            name: self.export_name.clone(),
        };
        self.status_message = Some(match self.controller.download(&options) {
            Ok(path) => format!("Downloaded {}", path.display()),
            Err(error) => format!("Download failed: {}", error),
        });
    }

    pub fn cycle_export_format(&mut self) {
        let formats = ExportFormat::ALL;
        let position = formats
            .iter()
            .position(|format| *format == self.export_format)
            .unwrap_or(0);
        self.export_format = formats[(position + 1) % formats.len()];
        self.status_message = Some(format!("Download format: {}", self.export_format));
    }

    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
    }

    pub fn scroll_preview(&mut self, delta: i32) {
        self.preview_scroll = self.preview_scroll.saturating_add_signed(delta as isize);
    }

    /// What the renderer currently shows.
    pub fn preview_text(&self) -> String {
        self.preview.content()
    }

    /// The form state as saved to an options file.
    pub fn current_options(&self) -> NestedState {
        self.controller.binder().get_state()
    }

    /// Switches to save mode to prompt for a filename.
    pub fn start_save_options(&mut self) {
        self.mode = AppMode::SaveOptions;
        self.filename_input = self
            .options_file
            .clone()
            .unwrap_or_else(|| DEFAULT_OPTIONS_FILE.to_string());
        self.cursor_position = self.filename_input.chars().count();
        self.status_message = None;
    }

    /// Switches to load mode to prompt for a filename.
    pub fn start_load_options(&mut self) {
        self.mode = AppMode::LoadOptions;
        self.filename_input = self
            .options_file
            .clone()
            .unwrap_or_else(|| DEFAULT_OPTIONS_FILE.to_string());
        self.cursor_position = self.filename_input.chars().count();
        self.status_message = None;
    }

    /// Cancels filename input and returns to normal mode.
    pub fn cancel_filename_input(&mut self) {
        self.mode = AppMode::Normal;
        self.filename_input.clear();
        self.cursor_position = 0;
    }

    /// Gets the filename to save to or load from.
    pub fn get_options_filename(&self) -> String {
        if self.filename_input.trim().is_empty() {
            DEFAULT_OPTIONS_FILE.to_string()
        } else {
            self.filename_input.trim().to_string()
        }
    }

    /// Processes the result of a save operation.
    pub fn set_save_result(&mut self, result: Result<String, String>) {
        match result {
            Ok(filename) => {
                self.status_message = Some(format!("Saved options to {}", filename));
                self.options_file = Some(filename);
            }
            Err(error) => {
                self.status_message = Some(format!("Save failed: {}", error));
            }
        }

        self.mode = AppMode::Normal;
        self.filename_input.clear();
        self.cursor_position = 0;
    }

    /// Processes the result of a load operation, applying loaded options
    /// to the form.
    pub fn set_load_result(&mut self, result: Result<(NestedState, String), String>) {
        self.status_message = Some(match result {
            Ok((options, filename)) => match self.controller.apply(&options) {
                Ok(report) if report.skipped.is_empty() => {
                    let message = format!("Loaded options from {}", filename);
                    self.options_file = Some(filename);
                    message
                }
                Ok(report) => {
                    let message = format!(
                        "Loaded options from {} ({} unknown skipped)",
                        filename,
                        report.skipped.len()
                    );
                    self.options_file = Some(filename);
                    message
                }
                Err(error) => format!("Load failed: {}", error),
            },
            Err(error) => format!("Load failed: {}", error),
        });

        self.mode = AppMode::Normal;
        self.filename_input.clear();
        self.cursor_position = 0;
        self.clamp_selection();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    use crate::domain::nested;

    fn app() -> App {
        App::new(&AppConfig::default()).unwrap()
    }

    #[test]
    fn test_new_app_mounts_preview() {
        let app = app();
        assert!(matches!(app.rows()[0], FormRow::Section(0)));
        assert!(app.preview_text().contains("https://qr-code-styling.com"));
        assert!(!app.preview_text().contains("dotsOptionsHelper"));
        assert_eq!(app.export_format, ExportFormat::Json);
        assert_eq!(app.theme, Theme::Dark);
    }

    #[test]
    fn test_navigation_stays_in_bounds() {
        let mut app = app();
        app.select_previous();
        assert_eq!(app.selected, 0);

        let len = app.rows().len();
        for _ in 0..len + 5 {
            app.select_next();
        }
        assert_eq!(app.selected, len - 1);
    }

    #[test]
    fn test_editing_width_updates_preview() {
        let mut app = app();
        assert!(app.focus_path("width"));

        app.start_editing();
        assert_eq!(app.mode, AppMode::Editing);
        assert_eq!(app.input, "300");

        app.input = "420".to_string();
        app.finish_editing();

        assert_eq!(app.mode, AppMode::Normal);
        assert!(app.preview_text().contains("\"width\": 420"));
    }

    #[test]
    fn test_invalid_input_keeps_editor_open() {
        let mut app = app();
        app.focus_path("width");
        app.start_editing();
        app.input = "wide".to_string();

        app.finish_editing();

        assert_eq!(app.mode, AppMode::Editing);
        assert_eq!(app.status_message.as_deref(), Some("Width expects a number"));
        assert_eq!(app.form.control_by_path("width").unwrap().current(), json!(300));
    }

    #[test]
    fn test_cancel_editing_discards_input() {
        let mut app = app();
        app.focus_path("data");
        app.start_editing();
        app.input.push_str("/extra");

        app.cancel_editing();

        assert_eq!(app.mode, AppMode::Normal);
        assert_eq!(
            app.form.control_by_path("data").unwrap().current(),
            json!("https://qr-code-styling.com")
        );
    }

    #[test]
    fn test_activate_section_is_an_accordion() {
        let mut app = app();
        let dots_header = app
            .rows()
            .iter()
            .position(|row| matches!(row, FormRow::Section(1)))
            .unwrap();
        app.selected = dots_header;

        app.activate();

        assert!(app.form.sections()[1].is_open());
        assert!(!app.form.sections()[0].is_open());
        assert!(matches!(app.selected_row(), Some(FormRow::Section(1))));
    }

    #[test]
    fn test_gradient_radio_shows_gradient_controls() {
        let mut app = app();
        app.focus_path("dotsOptionsHelper.colorType.gradient");

        app.activate();

        let color1 = app.form.control_by_path("dotsOptionsHelper.gradient.color1").unwrap();
        assert!(color1.is_visible());
        assert!(!app.form.control_by_path("dotsOptions.color").unwrap().is_visible());
        assert!(app.preview_text().contains("colorStops"));
    }

    #[test]
    fn test_checkbox_toggles_and_syncs() {
        let mut app = app();
        app.focus_path("imageOptions.hideBackgroundDots");

        app.activate();

        assert!(app.preview_text().contains("\"hideBackgroundDots\": false"));
    }

    #[test]
    fn test_adjust_steps_numbers_and_selects() {
        let mut app = app();
        app.focus_path("margin");
        app.adjust(1);
        assert_eq!(app.form.control_by_path("margin").unwrap().current(), json!(1));

        app.focus_path("qrOptions.errorCorrectionLevel");
        app.adjust(-1);
        assert_eq!(
            app.form.control_by_path("qrOptions.errorCorrectionLevel").unwrap().current(),
            json!("M")
        );
        assert!(app.preview_text().contains("\"errorCorrectionLevel\": \"M\""));
    }

    #[test]
    fn test_transparent_background_disables_color() {
        let mut app = app();
        app.focus_path("backgroundOptionsHelper.colorType.transparent");
        app.activate();

        assert!(!app.form.control_by_path("backgroundOptions.color").unwrap().is_enabled());
        assert!(app.preview_text().contains("\"color\": null"));
    }

    #[test]
    fn test_reset_and_copy_colors() {
        let mut app = app();
        app.form.control_by_path("dotsOptions.color").unwrap().set_current(json!("#123456"));

        app.focus_path("cornersDotOptions.color");
        app.copy_dots_color();
        assert_eq!(
            app.form.control_by_path("cornersDotOptions.color").unwrap().current(),
            json!("#123456")
        );

        app.reset_focused_color();
        assert_eq!(
            app.form.control_by_path("cornersDotOptions.color").unwrap().current(),
            json!("#000000")
        );
        assert_eq!(app.status_message.as_deref(), Some("Corners dot color reset"));
    }

    #[test]
    fn test_reset_at_default_color_changes_nothing() {
        let mut app = app();
        let background = app.form.control_by_path("backgroundOptions.color").unwrap();
        // a reset would write the lowercase default back
        background.set_current(json!("#FFFFFF"));
        app.focus_path("backgroundOptions.color");
        let updates = app.controller.renderer().borrow().update_count();

        assert!(!app.can_reset_color(OptionGroup::Background));
        app.reset_focused_color();

        assert_eq!(
            app.status_message.as_deref(),
            Some("Background color is already the default")
        );
        assert_eq!(background.current(), json!("#FFFFFF"));
        assert_eq!(app.controller.renderer().borrow().update_count(), updates);

        background.set_current(json!("#eeeeee"));
        assert!(app.can_reset_color(OptionGroup::Background));
    }

    #[test]
    fn test_type_number_returns_to_auto() {
        let mut app = app();
        app.focus_path("qrOptions.typeNumber");
        let type_number = app.form.control_by_path("qrOptions.typeNumber").unwrap();

        app.adjust(1);
        assert_eq!(type_number.current(), json!(3));
        app.adjust(-1);
        assert_eq!(type_number.current(), json!(0));
        app.adjust(-1);
        assert_eq!(type_number.current(), json!(0));

        app.adjust(1);
        app.adjust(1);
        app.start_editing();
        app.input = "0".to_string();
        app.finish_editing();

        assert_eq!(app.mode, AppMode::Normal);
        assert_eq!(type_number.current(), json!(0));
        assert!(app.preview_text().contains("\"typeNumber\": 0"));
    }

    #[test]
    fn test_copy_dots_color_needs_other_group() {
        let mut app = app();
        app.focus_path("dotsOptions.color");
        app.copy_dots_color();
        assert_eq!(
            app.status_message.as_deref(),
            Some("Select a corners or background section first")
        );
    }

    #[test]
    fn test_download_and_format_cycle() {
        let dir = tempdir().unwrap();
        let config = AppConfig {
            export_dir: dir.path().to_path_buf(),
            ..AppConfig::default()
        };
        let mut app = App::new(&config).unwrap();

        app.download();
        assert!(dir.path().join("qr-code-styling.json").exists());

        app.cycle_export_format();
        assert_eq!(app.export_format, ExportFormat::Png);
        app.download();
        assert!(app.status_message.unwrap().starts_with("Download failed"));
    }

    #[test]
    fn test_load_result_applies_options() {
        let mut app = app();
        app.start_load_options();
        assert_eq!(app.mode, AppMode::LoadOptions);
        assert_eq!(app.filename_input, DEFAULT_OPTIONS_FILE);

        app.set_load_result(Ok((
            nested(json!({"width": 640, "unknown": {"key": 1}})),
            "saved.json".to_string(),
        )));

        assert_eq!(app.mode, AppMode::Normal);
        assert_eq!(app.options_file.as_deref(), Some("saved.json"));
        assert_eq!(
            app.status_message.as_deref(),
            Some("Loaded options from saved.json (1 unknown skipped)")
        );
        assert!(app.preview_text().contains("\"width\": 640"));
    }

    #[test]
    fn test_save_result_updates_filename() {
        let mut app = app();
        app.start_save_options();
        app.set_save_result(Ok("mine.json".to_string()));
        assert_eq!(app.options_file.as_deref(), Some("mine.json"));

        app.start_save_options();
        assert_eq!(app.filename_input, "mine.json");
        app.set_save_result(Err("disk full".to_string()));
        assert_eq!(app.status_message.as_deref(), Some("Save failed: disk full"));
    }

    #[test]
    fn test_theme_toggle() {
        let mut app = app();
        app.toggle_theme();
        assert_eq!(app.theme, Theme::Light);
    }
}
