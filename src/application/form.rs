//! In-memory form document the binder attaches to.
//!
//! Controls hold their value behind interior mutability so the binder, the
//! controller and the key handler can all reach them through shared
//! handles. Sections behave as an accordion: opening one closes the others.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use serde_json::json;

use super::binder::{
    BIND_MARKER, BindableNode, DEFAULT_CHANGE_EVENT, DEFAULT_DATA_FIELD, NodeCallback,
    NodeDiscovery, normalize_event,
};
use super::controller::FormSurface;
use crate::domain::{ColorType, OptionGroup, QrMode, Value};

const CHECKED_FIELD: &str = "checked";
const FILES_FIELD: &str = "files";

#[derive(Debug, Clone, PartialEq)]
pub enum ControlKind {
    Text,
    Number { step: f64 },
    Checkbox,
    /// A radio button; buttons sharing `group` are mutually exclusive.
    Radio { group: String },
    Select,
    Color,
    File,
}

impl ControlKind {
    /// Field the control keeps its value in.
    fn data_field(&self) -> &'static str {
        match self {
            ControlKind::Checkbox | ControlKind::Radio { .. } => CHECKED_FIELD,
            ControlKind::File => FILES_FIELD,
            _ => DEFAULT_DATA_FIELD,
        }
    }

    /// Whether the control is changed by typing into it.
    pub fn is_typed(&self) -> bool {
        matches!(
            self,
            ControlKind::Text | ControlKind::Number { .. } | ControlKind::Color | ControlKind::File
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub enabled: bool,
}

/// One form control.
pub struct FormControl {
    label: String,
    kind: ControlKind,
    path: Option<String>,
    change_event: Option<String>,
    class: Option<String>,
    value: RefCell<Value>,
    options: RefCell<Vec<SelectOption>>,
    min: Cell<Option<f64>>,
    /// Zero is accepted below the minimum and means "choose automatically".
    zero_is_auto: bool,
    enabled: Cell<bool>,
    visible: Cell<bool>,
    subscribers: RefCell<Vec<(String, NodeCallback)>>,
}

impl std::fmt::Debug for FormControl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormControl")
            .field("label", &self.label)
            .field("path", &self.path)
            .field("value", &self.value.borrow())
            .finish()
    }
}

impl FormControl {
    fn new(label: &str, kind: ControlKind, value: Value) -> Self {
        Self {
            label: label.to_string(),
            kind,
            path: None,
            change_event: None,
            class: None,
            value: RefCell::new(value),
            options: RefCell::new(Vec::new()),
            min: Cell::new(None),
            zero_is_auto: false,
            enabled: Cell::new(true),
            visible: Cell::new(true),
            subscribers: RefCell::new(Vec::new()),
        }
    }

    pub fn text(label: &str) -> Self {
        Self::new(label, ControlKind::Text, json!(""))
    }

    pub fn number(label: &str, step: f64) -> Self {
        Self::new(label, ControlKind::Number { step }, json!(0))
    }

    pub fn checkbox(label: &str) -> Self {
        Self::new(label, ControlKind::Checkbox, json!(false))
    }

    pub fn radio(label: &str, group: &str) -> Self {
        Self::new(label, ControlKind::Radio { group: group.to_string() }, json!(false))
    }

    pub fn select(label: &str, options: &[(&str, &str)]) -> Self {
        let first = options.first().map(|(value, _)| *value).unwrap_or_default();
        let control = Self::new(label, ControlKind::Select, json!(first));
        *control.options.borrow_mut() = options
            .iter()
            .map(|(value, label)| SelectOption {
                value: value.to_string(),
                label: label.to_string(),
                enabled: true,
            })
            .collect();
        control
    }

    pub fn color(label: &str) -> Self {
        Self::new(label, ControlKind::Color, json!("#000000"))
    }

    pub fn file(label: &str) -> Self {
        Self::new(label, ControlKind::File, json!([]))
    }

    /// Marks the control for binding at `path`.
    pub fn bind(mut self, path: &str) -> Self {
        self.path = Some(path.to_string());
        self
    }

    /// Declares the event that signals a value change.
    pub fn on(mut self, event: &str) -> Self {
        self.change_event = Some(event.to_string());
        self
    }

    /// Visibility class, toggled as a group by [`FormSurface::show_color_type`].
    pub fn with_class(mut self, class: &str) -> Self {
        self.class = Some(class.to_string());
        self
    }

    pub fn with_value(self, value: Value) -> Self {
        *self.value.borrow_mut() = value;
        self
    }

    pub fn with_min(self, min: f64) -> Self {
        self.min.set(Some(min));
        self
    }

    /// Lets the number go to zero regardless of its minimum.
    pub fn with_auto_zero(mut self) -> Self {
        self.zero_is_auto = true;
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn kind(&self) -> &ControlKind {
        &self.kind
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn class(&self) -> Option<&str> {
        self.class.as_deref()
    }

    pub fn field(&self) -> &'static str {
        self.kind.data_field()
    }

    pub fn current(&self) -> Value {
        self.value.borrow().clone()
    }

    /// Changes the value without firing any event.
    pub fn set_current(&self, value: Value) {
        *self.value.borrow_mut() = value;
    }

    pub fn is_visible(&self) -> bool {
        self.visible.get()
    }

    pub fn set_visible(&self, visible: bool) {
        self.visible.set(visible);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.set(enabled);
    }

    pub fn min(&self) -> Option<f64> {
        self.min.get()
    }

    pub fn set_min(&self, min: f64) {
        self.min.set(Some(min));
    }

    pub fn options(&self) -> Vec<SelectOption> {
        self.options.borrow().clone()
    }

    pub fn set_option_enabled(&self, value: &str, enabled: bool) {
        for option in self.options.borrow_mut().iter_mut() {
            if option.value == value {
                option.enabled = enabled;
            }
        }
    }

    /// Runs every callback subscribed to `event`.
    ///
    /// Callbacks run after the subscriber list is released, so they may
    /// read or write this control.
    pub fn dispatch(&self, event: &str) {
        let callbacks: Vec<NodeCallback> = self
            .subscribers
            .borrow()
            .iter()
            .filter(|(name, _)| name == event)
            .map(|(_, callback)| Rc::clone(callback))
            .collect();
        for callback in callbacks {
            callback();
        }
    }

    /// Fires the control's declared change event.
    pub fn fire_change(&self) {
        let event = self.change_event.as_deref().unwrap_or(DEFAULT_CHANGE_EVENT);
        self.dispatch(normalize_event(event));
    }

    /// The value as it is shown and edited.
    pub fn display_value(&self) -> String {
        match &*self.value.borrow() {
            Value::String(text) => text.clone(),
            Value::Array(files) => files
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(", "),
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }

    /// Parses typed input into the control's value. Does not fire events.
    pub fn commit_input(&self, input: &str) -> Result<(), String> {
        let value = match &self.kind {
            ControlKind::Number { .. } => {
                let number: f64 = input
                    .trim()
                    .parse()
                    .map_err(|_| format!("{} expects a number", self.label))?;
                if let Some(min) = self.min() {
                    if number < min && !(self.zero_is_auto && number == 0.0) {
                        return Err(format!("{} must be at least {}", self.label, min));
                    }
                }
                number_value(number)
            }
            ControlKind::Color => {
                let color = input.trim();
                if !is_hex_color(color) {
                    return Err(format!("{} expects a color like #1a2b3c", self.label));
                }
                json!(color.to_ascii_lowercase())
            }
            ControlKind::File => {
                let path = input.trim();
                if path.is_empty() { json!([]) } else { json!([path]) }
            }
            _ => json!(input),
        };
        self.set_current(value);
        Ok(())
    }

    /// Flips a checkbox.
    pub fn toggle(&self) {
        let checked = self.value.borrow().as_bool().unwrap_or(false);
        self.set_current(json!(!checked));
    }

    /// Moves a select by `delta` enabled options, wrapping around.
    pub fn cycle(&self, delta: i32) -> bool {
        let options = self.options.borrow();
        let enabled: Vec<&SelectOption> = options.iter().filter(|option| option.enabled).collect();
        if enabled.is_empty() {
            return false;
        }

        let current = self.value.borrow().as_str().map(str::to_string);
        let position = enabled
            .iter()
            .position(|option| Some(option.value.as_str()) == current.as_deref())
            .unwrap_or(0) as i32;
        let len = enabled.len() as i32;
        let next = enabled[(position + delta).rem_euclid(len) as usize].value.clone();
        drop(options);

        if current.as_deref() == Some(next.as_str()) {
            return false;
        }
        self.set_current(json!(next));
        true
    }

    /// Adds `delta` steps to a number, respecting its minimum.
    pub fn step(&self, delta: i32) -> bool {
        let ControlKind::Number { step } = self.kind else {
            return false;
        };
        let current = match &*self.value.borrow() {
            Value::Number(number) => number.as_f64().unwrap_or(0.0),
            Value::String(text) => text.trim().parse().unwrap_or(0.0),
            _ => 0.0,
        };
        let mut next = current + step * f64::from(delta);
        next = (next / step).round() * step;
        if let Some(min) = self.min() {
            next = if self.zero_is_auto && delta < 0 && current <= min {
                0.0
            } else {
                next.max(min)
            };
        }
        if next == current {
            return false;
        }
        self.set_current(number_value(next));
        true
    }
}

impl BindableNode for FormControl {
    fn binding_path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    fn data_field(&self) -> Option<&str> {
        Some(self.field())
    }

    fn change_event(&self) -> Option<&str> {
        self.change_event.as_deref()
    }

    fn get_value(&self, field: &str) -> Value {
        if field == self.field() {
            self.current()
        } else {
            tracing::warn!(field, label = %self.label, "control has no such field");
            Value::Null
        }
    }

    fn set_value(&self, field: &str, value: Value) {
        if field == self.field() {
            self.set_current(value);
        } else {
            tracing::warn!(field, label = %self.label, "control has no such field");
        }
    }

    fn subscribe(&self, event: &str, callback: NodeCallback) {
        self.subscribers.borrow_mut().push((event.to_string(), callback));
    }
}

/// Whole numbers stay integers so they serialize without a fraction.
fn number_value(number: f64) -> Value {
    if number.fract() == 0.0 && number.abs() < 1e15 {
        json!(number as i64)
    } else {
        json!(number)
    }
}

fn is_hex_color(color: &str) -> bool {
    let Some(hex) = color.strip_prefix('#') else {
        return false;
    };
    matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit())
}

/// A titled, collapsible group of controls.
#[derive(Debug)]
pub struct FormSection {
    pub title: String,
    /// Option group the section styles, if any.
    pub group: Option<OptionGroup>,
    pub controls: Vec<Rc<FormControl>>,
    open: Cell<bool>,
}

impl FormSection {
    pub fn new(title: &str, group: Option<OptionGroup>, controls: Vec<FormControl>) -> Self {
        Self {
            title: title.to_string(),
            group,
            controls: controls.into_iter().map(Rc::new).collect(),
            open: Cell::new(false),
        }
    }

    pub fn is_open(&self) -> bool {
        self.open.get()
    }
}

/// A row of the navigable form.
#[derive(Debug, Clone)]
pub enum FormRow {
    Section(usize),
    Control(Rc<FormControl>),
}

#[derive(Debug)]
pub struct Form {
    sections: Vec<FormSection>,
}

impl Form {
    /// Builds a form whose first section starts open.
    pub fn new(sections: Vec<FormSection>) -> Self {
        if let Some(first) = sections.first() {
            first.open.set(true);
        }
        Self { sections }
    }

    /// The QR styling form.
    pub fn qr_options() -> Self {
        let main = FormSection::new(
            "Main options",
            None,
            vec![
                FormControl::text("Data")
                    .bind("data")
                    .on("oninput")
                    .with_value(json!("https://qr-code-styling.com")),
                FormControl::file("Image file").bind("image"),
                FormControl::number("Width", 1.0)
                    .bind("width")
                    .with_value(json!(300))
                    .with_min(0.0),
                FormControl::number("Height", 1.0)
                    .bind("height")
                    .with_value(json!(300))
                    .with_min(0.0),
                FormControl::number("Margin", 1.0).bind("margin").with_min(0.0),
            ],
        );

        let dots = color_section(
            OptionGroup::Dots,
            &[
                ("square", "Square"),
                ("dots", "Dots"),
                ("rounded", "Rounded"),
                ("extra-rounded", "Extra rounded"),
                ("classy", "Classy"),
                ("classy-rounded", "Classy rounded"),
            ],
        );
        let corners_square = color_section(
            OptionGroup::CornersSquare,
            &[
                ("", "None"),
                ("square", "Square"),
                ("dot", "Dot"),
                ("extra-rounded", "Extra rounded"),
            ],
        );
        let corners_dot = color_section(
            OptionGroup::CornersDot,
            &[("", "None"), ("square", "Square"), ("dot", "Dot")],
        );
        let background = color_section(OptionGroup::Background, &[]);

        let image = FormSection::new(
            "Image options",
            None,
            vec![
                FormControl::checkbox("Hide background dots")
                    .bind("imageOptions.hideBackgroundDots")
                    .with_value(json!(true)),
                FormControl::number("Image size", 0.1)
                    .bind("imageOptions.imageSize")
                    .with_value(json!(0.4))
                    .with_min(0.0),
                FormControl::number("Image margin", 1.0).bind("imageOptions.margin").with_min(0.0),
            ],
        );

        let modes: Vec<(&str, &str)> =
            QrMode::ALL.iter().map(|mode| (mode.as_str(), mode.as_str())).collect();
        let qr = FormSection::new(
            "QR options",
            None,
            vec![
                FormControl::number("Type number", 1.0)
                    .bind("qrOptions.typeNumber")
                    .with_min(0.0)
                    .with_auto_zero(),
                FormControl::select("Mode", &modes)
                    .bind("qrOptions.mode")
                    .with_value(json!(QrMode::Byte.as_str())),
                FormControl::select(
                    "Error correction level",
                    &[("L", "L"), ("M", "M"), ("Q", "Q"), ("H", "H")],
                )
                    .bind("qrOptions.errorCorrectionLevel")
                    .with_value(json!("Q")),
            ],
        );

        Self::new(vec![main, dots, corners_square, corners_dot, background, image, qr])
    }

    pub fn sections(&self) -> &[FormSection] {
        &self.sections
    }

    /// Every control in document order.
    pub fn controls(&self) -> impl Iterator<Item = &Rc<FormControl>> {
        self.sections.iter().flat_map(|section| section.controls.iter())
    }

    pub fn control_by_path(&self, path: &str) -> Option<Rc<FormControl>> {
        self.controls().find(|control| control.path() == Some(path)).cloned()
    }

    /// Section headers plus the visible controls of open sections.
    pub fn rows(&self) -> Vec<FormRow> {
        let mut rows = Vec::new();
        for (index, section) in self.sections.iter().enumerate() {
            rows.push(FormRow::Section(index));
            if section.is_open() {
                rows.extend(
                    section
                        .controls
                        .iter()
                        .filter(|control| control.is_visible())
                        .map(|control| FormRow::Control(Rc::clone(control))),
                );
            }
        }
        rows
    }

    /// Opens or closes a section, closing every other one.
    pub fn toggle_section(&self, index: usize) {
        for (i, section) in self.sections.iter().enumerate() {
            if i == index {
                section.open.set(!section.open.get());
            } else {
                section.open.set(false);
            }
        }
    }

    /// Section holding `control`.
    pub fn section_of(&self, control: &FormControl) -> Option<&FormSection> {
        self.sections
            .iter()
            .find(|section| section.controls.iter().any(|c| std::ptr::eq(c.as_ref(), control)))
    }

    /// Checks a radio button and unchecks the rest of its group.
    pub fn check_radio(&self, control: &FormControl) {
        let ControlKind::Radio { group } = control.kind() else {
            return;
        };
        for other in self.controls() {
            if let ControlKind::Radio { group: other_group } = other.kind() {
                if other_group == group {
                    other.set_current(json!(std::ptr::eq(other.as_ref(), control)));
                }
            }
        }
    }
}

fn color_type_class(group: OptionGroup, color_type: ColorType) -> String {
    format!("{}.colorType.{}", group.helper_key(), color_type.as_str())
}

fn color_section(group: OptionGroup, styles: &[(&str, &str)]) -> FormSection {
    let key = group.option_key();
    let helper = group.helper_key();
    let single = color_type_class(group, ColorType::Single);
    let gradient = color_type_class(group, ColorType::Gradient);

    let mut controls = Vec::new();
    if !styles.is_empty() {
        controls.push(FormControl::select("Style", styles).bind(&format!("{key}.type")));
    }
    for color_type in group.color_types() {
        let label = match color_type {
            ColorType::Single => "Single color",
            ColorType::Gradient => "Color gradient",
            ColorType::Transparent => "Transparent",
        };
        controls.push(
            FormControl::radio(label, &format!("{helper}.colorType"))
                .bind(&color_type_class(group, *color_type))
                .with_value(json!(*color_type == ColorType::Single)),
        );
    }
    controls.extend([
        FormControl::color("Color")
            .bind(&group.color_path())
            .with_class(&single)
            .with_value(json!(group.default_color())),
        FormControl::radio("Linear", &format!("{helper}.gradient"))
            .bind(&format!("{helper}.gradient.linear"))
            .with_class(&gradient)
            .with_value(json!(true)),
        FormControl::radio("Radial", &format!("{helper}.gradient"))
            .bind(&format!("{helper}.gradient.radial"))
            .with_class(&gradient),
        FormControl::color("Gradient start")
            .bind(&format!("{helper}.gradient.color1"))
            .with_class(&gradient)
            .with_value(json!(group.default_color())),
        FormControl::color("Gradient end")
            .bind(&format!("{helper}.gradient.color2"))
            .with_class(&gradient)
            .with_value(json!(group.default_color())),
        FormControl::number("Rotation", 15.0)
            .bind(&format!("{helper}.gradient.rotation"))
            .with_class(&gradient),
    ]);

    FormSection::new(&format!("{} options", group.label()), Some(group), controls)
}

impl NodeDiscovery for Form {
    fn discover(&self, marker: &str) -> Vec<Rc<dyn BindableNode>> {
        if marker != BIND_MARKER {
            return Vec::new();
        }
        self.controls()
            .filter(|control| control.path().is_some())
            .map(|control| Rc::clone(control) as Rc<dyn BindableNode>)
            .collect()
    }
}

impl FormSurface for Form {
    fn set_mode_enabled(&self, mode: QrMode, enabled: bool) {
        if let Some(select) = self.control_by_path("qrOptions.mode") {
            select.set_option_enabled(mode.as_str(), enabled);
        }
    }

    fn set_type_number_min(&self, min: u32) {
        if let Some(input) = self.control_by_path("qrOptions.typeNumber") {
            input.set_min(f64::from(min));
        }
    }

    fn show_color_type(&self, group: OptionGroup, color_type: ColorType) {
        for shown in group.color_types() {
            let class = color_type_class(group, *shown);
            let members = self.controls().filter(|control| control.class() == Some(class.as_str()));
            for control in members {
                control.set_visible(*shown == color_type);
            }
        }

        if let Some(color) = self.control_by_path(&group.color_path()) {
            match color_type {
                ColorType::Single => color.set_enabled(true),
                ColorType::Transparent => color.set_enabled(false),
                ColorType::Gradient => {}
            }
        }
    }
}
