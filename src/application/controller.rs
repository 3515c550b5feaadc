//! Reacts to form changes by updating the renderer and the form itself.
//!
//! [`plan`] decides what a change means; [`Controller`] carries it out.
//! Planning is pure so the branching can be tested without a form.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde_json::json;

use super::binder::{ApplyReport, StateBinder, WeakStateBinder};
use super::renderer::{DownloadOptions, ExportError, QrRenderer};
use crate::domain::{
    BinderResult, ColorType, ErrorCorrectionLevel, GradientHelper, HelperEvent, NestedState,
    OptionGroup, QrMode, StateChange, Value, classify_helper_field, color_stops,
    is_valid_for_mode, min_type_number, nested, parse_type_number,
};
use crate::infrastructure::data_url_from_file;

/// Path of the image file input.
pub const IMAGE_PATH: &str = "image";
pub const DATA_PATH: &str = "data";
pub const MODE_PATH: &str = "qrOptions.mode";
pub const ERROR_CORRECTION_PATH: &str = "qrOptions.errorCorrectionLevel";
pub const TYPE_NUMBER_PATH: &str = "qrOptions.typeNumber";

/// Form affordances the controller adjusts directly.
pub trait FormSurface {
    /// Enables or disables one entry of the mode select.
    fn set_mode_enabled(&self, mode: QrMode, enabled: bool);

    /// Sets the lower bound of the type number input.
    fn set_type_number_min(&self, min: u32);

    /// Shows the inputs for `color_type` in `group` and hides the others.
    fn show_color_type(&self, group: OptionGroup, color_type: ColorType);
}

/// One step of reacting to a change.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    ShowColorType { group: OptionGroup, color_type: ColorType },
    /// Merge these options into the renderer.
    Update(NestedState),
    LoadImage(PathBuf),
    ClearImage,
    RefreshModeOptions,
    RefreshTypeNumberMin,
    /// Push the whole form state, minus form-only parts, to the renderer.
    SyncAll,
}

/// Decides how to react to `change`, given the form state after it.
pub fn plan(change: &StateChange, state: &NestedState) -> Vec<Effect> {
    if change.field == IMAGE_PATH {
        return match first_file(&change.data) {
            Some(path) => vec![Effect::LoadImage(PathBuf::from(path))],
            None => vec![Effect::ClearImage],
        };
    }

    if let Some(effects) = plan_helper_change(change, state) {
        return effects;
    }

    let mut effects = Vec::new();
    if change.field == DATA_PATH {
        effects.push(Effect::RefreshModeOptions);
    }
    if [DATA_PATH, MODE_PATH, ERROR_CORRECTION_PATH].contains(&change.field.as_str()) {
        effects.push(Effect::RefreshTypeNumberMin);
    }
    effects.push(Effect::SyncAll);
    effects
}

fn plan_helper_change(change: &StateChange, state: &NestedState) -> Option<Vec<Effect>> {
    let (group, event) = classify_helper_field(&change.field)?;
    let key = group.option_key();
    let helper = GradientHelper::from_state(state.get(group.helper_key()));

    let effects = match event {
        HelperEvent::ColorType(color_type) if is_truthy(&change.data) => {
            let options = match color_type {
                ColorType::Gradient => json!({ key: { "gradient": helper.gradient_config() } }),
                ColorType::Single => {
                    let color = state
                        .get(key)
                        .and_then(|options| options.get("color"))
                        .cloned()
                        .unwrap_or(Value::Null);
                    json!({ key: { "color": color, "gradient": null } })
                }
                ColorType::Transparent => json!({ key: { "color": null, "gradient": null } }),
            };
            vec![
                Effect::ShowColorType { group, color_type },
                Effect::Update(nested(options)),
            ]
        }
        HelperEvent::GradientKind(kind) if is_truthy(&change.data) => {
            vec![Effect::Update(nested(json!({ key: { "gradient": { "type": kind.as_str() } } })))]
        }
        HelperEvent::Color1 => {
            let stops = color_stops(change.data.as_str().unwrap_or_default(), &helper.color2);
            vec![Effect::Update(nested(json!({ key: { "gradient": { "colorStops": stops } } })))]
        }
        HelperEvent::Color2 => {
            let stops = color_stops(&helper.color1, change.data.as_str().unwrap_or_default());
            vec![Effect::Update(nested(json!({ key: { "gradient": { "colorStops": stops } } })))]
        }
        HelperEvent::Rotation => {
            let rotation = helper.rotation_radians();
            vec![Effect::Update(nested(json!({ key: { "gradient": { "rotation": rotation } } })))]
        }
        _ => return None,
    };
    Some(effects)
}

/// Renderer options for the whole form state.
///
/// Drops the image input and helper subtrees, turns the type number into
/// an integer and clears the background color when it is transparent.
pub fn sync_options(state: &NestedState) -> NestedState {
    let background_transparent = state
        .get(OptionGroup::Background.helper_key())
        .and_then(|helper| helper.pointer("/colorType/transparent"))
        .is_some_and(is_truthy);

    let mut options: NestedState = state
        .iter()
        .filter(|(key, _)| {
            key.as_str() != IMAGE_PATH && OptionGroup::from_helper_key(key).is_none()
        })
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    if let Some(Value::Object(qr_options)) = options.get_mut("qrOptions") {
        if let Some(type_number) = qr_options.get_mut("typeNumber") {
            *type_number = json!(parse_type_number(type_number));
        }
    }

    if background_transparent {
        options.insert(OptionGroup::Background.option_key().to_string(), json!({ "color": null }));
    }

    options
}

/// Loose truthiness of a form value: `false`, `null`, `0`, `""` are false.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn first_file(data: &Value) -> Option<&str> {
    data.as_array()?
        .first()?
        .as_str()
        .filter(|path| !path.is_empty())
}

fn state_str<'a>(state: &'a NestedState, path: &str) -> Option<&'a str> {
    let mut segments = path.split('.');
    let mut value = state.get(segments.next()?)?;
    for segment in segments {
        value = value.get(segment)?;
    }
    value.as_str()
}

struct Dispatcher<R> {
    binder: WeakStateBinder,
    renderer: Rc<RefCell<R>>,
    surface: Rc<dyn FormSurface>,
}

impl<R> Clone for Dispatcher<R> {
    fn clone(&self) -> Self {
        Self {
            binder: self.binder.clone(),
            renderer: Rc::clone(&self.renderer),
            surface: Rc::clone(&self.surface),
        }
    }
}

impl<R: QrRenderer> Dispatcher<R> {
    fn handle(&self, change: &StateChange) {
        let Some(binder) = self.binder.upgrade() else {
            return;
        };
        tracing::debug!(field = %change.field, "form changed");
        let state = binder.get_state();
        for effect in plan(change, &state) {
            self.run(&binder, effect);
        }
    }

    fn run(&self, binder: &StateBinder, effect: Effect) {
        match effect {
            Effect::ShowColorType { group, color_type } => {
                self.surface.show_color_type(group, color_type)
            }
            Effect::Update(options) => self.renderer.borrow_mut().update(&options),
            Effect::LoadImage(path) => self.load_image(&path),
            Effect::ClearImage => self.update(json!({ "image": null })),
            Effect::RefreshModeOptions => self.refresh_mode_options(binder),
            Effect::RefreshTypeNumberMin => self.refresh_type_number_min(binder),
            Effect::SyncAll => {
                let options = sync_options(&binder.get_state());
                self.renderer.borrow_mut().update(&options);
            }
        }
    }

    fn update(&self, options: Value) {
        self.renderer.borrow_mut().update(&nested(options));
    }

    fn load_image(&self, path: &Path) {
        match data_url_from_file(path) {
            Ok(url) => self.update(json!({ "image": url })),
            Err(err) => tracing::error!(%err, "could not load image"),
        }
    }

    fn refresh_mode_options(&self, binder: &StateBinder) {
        let state = binder.get_state();
        let data = state_str(&state, DATA_PATH).unwrap_or_default();
        let current = state_str(&state, MODE_PATH).and_then(|mode| mode.parse::<QrMode>().ok());

        let mut needs_mode_change = false;
        for mode in QrMode::ALL {
            let valid = is_valid_for_mode(data, mode);
            self.surface.set_mode_enabled(mode, valid);
            if Some(mode) == current && !valid {
                needs_mode_change = true;
            }
        }

        if needs_mode_change {
            tracing::debug!(from = ?current, "data no longer fits mode, switching to Byte");
            let update = nested(json!({ "qrOptions": { "mode": QrMode::Byte.as_str() } }));
            log_apply(binder.set_state(&update));
        }
    }

    fn refresh_type_number_min(&self, binder: &StateBinder) {
        let state = binder.get_state();
        let data = state_str(&state, DATA_PATH).unwrap_or_default();
        let level = state_str(&state, ERROR_CORRECTION_PATH)
            .and_then(|level| level.parse::<ErrorCorrectionLevel>().ok())
            .unwrap_or_default();

        let min = min_type_number(data, level);
        self.surface.set_type_number_min(min);

        let current = binder
            .value_of(TYPE_NUMBER_PATH)
            .map(|value| parse_type_number(&value))
            .unwrap_or(0);
        if current != 0 && current < min {
            tracing::debug!(current, min, "raising type number to fit data");
            log_apply(binder.set_state(&nested(json!({ "qrOptions": { "typeNumber": min } }))));
        }
    }
}

fn log_apply(result: BinderResult<ApplyReport>) {
    if let Err(err) = result {
        tracing::error!(%err, "could not apply form update");
    }
}

/// Wires a binder to a renderer and keeps the form consistent.
pub struct Controller<R> {
    binder: StateBinder,
    dispatcher: Dispatcher<R>,
}

impl<R: QrRenderer + 'static> Controller<R> {
    /// Registers the controller as the binder's listener.
    pub fn attach(
        binder: StateBinder,
        renderer: Rc<RefCell<R>>,
        surface: Rc<dyn FormSurface>,
    ) -> Self {
        let dispatcher = Dispatcher {
            binder: binder.downgrade(),
            renderer,
            surface,
        };
        let listener = dispatcher.clone();
        binder.on_state_update(move |change| listener.handle(change));
        Self { binder, dispatcher }
    }

    /// Brings the form in line with its initial state.
    pub fn initialize(&self) {
        let state = self.binder.get_state();
        for group in OptionGroup::ALL {
            let checked = group.color_types().iter().copied().find(|color_type| {
                let pointer = format!("/colorType/{}", color_type.as_str());
                state
                    .get(group.helper_key())
                    .and_then(|helper| helper.pointer(&pointer))
                    .is_some_and(is_truthy)
            });
            self.dispatcher
                .surface
                .show_color_type(group, checked.unwrap_or(ColorType::Single));
        }
        self.refresh_mode_options();
        self.refresh_type_number_min();
    }

    pub fn binder(&self) -> &StateBinder {
        &self.binder
    }

    pub fn renderer(&self) -> Rc<RefCell<R>> {
        Rc::clone(&self.dispatcher.renderer)
    }

    /// Disables modes the data cannot use, falling back to Byte if needed.
    pub fn refresh_mode_options(&self) {
        self.dispatcher.refresh_mode_options(&self.binder);
    }

    /// Raises the type number floor to what the data needs.
    pub fn refresh_type_number_min(&self) {
        self.dispatcher.refresh_type_number_min(&self.binder);
    }

    /// Restores the default color of `group`.
    pub fn reset_color(&self, group: OptionGroup) -> BinderResult<ApplyReport> {
        self.binder
            .set_state(&nested(json!({ group.option_key(): { "color": group.default_color() } })))
    }

    /// Gives `group` the dots color.
    pub fn copy_dots_color(&self, group: OptionGroup) -> BinderResult<ApplyReport> {
        let dots_color = self
            .binder
            .value_of(&OptionGroup::Dots.color_path())
            .unwrap_or_else(|| json!(OptionGroup::Dots.default_color()));
        self.binder
            .set_state(&nested(json!({ group.option_key(): { "color": dots_color } })))
    }

    /// Empties the image input.
    pub fn reset_image(&self) -> BinderResult<ApplyReport> {
        self.binder.set_state(&nested(json!({ IMAGE_PATH: [] })))
    }

    /// Applies a saved options document to the form.
    pub fn apply(&self, options: &NestedState) -> BinderResult<ApplyReport> {
        self.binder.set_state(options)
    }

    pub fn download(&self, options: &DownloadOptions) -> Result<PathBuf, ExportError> {
        self.dispatcher.renderer.borrow().download(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::PreviewTarget;
    use crate::application::form::{Form, FormControl};
    use std::cell::Cell;
    use tempfile::tempdir;

    #[derive(Default)]
    struct RecordingRenderer {
        updates: Vec<NestedState>,
        target: Option<PreviewTarget>,
    }

    impl QrRenderer for RecordingRenderer {
        fn update(&mut self, options: &NestedState) {
            self.updates.push(options.clone());
        }

        fn append(&mut self, target: PreviewTarget) {
            self.target = Some(target);
        }

        fn download(&self, _options: &DownloadOptions) -> Result<PathBuf, ExportError> {
            Ok(PathBuf::from("recorded"))
        }
    }

    #[derive(Default)]
    struct RecordingSurface {
        disabled_modes: RefCell<Vec<QrMode>>,
        min: Cell<u32>,
        shown: RefCell<Vec<(OptionGroup, ColorType)>>,
    }

    impl FormSurface for RecordingSurface {
        fn set_mode_enabled(&self, mode: QrMode, enabled: bool) {
            let mut disabled = self.disabled_modes.borrow_mut();
            disabled.retain(|m| *m != mode);
            if !enabled {
                disabled.push(mode);
            }
        }

        fn set_type_number_min(&self, min: u32) {
            self.min.set(min);
        }

        fn show_color_type(&self, group: OptionGroup, color_type: ColorType) {
            self.shown.borrow_mut().push((group, color_type));
        }
    }

    struct Fixture {
        form: Rc<Form>,
        surface: Rc<RecordingSurface>,
        renderer: Rc<RefCell<RecordingRenderer>>,
        controller: Controller<RecordingRenderer>,
    }

    impl Fixture {
        fn new() -> Self {
            let form = Rc::new(Form::qr_options());
            let binder = StateBinder::new(form.as_ref()).unwrap();
            let surface = Rc::new(RecordingSurface::default());
            let renderer = Rc::new(RefCell::new(RecordingRenderer::default()));
            let controller = Controller::attach(binder, Rc::clone(&renderer), surface.clone());
            Self { form, surface, renderer, controller }
        }

        fn control(&self, path: &str) -> Rc<FormControl> {
            self.form.control_by_path(path).unwrap()
        }

        fn user_sets(&self, path: &str, value: Value) {
            let control = self.control(path);
            control.set_current(value);
            control.fire_change();
        }

        fn updates(&self) -> Vec<NestedState> {
            self.renderer.borrow().updates.clone()
        }
    }

    fn change(field: &str, data: Value) -> StateChange {
        StateChange::new(field, data)
    }

    #[test]
    fn test_plan_image_with_file() {
        let effects = plan(&change("image", json!(["/tmp/logo.png"])), &NestedState::new());
        assert_eq!(effects, vec![Effect::LoadImage(PathBuf::from("/tmp/logo.png"))]);
    }

    #[test]
    fn test_plan_image_cleared() {
        let empty = NestedState::new();
        assert_eq!(plan(&change("image", json!([])), &empty), vec![Effect::ClearImage]);
        assert_eq!(plan(&change("image", json!(null)), &empty), vec![Effect::ClearImage]);
    }

    #[test]
    fn test_plan_gradient_color_type() {
        let state = nested(json!({
            "dotsOptionsHelper": {
                "colorType": {"single": false, "gradient": true},
                "gradient": {
                    "linear": true,
                    "radial": false,
                    "color1": "#111",
                    "color2": "#222",
                    "rotation": 0,
                },
            },
        }));

        let effects = plan(&change("dotsOptionsHelper.colorType.gradient", json!(true)), &state);

        assert_eq!(
            effects,
            vec![
                Effect::ShowColorType { group: OptionGroup::Dots, color_type: ColorType::Gradient },
                Effect::Update(nested(json!({
                    "dotsOptions": {"gradient": {
                        "type": "linear",
                        "rotation": 0.0,
                        "colorStops": [
                            {"offset": 0, "color": "#111"},
                            {"offset": 1, "color": "#222"},
                        ],
                    }},
                }))),
            ]
        );
    }

    #[test]
    fn test_plan_single_color_type_restores_color() {
        let state = nested(json!({"cornersDotOptions": {"color": "#abcdef"}}));

        let effects =
            plan(&change("cornersDotOptionsHelper.colorType.single", json!(true)), &state);

        assert_eq!(
            effects[1],
            Effect::Update(nested(json!({
                "cornersDotOptions": {"color": "#abcdef", "gradient": null},
            })))
        );
    }

    #[test]
    fn test_plan_transparent_background() {
        let effects = plan(
            &change("backgroundOptionsHelper.colorType.transparent", json!(true)),
            &NestedState::new(),
        );
        assert_eq!(
            effects,
            vec![
                Effect::ShowColorType {
                    group: OptionGroup::Background,
                    color_type: ColorType::Transparent,
                },
                Effect::Update(nested(json!({
                    "backgroundOptions": {"color": null, "gradient": null},
                }))),
            ]
        );
    }

    #[test]
    fn test_plan_unchecked_radio_falls_through_to_sync() {
        let effects = plan(
            &change("dotsOptionsHelper.gradient.radial", json!(false)),
            &NestedState::new(),
        );
        assert_eq!(effects, vec![Effect::SyncAll]);
    }

    #[test]
    fn test_plan_gradient_stops_and_rotation() {
        let state = nested(json!({
            "dotsOptionsHelper": {"gradient": {"color1": "#111", "color2": "#222", "rotation": 90}},
        }));

        let effects = plan(&change("dotsOptionsHelper.gradient.color1", json!("#999")), &state);
        assert_eq!(
            effects,
            vec![Effect::Update(nested(json!({
                "dotsOptions": {"gradient": {"colorStops": [
                    {"offset": 0, "color": "#999"},
                    {"offset": 1, "color": "#222"},
                ]}},
            })))]
        );

        let effects = plan(&change("dotsOptionsHelper.gradient.rotation", json!(90)), &state);
        let Effect::Update(options) = &effects[0] else {
            panic!("expected an update, got {effects:?}");
        };
        let rotation = options["dotsOptions"]["gradient"]["rotation"].as_f64().unwrap();
        assert!((rotation - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_plan_data_change_refreshes_mode_and_type_number() {
        assert_eq!(
            plan(&change("data", json!("abc")), &NestedState::new()),
            vec![Effect::RefreshModeOptions, Effect::RefreshTypeNumberMin, Effect::SyncAll]
        );
        assert_eq!(
            plan(&change("qrOptions.errorCorrectionLevel", json!("H")), &NestedState::new()),
            vec![Effect::RefreshTypeNumberMin, Effect::SyncAll]
        );
        assert_eq!(plan(&change("width", json!(200)), &NestedState::new()), vec![Effect::SyncAll]);
    }

    #[test]
    fn test_sync_options_strips_form_only_state() {
        let state = nested(json!({
            "data": "x",
            "image": ["a.png"],
            "qrOptions": {"typeNumber": "7", "mode": "Byte"},
            "dotsOptionsHelper": {"colorType": {"single": true}},
            "backgroundOptions": {"color": "#fff"},
            "backgroundOptionsHelper": {"colorType": {"transparent": true}},
        }));

        assert_eq!(
            Value::Object(sync_options(&state)),
            json!({
                "data": "x",
                "qrOptions": {"typeNumber": 7, "mode": "Byte"},
                "backgroundOptions": {"color": null},
            })
        );
    }

    #[test]
    fn test_is_truthy() {
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!(null)));
        assert!(is_truthy(&json!([])));
        assert!(is_truthy(&json!("x")));
    }

    #[test]
    fn test_user_change_syncs_renderer() {
        let fixture = Fixture::new();

        fixture.user_sets("width", json!(420));

        let updates = fixture.updates();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0]["width"], json!(420));
        assert!(updates[0].get("image").is_none());
        assert!(updates[0].get("dotsOptionsHelper").is_none());
    }

    #[test]
    fn test_numeric_mode_falls_back_to_byte_when_data_changes() {
        let fixture = Fixture::new();
        fixture.user_sets("data", json!("123"));
        let numeric = nested(json!({"qrOptions": {"mode": "Numeric"}}));
        fixture.controller.binder().set_state(&numeric).unwrap();
        assert!(fixture.surface.disabled_modes.borrow().is_empty());

        fixture.user_sets("data", json!("12a"));

        assert_eq!(fixture.control(MODE_PATH).current(), json!("Byte"));
        assert!(fixture.surface.disabled_modes.borrow().contains(&QrMode::Numeric));
        assert!(fixture.surface.disabled_modes.borrow().contains(&QrMode::Alphanumeric));
        let last = fixture.updates().pop().unwrap();
        assert_eq!(last["qrOptions"]["mode"], json!("Byte"));
    }

    #[test]
    fn test_type_number_raised_to_fit_data() {
        let fixture = Fixture::new();
        let version_one = nested(json!({"qrOptions": {"typeNumber": 1}}));
        fixture.controller.binder().set_state(&version_one).unwrap();

        fixture.user_sets("data", json!("x".repeat(40)));

        assert_eq!(fixture.surface.min.get(), 4);
        assert_eq!(fixture.control(TYPE_NUMBER_PATH).current(), json!(4));
        assert_eq!(fixture.updates().pop().unwrap()["qrOptions"]["typeNumber"], json!(4));
    }

    #[test]
    fn test_auto_type_number_left_alone() {
        let fixture = Fixture::new();

        fixture.user_sets("data", json!("x".repeat(40)));

        assert_eq!(fixture.control(TYPE_NUMBER_PATH).current(), json!(0));
    }

    #[test]
    fn test_reset_color_notifies_and_syncs() {
        let fixture = Fixture::new();
        fixture.user_sets("backgroundOptions.color", json!("#000000"));

        let report = fixture.controller.reset_color(OptionGroup::Background).unwrap();

        assert_eq!(report.written, vec!["backgroundOptions.color".to_string()]);
        assert_eq!(fixture.control("backgroundOptions.color").current(), json!("#ffffff"));
        let last = fixture.updates().pop().unwrap();
        assert_eq!(last["backgroundOptions"]["color"], json!("#ffffff"));
    }

    #[test]
    fn test_copy_dots_color() {
        let fixture = Fixture::new();
        fixture.user_sets("dotsOptions.color", json!("#123456"));

        fixture.controller.copy_dots_color(OptionGroup::CornersSquare).unwrap();

        assert_eq!(fixture.control("cornersSquareOptions.color").current(), json!("#123456"));
    }

    #[test]
    fn test_image_upload_and_reset() {
        let dir = tempdir().unwrap();
        let logo = dir.path().join("logo.png");
        std::fs::write(&logo, b"png").unwrap();
        let fixture = Fixture::new();

        fixture.user_sets("image", json!([logo.to_string_lossy()]));
        let updates = fixture.updates();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0]["image"], json!("data:image/png;base64,cG5n"));

        fixture.controller.reset_image().unwrap();
        assert_eq!(fixture.updates().pop().unwrap(), nested(json!({"image": null})));
        assert_eq!(fixture.control(IMAGE_PATH).current(), json!([]));
    }

    #[test]
    fn test_unreadable_image_leaves_renderer_untouched() {
        let fixture = Fixture::new();
        fixture.user_sets("image", json!(["/definitely/not/here.png"]));
        assert!(fixture.updates().is_empty());
    }

    #[test]
    fn test_initialize_shows_checked_color_types() {
        let fixture = Fixture::new();
        fixture.controller.initialize();

        let shown = fixture.surface.shown.borrow();
        assert_eq!(shown.len(), OptionGroup::ALL.len());
        assert!(shown.contains(&(OptionGroup::Dots, ColorType::Single)));
        assert!(shown.contains(&(OptionGroup::Background, ColorType::Single)));
        assert_eq!(fixture.surface.min.get(), 3);
    }

    #[test]
    fn test_apply_saved_options_skips_unknown_paths() {
        let fixture = Fixture::new();

        let report = fixture
            .controller
            .apply(&nested(json!({"width": 512, "legacy": {"flag": true}})))
            .unwrap();

        assert_eq!(report.written, vec!["width".to_string()]);
        assert_eq!(report.skipped, vec!["legacy.flag".to_string()]);
        assert_eq!(fixture.control("width").current(), json!(512));
    }

    #[test]
    fn test_download_delegates_to_renderer() {
        let fixture = Fixture::new();
        let path = fixture.controller.download(&DownloadOptions::default()).unwrap();
        assert_eq!(path, PathBuf::from("recorded"));
    }
}
