//! Color and gradient rules for the styled option groups.
//!
//! Every colorable part of the symbol has an option group the renderer
//! understands (`dotsOptions`, ...) and a helper subtree that only the form
//! uses (`dotsOptionsHelper`, ...) to hold the color type and gradient
//! inputs.

use std::f64::consts::PI;

use serde_json::json;

use super::models::Value;

/// A colorable part of the QR symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionGroup {
    Dots,
    CornersSquare,
    CornersDot,
    Background,
}

impl OptionGroup {
    pub const ALL: [OptionGroup; 4] = [
        OptionGroup::Dots,
        OptionGroup::CornersSquare,
        OptionGroup::CornersDot,
        OptionGroup::Background,
    ];

    /// Key of the group in the renderer options.
    pub fn option_key(&self) -> &'static str {
        match self {
            OptionGroup::Dots => "dotsOptions",
            OptionGroup::CornersSquare => "cornersSquareOptions",
            OptionGroup::CornersDot => "cornersDotOptions",
            OptionGroup::Background => "backgroundOptions",
        }
    }

    /// Key of the form-only helper subtree.
    pub fn helper_key(&self) -> &'static str {
        match self {
            OptionGroup::Dots => "dotsOptionsHelper",
            OptionGroup::CornersSquare => "cornersSquareOptionsHelper",
            OptionGroup::CornersDot => "cornersDotOptionsHelper",
            OptionGroup::Background => "backgroundOptionsHelper",
        }
    }

    pub fn default_color(&self) -> &'static str {
        match self {
            OptionGroup::Dots => "#6a1a4c",
            OptionGroup::CornersSquare => "#000000",
            OptionGroup::CornersDot => "#000000",
            OptionGroup::Background => "#ffffff",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OptionGroup::Dots => "Dots",
            OptionGroup::CornersSquare => "Corners square",
            OptionGroup::CornersDot => "Corners dot",
            OptionGroup::Background => "Background",
        }
    }

    /// Path of the group's plain color input.
    pub fn color_path(&self) -> String {
        format!("{}.color", self.option_key())
    }

    /// Color types this group offers; only the background can be transparent.
    pub fn color_types(&self) -> &'static [ColorType] {
        match self {
            OptionGroup::Background => {
                &[ColorType::Single, ColorType::Gradient, ColorType::Transparent]
            }
            _ => &[ColorType::Single, ColorType::Gradient],
        }
    }

    pub fn from_helper_key(key: &str) -> Option<OptionGroup> {
        OptionGroup::ALL.into_iter().find(|group| group.helper_key() == key)
    }
}

/// How a group is colored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorType {
    Single,
    Gradient,
    Transparent,
}

impl ColorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColorType::Single => "single",
            ColorType::Gradient => "gradient",
            ColorType::Transparent => "transparent",
        }
    }

    fn parse(s: &str) -> Option<ColorType> {
        match s {
            "single" => Some(ColorType::Single),
            "gradient" => Some(ColorType::Gradient),
            "transparent" => Some(ColorType::Transparent),
            _ => None,
        }
    }
}

/// Shape of a gradient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradientKind {
    Linear,
    Radial,
}

impl GradientKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GradientKind::Linear => "linear",
            GradientKind::Radial => "radial",
        }
    }
}

/// What a change to a helper field means.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HelperEvent {
    ColorType(ColorType),
    GradientKind(GradientKind),
    Color1,
    Color2,
    Rotation,
}

/// Maps a changed field path to its group and helper meaning.
///
/// # Examples
///
/// ```
/// use qrform::domain::{classify_helper_field, ColorType, HelperEvent, OptionGroup};
///
/// assert_eq!(
///     classify_helper_field("dotsOptionsHelper.colorType.gradient"),
///     Some((OptionGroup::Dots, HelperEvent::ColorType(ColorType::Gradient)))
/// );
/// assert_eq!(classify_helper_field("dotsOptions.color"), None);
/// ```
pub fn classify_helper_field(field: &str) -> Option<(OptionGroup, HelperEvent)> {
    let (helper_key, rest) = field.split_once('.')?;
    let group = OptionGroup::from_helper_key(helper_key)?;
    let event = match rest.split_once('.')? {
        ("colorType", color_type) => HelperEvent::ColorType(ColorType::parse(color_type)?),
        ("gradient", "linear") => HelperEvent::GradientKind(GradientKind::Linear),
        ("gradient", "radial") => HelperEvent::GradientKind(GradientKind::Radial),
        ("gradient", "color1") => HelperEvent::Color1,
        ("gradient", "color2") => HelperEvent::Color2,
        ("gradient", "rotation") => HelperEvent::Rotation,
        _ => return None,
    };
    Some((group, event))
}

/// Gradient inputs read from a helper subtree.
#[derive(Debug, Clone, PartialEq)]
pub struct GradientHelper {
    pub kind: GradientKind,
    pub color1: String,
    pub color2: String,
    /// Rotation in degrees, as entered.
    pub rotation: f64,
}

impl Default for GradientHelper {
    fn default() -> Self {
        Self {
            kind: GradientKind::Linear,
            color1: "#000000".to_string(),
            color2: "#000000".to_string(),
            rotation: 0.0,
        }
    }
}

impl GradientHelper {
    /// Reads the `gradient` part of a helper subtree, falling back to
    /// defaults for missing inputs.
    pub fn from_state(helper: Option<&Value>) -> Self {
        let defaults = Self::default();
        let Some(gradient) = helper.and_then(|helper| helper.get("gradient")) else {
            return defaults;
        };

        let kind = if gradient.get("linear").and_then(Value::as_bool).unwrap_or(true) {
            GradientKind::Linear
        } else {
            GradientKind::Radial
        };
        let color = |key: &str, fallback: String| {
            gradient
                .get(key)
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or(fallback)
        };

        Self {
            kind,
            color1: color("color1", defaults.color1),
            color2: color("color2", defaults.color2),
            rotation: gradient.get("rotation").map(parse_degrees).unwrap_or(defaults.rotation),
        }
    }

    pub fn rotation_radians(&self) -> f64 {
        degrees_to_radians(self.rotation)
    }

    /// Renderer gradient options built from these inputs.
    pub fn gradient_config(&self) -> Value {
        json!({
            "type": self.kind.as_str(),
            "rotation": self.rotation_radians(),
            "colorStops": color_stops(&self.color1, &self.color2),
        })
    }
}

/// The two-stop gradient the form produces.
pub fn color_stops(color1: &str, color2: &str) -> Value {
    json!([
        {"offset": 0, "color": color1},
        {"offset": 1, "color": color2},
    ])
}

pub fn degrees_to_radians(degrees: f64) -> f64 {
    degrees / 180.0 * PI
}

/// Reads a rotation typed either as a number or as numeric text.
pub fn parse_degrees(value: &Value) -> f64 {
    match value {
        Value::Number(number) => number.as_f64().unwrap_or(0.0),
        Value::String(text) => text.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Whether `color` equals the group's default, ignoring case.
pub fn is_default_color(group: OptionGroup, color: &str) -> bool {
    color.eq_ignore_ascii_case(group.default_color())
}
