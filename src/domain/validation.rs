//! Encoding-mode and version checks for QR payloads.
//!
//! These are lookup-table heuristics used to keep the form consistent; they
//! do not encode anything.

use std::fmt;
use std::str::FromStr;

use super::models::Value;

/// Largest QR version.
pub const MAX_TYPE_NUMBER: u32 = 40;

/// Byte-mode capacity per version (1..=40) for each error correction level.
const CAPACITY_L: [usize; 40] = [
    17, 32, 53, 78, 106, 134, 154, 192, 230, 271, 321, 367, 425, 458, 520, 586, 644, 718, 792,
    858, 929, 1003, 1091, 1171, 1273, 1367, 1465, 1528, 1628, 1732, 1840, 1952, 2068, 2188, 2303,
    2431, 2563, 2699, 2809, 2953,
];
const CAPACITY_M: [usize; 40] = [
    14, 26, 42, 62, 84, 106, 122, 152, 180, 213, 251, 287, 331, 362, 412, 450, 504, 560, 624, 666,
    711, 779, 857, 911, 997, 1059, 1125, 1190, 1264, 1370, 1452, 1538, 1628, 1722, 1809, 1911,
    1989, 2099, 2213, 2331,
];
const CAPACITY_Q: [usize; 40] = [
    11, 20, 32, 46, 60, 74, 86, 108, 130, 151, 177, 203, 241, 258, 292, 322, 364, 394, 442, 482,
    509, 565, 611, 661, 715, 751, 805, 868, 908, 982, 1030, 1112, 1168, 1228, 1283, 1351, 1423,
    1499, 1579, 1663,
];
const CAPACITY_H: [usize; 40] = [
    7, 14, 24, 34, 44, 58, 64, 84, 98, 119, 137, 155, 177, 194, 220, 250, 280, 310, 338, 382, 403,
    439, 461, 511, 535, 593, 625, 658, 698, 742, 790, 842, 898, 958, 983, 1051, 1093, 1139, 1219,
    1273,
];

/// QR encoding mode, as offered by the mode select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QrMode {
    Numeric,
    Alphanumeric,
    Byte,
    Kanji,
}

impl QrMode {
    pub const ALL: [QrMode; 4] = [
        QrMode::Numeric,
        QrMode::Alphanumeric,
        QrMode::Byte,
        QrMode::Kanji,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QrMode::Numeric => "Numeric",
            QrMode::Alphanumeric => "Alphanumeric",
            QrMode::Byte => "Byte",
            QrMode::Kanji => "Kanji",
        }
    }
}

impl fmt::Display for QrMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QrMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        QrMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| format!("Unknown QR mode: {}", s))
    }
}

/// QR error correction level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ErrorCorrectionLevel {
    L,
    M,
    #[default]
    Q,
    H,
}

impl ErrorCorrectionLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCorrectionLevel::L => "L",
            ErrorCorrectionLevel::M => "M",
            ErrorCorrectionLevel::Q => "Q",
            ErrorCorrectionLevel::H => "H",
        }
    }

    fn capacities(&self) -> &'static [usize; 40] {
        match self {
            ErrorCorrectionLevel::L => &CAPACITY_L,
            ErrorCorrectionLevel::M => &CAPACITY_M,
            ErrorCorrectionLevel::Q => &CAPACITY_Q,
            ErrorCorrectionLevel::H => &CAPACITY_H,
        }
    }
}

impl FromStr for ErrorCorrectionLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "L" => Ok(ErrorCorrectionLevel::L),
            "M" => Ok(ErrorCorrectionLevel::M),
            "Q" => Ok(ErrorCorrectionLevel::Q),
            "H" => Ok(ErrorCorrectionLevel::H),
            _ => Err(format!("Unknown error correction level: {}", s)),
        }
    }
}

/// Checks whether `data` can be encoded in `mode`.
///
/// Empty data is valid in every mode.
///
/// # Examples
///
/// ```
/// use qrform::domain::{is_valid_for_mode, QrMode};
///
/// assert!(is_valid_for_mode("12345", QrMode::Numeric));
/// assert!(!is_valid_for_mode("12a", QrMode::Numeric));
/// assert!(is_valid_for_mode("HELLO WORLD", QrMode::Alphanumeric));
/// assert!(!is_valid_for_mode("hello", QrMode::Alphanumeric));
/// ```
pub fn is_valid_for_mode(data: &str, mode: QrMode) -> bool {
    match mode {
        QrMode::Numeric => data.chars().all(|c| c.is_ascii_digit()),
        QrMode::Alphanumeric => data
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase() || " $%*+-./:".contains(c)),
        QrMode::Byte | QrMode::Kanji => true,
    }
}

/// Smallest QR version whose byte capacity holds `data` at `level`.
///
/// Length is measured in UTF-16 code units. Returns [`MAX_TYPE_NUMBER`]
/// when nothing fits.
pub fn min_type_number(data: &str, level: ErrorCorrectionLevel) -> u32 {
    let length = data.encode_utf16().count();
    level
        .capacities()
        .iter()
        .position(|&capacity| length <= capacity)
        .map(|index| index as u32 + 1)
        .unwrap_or(MAX_TYPE_NUMBER)
}

/// Reads a type number from a form value; anything unparsable is 0 (auto).
pub fn parse_type_number(value: &Value) -> u32 {
    match value {
        Value::Number(number) => number
            .as_u64()
            .or_else(|| number.as_f64().filter(|n| *n >= 0.0).map(|n| n.trunc() as u64))
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(0),
        Value::String(text) => {
            let digits: String = text.trim().chars().take_while(|c| c.is_ascii_digit()).collect();
            digits.parse().unwrap_or(0)
        }
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_data_valid_for_all_modes() {
        for mode in QrMode::ALL {
            assert!(is_valid_for_mode("", mode));
        }
    }

    #[test]
    fn test_numeric_mode() {
        assert!(is_valid_for_mode("0123456789", QrMode::Numeric));
        assert!(!is_valid_for_mode("12 34", QrMode::Numeric));
    }

    #[test]
    fn test_alphanumeric_mode() {
        assert!(is_valid_for_mode("HTTPS://A.B/C-D $%*+", QrMode::Alphanumeric));
        assert!(!is_valid_for_mode("https://a.b", QrMode::Alphanumeric));
        assert!(!is_valid_for_mode("A_B", QrMode::Alphanumeric));
    }

    #[test]
    fn test_byte_and_kanji_accept_anything() {
        assert!(is_valid_for_mode("ünïcödé ✓", QrMode::Byte));
        assert!(is_valid_for_mode("漢字", QrMode::Kanji));
    }

    #[test]
    fn test_mode_round_trips_through_str() {
        for mode in QrMode::ALL {
            assert_eq!(mode.as_str().parse::<QrMode>(), Ok(mode));
        }
        assert!("Binary".parse::<QrMode>().is_err());
    }

    #[test]
    fn test_min_type_number_boundaries() {
        assert_eq!(min_type_number("", ErrorCorrectionLevel::Q), 1);
        assert_eq!(min_type_number(&"x".repeat(11), ErrorCorrectionLevel::Q), 1);
        assert_eq!(min_type_number(&"x".repeat(12), ErrorCorrectionLevel::Q), 2);
        assert_eq!(min_type_number(&"x".repeat(17), ErrorCorrectionLevel::L), 1);
        assert_eq!(min_type_number(&"x".repeat(8), ErrorCorrectionLevel::H), 2);
        assert_eq!(min_type_number(&"x".repeat(3000), ErrorCorrectionLevel::L), MAX_TYPE_NUMBER);
    }

    #[test]
    fn test_min_type_number_counts_utf16_units() {
        // Each emoji is two UTF-16 code units.
        assert_eq!(min_type_number(&"😀".repeat(6), ErrorCorrectionLevel::Q), 2);
    }

    #[test]
    fn test_parse_type_number() {
        assert_eq!(parse_type_number(&json!(7)), 7);
        assert_eq!(parse_type_number(&json!("12")), 12);
        assert_eq!(parse_type_number(&json!("5px")), 5);
        assert_eq!(parse_type_number(&json!("")), 0);
        assert_eq!(parse_type_number(&json!(null)), 0);
        assert_eq!(parse_type_number(&json!(-3)), 0);
    }
}
