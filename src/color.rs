//! Wire color codes, color name translation and gauge equivalence

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::model::Quantity;

/// Named color codes, each a fixed palette assigned to wires in order
pub const COLOR_CODES: &[(&str, &[&str])] = &[
    (
        "DIN",
        &[
            "WH", "BN", "GN", "YE", "GY", "PK", "BU", "RD", "BK", "VT", "GYPK", "RDBU", "WHGN",
            "BNGN", "WHYE", "YEBN", "WHGY", "GYBN", "WHPK", "PKBN", "WHBU", "BNBU", "WHRD",
            "BNRD", "WHBK", "BNBK", "GYGN", "YEGY", "PKGN", "YEPK", "GNBU", "YEBU", "GNRD",
            "YERD", "GNBK", "YEBK", "GYBU", "PKBU", "GYRD", "PKRD", "GYBK", "PKBK", "BUBK",
            "RDBK", "WHBNBK", "YEGNBK", "GYPKBK", "RDBUBK", "WHGNBK", "BNGNBK", "WHYEBK",
            "YEBNBK", "WHGYBK", "GYBNBK", "WHPKBK", "PKBNBK", "WHBUBK", "BNBUBK", "WHRDBK",
            "BNRDBK",
        ],
    ),
    (
        "IEC",
        &["BN", "RD", "OG", "YE", "GN", "BU", "VT", "GY", "WH", "BK"],
    ),
    ("BW", &["BK", "WH"]),
    (
        "TEL",
        &[
            "BUWH", "WHBU", "OGWH", "WHOG", "GNWH", "WHGN", "BNWH", "WHBN", "SLWH", "WHSL",
            "BURD", "RDBU", "OGRD", "RDOG", "GNRD", "RDGN", "BNRD", "RDBN", "SLRD", "RDSL",
            "BUBK", "BKBU", "OGBK", "BKOG", "GNBK", "BKGN", "BNBK", "BKBN", "SLBK", "BKSL",
            "BUYE", "YEBU", "OGYE", "YEOG", "GNYE", "YEGN", "BNYE", "YEBN", "SLYE", "YESL",
            "BUVT", "VTBU", "OGVT", "VTOG", "GNVT", "VTGN", "BNVT", "VTBN", "SLVT", "VTSL",
        ],
    ),
    (
        "TELALT",
        &[
            "WHBU", "BU", "WHOG", "OG", "WHGN", "GN", "WHBN", "BN", "WHSL", "SL", "RDBU",
            "BURD", "RDOG", "OGRD", "RDGN", "GNRD", "RDBN", "BNRD", "RDSL", "SLRD", "BKBU",
            "BUBK", "BKOG", "OGBK", "BKGN", "GNBK", "BKBN", "BNBK", "BKSL", "SLBK", "YEBU",
            "BUYE", "YEOG", "OGYE", "YEGN", "GNYE", "YEBN", "BNYE", "YESL", "SLYE", "VTBU",
            "BUVT", "VTOG", "OGVT", "VTGN", "GNVT", "VTBN", "BNVT", "VTSL", "SLVT",
        ],
    ),
    (
        "T568A",
        &["WHGN", "GN", "WHOG", "BU", "WHBU", "OG", "WHBN", "BN"],
    ),
    (
        "T568B",
        &["WHOG", "OG", "WHGN", "BU", "WHBU", "GN", "WHBN", "BN"],
    ),
];

/// Two-letter color abbreviations with their full name and hex value
const COLORS: &[(&str, &str, &str)] = &[
    ("BK", "black", "#000000"),
    ("WH", "white", "#ffffff"),
    ("GY", "grey", "#999999"),
    ("PK", "pink", "#ff66cc"),
    ("RD", "red", "#ff0000"),
    ("OG", "orange", "#ff8000"),
    ("YE", "yellow", "#ffff00"),
    ("OL", "olive green", "#708000"),
    ("GN", "green", "#00ff00"),
    ("TQ", "turquoise", "#00ffff"),
    ("LB", "light blue", "#a0dfff"),
    ("BU", "blue", "#0066ff"),
    ("VT", "violet", "#8000ff"),
    ("BN", "brown", "#895956"),
    ("BG", "beige", "#ceb673"),
    ("IV", "ivory", "#f5f0d0"),
    ("SL", "slate", "#708090"),
    ("CU", "copper", "#d6775e"),
    ("SN", "tin", "#aaaaaa"),
    ("SR", "silver", "#84878c"),
    ("GD", "gold", "#ffcf80"),
];

/// Cross sections in mm² and their AWG equivalents
const AWG_EQUIVALENTS: &[(&str, &str)] = &[
    ("0.09", "28"),
    ("0.14", "26"),
    ("0.25", "24"),
    ("0.34", "22"),
    ("0.5", "21"),
    ("0.75", "20"),
    ("1", "18"),
    ("1.5", "16"),
    ("2.5", "14"),
    ("4", "12"),
    ("6", "10"),
    ("10", "8"),
    ("16", "6"),
    ("25", "4"),
    ("35", "2"),
    ("50", "1"),
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    #[error("unknown color code '{0}'; known codes are DIN, IEC, BW, TEL, TELALT, T568A, T568B")]
    UnknownCode(String),

    #[error("unknown number of wires; give wirecount or a list of colors")]
    UnknownWireCount,
}

/// Look up a named color code (case-insensitive)
pub fn palette(code: &str) -> Option<&'static [&'static str]> {
    COLOR_CODES
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(code.trim()))
        .map(|(_, palette)| *palette)
}

/// Wire count and per-wire colors of a cable, shield excluded
#[derive(Debug, Clone, PartialEq)]
pub struct WireColors {
    pub wirecount: usize,
    pub colors: Vec<Option<String>>,
}

/// Assign a color to every wire.
///
/// An explicit list is cycled (or truncated) to the wire count; a named
/// code is assigned positionally, cycling past its length. With neither,
/// wires stay uncolored. Without a wire count, the explicit list decides.
pub fn assign_colors(
    wirecount: Option<usize>,
    colors: &[String],
    color_code: Option<&str>,
) -> Result<WireColors, ColorError> {
    let code = match color_code {
        Some(code) => Some(palette(code).ok_or_else(|| ColorError::UnknownCode(code.to_string()))?),
        None => None,
    };
    if code.is_some() && !colors.is_empty() {
        warn!(
            color_code = color_code.unwrap_or_default(),
            "both colors and color_code given; using the explicit colors"
        );
    }
    let blank_to_none = |color: &String| {
        let color = color.trim();
        (!color.is_empty()).then(|| color.to_string())
    };

    let wirecount = match wirecount {
        Some(count) => count,
        None if !colors.is_empty() => colors.len(),
        None => return Err(ColorError::UnknownWireCount),
    };
    let colors = if !colors.is_empty() {
        (0..wirecount)
            .map(|i| blank_to_none(&colors[i % colors.len()]))
            .collect()
    } else if let Some(code) = code {
        (0..wirecount)
            .map(|i| Some(code[i % code.len()].to_string()))
            .collect()
    } else {
        vec![None; wirecount]
    };
    Ok(WireColors { wirecount, colors })
}

/// How colors are written in descriptions and labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColorMode {
    #[serde(rename = "short")]
    Short,
    #[default]
    #[serde(rename = "SHORT")]
    ShortUpper,
    #[serde(rename = "full")]
    Full,
    #[serde(rename = "FULL")]
    FullUpper,
    #[serde(rename = "hex")]
    Hex,
    #[serde(rename = "HEX")]
    HexUpper,
}

impl std::str::FromStr for ColorMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "short" => Ok(ColorMode::Short),
            "SHORT" => Ok(ColorMode::ShortUpper),
            "full" => Ok(ColorMode::Full),
            "FULL" => Ok(ColorMode::FullUpper),
            "hex" => Ok(ColorMode::Hex),
            "HEX" => Ok(ColorMode::HexUpper),
            other => Err(format!(
                "unknown color mode '{other}'; expected short, SHORT, full, FULL, hex or HEX"
            )),
        }
    }
}

impl ColorMode {
    fn uppercase(self) -> bool {
        matches!(
            self,
            ColorMode::ShortUpper | ColorMode::FullUpper | ColorMode::HexUpper
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ColorPart {
    Known {
        code: &'static str,
        name: &'static str,
        hex: &'static str,
    },
    Hex(String),
    Named(String),
}

/// A single or multicolor value such as `RD`, `WHGN` or `#ff0000:#00ff00`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiColor(Vec<ColorPart>);

fn known_color(code: &str) -> Option<ColorPart> {
    COLORS
        .iter()
        .find(|(known, _, _)| *known == code)
        .map(|&(code, name, hex)| ColorPart::Known { code, name, hex })
}

impl MultiColor {
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        if input.is_empty() {
            return MultiColor(Vec::new());
        }
        if input.starts_with('#') {
            return MultiColor(
                input
                    .split(':')
                    .map(|hex| ColorPart::Hex(hex.trim().to_lowercase()))
                    .collect(),
            );
        }
        let upper = input.to_ascii_uppercase();
        if upper.is_ascii() && upper.len() % 2 == 0 {
            let parts: Option<Vec<ColorPart>> = upper
                .as_bytes()
                .chunks(2)
                .map(|chunk| std::str::from_utf8(chunk).ok().and_then(known_color))
                .collect();
            if let Some(parts) = parts {
                return MultiColor(parts);
            }
        }
        warn!(color = input, "unknown color name; kept verbatim");
        MultiColor(vec![ColorPart::Named(input.to_string())])
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Hex values for drawing, one per color stripe
    pub fn hex_values(&self) -> Vec<String> {
        self.0
            .iter()
            .map(|part| match part {
                ColorPart::Known { hex, .. } => hex.to_string(),
                ColorPart::Hex(hex) => hex.clone(),
                ColorPart::Named(name) => name.clone(),
            })
            .collect()
    }

    pub fn translate(&self, mode: ColorMode) -> String {
        let (parts, separator): (Vec<String>, &str) = match mode {
            ColorMode::Short | ColorMode::ShortUpper => (
                self.0
                    .iter()
                    .map(|part| match part {
                        ColorPart::Known { code, .. } => code.to_string(),
                        ColorPart::Hex(hex) => hex.clone(),
                        ColorPart::Named(name) => name.clone(),
                    })
                    .collect(),
                "",
            ),
            ColorMode::Full | ColorMode::FullUpper => (
                self.0
                    .iter()
                    .map(|part| match part {
                        ColorPart::Known { name, .. } => name.to_string(),
                        ColorPart::Hex(hex) => hex.clone(),
                        ColorPart::Named(name) => name.clone(),
                    })
                    .collect(),
                "/",
            ),
            ColorMode::Hex | ColorMode::HexUpper => (self.hex_values(), ":"),
        };
        let joined = parts.join(separator);
        if mode.uppercase() {
            joined.to_uppercase()
        } else {
            joined.to_lowercase()
        }
    }
}

/// Translate a color string for display; blank stays blank
pub fn translate_color(color: &str, mode: ColorMode) -> String {
    MultiColor::parse(color).translate(mode)
}

fn lookup_equivalent(number: f64, from_mm2: bool) -> &'static str {
    AWG_EQUIVALENTS
        .iter()
        .find(|(mm2, awg)| {
            let key = if from_mm2 { mm2 } else { awg };
            key.parse::<f64>().map_or(false, |k| k == number)
        })
        .map(|(mm2, awg)| if from_mm2 { *awg } else { *mm2 })
        .unwrap_or("Unknown")
}

pub fn awg_equivalent(mm2: f64) -> &'static str {
    lookup_equivalent(mm2, true)
}

pub fn mm2_equivalent(awg: f64) -> &'static str {
    lookup_equivalent(awg, false)
}

fn is_awg(gauge: &Quantity) -> bool {
    gauge.unit_str().eq_ignore_ascii_case("awg")
}

fn is_mm2(gauge: &Quantity) -> bool {
    matches!(gauge.unit_str(), "mm2" | "mm²")
}

/// `0.25 mm²`, `24 AWG`
pub fn gauge_str(gauge: &Quantity) -> String {
    let unit = if is_mm2(gauge) {
        "mm²".to_string()
    } else if is_awg(gauge) {
        "AWG".to_string()
    } else {
        gauge.unit_str().to_string()
    };
    if unit.is_empty() {
        format!("{}", gauge.number)
    } else {
        format!("{} {}", gauge.number, unit)
    }
}

/// Gauge with its equivalent in the other system, e.g. `0.25 mm² (24 AWG)`
pub fn gauge_str_with_equiv(gauge: &Quantity) -> String {
    let base = gauge_str(gauge);
    if is_mm2(gauge) {
        format!("{base} ({} AWG)", awg_equivalent(gauge.number))
    } else if is_awg(gauge) {
        format!("{base} ({} mm²)", mm2_equivalent(gauge.number))
    } else {
        base
    }
}
