use crate::error::PresentError;
use serde::{Deserialize, Serialize};

/// Linear RGB color with channels in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ColorSpec", into = "ColorSpec")]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

/// Config-file form of a color: a palette name or an `[r, g, b]` triple
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorSpec {
    Named(String),
    Rgb([f32; 3]),
}

const PALETTE: &[(&str, Color)] = &[
    ("black", Color::BLACK),
    ("red", Color::RED),
    ("green", Color::GREEN),
    ("blue", Color::BLUE),
    ("cyan", Color::CYAN),
    ("magenta", Color::MAGENTA),
    ("yellow", Color::YELLOW),
    ("white", Color::WHITE),
    ("neutral-gray", Color::NEUTRAL_GRAY),
];

impl Color {
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const RED: Color = Color::rgb(1.0, 0.0, 0.0);
    pub const GREEN: Color = Color::rgb(0.0, 1.0, 0.0);
    pub const BLUE: Color = Color::rgb(0.0, 0.0, 1.0);
    pub const CYAN: Color = Color::rgb(0.0, 1.0, 1.0);
    pub const MAGENTA: Color = Color::rgb(1.0, 0.0, 1.0);
    pub const YELLOW: Color = Color::rgb(1.0, 1.0, 0.0);
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const NEUTRAL_GRAY: Color = Color::rgb(0.75, 0.75, 0.75);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn gray(level: f32) -> Self {
        let l = level.clamp(0.0, 1.0);
        Self::rgb(l, l, l)
    }

    pub fn named(name: &str) -> Option<Self> {
        PALETTE
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, c)| *c)
    }

    pub fn name(&self) -> Option<&'static str> {
        PALETTE.iter().find(|(_, c)| c == self).map(|(n, _)| *n)
    }

    pub fn to_rgba8(self) -> [u8; 4] {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), 255]
    }

    /// Rec. 709 relative luminance
    pub fn luminance(self) -> f32 {
        0.2126 * self.r + 0.7152 * self.g + 0.0722 * self.b
    }

    pub fn inverted(self) -> Self {
        Self::rgb(1.0 - self.r, 1.0 - self.g, 1.0 - self.b)
    }
}

impl TryFrom<ColorSpec> for Color {
    type Error = PresentError;

    fn try_from(spec: ColorSpec) -> Result<Self, Self::Error> {
        match spec {
            ColorSpec::Named(name) => Color::named(&name).ok_or(PresentError::UnknownColor(name)),
            ColorSpec::Rgb([r, g, b]) => {
                if [r, g, b].iter().all(|c| (0.0..=1.0).contains(c)) {
                    Ok(Color::rgb(r, g, b))
                } else {
                    Err(PresentError::invalid(
                        "color",
                        format!("channels must lie in [0, 1], got [{r}, {g}, {b}]"),
                    ))
                }
            }
        }
    }
}

impl From<Color> for ColorSpec {
    fn from(color: Color) -> Self {
        match color.name() {
            Some(name) => ColorSpec::Named(name.to_string()),
            None => ColorSpec::Rgb([color.r, color.g, color.b]),
        }
    }
}
