//! Shape modes and the per-pixel classifier.
//!
//! A [`ShapeMode`] is the rule that decides whether a pixel belongs to a
//! window's visible shape ("opaque") or is cut away ("transparent").
//! Modes have a textual form used by configuration files:
//!
//! | Text | Mode |
//! |---|---|
//! | `default` | [`ShapeMode::Default`] |
//! | `binarize-alpha:<0-255>` | [`ShapeMode::BinarizeAlpha`] |
//! | `reverse-binarize-alpha:<0-255>` | [`ShapeMode::ReverseBinarizeAlpha`] |
//! | `color-key:#rrggbb` | [`ShapeMode::ColorKey`] |
//!
//! ```
//! use novade_window_shape::{classify, Rgba, ShapeMode};
//!
//! let mode: ShapeMode = "binarize-alpha:128".parse().unwrap();
//! assert!(classify(Rgba::new(0, 0, 0, 200), mode));
//! assert!(!classify(Rgba::new(0, 0, 0, 100), mode));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ShapeError;
use crate::types::{Rgb, Rgba};

/// Rule used to classify pixels as part of a window's shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ShapeMode {
    /// Opaque iff alpha ≥ 1.
    #[default]
    Default,
    /// Opaque iff alpha ≥ cutoff.
    BinarizeAlpha(u8),
    /// Opaque iff alpha ≤ cutoff.
    ReverseBinarizeAlpha(u8),
    /// Opaque iff the pixel's RGB differs from the key. Alpha is ignored.
    ColorKey(Rgb),
}

impl ShapeMode {
    /// Classifies a single pixel. `true` means the pixel is part of the shape.
    #[inline]
    pub fn classify(self, pixel: Rgba) -> bool {
        match self {
            ShapeMode::Default => pixel.a >= 1,
            ShapeMode::BinarizeAlpha(cutoff) => pixel.a >= cutoff,
            ShapeMode::ReverseBinarizeAlpha(cutoff) => pixel.a <= cutoff,
            ShapeMode::ColorKey(key) => pixel.rgb() != key,
        }
    }

    /// Whether the mode reads the alpha channel.
    pub const fn requires_alpha(self) -> bool {
        !self.requires_color()
    }

    /// Whether the mode reads the color channels.
    pub const fn requires_color(self) -> bool {
        matches!(self, ShapeMode::ColorKey(_))
    }
}

/// Free-function form of [`ShapeMode::classify`].
#[inline]
pub fn classify(pixel: Rgba, mode: ShapeMode) -> bool {
    mode.classify(pixel)
}

/// Classification of a pixel or of a uniform region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    /// Included in the window's visible shape.
    Opaque,
    /// Cut away from the window's visible shape.
    Transparent,
}

impl Classification {
    /// Whether this is [`Classification::Opaque`].
    pub const fn is_opaque(self) -> bool {
        matches!(self, Classification::Opaque)
    }
}

impl From<bool> for Classification {
    fn from(opaque: bool) -> Self {
        if opaque {
            Classification::Opaque
        } else {
            Classification::Transparent
        }
    }
}

impl fmt::Display for ShapeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeMode::Default => f.write_str("default"),
            ShapeMode::BinarizeAlpha(cutoff) => write!(f, "binarize-alpha:{cutoff}"),
            ShapeMode::ReverseBinarizeAlpha(cutoff) => {
                write!(f, "reverse-binarize-alpha:{cutoff}")
            }
            ShapeMode::ColorKey(key) => write!(f, "color-key:{key}"),
        }
    }
}

impl FromStr for ShapeMode {
    type Err = ShapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let (kind, param) = match text.split_once(':') {
            Some((kind, param)) => (kind.trim(), Some(param.trim())),
            None => (text, None),
        };

        let cutoff = |param: Option<&str>| -> Result<u8, ShapeError> {
            let param = param.ok_or_else(|| {
                ShapeError::InvalidArgument(format!("shape mode '{s}' requires an alpha cutoff"))
            })?;
            param.parse::<u8>().map_err(|e| {
                ShapeError::InvalidArgument(format!("invalid alpha cutoff '{param}': {e}"))
            })
        };

        match kind.to_ascii_lowercase().as_str() {
            "default" if param.is_none() => Ok(ShapeMode::Default),
            "binarize-alpha" => Ok(ShapeMode::BinarizeAlpha(cutoff(param)?)),
            "reverse-binarize-alpha" => Ok(ShapeMode::ReverseBinarizeAlpha(cutoff(param)?)),
            "color-key" => {
                let key = param.ok_or_else(|| {
                    ShapeError::InvalidArgument(format!("shape mode '{s}' requires a color key"))
                })?;
                Ok(ShapeMode::ColorKey(key.parse()?))
            }
            _ => Err(ShapeError::InvalidArgument(format!(
                "unrecognized shape mode '{s}'"
            ))),
        }
    }
}

impl TryFrom<String> for ShapeMode {
    type Error = ShapeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ShapeMode> for String {
    fn from(mode: ShapeMode) -> Self {
        mode.to_string()
    }
}
