//! Configuration for the window shape engine.
//!
//! [`ShapeConfig`] is read from a TOML file. Every field has a default (see
//! [`defaults`]), a missing file yields the default configuration, and the
//! loaded values are validated before use.
//!
//! ```toml
//! pixels_per_byte = 8
//! quad_split = "cover"          # or "truncate"
//! region_edges = "exclusive"    # or "inclusive"
//! default_mode = "binarize-alpha:128"
//!
//! [parked_position]
//! x = -1000
//! y = -1000
//! ```

pub mod defaults;

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, info};

use crate::bitmap::SUPPORTED_PIXELS_PER_BYTE;
use crate::error::ConfigError;
use crate::mode::ShapeMode;
use crate::region::RegionEdges;
use crate::tree::QuadSplit;
use crate::types::Position;

/// Tunables of the shape engine and the shaped window manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShapeConfig {
    /// Packing density of bitmap masks; one of 1, 2, 4 or 8.
    #[serde(default = "defaults::default_pixels_per_byte")]
    pub pixels_per_byte: u8,
    /// How non-uniform rectangles are split into quadrants.
    #[serde(default = "defaults::default_quad_split")]
    pub quad_split: QuadSplit,
    /// Edge convention of the host's region rectangles.
    #[serde(default = "defaults::default_region_edges")]
    pub region_edges: RegionEdges,
    /// Mode suggested to callers that have no better information.
    #[serde(default = "defaults::default_mode")]
    pub default_mode: ShapeMode,
    /// Off-screen position of shapeable windows waiting for a shape.
    /// Kept last so it serializes as a trailing TOML table.
    #[serde(default = "defaults::default_parked_position")]
    pub parked_position: Position,
}

impl Default for ShapeConfig {
    fn default() -> Self {
        Self {
            pixels_per_byte: defaults::default_pixels_per_byte(),
            quad_split: defaults::default_quad_split(),
            parked_position: defaults::default_parked_position(),
            region_edges: defaults::default_region_edges(),
            default_mode: defaults::default_mode(),
        }
    }
}

impl ShapeConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: ShapeConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the configuration at `path`.
    ///
    /// A missing or blank file yields [`ShapeConfig::default`]. Other read
    /// failures are reported as [`ConfigError::Read`].
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(content) if content.trim().is_empty() => {
                debug!(path = %path.display(), "Shape configuration file is empty, using defaults");
                Ok(Self::default())
            }
            Ok(content) => {
                let config = Self::from_toml_str(&content)?;
                info!(path = %path.display(), "Loaded shape configuration");
                Ok(config)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "No shape configuration file, using defaults");
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Checks values that the schema alone cannot constrain.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !SUPPORTED_PIXELS_PER_BYTE.contains(&self.pixels_per_byte) {
            return Err(ConfigError::Validation(format!(
                "pixels_per_byte must be one of {SUPPORTED_PIXELS_PER_BYTE:?}, got {}",
                self.pixels_per_byte
            )));
        }
        Ok(())
    }
}
