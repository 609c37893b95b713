//! View modes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ViewError;

/// How a view presents its volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViewMode {
    /// Rotating 3D view of the whole volume (arcball camera, perspective).
    #[serde(rename = "3D")]
    Volume,
    /// Pannable, zoomable 2D view of one depth slice (ortho camera).
    #[serde(rename = "2D")]
    Slice,
}

impl ViewMode {
    /// Returns the short display name ("3D" or "2D").
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            ViewMode::Volume => "3D",
            ViewMode::Slice => "2D",
        }
    }

    /// Whether this mode renders with a depth attachment.
    #[must_use]
    pub fn uses_depth(self) -> bool {
        match self {
            ViewMode::Volume => true,
            ViewMode::Slice => false,
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ViewMode {
    type Err = ViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "3d" | "volume" => Ok(ViewMode::Volume),
            "2d" | "slice" => Ok(ViewMode::Slice),
            _ => Err(ViewError::UnknownViewMode(s.to_string())),
        }
    }
}
