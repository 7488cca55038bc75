//! TOML scenario schema for the replay harness.
//!
//! Example scenario:
//!
//! ```toml
//! [display]
//! width = 640
//! height = 480
//! offset = 8
//!
//! [[steps]]
//! kind = "key_down"
//! code = 0x11
//!
//! [[steps]]
//! kind = "key_down"
//! code = 0x41
//! ch = 0x61
//!
//! [[steps]]
//! kind = "frame"
//! first_line = 0
//! last_line = 479
//! fill = 0x0F0F
//! ```
//!
//! Fields carry serde defaults so a scenario only states what it cares
//! about: a bare `key_down` defaults its character to the "no character"
//! sentinel, and the raster stride is derived from the width when absent.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Error type for scenario file operations.
#[derive(Debug, Error)]
pub enum ScenarioError {
    /// A file system I/O error occurred.
    #[error("I/O error reading scenario at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse scenario TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

// ── Scenario schema types ─────────────────────────────────────────────────────

/// A complete replay scenario.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Scenario {
    pub display: DisplayConfig,
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// Geometry and memory layout of the replayed display.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DisplayConfig {
    /// Display width in pixels.
    #[serde(default = "default_width")]
    pub width: u32,
    /// Display height in scan lines.
    #[serde(default = "default_height")]
    pub height: u32,
    /// Word index of the first scan line inside the simulated VM memory.
    #[serde(default = "default_offset")]
    pub offset: usize,
    /// Words per scan line; derived from the width when absent.
    #[serde(default)]
    pub raster_stride: Option<usize>,
}

impl DisplayConfig {
    /// Words per scan line, deriving 16 pixels per word when the scenario
    /// does not state a stride.
    pub fn words_per_line(&self) -> usize {
        self.raster_stride.unwrap_or_else(|| (self.width as usize).div_ceil(16).max(1))
    }
}

/// One replayed host-side step.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Step {
    /// Physical key press.
    KeyDown {
        code: u16,
        #[serde(default = "default_char_none")]
        ch: u16,
    },
    /// Physical key release.
    KeyUp {
        code: u16,
        #[serde(default = "default_char_none")]
        ch: u16,
    },
    /// Composed-character notification.
    KeyTyped {
        ch: u16,
        #[serde(default)]
        code: u16,
    },
    /// Pointer motion in host coordinates.
    PointerMove { x: i32, y: i32 },
    /// Button press with the host's 1-based ordinal.
    PointerPress { ordinal: u8, x: i32, y: i32 },
    /// Button release with the host's 1-based ordinal.
    PointerRelease { ordinal: u8, x: i32, y: i32 },
    /// One VM render cycle: fill the dirty lines with a word value, then
    /// report the range to the framebuffer sync.
    Frame {
        first_line: usize,
        last_line: usize,
        #[serde(default)]
        fill: u16,
    },
}

fn default_width() -> u32 {
    640
}

fn default_height() -> u32 {
    480
}

fn default_offset() -> usize {
    1
}

fn default_char_none() -> u16 {
    vmdisplay_core::input::CHAR_NONE
}

impl Scenario {
    /// Loads a scenario from a TOML file.
    pub fn load(path: &Path) -> Result<Scenario, ScenarioError> {
        let text = fs::read_to_string(path)
            .map_err(|source| ScenarioError::Io { path: path.to_path_buf(), source })?;
        Self::from_toml_str(&text)
    }

    /// Parses a scenario from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Scenario, ScenarioError> {
        Ok(toml::from_str(text)?)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use vmdisplay_core::input::CHAR_NONE;

    #[test]
    fn test_parse_scenario_with_defaults() {
        // Arrange: only the step kinds and required fields are given
        let text = r#"
            [display]
            width = 512
            height = 342

            [[steps]]
            kind = "key_down"
            code = 0x11

            [[steps]]
            kind = "frame"
            first_line = 0
            last_line = 341
        "#;

        // Act
        let scenario = Scenario::from_toml_str(text).expect("scenario must parse");

        // Assert
        assert_eq!(scenario.display.width, 512);
        assert_eq!(scenario.display.words_per_line(), 32);
        assert_eq!(scenario.display.offset, 1);
        assert_eq!(
            scenario.steps,
            vec![
                Step::KeyDown { code: 0x11, ch: CHAR_NONE },
                Step::Frame { first_line: 0, last_line: 341, fill: 0 },
            ]
        );
    }

    #[test]
    fn test_parse_scenario_with_explicit_stride_and_pointer_steps() {
        let text = r#"
            [display]
            width = 640
            height = 480
            raster_stride = 48
            offset = 16

            [[steps]]
            kind = "pointer_press"
            ordinal = 1
            x = 10
            y = 20
        "#;

        let scenario = Scenario::from_toml_str(text).expect("scenario must parse");

        assert_eq!(scenario.display.words_per_line(), 48);
        assert_eq!(scenario.steps, vec![Step::PointerPress { ordinal: 1, x: 10, y: 20 }]);
    }

    #[test]
    fn test_parse_rejects_unknown_step_kind() {
        let text = r#"
            [display]
            width = 640
            height = 480

            [[steps]]
            kind = "key_wiggle"
        "#;

        let err = Scenario::from_toml_str(text).expect_err("unknown kind must fail");
        assert!(matches!(err, ScenarioError::Parse(_)));
    }

    #[test]
    fn test_missing_display_section_is_an_error() {
        let err = Scenario::from_toml_str("steps = []").expect_err("display is required");
        assert!(matches!(err, ScenarioError::Parse(_)));
    }

    #[test]
    fn test_load_reports_missing_file_with_its_path() {
        let err = Scenario::load(Path::new("/nonexistent/scenario.toml"))
            .expect_err("missing file must fail");
        assert!(matches!(err, ScenarioError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/scenario.toml"));
    }
}
