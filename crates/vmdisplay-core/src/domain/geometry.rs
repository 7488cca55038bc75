//! Display geometry and dirty-range entities.
//!
//! A [`DirtyRange`] is the inclusive interval of scan lines that must be
//! re-copied from VM memory into the local bitmap. Ranges arrive from the VM
//! unvalidated; they are clamped into the display bounds rather than
//! rejected, and an inverted range (`first_line > last_line`) simply means
//! "nothing to do".

use serde::{Deserialize, Serialize};

/// Width and height of the bridged display in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DisplayGeometry {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels (number of scan lines).
    pub height: u32,
}

impl DisplayGeometry {
    /// Creates a geometry value.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Inclusive, 0-based interval of scan lines requiring re-copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirtyRange {
    /// First changed line.
    pub first_line: usize,
    /// Last changed line (inclusive).
    pub last_line: usize,
}

impl DirtyRange {
    /// Creates a range; `first_line > last_line` denotes an empty range.
    pub fn new(first_line: usize, last_line: usize) -> Self {
        Self { first_line, last_line }
    }

    /// The full-frame range for a display of `height` lines.
    ///
    /// A zero-height display yields an empty range.
    pub fn full_frame(height: u32) -> Self {
        if height == 0 {
            Self { first_line: 1, last_line: 0 }
        } else {
            Self { first_line: 0, last_line: height as usize - 1 }
        }
    }

    /// Returns `true` when the range covers no lines.
    pub fn is_empty(&self) -> bool {
        self.first_line > self.last_line
    }

    /// Clamps the range into `[0, height - 1]`.
    ///
    /// Returns `None` when the display has no lines or the clamped range is
    /// empty.
    pub fn clamp_to(&self, height: u32) -> Option<DirtyRange> {
        if height == 0 || self.is_empty() {
            return None;
        }
        let last = self.last_line.min(height as usize - 1);
        if self.first_line > last {
            return None;
        }
        Some(DirtyRange { first_line: self.first_line, last_line: last })
    }

    /// Number of lines covered by the range (0 when empty).
    pub fn line_count(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            self.last_line - self.first_line + 1
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
