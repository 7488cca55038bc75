//! Pointer motion and button normalization.
//!
//! Host surface coordinates may lie outside the display during drags; every
//! position is clamped into the display bounds and de-duplicated before
//! forwarding, so high-frequency motion collapses to the positions the VM
//! actually needs. Button transitions travel as undecoded key events, and a
//! position update always precedes the button event it belongs to.

use tracing::trace;

use crate::protocol::EventSink;

/// A logical mouse button, mapped from the host's 1-based button ordinal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

impl MouseButton {
    /// The undecoded key code the VM expects for this button.
    pub fn code(self) -> u16 {
        match self {
            MouseButton::Left => 0x01,
            MouseButton::Right => 0x02,
            MouseButton::Middle => 0x04,
        }
    }
}

impl TryFrom<u8> for MouseButton {
    type Error = ();

    fn try_from(ordinal: u8) -> Result<Self, Self::Error> {
        match ordinal {
            1 => Ok(MouseButton::Left),
            2 => Ok(MouseButton::Middle),
            3 => Ok(MouseButton::Right),
            _ => Err(()),
        }
    }
}

/// Clamps, de-duplicates, and forwards pointer activity.
#[derive(Debug, Default)]
pub struct PointerTranslator {
    width: u32,
    height: u32,
    /// Last forwarded position; motion to the same clamped point is dropped.
    last: Option<(u16, u16)>,
    focus_held: bool,
    focus_pending: bool,
}

impl PointerTranslator {
    /// Creates a translator with zero bounds; every position clamps to the
    /// origin until [`PointerTranslator::set_bounds`] is called.
    pub fn new() -> Self {
        Self::default()
    }

    /// Updates the display bounds positions are clamped into.
    pub fn set_bounds(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    /// Handles pointer motion.
    pub fn pointer_move<S: EventSink>(&mut self, sink: &mut S, x: i32, y: i32) {
        self.note_activity();
        self.forward_position(sink, x, y);
    }

    /// Handles a button press. `ordinal` is the host's 1-based button
    /// number; ordinals without a logical button are ignored.
    pub fn pointer_press<S: EventSink>(&mut self, sink: &mut S, ordinal: u8, x: i32, y: i32) {
        self.note_activity();
        self.forward_position(sink, x, y);
        if let Ok(button) = MouseButton::try_from(ordinal) {
            sink.undecoded_key_down(button.code());
        } else {
            trace!(ordinal, "ignoring press of unmapped button");
        }
    }

    /// Handles a button release.
    pub fn pointer_release<S: EventSink>(&mut self, sink: &mut S, ordinal: u8, x: i32, y: i32) {
        self.note_activity();
        self.forward_position(sink, x, y);
        if let Ok(button) = MouseButton::try_from(ordinal) {
            sink.undecoded_key_up(button.code());
        } else {
            trace!(ordinal, "ignoring release of unmapped button");
        }
    }

    /// Consumes the focus request raised by the first pointer activity.
    pub fn take_focus_request(&mut self) -> bool {
        std::mem::take(&mut self.focus_pending)
    }

    /// Forwards the clamped position unless it matches the last one sent.
    fn forward_position<S: EventSink>(&mut self, sink: &mut S, x: i32, y: i32) {
        let pos = self.clamp(x, y);
        if self.last == Some(pos) {
            return;
        }
        self.last = Some(pos);
        sink.mouse_moved(pos.0, pos.1);
    }

    fn clamp(&self, x: i32, y: i32) -> (u16, u16) {
        let max_x = self.width.saturating_sub(1).min(u16::MAX as u32) as i32;
        let max_y = self.height.saturating_sub(1).min(u16::MAX as u32) as i32;
        (x.clamp(0, max_x) as u16, y.clamp(0, max_y) as u16)
    }

    fn note_activity(&mut self) {
        if !self.focus_held {
            self.focus_held = true;
            self.focus_pending = true;
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
