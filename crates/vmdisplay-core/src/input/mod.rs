//! Host-input translation: keyboard chord decoding and pointer
//! normalization.
//!
//! The host delivers three independent keyboard notification kinds (physical
//! down, physical up, composed character) plus raw pointer motion and button
//! transitions. None of them align 1:1 with the VM's two-tier protocol;
//! [`KeyTranslator`] and [`PointerTranslator`] reconcile them, and
//! [`InputBridge`] is the single entry point the host event loop dispatches
//! into.

pub mod keyboard;
pub mod pointer;

pub use keyboard::KeyTranslator;
pub use pointer::{MouseButton, PointerTranslator};

use crate::protocol::EventSink;

// ── Key codes and character sentinels ─────────────────────────────────────────

/// Raw code of the Shift key.
pub const VK_SHIFT: u16 = 0x10;
/// Raw code of the Control key.
pub const VK_CONTROL: u16 = 0x11;
/// Raw code of the Alt key.
pub const VK_ALT: u16 = 0x12;
/// Raw code of the Insert key.
pub const VK_INSERT: u16 = 0x2D;

/// Host sentinel meaning "this key event produced no character".
pub const CHAR_NONE: u16 = 0xFFFF;
/// Line feed, the VM's line-ending character.
pub const LINE_FEED: u16 = 0x0A;
/// Carriage return, the host's line-ending character.
pub const CARRIAGE_RETURN: u16 = 0x0D;

// ── Host event dispatch ───────────────────────────────────────────────────────

/// One raw input notification as delivered by the host event loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostInputEvent {
    /// Physical key press; `ch` is the composed character or [`CHAR_NONE`].
    KeyDown { code: u16, ch: u16 },
    /// Physical key release; `ch` mirrors the character of the paired press.
    KeyUp { code: u16, ch: u16 },
    /// Composed-character notification; `code` is 0 unless the host attaches
    /// an extended raw code.
    KeyTyped { ch: u16, code: u16 },
    /// Pointer motion in host surface coordinates (may lie outside the
    /// display during drags).
    PointerMove { x: i32, y: i32 },
    /// Button press; `ordinal` is the host's 1-based button number.
    PointerPress { ordinal: u8, x: i32, y: i32 },
    /// Button release; `ordinal` is the host's 1-based button number.
    PointerRelease { ordinal: u8, x: i32, y: i32 },
}

/// Facade over the keyboard and pointer translators.
///
/// Owns all translation state; the host event loop constructs one bridge per
/// surface and feeds every notification through [`InputBridge::handle`].
#[derive(Debug, Default)]
pub struct InputBridge {
    keyboard: KeyTranslator,
    pointer: PointerTranslator,
}

impl InputBridge {
    /// Creates a bridge with no chord active and no pointer history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Updates the display bounds pointer coordinates are clamped to.
    pub fn set_bounds(&mut self, width: u32, height: u32) {
        self.pointer.set_bounds(width, height);
    }

    /// Translates one host notification into zero or more VM events.
    pub fn handle<S: EventSink>(&mut self, sink: &mut S, event: HostInputEvent) {
        match event {
            HostInputEvent::KeyDown { code, ch } => self.keyboard.key_down(sink, code, ch),
            HostInputEvent::KeyUp { code, ch } => self.keyboard.key_up(sink, code, ch),
            HostInputEvent::KeyTyped { ch, code } => self.keyboard.key_typed(sink, ch, code),
            HostInputEvent::PointerMove { x, y } => self.pointer.pointer_move(sink, x, y),
            HostInputEvent::PointerPress { ordinal, x, y } => {
                self.pointer.pointer_press(sink, ordinal, x, y)
            }
            HostInputEvent::PointerRelease { ordinal, x, y } => {
                self.pointer.pointer_release(sink, ordinal, x, y)
            }
        }
    }

    /// Consumes the pending focus request raised by first pointer activity.
    pub fn take_focus_request(&mut self) -> bool {
        self.pointer.take_focus_request()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
