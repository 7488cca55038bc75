//! The VM-facing event protocol produced by the bridge.
//!
//! The VM consumes a two-tier input stream. *Undecoded* events carry raw
//! transitions (down/up) for modifier keys and mouse buttons, identified by a
//! 16-bit code. *Decoded* events carry a fully resolved character, ready for
//! the VM's character-input handling. Pointer position updates travel as
//! `mouse_moved` events.
//!
//! [`EventSink`] is the push interface the translators emit into; the host
//! side of the bridge implements it on top of the VM's event queue.
//! [`RecordingSink`] is the in-memory implementation used by tests and by the
//! replay harness.

use serde::{Deserialize, Serialize};

/// One event in the VM-facing stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum VmEvent {
    /// Raw down transition for a modifier key or mouse button.
    UndecodedKeyDown { code: u16 },
    /// Raw up transition for a modifier key or mouse button.
    UndecodedKeyUp { code: u16 },
    /// A fully resolved character.
    DecodedKeyPressed { ch: u16 },
    /// Pointer position update, already clamped to the display bounds.
    MouseMoved { x: u16, y: u16 },
}

/// Push interface for the VM event stream.
///
/// Implementations must not fail: a malformed or surprising event sequence is
/// dropped or normalized by the translators before it reaches the sink, never
/// propagated as an error into the host event loop.
pub trait EventSink {
    /// Forwards a raw down transition (modifier key or mouse button).
    fn undecoded_key_down(&mut self, code: u16);
    /// Forwards a raw up transition (modifier key or mouse button).
    fn undecoded_key_up(&mut self, code: u16);
    /// Forwards a fully resolved character.
    fn decoded_key_pressed(&mut self, ch: u16);
    /// Forwards a clamped pointer position.
    fn mouse_moved(&mut self, x: u16, y: u16);
}

/// An [`EventSink`] that records every event in order.
///
/// Used by unit tests to assert on exact event sequences and by the replay
/// harness to collect the stream for output.
#[derive(Debug, Default)]
pub struct RecordingSink {
    /// All events received so far, oldest first.
    pub events: Vec<VmEvent>,
}

impl RecordingSink {
    /// Creates an empty recording sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns all recorded events, oldest first.
    pub fn drain(&mut self) -> Vec<VmEvent> {
        std::mem::take(&mut self.events)
    }
}

impl EventSink for RecordingSink {
    fn undecoded_key_down(&mut self, code: u16) {
        self.events.push(VmEvent::UndecodedKeyDown { code });
    }

    fn undecoded_key_up(&mut self, code: u16) {
        self.events.push(VmEvent::UndecodedKeyUp { code });
    }

    fn decoded_key_pressed(&mut self, ch: u16) {
        self.events.push(VmEvent::DecodedKeyPressed { ch });
    }

    fn mouse_moved(&mut self, x: u16, y: u16) {
        self.events.push(VmEvent::MouseMoved { x, y });
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_sink_preserves_event_order() {
        // Arrange
        let mut sink = RecordingSink::new();

        // Act
        sink.undecoded_key_down(0x11);
        sink.decoded_key_pressed(b'a' as u16);
        sink.undecoded_key_up(0x11);

        // Assert
        assert_eq!(
            sink.events,
            vec![
                VmEvent::UndecodedKeyDown { code: 0x11 },
                VmEvent::DecodedKeyPressed { ch: b'a' as u16 },
                VmEvent::UndecodedKeyUp { code: 0x11 },
            ]
        );
    }

    #[test]
    fn test_recording_sink_drain_empties_the_sink() {
        // Arrange
        let mut sink = RecordingSink::new();
        sink.mouse_moved(10, 20);

        // Act
        let drained = sink.drain();

        // Assert
        assert_eq!(drained, vec![VmEvent::MouseMoved { x: 10, y: 20 }]);
        assert!(sink.events.is_empty());
    }
}
