//! The keyboard chord decoder.
//!
//! The host reports three notification kinds for one logical keystroke:
//! physical key-down, physical key-up, and a composed-character ("typed")
//! notification that may arrive for some keys and not others. The VM instead
//! wants raw down/up transitions for modifiers and a single fully decoded
//! character per keystroke. [`KeyTranslator`] reconciles the two.
//!
//! Modifier chording follows a latch discipline: the synthetic Control-down
//! and Shift-down for the active chord are emitted at most once each,
//! immediately before the first decoded character of the chord, Control
//! before Shift. The matching ups are emitted on the physical releases,
//! Shift before Control when a single Control release closes a chord that
//! also latched Shift.
//!
//! Chord tracking is a value type with pure transition methods
//! ([`ChordState`]) so every path is testable without host event objects.

use tracing::{debug, trace};

use super::{CARRIAGE_RETURN, CHAR_NONE, LINE_FEED, VK_ALT, VK_CONTROL, VK_INSERT, VK_SHIFT};
use crate::protocol::EventSink;

/// Capacity of the pressed-key set. More simultaneously held keys than this
/// does not occur on real hardware; the oldest entry is evicted if it does.
const PRESSED_CAPACITY: usize = 16;
/// Capacity of the recently-typed character buffer.
const RECENT_CAPACITY: usize = 8;

// ── Chord state ───────────────────────────────────────────────────────────────

/// Synthetic modifier-down events owed before the next decoded character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct PendingDowns {
    control: bool,
    shift: bool,
}

/// Modifier-up events owed after a physical release, in emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct PendingUps {
    shift: bool,
    control: bool,
}

/// Which modifiers are physically held and which synthetic downs were
/// already forwarded for the current chord.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum ChordState {
    /// No modifier held.
    #[default]
    Idle,
    /// Control held. `sent_shift` survives a Shift release inside the chord
    /// so the closing Control release still reports the Shift-up.
    Control { sent_control: bool, sent_shift: bool },
    /// Shift held, Control not.
    Shift { sent_shift: bool },
    /// Control and Shift both held.
    Both { sent_control: bool, sent_shift: bool },
}

impl ChordState {
    fn is_control(self) -> bool {
        matches!(self, ChordState::Control { .. } | ChordState::Both { .. })
    }

    /// Physical Control press: enter (or re-arm) a control chord.
    fn press_control(self) -> ChordState {
        match self {
            ChordState::Idle => ChordState::Control { sent_control: false, sent_shift: false },
            ChordState::Shift { sent_shift } => {
                ChordState::Both { sent_control: false, sent_shift }
            }
            ChordState::Control { sent_shift, .. } => {
                ChordState::Control { sent_control: false, sent_shift }
            }
            ChordState::Both { sent_shift, .. } => {
                ChordState::Both { sent_control: false, sent_shift }
            }
        }
    }

    /// Physical Shift press.
    fn press_shift(self) -> ChordState {
        match self {
            ChordState::Idle => ChordState::Shift { sent_shift: false },
            ChordState::Control { sent_control, .. } => {
                ChordState::Both { sent_control, sent_shift: false }
            }
            ChordState::Shift { .. } => ChordState::Shift { sent_shift: false },
            ChordState::Both { sent_control, .. } => {
                ChordState::Both { sent_control, sent_shift: false }
            }
        }
    }

    /// Physical Alt press. The host merges Control+Alt into an accelerator
    /// combination, so Alt inside a control chord cancels the chord.
    fn press_alt(self) -> ChordState {
        match self {
            ChordState::Control { .. } => ChordState::Idle,
            ChordState::Both { sent_shift, .. } => ChordState::Shift { sent_shift },
            other => other,
        }
    }

    /// Latches any unsent modifier-downs for the active chord.
    fn latch_pending(self) -> (ChordState, PendingDowns) {
        match self {
            ChordState::Idle => (self, PendingDowns::default()),
            ChordState::Control { sent_control, sent_shift } => (
                ChordState::Control { sent_control: true, sent_shift },
                PendingDowns { control: !sent_control, shift: false },
            ),
            ChordState::Shift { sent_shift } => (
                ChordState::Shift { sent_shift: true },
                PendingDowns { control: false, shift: !sent_shift },
            ),
            ChordState::Both { sent_control, sent_shift } => (
                ChordState::Both { sent_control: true, sent_shift: true },
                PendingDowns { control: !sent_control, shift: !sent_shift },
            ),
        }
    }

    /// Physical Control release: closes the control chord and reports which
    /// modifier-ups to forward, Shift before Control.
    fn release_control(self) -> (ChordState, PendingUps) {
        match self {
            ChordState::Control { sent_control, sent_shift } => {
                (ChordState::Idle, PendingUps { shift: sent_shift, control: sent_control })
            }
            ChordState::Both { sent_control, sent_shift } => (
                ChordState::Shift { sent_shift: false },
                PendingUps { shift: sent_shift, control: sent_control },
            ),
            other => (other, PendingUps::default()),
        }
    }

    /// Physical Shift release. Inside a control chord the latch is kept so
    /// the eventual Control release replays the Shift-up in order.
    fn release_shift(self) -> (ChordState, PendingUps) {
        match self {
            ChordState::Shift { sent_shift } => {
                (ChordState::Idle, PendingUps { shift: sent_shift, control: false })
            }
            ChordState::Both { sent_control, sent_shift } => (
                ChordState::Control { sent_control, sent_shift },
                PendingUps { shift: sent_shift, control: false },
            ),
            other => (other, PendingUps::default()),
        }
    }
}

// ── Bounded sets ──────────────────────────────────────────────────────────────

/// Fixed-capacity insertion-ordered set of 16-bit values.
///
/// The oldest entry is evicted when a new value arrives at capacity, so a
/// pathological input sequence that never delivers releases cannot grow the
/// set without bound.
#[derive(Debug, Default)]
struct BoundedSet<const N: usize> {
    items: Vec<u16>,
}

impl<const N: usize> BoundedSet<N> {
    fn new() -> Self {
        Self { items: Vec::with_capacity(N) }
    }

    /// Inserts `value`; returns `false` when it was already present.
    fn insert(&mut self, value: u16) -> bool {
        if self.items.contains(&value) {
            return false;
        }
        if self.items.len() == N {
            self.items.remove(0);
        }
        self.items.push(value);
        true
    }

    fn remove(&mut self, value: u16) {
        self.items.retain(|&v| v != value);
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.items.len()
    }
}

// ── Character classification ──────────────────────────────────────────────────

/// Diacritical (dead-key) marks the host composes with a following letter.
fn is_dead_key_mark(ch: u16) -> bool {
    matches!(ch, 0x5E | 0x60 | 0x7E | 0xA8 | 0xB4)
}

/// National letters on the host layout occupy the symbol positions the VM's
/// layout expects; outside a control chord they are mapped back.
fn remap_national(ch: u16) -> u16 {
    match ch {
        0xE4 => b'{' as u16,
        0xF6 => b'|' as u16,
        0xFC => b'}' as u16,
        0xC4 => b'[' as u16,
        0xD6 => b'\\' as u16,
        0xDC => b']' as u16,
        0xDF => b'~' as u16,
        other => other,
    }
}

/// Recovers the base letter of a true control character (Ctrl+letter arrives
/// as code points below 32), with fixed corrections for three combinations
/// the host layout miskeys.
fn rederive_control_char(ch: u16) -> u16 {
    let base = (ch + 0x40) as u8;
    match base.to_ascii_lowercase() {
        b'_' => b'-' as u16,
        b':' => b'.' as u16,
        b';' => b',' as u16,
        other => other as u16,
    }
}

// ── Translator ────────────────────────────────────────────────────────────────

/// Reconciles host key-down / key-up / typed notifications into the VM's
/// decoded/undecoded stream.
#[derive(Debug, Default)]
pub struct KeyTranslator {
    chord: ChordState,
    pressed: BoundedSet<PRESSED_CAPACITY>,
    recent: BoundedSet<RECENT_CAPACITY>,
}

impl KeyTranslator {
    /// Creates a translator with no chord active and no keys held.
    pub fn new() -> Self {
        Self::default()
    }

    /// Handles a physical key press. `ch` is the composed character the host
    /// attached to the press, or [`CHAR_NONE`].
    pub fn key_down<S: EventSink>(&mut self, sink: &mut S, code: u16, ch: u16) {
        if !self.pressed.insert(code) {
            trace!(code, "duplicate key-down ignored");
            return;
        }

        match code {
            VK_CONTROL => {
                self.chord = self.chord.press_control();
                return;
            }
            VK_ALT => {
                if self.chord.is_control() {
                    debug!("alt during control chord, cancelling chord");
                }
                self.chord = self.chord.press_alt();
                return;
            }
            VK_SHIFT => {
                self.chord = self.chord.press_shift();
                return;
            }
            _ => {}
        }

        // Dead keys never get a typed-notification of their own; the mark is
        // forwarded right away.
        if ch < 0x80 && is_dead_key_mark(ch) {
            self.forward_decoded(sink, ch);
            return;
        }

        // Insert maps to line feed no matter which chord is active.
        if code == VK_INSERT {
            self.forward_decoded(sink, LINE_FEED);
            return;
        }

        // Control combinations are resolved entirely at key-down since no
        // typed-notification follows them.
        if self.chord.is_control() {
            if ch == CHAR_NONE {
                // Control+digit/symbol produces no printable character; the
                // raw code stands in for it.
                self.forward_decoded(sink, code);
            } else if (0x20..0x80).contains(&ch) {
                self.forward_decoded(sink, ch);
            }
        }
    }

    /// Handles a composed-character notification. `code` is 0 unless the
    /// host attached an extended raw code.
    pub fn key_typed<S: EventSink>(&mut self, sink: &mut S, ch: u16, code: u16) {
        if !self.recent.insert(ch) {
            trace!(ch, "duplicate typed character ignored");
            return;
        }

        // The host and the VM disagree on the line-ending convention.
        let mut ch = match ch {
            LINE_FEED => CARRIAGE_RETURN,
            CARRIAGE_RETURN => LINE_FEED,
            other => other,
        };

        if !self.chord.is_control() {
            ch = remap_national(ch);
        }

        if is_dead_key_mark(ch) || ch > 0x80 {
            return;
        }

        // A true control character (as opposed to a named function key,
        // which carries an extended code) is mapped back to its base letter.
        if self.chord.is_control() && ch < 0x20 && code == 0 {
            ch = rederive_control_char(ch);
        }

        self.forward_decoded(sink, ch);
    }

    /// Handles a physical key release. `ch` mirrors the character delivered
    /// with the paired press so the typed-dedup entry can be evicted.
    pub fn key_up<S: EventSink>(&mut self, sink: &mut S, code: u16, ch: u16) {
        self.pressed.remove(code);
        self.recent.remove(ch);

        let (chord, ups) = match code {
            VK_CONTROL => self.chord.release_control(),
            VK_SHIFT => self.chord.release_shift(),
            _ => return,
        };
        self.chord = chord;
        if ups.shift {
            sink.undecoded_key_up(VK_SHIFT);
        }
        if ups.control {
            sink.undecoded_key_up(VK_CONTROL);
        }
    }

    /// Emits the chord's unsent modifier-downs (Control before Shift, each
    /// once per chord), then the decoded character.
    fn forward_decoded<S: EventSink>(&mut self, sink: &mut S, ch: u16) {
        let (chord, downs) = self.chord.latch_pending();
        self.chord = chord;
        if downs.control {
            sink.undecoded_key_down(VK_CONTROL);
        }
        if downs.shift {
            sink.undecoded_key_down(VK_SHIFT);
        }
        sink.decoded_key_pressed(ch);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
