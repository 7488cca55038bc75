//! # vmdisplay-core
//!
//! Core library of the VM display bridge: framebuffer synchronization, the
//! cursor-shape cache, and the keyboard/pointer input decoders.
//!
//! This crate is pure logic. It has zero dependencies on OS APIs, UI
//! frameworks, or threads; the host binary wires it to a real window.
//!
//! # Architecture overview
//!
//! The bridge sits between a legacy virtual machine and the host windowing
//! environment. The VM renders a 1-bit-per-pixel display into its own memory
//! and consumes a two-tier input protocol (raw modifier/button transitions
//! plus fully decoded characters). The host delivers pixels the other way
//! and raw input notifications that do not line up with that protocol.
//!
//! This crate defines:
//!
//! - **`protocol`** – The VM-facing event stream: [`VmEvent`], the
//!   [`EventSink`] push interface, and a recording sink for tests and the
//!   replay harness.
//!
//! - **`domain`** – Pure geometry entities: display dimensions and the
//!   inclusive dirty-line ranges the VM reports after each render cycle.
//!
//! - **`display`** – The VM-to-host direction. [`FramebufferSync`] copies
//!   dirty scan lines out of VM memory (inverting word polarity) and raises
//!   redraw/relayout signals; [`CursorCache`] keeps one platform cursor per
//!   distinct pointer shape.
//!
//! - **`input`** – The host-to-VM direction. [`KeyTranslator`] reconciles
//!   the host's three keyboard notification kinds into ordered chord events;
//!   [`PointerTranslator`] clamps and de-duplicates pointer activity;
//!   [`InputBridge`] is the facade the host event loop dispatches into.

pub mod display;
pub mod domain;
pub mod input;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `vmdisplay_core::FramebufferSync` instead of the full module path.
pub use display::cursor::{CursorCache, CursorHost, CursorImage, CursorShape};
pub use display::framebuffer::FramebufferSync;
pub use domain::geometry::{DirtyRange, DisplayGeometry};
pub use input::{HostInputEvent, InputBridge, KeyTranslator, MouseButton, PointerTranslator};
pub use protocol::{EventSink, RecordingSink, VmEvent};
