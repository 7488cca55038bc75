//! # vmdisplay-replay
//!
//! Scenario replay harness for the VM display bridge.
//!
//! A scenario is a TOML file describing a display geometry and an ordered
//! list of host-side steps (key and pointer notifications plus framebuffer
//! refresh cycles). The harness feeds the steps through the real
//! `vmdisplay-core` translators and reports the resulting VM event stream
//! and display signals, which makes decoder regressions reproducible from a
//! text file attached to a bug report.

pub mod runner;
pub mod scenario;

pub use runner::{ReplayReport, ReplayRunner};
pub use scenario::{Scenario, ScenarioError, Step};
