//! Drives a scenario through the real bridge components.
//!
//! The runner owns an [`InputBridge`] and a [`FramebufferSync`] plus a
//! simulated VM memory image. Input steps go through the bridge into a
//! recording sink; frame steps write the dirty lines into the memory image
//! and run a sync cycle, counting the redraw and relayout signals the host
//! render loop would have consumed.

use tracing::{debug, info};

use vmdisplay_core::{
    DirtyRange, DisplayGeometry, FramebufferSync, HostInputEvent, InputBridge, RecordingSink,
    VmEvent,
};

use crate::scenario::{Scenario, Step};

/// Everything a replay produced, in order.
#[derive(Debug, Default)]
pub struct ReplayReport {
    /// The VM-facing event stream.
    pub events: Vec<VmEvent>,
    /// Number of frame steps that raised the redraw signal.
    pub redraws: usize,
    /// Geometry values of every relayout request, oldest first.
    pub relayouts: Vec<DisplayGeometry>,
    /// Whether pointer activity requested focus during the replay.
    pub focus_requested: bool,
    /// Final state of the local bitmap after the last frame step.
    pub bitmap: Vec<u8>,
}

/// Replays scenarios against fresh bridge state.
#[derive(Debug, Default)]
pub struct ReplayRunner {
    bridge: InputBridge,
    framebuffer: FramebufferSync,
    sink: RecordingSink,
}

impl ReplayRunner {
    /// Creates a runner with no chord active and an empty framebuffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs every step of `scenario` and collects the results.
    pub fn run(mut self, scenario: &Scenario) -> ReplayReport {
        let display = &scenario.display;
        let geometry = DisplayGeometry::new(display.width, display.height);
        let stride = display.words_per_line();
        self.bridge.set_bounds(display.width, display.height);

        // Simulated VM memory: header words up to `offset`, then the raster.
        let mut memory = vec![0u16; display.offset + stride * display.height as usize];

        let mut report = ReplayReport::default();
        for (index, step) in scenario.steps.iter().enumerate() {
            debug!(index, ?step, "replaying step");
            match *step {
                Step::KeyDown { code, ch } => {
                    self.bridge.handle(&mut self.sink, HostInputEvent::KeyDown { code, ch })
                }
                Step::KeyUp { code, ch } => {
                    self.bridge.handle(&mut self.sink, HostInputEvent::KeyUp { code, ch })
                }
                Step::KeyTyped { ch, code } => {
                    self.bridge.handle(&mut self.sink, HostInputEvent::KeyTyped { ch, code })
                }
                Step::PointerMove { x, y } => {
                    self.bridge.handle(&mut self.sink, HostInputEvent::PointerMove { x, y })
                }
                Step::PointerPress { ordinal, x, y } => self
                    .bridge
                    .handle(&mut self.sink, HostInputEvent::PointerPress { ordinal, x, y }),
                Step::PointerRelease { ordinal, x, y } => self
                    .bridge
                    .handle(&mut self.sink, HostInputEvent::PointerRelease { ordinal, x, y }),
                Step::Frame { first_line, last_line, fill } => {
                    fill_lines(&mut memory, display.offset, stride, first_line, last_line, fill);
                    self.framebuffer.sync(
                        &memory,
                        display.offset,
                        geometry,
                        stride,
                        DirtyRange::new(first_line, last_line),
                    );
                    if self.framebuffer.take_redraw_request() {
                        report.redraws += 1;
                    }
                    if let Some(new_geometry) = self.framebuffer.take_relayout_request() {
                        report.relayouts.push(new_geometry);
                    }
                }
            }
        }

        report.events = self.sink.drain();
        report.focus_requested = self.bridge.take_focus_request();
        report.bitmap = self.framebuffer.bitmap().to_vec();
        info!(
            events = report.events.len(),
            redraws = report.redraws,
            relayouts = report.relayouts.len(),
            "replay finished"
        );
        report
    }
}

/// Writes `fill` into every word of the lines `first_line..=last_line`,
/// clamped to the mapped memory.
fn fill_lines(
    memory: &mut [u16],
    offset: usize,
    stride: usize,
    first_line: usize,
    last_line: usize,
    fill: u16,
) {
    if first_line > last_line {
        return;
    }
    for line in first_line..=last_line {
        let base = offset + line * stride;
        if base + stride > memory.len() {
            break;
        }
        memory[base..base + stride].fill(fill);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
