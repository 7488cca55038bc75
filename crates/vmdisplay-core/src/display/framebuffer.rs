//! Dirty-range synchronization of the VM's 1-bpp framebuffer into a local
//! packed bitmap.
//!
//! The VM renders into its own memory as a sequence of 16-bit words,
//! `raster_stride` words per scan line, one bit per pixel. After each VM
//! render cycle the host is told which inclusive line interval changed, and
//! [`FramebufferSync::sync`] copies exactly those lines into the local
//! backing store. The VM's word polarity is the opposite of the local
//! bitmap's "set = background" convention, so every copied word is inverted.
//!
//! The VM writes its memory from another thread; no locking is performed
//! here. A torn read shows stale pixels for at most one refresh cycle and is
//! corrected by the next dirty range.
//!
//! Redraw scheduling is decoupled from the copy: `sync` raises a
//! redraw-requested flag, and the host render loop consumes it via
//! [`FramebufferSync::take_redraw_request`] whenever it next runs.

use tracing::{debug, trace};

use crate::domain::geometry::{DirtyRange, DisplayGeometry};

/// Synchronizes dirty scan lines from VM memory into a local packed bitmap.
#[derive(Debug, Default)]
pub struct FramebufferSync {
    geometry: DisplayGeometry,
    raster_stride: usize,
    /// Packed 1-bpp backing store; two bytes per source word, row-major.
    bitmap: Vec<u8>,
    redraw_requested: bool,
    pending_relayout: Option<DisplayGeometry>,
}

impl FramebufferSync {
    /// Creates a sync with no known geometry; the first `sync` call
    /// establishes it.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies the dirty lines of `source` into the backing bitmap.
    ///
    /// `source` is the VM memory; `offset` is the word index of the first
    /// scan line of display data. `offset < 1` or an empty buffer means the
    /// VM has not attached a display yet, a silent no-op. `raster_stride`
    /// is the number of 16-bit words per scan line. The `range` is the
    /// inclusive line interval the VM reports as changed; it is clamped into
    /// the display bounds, and overridden with a full-frame range when the
    /// geometry changed since the last call.
    pub fn sync(
        &mut self,
        source: &[u16],
        offset: usize,
        geometry: DisplayGeometry,
        raster_stride: usize,
        range: DirtyRange,
    ) {
        if offset < 1 || source.is_empty() {
            trace!("sync skipped: no display attached yet");
            return;
        }

        let mut range = range;
        if geometry != self.geometry {
            debug!(
                width = geometry.width,
                height = geometry.height,
                "display geometry changed, forcing full-frame copy"
            );
            self.geometry = geometry;
            self.pending_relayout = Some(geometry);
            range = DirtyRange::full_frame(geometry.height);
        }
        self.raster_stride = raster_stride;

        let row_bytes = raster_stride * 2;
        let required = geometry.height as usize * row_bytes;
        if self.bitmap.len() != required {
            self.bitmap = vec![0; required];
        }

        let range = match range.clamp_to(geometry.height) {
            Some(r) => r,
            None => return,
        };

        let mut words_copied = 0usize;
        for line in range.first_line..=range.last_line {
            let src_base = offset + line * raster_stride;
            if src_base + raster_stride > source.len() {
                // The reported range extends past the mapped VM memory;
                // stop at the last complete line.
                break;
            }
            let dst_base = line * row_bytes;
            for i in 0..raster_stride {
                // The VM's word polarity is the opposite of the bitmap's.
                let word = !source[src_base + i];
                self.bitmap[dst_base + i * 2] = (word >> 8) as u8;
                self.bitmap[dst_base + i * 2 + 1] = word as u8;
            }
            words_copied += raster_stride;
        }

        if words_copied > 0 {
            self.redraw_requested = true;
        }
        trace!(
            first_line = range.first_line,
            last_line = range.last_line,
            words_copied,
            "framebuffer sync"
        );
    }

    /// Current display geometry.
    pub fn geometry(&self) -> DisplayGeometry {
        self.geometry
    }

    /// Words per scan line of the backing store.
    pub fn raster_stride(&self) -> usize {
        self.raster_stride
    }

    /// The packed 1-bpp backing store, two bytes per source word, row-major.
    pub fn bitmap(&self) -> &[u8] {
        &self.bitmap
    }

    /// Consumes the redraw-requested signal.
    ///
    /// The host render loop polls this; a `true` return means at least one
    /// word was copied since the last poll and the surface should be
    /// repainted.
    pub fn take_redraw_request(&mut self) -> bool {
        std::mem::take(&mut self.redraw_requested)
    }

    /// Consumes the pending relayout request raised by a geometry change.
    pub fn take_relayout_request(&mut self) -> Option<DisplayGeometry> {
        self.pending_relayout.take()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds VM memory for `height` lines of `stride` words, all set to
    /// `fill`, preceded by `offset` words of non-display data.
    fn make_source(offset: usize, stride: usize, height: usize, fill: u16) -> Vec<u16> {
        let mut words = vec![0xAAAA; offset];
        words.extend(std::iter::repeat(fill).take(stride * height));
        words
    }

    fn geo(w: u32, h: u32) -> DisplayGeometry {
        DisplayGeometry::new(w, h)
    }

    #[test]
    fn test_sync_is_noop_when_offset_is_zero() {
        // Arrange
        let mut fb = FramebufferSync::new();
        let source = make_source(0, 2, 4, 0x0000);

        // Act
        fb.sync(&source, 0, geo(32, 4), 2, DirtyRange::new(0, 3));

        // Assert – nothing copied, no redraw
        assert!(fb.bitmap().is_empty());
        assert!(!fb.take_redraw_request());
    }

    #[test]
    fn test_sync_is_noop_when_source_is_empty() {
        let mut fb = FramebufferSync::new();
        fb.sync(&[], 1, geo(32, 4), 2, DirtyRange::new(0, 3));
        assert!(fb.bitmap().is_empty());
        assert!(!fb.take_redraw_request());
    }

    #[test]
    fn test_sync_inverts_source_words_into_two_bytes() {
        // Arrange: one line of two words
        let mut fb = FramebufferSync::new();
        let mut source = make_source(1, 2, 1, 0x0000);
        source[1] = 0xF0F0;
        source[2] = 0x00FF;

        // Act
        fb.sync(&source, 1, geo(32, 1), 2, DirtyRange::new(0, 0));

        // Assert – each word inverted, high byte first
        assert_eq!(fb.bitmap(), &[0x0F, 0x0F, 0xFF, 0x00]);
    }

    #[test]
    fn test_sync_copies_only_lines_within_dirty_range() {
        // Arrange: 3 lines of 1 word, all zero source words
        let mut fb = FramebufferSync::new();
        let source = make_source(1, 1, 3, 0x0000);
        // Establish geometry first (full-frame copy), then clear the signal.
        fb.sync(&source, 1, geo(16, 3), 1, DirtyRange::new(0, 2));
        fb.take_redraw_request();

        // Act – re-sync only line 1 from changed source words
        let mut changed = source.clone();
        changed[1] = 0xFFFF; // line 0 – outside the range, must not be copied
        changed[2] = 0xFFFF; // line 1
        fb.sync(&changed, 1, geo(16, 3), 1, DirtyRange::new(1, 1));

        // Assert – line 0 keeps the inverted old word, line 1 has the new one
        assert_eq!(&fb.bitmap()[0..2], &[0xFF, 0xFF], "line 0 untouched");
        assert_eq!(&fb.bitmap()[2..4], &[0x00, 0x00], "line 1 recopied");
        assert!(fb.take_redraw_request());
    }

    #[test]
    fn test_sync_with_empty_range_copies_nothing_and_requests_no_redraw() {
        // Arrange – geometry established beforehand
        let mut fb = FramebufferSync::new();
        let source = make_source(1, 1, 3, 0x0000);
        fb.sync(&source, 1, geo(16, 3), 1, DirtyRange::new(0, 2));
        fb.take_redraw_request();
        fb.take_relayout_request();

        // Act – inverted range
        fb.sync(&source, 1, geo(16, 3), 1, DirtyRange::new(2, 0));

        // Assert
        assert!(!fb.take_redraw_request());
    }

    #[test]
    fn test_geometry_change_forces_full_frame_and_requests_relayout() {
        // Arrange: establish 2-line geometry
        let mut fb = FramebufferSync::new();
        let source = make_source(1, 1, 4, 0x0000);
        fb.sync(&source, 1, geo(16, 2), 1, DirtyRange::new(0, 1));
        fb.take_redraw_request();
        fb.take_relayout_request();

        // Act: grow to 4 lines while reporting an empty caller range
        fb.sync(&source, 1, geo(16, 4), 1, DirtyRange::new(3, 0));

        // Assert – the override copied the whole frame anyway
        assert_eq!(fb.geometry(), geo(16, 4));
        assert_eq!(fb.take_relayout_request(), Some(geo(16, 4)));
        assert!(fb.take_redraw_request(), "full-frame copy must request redraw");
        assert_eq!(fb.bitmap().len(), 8);
        assert!(fb.bitmap().iter().all(|&b| b == 0xFF), "zero words invert to set bits");
    }

    #[test]
    fn test_geometry_change_yields_exactly_one_redraw_signal() {
        // Arrange
        let mut fb = FramebufferSync::new();
        let source = make_source(1, 1, 2, 0x0000);

        // Act
        fb.sync(&source, 1, geo(16, 2), 1, DirtyRange::new(0, 1));

        // Assert – one signal, consumed once
        assert!(fb.take_redraw_request());
        assert!(!fb.take_redraw_request());
    }

    #[test]
    fn test_sync_clamps_range_extending_past_display_height() {
        // Arrange
        let mut fb = FramebufferSync::new();
        let source = make_source(1, 1, 2, 0x0F0F);
        fb.sync(&source, 1, geo(16, 2), 1, DirtyRange::new(0, 1));
        fb.take_redraw_request();

        // Act – last_line far beyond the display; must clamp, not panic
        fb.sync(&source, 1, geo(16, 2), 1, DirtyRange::new(0, 1000));

        // Assert
        assert!(fb.take_redraw_request());
        assert_eq!(fb.bitmap(), &[0xF0, 0xF0, 0xF0, 0xF0]);
    }

    #[test]
    fn test_sync_stops_at_end_of_mapped_source_memory() {
        // Arrange: geometry claims 4 lines but the source holds only 2
        let mut fb = FramebufferSync::new();
        let source = make_source(1, 1, 2, 0x0000);

        // Act
        fb.sync(&source, 1, geo(16, 4), 1, DirtyRange::new(0, 3));

        // Assert – the two complete lines were copied, the rest left blank
        assert_eq!(&fb.bitmap()[0..4], &[0xFF, 0xFF, 0xFF, 0xFF]);
        assert_eq!(&fb.bitmap()[4..8], &[0x00, 0x00, 0x00, 0x00]);
        assert!(fb.take_redraw_request());
    }
}
