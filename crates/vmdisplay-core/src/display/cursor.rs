//! Content-addressed cache of custom pointer shapes.
//!
//! The VM describes its pointer as a 16×16 1-bpp mask plus a hotspot.
//! Creating a platform cursor object is comparatively expensive and hosts
//! bound how many may exist, so the bridge keeps one platform handle per
//! distinct (shape, hotspot) pair and reuses it on every later request.
//!
//! The cache is keyed by a combined content hash over the mask bits and the
//! hotspot; a full-equality check guards against hash collisions. Two shapes
//! with identical bits but different hotspots are distinct entries.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use tracing::{debug, trace};

/// Number of rows and columns in a VM pointer shape.
pub const SHAPE_SIZE: usize = 16;

/// A VM pointer shape: 16 rows of 16 bits, MSB leftmost, plus a hotspot.
///
/// A set bit denotes a foreground pixel. The hotspot is clamped into
/// `[0, 15]` on construction; out-of-range values are never an error.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CursorShape {
    /// Mask rows, top to bottom; bit 15 of each word is the leftmost pixel.
    pub rows: [u16; SHAPE_SIZE],
    /// Hotspot column in `[0, 15]`.
    pub hotspot_x: u8,
    /// Hotspot row in `[0, 15]`.
    pub hotspot_y: u8,
}

impl CursorShape {
    /// Creates a shape, clamping the hotspot into the 16×16 grid.
    pub fn new(rows: [u16; SHAPE_SIZE], hotspot_x: u8, hotspot_y: u8) -> Self {
        Self {
            rows,
            hotspot_x: hotspot_x.min(SHAPE_SIZE as u8 - 1),
            hotspot_y: hotspot_y.min(SHAPE_SIZE as u8 - 1),
        }
    }

    /// Combined hash over mask content and hotspot.
    fn content_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}

/// Square RGBA image a platform cursor is built from.
///
/// Foreground pixels are fully opaque black; everything else, including the
/// padding beyond the 16×16 source shape, is fully transparent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorImage {
    size: u32,
    rgba: Vec<u8>,
}

impl CursorImage {
    fn new(size: u32) -> Self {
        Self { size, rgba: vec![0; (size * size * 4) as usize] }
    }

    fn set_foreground(&mut self, x: u32, y: u32) {
        let i = ((y * self.size + x) * 4) as usize;
        self.rgba[i..i + 4].copy_from_slice(&[0x00, 0x00, 0x00, 0xFF]);
    }

    /// Edge length in pixels.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Row-major RGBA pixel data, 4 bytes per pixel.
    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }

    /// Returns `true` when the pixel at (x, y) is a foreground pixel.
    pub fn is_foreground(&self, x: u32, y: u32) -> bool {
        let i = ((y * self.size + x) * 4) as usize;
        self.rgba[i + 3] == 0xFF
    }
}

/// Host-side cursor facilities the cache delegates platform work to.
///
/// The production implementation wraps the windowing toolkit; tests use a
/// recording implementation.
pub trait CursorHost {
    /// Opaque, cheaply clonable handle to a created platform cursor.
    type Handle: Clone;

    /// Smallest cursor edge length the host supports (16, 32, 48, 64, …).
    /// Queried once when the cache is built and fixed thereafter.
    fn minimum_cursor_size(&self) -> u32;

    /// Builds a platform cursor from a rendered image and hotspot.
    fn create_cursor(&mut self, image: &CursorImage, hotspot_x: u8, hotspot_y: u8) -> Self::Handle;

    /// Makes `handle` the active cursor for the bridged surface.
    fn set_cursor(&mut self, handle: &Self::Handle);
}

/// One cache entry: the shape it was built from and the platform handle.
struct CachedCursor<H> {
    shape: CursorShape,
    handle: H,
}

/// Content-addressed cache of platform cursors.
///
/// Growth is unbounded in principle but bounded in practice by the small
/// number of distinct cursors an application installs.
pub struct CursorCache<H: CursorHost> {
    /// Content hash → entries with that hash (collision bucket).
    entries: HashMap<u64, Vec<CachedCursor<H::Handle>>>,
    cursor_size: u32,
}

impl<H: CursorHost> CursorCache<H> {
    /// Builds a cache, fixing the cursor dimensions to the host's minimum
    /// supported size (never below the 16×16 source shape).
    pub fn new(host: &H) -> Self {
        let cursor_size = host.minimum_cursor_size().max(SHAPE_SIZE as u32);
        Self { entries: HashMap::new(), cursor_size }
    }

    /// Applies `shape` as the active cursor, creating and caching a platform
    /// cursor on first sight of this (shape, hotspot) pair.
    pub fn apply_cursor(&mut self, host: &mut H, shape: &CursorShape) {
        let hash = shape.content_hash();

        if let Some(bucket) = self.entries.get(&hash) {
            // Hash hit: verify full equality before treating it as a match.
            if let Some(entry) = bucket.iter().find(|e| &e.shape == shape) {
                trace!(hash, "cursor cache hit");
                let handle = entry.handle.clone();
                host.set_cursor(&handle);
                return;
            }
        }

        debug!(hash, hotspot_x = shape.hotspot_x, hotspot_y = shape.hotspot_y, "cursor cache miss");
        let image = self.render(shape);
        let handle = host.create_cursor(&image, shape.hotspot_x, shape.hotspot_y);
        self.entries
            .entry(hash)
            .or_default()
            .push(CachedCursor { shape: shape.clone(), handle: handle.clone() });
        host.set_cursor(&handle);
    }

    /// Number of distinct cached (shape, hotspot) pairs.
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    /// Returns `true` when no cursor has been cached yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Renders the 16×16 mask into a host-sized RGBA image, MSB first so a
    /// set source bit becomes an opaque foreground pixel.
    fn render(&self, shape: &CursorShape) -> CursorImage {
        let mut image = CursorImage::new(self.cursor_size);
        for (row, &word) in shape.rows.iter().enumerate() {
            for col in 0..SHAPE_SIZE {
                if word >> (SHAPE_SIZE - 1 - col) & 1 != 0 {
                    image.set_foreground(col as u32, row as u32);
                }
            }
        }
        image
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
