//! Criterion benchmarks for the input decoders.
//!
//! Measures the per-notification cost of the keyboard chord machine and the
//! pointer clamp/dedup path. Both run on the host UI thread for every input
//! event, so they must stay in the sub-microsecond class.
//!
//! Run with:
//! ```bash
//! cargo bench --package vmdisplay-core --bench decoder_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use vmdisplay_core::input::{CHAR_NONE, VK_CONTROL, VK_SHIFT};
use vmdisplay_core::{EventSink, KeyTranslator, PointerTranslator};

/// Sink that discards every event; keeps the decoders honest without
/// measuring Vec pushes.
struct NullSink;

impl EventSink for NullSink {
    fn undecoded_key_down(&mut self, _code: u16) {}
    fn undecoded_key_up(&mut self, _code: u16) {}
    fn decoded_key_pressed(&mut self, _ch: u16) {}
    fn mouse_moved(&mut self, _x: u16, _y: u16) {}
}

// ── Keyboard ─────────────────────────────────────────────────────────────────

fn bench_plain_typing(c: &mut Criterion) {
    let mut group = c.benchmark_group("keyboard");

    // One full keystroke outside any chord (down, typed, up)
    group.bench_function("plain_keystroke", |b| {
        let mut kb = KeyTranslator::new();
        let mut sink = NullSink;
        b.iter(|| {
            kb.key_down(&mut sink, black_box(0x41), black_box(b'a' as u16));
            kb.key_typed(&mut sink, black_box(b'a' as u16), 0);
            kb.key_up(&mut sink, black_box(0x41), black_box(b'a' as u16));
        })
    });

    group.finish();
}

fn bench_control_chord(c: &mut Criterion) {
    let mut group = c.benchmark_group("keyboard");

    // Complete Ctrl+letter chord including the modifier bracketing
    group.bench_function("control_chord", |b| {
        let mut kb = KeyTranslator::new();
        let mut sink = NullSink;
        b.iter(|| {
            kb.key_down(&mut sink, VK_CONTROL, CHAR_NONE);
            kb.key_down(&mut sink, black_box(0x41), black_box(b'a' as u16));
            kb.key_up(&mut sink, black_box(0x41), black_box(b'a' as u16));
            kb.key_up(&mut sink, VK_CONTROL, CHAR_NONE);
        })
    });

    // Worst case: both modifiers latched and released in one chord
    group.bench_function("control_shift_chord", |b| {
        let mut kb = KeyTranslator::new();
        let mut sink = NullSink;
        b.iter(|| {
            kb.key_down(&mut sink, VK_CONTROL, CHAR_NONE);
            kb.key_down(&mut sink, VK_SHIFT, CHAR_NONE);
            kb.key_down(&mut sink, black_box(0x41), black_box(b'A' as u16));
            kb.key_up(&mut sink, black_box(0x41), black_box(b'A' as u16));
            kb.key_up(&mut sink, VK_SHIFT, CHAR_NONE);
            kb.key_up(&mut sink, VK_CONTROL, CHAR_NONE);
        })
    });

    group.finish();
}

// ── Pointer ──────────────────────────────────────────────────────────────────

fn bench_pointer_motion(c: &mut Criterion) {
    let mut group = c.benchmark_group("pointer");

    // Alternating positions so the dedup never short-circuits
    group.bench_function("move_distinct", |b| {
        let mut p = PointerTranslator::new();
        p.set_bounds(1024, 768);
        let mut sink = NullSink;
        let mut toggle = 0i32;
        b.iter(|| {
            toggle ^= 1;
            p.pointer_move(&mut sink, black_box(100 + toggle), black_box(200));
        })
    });

    // Repeated identical positions (the dedup fast path)
    group.bench_function("move_duplicate", |b| {
        let mut p = PointerTranslator::new();
        p.set_bounds(1024, 768);
        let mut sink = NullSink;
        b.iter(|| p.pointer_move(&mut sink, black_box(100), black_box(200)))
    });

    group.finish();
}

criterion_group!(benches, bench_plain_typing, bench_control_chord, bench_pointer_motion);
criterion_main!(benches);
