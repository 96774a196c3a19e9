//! Pure time → visual state functions, one per continuous variant.
//! `elapsed_ms` is wall-clock time since the preview was (re)built.

/// Position within the current cycle, in `[0, 1)`.
pub fn cycle_phase(elapsed_ms: f64, cycle_ms: u32) -> f64 {
    if cycle_ms == 0 {
        return 0.0;
    }
    let cycle = cycle_ms as f64;
    elapsed_ms.max(0.0).rem_euclid(cycle) / cycle
}

/// Track translation for the horizontal loop: one full item width per cycle.
pub fn loop_translate(elapsed_ms: f64, cycle_ms: u32, item_width: u32) -> f64 {
    -cycle_phase(elapsed_ms, cycle_ms) * item_width as f64
}

pub fn rotation_degrees(elapsed_ms: f64, cycle_ms: u32) -> f64 {
    cycle_phase(elapsed_ms, cycle_ms) * 360.0
}

/// Falling line as `(y, height)`: shrinks from the top while the phase is
/// below the hold fraction, then holds empty at the bottom.
pub fn falling_line(elapsed_ms: f64, cycle_ms: u32, hold_fraction: f64, length: u32) -> (f64, f64) {
    let length = length as f64;
    let phase = cycle_phase(elapsed_ms, cycle_ms);
    if hold_fraction <= 0.0 || phase >= hold_fraction {
        return (length, 0.0);
    }
    let progress = phase / hold_fraction;
    (length * progress, length * (1.0 - progress))
}

/// Index of the slide on top, advancing once per cycle.
pub fn slideshow_active(elapsed_ms: f64, cycle_ms: u32, count: usize) -> usize {
    if cycle_ms == 0 || count == 0 {
        return 0;
    }
    let completed = (elapsed_ms.max(0.0) / cycle_ms as f64).floor() as usize;
    completed % count
}
