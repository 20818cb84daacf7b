//! Curved range mapping and the green-to-red segment palette.

use embedded_graphics::pixelcolor::Rgb565;

/// Curve shape used by the meter: keeps the bar green for longer and only turns
/// red close to the end.
pub const LATE_RED: f32 = -5.0;

/// Spectrum position of pure green, 0 is pure red.
const SPECTRUM_GREEN: f32 = 63.0;

/// Maps `input` from `[original_min, original_max]` onto `[new_begin, new_end]`
/// along a logarithmic curve.
///
/// `curve` is clamped to `-10..=10`: 0 is linear, negative values weight the low
/// end of the output, positive values the high end. `new_end` may be smaller
/// than `new_begin`, the result is then mirrored. An inverted source range maps
/// to 0 and an empty one to `new_begin`.
pub fn fscale(
    input: f32,
    original_min: f32,
    original_max: f32,
    new_begin: f32,
    new_end: f32,
    curve: f32,
) -> f32 {
    if original_min > original_max {
        return 0.0;
    }
    let original_range = original_max - original_min;
    if original_range == 0.0 {
        return new_begin;
    }

    let exponent = libm::powf(10.0, -0.1 * curve.clamp(-10.0, 10.0));
    let input = input.clamp(original_min, original_max);
    let normalized = (input - original_min) / original_range;
    let warped = libm::powf(normalized, exponent);

    if new_end > new_begin {
        new_begin + warped * (new_end - new_begin)
    } else {
        new_begin - warped * (new_begin - new_end)
    }
}

/// Spectrum colour for `spectrum` (taken modulo 192): 0 is red, 31 yellow,
/// 63 green. Anything past green is black.
pub const fn rainbow_color(spectrum: u8) -> Rgb565 {
    let spectrum = spectrum % 192;
    let sector = spectrum >> 5;
    let amplitude = spectrum & 0x1F;

    let (red, green) = match sector {
        0 => (0x1F, amplitude),
        1 => (0x1F - amplitude, 0x1F),
        _ => (0, 0),
    };
    // Green is only 5 bits wide here, placed at the top of the 6-bit channel
    Rgb565::new(red, green << 1, 0)
}

/// Colour of block `block` out of `segments` for the green-to-red scheme.
pub fn segment_color(block: u32, segments: u32, curve: f32) -> Rgb565 {
    let spectrum = fscale(block as f32, 0.0, segments as f32, SPECTRUM_GREEN, 0.0, curve);
    rainbow_color(spectrum as u8)
}
