use core::fmt::Write;

use embedded_graphics::{
    mono_font::{MonoTextStyle, MonoTextStyleBuilder, ascii::FONT_5X8},
    pixelcolor::Rgb565,
    prelude::*,
    primitives::{PrimitiveStyle, Rectangle},
    text::{Alignment, Baseline, Text, TextStyle, TextStyleBuilder},
};

use crate::ui::curve::{LATE_RED, segment_color};
use crate::units::from_milli;

// Layout constants
pub const SEGMENTS: u32 = 20;
const BAR_X: i32 = 8;
const BLOCK_SIZE: Size = Size::new(4, 9);
const BLOCK_GAP: i32 = 1;
const AMPS_X: i32 = 125;
const VOLTS_X: i32 = 165;
const VALUE_SIZE: Size = Size::new(35, 9);
const VALUE_TEXT_END: i32 = 25;
const UNIT_TEXT_START: i32 = 27;
const BADGE_X: i32 = 205;
const BADGE_SIZE: Size = Size::new(35, 9);
const BADGE_TEXT_X: i32 = 3;
const TEXT_TOP: i32 = 1;
const AMPS_DECIMALS: usize = 2;
const VOLTS_DECIMALS: usize = 1;

// Colours
pub const DARK_GREY: Rgb565 = Rgb565::new(15, 31, 15);
pub const PEAK_COLOR: Rgb565 = Rgb565::CYAN;

// Styles
const LABEL_STYLE: MonoTextStyle<'static, Rgb565> = MonoTextStyleBuilder::new()
    .font(&FONT_5X8)
    .text_color(Rgb565::WHITE)
    .build();
const RIGHT_ALIGNED: TextStyle = TextStyleBuilder::new()
    .baseline(Baseline::Top)
    .alignment(Alignment::Right)
    .build();
const LEFT_ALIGNED: TextStyle = TextStyleBuilder::new()
    .baseline(Baseline::Top)
    .alignment(Alignment::Left)
    .build();

/// Fill colour of the active blocks.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ColorScheme {
    SolidRed,
    SolidGreen,
    #[default]
    GreenToRed,
}

/// Status badge shown at the end of an output row.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MeterState {
    NotAvailable,
    Off,
    On,
    Alert,
}

impl MeterState {
    const fn badge(&self) -> (&'static str, Rgb565, Rgb565) {
        match self {
            MeterState::NotAvailable => ("N/A", DARK_GREY, Rgb565::WHITE),
            MeterState::Off => ("OFF", DARK_GREY, Rgb565::WHITE),
            MeterState::On => ("ON", Rgb565::GREEN, Rgb565::BLACK),
            MeterState::Alert => ("ALERT", Rgb565::RED, Rgb565::WHITE),
        }
    }

    /// Entering these states forgets the peak.
    const fn resets_peak(&self) -> bool {
        matches!(self, MeterState::NotAvailable | MeterState::Off)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RowLabel {
    /// 1-based output index
    Output(u8),
    Total,
}

/// Number of active blocks for `value` against `max_value` out of `segments`.
pub fn segment_count(value: f32, max_value: f32, segments: u32) -> u32 {
    if max_value.is_nan() || max_value <= 0.0 {
        return 0;
    }
    let level = libm::floorf(segments as f32 * value / max_value + 0.9);
    if level > 0.0 { level as u32 } else { 0 }
}

/// Left edge of block `block` (1-based).
pub const fn block_x(block: u32) -> i32 {
    BAR_X + block as i32 * (BLOCK_SIZE.width as i32 + BLOCK_GAP)
}

/// One horizontal bar row: label, segmented bar with peak marker, amps and
/// volts readouts and a status badge.
///
/// The total row only has the bar and the amps readout.
#[derive(Debug, Clone)]
pub struct LinearMeter {
    y: i32,
    label: RowLabel,
    max_value: f32,
    scheme: ColorScheme,
    state: MeterState,
    peak: Option<u32>,
}

impl LinearMeter {
    pub const fn new(y: i32, label: RowLabel, max_value: f32) -> Self {
        Self {
            y,
            label,
            max_value,
            scheme: ColorScheme::GreenToRed,
            state: MeterState::NotAvailable,
            peak: None,
        }
    }

    pub fn with_scheme(mut self, scheme: ColorScheme) -> Self {
        self.scheme = scheme;
        self
    }

    pub fn y(&self) -> i32 {
        self.y
    }

    pub fn state(&self) -> MeterState {
        self.state
    }

    /// Highest block count drawn since the last reset, `None` when nothing was drawn.
    pub fn peak(&self) -> Option<u32> {
        self.peak
    }

    pub fn max_value(&self) -> f32 {
        self.max_value
    }

    /// Re-scales the bar, takes effect on the next value.
    pub fn set_max_value(&mut self, max_value: f32) {
        self.max_value = max_value;
    }

    fn is_output(&self) -> bool {
        matches!(self.label, RowLabel::Output(_))
    }

    /// Draws the complete row with a zero reading.
    pub fn begin<D>(&mut self, target: &mut D, state: MeterState)
    where
        D: DrawTarget<Color = Rgb565>,
    {
        self.draw_label(target);
        self.set_state(target, state);
        self.set_value(target, 0.0, Some(0.0));
    }

    /// Peak is forgotten only on a transition into N/A or OFF.
    pub fn set_state<D>(&mut self, target: &mut D, state: MeterState)
    where
        D: DrawTarget<Color = Rgb565>,
    {
        if state.resets_peak() && self.state != state {
            self.peak = None;
        }
        self.state = state;
        if self.is_output() {
            self.draw_badge(target);
        }
    }

    /// Redraws the bar and readouts. `millivolts` is ignored on the total row
    /// and when not finite.
    pub fn set_value<D>(&mut self, target: &mut D, milliamps: f32, millivolts: Option<f32>)
    where
        D: DrawTarget<Color = Rgb565>,
    {
        if self.state == MeterState::Alert && self.is_output() {
            self.draw_blocks(target, |_| Rgb565::RED);
        } else {
            self.draw_meter(target, milliamps);
        }

        self.draw_value(target, AMPS_X, from_milli(milliamps), AMPS_DECIMALS, "A");
        if let Some(mv) = millivolts.filter(|mv| mv.is_finite() && self.is_output()) {
            self.draw_value(target, VOLTS_X, from_milli(mv), VOLTS_DECIMALS, "V");
        }
    }

    fn draw_meter<D>(&mut self, target: &mut D, value: f32)
    where
        D: DrawTarget<Color = Rgb565>,
    {
        let active = segment_count(value, self.max_value, SEGMENTS);
        let peak = self.peak.map_or(active, |peak| peak.max(active));
        self.peak = Some(peak);

        let scheme = self.scheme;
        self.draw_blocks(target, |block| {
            if value > 0.0 && block <= active {
                match scheme {
                    ColorScheme::SolidRed => Rgb565::RED,
                    ColorScheme::SolidGreen => Rgb565::GREEN,
                    ColorScheme::GreenToRed => segment_color(block, SEGMENTS, LATE_RED),
                }
            } else if block == peak {
                PEAK_COLOR
            } else {
                DARK_GREY
            }
        });
    }

    fn draw_blocks<D, F>(&self, target: &mut D, color_of: F)
    where
        D: DrawTarget<Color = Rgb565>,
        F: Fn(u32) -> Rgb565,
    {
        for block in 1..=SEGMENTS {
            Rectangle::new(Point::new(block_x(block), self.y), BLOCK_SIZE)
                .into_styled(PrimitiveStyle::with_fill(color_of(block)))
                .draw(target)
                .ok();
        }
    }

    fn draw_label<D>(&self, target: &mut D)
    where
        D: DrawTarget<Color = Rgb565>,
    {
        let mut buffer = heapless::String::<4>::new();
        match self.label {
            RowLabel::Output(index) => write!(buffer, "{}", index).ok(),
            RowLabel::Total => buffer.push('T').ok(),
        };
        Text::with_text_style(
            &buffer,
            Point::new(0, self.y + TEXT_TOP),
            LABEL_STYLE,
            LEFT_ALIGNED,
        )
        .draw(target)
        .ok();
    }

    fn draw_value<D>(&self, target: &mut D, x: i32, value: f32, decimals: usize, unit: &str)
    where
        D: DrawTarget<Color = Rgb565>,
    {
        Rectangle::new(Point::new(x, self.y), VALUE_SIZE)
            .into_styled(PrimitiveStyle::with_fill(Rgb565::BLACK))
            .draw(target)
            .ok();

        let mut buffer = heapless::String::<16>::new();
        write!(buffer, "{:.*}", decimals, value).ok();
        Text::with_text_style(
            &buffer,
            Point::new(x + VALUE_TEXT_END, self.y + TEXT_TOP),
            LABEL_STYLE,
            RIGHT_ALIGNED,
        )
        .draw(target)
        .ok();
        Text::with_text_style(
            unit,
            Point::new(x + UNIT_TEXT_START, self.y + TEXT_TOP),
            LABEL_STYLE,
            LEFT_ALIGNED,
        )
        .draw(target)
        .ok();
    }

    fn draw_badge<D>(&self, target: &mut D)
    where
        D: DrawTarget<Color = Rgb565>,
    {
        let (text, background, foreground) = self.state.badge();
        Rectangle::new(Point::new(BADGE_X, self.y), BADGE_SIZE)
            .into_styled(PrimitiveStyle::with_fill(background))
            .draw(target)
            .ok();
        Text::with_text_style(
            text,
            Point::new(BADGE_X + BADGE_TEXT_X, self.y + TEXT_TOP),
            MonoTextStyle::new(&FONT_5X8, foreground),
            LEFT_ALIGNED,
        )
        .draw(target)
        .ok();
    }
}
