//! Hand-written doubles for the hardware and transport seams used in unit tests.

use std::boxed::Box;
use std::vec::Vec;

use embedded_graphics::{pixelcolor::Rgb565, prelude::*, primitives::Rectangle};
use embedded_hal::digital::{ErrorType, OutputPin, PinState};

use crate::channels::{ChannelNum, MAX_CHANNELS};
use crate::input::{PortLevels, SwitchInputs};
use crate::messages::{StatusEvent, StatusSink, TelemetryEntry};
use crate::relays::RelayDriver;
use crate::sensors::{RawSample, SampleSource};
use crate::ui::PANEL_SIZE;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MockFault {
    NoDevice,
    Bus,
}

/// Output pin that remembers its last level.
#[derive(Debug, Default)]
pub struct MockPin {
    pub level: Option<PinState>,
    pub writes: usize,
}

impl ErrorType for MockPin {
    type Error = core::convert::Infallible;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.level = Some(PinState::Low);
        self.writes += 1;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.level = Some(PinState::High);
        self.writes += 1;
        Ok(())
    }
}

/// Relay driver recording every level written.
#[derive(Debug, Default)]
pub struct MockRelays {
    writes: Vec<(ChannelNum, PinState)>,
    fail: bool,
}

impl MockRelays {
    pub fn failing() -> Self {
        Self {
            writes: Vec::new(),
            fail: true,
        }
    }

    pub fn writes(&self) -> &[(ChannelNum, PinState)] {
        &self.writes
    }

    pub fn writes_for(&self, channel: ChannelNum) -> Vec<PinState> {
        self.writes
            .iter()
            .filter(|(ch, _)| *ch == channel)
            .map(|(_, level)| *level)
            .collect()
    }
}

impl RelayDriver for MockRelays {
    type Error = MockFault;

    fn write_level(&mut self, channel: ChannelNum, level: PinState) -> Result<(), Self::Error> {
        self.writes.push((channel, level));
        if self.fail {
            Err(MockFault::Bus)
        } else {
            Ok(())
        }
    }
}

/// Sensor bus with a fixed set of fitted sensors and scripted readings.
#[derive(Debug)]
pub struct MockSampleSource {
    present: [bool; MAX_CHANNELS],
    readings: [RawSample; MAX_CHANNELS],
    failing: [bool; MAX_CHANNELS],
    pub alert_limits: [Option<f32>; MAX_CHANNELS],
    pub reads: [usize; MAX_CHANNELS],
}

impl MockSampleSource {
    pub fn with_outputs(outputs: &[ChannelNum]) -> Self {
        let mut present = [false; MAX_CHANNELS];
        for ch in outputs {
            present[*ch as usize] = true;
        }
        Self {
            present,
            readings: [RawSample::new(0.0, 12000.0, 0.0); MAX_CHANNELS],
            failing: [false; MAX_CHANNELS],
            alert_limits: [None; MAX_CHANNELS],
            reads: [0; MAX_CHANNELS],
        }
    }

    pub fn set(&mut self, channel: ChannelNum, sample: RawSample) {
        self.readings[channel as usize] = sample;
    }

    pub fn set_failing(&mut self, channel: ChannelNum, failing: bool) {
        self.failing[channel as usize] = failing;
    }
}

impl SampleSource for MockSampleSource {
    type Error = MockFault;

    fn probe(&mut self, channel: ChannelNum) -> Result<(), Self::Error> {
        if self.present[channel as usize] {
            Ok(())
        } else {
            Err(MockFault::NoDevice)
        }
    }

    fn read(&mut self, channel: ChannelNum) -> Result<RawSample, Self::Error> {
        self.reads[channel as usize] += 1;
        if !self.present[channel as usize] {
            return Err(MockFault::NoDevice);
        }
        if self.failing[channel as usize] {
            return Err(MockFault::Bus);
        }
        Ok(self.readings[channel as usize])
    }

    fn set_alert_limit(&mut self, channel: ChannelNum, limit_ma: f32) -> Result<(), Self::Error> {
        self.alert_limits[channel as usize] = Some(limit_ma);
        Ok(())
    }
}

/// Switch port returning a fixed snapshot.
#[derive(Debug)]
pub struct MockSwitchPort {
    pub levels: PortLevels,
    pub fail: bool,
}

impl MockSwitchPort {
    pub fn new(levels: PortLevels) -> Self {
        Self {
            levels,
            fail: false,
        }
    }
}

impl SwitchInputs for MockSwitchPort {
    type Error = MockFault;

    fn read_port(&mut self) -> Result<PortLevels, Self::Error> {
        if self.fail {
            Err(MockFault::Bus)
        } else {
            Ok(self.levels)
        }
    }
}

/// Sink keeping everything it was asked to publish.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub status: Vec<StatusEvent>,
    pub telemetry: Vec<Vec<TelemetryEntry>>,
    pub attempts: usize,
    reject: bool,
}

impl RecordingSink {
    pub fn rejecting() -> Self {
        Self {
            reject: true,
            ..Self::default()
        }
    }

    pub fn take_status(&mut self) -> Vec<StatusEvent> {
        core::mem::take(&mut self.status)
    }
}

impl StatusSink for RecordingSink {
    type Error = MockFault;

    fn publish_status(&mut self, event: &StatusEvent) -> Result<(), Self::Error> {
        self.attempts += 1;
        if self.reject {
            return Err(MockFault::Bus);
        }
        self.status.push(*event);
        Ok(())
    }

    fn publish_telemetry(&mut self, batch: &[TelemetryEntry]) -> Result<(), Self::Error> {
        self.attempts += 1;
        if self.reject {
            return Err(MockFault::Bus);
        }
        self.telemetry.push(batch.to_vec());
        Ok(())
    }
}

const FRAME_WIDTH: usize = PANEL_SIZE.width as usize;
const FRAME_HEIGHT: usize = PANEL_SIZE.height as usize;

/// 240x240 in-memory display.
pub struct FrameBuffer {
    pixels: Box<[Rgb565; FRAME_WIDTH * FRAME_HEIGHT]>,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self {
            pixels: Box::new([Rgb565::BLACK; FRAME_WIDTH * FRAME_HEIGHT]),
        }
    }

    pub fn pixel(&self, point: Point) -> Rgb565 {
        self.pixels[point.y as usize * FRAME_WIDTH + point.x as usize]
    }

    pub fn count_in(&self, area: Rectangle, color: Rgb565) -> usize {
        area.points()
            .filter(|point| self.pixel(*point) == color)
            .count()
    }
}

impl OriginDimensions for FrameBuffer {
    fn size(&self) -> Size {
        PANEL_SIZE
    }
}

impl DrawTarget for FrameBuffer {
    type Color = Rgb565;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if point.x >= 0
                && point.y >= 0
                && (point.x as usize) < FRAME_WIDTH
                && (point.y as usize) < FRAME_HEIGHT
            {
                self.pixels[point.y as usize * FRAME_WIDTH + point.x as usize] = color;
            }
        }
        Ok(())
    }
}
