use embedded_graphics::{pixelcolor::Rgb565, prelude::*};

use crate::channels::{Channel, ChannelBank, ChannelNum, ChannelState, MAX_CHANNELS, output_index};
use crate::ui::linear_meter::{LinearMeter, MeterState, RowLabel};

// Layout constants
pub const PANEL_SIZE: Size = Size::new(240, 240);
pub const ROW_TOP: i32 = 1;
pub const ROW_PITCH: i32 = 14;

pub const fn row_y(row: usize) -> i32 {
    ROW_TOP + row as i32 * ROW_PITCH
}

pub const fn meter_state(state: ChannelState) -> MeterState {
    match state {
        ChannelState::Unknown => MeterState::NotAvailable,
        ChannelState::Normal => MeterState::On,
        ChannelState::Off => MeterState::Off,
        ChannelState::Alerted(_) => MeterState::Alert,
    }
}

/// One meter row per output slot plus the total row underneath.
#[derive(Debug, Clone)]
pub struct MeterPanel {
    rows: [LinearMeter; MAX_CHANNELS],
    total: LinearMeter,
}

impl MeterPanel {
    pub fn new(channel_limit_ma: f32, total_limit_ma: f32) -> Self {
        Self {
            rows: core::array::from_fn(|row| {
                LinearMeter::new(
                    row_y(row),
                    RowLabel::Output(output_index(row as ChannelNum)),
                    channel_limit_ma,
                )
            }),
            total: LinearMeter::new(row_y(MAX_CHANNELS), RowLabel::Total, total_limit_ma),
        }
    }

    pub fn row(&self, channel: ChannelNum) -> Option<&LinearMeter> {
        self.rows.get(channel as usize)
    }

    pub fn total(&self) -> &LinearMeter {
        &self.total
    }

    pub fn set_channel_max(&mut self, channel: ChannelNum, max_ma: f32) {
        if let Some(row) = self.rows.get_mut(channel as usize) {
            row.set_max_value(max_ma);
        }
    }

    pub fn set_total_max(&mut self, max_ma: f32) {
        self.total.set_max_value(max_ma);
    }

    /// Clears the screen and draws every row from the current channel model.
    pub fn begin<D>(&mut self, target: &mut D, channels: &ChannelBank)
    where
        D: DrawTarget<Color = Rgb565>,
    {
        target.clear(Rgb565::BLACK).ok();
        for (num, channel) in channels.iter() {
            if let Some(row) = self.rows.get_mut(num as usize) {
                row.set_max_value(channel.current_limit_ma());
                row.begin(target, meter_state(channel.state()));
            }
        }
        self.total.begin(target, MeterState::On);
    }

    /// Redraws an output row from its model. Undiscovered rows stay N/A.
    pub fn show_channel<D>(&mut self, target: &mut D, num: ChannelNum, channel: &Channel)
    where
        D: DrawTarget<Color = Rgb565>,
    {
        if !channel.is_discovered() {
            return;
        }
        let Some(row) = self.rows.get_mut(num as usize) else {
            return;
        };
        let sample = channel.last_sample();
        row.set_state(target, meter_state(channel.state()));
        row.set_value(target, sample.milliamps, Some(sample.millivolts));
    }

    pub fn show_total<D>(&mut self, target: &mut D, total_ma: f32)
    where
        D: DrawTarget<Color = Rgb565>,
    {
        self.total.set_value(target, total_ma, None);
    }
}
