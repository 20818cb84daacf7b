// Display rendering: one segmented bar row per output on a 240x240 Rgb565 panel
pub mod curve;
mod linear_meter;
mod meter_panel;

pub use crate::ui::linear_meter::{
    ColorScheme, DARK_GREY, LinearMeter, MeterState, PEAK_COLOR, RowLabel, SEGMENTS, block_x,
    segment_count,
};
pub use crate::ui::meter_panel::{MeterPanel, PANEL_SIZE, ROW_PITCH, ROW_TOP, meter_state, row_y};
