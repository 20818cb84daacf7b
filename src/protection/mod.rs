mod classifier;
mod service;
mod settings;

pub use self::classifier::{classify, total_contribution};
pub use self::service::{PduControl, PduRunner, PduService, PduState};
pub use self::settings::{
    DEFAULT_CHANNEL_LIMIT_MA, DEFAULT_SAMPLE_INTERVAL, DEFAULT_SUPPLY_MV,
    DEFAULT_SUPPLY_TOLERANCE_MV, DEFAULT_TELEMETRY_INTERVAL, DEFAULT_TOTAL_LIMIT_MA,
    MIN_SAMPLE_INTERVAL, ManualOverride, PduSettings,
};
