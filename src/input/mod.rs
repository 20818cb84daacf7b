mod switch_scanner;

pub use self::switch_scanner::{
    DEFAULT_DEBOUNCE_SCANS, PortLevels, SwitchEvent, SwitchEvents, SwitchInputs, SwitchScanner,
};
