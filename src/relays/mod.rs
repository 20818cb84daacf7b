mod actuator;
mod relay_driver;

pub use self::actuator::RelayActuator;
pub use self::relay_driver::{PinRelays, RelayDriver, RelayPinError, pin_state_for};
