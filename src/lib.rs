//! This crate exposes GPIO interface of [NanoPi M1](https://wiki.friendlyelec.com/wiki/index.php/NanoPi_M1) SBC for programmatic use in Rust.
//!
//! Pins are driven directly through the registers of the Allwinner H3 port controller, which are memory-mapped from `/dev/mem`.
//! This requires root privileges. No kernel GPIO driver is involved, so reads and writes cost a couple of memory accesses.
//!
//! Board pins are numbered the same way as in the wiringPi family of libraries. The board table translating them to SoC pins lives
//! behind the `PinTranslator` trait, so another H3 board can be supported by implementing it and passing it to `Device::open_with`.
//!
//! Only `Input` and `Output` modes are implemented. `Clock`, `Pwm`, `Spi` and the alternate functions are accepted and ignored.
//!
//! `Pin` implements relevant [`embedded_hal`](https://crates.io/crates/embedded-hal) abstractions so this crate can be used
//! with driver implementations using `embedded_hal` generic traits.
//!
//! ```no_run
//! use nanopi_mmap_gpio::{Device, State};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let device = Device::open()?;
//!     let led = device.pin(7);
//!     led.output()?;
//!     led.write(State::High)?;
//!     device.close()?;
//!
//!     Ok(())
//! }
//! ```

use thiserror::Error;

mod device;
mod pin_map;

pub use device::error::DeviceError;
pub use device::error::PinError;
pub use device::registers;
pub use device::{
    Device, DeviceConfig, MappedWindow, Mode, Pin, Pull, RegisterWindow, RegisterWindows, State,
};
pub use pin_map::{h3_is_valid, NanoPiM1, PinTranslator, H3_PIN_MASK, MAX_PIN_COUNT};

/// Main error type for this crate.
///
/// For more details, see `PinError` and `DeviceError` enums documentation.
#[derive(Error, Debug)]
pub enum NanoPiError {
    #[error("error while operating on a pin")]
    PinError(#[source] device::error::PinError),
    #[error("error while operating on a device")]
    DeviceError(#[source] device::error::DeviceError),
}

pub type NanoPiResult<T> = Result<T, NanoPiError>;
