//! This example demonstrates the usage of embedded_hal trait usage.
//!
//! The main benefit over the blinking_led example is that `blink_led`
//! can be used for _any_ device with embedded-hal digital pins abstraction.
//!
//! This example assumes that logical pin #7 (PG11) is connected to diode's anode (+).
//! Make sure to put resistor to reduce current flowing through the diode.

use embedded_hal::digital::v2::*;
use nanopi_mmap_gpio::Device;
use std::error::Error;
use std::thread::sleep;
use std::time::Duration;

fn blink_led<T: ToggleableOutputPin<Error = impl Error + 'static>>(
    mut pin: T,
) -> Result<(), Box<dyn Error>> {
    let blink_interval = Duration::from_millis(500);

    loop {
        pin.toggle()?;
        sleep(blink_interval);
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let nanopi = Device::open()?;
    let led_pin = nanopi.pin(7);
    led_pin.output()?;

    blink_led(led_pin)?;
    Ok(())
}
