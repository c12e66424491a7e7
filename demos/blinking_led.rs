//! A very basic example of a program blinking a LED diode using native library API.
//!
//! This example assumes that logical pin #7 (PG11) is connected to diode's anode (+).
//! Make sure to put resistor to reduce current flowing through the diode.

use nanopi_mmap_gpio::{Device, State};
use std::error::Error;
use std::thread::sleep;
use std::time::Duration;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let nanopi = Device::open()?;
    let led_pin = nanopi.pin(7);
    let blink_interval = Duration::from_millis(500);

    led_pin.output()?;
    loop {
        led_pin.write(State::High)?;
        sleep(blink_interval);
        led_pin.write(State::Low)?;
        sleep(blink_interval);
    }
}
