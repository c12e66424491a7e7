//! Sets up a single pin from raw numbers given on the command line and prints its level.
//!
//! Usage: `pin_control <pin> <mode> [pull]`
//!
//! Modes are numbered as `Mode` variants (0 - input, 1 - output, ...) and pulls as `Pull`
//! variants (0 - off, 1 - down, 2 - up, 3 - none). Run with `RUST_LOG=trace` to see
//! every register write.

use nanopi_mmap_gpio::{Device, Mode, Pull};
use std::convert::TryFrom;
use std::env;
use std::error::Error;

fn parse_arg(args: &[String], position: usize) -> Result<Option<u8>, Box<dyn Error>> {
    match args.get(position) {
        Some(raw) => Ok(Some(raw.parse()?)),
        None => Ok(None),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let pin = parse_arg(&args, 1)?.ok_or("missing pin number")?;
    let raw_mode = parse_arg(&args, 2)?.ok_or("missing mode")?;
    let mode = Mode::try_from(raw_mode).map_err(|_| format!("unknown mode {}", raw_mode))?;
    let pull = match parse_arg(&args, 3)? {
        Some(raw) => Some(Pull::try_from(raw).map_err(|_| format!("unknown pull {}", raw))?),
        None => None,
    };

    let nanopi = Device::open()?;
    let handle = nanopi.pin(pin);
    handle.mode(mode)?;
    if let Some(pull) = pull {
        handle.pull(pull)?;
    }
    println!("pin {} is {:?}", pin, handle.read()?);

    nanopi.close()?;
    Ok(())
}
