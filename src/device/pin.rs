use super::memory::RegisterWindow;
use super::Device;
use crate::pin_map::PinTranslator;
use crate::{NanoPiError, NanoPiResult};
use derive_try_from_primitive::TryFromPrimitive;
use embedded_hal::digital::v2 as eh;
use std::ops::Not;

/// Function of a pin.
///
/// Only `Input` and `Output` are backed by the port controller code. The remaining modes
/// are accepted and leave the registers untouched.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
pub enum Mode {
    Input = 0,
    Output = 1,
    Clock = 2,
    Pwm = 3,
    Spi = 4,
    Alt0 = 5,
    Alt1 = 6,
    Alt2 = 7,
    Alt3 = 8,
    Alt4 = 9,
    Alt5 = 10,
}

impl Mode {
    /// Value stored in the pin's mode field, or `None` for modes without register support.
    pub(crate) fn field_value(self) -> Option<u32> {
        match self {
            Mode::Input => Some(0b000),
            Mode::Output => Some(0b001),
            _ => None,
        }
    }
}

/// Enum representing the state of a given pin.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
pub enum State {
    Low = 0,
    High = 1,
}

impl Not for State {
    type Output = State;

    fn not(self) -> Self::Output {
        match self {
            State::Low => State::High,
            State::High => State::Low,
        }
    }
}

/// Pull resistor configuration.
///
/// The port controller receives the following 2-bit codes:
///
/// | variant    | code   |
/// |------------|--------|
/// | `PullOff`  | `0b11` |
/// | `PullUp`   | `0b11` |
/// | `PullDown` | `0b01` |
/// | `PullNone` | `0b00` |
///
/// `PullOff` and `PullUp` share a code, matching the boards' vendor library.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
pub enum Pull {
    PullOff = 0,
    PullDown = 1,
    PullUp = 2,
    PullNone = 3,
}

impl Pull {
    pub(crate) fn field_value(self) -> u32 {
        match self {
            Pull::PullOff | Pull::PullUp => 0b11,
            Pull::PullDown => 0b01,
            Pull::PullNone => 0b00,
        }
    }
}

/// Logical pin of a board bound to an open `Device`.
///
/// Obtained with `Device::pin`. Every method forwards to the device pin operations, so
/// unmapped pins are silently ignored here as well.
#[derive(Debug)]
pub struct Pin<'device, B, W> {
    device: &'device Device<B, W>,
    number: u8,
}

impl<'device, B, W> Pin<'device, B, W>
where
    B: PinTranslator,
    W: RegisterWindow,
{
    pub(crate) fn new(device: &'device Device<B, W>, number: u8) -> Self {
        Self { device, number }
    }

    pub fn number(&self) -> u8 {
        self.number
    }

    pub fn mode(&self, mode: Mode) -> NanoPiResult<()> {
        self.device.set_mode(self.number, mode)
    }

    pub fn input(&self) -> NanoPiResult<()> {
        self.mode(Mode::Input)
    }

    pub fn output(&self) -> NanoPiResult<()> {
        self.mode(Mode::Output)
    }

    pub fn clock(&self) -> NanoPiResult<()> {
        self.mode(Mode::Clock)
    }

    pub fn pwm(&self) -> NanoPiResult<()> {
        self.mode(Mode::Pwm)
    }

    pub fn write(&self, state: State) -> NanoPiResult<()> {
        self.device.write(self.number, state)
    }

    pub fn high(&self) -> NanoPiResult<()> {
        self.write(State::High)
    }

    pub fn low(&self) -> NanoPiResult<()> {
        self.write(State::Low)
    }

    pub fn read(&self) -> NanoPiResult<State> {
        self.device.read(self.number)
    }

    pub fn toggle(&self) -> NanoPiResult<()> {
        self.device.toggle(self.number)
    }

    pub fn pull(&self, pull: Pull) -> NanoPiResult<()> {
        self.device.set_pull(self.number, pull)
    }

    pub fn pull_up(&self) -> NanoPiResult<()> {
        self.pull(Pull::PullUp)
    }

    pub fn pull_down(&self) -> NanoPiResult<()> {
        self.pull(Pull::PullDown)
    }

    pub fn pull_off(&self) -> NanoPiResult<()> {
        self.pull(Pull::PullOff)
    }
}

impl<'device, B, W> eh::InputPin for Pin<'device, B, W>
where
    B: PinTranslator,
    W: RegisterWindow,
{
    type Error = NanoPiError;

    fn is_high(&self) -> Result<bool, Self::Error> {
        Ok(self.read()? == State::High)
    }

    fn is_low(&self) -> Result<bool, Self::Error> {
        self.is_high().map(|v| !v)
    }
}

impl<'device, B, W> eh::OutputPin for Pin<'device, B, W>
where
    B: PinTranslator,
    W: RegisterWindow,
{
    type Error = NanoPiError;

    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.low()
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.high()
    }
}

impl<'device, B, W> eh::StatefulOutputPin for Pin<'device, B, W>
where
    B: PinTranslator,
    W: RegisterWindow,
{
    fn is_set_high(&self) -> Result<bool, Self::Error> {
        eh::InputPin::is_high(self)
    }

    fn is_set_low(&self) -> Result<bool, Self::Error> {
        eh::InputPin::is_low(self)
    }
}

impl<'device, B, W> eh::ToggleableOutputPin for Pin<'device, B, W>
where
    B: PinTranslator,
    W: RegisterWindow,
{
    type Error = NanoPiError;

    fn toggle(&mut self) -> Result<(), Self::Error> {
        Pin::toggle(self)
    }
}
