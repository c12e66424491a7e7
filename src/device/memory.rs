use memmap::MmapMut;
use std::mem::size_of;
use std::ptr;

use super::error::DeviceError;
use super::registers;

const WORD: usize = size_of::<u32>();

/// Word-addressed view over one block of registers.
///
/// Accessors are bounds checked: `None` means the word lies outside of the window.
/// Implemented by memory-mapped device windows and by `Vec<u32>`, which serves as
/// an in-memory register file.
pub trait RegisterWindow {
    fn len_words(&self) -> usize;
    fn read_word(&self, word: usize) -> Option<u32>;
    fn write_word(&mut self, word: usize, value: u32) -> Option<()>;
}

/// Register window backed by a mapping of the memory device.
///
/// Dropping the window unmaps it.
#[derive(Debug)]
pub struct MappedWindow {
    map: MmapMut,
}

impl MappedWindow {
    pub fn new(map: MmapMut) -> Self {
        Self { map }
    }
}

impl RegisterWindow for MappedWindow {
    fn len_words(&self) -> usize {
        self.map.len() / WORD
    }

    fn read_word(&self, word: usize) -> Option<u32> {
        let start = word.checked_mul(WORD)?;
        let bytes = self.map.get(start..start.checked_add(WORD)?)?;

        // SAFETY: `bytes` is one word inside the mapping. Mappings are page aligned, so the word is aligned too.
        Some(unsafe { ptr::read_volatile(bytes.as_ptr() as *const u32) })
    }

    fn write_word(&mut self, word: usize, value: u32) -> Option<()> {
        let start = word.checked_mul(WORD)?;
        let bytes = self.map.get_mut(start..start.checked_add(WORD)?)?;

        // SAFETY: Same as in `read_word`.
        unsafe { ptr::write_volatile(bytes.as_mut_ptr() as *mut u32, value) };
        Some(())
    }
}

impl RegisterWindow for Vec<u32> {
    fn len_words(&self) -> usize {
        self.len()
    }

    fn read_word(&self, word: usize) -> Option<u32> {
        self.get(word).copied()
    }

    fn write_word(&mut self, word: usize, value: u32) -> Option<()> {
        self.get_mut(word).map(|slot| *slot = value)
    }
}

/// The three register windows used by the port controller.
///
/// Only the GPIO window is operated on. Clock and PWM windows stay mapped for the
/// lifetime of the device and are reachable through `clock` and `pwm` for raw access.
#[derive(Debug)]
pub struct RegisterWindows<W> {
    gpio: W,
    clock: W,
    pwm: W,
}

impl<W: RegisterWindow> RegisterWindows<W> {
    pub fn new(gpio: W, clock: W, pwm: W) -> Self {
        Self { gpio, clock, pwm }
    }

    /// Port controller window, addressed through `read_gpio` and friends.
    pub fn gpio(&self) -> &W {
        &self.gpio
    }

    /// Clock control window. Mapped, never written by this crate.
    pub fn clock(&self) -> &W {
        &self.clock
    }

    /// PWM window. Mapped, never written by this crate.
    pub fn pwm(&self) -> &W {
        &self.pwm
    }

    /// Reads the GPIO register at physical `address`.
    pub fn read_gpio(&self, address: u32) -> Result<u32, DeviceError> {
        self.gpio
            .read_word(registers::word_index(address))
            .ok_or(DeviceError::RegisterOutOfWindow { address })
    }

    /// Writes the GPIO register at physical `address`.
    pub fn write_gpio(&mut self, address: u32, value: u32) -> Result<(), DeviceError> {
        log::trace!("gpio register {:#010x} <- {:#010x}", address, value);
        self.gpio
            .write_word(registers::word_index(address), value)
            .ok_or(DeviceError::RegisterOutOfWindow { address })
    }

    /// Read-modify-write of a whole GPIO register word.
    pub fn modify_gpio<F>(&mut self, address: u32, f: F) -> Result<(), DeviceError>
    where
        F: FnOnce(u32) -> u32,
    {
        let current = self.read_gpio(address)?;
        self.write_gpio(address, f(current))
    }
}
