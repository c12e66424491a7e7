use super::NanoPiError;
use memmap::{MmapMut, MmapOptions};
use nix::errno::Errno;
use nix::fcntl::{open, OFlag};
use nix::sys::stat::Mode as FileMode;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

pub mod error;
mod memory;
mod pin;
pub mod registers;

use crate::pin_map::{NanoPiM1, PinTranslator};
use crate::NanoPiResult;
use error::{DeviceError, PinError};
use registers::{GpioId, MODE_FIELD_MASK, PULL_FIELD_MASK};

pub use memory::{MappedWindow, RegisterWindow, RegisterWindows};
pub use pin::{Mode, Pin, Pull, State};

/// Settings used when opening the memory device.
#[derive(Clone, Debug)]
pub struct DeviceConfig {
    /// Character device exposing physical memory. Opening it requires root.
    pub device_path: PathBuf,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            device_path: PathBuf::from("/dev/mem"),
        }
    }
}

/// The main abstraction for the port controller of the board.
///
/// This struct owns the memory mappings of the GPIO, clock and PWM register windows. A single
/// lock guards all three windows, so every register read-modify-write is serialized against
/// other threads using the same device, even for unrelated pins sharing a register word.
///
/// Pin operations take logical board pins. Pins outside of the board table or without a physical
/// counterpart are ignored without an error. A pin resolving to a physical position rejected by the
/// SoC pin mask yields `PinError::InvalidGpio`, which means the board table itself is broken.
///
/// **Only the NanoPi M1 board table is shipped with this crate.** Other Allwinner H3 boards can
/// be supported by providing their own `PinTranslator`.
#[derive(Debug)]
pub struct Device<B = NanoPiM1, W = MappedWindow> {
    board: B,
    windows: Mutex<RegisterWindows<W>>,
}

impl Device {
    /// Opens `/dev/mem` and maps the register windows for the NanoPi M1.
    ///
    /// This constructor can fail - if you have no access to the memory device or memory mapping fails.
    pub fn open() -> NanoPiResult<Self> {
        Self::open_with(NanoPiM1, DeviceConfig::default())
    }
}

impl<B: PinTranslator> Device<B, MappedWindow> {
    /// Maps the register windows through the memory device named in `config`.
    ///
    /// The descriptor is closed as soon as the mappings are created, they stay valid on their own.
    pub fn open_with(board: B, config: DeviceConfig) -> NanoPiResult<Self> {
        let handle = Self::open_device_file(&config.device_path)?;

        let gpio = Self::map_window(
            &handle,
            "gpio",
            registers::GPIO_BASE_BP,
            registers::BLOCK_SIZE * 10,
        )?;
        let clock = Self::map_window(
            &handle,
            "clock",
            registers::CLOCK_BASE_BP,
            registers::BLOCK_SIZE,
        )?;
        let pwm = Self::map_window(
            &handle,
            "pwm",
            registers::GPIO_PWM_BP,
            registers::BLOCK_SIZE,
        )?;
        drop(handle);

        log::debug!(
            "mapped register windows from {}",
            config.device_path.display()
        );
        Ok(Self::with_windows(board, gpio, clock, pwm))
    }

    fn open_device_file(device_path: &Path) -> NanoPiResult<File> {
        use std::os::unix::io::FromRawFd;
        use DeviceError::*;

        let mut open_flags = OFlag::empty();
        open_flags.insert(OFlag::O_RDWR);
        open_flags.insert(OFlag::O_SYNC);
        open_flags.insert(OFlag::O_CLOEXEC);

        let file_fd = open(device_path, open_flags, FileMode::empty()).map_err(|err| {
            let path = device_path.to_path_buf();
            let device_error = match err {
                nix::Error::Sys(Errno::EACCES) | nix::Error::Sys(Errno::EPERM) => {
                    InsufficientPrivilege(path)
                }
                source => DeviceAccessFailed { path, source },
            };
            NanoPiError::DeviceError(device_error)
        })?;

        // SAFETY: Validity of file_fd is checked by Nix.
        Ok(unsafe { File::from_raw_fd(file_fd) })
    }

    fn map_window(
        handle: &File,
        window: &'static str,
        offset: u64,
        len: usize,
    ) -> NanoPiResult<MappedWindow> {
        let mut map_opts = MmapOptions::new();
        map_opts.offset(offset);
        map_opts.len(len);

        // SAFETY: File handle is valid at this point.
        let map: MmapMut = unsafe {
            map_opts.map_mut(handle).map_err(|source| {
                NanoPiError::DeviceError(DeviceError::MemoryMapFailed { window, source })
            })?
        };
        log::debug!("mapped {} window: {} bytes at {:#010x}", window, len, offset);

        Ok(MappedWindow::new(map))
    }
}

impl<B: PinTranslator, W: RegisterWindow> Device<B, W> {
    /// Builds a device over already prepared register windows.
    ///
    /// Useful with in-memory windows (`Vec<u32>`) when no hardware is around.
    pub fn with_windows(board: B, gpio: W, clock: W, pwm: W) -> Self {
        log::debug!(
            "register windows: gpio {} words, clock {} words, pwm {} words",
            gpio.len_words(),
            clock.len_words(),
            pwm.len_words()
        );
        Self {
            board,
            windows: Mutex::new(RegisterWindows::new(gpio, clock, pwm)),
        }
    }

    /// Releases the register windows.
    ///
    /// Mapped windows are unmapped when dropped here.
    pub fn close(self) -> NanoPiResult<()> {
        let windows = self
            .windows
            .into_inner()
            .map_err(|_| NanoPiError::DeviceError(DeviceError::LockPoisoned))?;
        drop(windows);
        log::debug!("register windows released");

        Ok(())
    }

    /// Board table the device was opened with.
    pub fn board(&self) -> &B {
        &self.board
    }

    /// A handle for logical `pin` carrying the shorthand operations.
    pub fn pin(&self, pin: u8) -> Pin<'_, B, W> {
        Pin::new(self, pin)
    }

    /// Locks the register windows for raw access.
    ///
    /// Pin operations block while the guard is held.
    pub fn registers(&self) -> NanoPiResult<MutexGuard<'_, RegisterWindows<W>>> {
        self.windows
            .lock()
            .map_err(|_| NanoPiError::DeviceError(DeviceError::LockPoisoned))
    }

    /// Sets the function of a pin.
    ///
    /// `Input` clears the pin's mode field, `Output` sets it to `1`. Other modes are not
    /// supported by the register code and leave the registers untouched.
    pub fn set_mode(&self, pin: u8, mode: Mode) -> NanoPiResult<()> {
        let gpio = match self.locate(pin)? {
            Some(gpio) => gpio,
            None => return Ok(()),
        };
        let value = match mode.field_value() {
            Some(value) => value,
            None => {
                log::debug!("mode {:?} is not implemented, pin {} left as is", mode, pin);
                return Ok(());
            }
        };

        let address = registers::mode_register(gpio);
        let shift = registers::mode_field_shift(gpio);
        self.registers()?
            .modify_gpio(address, |word| {
                (word & !(MODE_FIELD_MASK << shift)) | (value << shift)
            })
            .map_err(NanoPiError::DeviceError)
    }

    /// Drives an output pin high or low.
    pub fn write(&self, pin: u8, state: State) -> NanoPiResult<()> {
        let gpio = match self.locate(pin)? {
            Some(gpio) => gpio,
            None => return Ok(()),
        };

        let mut windows = self.registers()?;
        let result = Self::write_data(&mut windows, gpio, state);
        drop(windows);

        result
    }

    /// Reads the level of a pin. Unmapped pins read as `Low`.
    pub fn read(&self, pin: u8) -> NanoPiResult<State> {
        let gpio = match self.locate(pin)? {
            Some(gpio) => gpio,
            None => return Ok(State::Low),
        };

        Self::read_data(&*self.registers()?, gpio)
    }

    /// Flips the level of an output pin.
    ///
    /// The lock is held from the read to the write, so concurrent toggles of the same pin
    /// never lose an update.
    pub fn toggle(&self, pin: u8) -> NanoPiResult<()> {
        let gpio = match self.locate(pin)? {
            Some(gpio) => gpio,
            None => return Ok(()),
        };

        let mut windows = self.registers()?;
        let state = Self::read_data(&windows, gpio)?;
        Self::write_data(&mut windows, gpio, !state)
    }

    /// Configures the pull resistor of a pin. See `Pull` for the codes written.
    pub fn set_pull(&self, pin: u8, pull: Pull) -> NanoPiResult<()> {
        let gpio = match self.locate(pin)? {
            Some(gpio) => gpio,
            None => return Ok(()),
        };

        let address = registers::pull_register(gpio);
        let shift = registers::pull_field_shift(gpio);
        let value = pull.field_value();
        self.registers()?
            .modify_gpio(address, |word| {
                (word & !(PULL_FIELD_MASK << shift)) | (value << shift)
            })
            .map_err(NanoPiError::DeviceError)
    }

    /// Resolves a logical pin and checks the result against the pin mask.
    fn locate(&self, pin: u8) -> NanoPiResult<Option<GpioId>> {
        let gpio = match self.board.resolve(pin) {
            Some(gpio) => gpio,
            None => {
                log::trace!("pin {} is not mapped, ignoring", pin);
                return Ok(None);
            }
        };

        let (bank, index) = (gpio.bank(), gpio.index());
        if !self.board.is_valid(bank, index) {
            log::warn!(
                "pin {} maps to gpio {} outside of the pin mask",
                pin,
                gpio.raw()
            );
            return Err(NanoPiError::PinError(PinError::InvalidGpio {
                pin,
                gpio: gpio.raw(),
                bank,
                index,
            }));
        }

        Ok(Some(gpio))
    }

    fn read_data(windows: &RegisterWindows<W>, gpio: GpioId) -> NanoPiResult<State> {
        let word = windows
            .read_gpio(registers::data_register(gpio))
            .map_err(NanoPiError::DeviceError)?;

        if (word >> gpio.index()) & 1 == 0 {
            Ok(State::Low)
        } else {
            Ok(State::High)
        }
    }

    fn write_data(
        windows: &mut RegisterWindows<W>,
        gpio: GpioId,
        state: State,
    ) -> NanoPiResult<()> {
        let bit = 1 << gpio.index();
        windows
            .modify_gpio(registers::data_register(gpio), |word| match state {
                State::High => word | bit,
                State::Low => word & !bit,
            })
            .map_err(NanoPiError::DeviceError)
    }
}
