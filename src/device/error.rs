use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Enum representing possible failures when opening or accessing the register memory.
///
/// - DeviceAccessFailed - The memory device could not be opened for a reason other than permissions.
/// - InsufficientPrivilege - The process is not allowed to open the memory device. Mapping physical memory requires root.
/// - MemoryMapFailed - One of the register windows could not be memory-mapped.
/// - RegisterOutOfWindow - A computed register address falls outside of its mapped window.
/// - LockPoisoned - A thread panicked while holding the register lock.
#[derive(Error, Debug)]
pub enum DeviceError {
    #[error("failed to open memory device {}", .path.display())]
    DeviceAccessFailed {
        path: PathBuf,
        #[source]
        source: nix::Error,
    },
    #[error("insufficient privilege to open memory device {}", .0.display())]
    InsufficientPrivilege(PathBuf),
    #[error("failed to map {window} registers")]
    MemoryMapFailed {
        window: &'static str,
        #[source]
        source: io::Error,
    },
    #[error("register {address:#010x} is outside of the mapped window")]
    RegisterOutOfWindow { address: u32 },
    #[error("register lock poisoned")]
    LockPoisoned,
}

/// Enum representing possible failures when operating on a pin.
///
/// - InvalidGpio - The board table maps a logical pin to a physical pin which the SoC mask rejects.
///   This points at a broken board table rather than a bad argument, so it is never retried.
#[derive(Error, Debug)]
pub enum PinError {
    #[error("pin {pin} maps to gpio {gpio} (bank {bank}, index {index}) rejected by the pin mask")]
    InvalidGpio {
        pin: u8,
        gpio: u32,
        bank: usize,
        index: usize,
    },
}
