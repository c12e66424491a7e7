//! Register layout of the Allwinner H3 port controller.
//!
//! Everything here is pure address and bit arithmetic. Physical GPIO ids are split into
//! a bank (`id >> 5`) and an index inside that bank (`id & 31`). Each bank owns a 36 byte
//! block of registers starting at `SUNXI_GPIO_BASE`:
//!
//! * `+0x00..0x10` - four mode registers, eight 4-bit fields each,
//! * `+0x10` - data register, one bit per pin,
//! * `+0x1C..0x24` - two pull registers, sixteen 2-bit fields each.

/// Physical address of the first port controller bank.
pub const SUNXI_GPIO_BASE: u32 = 0x01C2_0800;
/// Physical offset where the GPIO window is mapped.
pub const GPIO_BASE_BP: u64 = 0x01C2_0000;
/// Physical offset where the clock window is mapped.
pub const CLOCK_BASE_BP: u64 = 0x0010_1000;
/// Physical offset where the PWM window is mapped.
pub const GPIO_PWM_BP: u64 = 0x01C2_1000;

pub const BLOCK_SIZE: usize = 6 * 1024;
pub const MAP_SIZE: u32 = 4096 * 2;
pub const MAP_MASK: u32 = MAP_SIZE - 1;

const BANK_STRIDE: u32 = 36;
const DATA_REGISTER: u32 = 0x10;
const PULL_REGISTER: u32 = 0x1C;

const PINS_PER_BANK: u32 = 32;
const PINS_PER_MODE_REGISTER: u32 = 8;
const PINS_PER_PULL_REGISTER: u32 = 16;

/// Width mask of the part of a mode field the controller honours.
pub const MODE_FIELD_MASK: u32 = 0b111;
pub const PULL_FIELD_MASK: u32 = 0b11;

/// Identifier of a physical pin on the SoC.
///
/// Board tables use `-1` for positions without a physical pin, so the only way to
/// obtain a `GpioId` is from a non-negative raw value.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct GpioId(u32);

impl GpioId {
    pub fn new(raw: i32) -> Option<Self> {
        if raw < 0 {
            None
        } else {
            Some(Self(raw as u32))
        }
    }

    pub fn raw(self) -> u32 {
        self.0
    }

    pub fn bank(self) -> usize {
        (self.0 >> 5) as usize
    }

    pub fn index(self) -> usize {
        (self.0 & (PINS_PER_BANK - 1)) as usize
    }

    fn bank_base(self) -> u32 {
        SUNXI_GPIO_BASE + self.bank() as u32 * BANK_STRIDE
    }
}

/// Word inside a mapped window which backs the physical `address`.
///
/// Windows are aligned to `MAP_SIZE`, so the page base is masked away and the
/// remaining byte offset is turned into a 32-bit word offset.
pub fn word_index(address: u32) -> usize {
    let map_base = address & !MAP_MASK;
    ((address - map_base) >> 2) as usize
}

pub fn mode_register(gpio: GpioId) -> u32 {
    gpio.bank_base() + ((gpio.index() as u32 / PINS_PER_MODE_REGISTER) << 2)
}

pub fn mode_field_shift(gpio: GpioId) -> u32 {
    (gpio.index() as u32 % PINS_PER_MODE_REGISTER) << 2
}

pub fn data_register(gpio: GpioId) -> u32 {
    gpio.bank_base() + DATA_REGISTER
}

pub fn pull_register(gpio: GpioId) -> u32 {
    let sub = gpio.index() as u32 / PINS_PER_PULL_REGISTER;
    gpio.bank_base() + PULL_REGISTER + sub * 4
}

pub fn pull_field_shift(gpio: GpioId) -> u32 {
    (gpio.index() as u32 % PINS_PER_PULL_REGISTER) << 1
}
