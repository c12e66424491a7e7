use crate::device::registers::GpioId;

/// Number of logical pins known to the NanoPi M1 pin table.
pub const MAX_PIN_COUNT: usize = 74;

const BANK_COUNT: usize = 9;
const PINS_PER_BANK: usize = 32;

/// Marks which physical pins of the Allwinner H3 may be touched.
///
/// Rows are port banks PA..PI, columns are indexes within a bank. `-1` means the
/// position is not routed on this SoC revision.
#[rustfmt::skip]
pub const H3_PIN_MASK: [[i8; PINS_PER_BANK]; BANK_COUNT] = [
    // PA
    [ 0,  1,  2,  3,  4,  5,  6,  7,  8,  9, 10, 11, 12, 13, 14, 15,
     16, 17, 18, 19, 20, 21, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1],
    // PB
    [-1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1,
     -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1],
    // PC
    [ 0,  1,  2,  3,  4, -1, -1,  7, -1, -1, -1, -1, -1, -1, -1, -1,
     -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1],
    // PD
    [-1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, 14, -1,
     -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1],
    // PE
    [-1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1,
     -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1],
    // PF
    [-1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1,
     -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1],
    // PG
    [-1, -1, -1, -1, -1, -1,  6,  7,  8,  9, 10, 11, 12, 13, -1, -1,
     -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1],
    // PH
    [-1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1,
     -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1],
    // PI
    [-1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1,
     -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1],
];

/// Translation from board pin numbers to physical pins of the SoC.
///
/// One implementation exists per supported board. The translator is picked once, when
/// the `Device` is created, and every pin operation goes through it.
pub trait PinTranslator {
    /// Amount of logical pins in the board table. Pins at or above this number are ignored.
    fn max_pin_count(&self) -> usize;

    /// Raw table lookup. `-1` stands for a logical pin without physical counterpart.
    ///
    /// Callers guarantee `pin < self.max_pin_count()`.
    fn pin_to_gpio(&self, pin: usize) -> i32;

    /// Checks a bank/index pair against the SoC pin mask.
    fn is_valid(&self, bank: usize, index: usize) -> bool;

    /// Resolves a logical pin, folding out-of-range numbers and unmapped positions into `None`.
    fn resolve(&self, pin: u8) -> Option<GpioId> {
        let pin = pin as usize;
        if pin >= self.max_pin_count() {
            return None;
        }

        GpioId::new(self.pin_to_gpio(pin))
    }
}

/// Checks `H3_PIN_MASK`, treating banks beyond the table as illegal.
pub fn h3_is_valid(bank: usize, index: usize) -> bool {
    H3_PIN_MASK
        .get(bank)
        .and_then(|row| row.get(index))
        .map_or(false, |&entry| entry != -1)
}

/// FriendlyElec NanoPi M1.
///
/// Banks are laid out as `0..=31` for PA, `32..=63` for PB, `64..=95` for PC and so on up
/// to PG at `192..=223`. Positions 32 and 33 are the debug UART pins.
#[derive(Copy, Clone, Debug, Default)]
pub struct NanoPiM1;

impl NanoPiM1 {
    #[rustfmt::skip]
    const PIN_TO_GPIO: [i32; MAX_PIN_COUNT] = [
          0,   6,   2,   3, 200, 201,   1, 203,  12,  11, //  0..=9
         67,  17,  64,  65,  66, 198, 199,  -1,  -1,  -1, // 10..=19
         -1,  20,  21,   8,  13,   9,   7,  16,  15,  14, // 20..=29
         19,  18,   4,   5,  -1,  -1,  -1,  -1,  -1,  -1, // 30..=39
         -1,  -1,  -1,  -1,  -1,  -1,  -1,  -1,  -1,  -1, // 40..=49
         -1,  -1,  -1,  -1,  -1,  -1,  -1,  -1,  -1,  -1, // 50..=59
         -1,  -1,  -1,  -1,  -1,  -1,  -1,  -1,  -1,  -1, // 60..=69
         -1,  -1,  -1,  -1,                               // 70..=73
    ];
}

impl PinTranslator for NanoPiM1 {
    fn max_pin_count(&self) -> usize {
        MAX_PIN_COUNT
    }

    fn pin_to_gpio(&self, pin: usize) -> i32 {
        Self::PIN_TO_GPIO[pin]
    }

    fn is_valid(&self, bank: usize, index: usize) -> bool {
        h3_is_valid(bank, index)
    }
}
