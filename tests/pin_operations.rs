use embedded_hal::digital::v2::{InputPin, OutputPin, StatefulOutputPin, ToggleableOutputPin};
use nanopi_mmap_gpio::registers::{word_index, BLOCK_SIZE, SUNXI_GPIO_BASE};
use nanopi_mmap_gpio::{
    h3_is_valid, Device, DeviceConfig, DeviceError, Mode, NanoPiError, NanoPiM1, PinError,
    PinTranslator, Pull, RegisterWindow, State,
};
use std::env;
use std::fs::{self, File};
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

/// Register file recording every access made through it.
#[derive(Debug)]
struct CountingWindow {
    words: Vec<u32>,
    reads: Arc<AtomicUsize>,
    writes: Arc<AtomicUsize>,
}

impl CountingWindow {
    fn new(len: usize, reads: &Arc<AtomicUsize>, writes: &Arc<AtomicUsize>) -> Self {
        Self {
            words: vec![0; len],
            reads: Arc::clone(reads),
            writes: Arc::clone(writes),
        }
    }
}

impl RegisterWindow for CountingWindow {
    fn len_words(&self) -> usize {
        self.words.len()
    }

    fn read_word(&self, word: usize) -> Option<u32> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.words.get(word).copied()
    }

    fn write_word(&mut self, word: usize, value: u32) -> Option<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.words.get_mut(word).map(|slot| *slot = value)
    }
}

/// Board whose table points pin 0 at PB0, which the H3 mask does not route.
struct BrokenBoard;

impl PinTranslator for BrokenBoard {
    fn max_pin_count(&self) -> usize {
        3
    }

    fn pin_to_gpio(&self, pin: usize) -> i32 {
        [32, -1, 1][pin]
    }

    fn is_valid(&self, bank: usize, index: usize) -> bool {
        h3_is_valid(bank, index)
    }
}

struct Counters {
    reads: Arc<AtomicUsize>,
    writes: Arc<AtomicUsize>,
}

impl Counters {
    fn accesses(&self) -> (usize, usize) {
        (
            self.reads.load(Ordering::SeqCst),
            self.writes.load(Ordering::SeqCst),
        )
    }
}

fn counting_device<B: PinTranslator>(board: B) -> (Device<B, CountingWindow>, Counters) {
    let reads = Arc::new(AtomicUsize::new(0));
    let writes = Arc::new(AtomicUsize::new(0));
    let device = Device::with_windows(
        board,
        CountingWindow::new(BLOCK_SIZE * 10 / 4, &reads, &writes),
        CountingWindow::new(BLOCK_SIZE / 4, &reads, &writes),
        CountingWindow::new(BLOCK_SIZE / 4, &reads, &writes),
    );

    (device, Counters { reads, writes })
}

fn memory_device() -> Device<NanoPiM1, Vec<u32>> {
    Device::with_windows(
        NanoPiM1,
        vec![0; BLOCK_SIZE * 10 / 4],
        vec![0; BLOCK_SIZE / 4],
        vec![0; BLOCK_SIZE / 4],
    )
}

#[test]
fn unmapped_pin_issues_no_register_access() {
    let (device, counters) = counting_device(NanoPiM1);

    device.set_mode(17, Mode::Output).unwrap();
    device.write(17, State::High).unwrap();
    device.toggle(17).unwrap();
    device.set_pull(17, Pull::PullDown).unwrap();
    assert_eq!(device.read(17).unwrap(), State::Low);

    assert_eq!(counters.accesses(), (0, 0));
}

#[test]
fn out_of_range_pin_issues_no_register_access() {
    let (device, counters) = counting_device(NanoPiM1);

    device.pin(74).output().unwrap();
    device.pin(74).high().unwrap();
    device.pin(255).toggle().unwrap();
    assert_eq!(device.pin(255).read().unwrap(), State::Low);

    assert_eq!(counters.accesses(), (0, 0));
}

#[test]
fn unimplemented_modes_issue_no_register_access() {
    let (device, counters) = counting_device(NanoPiM1);

    device.pin(6).clock().unwrap();
    device.pin(6).pwm().unwrap();
    device.set_mode(6, Mode::Spi).unwrap();

    assert_eq!(counters.accesses(), (0, 0));
}

#[test]
fn write_holds_a_single_read_modify_write() {
    let (device, counters) = counting_device(NanoPiM1);

    device.write(6, State::High).unwrap();

    assert_eq!(counters.accesses(), (1, 1));
}

#[test]
fn masked_gpio_is_reported_before_touching_registers() {
    let (device, counters) = counting_device(BrokenBoard);

    match device.set_mode(0, Mode::Output) {
        Err(NanoPiError::PinError(PinError::InvalidGpio {
            pin,
            gpio,
            bank,
            index,
        })) => assert_eq!((pin, gpio, bank, index), (0, 32, 1, 0)),
        other => panic!("unexpected result: {:?}", other),
    }
    assert!(device.write(0, State::High).is_err());
    assert!(device.read(0).is_err());
    assert!(device.toggle(0).is_err());
    assert!(device.set_pull(0, Pull::PullUp).is_err());

    assert_eq!(counters.accesses(), (0, 0));
}

#[test]
fn custom_board_drives_its_own_pins() {
    let (device, _counters) = counting_device(BrokenBoard);

    device.set_mode(1, Mode::Output).unwrap();
    device.write(2, State::High).unwrap();

    assert_eq!(device.read(2).unwrap(), State::High);
    assert_eq!(
        device.registers().unwrap().gpio().words[word_index(SUNXI_GPIO_BASE + 0x10)],
        0b10
    );
}

#[test]
fn every_mapped_pin_round_trips_its_level() {
    let device = memory_device();

    for pin in 0..=255u8 {
        if device.board().resolve(pin).is_none() {
            continue;
        }

        device.write(pin, State::High).unwrap();
        assert_eq!(device.read(pin).unwrap(), State::High, "pin {}", pin);
        device.write(pin, State::Low).unwrap();
        assert_eq!(device.read(pin).unwrap(), State::Low, "pin {}", pin);
    }
}

#[test]
fn neighbouring_pins_keep_their_mode_fields() {
    let device = memory_device();

    // Logical pins 0 and 6 are PA0 and PA1, sharing the first mode register.
    device.set_mode(0, Mode::Output).unwrap();
    device.set_mode(6, Mode::Output).unwrap();
    device.set_mode(0, Mode::Input).unwrap();

    let mode_word = device.registers().unwrap().gpio()[word_index(SUNXI_GPIO_BASE)];
    assert_eq!(mode_word, 0x10);
}

#[test]
fn concurrent_toggles_are_not_lost() {
    let device = Arc::new(memory_device());
    let toggles_per_thread = 1000;

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let device = Arc::clone(&device);
            thread::spawn(move || {
                for _ in 0..toggles_per_thread {
                    device.toggle(6).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    // An even amount of toggles brings the pin back to where it started.
    assert_eq!(device.read(6).unwrap(), State::Low);
}

#[test]
fn concurrent_writes_to_shared_word_do_not_clobber() {
    let device = Arc::new(memory_device());
    // PA0, PA1, PA2 and PA3 share the bank data register.
    let pins = [0u8, 6, 2, 3];

    let handles: Vec<_> = pins
        .iter()
        .copied()
        .map(|pin| {
            let device = Arc::clone(&device);
            thread::spawn(move || {
                for _ in 0..500 {
                    device.write(pin, State::Low).unwrap();
                    device.write(pin, State::High).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    for pin in pins.iter().copied() {
        assert_eq!(device.read(pin).unwrap(), State::High, "pin {}", pin);
    }
}

#[test]
fn pin_handle_speaks_embedded_hal() {
    let device = memory_device();
    let mut pin = device.pin(6);

    pin.set_high().unwrap();
    assert!(pin.is_high().unwrap());
    assert!(pin.is_set_high().unwrap());

    ToggleableOutputPin::toggle(&mut pin).unwrap();
    assert!(pin.is_low().unwrap());
    assert!(pin.is_set_low().unwrap());

    pin.set_low().unwrap();
    assert_eq!(pin.read().unwrap(), State::Low);
}

#[test]
fn pull_shorthands_write_expected_codes() {
    let device = memory_device();
    let pull_word = word_index(SUNXI_GPIO_BASE + 0x1C);
    let pin = device.pin(6);

    pin.pull_down().unwrap();
    assert_eq!(device.registers().unwrap().gpio()[pull_word], 0b01 << 2);
    pin.pull_up().unwrap();
    assert_eq!(device.registers().unwrap().gpio()[pull_word], 0b11 << 2);
    pin.pull_off().unwrap();
    assert_eq!(device.registers().unwrap().gpio()[pull_word], 0b11 << 2);
    pin.pull(Pull::PullNone).unwrap();
    assert_eq!(device.registers().unwrap().gpio()[pull_word], 0);
}

#[test]
fn close_consumes_device() {
    let device = memory_device();
    device.pin(6).output().unwrap();

    assert!(device.close().is_ok());
}

/// Sparse file large enough to back every register window at its physical offset.
fn fake_memory_device(name: &str) -> PathBuf {
    let path = env::temp_dir().join(format!("nanopi-{}-{}", name, std::process::id()));
    let file = File::create(&path).unwrap();
    file.set_len(0x0200_0000).unwrap();

    path
}

fn config(path: &PathBuf) -> DeviceConfig {
    DeviceConfig {
        device_path: path.clone(),
    }
}

#[test]
fn open_reports_missing_device() {
    let path = PathBuf::from("/nonexistent/nanopi/mem");

    match Device::open_with(NanoPiM1, config(&path)) {
        Err(NanoPiError::DeviceError(DeviceError::DeviceAccessFailed { path: failed, .. })) => {
            assert_eq!(failed, path)
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn open_reports_insufficient_privilege() {
    if nix::unistd::Uid::effective().is_root() {
        // Root ignores file permissions.
        return;
    }
    let path = fake_memory_device("locked");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o000)).unwrap();

    let result = Device::open_with(NanoPiM1, config(&path));
    fs::remove_file(&path).unwrap();

    match result {
        Err(NanoPiError::DeviceError(DeviceError::InsufficientPrivilege(failed))) => {
            assert_eq!(failed, path)
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn open_reports_unmappable_device() {
    // `/dev/null` opens read-write but refuses to be mapped.
    match Device::open_with(NanoPiM1, config(&PathBuf::from("/dev/null"))) {
        Err(NanoPiError::DeviceError(DeviceError::MemoryMapFailed { window, .. })) => {
            assert_eq!(window, "gpio")
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn mapped_device_drives_pins_until_closed() {
    let path = fake_memory_device("mapped");
    let device = Device::open_with(NanoPiM1, config(&path)).unwrap();
    // Mappings outlive the descriptor, which is already closed here.
    fs::remove_file(&path).unwrap();

    {
        let registers = device.registers().unwrap();
        assert_eq!(registers.gpio().len_words(), BLOCK_SIZE * 10 / 4);
        assert_eq!(registers.clock().len_words(), BLOCK_SIZE / 4);
        assert_eq!(registers.pwm().len_words(), BLOCK_SIZE / 4);
    }

    device.set_mode(6, Mode::Output).unwrap();
    device.write(6, State::High).unwrap();
    assert_eq!(device.read(6).unwrap(), State::High);
    device.toggle(6).unwrap();
    assert_eq!(device.read(6).unwrap(), State::Low);
    device.set_pull(6, Pull::PullDown).unwrap();

    {
        let registers = device.registers().unwrap();
        assert_eq!(registers.read_gpio(SUNXI_GPIO_BASE).unwrap(), 0x10);
        assert_eq!(registers.read_gpio(SUNXI_GPIO_BASE + 0x1C).unwrap(), 0b01 << 2);
    }

    assert!(device.close().is_ok());
}
