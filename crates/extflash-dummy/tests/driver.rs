//! FlashDriver against the emulated chip
//!
//! Tests that count bus traffic after `init()` or expect block 0 erased are
//! skipped with `destructive-selftest`, since `init()` then rewrites block 0.

use extflash_core::bus::SpiMode;
use extflash_core::chip::{ChipVariant, FlashChip, Gd25wb256e, JedecId, Mx25r6435f};
use extflash_core::error::{Error, IdentFailure};
use extflash_core::flash::{DriverConfig, EraseCursor, FlashDriver, IdentPolicy};
use extflash_core::spi::opcodes;
use extflash_dummy::{DummyConfig, DummyFlash};

fn ready<C: FlashChip>(chip: C, config: DummyConfig) -> FlashDriver<DummyFlash, C> {
    let mut driver = FlashDriver::new(DummyFlash::new(config), chip, DriverConfig::default());
    driver.init().unwrap();
    driver.bus_mut().take_transactions();
    driver
}

fn opcodes_sent(driver: &mut FlashDriver<DummyFlash, impl FlashChip>) -> Vec<u8> {
    driver
        .bus_mut()
        .take_transactions()
        .iter()
        .filter_map(|t| t.opcode())
        .collect()
}

#[test]
#[cfg(not(feature = "destructive-selftest"))]
fn write_then_read_on_32mib_part() {
    let mut flash = ready(Gd25wb256e, DummyConfig::for_chip(&Gd25wb256e));
    let geometry = flash.geometry();
    assert_eq!(geometry.total_size, 32 * 1024 * 1024);
    assert_eq!(geometry.page_size, 256);
    assert_eq!(geometry.erase_block_size, 32 * 1024);

    flash.write(0, &[0xAA; 16]).unwrap();
    flash.wait_idle(0, 100).unwrap();

    let mut buf = [0u8; 16];
    flash.read(0, &mut buf).unwrap();
    assert_eq!(buf, [0xAA; 16]);
}

#[test]
#[cfg(not(feature = "destructive-selftest"))]
fn init_configures_bus_and_identifies() {
    let mut flash = FlashDriver::new(
        DummyFlash::for_chip(&Gd25wb256e),
        Gd25wb256e,
        DriverConfig::default(),
    );
    assert_eq!(flash.init().unwrap(), JedecId::new(0xC8, 0x65, 0x19));

    let bus = flash.bus().bus_config().unwrap();
    assert_eq!(bus.frequency_hz, 8_000_000);
    assert_eq!(bus.mode, SpiMode::Mode3);
    assert!(!flash.bus().cs_active());
    assert_eq!(opcodes_sent(&mut flash), vec![opcodes::RDID]);
}

#[test]
fn init_honours_frequency_override() {
    let config = DriverConfig::default().with_frequency(1_000_000);
    let mut flash = FlashDriver::new(DummyFlash::for_chip(&Mx25r6435f), Mx25r6435f, config);
    flash.init().unwrap();
    let bus = flash.bus().bus_config().unwrap();
    assert_eq!(bus.frequency_hz, 1_000_000);
    assert_eq!(bus.mode, SpiMode::Mode0);
}

#[test]
#[cfg(not(feature = "destructive-selftest"))]
fn init_waits_out_power_up() {
    let dummy = DummyFlash::new(DummyConfig::for_chip(&Gd25wb256e).with_ident_delay(5));
    let config = DriverConfig::default().with_ident(IdentPolicy::new(10, 100));
    let mut flash = FlashDriver::new(dummy, Gd25wb256e, config);

    assert_eq!(flash.init().unwrap(), Gd25wb256e.id());
    assert_eq!(flash.bus().elapsed_us(), 5 * 100);
    assert_eq!(opcodes_sent(&mut flash), vec![opcodes::RDID; 6]);
}

#[test]
fn init_gives_up_after_policy_budget() {
    let dummy = DummyFlash::new(DummyConfig::for_chip(&Gd25wb256e).with_ident_delay(50));
    let config = DriverConfig::default().with_ident(IdentPolicy::new(4, 10));
    let mut flash = FlashDriver::new(dummy, Gd25wb256e, config);

    assert_eq!(
        flash.init(),
        Err(Error::IdentificationFailed(IdentFailure::NotDetected {
            last: JedecId::new(0xFF, 0xFF, 0xFF),
            attempts: 4,
        }))
    );
    assert_eq!(flash.bus().elapsed_us(), 3 * 10);
}

#[test]
fn init_rejects_wrong_part() {
    let config = DriverConfig::default().with_ident(IdentPolicy::once());
    let mut flash = FlashDriver::new(DummyFlash::for_chip(&Mx25r6435f), Gd25wb256e, config);
    assert_eq!(
        flash.init(),
        Err(Error::IdentificationFailed(IdentFailure::NotDetected {
            last: Mx25r6435f.id(),
            attempts: 1,
        }))
    );
}

#[test]
#[cfg(not(feature = "destructive-selftest"))]
fn write_crossing_page_is_rejected() {
    let mut flash = ready(Gd25wb256e, DummyConfig::for_chip(&Gd25wb256e));
    assert_eq!(flash.write(250, &[0x00; 10]), Err(Error::OutOfRange));
    assert_eq!(flash.write(0, &[0x00; 257]), Err(Error::OutOfRange));

    // Only the busy checks reached the chip
    assert_eq!(opcodes_sent(&mut flash), vec![opcodes::RDSR, opcodes::RDSR]);
    assert!(flash.bus().data()[..512].iter().all(|&b| b == 0xFF));
}

#[test]
fn read_past_end_is_rejected() {
    let mut flash = ready(Mx25r6435f, DummyConfig::for_chip(&Mx25r6435f));
    let total = flash.geometry().total_size;

    let mut buf = [0u8; 2];
    assert_eq!(flash.read(total - 1, &mut buf), Err(Error::OutOfRange));
    assert_eq!(buf, [0u8; 2]);
    assert_eq!(opcodes_sent(&mut flash), vec![opcodes::RDSR]);

    let mut last = [0u8; 1];
    flash.read(total - 1, &mut last).unwrap();
    assert_eq!(last, [0xFF]);
}

#[test]
fn write_past_end_is_rejected() {
    let mut flash = ready(Mx25r6435f, DummyConfig::for_chip(&Mx25r6435f));
    let total = flash.geometry().total_size;
    assert_eq!(flash.write(total, &[0x00]), Err(Error::OutOfRange));
    assert_eq!(flash.write(total - 1, &[0x00]), Ok(()));
}

#[test]
#[cfg(not(feature = "destructive-selftest"))]
fn write_up_to_page_end_is_accepted() {
    let mut flash = ready(Gd25wb256e, DummyConfig::for_chip(&Gd25wb256e).with_busy_polls(0));
    flash.write(250, &[0x11; 6]).unwrap();
    assert_eq!(&flash.bus().data()[250..256], &[0x11; 6]);
    assert_eq!(flash.bus().data()[256], 0xFF);
    assert_eq!(flash.bus().data()[0], 0xFF);
}

#[test]
fn erase_rejects_misaligned_address() {
    let mut flash = ready(Gd25wb256e, DummyConfig::for_chip(&Gd25wb256e));
    let mut address = 1;
    let mut remaining = 1;
    assert_eq!(
        flash.erase(&mut address, &mut remaining),
        Err(Error::OutOfRange)
    );
    assert_eq!((address, remaining), (1, 1));
    assert!(!opcodes_sent(&mut flash).contains(&opcodes::WREN));
}

#[test]
fn erase_advances_cursor_by_one_block() {
    let mut flash = ready(Gd25wb256e, DummyConfig::for_chip(&Gd25wb256e));
    flash.bus_mut().data_mut()[..0x10000].fill(0x00);

    let mut address = 0;
    let mut remaining = 2;
    flash.erase(&mut address, &mut remaining).unwrap();
    assert_eq!((address, remaining), (0x8000, 1));
    assert_eq!(
        opcodes_sent(&mut flash),
        vec![opcodes::RDSR, opcodes::WREN, opcodes::RDSR, opcodes::BE_5C]
    );

    flash.wait_idle(0, 100).unwrap();
    let mut buf = vec![0u8; 0x8000];
    flash.read(0, &mut buf).unwrap();
    assert!(buf.iter().all(|&b| b == 0xFF));

    // The next block was not touched yet
    flash.read(0x8000, &mut buf).unwrap();
    assert!(buf.iter().all(|&b| b == 0x00));
}

#[test]
fn erase_cursor_runs_to_completion() {
    let mut flash = ready(Mx25r6435f, DummyConfig::for_chip(&Mx25r6435f));
    flash.bus_mut().data_mut()[..0x20000].fill(0x5A);

    let mut cursor = EraseCursor::new(0x8000, 3);
    while !cursor.is_done() {
        flash.erase_next(&mut cursor).unwrap();
        flash.wait_idle(0, 100).unwrap();
    }
    assert_eq!(cursor, EraseCursor::new(0x20000, 0));
    assert_eq!(flash.bus().data()[0x7FFF], 0x5A);
    assert!(flash.bus().data()[0x8000..0x20000].iter().all(|&b| b == 0xFF));
    assert_eq!(flash.erase_next(&mut cursor), Err(Error::OutOfRange));
}

#[test]
fn erase_with_nothing_remaining_sends_nothing() {
    let mut flash = ready(Gd25wb256e, DummyConfig::for_chip(&Gd25wb256e));
    let mut address = 0;
    let mut remaining = 0;
    assert_eq!(
        flash.erase(&mut address, &mut remaining),
        Err(Error::OutOfRange)
    );
    assert!(flash.bus().transactions().is_empty());
}

#[test]
fn erase_of_last_block() {
    let mut flash = ready(Gd25wb256e, DummyConfig::for_chip(&Gd25wb256e));
    let total = flash.geometry().total_size;
    let block = flash.geometry().erase_block_size;

    let mut address = total - block;
    let mut remaining = 5;
    flash.erase(&mut address, &mut remaining).unwrap();
    assert_eq!((address, remaining), (total, 4));

    flash.wait_idle(0, 100).unwrap();
    assert_eq!(
        flash.erase(&mut address, &mut remaining),
        Err(Error::OutOfRange)
    );
}

#[test]
fn busy_chip_rejects_everything_without_side_effects() {
    let mut flash = ready(Gd25wb256e, DummyConfig::for_chip(&Gd25wb256e));
    flash.bus_mut().data_mut()[0] = 0x00;
    flash.bus_mut().set_busy(100);

    let mut buf = [0u8; 4];
    assert_eq!(flash.read(0, &mut buf), Err(Error::Busy));
    assert_eq!(buf, [0u8; 4]);
    assert_eq!(flash.write(0x100, &[0x00; 4]), Err(Error::Busy));

    let mut address = 0;
    let mut remaining = 1;
    assert_eq!(flash.erase(&mut address, &mut remaining), Err(Error::Busy));
    assert_eq!((address, remaining), (0, 1));

    assert_eq!(opcodes_sent(&mut flash), vec![opcodes::RDSR; 3]);
    assert_eq!(flash.bus().data()[0], 0x00);
    assert_eq!(flash.bus().data()[0x100], 0xFF);
    assert!(!flash.bus().write_enabled());
}

#[test]
#[cfg(not(feature = "destructive-selftest"))]
fn back_to_back_write_sees_busy() {
    let mut flash = ready(Gd25wb256e, DummyConfig::for_chip(&Gd25wb256e).with_busy_polls(3));
    flash.write(0, &[0x01]).unwrap();
    assert_eq!(flash.write(1, &[0x02]), Err(Error::Busy));
    assert!(flash.is_busy().unwrap());
    assert!(flash.is_busy().unwrap());
    assert!(!flash.is_busy().unwrap());
    flash.write(1, &[0x02]).unwrap();
    assert_eq!(&flash.bus().data()[..2], &[0x01, 0x02]);
}

#[test]
#[cfg(not(feature = "destructive-selftest"))]
fn write_enable_failure_is_reported() {
    let mut flash = ready(
        Gd25wb256e,
        DummyConfig::for_chip(&Gd25wb256e).with_ignore_wren(true),
    );
    assert_eq!(flash.write(0, &[0x00; 4]), Err(Error::WriteEnableFailed));

    let mut address = 0;
    let mut remaining = 1;
    assert_eq!(
        flash.erase(&mut address, &mut remaining),
        Err(Error::WriteEnableFailed)
    );
    assert_eq!((address, remaining), (0, 1));

    let sent = opcodes_sent(&mut flash);
    assert!(!sent.contains(&opcodes::PP_4B));
    assert!(!sent.contains(&opcodes::BE_5C));
    assert!(flash.bus().data()[..4].iter().all(|&b| b == 0xFF));
}

#[test]
fn read_is_chunked_with_chip_select_held() {
    let mut flash = ready(Gd25wb256e, DummyConfig::for_chip(&Gd25wb256e));
    for (i, b) in flash.bus_mut().data_mut()[..1000].iter_mut().enumerate() {
        *b = i as u8;
    }

    let mut buf = vec![0u8; 1000];
    flash.read(0, &mut buf).unwrap();
    assert!(buf.iter().enumerate().all(|(i, &b)| b == i as u8));

    let log = flash.bus_mut().take_transactions();
    let read = log.last().unwrap();
    assert_eq!(read.opcode(), Some(opcodes::READ_4B));
    assert_eq!(read.exchanges, vec![5, 255, 255, 255, 235]);
}

#[test]
fn program_respects_smaller_controller_limit() {
    let config = DummyConfig::for_chip(&Mx25r6435f)
        .with_max_transfer_len(64)
        .with_busy_polls(0);
    let mut flash = ready(Mx25r6435f, config);

    let page: Vec<u8> = (0..=255u8).collect();
    flash.write(0x100, &page).unwrap();
    assert_eq!(&flash.bus().data()[0x100..0x200], page.as_slice());

    let log = flash.bus_mut().take_transactions();
    let program = log.last().unwrap();
    assert_eq!(program.opcode(), Some(opcodes::PP));
    assert_eq!(program.mosi[..4], [opcodes::PP, 0x00, 0x01, 0x00]);
    assert_eq!(program.exchanges, vec![4, 64, 64, 64, 64]);
}

#[test]
fn upper_half_of_32mib_part_is_addressable() {
    let mut flash = ready(Gd25wb256e, DummyConfig::for_chip(&Gd25wb256e));
    let address = 0x0100_0010;

    flash.write(address, &[0xC3; 8]).unwrap();
    flash.wait_idle(0, 100).unwrap();
    assert_eq!(&flash.bus().data()[0x0100_0010..0x0100_0018], &[0xC3; 8]);
    // Nothing aliased into the lower 16 MiB
    assert_eq!(flash.bus().data()[0x10], 0xFF);

    let mut buf = [0u8; 8];
    flash.read(address, &mut buf).unwrap();
    assert_eq!(buf, [0xC3; 8]);

    let log = flash.bus_mut().take_transactions();
    let program = log
        .iter()
        .find(|t| t.opcode() == Some(opcodes::PP_4B))
        .unwrap();
    assert_eq!(program.mosi[..5], [opcodes::PP_4B, 0x01, 0x00, 0x00, 0x10]);
}

#[test]
fn zero_length_requests_do_not_touch_the_array() {
    let mut flash = ready(Gd25wb256e, DummyConfig::for_chip(&Gd25wb256e));
    flash.write(0x40, &[]).unwrap();
    flash.read(0x40, &mut []).unwrap();
    assert_eq!(opcodes_sent(&mut flash), vec![opcodes::RDSR, opcodes::RDSR]);
}

#[test]
fn transfer_failure_releases_chip_select() {
    let mut flash = ready(Gd25wb256e, DummyConfig::for_chip(&Gd25wb256e));
    flash.bus_mut().fail_next_exchange();
    let mut buf = [0u8; 4];
    assert_eq!(flash.read(0, &mut buf), Err(Error::TransferFailed));
    assert!(!flash.bus().cs_active());
    flash.read(0, &mut buf).unwrap();
}

#[test]
fn geometry_is_pure() {
    let flash = ready(ChipVariant::Gd25le255e, DummyConfig::for_chip(&ChipVariant::Gd25le255e));
    let first = flash.geometry();
    assert_eq!(first, flash.geometry());
    assert_eq!(first.timing, flash.timing());
    assert!(flash.bus().transactions().is_empty());
}

#[test]
#[cfg(not(feature = "destructive-selftest"))]
fn wait_idle_times_out() {
    let mut flash = ready(Gd25wb256e, DummyConfig::for_chip(&Gd25wb256e));
    flash.bus_mut().set_busy(1_000);
    assert_eq!(flash.wait_idle(10, 50), Err(Error::Timeout));
    assert_eq!(flash.bus().elapsed_us(), 50);
}

#[test]
#[cfg(not(feature = "destructive-selftest"))]
fn release_returns_the_bus() {
    let mut flash = ready(Gd25wb256e, DummyConfig::for_chip(&Gd25wb256e).with_busy_polls(0));
    flash.write(0, &[0x42]).unwrap();
    let (dummy, chip) = flash.release();
    assert_eq!(chip, Gd25wb256e);
    assert_eq!(dummy.data()[0], 0x42);
}
