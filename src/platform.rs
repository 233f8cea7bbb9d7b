use embedded_hal::delay::DelayNs;

/// Time an EEPROM needs to commit a page or byte write before it acknowledges again.
pub const WRITE_CYCLE_MS: u32 = 5;

/// The kind of memory behind the bus address.
#[derive(strum::Display, strum::FromRepr, Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Medium {
    /// Classic EEPROM, every write is followed by an internal write cycle.
    Eeprom = 0,
    /// Ferroelectric RAM, writes complete at bus speed.
    Fram = 1,
}

impl Medium {
    /// Settle delay required after a write transaction, `None` if the medium needs none.
    pub const fn write_cycle_ms(self) -> Option<u32> {
        match self {
            Medium::Eeprom => Some(WRITE_CYCLE_MS),
            Medium::Fram => None,
        }
    }
}

/// Blocks for the write cycle of `medium`. FRAM returns immediately without touching `delay`.
pub(crate) fn settle<D: DelayNs>(delay: &mut D, medium: Medium) {
    if let Some(ms) = medium.write_cycle_ms() {
        delay.delay_ms(ms);
    }
}

/// Integrity checksum stored as a trailer behind checksummed blocks.
///
/// `BYTES` is the trailer width. The low byte of the value is stored first, followed by the
/// high byte when `BYTES == 2`. One byte implementations must return values below 0x100.
pub trait Checksum {
    const BYTES: u32;

    fn checksum(data: &[u8]) -> u16;
}

/// Single byte rotate-and-add checksum: `sum = rotl(sum, 1) + byte`, starting at zero.
///
/// Both steps are bijections on `u8`, so any change of a single byte, and therefore any single
/// bit flip, changes the result.
#[derive(Debug, Clone, Copy, Default)]
pub struct RotatingSum;

impl Checksum for RotatingSum {
    const BYTES: u32 = 1;

    fn checksum(data: &[u8]) -> u16 {
        data.iter()
            .fold(0u8, |sum, &byte| sum.rotate_left(1).wrapping_add(byte)) as u16
    }
}

/// Two byte CRC-16/CCITT-FALSE (poly 0x1021, init 0xFFFF, no reflection, no final xor).
#[derive(Debug, Clone, Copy, Default)]
pub struct Crc16;

impl Checksum for Crc16 {
    const BYTES: u32 = 2;

    fn checksum(data: &[u8]) -> u16 {
        let mut crc: u16 = 0xFFFF;

        for &byte in data {
            crc ^= (byte as u16) << 8;
            for _ in 0..8 {
                if crc & 0x8000 != 0 {
                    crc = (crc << 1) ^ 0x1021;
                } else {
                    crc <<= 1;
                }
            }
        }

        crc
    }
}
