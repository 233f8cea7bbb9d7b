//! Address translation for the supported I2C EEPROM families.
//!
//! A logical linear address is split into the 7-bit device-select address and the word address
//! that follows it on the wire. Larger parts take a two byte word address behind a fixed device
//! address. Small parts take a single byte and fold the high address bits into the device
//! address ("block select").

/// Base 7-bit address of the 24xx family (`0xA0 >> 1`).
pub const DEVICE_ADDRESS: u8 = 0x50;

/// Number of word address bytes sent after the device address.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WordAddressWidth {
    One = 1,
    Two = 2,
}

/// Wire-level position of a logical address.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Location {
    /// 7-bit device-select address.
    pub address: u8,
    /// In-device word address.
    pub word_addr: u16,
}

/// A chip family. Implementations only translate addresses; splitting writes at page boundaries
/// is the job of the transfer engine.
pub trait Chip {
    const WORD_ADDRESS_WIDTH: WordAddressWidth;

    /// Page write buffer size, a power of two. A write wraps around inside its page.
    const PAGE_SIZE: u32;

    /// Addressable bytes.
    const SIZE_MAX: u32;

    /// Translates `addr`, which must be below `SIZE_MAX`.
    fn locate(addr: u32) -> Location;

    /// Bytes from `addr` up to the end of its page.
    fn page_remaining(addr: u32) -> u32 {
        Self::PAGE_SIZE - (addr & (Self::PAGE_SIZE - 1))
    }
}

/// Microchip 24AAxxx/24LCxxx parts above 16 kbit, two byte word address.
///
/// `KBIT` is the capacity in kilobits, a power of two from 32 to 512. Parts of 128 kbit and up
/// have a 64 byte page, smaller ones a 32 byte page.
#[derive(Debug, Clone, Copy, Default)]
pub struct Microchip24AAxxx<const KBIT: u32>;

pub type Eeprom24AA32 = Microchip24AAxxx<32>;
pub type Eeprom24AA64 = Microchip24AAxxx<64>;
pub type Eeprom24AA128 = Microchip24AAxxx<128>;
pub type Eeprom24AA256 = Microchip24AAxxx<256>;
pub type Eeprom24AA512 = Microchip24AAxxx<512>;

impl<const KBIT: u32> Chip for Microchip24AAxxx<KBIT> {
    const WORD_ADDRESS_WIDTH: WordAddressWidth = WordAddressWidth::Two;

    const PAGE_SIZE: u32 = if KBIT >= 128 { 64 } else { 32 };

    const SIZE_MAX: u32 = {
        assert!(
            KBIT.is_power_of_two() && KBIT >= 32 && KBIT <= 512,
            "24AAxxx capacity must be a power of two between 32 and 512 kbit"
        );
        KBIT / 8 * 1024
    };

    fn locate(addr: u32) -> Location {
        Location {
            address: DEVICE_ADDRESS,
            word_addr: addr as u16,
        }
    }
}

/// Microchip 24LC16B, 16 kbit organised as eight 256 byte blocks.
///
/// The block number occupies the three low bits of the device address. The field is masked to
/// those three bits, so the part never answers for addresses of a neighbouring device.
#[derive(Debug, Clone, Copy, Default)]
pub struct Microchip24LC16B;

const BLOCK_SELECT_MASK: u8 = 0x07;

impl Chip for Microchip24LC16B {
    const WORD_ADDRESS_WIDTH: WordAddressWidth = WordAddressWidth::One;

    const PAGE_SIZE: u32 = 16;

    const SIZE_MAX: u32 = 2048;

    fn locate(addr: u32) -> Location {
        Location {
            address: DEVICE_ADDRESS | ((addr >> 8) as u8 & BLOCK_SELECT_MASK),
            word_addr: (addr & 0xFF) as u16,
        }
    }
}
