//! Bare metal non-volatile storage on I2C EEPROM and FRAM chips.
//!
//! [`Eeprom`] gives byte and block access to a chip on an [`embedded_hal::i2c::I2c`] bus. Block
//! writes are split at the page boundaries of the chip family and can carry a checksum trailer
//! that block reads verify. The driver is installed into an [`Nvs`] slot once the chip answered
//! its probe; the slot can carve the unused tail of the chip into a [`BlockDevice`] for a
//! filesystem.
//!
//! ```ignore
//! use eeprom_nvs::chip::Eeprom24AA256;
//! use eeprom_nvs::platform::{Crc16, Medium};
//! use eeprom_nvs::{Eeprom, Nvs};
//!
//! let mut nvs = Nvs::new(1024);
//! nvs.install(Eeprom::<_, _, Eeprom24AA256, Crc16>::new(i2c, delay, Medium::Eeprom))?;
//!
//! let settings = nvs.physical().unwrap();
//! settings.write_block(0, &bytes, true)?;
//! let verified = settings.read_block(&mut bytes, 0, true)?;
//! ```
//!
//! All calls block until the bus transfers and write cycles have completed. Transfer state lives
//! on the stack of each call and the driver is only reachable through `&mut`, so callers from
//! several execution contexts have to serialize whole calls, for example by keeping the [`Nvs`]
//! behind a mutex. A shared bus alone only serializes single transactions.
#![cfg_attr(not(target_arch = "x86_64"), no_std)]

pub mod block_device;
pub mod chip;
mod eeprom;
pub mod error;
pub mod platform;
mod storage;
pub mod transfer;

pub use block_device::{BlockDevice, EepromBlockDevice, Geometry};
pub use eeprom::{Eeprom, MAX_READ_CHUNK};
pub use storage::{Nvs, NvsIo};
