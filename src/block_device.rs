//! Fixed geometry block device over the part of the store that the settings layer does not use,
//! laid out for a littlefs style filesystem.

use crate::error::Error;
use crate::storage::NvsIo;

pub const BLOCK_SIZE: u32 = 256;

/// The block device never starts below this offset, even if the settings area is smaller.
pub const BASE_OFFSET_MIN: u32 = 4096;

pub const LOOKAHEAD_SIZE: u32 = 32;

pub const BLOCK_CYCLES: u32 = 500;

/// Layout and tuning values handed to the filesystem at mount time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Geometry {
    /// Byte offset of block 0 in the store.
    pub base_offset: u32,
    pub read_size: u32,
    pub prog_size: u32,
    pub block_size: u32,
    pub block_count: u32,
    pub cache_size: u32,
    pub lookahead_size: u32,
    /// Erase cycles before the filesystem relocates a metadata block.
    pub block_cycles: u32,
}

impl Geometry {
    /// Geometry for a store of `size_max` bytes whose first `used` bytes hold settings.
    ///
    /// A store too small to hold any block beyond the base offset yields zero blocks.
    pub fn new(size_max: u32, used: u32) -> Self {
        let base_offset = used.max(BASE_OFFSET_MIN);

        Self {
            base_offset,
            read_size: 1,
            prog_size: BLOCK_SIZE,
            block_size: BLOCK_SIZE,
            block_count: size_max.saturating_sub(base_offset) / BLOCK_SIZE,
            cache_size: BLOCK_SIZE,
            lookahead_size: LOOKAHEAD_SIZE,
            block_cycles: BLOCK_CYCLES,
        }
    }

    /// Store address of `offset` within `block`.
    pub fn address(&self, block: u32, offset: u32) -> u32 {
        self.base_offset + block * self.block_size + offset
    }

    fn assert_in_bounds(&self, block: u32, offset: u32, len: usize) {
        assert!(
            block < self.block_count,
            "block {block} out of range, device has {} blocks",
            self.block_count
        );
        assert!(
            offset as usize + len <= self.block_size as usize,
            "{len} bytes at offset {offset} exceed block size {}",
            self.block_size
        );
    }
}

/// Block device as consumed by a filesystem.
///
/// Block and offset arguments outside of [`BlockDevice::geometry`] are caller bugs and panic.
pub trait BlockDevice {
    type Error;

    fn geometry(&self) -> &Geometry;

    fn read(&mut self, block: u32, offset: u32, buffer: &mut [u8]) -> Result<(), Self::Error>;

    fn program(&mut self, block: u32, offset: u32, buffer: &[u8]) -> Result<(), Self::Error>;

    fn erase(&mut self, block: u32) -> Result<(), Self::Error>;

    fn sync(&mut self) -> Result<(), Self::Error>;
}

/// [`BlockDevice`] backed by an installed [`NvsIo`].
///
/// Blocks are accessed without checksum trailers, the filesystem keeps its own. EEPROM and FRAM
/// cells are overwritten in place, so erasing is a no-op, and every transfer has completed when
/// it returns, so syncing is one too.
pub struct EepromBlockDevice<'a, T: NvsIo> {
    io: &'a mut T,
    geometry: Geometry,
}

impl<'a, T: NvsIo> EepromBlockDevice<'a, T> {
    pub fn new(io: &'a mut T, geometry: Geometry) -> Self {
        Self { io, geometry }
    }
}

impl<T: NvsIo> BlockDevice for EepromBlockDevice<'_, T> {
    type Error = Error;

    fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    fn read(&mut self, block: u32, offset: u32, buffer: &mut [u8]) -> Result<(), Error> {
        self.geometry.assert_in_bounds(block, offset, buffer.len());

        let addr = self.geometry.address(block, offset);
        self.io.read_block(buffer, addr, false).map(|_| ())
    }

    fn program(&mut self, block: u32, offset: u32, buffer: &[u8]) -> Result<(), Error> {
        self.geometry.assert_in_bounds(block, offset, buffer.len());

        let addr = self.geometry.address(block, offset);
        self.io.write_block(addr, buffer, false)
    }

    fn erase(&mut self, _block: u32) -> Result<(), Error> {
        Ok(())
    }

    fn sync(&mut self) -> Result<(), Error> {
        Ok(())
    }
}
