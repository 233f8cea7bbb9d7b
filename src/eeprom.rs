use crate::chip::{self, Chip};
use crate::error::Error;
use crate::platform::{self, Checksum, Medium};
use crate::storage::NvsIo;
use crate::transfer::{self, Transfer};
use core::fmt::{Debug, Formatter};
use core::marker::PhantomData;
#[cfg(feature = "defmt")]
use defmt::{trace, warn};
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use embedded_storage::{ReadStorage, Storage};

/// Largest read issued in one transaction.
pub const MAX_READ_CHUNK: usize = 255;

/// Byte and block access to an I2C EEPROM or FRAM of family `C`, with `K` guarding checksummed
/// blocks.
///
/// Writes are split at page boundaries of `C` and followed by the write cycle delay when the
/// medium is an EEPROM. Reads are issued in chunks of [`MAX_READ_CHUNK`] bytes.
pub struct Eeprom<I2C, D, C, K> {
    i2c: I2C,
    delay: D,
    medium: Medium,
    _chip: PhantomData<(C, K)>,
}

impl<I2C, D, C, K> Debug for Eeprom<I2C, D, C, K> {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Eeprom")
            .field("medium", &self.medium)
            .finish()
    }
}

impl<I2C, D, C, K> Eeprom<I2C, D, C, K>
where
    I2C: I2c,
    D: DelayNs,
    C: Chip,
    K: Checksum,
{
    /// Wraps the bus without talking to it. See [`Eeprom::init`] for the probing constructor.
    pub fn new(i2c: I2C, delay: D, medium: Medium) -> Self {
        Self {
            i2c,
            delay,
            medium,
            _chip: PhantomData,
        }
    }

    /// Probes the bus for the chip and returns the driver if it answered.
    ///
    /// For use without an [`Nvs`](crate::Nvs) slot. [`Nvs::install`](crate::Nvs::install) probes
    /// on its own and takes a driver built with [`Eeprom::new`].
    pub fn init(i2c: I2C, delay: D, medium: Medium) -> Result<Self, Error> {
        let mut eeprom = Self::new(i2c, delay, medium);
        if !eeprom.probe() {
            return Err(Error::DeviceAbsent);
        }

        #[cfg(feature = "debug-logs")]
        println!("eeprom: {medium} with {} bytes found", C::SIZE_MAX);
        #[cfg(feature = "defmt")]
        trace!(
            "eeprom: {} with {=u32} bytes installed",
            medium,
            C::SIZE_MAX
        );

        Ok(eeprom)
    }

    /// Gives back the bus and the delay provider.
    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    pub fn medium(&self) -> Medium {
        self.medium
    }

    pub fn probe(&mut self) -> bool {
        transfer::probe(&mut self.i2c, chip::DEVICE_ADDRESS)
    }

    pub fn get_byte(&mut self, addr: u32) -> Result<u8, Error> {
        check_range::<C>(addr, 1)?;

        let mut value = [0u8];
        Transfer::read::<C>(addr, &mut value).execute(&mut self.i2c)?;
        Ok(value[0])
    }

    /// Writes a single byte and waits for the write cycle.
    pub fn put_byte(&mut self, addr: u32, value: u8) -> Result<(), Error> {
        check_range::<C>(addr, 1)?;

        Transfer::write::<C>(addr, &[value]).execute(&mut self.i2c)?;
        platform::settle(&mut self.delay, self.medium);
        Ok(())
    }

    /// Writes `source` to `destination`, one transaction per page segment.
    ///
    /// The first failing segment aborts the write and no checksum is written. Already written
    /// segments are not rolled back. With `with_checksum` the checksum of `source` is stored in
    /// the `K::BYTES` bytes following the block, low byte first. An empty `source` writes
    /// nothing, not even a checksum.
    pub fn write_block(
        &mut self,
        destination: u32,
        source: &[u8],
        with_checksum: bool,
    ) -> Result<(), Error> {
        let size = len_u32(source)?;
        let trailer = if with_checksum && size > 0 { K::BYTES } else { 0 };
        check_range::<C>(destination, size.saturating_add(trailer))?;

        #[cfg(feature = "debug-logs")]
        println!("eeprom: write_block: 0x{destination:04X}[{size}] checksum: {with_checksum}");

        let mut destination = destination;
        let mut remaining = source;
        while !remaining.is_empty() {
            let count = remaining.len().min(C::page_remaining(destination) as usize);
            let (segment, rest) = remaining.split_at(count);

            Transfer::write::<C>(destination, segment).execute(&mut self.i2c)?;
            platform::settle(&mut self.delay, self.medium);

            destination += count as u32;
            remaining = rest;
        }

        if trailer > 0 {
            self.write_checksum(destination, K::checksum(source))?;
        }

        Ok(())
    }

    /// Fills `destination` from `source` on.
    ///
    /// Returns `Ok(true)` if the block is verified. Without `with_checksum` every completed read
    /// is verified, with it the checksum of the data read must match the trailer behind the
    /// block. An empty `destination` is verified without touching the bus.
    pub fn read_block(
        &mut self,
        destination: &mut [u8],
        source: u32,
        with_checksum: bool,
    ) -> Result<bool, Error> {
        let size = len_u32(destination)?;
        let trailer = if with_checksum && size > 0 { K::BYTES } else { 0 };
        check_range::<C>(source, size.saturating_add(trailer))?;

        if size == 0 {
            return Ok(true);
        }

        #[cfg(feature = "debug-logs")]
        println!("eeprom: read_block: 0x{source:04X}[{size}] checksum: {with_checksum}");

        let mut source = source;
        for chunk in destination.chunks_mut(MAX_READ_CHUNK) {
            let count = chunk.len() as u32;
            Transfer::read::<C>(source, chunk).execute(&mut self.i2c)?;
            source += count;
        }

        if !with_checksum {
            return Ok(true);
        }

        let stored = self.read_checksum(source)?;
        let verified = K::checksum(destination) == stored;

        if !verified {
            #[cfg(feature = "debug-logs")]
            println!("eeprom: checksum mismatch: stored 0x{stored:04X}");
            #[cfg(feature = "defmt")]
            warn!(
                "eeprom: checksum mismatch for {=u32} bytes before {=u32:#x}",
                size,
                source
            );
        }

        Ok(verified)
    }

    fn write_checksum(&mut self, addr: u32, checksum: u16) -> Result<(), Error> {
        let bytes = checksum.to_le_bytes();
        for (addr, &byte) in (addr..).zip(&bytes[..K::BYTES as usize]) {
            self.put_byte(addr, byte)?;
        }
        Ok(())
    }

    fn read_checksum(&mut self, addr: u32) -> Result<u16, Error> {
        let mut bytes = [0u8; 2];
        for (addr, byte) in (addr..).zip(bytes[..K::BYTES as usize].iter_mut()) {
            *byte = self.get_byte(addr)?;
        }
        Ok(u16::from_le_bytes(bytes))
    }
}

fn len_u32(buf: &[u8]) -> Result<u32, Error> {
    u32::try_from(buf.len()).map_err(|_| Error::OutOfBounds)
}

fn check_range<C: Chip>(addr: u32, len: u32) -> Result<(), Error> {
    match addr.checked_add(len) {
        Some(end) if end <= C::SIZE_MAX => Ok(()),
        _ => Err(Error::OutOfBounds),
    }
}

impl<I2C, D, C, K> NvsIo for Eeprom<I2C, D, C, K>
where
    I2C: I2c,
    D: DelayNs,
    C: Chip,
    K: Checksum,
{
    fn kind(&self) -> Medium {
        self.medium
    }

    fn size_max(&self) -> u32 {
        C::SIZE_MAX
    }

    fn probe(&mut self) -> bool {
        Eeprom::probe(self)
    }

    fn get_byte(&mut self, addr: u32) -> Result<u8, Error> {
        Eeprom::get_byte(self, addr)
    }

    fn put_byte(&mut self, addr: u32, value: u8) -> Result<(), Error> {
        Eeprom::put_byte(self, addr, value)
    }

    fn write_block(
        &mut self,
        destination: u32,
        source: &[u8],
        with_checksum: bool,
    ) -> Result<(), Error> {
        Eeprom::write_block(self, destination, source, with_checksum)
    }

    fn read_block(
        &mut self,
        destination: &mut [u8],
        source: u32,
        with_checksum: bool,
    ) -> Result<bool, Error> {
        Eeprom::read_block(self, destination, source, with_checksum)
    }
}

impl<I2C, D, C, K> ReadStorage for Eeprom<I2C, D, C, K>
where
    I2C: I2c,
    D: DelayNs,
    C: Chip,
    K: Checksum,
{
    type Error = Error;

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        self.read_block(bytes, offset, false).map(|_| ())
    }

    fn capacity(&self) -> usize {
        C::SIZE_MAX as usize
    }
}

impl<I2C, D, C, K> Storage for Eeprom<I2C, D, C, K>
where
    I2C: I2c,
    D: DelayNs,
    C: Chip,
    K: Checksum,
{
    fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error> {
        self.write_block(offset, bytes, false)
    }
}
