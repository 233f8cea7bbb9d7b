use crate::block_device::{EepromBlockDevice, Geometry};
use crate::error::Error;
use crate::platform::Medium;
#[cfg(feature = "defmt")]
use defmt::trace;

/// Byte and block access to a physical non-volatile store.
///
/// Addresses are linear byte offsets below [`NvsIo::size_max`]. Block reads return `Ok(false)`
/// when the checksum trailer does not match the data.
pub trait NvsIo {
    fn kind(&self) -> Medium;

    fn size_max(&self) -> u32;

    /// Returns `true` if the device acknowledges its address.
    fn probe(&mut self) -> bool;

    fn get_byte(&mut self, addr: u32) -> Result<u8, Error>;

    fn put_byte(&mut self, addr: u32, value: u8) -> Result<(), Error>;

    fn write_block(
        &mut self,
        destination: u32,
        source: &[u8],
        with_checksum: bool,
    ) -> Result<(), Error>;

    fn read_block(
        &mut self,
        destination: &mut [u8],
        source: u32,
        with_checksum: bool,
    ) -> Result<bool, Error>;
}

impl<T: NvsIo> NvsIo for &mut T {
    fn kind(&self) -> Medium {
        T::kind(self)
    }

    fn size_max(&self) -> u32 {
        T::size_max(self)
    }

    fn probe(&mut self) -> bool {
        T::probe(self)
    }

    fn get_byte(&mut self, addr: u32) -> Result<u8, Error> {
        T::get_byte(self, addr)
    }

    fn put_byte(&mut self, addr: u32, value: u8) -> Result<(), Error> {
        T::put_byte(self, addr, value)
    }

    fn write_block(
        &mut self,
        destination: u32,
        source: &[u8],
        with_checksum: bool,
    ) -> Result<(), Error> {
        T::write_block(self, destination, source, with_checksum)
    }

    fn read_block(
        &mut self,
        destination: &mut [u8],
        source: u32,
        with_checksum: bool,
    ) -> Result<bool, Error> {
        T::read_block(self, destination, source, with_checksum)
    }
}

/// The storage slot owned by the settings layer.
///
/// Empty until a driver whose device answers the probe is installed, after which it is never
/// replaced. An empty slot means no non-volatile storage is available.
pub struct Nvs<T: NvsIo> {
    physical: Option<T>,
    size: u32,
}

impl<T: NvsIo> Nvs<T> {
    /// `size` is the number of bytes the settings layer keeps at the start of the store.
    pub const fn new(size: u32) -> Self {
        Self {
            physical: None,
            size,
        }
    }

    /// Probes `io` and keeps it if the device answered. The slot is left untouched on error.
    ///
    /// Pass a driver that has not been probed yet, e.g. from [`Eeprom::new`](crate::Eeprom::new).
    pub fn install(&mut self, mut io: T) -> Result<(), Error> {
        if self.physical.is_some() {
            return Err(Error::AlreadyInstalled);
        }

        if !io.probe() {
            #[cfg(feature = "defmt")]
            trace!("nvs: no device, storage unavailable");
            return Err(Error::DeviceAbsent);
        }

        #[cfg(feature = "debug-logs")]
        println!("nvs: {} installed, {} bytes", io.kind(), io.size_max());
        #[cfg(feature = "defmt")]
        trace!("nvs: {} installed, {=u32} bytes", io.kind(), io.size_max());

        self.physical = Some(io);
        Ok(())
    }

    pub fn is_available(&self) -> bool {
        self.physical.is_some()
    }

    pub fn physical(&mut self) -> Option<&mut T> {
        self.physical.as_mut()
    }

    pub fn kind(&self) -> Option<Medium> {
        self.physical.as_ref().map(T::kind)
    }

    /// Bytes used by the settings layer.
    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn size_max(&self) -> Option<u32> {
        self.physical.as_ref().map(T::size_max)
    }

    /// Block device over the store beyond the settings area, `None` without an installed driver.
    pub fn block_device(&mut self) -> Option<EepromBlockDevice<'_, T>> {
        let geometry = Geometry::new(self.size_max()?, self.size);
        let io = self.physical.as_mut()?;
        Some(EepromBlockDevice::new(io, geometry))
    }
}
