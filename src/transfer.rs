use crate::chip::{Chip, WordAddressWidth};
use crate::error::Error;
#[cfg(feature = "debug-logs")]
use embedded_hal::i2c::Error as _;
use embedded_hal::i2c::{I2c, Operation};

/// Data side of a transfer.
#[derive(Debug)]
pub enum Payload<'a> {
    Read(&'a mut [u8]),
    Write(&'a [u8]),
}

/// One addressed I2C transaction. Built on the stack for every call and consumed by
/// [`Transfer::execute`], so no transfer state outlives the call that created it.
#[derive(Debug)]
pub struct Transfer<'a> {
    pub address: u8,
    pub word_addr: u16,
    pub width: WordAddressWidth,
    pub data: Payload<'a>,
}

impl<'a> Transfer<'a> {
    pub fn read<C: Chip>(addr: u32, buf: &'a mut [u8]) -> Self {
        Self::new::<C>(addr, Payload::Read(buf))
    }

    pub fn write<C: Chip>(addr: u32, data: &'a [u8]) -> Self {
        Self::new::<C>(addr, Payload::Write(data))
    }

    fn new<C: Chip>(addr: u32, data: Payload<'a>) -> Self {
        let location = C::locate(addr);
        Self {
            address: location.address,
            word_addr: location.word_addr,
            width: C::WORD_ADDRESS_WIDTH,
            data,
        }
    }

    pub fn is_read(&self) -> bool {
        matches!(self.data, Payload::Read(_))
    }

    pub fn count(&self) -> usize {
        match &self.data {
            Payload::Read(buf) => buf.len(),
            Payload::Write(data) => data.len(),
        }
    }

    /// Runs the transaction. A write sends the word address and the data back to back in one
    /// transaction, a read sends the word address followed by a repeated start.
    pub fn execute<I: I2c>(self, bus: &mut I) -> Result<(), Error> {
        let word_addr = self.word_addr.to_be_bytes();
        let word_addr = match self.width {
            WordAddressWidth::One => &word_addr[1..],
            WordAddressWidth::Two => &word_addr[..],
        };

        #[cfg(feature = "debug-logs")]
        println!(
            "    transfer: {} 0x{:02X}:0x{:04X}[{}]",
            if self.is_read() { "read: " } else { "write:" },
            self.address,
            self.word_addr,
            self.count()
        );

        let result = match self.data {
            Payload::Read(buf) => bus.write_read(self.address, word_addr, buf),
            Payload::Write(data) => bus.transaction(
                self.address,
                &mut [Operation::Write(word_addr), Operation::Write(data)],
            ),
        };

        result.map_err(|_e| {
            #[cfg(feature = "debug-logs")]
            println!("    transfer: FAULT {:?}", _e.kind());
            #[cfg(feature = "defmt")]
            defmt::warn!(
                "i2c transfer {=u8:#x}:{=u16:#x} failed",
                self.address,
                self.word_addr
            );
            Error::Transfer
        })
    }
}

/// Address-only write. Returns `true` if a device acknowledged `address`.
pub fn probe<I: I2c>(bus: &mut I, address: u8) -> bool {
    let present = bus.write(address, &[]).is_ok();

    #[cfg(feature = "defmt")]
    defmt::trace!("probe {=u8:#x}: {=bool}", address, present);

    present
}
