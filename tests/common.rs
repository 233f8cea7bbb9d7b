#![allow(dead_code)]

// filename according to https://doc.rust-lang.org/book/ch11-03-test-organization.html
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{self, ErrorKind, ErrorType, I2c, NoAcknowledgeSource};

pub const DEVICE_ADDRESS: u8 = 0x50;

/// Simulated 24xx EEPROM. Page writes wrap around inside their page like the real part does,
/// sequential reads roll over at the end of the array.
pub struct Bus {
    pub buf: Vec<u8>,
    pub word_addr_bytes: usize,
    pub page_size: usize,
    pub present: bool,
    pub fail_after_operation: usize,
    pub operations: Vec<Operation>,
}

#[derive(Debug, PartialEq, Clone)]
pub enum Operation {
    Probe { address: u8 },
    Read { address: u8, word_addr: u16, len: usize },
    Write { address: u8, word_addr: u16, len: usize },
}

impl Bus {
    /// Two byte word address part of `size` bytes.
    pub fn new(size: usize, page_size: usize) -> Self {
        Self {
            buf: vec![0xffu8; size],
            word_addr_bytes: 2,
            page_size,
            present: true,
            fail_after_operation: usize::MAX,
            operations: Vec::new(),
        }
    }

    /// 24LC16B: 2 KiB in eight blocks selected by the device address.
    pub fn new_block_select() -> Self {
        Self {
            word_addr_bytes: 1,
            ..Self::new(2048, 16)
        }
    }

    pub fn new_with_fault(size: usize, page_size: usize, fail_after_operation: usize) -> Self {
        Self {
            fail_after_operation,
            ..Self::new(size, page_size)
        }
    }

    pub fn new_absent() -> Self {
        Self {
            present: false,
            ..Self::new(32768, 64)
        }
    }

    pub fn disable_faults(&mut self) {
        self.fail_after_operation = usize::MAX;
    }

    pub fn writes(&self) -> Vec<Operation> {
        self.operations
            .iter()
            .filter(|op| matches!(op, Operation::Write { .. }))
            .cloned()
            .collect()
    }

    pub fn reads(&self) -> Vec<Operation> {
        self.operations
            .iter()
            .filter(|op| matches!(op, Operation::Read { .. }))
            .cloned()
            .collect()
    }

    pub fn dump_operations(&self) {
        println!("Operations:");
        for op in &self.operations {
            println!("  {:?}", op);
        }
    }

    fn device_addresses(&self) -> u8 {
        if self.word_addr_bytes == 1 { 8 } else { 1 }
    }

    fn record(&mut self, op: Operation) -> Result<(), BusError> {
        if self.operations.len() >= self.fail_after_operation {
            println!("    bus: FAULT");
            return Err(BusError(ErrorKind::Bus));
        }
        println!("    bus: {op:?} #{:>2}", self.operations.len());
        self.operations.push(op);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BusError(pub ErrorKind);

impl i2c::Error for BusError {
    fn kind(&self) -> ErrorKind {
        self.0
    }
}

impl ErrorType for Bus {
    type Error = BusError;
}

impl I2c for Bus {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [i2c::Operation<'_>],
    ) -> Result<(), Self::Error> {
        if !self.present
            || address < DEVICE_ADDRESS
            || address >= DEVICE_ADDRESS + self.device_addresses()
        {
            return Err(BusError(ErrorKind::NoAcknowledge(
                NoAcknowledgeSource::Address,
            )));
        }

        let mut written = Vec::new();
        let mut read: Option<&mut [u8]> = None;
        for op in operations.iter_mut() {
            match op {
                i2c::Operation::Write(bytes) => {
                    assert!(read.is_none(), "write after read");
                    written.extend_from_slice(bytes);
                }
                i2c::Operation::Read(buf) => {
                    assert!(read.is_none(), "more than one read");
                    read = Some(&mut **buf);
                }
            }
        }

        if written.is_empty() && read.is_none() {
            return self.record(Operation::Probe { address });
        }

        assert!(written.len() >= self.word_addr_bytes, "missing word address");
        let (word, data) = written.split_at(self.word_addr_bytes);
        let word_addr = word.iter().fold(0u16, |acc, &b| (acc << 8) | b as u16);
        let block = if self.word_addr_bytes == 1 {
            ((address - DEVICE_ADDRESS) as usize) << 8
        } else {
            0
        };
        let start = block + word_addr as usize;

        match read {
            Some(buf) => {
                assert!(data.is_empty(), "data bytes before a read");
                self.record(Operation::Read {
                    address,
                    word_addr,
                    len: buf.len(),
                })?;
                for (i, byte) in buf.iter_mut().enumerate() {
                    *byte = self.buf[(start + i) % self.buf.len()];
                }
            }
            None => {
                self.record(Operation::Write {
                    address,
                    word_addr,
                    len: data.len(),
                })?;
                let page = start & !(self.page_size - 1);
                for (i, &byte) in data.iter().enumerate() {
                    let offset = (start - page + i) % self.page_size;
                    self.buf[page + offset] = byte;
                }
            }
        }
        Ok(())
    }
}

/// Records requested delays instead of sleeping.
#[derive(Default)]
pub struct Delay {
    pub ms: Vec<u32>,
}

impl DelayNs for Delay {
    fn delay_ns(&mut self, _ns: u32) {}

    fn delay_ms(&mut self, ms: u32) {
        self.ms.push(ms);
    }
}
