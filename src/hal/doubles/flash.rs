use super::error::FakeError;
use crate::hal::flash::{BlockDevice, BusSpeed, BusWidth, Partition, BLOCK_SIZE};

/// Block device backed by a flat byte store. Reads past the end of the
/// store yield zeroes, as an erased device would.
#[derive(Debug, Default)]
pub struct FakeBlockDevice {
    pub store: Vec<u8>,
    pub fail_init: bool,
    pub fail_read: bool,
    pub initialised: bool,
    pub sessions_ended: u32,
    pub partition: Option<Partition>,
}

impl FakeBlockDevice {
    /// Places `bytes` at the given byte offset, growing the store as
    /// needed.
    pub fn put(&mut self, offset: usize, bytes: &[u8]) {
        if self.store.len() < offset + bytes.len() {
            self.store.resize(offset + bytes.len(), 0);
        }
        self.store[offset..offset + bytes.len()].copy_from_slice(bytes);
    }
}

impl BlockDevice for FakeBlockDevice {
    type Error = FakeError;

    fn init(&mut self, _width: BusWidth, _speed: BusSpeed) -> Result<(), Self::Error> {
        if self.fail_init {
            Err(FakeError)
        } else {
            self.initialised = true;
            Ok(())
        }
    }

    fn select_partition(&mut self, partition: Partition) -> Result<(), Self::Error> {
        if !self.initialised {
            return Err(FakeError);
        }
        self.partition = Some(partition);
        Ok(())
    }

    fn read_blocks(&mut self, lba: u32, buffer: &mut [u8]) -> nb::Result<(), Self::Error> {
        if self.fail_read || !self.initialised {
            return Err(nb::Error::Other(FakeError));
        }
        let offset = lba as usize * BLOCK_SIZE;
        for (index, byte) in buffer.iter_mut().enumerate() {
            *byte = self.store.get(offset + index).copied().unwrap_or(0);
        }
        Ok(())
    }

    fn end(&mut self) {
        self.initialised = false;
        self.sessions_ended += 1;
    }
}
