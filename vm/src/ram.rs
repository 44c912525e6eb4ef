use thiserror::Error;

/// 1 MiB
pub const DEFAULT_RAM_SIZE: u32 = 1024 * 1024;

const WORD: usize = std::mem::size_of::<u32>();

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RAMError {
    #[error("Memory size should be a non-zero multiple of 4, but it is {size}")]
    InvalidSize { size: u32 },
    #[error("Memory access out of bounds: 0x{address:08x}")]
    OutOfBounds { address: u32 },
}

const fn check_bounds(address: u32, len: usize, size: usize) -> Result<usize, RAMError> {
    let start = address as usize;

    match start.checked_add(len) {
        Some(end) if end <= size => Ok(start),
        _ => Err(RAMError::OutOfBounds { address }),
    }
}

/// Flat, zero-initialized, byte-addressable memory. Multi-byte values are little-endian.
#[derive(Debug, Clone)]
pub struct RAM {
    memory: Vec<u8>,
}

impl RAM {
    pub fn new(size: u32) -> Result<Self, RAMError> {
        if size == 0 || size as usize % WORD != 0 {
            return Err(RAMError::InvalidSize { size });
        }

        let memory = vec![0; size as usize];

        Ok(Self { memory })
    }

    pub fn size(&self) -> usize {
        self.memory.len()
    }

    pub fn as_slice(&self) -> &[u8] {
        self.memory.as_slice()
    }

    pub fn read_u32(&self, address: u32) -> Result<u32, RAMError> {
        let address = check_bounds(address, WORD, self.memory.len())?;
        let mut bytes = [0; WORD];

        bytes.copy_from_slice(&self.memory[address..address + WORD]);

        Ok(u32::from_le_bytes(bytes))
    }

    pub fn write_u32(&mut self, value: u32, address: u32) -> Result<(), RAMError> {
        let address = check_bounds(address, WORD, self.memory.len())?;

        self.memory[address..address + WORD].copy_from_slice(&value.to_le_bytes());

        Ok(())
    }

    /// Copies `bytes` verbatim starting at `address`. Nothing is written if the
    /// whole range does not fit.
    pub fn write_bytes(&mut self, bytes: &[u8], address: u32) -> Result<(), RAMError> {
        let address = check_bounds(address, bytes.len(), self.memory.len())?;

        self.memory[address..address + bytes.len()].copy_from_slice(bytes);

        Ok(())
    }
}
