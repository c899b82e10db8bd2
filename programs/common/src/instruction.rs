//! Instruction data helpers
//!
//! Bounds-checked little-endian field access for decoding instruction data,
//! plus the matching writer used by clients to build it.

use crate::error::SaleError;

/// Sequential reader over instruction data with a tracked offset
pub struct InstructionReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> InstructionReader<'a> {
    #[inline]
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Bytes left after the current offset
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.offset)
    }

    /// Read a fixed-size byte array and advance
    #[inline]
    pub fn read_bytes<const N: usize>(&mut self) -> Result<[u8; N], SaleError> {
        let end = self
            .offset
            .checked_add(N)
            .ok_or(SaleError::InvalidInstruction)?;
        let slice = self
            .data
            .get(self.offset..end)
            .ok_or(SaleError::InvalidInstruction)?;
        let mut bytes = [0u8; N];
        bytes.copy_from_slice(slice);
        self.offset = end;
        Ok(bytes)
    }

    #[inline]
    pub fn read_u8(&mut self) -> Result<u8, SaleError> {
        let [byte] = self.read_bytes::<1>()?;
        Ok(byte)
    }

    #[inline]
    pub fn read_u64(&mut self) -> Result<u64, SaleError> {
        Ok(u64::from_le_bytes(self.read_bytes::<8>()?))
    }
}

/// Append-only builder producing the layout `InstructionReader` consumes
#[derive(Debug, Default, Clone)]
pub struct InstructionWriter {
    data: Vec<u8>,
}

impl InstructionWriter {
    pub fn new(discriminator: u8) -> Self {
        Self {
            data: vec![discriminator],
        }
    }

    pub fn write_bytes(mut self, bytes: &[u8]) -> Self {
        self.data.extend_from_slice(bytes);
        self
    }

    pub fn write_u64(self, value: u64) -> Self {
        self.write_bytes(&value.to_le_bytes())
    }

    pub fn finish(self) -> Vec<u8> {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_sequence() {
        let data = [
            7u8, // u8
            0x08, 0x07, 0x06, 0x05, 0x04, 0x03, 0x02, 0x01, // u64
            9, 9, // bytes
        ];

        let mut reader = InstructionReader::new(&data);
        assert_eq!(reader.remaining(), 11);

        assert_eq!(reader.read_u8().unwrap(), 7);
        assert_eq!(reader.read_u64().unwrap(), 0x0102030405060708);
        assert_eq!(reader.offset(), 9);

        let tail: [u8; 2] = reader.read_bytes().unwrap();
        assert_eq!(tail, [9, 9]);
        assert_eq!(reader.remaining(), 0);

        assert_eq!(reader.read_u8(), Err(SaleError::InvalidInstruction));
    }

    #[test]
    fn test_short_read_does_not_advance() {
        let data = [1u8, 2, 3];
        let mut reader = InstructionReader::new(&data);

        assert_eq!(reader.read_u64(), Err(SaleError::InvalidInstruction));
        assert_eq!(reader.offset(), 0);
        assert_eq!(reader.read_u8().unwrap(), 1);
    }

    #[test]
    fn test_writer_layout() {
        let data = InstructionWriter::new(2)
            .write_u64(0x0102)
            .write_bytes(&[0xAA])
            .finish();

        assert_eq!(data, vec![2, 0x02, 0x01, 0, 0, 0, 0, 0, 0, 0xAA]);
    }
}
