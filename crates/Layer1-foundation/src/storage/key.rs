//! Store key encoding
//!
//! Every persistent store is keyed by a fixed-size byte string. Types used as
//! keys implement [`StoreKey`]; integers are written big-endian so that the
//! byte order of encoded keys matches their numeric order for non-negative ids.

use crate::{Error, Result};

/// A type that can be used as the key of a persistent store.
pub trait StoreKey: Sized {
    /// Encode the key into its on-disk representation
    fn encode(&self) -> Vec<u8>;

    /// Decode a key previously produced by [`StoreKey::encode`]
    fn decode(bytes: &[u8]) -> Result<Self>;
}

impl StoreKey for i32 {
    fn encode(&self) -> Vec<u8> {
        self.to_be_bytes().to_vec()
    }

    fn decode(bytes: &[u8]) -> Result<Self> {
        let mut reader = KeyReader::new(bytes);
        let value = reader.read_i32()?;
        reader.finish()?;
        Ok(value)
    }
}

// ============================================================================
// Helpers for composite keys
// ============================================================================

/// Builder for composite keys (tag byte + integer components)
#[derive(Debug, Default)]
pub struct KeyWriter {
    buf: Vec<u8>,
}

impl KeyWriter {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub fn tag(mut self, tag: u8) -> Self {
        self.buf.push(tag);
        self
    }

    pub fn i32(mut self, value: i32) -> Self {
        self.buf.extend_from_slice(&value.to_be_bytes());
        self
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}

/// Cursor over an encoded key
#[derive(Debug)]
pub struct KeyReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> KeyReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    pub fn read_tag(&mut self) -> Result<u8> {
        let tag = *self
            .bytes
            .get(self.pos)
            .ok_or_else(|| Error::Encoding("Key truncated before tag".to_string()))?;
        self.pos += 1;
        Ok(tag)
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        let end = self.pos + 4;
        let chunk = self.bytes.get(self.pos..end).ok_or_else(|| {
            Error::Encoding(format!(
                "Key truncated at offset {} (length {})",
                self.pos,
                self.bytes.len()
            ))
        })?;
        let mut raw = [0u8; 4];
        raw.copy_from_slice(chunk);
        self.pos = end;
        Ok(i32::from_be_bytes(raw))
    }

    /// Fail if trailing bytes remain
    pub fn finish(self) -> Result<()> {
        if self.pos != self.bytes.len() {
            return Err(Error::Encoding(format!(
                "Key has {} trailing bytes",
                self.bytes.len() - self.pos
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_i32_key() {
        assert_eq!(42i32.encode(), vec![0, 0, 0, 42]);
        assert_eq!(i32::decode(&[0, 0, 1, 0]).expect("decode"), 256);
        assert_eq!(i32::decode(&(-1i32).encode()).expect("decode"), -1);
    }

    #[test]
    fn test_i32_key_rejects_bad_length() {
        assert!(i32::decode(&[0, 1]).is_err());
        assert!(i32::decode(&[0, 0, 0, 1, 9]).is_err());
    }

    #[test]
    fn test_composite_key() {
        let bytes = KeyWriter::with_capacity(9).tag(2).i32(7).i32(-3).finish();
        assert_eq!(bytes.len(), 9);

        let mut reader = KeyReader::new(&bytes);
        assert_eq!(reader.read_tag().expect("tag"), 2);
        assert_eq!(reader.read_i32().expect("first"), 7);
        assert_eq!(reader.read_i32().expect("second"), -3);
        reader.finish().expect("no trailing bytes");
    }
}
