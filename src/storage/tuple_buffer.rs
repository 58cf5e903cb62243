use crate::storage::string_encoder::{StringEncoder, UnpairedSurrogate};

/// Byte buffer a tuple is assembled into.
///
/// Writes are addressed by absolute offset and never truncate: writing past
/// the current end grows the buffer. All multi-byte values are little-endian.
pub trait TupleBuffer {
    fn put_bytes(&mut self, offset: usize, bytes: &[u8]);

    /// Bytes written so far, up to the highest offset written.
    fn as_bytes(&self) -> &[u8];

    /// Consumes the buffer, trimmed to [`written`](TupleBuffer::written) bytes.
    fn into_bytes(self) -> Vec<u8>;

    /// Highest offset written so far, exclusive.
    fn written(&self) -> usize {
        self.as_bytes().len()
    }

    /// Reads a byte previously written, zero if never written.
    fn get_u8(&self, offset: usize) -> u8 {
        self.as_bytes().get(offset).copied().unwrap_or(0)
    }

    fn put_u8(&mut self, offset: usize, v: u8) {
        self.put_bytes(offset, &[v]);
    }

    fn put_i8(&mut self, offset: usize, v: i8) {
        self.put_bytes(offset, &v.to_le_bytes());
    }

    fn put_i16(&mut self, offset: usize, v: i16) {
        self.put_bytes(offset, &v.to_le_bytes());
    }

    fn put_u16(&mut self, offset: usize, v: u16) {
        self.put_bytes(offset, &v.to_le_bytes());
    }

    fn put_i32(&mut self, offset: usize, v: i32) {
        self.put_bytes(offset, &v.to_le_bytes());
    }

    fn put_u32(&mut self, offset: usize, v: u32) {
        self.put_bytes(offset, &v.to_le_bytes());
    }

    fn put_i64(&mut self, offset: usize, v: i64) {
        self.put_bytes(offset, &v.to_le_bytes());
    }

    fn put_f32(&mut self, offset: usize, v: f32) {
        self.put_bytes(offset, &v.to_le_bytes());
    }

    fn put_f64(&mut self, offset: usize, v: f64) {
        self.put_bytes(offset, &v.to_le_bytes());
    }

    /// Writes `text` as UTF-8 and returns the number of bytes written.
    fn put_string(&mut self, offset: usize, text: &str) -> usize {
        self.put_bytes(offset, text.as_bytes());
        text.len()
    }

    /// Encodes UTF-16 code units as UTF-8 and returns the number of bytes
    /// written. Nothing is written if the input has an unpaired surrogate.
    fn put_utf16(
        &mut self,
        offset: usize,
        units: &[u16],
        encoder: &mut StringEncoder,
    ) -> Result<usize, UnpairedSurrogate> {
        let encoded = encoder.encode_utf16(units)?;
        self.put_bytes(offset, encoded);
        Ok(encoded.len())
    }
}
