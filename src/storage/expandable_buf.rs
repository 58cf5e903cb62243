use tracing::trace;

use crate::storage::tuple_buffer::TupleBuffer;

/// Zero-filled, `Vec`-backed [`TupleBuffer`].
///
/// The buffer starts at the requested size and doubles whenever a write lands
/// past its end. [`into_bytes`](TupleBuffer::into_bytes) trims it back to the
/// highest offset written.
#[derive(Debug, Clone)]
pub struct ExpandableByteBuf {
    buf: Vec<u8>,
    written: usize,
}

impl ExpandableByteBuf {
    pub fn new(size: usize) -> Self {
        Self {
            buf: vec![0u8; size],
            written: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    fn ensure_capacity(&mut self, required: usize) {
        if required <= self.buf.len() {
            return;
        }

        let new_len = required.max(self.buf.len() * 2);
        trace!(from = self.buf.len(), to = new_len, "growing tuple buffer");
        self.buf.resize(new_len, 0);
    }
}

impl TupleBuffer for ExpandableByteBuf {
    fn put_bytes(&mut self, offset: usize, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }

        let end = offset + bytes.len();
        self.ensure_capacity(end);
        self.buf[offset..end].copy_from_slice(bytes);
        self.written = self.written.max(end);
    }

    fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.written]
    }

    fn into_bytes(mut self) -> Vec<u8> {
        self.buf.truncate(self.written);
        self.buf
    }
}
