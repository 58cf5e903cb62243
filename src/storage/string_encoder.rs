/// UTF-16 input contained a surrogate without its pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnpairedSurrogate {
    /// Index of the offending code unit.
    pub position: usize,
}

/// Reusable UTF-16 to UTF-8 encoder.
///
/// Each assembler creates one on its first string append and drops it with
/// itself; the scratch space is reused across appends of the same tuple.
#[derive(Debug, Default)]
pub struct StringEncoder {
    scratch: Vec<u8>,
}

impl StringEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encodes the whole input or nothing.
    pub fn encode_utf16(&mut self, units: &[u16]) -> Result<&[u8], UnpairedSurrogate> {
        self.scratch.clear();

        let mut position = 0;
        let mut tmp = [0u8; 4];
        for decoded in char::decode_utf16(units.iter().copied()) {
            let ch = decoded.map_err(|_| UnpairedSurrogate { position })?;
            position += ch.len_utf16();
            self.scratch.extend_from_slice(ch.encode_utf8(&mut tmp).as_bytes());
        }

        Ok(self.scratch.as_slice())
    }
}
