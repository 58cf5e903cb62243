use bitflags::bitflags;

bitflags! {
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct AssemblerFlags: u8 {
        /// Stamp the CRC-32 of the key chunk into the key-hash field
        const HASH_KEY    = 0b0000_0001;

        /// Fail finalize when more bytes were written than the size hint
        const STRICT_SIZE = 0b0000_0010;
    }
}
