use crate::helpers::assembler_flags::AssemblerFlags;

/// Options for a [`TupleAssembler`](crate::TupleAssembler).
///
/// The default configuration leaves the key-hash field zeroed and only warns
/// when a tuple outgrows its size hint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssemblerConfig {
    pub flags: AssemblerFlags,
}

impl AssemblerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_flags(mut self, flags: AssemblerFlags) -> Self {
        self.flags |= flags;
        self
    }

    pub fn hash_key(&self) -> bool {
        self.flags.contains(AssemblerFlags::HASH_KEY)
    }

    pub fn strict_size(&self) -> bool {
        self.flags.contains(AssemblerFlags::STRICT_SIZE)
    }
}
