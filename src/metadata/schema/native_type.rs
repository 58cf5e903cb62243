use crate::helpers::helper::div_ceil8;

/// Kind of a native type, without its parameters.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum NativeTypeSpec {
    Byte = 0,
    Short = 1,
    Integer = 2,
    Long = 3,
    Float = 4,
    Double = 5,
    Uuid = 6,
    String = 7,
    Bytes = 8,
    Bitmask = 9,
}

impl NativeTypeSpec {
    pub fn fixed_length(self) -> bool {
        !matches!(self, NativeTypeSpec::String | NativeTypeSpec::Bytes)
    }
}

/// Column type as stored in the schema.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum NativeType {
    Byte,
    Short,
    Integer,
    Long,
    Float,
    Double,
    Uuid,
    String,
    Bytes,
    Bitmask { bits: usize },
}

impl NativeType {
    pub fn bitmask(bits: usize) -> Self {
        NativeType::Bitmask { bits }
    }

    pub fn spec(&self) -> NativeTypeSpec {
        match self {
            NativeType::Byte => NativeTypeSpec::Byte,
            NativeType::Short => NativeTypeSpec::Short,
            NativeType::Integer => NativeTypeSpec::Integer,
            NativeType::Long => NativeTypeSpec::Long,
            NativeType::Float => NativeTypeSpec::Float,
            NativeType::Double => NativeTypeSpec::Double,
            NativeType::Uuid => NativeTypeSpec::Uuid,
            NativeType::String => NativeTypeSpec::String,
            NativeType::Bytes => NativeTypeSpec::Bytes,
            NativeType::Bitmask { .. } => NativeTypeSpec::Bitmask,
        }
    }

    /// Width in bytes of a fixed-length type, `None` for varlen types.
    pub fn fixed_size(&self) -> Option<usize> {
        match self {
            NativeType::Byte => Some(1),
            NativeType::Short => Some(2),
            NativeType::Integer => Some(4),
            NativeType::Long => Some(8),
            NativeType::Float => Some(4),
            NativeType::Double => Some(8),
            NativeType::Uuid => Some(16),
            NativeType::Bitmask { bits } => Some(div_ceil8(*bits)),
            NativeType::String | NativeType::Bytes => None,
        }
    }

    pub fn is_fixed_length(&self) -> bool {
        self.spec().fixed_length()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_sizes() {
        assert_eq!(NativeType::Byte.fixed_size(), Some(1));
        assert_eq!(NativeType::Short.fixed_size(), Some(2));
        assert_eq!(NativeType::Integer.fixed_size(), Some(4));
        assert_eq!(NativeType::Long.fixed_size(), Some(8));
        assert_eq!(NativeType::Float.fixed_size(), Some(4));
        assert_eq!(NativeType::Double.fixed_size(), Some(8));
        assert_eq!(NativeType::Uuid.fixed_size(), Some(16));
        assert_eq!(NativeType::String.fixed_size(), None);
        assert_eq!(NativeType::Bytes.fixed_size(), None);
    }

    #[test]
    fn bitmask_rounds_up_to_bytes() {
        assert_eq!(NativeType::bitmask(1).fixed_size(), Some(1));
        assert_eq!(NativeType::bitmask(8).fixed_size(), Some(1));
        assert_eq!(NativeType::bitmask(9).fixed_size(), Some(2));
        assert_eq!(NativeType::bitmask(0).fixed_size(), Some(0));
    }
}
