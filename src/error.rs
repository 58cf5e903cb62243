use crate::metadata::schema::{ChunkKind, NativeTypeSpec};

pub type Result<T> = std::result::Result<T, TupleError>;

#[derive(Debug, thiserror::Error)]
pub enum TupleError {
    /// The appended value does not match the next column's declared type.
    #[error("failed to set column '{column}' ({actual:?} was passed, but column is of type {expected:?})")]
    TypeMismatch {
        column: String,
        expected: NativeTypeSpec,
        actual: NativeTypeSpec,
    },

    /// Null was appended for a column that is not nullable.
    #[error("failed to set column '{column}' (null was passed, but column is not nullable)")]
    NullNotAllowed { column: String },

    /// The bit set is longer than the bitmask column allows.
    #[error("failed to set bitmask for column '{column}' (mask size exceeds allocated size) [length={length}, maxSize={bits}]")]
    BitmaskOverflow {
        column: String,
        length: usize,
        bits: usize,
    },

    /// Every column has already been appended.
    #[error("tuple is complete, no column left to append")]
    TupleComplete,

    /// Finalize was called before every column was appended.
    #[error("tuple is incomplete: {appended} of {expected} columns appended")]
    Incomplete { appended: usize, expected: usize },

    /// The chunk received a different number of non-null varlen columns than
    /// was declared when the assembler was created.
    #[error("{chunk:?} chunk declared {declared} non-null varlen columns, but {appended} were appended")]
    VarlenCountMismatch {
        chunk: ChunkKind,
        declared: usize,
        appended: usize,
    },

    /// A string could not be encoded as UTF-8.
    #[error("failed to encode string for column '{column}' (unpaired surrogate at code unit {position})")]
    Encoding { column: String, position: usize },

    /// A chunk length or varlen offset does not fit its 2-byte field.
    #[error("{chunk:?} chunk is too large: {len} bytes")]
    ChunkTooLarge { chunk: ChunkKind, len: usize },

    /// The buffer handed to the assembler already holds data.
    #[error("tuple buffer is not empty: {written} bytes already written")]
    BufferNotEmpty { written: usize },

    /// More bytes were written than the declared tuple size.
    #[error("tuple size exceeded: {written} bytes written, {declared} declared")]
    SizeExceeded { written: usize, declared: usize },

    /// The encoded bytes are not a valid tuple layout.
    #[error("corrupt tuple: {0}")]
    Corrupt(&'static str),
}
