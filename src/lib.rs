//! Schema-driven tuple encoding for the FluxDb storage engine.
//!
//! A tuple is laid out as a small header followed by a key chunk and a value
//! chunk. [`TupleAssembler`] writes that layout in a single pass, the
//! functions in [`tuple::layout`] size it up front, and [`TupleView`] reads the
//! navigation metadata back out of the encoded bytes.

pub mod config;
pub mod error;
pub mod helpers;
pub mod metadata;
pub mod storage;
pub mod tuple;

pub use config::AssemblerConfig;
pub use error::{Result, TupleError};
pub use helpers::assembler_flags::AssemblerFlags;
pub use metadata::schema::{
    ChunkKind, Column, Columns, NativeType, NativeTypeSpec, SchemaDescriptor,
};
pub use storage::{ExpandableByteBuf, StringEncoder, TupleBuffer};
pub use tuple::assembler::TupleAssembler;
pub use tuple::layout::{
    TupleStats, chunk_size, tuple_size, utf8_encoded_length, varlen_table_size,
};
pub use tuple::view::{ChunkView, TupleView};
