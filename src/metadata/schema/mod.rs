pub mod column;
pub mod columns;
pub mod native_type;
pub mod schema_descriptor;

pub use column::Column;
pub use columns::Columns;
pub use native_type::{NativeType, NativeTypeSpec};
pub use schema_descriptor::{ChunkKind, SchemaDescriptor};
