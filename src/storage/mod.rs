pub mod expandable_buf;
pub mod string_encoder;
pub mod tuple_buffer;

pub use expandable_buf::ExpandableByteBuf;
pub use string_encoder::{StringEncoder, UnpairedSurrogate};
pub use tuple_buffer::TupleBuffer;
