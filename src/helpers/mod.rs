pub mod assembler_flags;
pub mod column_flags;
pub mod helper;
