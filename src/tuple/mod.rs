pub mod assembler;
pub mod cursor;
pub mod layout;
pub mod view;
