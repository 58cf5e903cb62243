use bitflags::bitflags;

bitflags! {
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct ColumnFlags: u8 {
        /// Column accepts null values
        const NULLABLE = 0b0000_0001;
    }
}
