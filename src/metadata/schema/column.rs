use crate::helpers::column_flags::ColumnFlags;
use crate::metadata::schema::native_type::NativeType;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Column {
    pub name: String,
    pub native_type: NativeType,
    pub flags: ColumnFlags,
}

impl Column {
    pub fn new(name: impl Into<String>, native_type: NativeType, nullable: bool) -> Self {
        let flags = if nullable {
            ColumnFlags::NULLABLE
        } else {
            ColumnFlags::empty()
        };

        Self {
            name: name.into(),
            native_type,
            flags,
        }
    }

    pub fn nullable(&self) -> bool {
        self.flags.contains(ColumnFlags::NULLABLE)
    }
}
