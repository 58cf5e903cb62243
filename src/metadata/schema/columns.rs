use crate::helpers::helper::div_ceil8;
use crate::metadata::schema::column::Column;

/// Ordered column set of one chunk.
///
/// # Ordering Invariant
/// Every fixed-length column precedes every variable-length column. Within
/// each group the declaration order is kept, so the order is stable for a
/// given schema version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Columns {
    cols: Vec<Column>,
    fixed_len_cols: usize,
}

impl Columns {
    pub fn new(mut cols: Vec<Column>) -> Self {
        cols.sort_by_key(|c| !c.native_type.is_fixed_length());
        let fixed_len_cols = cols.iter().take_while(|c| c.native_type.is_fixed_length()).count();

        Self { cols, fixed_len_cols }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn column(&self, idx: usize) -> &Column {
        &self.cols[idx]
    }

    pub fn get(&self, idx: usize) -> Option<&Column> {
        self.cols.get(idx)
    }

    pub fn len(&self) -> usize {
        self.cols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cols.is_empty()
    }

    pub fn fixed_len_columns(&self) -> usize {
        self.fixed_len_cols
    }

    pub fn null_map_size(&self) -> usize {
        div_ceil8(self.cols.len())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Column> + '_ {
        self.cols.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::schema::native_type::NativeType;

    #[test]
    fn fixed_columns_come_first() {
        let cols = Columns::new(vec![
            Column::new("name", NativeType::String, false),
            Column::new("id", NativeType::Long, false),
            Column::new("blob", NativeType::Bytes, true),
            Column::new("flag", NativeType::Byte, true),
        ]);

        let names: Vec<&str> = cols.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["id", "flag", "name", "blob"]);
        assert_eq!(cols.fixed_len_columns(), 2);
    }

    #[test]
    fn null_map_size_rounds_up() {
        let make = |n: usize| {
            Columns::new(
                (0..n)
                    .map(|i| Column::new(format!("c{i}"), NativeType::Byte, true))
                    .collect(),
            )
        };

        assert_eq!(make(0).null_map_size(), 0);
        assert_eq!(make(1).null_map_size(), 1);
        assert_eq!(make(8).null_map_size(), 1);
        assert_eq!(make(9).null_map_size(), 2);
    }
}
