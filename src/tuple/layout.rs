//! Byte sizes of the tuple layout, computed before anything is written.
//!
//! # Tuple layout
//! ```text
//! [ schema version (u16) | key hash (u32) ]
//! [ key chunk ]
//! [ value chunk ]
//! ```
//!
//! # Chunk layout
//! ```text
//! [ total length (u16)       ]
//! [ varlen count (u16)       ]
//! [ varlen table (u16 * K)   ]
//! [ null map (ceil(C / 8))   ]
//! [ fixed-length values...   ]
//! [ varlen payloads...       ]
//! ```

use crate::metadata::schema::columns::Columns;

pub const SCHEMA_VERSION_FIELD_SIZE: usize = 2;
pub const KEY_HASH_FIELD_SIZE: usize = 4;
pub const HEADER_SIZE: usize = SCHEMA_VERSION_FIELD_SIZE + KEY_HASH_FIELD_SIZE;

pub const TOTAL_LEN_FIELD_SIZE: usize = 2;
pub const VARLEN_TABLE_LEN_FIELD_SIZE: usize = 2;
pub const VARLEN_ENTRY_SIZE: usize = 2;
pub const CHUNK_HEADER_SIZE: usize = TOTAL_LEN_FIELD_SIZE + VARLEN_TABLE_LEN_FIELD_SIZE;

pub fn varlen_table_size(non_null_varlen_cols: usize) -> usize {
    non_null_varlen_cols * VARLEN_ENTRY_SIZE
}

/// Number of bytes `text` occupies once encoded as UTF-8.
///
/// Expects well-formed UTF-16: a high surrogate is counted as a full
/// supplementary code point together with the unit that follows it. Unpaired
/// surrogates are not detected.
pub fn utf8_encoded_length(text: &[u16]) -> usize {
    let mut cnt = 0;
    let mut i = 0;

    while i < text.len() {
        let ch = text[i];

        if ch <= 0x7F {
            cnt += 1;
        } else if ch <= 0x7FF {
            cnt += 2;
        } else if (0xD800..=0xDBFF).contains(&ch) {
            cnt += 4;
            i += 1;
        } else {
            cnt += 3;
        }

        i += 1;
    }

    cnt
}

/// Size of one chunk.
///
/// Every fixed-length column is counted at full width, so the result is exact
/// when no fixed-length column is null and an upper bound otherwise.
pub fn chunk_size(
    cols: &Columns,
    non_null_varlen_cols: usize,
    non_null_varlen_size: usize,
) -> usize {
    let fixed: usize = cols
        .iter()
        .filter_map(|c| c.native_type.fixed_size())
        .sum();

    CHUNK_HEADER_SIZE
        + varlen_table_size(non_null_varlen_cols)
        + cols.null_map_size()
        + fixed
        + non_null_varlen_size
}

pub fn tuple_size(
    key_cols: &Columns,
    non_null_varlen_key_cols: usize,
    non_null_varlen_key_size: usize,
    val_cols: &Columns,
    non_null_varlen_val_cols: usize,
    non_null_varlen_val_size: usize,
) -> usize {
    HEADER_SIZE
        + chunk_size(key_cols, non_null_varlen_key_cols, non_null_varlen_key_size)
        + chunk_size(val_cols, non_null_varlen_val_cols, non_null_varlen_val_size)
}

/// Pre-sizing inputs for one tuple, collected from the values about to be
/// appended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TupleStats {
    pub key_varlen_cols: usize,
    pub key_varlen_size: usize,
    pub val_varlen_cols: usize,
    pub val_varlen_size: usize,
}

impl TupleStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_key_varlen(&mut self, len: usize) -> &mut Self {
        self.key_varlen_cols += 1;
        self.key_varlen_size += len;
        self
    }

    pub fn add_val_varlen(&mut self, len: usize) -> &mut Self {
        self.val_varlen_cols += 1;
        self.val_varlen_size += len;
        self
    }

    pub fn tuple_size(&self, key_cols: &Columns, val_cols: &Columns) -> usize {
        tuple_size(
            key_cols,
            self.key_varlen_cols,
            self.key_varlen_size,
            val_cols,
            self.val_varlen_cols,
            self.val_varlen_size,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::schema::column::Column;
    use crate::metadata::schema::native_type::NativeType;

    fn utf16(s: &str) -> Vec<u16> {
        s.encode_utf16().collect()
    }

    #[test]
    fn varlen_table_is_two_bytes_per_entry() {
        assert_eq!(varlen_table_size(0), 0);
        assert_eq!(varlen_table_size(1), 2);
        assert_eq!(varlen_table_size(5), 10);
    }

    #[test]
    fn utf8_length_by_code_unit_class() {
        assert_eq!(utf8_encoded_length(&utf16("")), 0);
        assert_eq!(utf8_encoded_length(&utf16("abc")), 3);
        assert_eq!(utf8_encoded_length(&utf16("\u{7f}")), 1);
        assert_eq!(utf8_encoded_length(&utf16("\u{80}")), 2);
        assert_eq!(utf8_encoded_length(&utf16("\u{7ff}")), 2);
        assert_eq!(utf8_encoded_length(&utf16("\u{800}")), 3);
        assert_eq!(utf8_encoded_length(&utf16("\u{ffff}")), 3);
        assert_eq!(utf8_encoded_length(&utf16("\u{10000}")), 4);
        assert_eq!(utf8_encoded_length(&utf16("\u{1f600}x")), 5);
    }

    #[test]
    fn utf8_length_does_not_double_count_low_surrogate() {
        let units = utf16("\u{1f600}\u{1f601}");

        assert_eq!(units.len(), 4);
        assert_eq!(utf8_encoded_length(&units), 8);
    }

    #[test]
    fn chunk_size_matches_hand_computed_layout() {
        // id: long, flags: bitmask(10), name: string, avatar: bytes
        let cols = Columns::new(vec![
            Column::new("id", NativeType::Long, false),
            Column::new("name", NativeType::String, true),
            Column::new("flags", NativeType::bitmask(10), false),
            Column::new("avatar", NativeType::Bytes, true),
        ]);

        // 2 + 2 + 2*2 + 1 + (8 + 2) + 13
        assert_eq!(chunk_size(&cols, 2, 13), 32);
        // name null, avatar null
        assert_eq!(chunk_size(&cols, 0, 0), 15);
    }

    #[test]
    fn empty_chunk_is_just_the_header() {
        assert_eq!(chunk_size(&Columns::empty(), 0, 0), 4);
    }

    #[test]
    fn tuple_size_adds_header_and_both_chunks() {
        let key = Columns::new(vec![Column::new("id", NativeType::Integer, false)]);
        let val = Columns::new(vec![
            Column::new("name", NativeType::String, false),
            Column::new("score", NativeType::Double, true),
        ]);

        // header 6, key 2+2+0+1+4 = 9, value 2+2+2+1+8+5 = 20
        assert_eq!(tuple_size(&key, 0, 0, &val, 1, 5), 35);
    }

    #[test]
    fn stats_accumulate_per_chunk() {
        let key = Columns::new(vec![Column::new("k", NativeType::String, false)]);
        let val = Columns::new(vec![
            Column::new("a", NativeType::Bytes, false),
            Column::new("b", NativeType::String, false),
        ]);

        let mut stats = TupleStats::new();
        stats.add_key_varlen(3).add_val_varlen(4).add_val_varlen(1);

        assert_eq!(stats.key_varlen_cols, 1);
        assert_eq!(stats.val_varlen_size, 5);
        assert_eq!(stats.tuple_size(&key, &val), tuple_size(&key, 1, 3, &val, 2, 5));
    }
}
