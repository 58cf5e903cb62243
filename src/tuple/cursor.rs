use crate::metadata::schema::schema_descriptor::ChunkKind;
use crate::tuple::layout::{TOTAL_LEN_FIELD_SIZE, VARLEN_TABLE_LEN_FIELD_SIZE, varlen_table_size};

/// Write position inside the chunk being assembled.
///
/// All offsets are absolute positions in the tuple buffer. A cursor is a plain
/// value: advancing or moving to the next chunk returns a new cursor and never
/// touches the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkCursor {
    pub kind: ChunkKind,
    /// Columns in the chunk.
    pub col_count: usize,
    /// Chunk start, where the total-length field lives.
    pub base_off: usize,
    pub varlen_tbl_off: usize,
    pub null_map_off: usize,
    /// Offset the next column is written at.
    pub cur_off: usize,
    /// Index of the next unfilled column within the chunk.
    pub cur_col: usize,
    /// Next dense varlen table slot; counts non-null varlen columns only.
    pub cur_varlen_entry: usize,
    /// Varlen table slots reserved when the chunk was opened.
    pub varlen_cols: usize,
}

impl ChunkCursor {
    pub fn open(
        kind: ChunkKind,
        base_off: usize,
        col_count: usize,
        null_map_size: usize,
        non_null_varlen_cols: usize,
    ) -> Self {
        let varlen_tbl_off = base_off + TOTAL_LEN_FIELD_SIZE + VARLEN_TABLE_LEN_FIELD_SIZE;
        let null_map_off = varlen_tbl_off + varlen_table_size(non_null_varlen_cols);
        let cur_off = null_map_off + null_map_size;

        Self {
            kind,
            col_count,
            base_off,
            varlen_tbl_off,
            null_map_off,
            cur_off,
            cur_col: 0,
            cur_varlen_entry: 0,
            varlen_cols: non_null_varlen_cols,
        }
    }

    /// Cursor after a column of `size` bytes was written.
    pub fn advance(self, size: usize, varlen: bool) -> Self {
        Self {
            cur_col: self.cur_col + 1,
            cur_off: self.cur_off + size,
            cur_varlen_entry: self.cur_varlen_entry + usize::from(varlen),
            ..self
        }
    }

    pub fn is_complete(&self) -> bool {
        self.cur_col == self.col_count
    }

    /// Offset of the current column relative to the chunk base; once the
    /// chunk is complete this is its total length.
    pub fn chunk_len(&self) -> usize {
        self.cur_off - self.base_off
    }

    pub fn varlen_table_full(&self) -> bool {
        self.cur_varlen_entry >= self.varlen_cols
    }

    pub fn varlen_entry_off(&self, entry: usize) -> usize {
        self.varlen_tbl_off + varlen_table_size(entry)
    }

    /// Cursor for the value chunk, which starts right after this key chunk.
    ///
    /// Returns `None` once the value chunk itself is the one completed.
    pub fn next_chunk(
        &self,
        col_count: usize,
        null_map_size: usize,
        non_null_varlen_cols: usize,
    ) -> Option<Self> {
        match self.kind {
            ChunkKind::Key => Some(Self::open(
                ChunkKind::Value,
                self.base_off + self.chunk_len(),
                col_count,
                null_map_size,
                non_null_varlen_cols,
            )),
            ChunkKind::Value => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_computes_region_boundaries() {
        // 3 columns, 2 non-null varlen
        let cursor = ChunkCursor::open(ChunkKind::Key, 6, 3, 1, 2);

        assert_eq!(cursor.varlen_tbl_off, 10);
        assert_eq!(cursor.null_map_off, 14);
        assert_eq!(cursor.cur_off, 15);
        assert_eq!(cursor.cur_col, 0);
        assert_eq!(cursor.cur_varlen_entry, 0);
        assert_eq!(cursor.varlen_entry_off(1), 12);
    }

    #[test]
    fn advance_only_bumps_varlen_entry_for_varlen() {
        let cursor = ChunkCursor::open(ChunkKind::Key, 0, 3, 1, 1);

        let cursor = cursor.advance(8, false);
        assert_eq!((cursor.cur_col, cursor.cur_varlen_entry), (1, 0));

        let cursor = cursor.advance(0, false);
        assert_eq!((cursor.cur_col, cursor.cur_off), (2, 4 + 2 + 1 + 8));

        let cursor = cursor.advance(5, true);
        assert_eq!((cursor.cur_col, cursor.cur_varlen_entry), (3, 1));
        assert!(cursor.is_complete());
        assert_eq!(cursor.chunk_len(), 20);
    }

    #[test]
    fn value_chunk_starts_after_key_chunk() {
        let key = ChunkCursor::open(ChunkKind::Key, 6, 1, 1, 0).advance(4, false);

        let val = key.next_chunk(2, 1, 1).unwrap();

        assert_eq!(val.kind, ChunkKind::Value);
        assert_eq!(val.base_off, 6 + key.chunk_len());
        assert_eq!(val.cur_col, 0);
        assert_eq!(val.cur_varlen_entry, 0);
        assert_eq!(val.cur_off, val.base_off + 4 + 2 + 1);
    }

    #[test]
    fn value_chunk_has_no_successor() {
        let val = ChunkCursor::open(ChunkKind::Value, 20, 0, 0, 0);

        assert!(val.is_complete());
        assert_eq!(val.next_chunk(0, 0, 0), None);
    }
}
