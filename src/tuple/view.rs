use std::ops::Range;

use crc32fast::Hasher;

use crate::error::{Result, TupleError};
use crate::helpers::helper::{read_u8, read_u16, read_u32};
use crate::metadata::schema::columns::Columns;
use crate::metadata::schema::schema_descriptor::{ChunkKind, SchemaDescriptor};
use crate::tuple::layout::{
    CHUNK_HEADER_SIZE, HEADER_SIZE, SCHEMA_VERSION_FIELD_SIZE, TOTAL_LEN_FIELD_SIZE,
    VARLEN_ENTRY_SIZE, varlen_table_size,
};

/// Read-only navigation over an encoded tuple.
///
/// The view locates header fields, chunk boundaries, null bits and column
/// byte ranges. It does not decode column values.
#[derive(Debug, Clone, Copy)]
pub struct TupleView<'a> {
    bytes: &'a [u8],
    key: ChunkView<'a>,
    val: ChunkView<'a>,
}

impl<'a> TupleView<'a> {
    pub fn new(schema: &'a SchemaDescriptor, bytes: &'a [u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(TupleError::Corrupt("truncated tuple header"));
        }
        if read_u16(bytes, 0) != Some(schema.version()) {
            return Err(TupleError::Corrupt("schema version mismatch"));
        }

        let key = ChunkView::read(bytes, HEADER_SIZE, ChunkKind::Key, schema.key_columns())?;
        let val = ChunkView::read(bytes, key.end(), ChunkKind::Value, schema.value_columns())?;

        if val.end() != bytes.len() {
            return Err(TupleError::Corrupt("trailing bytes after value chunk"));
        }

        Ok(Self { bytes, key, val })
    }

    pub fn schema_version(&self) -> u16 {
        read_u16(self.bytes, 0).unwrap_or_default()
    }

    pub fn key_hash(&self) -> u32 {
        read_u32(self.bytes, SCHEMA_VERSION_FIELD_SIZE).unwrap_or_default()
    }

    /// Whether the key-hash field holds the CRC-32 of the key chunk.
    pub fn verify_key_hash(&self) -> bool {
        let mut hasher = Hasher::new();
        hasher.update(self.key.bytes());
        hasher.finalize() == self.key_hash()
    }

    pub fn chunk(&self, kind: ChunkKind) -> &ChunkView<'a> {
        match kind {
            ChunkKind::Key => &self.key,
            ChunkKind::Value => &self.val,
        }
    }

    pub fn key(&self) -> &ChunkView<'a> {
        &self.key
    }

    pub fn value(&self) -> &ChunkView<'a> {
        &self.val
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }
}

/// One chunk of an encoded tuple. Offsets returned are absolute positions in
/// the tuple bytes unless stated otherwise.
#[derive(Debug, Clone, Copy)]
pub struct ChunkView<'a> {
    bytes: &'a [u8],
    cols: &'a Columns,
    kind: ChunkKind,
    base: usize,
    len: usize,
    varlen_count: usize,
}

impl<'a> ChunkView<'a> {
    fn read(bytes: &'a [u8], base: usize, kind: ChunkKind, cols: &'a Columns) -> Result<Self> {
        let len = read_u16(bytes, base)
            .ok_or(TupleError::Corrupt("truncated chunk header"))? as usize;
        let varlen_count = read_u16(bytes, base + TOTAL_LEN_FIELD_SIZE)
            .ok_or(TupleError::Corrupt("truncated chunk header"))? as usize;

        let min_len = CHUNK_HEADER_SIZE + varlen_table_size(varlen_count) + cols.null_map_size();
        if len < min_len {
            return Err(TupleError::Corrupt("chunk shorter than its header"));
        }
        if base + len > bytes.len() {
            return Err(TupleError::Corrupt("chunk extends past end of tuple"));
        }

        Ok(Self {
            bytes,
            cols,
            kind,
            base,
            len,
            varlen_count,
        })
    }

    pub fn kind(&self) -> ChunkKind {
        self.kind
    }

    pub fn base(&self) -> usize {
        self.base
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn column_count(&self) -> usize {
        self.cols.len()
    }

    pub fn end(&self) -> usize {
        self.base + self.len
    }

    pub fn varlen_count(&self) -> usize {
        self.varlen_count
    }

    pub fn bytes(&self) -> &'a [u8] {
        &self.bytes[self.base..self.end()]
    }

    fn varlen_tbl_off(&self) -> usize {
        self.base + CHUNK_HEADER_SIZE
    }

    pub fn null_map_off(&self) -> usize {
        self.varlen_tbl_off() + varlen_table_size(self.varlen_count)
    }

    /// First byte after the null map, where fixed-length values start.
    pub fn data_off(&self) -> usize {
        self.null_map_off() + self.cols.null_map_size()
    }

    pub fn is_null(&self, col: usize) -> bool {
        if col >= self.cols.len() {
            return false;
        }

        read_u8(self.bytes, self.null_map_off() + col / 8)
            .is_some_and(|b| b & (1 << (col % 8)) != 0)
    }

    /// Chunk-relative start of varlen payload `entry`.
    pub fn varlen_offset(&self, entry: usize) -> Option<usize> {
        if entry >= self.varlen_count {
            return None;
        }

        read_u16(self.bytes, self.varlen_tbl_off() + entry * VARLEN_ENTRY_SIZE).map(usize::from)
    }

    pub fn varlen_range(&self, entry: usize) -> Option<Range<usize>> {
        let start = self.base + self.varlen_offset(entry)?;
        let end = match self.varlen_offset(entry + 1) {
            Some(next) => self.base + next,
            None => self.end(),
        };

        (start <= end && end <= self.end()).then_some(start..end)
    }

    /// Byte range of a non-null column, `None` if the column is null or out of
    /// range.
    pub fn column_range(&self, col: usize) -> Option<Range<usize>> {
        let column = self.cols.get(col)?;
        if self.is_null(col) {
            return None;
        }

        match column.native_type.fixed_size() {
            Some(size) => {
                let start = self.data_off()
                    + (0..col)
                        .filter(|&i| !self.is_null(i))
                        .filter_map(|i| self.cols.column(i).native_type.fixed_size())
                        .sum::<usize>();

                (start + size <= self.end()).then_some(start..start + size)
            }
            None => {
                let entry = (self.cols.fixed_len_columns()..col)
                    .filter(|&i| !self.is_null(i))
                    .count();
                self.varlen_range(entry)
            }
        }
    }

    /// Byte range of a non-null fixed-length column.
    pub fn fixed_range(&self, col: usize) -> Option<Range<usize>> {
        if !self.cols.get(col)?.native_type.is_fixed_length() {
            return None;
        }

        self.column_range(col)
    }

    pub fn column_bytes(&self, col: usize) -> Option<&'a [u8]> {
        self.column_range(col).map(|r| &self.bytes[r])
    }
}
