use crc32fast::Hasher;
use tracing::{debug, trace, warn};
use uuid::Uuid;

use crate::config::AssemblerConfig;
use crate::error::{Result, TupleError};
use crate::helpers::helper::div_ceil8;
use crate::metadata::schema::column::Column;
use crate::metadata::schema::native_type::{NativeType, NativeTypeSpec};
use crate::metadata::schema::schema_descriptor::{ChunkKind, SchemaDescriptor};
use crate::storage::expandable_buf::ExpandableByteBuf;
use crate::storage::string_encoder::StringEncoder;
use crate::storage::tuple_buffer::TupleBuffer;
use crate::tuple::cursor::ChunkCursor;
use crate::tuple::layout::{HEADER_SIZE, SCHEMA_VERSION_FIELD_SIZE, TOTAL_LEN_FIELD_SIZE};

const UUID_SIZE: usize = 16;

/// Builds one tuple by appending its columns in schema order.
///
/// # Usage Contract
/// The caller appends every key column and then every value column, in the
/// order of [`Columns`](crate::Columns), exactly once each. Before
/// construction it counts the non-null varlen columns of each chunk (and
/// ideally sizes the whole tuple with [`tuple_size`](crate::tuple_size)).
///
/// # Errors
/// Any error leaves the tuple half written. The assembler must be dropped;
/// none of the errors are retryable.
pub struct TupleAssembler<'a, B: TupleBuffer = ExpandableByteBuf> {
    schema: &'a SchemaDescriptor,
    config: AssemblerConfig,
    buf: B,
    size_hint: usize,
    non_null_varlen_val_cols: usize,
    cursor: ChunkCursor,
    appended: usize,
    complete: bool,
    str_encoder: Option<StringEncoder>,
}

impl<'a> TupleAssembler<'a, ExpandableByteBuf> {
    /// `size` is the expected tuple size; the buffer grows if it is exceeded.
    pub fn new(
        schema: &'a SchemaDescriptor,
        size: usize,
        non_null_varlen_key_cols: usize,
        non_null_varlen_val_cols: usize,
    ) -> Result<Self> {
        Self::with_config(
            schema,
            size,
            non_null_varlen_key_cols,
            non_null_varlen_val_cols,
            AssemblerConfig::default(),
        )
    }

    pub fn with_config(
        schema: &'a SchemaDescriptor,
        size: usize,
        non_null_varlen_key_cols: usize,
        non_null_varlen_val_cols: usize,
        config: AssemblerConfig,
    ) -> Result<Self> {
        Self::with_buffer(
            schema,
            ExpandableByteBuf::new(size),
            size,
            non_null_varlen_key_cols,
            non_null_varlen_val_cols,
            config,
        )
    }
}

impl<'a, B: TupleBuffer> TupleAssembler<'a, B> {
    /// Assembles into a caller-provided buffer, which must be empty.
    pub fn with_buffer(
        schema: &'a SchemaDescriptor,
        buf: B,
        size_hint: usize,
        non_null_varlen_key_cols: usize,
        non_null_varlen_val_cols: usize,
        config: AssemblerConfig,
    ) -> Result<Self> {
        if buf.written() != 0 {
            return Err(TupleError::BufferNotEmpty {
                written: buf.written(),
            });
        }

        debug!(
            schema_version = schema.version(),
            size_hint,
            non_null_varlen_key_cols,
            non_null_varlen_val_cols,
            "creating tuple assembler"
        );

        let key_cols = schema.key_columns();
        let cursor = ChunkCursor::open(
            ChunkKind::Key,
            HEADER_SIZE,
            key_cols.len(),
            key_cols.null_map_size(),
            non_null_varlen_key_cols,
        );

        let mut asm = Self {
            schema,
            config,
            buf,
            size_hint,
            non_null_varlen_val_cols,
            cursor,
            appended: 0,
            complete: false,
            str_encoder: None,
        };

        asm.buf.put_u16(0, schema.version());
        asm.buf.put_u32(SCHEMA_VERSION_FIELD_SIZE, 0);
        asm.init_chunk()?;
        asm.close_empty_chunks()?;

        Ok(asm)
    }

    pub fn append_null(&mut self) -> Result<()> {
        let col = self.next_column()?;

        if !col.nullable() {
            return Err(TupleError::NullNotAllowed {
                column: col.name.clone(),
            });
        }

        self.set_null(self.cursor.cur_col);

        self.shift_column(0, false)
    }

    pub fn append_byte(&mut self, val: i8) -> Result<()> {
        self.check_type(NativeTypeSpec::Byte)?;

        self.buf.put_i8(self.cursor.cur_off, val);

        self.shift_column(size_of::<i8>(), false)
    }

    pub fn append_short(&mut self, val: i16) -> Result<()> {
        self.check_type(NativeTypeSpec::Short)?;

        self.buf.put_i16(self.cursor.cur_off, val);

        self.shift_column(size_of::<i16>(), false)
    }

    pub fn append_int(&mut self, val: i32) -> Result<()> {
        self.check_type(NativeTypeSpec::Integer)?;

        self.buf.put_i32(self.cursor.cur_off, val);

        self.shift_column(size_of::<i32>(), false)
    }

    pub fn append_long(&mut self, val: i64) -> Result<()> {
        self.check_type(NativeTypeSpec::Long)?;

        self.buf.put_i64(self.cursor.cur_off, val);

        self.shift_column(size_of::<i64>(), false)
    }

    pub fn append_float(&mut self, val: f32) -> Result<()> {
        self.check_type(NativeTypeSpec::Float)?;

        self.buf.put_f32(self.cursor.cur_off, val);

        self.shift_column(size_of::<f32>(), false)
    }

    pub fn append_double(&mut self, val: f64) -> Result<()> {
        self.check_type(NativeTypeSpec::Double)?;

        self.buf.put_f64(self.cursor.cur_off, val);

        self.shift_column(size_of::<f64>(), false)
    }

    /// Writes the least significant half first, then the most significant.
    pub fn append_uuid(&mut self, uuid: Uuid) -> Result<()> {
        self.check_type(NativeTypeSpec::Uuid)?;

        let (msb, lsb) = uuid.as_u64_pair();
        self.buf.put_i64(self.cursor.cur_off, lsb as i64);
        self.buf.put_i64(self.cursor.cur_off + 8, msb as i64);

        self.shift_column(UUID_SIZE, false)
    }

    pub fn append_string(&mut self, val: &str) -> Result<()> {
        self.check_type(NativeTypeSpec::String)?;
        self.check_varlen_slot()?;

        let written = self.buf.put_string(self.cursor.cur_off, val);

        self.write_offset(self.cursor.cur_varlen_entry, self.cursor.chunk_len())?;

        self.shift_column(written, true)
    }

    /// Appends a string given as UTF-16 code units.
    ///
    /// An unpaired surrogate fails the append before anything is written.
    pub fn append_utf16(&mut self, val: &[u16]) -> Result<()> {
        let col = self.check_type(NativeTypeSpec::String)?;
        self.check_varlen_slot()?;

        let encoder = self.str_encoder.get_or_insert_with(StringEncoder::new);
        let written = self
            .buf
            .put_utf16(self.cursor.cur_off, val, encoder)
            .map_err(|e| TupleError::Encoding {
                column: col.name.clone(),
                position: e.position,
            })?;

        self.write_offset(self.cursor.cur_varlen_entry, self.cursor.chunk_len())?;

        self.shift_column(written, true)
    }

    pub fn append_bytes(&mut self, val: &[u8]) -> Result<()> {
        self.check_type(NativeTypeSpec::Bytes)?;
        self.check_varlen_slot()?;

        self.buf.put_bytes(self.cursor.cur_off, val);

        self.write_offset(self.cursor.cur_varlen_entry, self.cursor.chunk_len())?;

        self.shift_column(val.len(), true)
    }

    /// Appends a bit set given as LSB-first bytes: bit `i` is bit `i % 8` of
    /// byte `i / 8`.
    ///
    /// The mask may use every declared bit but no more. Bytes past the
    /// highest set bit are written as zeros up to the column width.
    pub fn append_bitmask(&mut self, mask: &[u8]) -> Result<()> {
        let col = self.check_type(NativeTypeSpec::Bitmask)?;

        let NativeType::Bitmask { bits } = col.native_type else {
            return Err(TupleError::TypeMismatch {
                column: col.name.clone(),
                expected: col.native_type.spec(),
                actual: NativeTypeSpec::Bitmask,
            });
        };

        let length = bit_length(mask);
        if length > bits {
            return Err(TupleError::BitmaskOverflow {
                column: col.name.clone(),
                length,
                bits,
            });
        }

        let used = div_ceil8(length);
        let mask_len = div_ceil8(bits);

        self.buf.put_bytes(self.cursor.cur_off, &mask[..used]);
        for i in used..mask_len {
            self.buf.put_u8(self.cursor.cur_off + i, 0);
        }

        self.shift_column(mask_len, false)
    }

    /// Returns the encoded tuple.
    pub fn finalize(self) -> Result<Vec<u8>> {
        if !self.complete {
            return Err(TupleError::Incomplete {
                appended: self.appended,
                expected: self.schema.column_count(),
            });
        }

        let written = self.buf.written();
        debug_assert_eq!(written, self.cursor.cur_off);

        if written > self.size_hint {
            if self.config.strict_size() {
                return Err(TupleError::SizeExceeded {
                    written,
                    declared: self.size_hint,
                });
            }

            warn!(written, declared = self.size_hint, "tuple outgrew its size hint");
        }

        Ok(self.buf.into_bytes())
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn cursor(&self) -> &ChunkCursor {
        &self.cursor
    }

    fn next_column(&self) -> Result<&'a Column> {
        if self.complete {
            return Err(TupleError::TupleComplete);
        }

        let schema: &'a SchemaDescriptor = self.schema;
        Ok(schema.chunk(self.cursor.kind).column(self.cursor.cur_col))
    }

    fn check_type(&self, spec: NativeTypeSpec) -> Result<&'a Column> {
        let col = self.next_column()?;

        if col.native_type.spec() != spec {
            return Err(TupleError::TypeMismatch {
                column: col.name.clone(),
                expected: col.native_type.spec(),
                actual: spec,
            });
        }

        Ok(col)
    }

    fn check_varlen_slot(&self) -> Result<()> {
        if self.cursor.varlen_table_full() {
            return Err(TupleError::VarlenCountMismatch {
                chunk: self.cursor.kind,
                declared: self.cursor.varlen_cols,
                appended: self.cursor.cur_varlen_entry + 1,
            });
        }

        Ok(())
    }

    fn write_offset(&mut self, entry: usize, off: usize) -> Result<()> {
        let off = u16::try_from(off).map_err(|_| TupleError::ChunkTooLarge {
            chunk: self.cursor.kind,
            len: off,
        })?;

        self.buf.put_u16(self.cursor.varlen_entry_off(entry), off);
        Ok(())
    }

    fn set_null(&mut self, col_idx: usize) {
        let byte = self.cursor.null_map_off + col_idx / 8;
        let bit = 1u8 << (col_idx % 8);

        let cur = self.buf.get_u8(byte);
        self.buf.put_u8(byte, cur | bit);
    }

    fn shift_column(&mut self, size: usize, varlen: bool) -> Result<()> {
        self.cursor = self.cursor.advance(size, varlen);
        self.appended += 1;

        self.close_empty_chunks()
    }

    /// Closes the current chunk while it has no column left, opening the
    /// value chunk after the key chunk.
    fn close_empty_chunks(&mut self) -> Result<()> {
        while !self.complete && self.cursor.is_complete() {
            self.close_chunk()?;

            // every key column is in, so the next absolute index is the first value column
            let next_cols = self.schema.columns(self.appended);
            let next = self.cursor.next_chunk(
                next_cols.len(),
                next_cols.null_map_size(),
                self.non_null_varlen_val_cols,
            );

            match next {
                Some(next) => {
                    self.cursor = next;
                    self.init_chunk()?;
                }
                None => self.complete = true,
            }
        }

        Ok(())
    }

    fn close_chunk(&mut self) -> Result<()> {
        let kind = self.cursor.kind;
        let len = self.cursor.chunk_len();

        if self.cursor.cur_varlen_entry != self.cursor.varlen_cols {
            return Err(TupleError::VarlenCountMismatch {
                chunk: kind,
                declared: self.cursor.varlen_cols,
                appended: self.cursor.cur_varlen_entry,
            });
        }

        let len16 = u16::try_from(len).map_err(|_| TupleError::ChunkTooLarge { chunk: kind, len })?;
        self.buf.put_u16(self.cursor.base_off, len16);

        trace!(chunk = ?kind, base = self.cursor.base_off, len, "chunk closed");

        if kind == ChunkKind::Key && self.config.hash_key() {
            let key_chunk = &self.buf.as_bytes()[self.cursor.base_off..self.cursor.cur_off];

            let mut hasher = Hasher::new();
            hasher.update(key_chunk);
            let hash = hasher.finalize();

            self.buf.put_u32(SCHEMA_VERSION_FIELD_SIZE, hash);
        }

        Ok(())
    }

    /// Writes the varlen count and clears the null map of the chunk the cursor
    /// was just opened on.
    fn init_chunk(&mut self) -> Result<()> {
        let count = u16::try_from(self.cursor.varlen_cols).map_err(|_| TupleError::ChunkTooLarge {
            chunk: self.cursor.kind,
            len: self.cursor.null_map_off - self.cursor.base_off,
        })?;

        self.buf.put_u16(self.cursor.base_off, 0);
        self.buf.put_u16(self.cursor.base_off + TOTAL_LEN_FIELD_SIZE, count);

        for off in self.cursor.null_map_off..self.cursor.cur_off {
            self.buf.put_u8(off, 0);
        }

        Ok(())
    }
}

/// Index of the highest set bit plus one, zero for an empty set.
fn bit_length(mask: &[u8]) -> usize {
    match mask.iter().rposition(|b| *b != 0) {
        Some(i) => i * 8 + (8 - mask[i].leading_zeros() as usize),
        None => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::schema::columns::Columns;

    fn schema() -> SchemaDescriptor {
        SchemaDescriptor::new(
            1,
            Columns::new(vec![Column::new("id", NativeType::Integer, false)]),
            Columns::new(vec![
                Column::new("age", NativeType::Byte, true),
                Column::new("name", NativeType::String, true),
            ]),
        )
    }

    #[test]
    fn bit_length_of_masks() {
        assert_eq!(bit_length(&[]), 0);
        assert_eq!(bit_length(&[0, 0]), 0);
        assert_eq!(bit_length(&[0b1]), 1);
        assert_eq!(bit_length(&[0b1000_0000]), 8);
        assert_eq!(bit_length(&[0xFF, 0b10]), 10);
        assert_eq!(bit_length(&[0b1, 0, 0]), 1);
    }

    #[test]
    fn prefilled_buffer_is_rejected() {
        let schema = schema();
        let mut buf = ExpandableByteBuf::new(16);
        buf.put_u8(3, 0xFF);

        let res = TupleAssembler::with_buffer(&schema, buf, 16, 0, 1, AssemblerConfig::default());

        assert!(matches!(res, Err(TupleError::BufferNotEmpty { written: 4 })));
    }

    #[test]
    fn construction_writes_header_and_opens_key_chunk() {
        let schema = schema();
        let asm = TupleAssembler::new(&schema, 64, 0, 1).unwrap();

        let cursor = asm.cursor();
        assert_eq!(cursor.kind, ChunkKind::Key);
        assert_eq!(cursor.base_off, HEADER_SIZE);
        assert_eq!(cursor.cur_off, HEADER_SIZE + 4 + 1);
        assert_eq!(u16::from_le_bytes([asm.buf.get_u8(0), asm.buf.get_u8(1)]), 1);
    }

    #[test]
    fn type_mismatch_leaves_cursor_untouched() {
        let schema = schema();
        let mut asm = TupleAssembler::new(&schema, 64, 0, 1).unwrap();
        let before = *asm.cursor();
        let written = asm.buf.written();

        let err = asm.append_long(7).unwrap_err();

        assert!(matches!(
            err,
            TupleError::TypeMismatch {
                expected: NativeTypeSpec::Integer,
                actual: NativeTypeSpec::Long,
                ..
            }
        ));
        assert_eq!(*asm.cursor(), before);
        assert_eq!(asm.buf.written(), written);
    }

    #[test]
    fn null_for_non_nullable_column_is_rejected() {
        let schema = schema();
        let mut asm = TupleAssembler::new(&schema, 64, 0, 1).unwrap();

        let err = asm.append_null().unwrap_err();

        assert!(matches!(err, TupleError::NullNotAllowed { ref column } if column == "id"));
        assert_eq!(asm.cursor().cur_col, 0);
    }

    #[test]
    fn key_completion_switches_to_value_chunk() {
        let schema = schema();
        let mut asm = TupleAssembler::new(&schema, 64, 0, 1).unwrap();

        asm.append_int(42).unwrap();

        let cursor = asm.cursor();
        assert_eq!(cursor.kind, ChunkKind::Value);
        // key chunk: 6 + (2 + 2 + 0 + 1 + 4)
        assert_eq!(cursor.base_off, 15);
        assert_eq!(cursor.cur_col, 0);
        assert_eq!(cursor.varlen_cols, 1);
        assert_eq!(asm.buf.get_u8(HEADER_SIZE), 9);
    }

    #[test]
    fn append_after_completion_fails() {
        let schema = schema();
        let mut asm = TupleAssembler::new(&schema, 64, 0, 1).unwrap();

        asm.append_int(1).unwrap();
        asm.append_byte(2).unwrap();
        asm.append_string("x").unwrap();

        assert!(asm.is_complete());
        assert!(matches!(asm.append_null(), Err(TupleError::TupleComplete)));
    }

    #[test]
    fn finalize_before_completion_fails() {
        let schema = schema();
        let mut asm = TupleAssembler::new(&schema, 64, 0, 1).unwrap();

        asm.append_int(1).unwrap();

        assert!(matches!(
            asm.finalize(),
            Err(TupleError::Incomplete { appended: 1, expected: 3 })
        ));
    }

    #[test]
    fn extra_varlen_column_is_rejected_before_writing() {
        let schema = schema();
        let mut asm = TupleAssembler::new(&schema, 64, 0, 0).unwrap();

        asm.append_int(1).unwrap();
        asm.append_byte(2).unwrap();
        let written = asm.buf.written();

        let err = asm.append_string("oops").unwrap_err();

        assert!(matches!(
            err,
            TupleError::VarlenCountMismatch { chunk: ChunkKind::Value, declared: 0, appended: 1 }
        ));
        assert_eq!(asm.buf.written(), written);
    }

    #[test]
    fn missing_varlen_column_is_reported_on_chunk_close() {
        let schema = schema();
        let mut asm = TupleAssembler::new(&schema, 64, 0, 1).unwrap();

        asm.append_int(1).unwrap();
        asm.append_byte(2).unwrap();

        assert!(matches!(
            asm.append_null(),
            Err(TupleError::VarlenCountMismatch { declared: 1, appended: 0, .. })
        ));
    }

    #[test]
    fn string_encoder_is_created_on_first_use() {
        let schema = schema();
        let mut asm = TupleAssembler::new(&schema, 64, 0, 1).unwrap();
        assert!(asm.str_encoder.is_none());

        asm.append_int(1).unwrap();
        asm.append_null().unwrap();
        let units: Vec<u16> = "ok".encode_utf16().collect();
        asm.append_utf16(&units).unwrap();

        assert!(asm.str_encoder.is_some());
    }
}
