use crate::metadata::schema::columns::Columns;

#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ChunkKind {
    Key = 0,
    Value = 1,
}

/// Read-only description of a table's tuple layout for one schema version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaDescriptor {
    version: u16,
    key_cols: Columns,
    val_cols: Columns,
}

impl SchemaDescriptor {
    pub fn new(version: u16, key_cols: Columns, val_cols: Columns) -> Self {
        Self {
            version,
            key_cols,
            val_cols,
        }
    }

    pub fn version(&self) -> u16 {
        self.version
    }

    pub fn key_columns(&self) -> &Columns {
        &self.key_cols
    }

    pub fn value_columns(&self) -> &Columns {
        &self.val_cols
    }

    pub fn chunk(&self, kind: ChunkKind) -> &Columns {
        match kind {
            ChunkKind::Key => &self.key_cols,
            ChunkKind::Value => &self.val_cols,
        }
    }

    /// Chunk owning the column with the given absolute index.
    pub fn chunk_of(&self, col_idx: usize) -> ChunkKind {
        if col_idx < self.key_cols.len() {
            ChunkKind::Key
        } else {
            ChunkKind::Value
        }
    }

    /// Columns of the chunk owning the column with the given absolute index.
    pub fn columns(&self, col_idx: usize) -> &Columns {
        self.chunk(self.chunk_of(col_idx))
    }

    pub fn column_count(&self) -> usize {
        self.key_cols.len() + self.val_cols.len()
    }
}
