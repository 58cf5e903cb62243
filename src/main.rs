use fluxdb_tuple::{
    AssemblerConfig, AssemblerFlags, ChunkKind, ChunkView, Column, Columns, NativeType, Result,
    SchemaDescriptor, TupleAssembler, TupleStats, TupleView,
};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let schema = customers_schema();

    let email = "ada@example.com";
    let first_name = "Ada";
    let last_name: Option<&str> = None;

    let mut stats = TupleStats::new();
    stats.add_val_varlen(email.len()).add_val_varlen(first_name.len());
    if let Some(last_name) = last_name {
        stats.add_val_varlen(last_name.len());
    }

    let size = stats.tuple_size(schema.key_columns(), schema.value_columns());
    let config = AssemblerConfig::new()
        .with_flags(AssemblerFlags::HASH_KEY | AssemblerFlags::STRICT_SIZE);

    let mut asm = TupleAssembler::with_config(
        &schema,
        size,
        stats.key_varlen_cols,
        stats.val_varlen_cols,
        config,
    )?;

    // key: id, tenant
    asm.append_long(1)?;
    asm.append_uuid(Uuid::from_u64_pair(0x0123_4567_89ab_cdef, 0xfedc_ba98_7654_3210))?;

    // value: created_at, flags, email, first_name, last_name
    asm.append_long(1_700_000_000)?;
    asm.append_bitmask(&[0b0000_0101])?;
    asm.append_string(email)?;
    asm.append_string(first_name)?;
    match last_name {
        Some(last_name) => asm.append_string(last_name)?,
        None => asm.append_null()?,
    }

    let tuple = asm.finalize()?;

    println!("tuple size : {} bytes (expected {})", tuple.len(), size);
    print_hex(&tuple);

    let view = TupleView::new(&schema, &tuple)?;
    println!("schema ver : {}", view.schema_version());
    println!("key hash   : {:#010x} (valid: {})", view.key_hash(), view.verify_key_hash());
    print_chunk(&schema, view.chunk(ChunkKind::Key));
    print_chunk(&schema, view.chunk(ChunkKind::Value));

    Ok(())
}

fn customers_schema() -> SchemaDescriptor {
    SchemaDescriptor::new(
        1,
        Columns::new(vec![
            Column::new("id", NativeType::Long, false),
            Column::new("tenant", NativeType::Uuid, false),
        ]),
        Columns::new(vec![
            Column::new("email", NativeType::String, false),
            Column::new("first_name", NativeType::String, false),
            Column::new("last_name", NativeType::String, true),
            Column::new("created_at", NativeType::Long, false),
            Column::new("flags", NativeType::bitmask(12), false),
        ]),
    )
}

fn print_chunk(schema: &SchemaDescriptor, chunk: &ChunkView<'_>) {
    println!(
        "{:?} chunk  : base {} len {} varlen {}",
        chunk.kind(),
        chunk.base(),
        chunk.len(),
        chunk.varlen_count()
    );

    for (idx, column) in schema.chunk(chunk.kind()).iter().enumerate() {
        match chunk.column_range(idx) {
            Some(range) => println!("  {:<12} {:?}", column.name, range),
            None => println!("  {:<12} null", column.name),
        }
    }
}

fn print_hex(bytes: &[u8]) {
    for (i, line) in bytes.chunks(16).enumerate() {
        let hex: Vec<String> = line.iter().map(|b| format!("{b:02x}")).collect();
        println!("{:04x}: {}", i * 16, hex.join(" "));
    }
}
