//! Import command implementation

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tabula_core::{
    AlipayFormat, ConverterSettings, DataTableConverter, EntityMaps, ImportedData,
    MemoryDataTable, TransactionDataFormat,
};
use tracing::info;

use super::{load_settings, write_output, SourceFormat};

pub fn cmd_import(
    config: Option<&Path>,
    file: &Path,
    format_str: &str,
    timezone: Option<String>,
    currency: Option<String>,
    output: Option<&Path>,
) -> Result<()> {
    let format: SourceFormat = format_str.parse()?;
    let settings = load_settings(config, timezone, currency)?;

    let content = fs::read_to_string(file)
        .with_context(|| format!("Failed to read file: {}", file.display()))?;

    let data = import_content(&content, format, &settings)
        .with_context(|| format!("Failed to import {} as {}", file.display(), format))?;

    let json = serde_json::to_string_pretty(&data).context("Failed to serialize import result")?;

    if write_output(output, &json)? {
        println!("✅ Import complete!");
        println!("   Transactions: {}", data.transactions.len());
        println!("   New accounts: {}", data.new_accounts.len());
        println!("   New sub-categories: {}", data.new_sub_categories.len());
        println!("   New tags: {}", data.new_tags.len());
    }

    Ok(())
}

/// Read `content` in the given format and run it through the converter
pub fn import_content(
    content: &str,
    format: SourceFormat,
    settings: &ConverterSettings,
) -> Result<ImportedData> {
    match format.native() {
        Some(native) => {
            let table = native.read_table(content)?;
            run_import(native, &table, settings)
        }
        None => {
            let alipay = AlipayFormat::new();
            let table = alipay.read_table(content)?;
            run_import(alipay, &table, settings)
        }
    }
}

fn run_import<F: TransactionDataFormat>(
    format: F,
    table: &MemoryDataTable,
    settings: &ConverterSettings,
) -> Result<ImportedData> {
    let name = format.name();
    let converter = DataTableConverter::new(format);

    let data = converter.parse_imported_data(
        &settings.user(),
        table,
        settings.utc_offset_minutes()?,
        &mut EntityMaps::default(),
    )?;

    info!(
        format = name,
        transactions = data.transactions.len(),
        "imported transactions"
    );

    Ok(data)
}
