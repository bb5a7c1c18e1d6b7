//! Export command implementation

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tabula_core::{
    Account, DataTableConverter, EntityIndex, Transaction, TransactionCategory, TransactionTag,
};

use super::{write_output, SourceFormat};

/// Normalized data as handed over by the persistence layer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportDataset {
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub categories: Vec<TransactionCategory>,
    #[serde(default)]
    pub tags: Vec<TransactionTag>,
    /// Ordered tag ids keyed by transaction id
    #[serde(default)]
    pub transaction_tags: HashMap<i64, Vec<i64>>,
}

pub fn cmd_export(input: &Path, format_str: &str, output: Option<&Path>) -> Result<()> {
    let format: SourceFormat = format_str.parse()?;

    let json = fs::read_to_string(input)
        .with_context(|| format!("Failed to read dataset: {}", input.display()))?;
    let dataset: ExportDataset = serde_json::from_str(&json)
        .with_context(|| format!("Invalid dataset JSON: {}", input.display()))?;

    let content = export_dataset(dataset, format)?;

    if write_output(output, &content)? {
        let rows = content.lines().count().saturating_sub(1); // Subtract header
        if let Some(path) = output {
            println!("✅ Exported {} transactions to {}", rows, path.display());
        }
    }

    Ok(())
}

/// Render a dataset as delimited text, header row included
pub fn export_dataset(dataset: ExportDataset, format: SourceFormat) -> Result<String> {
    let Some(native) = format.native() else {
        anyhow::bail!("Export is not supported for format: {}", format);
    };

    let index = EntityIndex::new(
        dataset.accounts,
        dataset.categories,
        dataset.tags,
        dataset.transaction_tags,
    );

    let mut builder = native.text_builder();
    DataTableConverter::new(native).build_exported_content(
        &mut builder,
        &dataset.transactions,
        &index,
    );

    Ok(builder.into_string())
}
