//! The application's own table format
//!
//! This is the format produced by export: one column per canonical column
//! with English header texts, comma- or tab-separated.

use tracing::error;

use crate::column::DataTableColumn;
use crate::error::{ConvertError, Result};
use crate::models::TransactionType;
use crate::table::{DelimitedTextBuilder, MemoryDataTable};

use super::format::{RowContext, Separators, TransactionDataFormat, TypeResolution};

const COLUMN_NAMES: &[(DataTableColumn, &str)] = &[
    (DataTableColumn::TransactionTime, "Time"),
    (DataTableColumn::TransactionTimezone, "Timezone"),
    (DataTableColumn::TransactionType, "Type"),
    (DataTableColumn::Category, "Category"),
    (DataTableColumn::SubCategory, "Sub Category"),
    (DataTableColumn::AccountName, "Account"),
    (DataTableColumn::AccountCurrency, "Account Currency"),
    (DataTableColumn::Amount, "Amount"),
    (DataTableColumn::RelatedAccountName, "Account2"),
    (DataTableColumn::RelatedAccountCurrency, "Account2 Currency"),
    (DataTableColumn::RelatedAmount, "Account2 Amount"),
    (DataTableColumn::GeographicLocation, "Geographic Location"),
    (DataTableColumn::Tags, "Tags"),
    (DataTableColumn::Description, "Description"),
];

/// Type display names. TransferIn has none: those rows are never exported.
const TYPE_NAMES: &[(TransactionType, &str)] = &[
    (TransactionType::ModifyBalance, "Balance Modification"),
    (TransactionType::Income, "Income"),
    (TransactionType::Expense, "Expense"),
    (TransactionType::TransferOut, "Transfer"),
];

const CSV_SEPARATORS: Separators = Separators {
    column: ",",
    line: "\n",
    geo_location: " ",
    tag: ";",
};

const TSV_SEPARATORS: Separators = Separators {
    column: "\t",
    line: "\n",
    geo_location: " ",
    tag: ";",
};

#[derive(Debug, Clone)]
pub struct NativeFormat {
    separators: Separators,
}

impl NativeFormat {
    pub fn csv() -> Self {
        Self {
            separators: CSV_SEPARATORS,
        }
    }

    pub fn tsv() -> Self {
        Self {
            separators: TSV_SEPARATORS,
        }
    }

    /// Read delimited text in this format into a table
    pub fn read_table(&self, content: &str) -> Result<MemoryDataTable> {
        let delimiter = self.separators.column.as_bytes().first().copied().unwrap_or(b',');
        MemoryDataTable::from_delimited(content, delimiter, false)
    }

    /// Sink writing delimited text in this format, header row included
    pub fn text_builder(&self) -> DelimitedTextBuilder {
        DelimitedTextBuilder::new(COLUMN_NAMES, self.separators.column, self.separators.line)
    }
}

impl TransactionDataFormat for NativeFormat {
    fn name(&self) -> &'static str {
        if self.separators.column == "\t" {
            "native_tsv"
        } else {
            "native_csv"
        }
    }

    fn column_name(&self, column: DataTableColumn) -> Option<&str> {
        COLUMN_NAMES
            .iter()
            .find(|(candidate, _)| *candidate == column)
            .map(|(_, name)| *name)
    }

    fn separators(&self) -> &Separators {
        &self.separators
    }

    fn transaction_type_name(&self, transaction_type: TransactionType) -> Option<&str> {
        TYPE_NAMES
            .iter()
            .find(|(candidate, _)| *candidate == transaction_type)
            .map(|(_, name)| *name)
    }

    fn transaction_type(&self, row: &RowContext<'_>) -> Result<TypeResolution> {
        let text = row.value(DataTableColumn::TransactionType).unwrap_or("");

        TYPE_NAMES
            .iter()
            .find(|(_, name)| *name == text)
            .map(|(transaction_type, _)| TypeResolution::of(*transaction_type))
            .ok_or_else(|| {
                error!(row = row.ordinal(), "cannot parse transaction type \"{}\"", text);
                ConvertError::TransactionTypeInvalid
            })
    }
}
