//! Source format capability interface
//!
//! A [`TransactionDataFormat`] is the per-source configuration injected into
//! the converter: how canonical columns are spelled in the header row, which
//! separators the table uses, and how a row's type, category, account roles
//! and description are resolved. The provided methods implement the
//! structured-table behaviour; narrative sources override them.

use std::collections::HashMap;

use tracing::error;

use crate::column::DataTableColumn;
use crate::error::{ConvertError, Result};
use crate::models::TransactionType;
use crate::table::DataRow;

/// Separators used inside and between cells
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Separators {
    pub column: &'static str,
    pub line: &'static str,
    pub geo_location: &'static str,
    pub tag: &'static str,
}

/// Outcome of type resolution for one row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeResolution {
    pub transaction_type: TransactionType,
    /// Store the amount with its sign inverted (refunds)
    pub negate_amount: bool,
}

impl TypeResolution {
    pub fn of(transaction_type: TransactionType) -> Self {
        Self {
            transaction_type,
            negate_amount: false,
        }
    }
}

/// Account names occupying the two account roles of a row.
///
/// `destination` is only consulted for TransferOut rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountRoles {
    pub source: String,
    pub destination: String,
}

/// Header row scanned once into name and canonical-column positions
#[derive(Debug, Clone)]
pub struct HeaderIndex {
    column_count: usize,
    names: HashMap<String, usize>,
    columns: HashMap<DataTableColumn, usize>,
}

impl HeaderIndex {
    pub fn new<F: TransactionDataFormat + ?Sized>(header: &[String], format: &F) -> Self {
        let mut names = HashMap::with_capacity(header.len());

        for (index, name) in header.iter().enumerate() {
            names.insert(name.clone(), index);
        }

        let columns = DataTableColumn::all()
            .iter()
            .filter_map(|column| {
                let name = format.column_name(*column)?;
                names.get(name).map(|index| (*column, *index))
            })
            .collect();

        Self {
            column_count: header.len(),
            names,
            columns,
        }
    }

    pub fn column_count(&self) -> usize {
        self.column_count
    }

    pub fn contains(&self, column: DataTableColumn) -> bool {
        self.columns.contains_key(&column)
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    fn position(&self, column: DataTableColumn) -> Option<usize> {
        self.columns.get(&column).copied()
    }

    fn position_of_name(&self, name: &str) -> Option<usize> {
        self.names.get(name).copied()
    }
}

/// A data row viewed through the header index
#[derive(Clone, Copy)]
pub struct RowContext<'a> {
    row: &'a dyn DataRow,
    header: &'a HeaderIndex,
    ordinal: usize,
}

impl<'a> RowContext<'a> {
    pub fn new(row: &'a dyn DataRow, header: &'a HeaderIndex, ordinal: usize) -> Self {
        Self {
            row,
            header,
            ordinal,
        }
    }

    /// 1-based position of the row among the data rows
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    /// Cell of a canonical column; `None` when the header lacks the column
    pub fn value(&self, column: DataTableColumn) -> Option<&'a str> {
        self.header.position(column).map(|index| self.row.cell(index))
    }

    /// Cell under a literal header text; `None` when the header lacks it
    pub fn value_by_name(&self, name: &str) -> Option<&'a str> {
        self.header
            .position_of_name(name)
            .map(|index| self.row.cell(index))
    }
}

/// Per-source vocabulary and classification rules
pub trait TransactionDataFormat: Send + Sync {
    /// Short identifier used in logs
    fn name(&self) -> &'static str;

    /// Literal header text of a canonical column, if the source has it
    fn column_name(&self, column: DataTableColumn) -> Option<&str>;

    fn separators(&self) -> &Separators;

    /// Display text of a transaction type, used on export
    fn transaction_type_name(&self, _transaction_type: TransactionType) -> Option<&str> {
        None
    }

    /// Reject a header row lacking required columns. Runs before any data row
    /// is read.
    fn validate_header(&self, header: &HeaderIndex) -> Result<()> {
        for column in DataTableColumn::mandatory() {
            if !header.contains(*column) {
                error!(
                    format = self.name(),
                    column = %column,
                    "missing required column in header row"
                );
                return Err(ConvertError::MissingRequiredFieldInHeaderRow);
            }
        }

        Ok(())
    }

    fn transaction_type(&self, row: &RowContext<'_>) -> Result<TypeResolution>;

    /// Sub-category name; only called for rows other than ModifyBalance
    fn category_name(
        &self,
        row: &RowContext<'_>,
        _transaction_type: TransactionType,
    ) -> Result<String> {
        let name = row.value(DataTableColumn::SubCategory).unwrap_or("");

        if name.is_empty() {
            error!(row = row.ordinal(), "sub category name is empty");
            return Err(ConvertError::FormatInvalid);
        }

        Ok(name.to_string())
    }

    fn account_roles(
        &self,
        row: &RowContext<'_>,
        transaction_type: TransactionType,
    ) -> Result<AccountRoles> {
        let source = row.value(DataTableColumn::AccountName).unwrap_or("");

        if source.is_empty() {
            error!(row = row.ordinal(), "account name is empty");
            return Err(ConvertError::FormatInvalid);
        }

        let mut roles = AccountRoles {
            source: source.to_string(),
            destination: String::new(),
        };

        if transaction_type == TransactionType::TransferOut {
            let destination = row.value(DataTableColumn::RelatedAccountName).unwrap_or("");

            if destination.is_empty() {
                error!(row = row.ordinal(), "related account name is empty");
                return Err(ConvertError::FormatInvalid);
            }

            roles.destination = destination.to_string();
        }

        Ok(roles)
    }

    fn description(&self, row: &RowContext<'_>) -> String {
        row.value(DataTableColumn::Description)
            .unwrap_or("")
            .to_string()
    }
}
