//! Tabula Core Library
//!
//! Conversion between tabular transaction files and a normalized graph of
//! transactions, accounts, categories and tags:
//! - Row/column table abstraction with CSV/TSV reader and writer
//! - Canonical column schema shared by every source format
//! - Converter engine for import (validation, dedup, linking) and export
//! - Source formats: the native CSV/TSV table and the Alipay statement
//! - Exact decimal amounts, long date-times and UTC offsets
//! - Converter settings with a per-user override file

pub mod amount;
pub mod column;
pub mod converter;
pub mod currency;
pub mod datetime;
pub mod error;
pub mod models;
pub mod settings;
pub mod table;

pub use amount::{format_amount, parse_amount, ParseAmountError};
pub use column::DataTableColumn;
pub use converter::{
    AlipayFormat, DataTableConverter, EntityIndex, EntityMaps, ImportedData, NativeFormat,
    TransactionDataFormat,
};
pub use error::{ConvertError, Result};
pub use models::*;
pub use settings::{ConverterSettings, SettingsError};
pub use table::{
    DataRow, DataTableBuilder, DelimitedTextBuilder, ImportedDataTable, MemoryDataTable,
    VecDataTableBuilder,
};
