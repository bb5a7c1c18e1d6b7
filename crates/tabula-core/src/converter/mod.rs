//! Data table transaction converter
//!
//! Generic parse/build logic operating purely in terms of the canonical
//! column schema:
//! - import: header validation, row decoding, entity deduplication,
//!   transaction assembly and a stable time-ordered sort
//! - export: one row per transaction, TransferIn legs suppressed
//!
//! Source-specific vocabulary and heuristics come from the injected
//! [`TransactionDataFormat`]. A conversion call is synchronous and performs
//! no I/O; every data error aborts the whole call.

pub mod alipay;
pub mod entities;
pub mod format;
pub mod native;


use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::amount::{format_amount, parse_amount, ParseAmountError};
use crate::column::DataTableColumn;
use crate::currency::is_supported_currency;
use crate::datetime::{
    format_long_date_time, format_timezone_offset, parse_long_date_time, parse_timezone_offset,
};
use crate::error::{ConvertError, Result};
use crate::models::{
    Account, CategoryType, ImportTransaction, Transaction, TransactionCategory, TransactionTag,
    TransactionType, User,
};
use crate::table::{DataTableBuilder, ImportedDataTable};

pub use alipay::AlipayFormat;
pub use entities::{EntityIndex, EntityMaps};
pub use format::{
    AccountRoles, HeaderIndex, RowContext, Separators, TransactionDataFormat, TypeResolution,
};
pub use native::NativeFormat;

/// Result of a successful import
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportedData {
    /// Sorted by transaction time, input order kept for equal times
    pub transactions: Vec<ImportTransaction>,
    pub new_accounts: Vec<Account>,
    pub new_sub_categories: Vec<TransactionCategory>,
    pub new_tags: Vec<TransactionTag>,
}

/// Converts between row/column tables and canonical transactions
#[derive(Debug, Clone)]
pub struct DataTableConverter<F> {
    format: F,
}

/// Entities created during one pass, kept apart from the caller's maps
/// until the pass succeeds
struct ImportPass<'a> {
    user: &'a User,
    known: &'a EntityMaps,
    created: EntityMaps,
    data: ImportedData,
}

impl<'a> ImportPass<'a> {
    fn new(user: &'a User, known: &'a EntityMaps, capacity: usize) -> Self {
        Self {
            user,
            known,
            created: EntityMaps::default(),
            data: ImportedData {
                transactions: Vec::with_capacity(capacity),
                ..Default::default()
            },
        }
    }

    fn account(&self, name: &str) -> Option<&Account> {
        self.known
            .accounts
            .get(name)
            .or_else(|| self.created.accounts.get(name))
    }

    fn category(&self, name: &str) -> Option<&TransactionCategory> {
        self.known
            .categories
            .get(name)
            .or_else(|| self.created.categories.get(name))
    }

    fn tag(&self, name: &str) -> Option<&TransactionTag> {
        self.known
            .tags
            .get(name)
            .or_else(|| self.created.tags.get(name))
    }

    fn create_account(&mut self, name: &str, currency: &str) {
        let account = Account {
            id: None,
            uid: self.user.uid,
            name: name.to_string(),
            currency: currency.to_string(),
        };

        self.data.new_accounts.push(account.clone());
        self.created.accounts.insert(name.to_string(), account);
    }

    fn create_category(&mut self, name: &str, category_type: CategoryType) {
        let category = TransactionCategory {
            id: None,
            uid: self.user.uid,
            name: name.to_string(),
            parent_id: None,
            category_type,
        };

        self.data.new_sub_categories.push(category.clone());
        self.created.categories.insert(name.to_string(), category);
    }

    fn create_tag(&mut self, name: &str) {
        let tag = TransactionTag {
            id: None,
            uid: self.user.uid,
            name: name.to_string(),
        };

        self.data.new_tags.push(tag.clone());
        self.created.tags.insert(name.to_string(), tag);
    }
}

impl<F: TransactionDataFormat> DataTableConverter<F> {
    pub fn new(format: F) -> Self {
        Self { format }
    }

    pub fn format(&self) -> &F {
        &self.format
    }

    /// Decode every row of `table` into import transactions.
    ///
    /// `maps` holds entities already known to the caller; entities created
    /// by this call are merged into it only when the whole call succeeds.
    pub fn parse_imported_data(
        &self,
        user: &User,
        table: &dyn ImportedDataTable,
        default_timezone_offset: i32,
        maps: &mut EntityMaps,
    ) -> Result<ImportedData> {
        if table.data_row_count() < 1 {
            error!(
                uid = user.uid,
                format = self.format.name(),
                "cannot parse import data, because data table row count is less than 1"
            );
            return Err(ConvertError::OperationFailed);
        }

        let header = HeaderIndex::new(table.header_column_names(), &self.format);
        self.format.validate_header(&header)?;

        let mut pass = ImportPass::new(user, maps, table.data_row_count());

        for (index, row) in table.data_rows().enumerate() {
            let ordinal = index + 1;
            let column_count = row.column_count();

            if column_count < 1 || (column_count == 1 && row.cell(0).is_empty()) {
                continue;
            }

            if column_count < header.column_count() {
                error!(
                    row = ordinal,
                    uid = user.uid,
                    column_count,
                    header_column_count = header.column_count(),
                    "cannot parse data row, because it has fewer columns than the header row"
                );
                return Err(ConvertError::FormatInvalid);
            }

            let row = RowContext::new(row, &header, ordinal);
            let transaction = self.parse_row(&mut pass, &row, default_timezone_offset)?;
            pass.data.transactions.push(transaction);
        }

        let ImportPass { created, mut data, .. } = pass;

        data.transactions.sort_by_key(|transaction| transaction.transaction_time);

        maps.accounts.extend(created.accounts);
        maps.categories.extend(created.categories);
        maps.tags.extend(created.tags);

        debug!(
            uid = user.uid,
            format = self.format.name(),
            transactions = data.transactions.len(),
            new_accounts = data.new_accounts.len(),
            new_sub_categories = data.new_sub_categories.len(),
            new_tags = data.new_tags.len(),
            "parsed import data"
        );

        Ok(data)
    }

    fn parse_row(
        &self,
        pass: &mut ImportPass<'_>,
        row: &RowContext<'_>,
        default_timezone_offset: i32,
    ) -> Result<ImportTransaction> {
        let uid = pass.user.uid;
        let timezone_offset = self.timezone_offset(row, default_timezone_offset);

        let time_text = row.value(DataTableColumn::TransactionTime).unwrap_or("");
        let transaction_time = parse_long_date_time(time_text, timezone_offset).map_err(|err| {
            error!(row = row.ordinal(), uid, "cannot parse time \"{}\"", time_text);
            err
        })?;

        let resolution = self.format.transaction_type(row)?;
        let transaction_type = resolution.transaction_type;

        let mut category_id = None;
        let mut category_name = String::new();

        if transaction_type != TransactionType::ModifyBalance {
            let category_type = transaction_type.category_type().ok_or_else(|| {
                error!(
                    row = row.ordinal(),
                    uid,
                    transaction_type = %transaction_type,
                    "cannot derive category type from transaction type"
                );
                ConvertError::TransactionTypeInvalid
            })?;

            category_name = self.format.category_name(row, transaction_type)?;

            category_id = match pass.category(&category_name) {
                Some(category) => category.id,
                None => {
                    pass.create_category(&category_name, category_type);
                    None
                }
            };
        }

        let roles = self.format.account_roles(row, transaction_type)?;

        let (account_id, account_currency) = self.resolve_account(
            pass,
            row,
            &roles.source,
            DataTableColumn::AccountCurrency,
        )?;
        let amount = self.parse_row_amount(row, DataTableColumn::Amount, resolution)?;

        let mut related_account_id = None;
        let mut related_account_amount = 0;
        let mut destination_name = String::new();
        let mut destination_currency = String::new();

        if transaction_type == TransactionType::TransferOut {
            let (id, currency) = self.resolve_account(
                pass,
                row,
                &roles.destination,
                DataTableColumn::RelatedAccountCurrency,
            )?;

            related_account_id = id;
            related_account_amount =
                self.parse_row_amount(row, DataTableColumn::RelatedAmount, resolution)?;
            destination_name = roles.destination.clone();
            destination_currency = currency;
        }

        let (geo_longitude, geo_latitude) = self.geo_location(row)?;
        let (tag_ids, tag_names) = self.tags(pass, row);

        Ok(ImportTransaction {
            uid,
            transaction_type,
            category_id,
            transaction_time,
            timezone_utc_offset: timezone_offset,
            account_id,
            amount,
            related_account_id,
            related_account_amount,
            comment: self.format.description(row),
            geo_longitude,
            geo_latitude,
            tag_ids,
            original_category_name: category_name,
            original_source_account_name: roles.source,
            original_source_account_currency: account_currency,
            original_destination_account_name: destination_name,
            original_destination_account_currency: destination_currency,
            original_tag_names: tag_names,
        })
    }

    fn timezone_offset(&self, row: &RowContext<'_>, default_timezone_offset: i32) -> i32 {
        match row.value(DataTableColumn::TransactionTimezone) {
            Some(text) if !text.is_empty() => parse_timezone_offset(text).unwrap_or_else(|| {
                warn!(
                    row = row.ordinal(),
                    "cannot parse time zone \"{}\", using default offset", text
                );
                default_timezone_offset
            }),
            _ => default_timezone_offset,
        }
    }

    /// Look up or create the account `name`, returning its id (if it was
    /// already known) and its currency.
    fn resolve_account(
        &self,
        pass: &mut ImportPass<'_>,
        row: &RowContext<'_>,
        name: &str,
        currency_column: DataTableColumn,
    ) -> Result<(Option<i64>, String)> {
        let uid = pass.user.uid;
        let supplied = row.value(currency_column).filter(|currency| !currency.is_empty());

        if let Some(currency) = supplied {
            if !is_supported_currency(currency) {
                error!(
                    row = row.ordinal(),
                    uid, "account currency \"{}\" is not supported", currency
                );
                return Err(ConvertError::AccountCurrencyInvalid);
            }
        }

        match pass.account(name) {
            Some(account) => {
                if let Some(currency) = supplied {
                    if account.currency != currency {
                        error!(
                            row = row.ordinal(),
                            uid,
                            "currency \"{}\" not equals currency \"{}\" of account \"{}\"",
                            currency,
                            account.currency,
                            name
                        );
                        return Err(ConvertError::AccountCurrencyInvalid);
                    }
                }

                Ok((account.id, account.currency.clone()))
            }
            None => {
                let currency = supplied
                    .unwrap_or(pass.user.default_currency.as_str())
                    .to_string();
                pass.create_account(name, &currency);
                Ok((None, currency))
            }
        }
    }

    fn parse_row_amount(
        &self,
        row: &RowContext<'_>,
        column: DataTableColumn,
        resolution: TypeResolution,
    ) -> Result<i64> {
        let text = row.value(column).unwrap_or("");
        let amount = parse_amount(text).map_err(|err| {
            error!(
                row = row.ordinal(),
                column = %column,
                "cannot parse amount \"{}\", because {}",
                text,
                err
            );
            err
        })?;

        if !resolution.negate_amount {
            return Ok(amount);
        }

        amount
            .checked_neg()
            .ok_or_else(|| ParseAmountError::OutOfRange(text.to_string()).into())
    }

    fn geo_location(&self, row: &RowContext<'_>) -> Result<(f64, f64)> {
        let Some(location) = row.value(DataTableColumn::GeographicLocation) else {
            return Ok((0.0, 0.0));
        };

        let items: Vec<&str> = location
            .split(self.format.separators().geo_location)
            .collect();

        if items.len() != 2 {
            return Ok((0.0, 0.0));
        }

        let parse = |text: &str| {
            text.parse::<f64>().map_err(|err| {
                error!(
                    row = row.ordinal(),
                    "cannot parse geographic location \"{}\", because {}", location, err
                );
                ConvertError::from(err)
            })
        };

        Ok((parse(items[0])?, parse(items[1])?))
    }

    /// Tag ids (known tags only) and names, first-seen order, duplicates and
    /// empty names dropped
    fn tags(
        &self,
        pass: &mut ImportPass<'_>,
        row: &RowContext<'_>,
    ) -> (Vec<Option<i64>>, Vec<String>) {
        let mut tag_ids = Vec::new();
        let mut tag_names: Vec<String> = Vec::new();

        let Some(cell) = row.value(DataTableColumn::Tags) else {
            return (tag_ids, tag_names);
        };

        for name in cell.split(self.format.separators().tag) {
            if name.is_empty() || tag_names.iter().any(|existing| existing == name) {
                continue;
            }

            let id = match pass.tag(name) {
                Some(tag) => tag.id,
                None => {
                    pass.create_tag(name);
                    None
                }
            };

            tag_ids.push(id);
            tag_names.push(name.to_string());
        }

        (tag_ids, tag_names)
    }

    /// Append one row per transaction to `builder`.
    ///
    /// TransferIn transactions are skipped; they are rebuilt on import from
    /// their TransferOut row. Unresolvable ids render as empty cells.
    pub fn build_exported_content(
        &self,
        builder: &mut dyn DataTableBuilder,
        transactions: &[Transaction],
        index: &EntityIndex,
    ) {
        let mut exported = 0;

        for transaction in transactions {
            if transaction.transaction_type == TransactionType::TransferIn {
                continue;
            }

            let mut row = HashMap::with_capacity(DataTableColumn::all().len());
            let offset = transaction.timezone_utc_offset;

            row.insert(
                DataTableColumn::TransactionTime,
                format_long_date_time(transaction.transaction_time, offset),
            );
            row.insert(
                DataTableColumn::TransactionTimezone,
                format_timezone_offset(offset),
            );
            row.insert(
                DataTableColumn::TransactionType,
                self.replace_delimiters(
                    self.format
                        .transaction_type_name(transaction.transaction_type)
                        .unwrap_or(""),
                ),
            );
            row.insert(
                DataTableColumn::Category,
                self.exported_category_name(transaction.category_id, index),
            );
            row.insert(
                DataTableColumn::SubCategory,
                self.exported_sub_category_name(transaction.category_id, index),
            );
            row.insert(
                DataTableColumn::AccountName,
                self.exported_account_name(Some(transaction.account_id), index),
            );
            row.insert(
                DataTableColumn::AccountCurrency,
                self.exported_account_currency(Some(transaction.account_id), index),
            );
            row.insert(DataTableColumn::Amount, format_amount(transaction.amount));

            if transaction.transaction_type == TransactionType::TransferOut {
                row.insert(
                    DataTableColumn::RelatedAccountName,
                    self.exported_account_name(transaction.related_account_id, index),
                );
                row.insert(
                    DataTableColumn::RelatedAccountCurrency,
                    self.exported_account_currency(transaction.related_account_id, index),
                );
                row.insert(
                    DataTableColumn::RelatedAmount,
                    format_amount(transaction.related_account_amount),
                );
            }

            row.insert(
                DataTableColumn::GeographicLocation,
                self.exported_geo_location(transaction),
            );
            row.insert(
                DataTableColumn::Tags,
                self.exported_tags(transaction.id, index),
            );
            row.insert(
                DataTableColumn::Description,
                self.replace_delimiters(&transaction.comment),
            );

            builder.append_row(row);
            exported += 1;
        }

        debug!(
            format = self.format.name(),
            exported,
            skipped = transactions.len() - exported,
            "built exported content"
        );
    }

    /// Parent category name, or the category's own name when it is top-level
    fn exported_category_name(&self, category_id: Option<i64>, index: &EntityIndex) -> String {
        let Some(category) = category_id.and_then(|id| index.categories.get(&id)) else {
            return String::new();
        };

        match category.parent_id {
            None => self.replace_delimiters(&category.name),
            Some(parent_id) => index
                .categories
                .get(&parent_id)
                .map(|parent| self.replace_delimiters(&parent.name))
                .unwrap_or_default(),
        }
    }

    fn exported_sub_category_name(&self, category_id: Option<i64>, index: &EntityIndex) -> String {
        category_id
            .and_then(|id| index.categories.get(&id))
            .map(|category| self.replace_delimiters(&category.name))
            .unwrap_or_default()
    }

    fn exported_account_name(&self, account_id: Option<i64>, index: &EntityIndex) -> String {
        account_id
            .and_then(|id| index.accounts.get(&id))
            .map(|account| self.replace_delimiters(&account.name))
            .unwrap_or_default()
    }

    fn exported_account_currency(&self, account_id: Option<i64>, index: &EntityIndex) -> String {
        account_id
            .and_then(|id| index.accounts.get(&id))
            .map(|account| self.replace_delimiters(&account.currency))
            .unwrap_or_default()
    }

    fn exported_geo_location(&self, transaction: &Transaction) -> String {
        if transaction.geo_longitude == 0.0 && transaction.geo_latitude == 0.0 {
            return String::new();
        }

        format!(
            "{:.6}{}{:.6}",
            transaction.geo_longitude,
            self.format.separators().geo_location,
            transaction.geo_latitude
        )
    }

    fn exported_tags(&self, transaction_id: i64, index: &EntityIndex) -> String {
        let Some(tag_ids) = index.transaction_tags.get(&transaction_id) else {
            return String::new();
        };

        let separator = self.format.separators().tag;

        let names: Vec<String> = tag_ids
            .iter()
            .filter_map(|id| index.tags.get(id))
            .map(|tag| replace_all(&tag.name, separator))
            .collect();

        self.replace_delimiters(&names.join(separator))
    }

    /// Replace line breaks and the column/line separators with a space so a
    /// free-text cell cannot break the table structure
    fn replace_delimiters(&self, text: &str) -> String {
        let separators = self.format.separators();

        let text = text.replace("\r\n", " ").replace(['\r', '\n'], " ");
        let text = replace_all(&text, separators.column);

        replace_all(&text, separators.line)
    }
}

fn replace_all(text: &str, separator: &str) -> String {
    if separator.is_empty() {
        text.to_string()
    } else {
        text.replace(separator, " ")
    }
}
