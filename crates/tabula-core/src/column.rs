//! Canonical column schema
//!
//! Every source format maps its literal header texts onto these columns; the
//! converter only ever reasons in terms of the canonical set.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataTableColumn {
    TransactionTime,
    TransactionTimezone,
    TransactionType,
    Category,
    SubCategory,
    AccountName,
    AccountCurrency,
    Amount,
    RelatedAccountName,
    RelatedAccountCurrency,
    RelatedAmount,
    GeographicLocation,
    Tags,
    Description,
}

impl DataTableColumn {
    /// All columns in export order
    pub fn all() -> &'static [DataTableColumn] {
        &[
            Self::TransactionTime,
            Self::TransactionTimezone,
            Self::TransactionType,
            Self::Category,
            Self::SubCategory,
            Self::AccountName,
            Self::AccountCurrency,
            Self::Amount,
            Self::RelatedAccountName,
            Self::RelatedAccountCurrency,
            Self::RelatedAmount,
            Self::GeographicLocation,
            Self::Tags,
            Self::Description,
        ]
    }

    /// Columns every structured source must carry in its header row.
    ///
    /// The related-account columns are required even though only TransferOut
    /// rows populate them.
    pub fn mandatory() -> &'static [DataTableColumn] {
        &[
            Self::TransactionTime,
            Self::TransactionType,
            Self::SubCategory,
            Self::AccountName,
            Self::Amount,
            Self::RelatedAccountName,
            Self::RelatedAmount,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TransactionTime => "transaction_time",
            Self::TransactionTimezone => "transaction_timezone",
            Self::TransactionType => "transaction_type",
            Self::Category => "category",
            Self::SubCategory => "sub_category",
            Self::AccountName => "account_name",
            Self::AccountCurrency => "account_currency",
            Self::Amount => "amount",
            Self::RelatedAccountName => "related_account_name",
            Self::RelatedAccountCurrency => "related_account_currency",
            Self::RelatedAmount => "related_amount",
            Self::GeographicLocation => "geographic_location",
            Self::Tags => "tags",
            Self::Description => "description",
        }
    }
}

impl std::fmt::Display for DataTableColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
