//! Domain models for Tabula

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The owner of a conversion call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub uid: i64,
    /// Currency assigned to new accounts when the source names none
    pub default_currency: String,
}

/// Canonical transaction types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    ModifyBalance,
    Income,
    Expense,
    TransferOut,
    /// Paired leg of a TransferOut; never materialized on import
    TransferIn,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ModifyBalance => "modify_balance",
            Self::Income => "income",
            Self::Expense => "expense",
            Self::TransferOut => "transfer_out",
            Self::TransferIn => "transfer_in",
        }
    }

    /// Numeric code used by the persistence layer
    pub fn as_db_code(&self) -> u8 {
        match self {
            Self::ModifyBalance => 1,
            Self::Income => 2,
            Self::Expense => 3,
            Self::TransferOut => 4,
            Self::TransferIn => 5,
        }
    }

    pub fn from_db_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::ModifyBalance),
            2 => Some(Self::Income),
            3 => Some(Self::Expense),
            4 => Some(Self::TransferOut),
            5 => Some(Self::TransferIn),
            _ => None,
        }
    }

    /// Category kind owned by transactions of this type, if any
    pub fn category_type(&self) -> Option<CategoryType> {
        match self {
            Self::Income => Some(CategoryType::Income),
            Self::Expense => Some(CategoryType::Expense),
            Self::TransferOut => Some(CategoryType::Transfer),
            Self::ModifyBalance | Self::TransferIn => None,
        }
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "modify_balance" => Ok(Self::ModifyBalance),
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            "transfer_out" => Ok(Self::TransferOut),
            "transfer_in" => Ok(Self::TransferIn),
            _ => Err(format!("Unknown transaction type: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Category kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryType {
    Income,
    Expense,
    Transfer,
}

impl CategoryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
            Self::Transfer => "transfer",
        }
    }

    pub fn as_db_code(&self) -> u8 {
        match self {
            Self::Income => 1,
            Self::Expense => 2,
            Self::Transfer => 3,
        }
    }

    pub fn from_db_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Income),
            2 => Some(Self::Expense),
            3 => Some(Self::Transfer),
            _ => None,
        }
    }
}

impl std::fmt::Display for CategoryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An account. `id` is `None` until the persistence layer assigns one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: Option<i64>,
    pub uid: i64,
    pub name: String,
    pub currency: String,
}

/// A transaction category (two-level: parent and leaf)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionCategory {
    pub id: Option<i64>,
    pub uid: i64,
    pub name: String,
    /// Parent category; `None` for top-level categories
    #[serde(default)]
    pub parent_id: Option<i64>,
    pub category_type: CategoryType,
}

/// A transaction tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionTag {
    pub id: Option<i64>,
    pub uid: i64,
    pub name: String,
}

/// A persisted transaction, the input of the export path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub uid: i64,
    pub transaction_type: TransactionType,
    #[serde(default)]
    pub category_id: Option<i64>,
    pub transaction_time: DateTime<Utc>,
    /// Minutes east of UTC the transaction was recorded in
    pub timezone_utc_offset: i32,
    pub account_id: i64,
    /// Minor units
    pub amount: i64,
    #[serde(default)]
    pub related_account_id: Option<i64>,
    #[serde(default)]
    pub related_account_amount: i64,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub geo_longitude: f64,
    #[serde(default)]
    pub geo_latitude: f64,
}

/// A transaction decoded from an imported table.
///
/// Entity references are by original name; ids are only present for entities
/// that already existed in the caller's maps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportTransaction {
    pub uid: i64,
    pub transaction_type: TransactionType,
    pub category_id: Option<i64>,
    pub transaction_time: DateTime<Utc>,
    pub timezone_utc_offset: i32,
    pub account_id: Option<i64>,
    pub amount: i64,
    pub related_account_id: Option<i64>,
    pub related_account_amount: i64,
    pub comment: String,
    pub geo_longitude: f64,
    pub geo_latitude: f64,
    /// Parallel to `original_tag_names`; `None` for tags created by this import
    pub tag_ids: Vec<Option<i64>>,
    pub original_category_name: String,
    pub original_source_account_name: String,
    pub original_source_account_currency: String,
    pub original_destination_account_name: String,
    pub original_destination_account_currency: String,
    pub original_tag_names: Vec<String>,
}
