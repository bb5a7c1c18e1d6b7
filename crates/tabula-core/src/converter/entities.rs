//! Entity deduplication maps and export indexes

use std::collections::HashMap;

use crate::models::{Account, TransactionCategory, TransactionTag};

/// Name-keyed lookup tables for one conversion call.
///
/// Callers pre-seed them with entities already known to the persistence
/// layer so repeated imports do not duplicate accounts, categories or tags.
/// Entities created during a call are inserted here as well as returned in
/// [`super::ImportedData`]. Names match exactly and case-sensitively.
#[derive(Debug, Clone, Default)]
pub struct EntityMaps {
    pub accounts: HashMap<String, Account>,
    pub categories: HashMap<String, TransactionCategory>,
    pub tags: HashMap<String, TransactionTag>,
}

impl EntityMaps {
    pub fn new(
        accounts: impl IntoIterator<Item = Account>,
        categories: impl IntoIterator<Item = TransactionCategory>,
        tags: impl IntoIterator<Item = TransactionTag>,
    ) -> Self {
        Self {
            accounts: accounts
                .into_iter()
                .map(|account| (account.name.clone(), account))
                .collect(),
            categories: categories
                .into_iter()
                .map(|category| (category.name.clone(), category))
                .collect(),
            tags: tags.into_iter().map(|tag| (tag.name.clone(), tag)).collect(),
        }
    }
}

/// Id-keyed entities consulted by the export path
#[derive(Debug, Clone, Default)]
pub struct EntityIndex {
    pub accounts: HashMap<i64, Account>,
    pub categories: HashMap<i64, TransactionCategory>,
    pub tags: HashMap<i64, TransactionTag>,
    /// Ordered tag ids per transaction id
    pub transaction_tags: HashMap<i64, Vec<i64>>,
}

impl EntityIndex {
    /// Index persisted entities by id; entities without an id are skipped.
    pub fn new(
        accounts: impl IntoIterator<Item = Account>,
        categories: impl IntoIterator<Item = TransactionCategory>,
        tags: impl IntoIterator<Item = TransactionTag>,
        transaction_tags: HashMap<i64, Vec<i64>>,
    ) -> Self {
        Self {
            accounts: accounts
                .into_iter()
                .filter_map(|account| account.id.map(|id| (id, account)))
                .collect(),
            categories: categories
                .into_iter()
                .filter_map(|category| category.id.map(|id| (id, category)))
                .collect(),
            tags: tags
                .into_iter()
                .filter_map(|tag| tag.id.map(|id| (id, tag)))
                .collect(),
            transaction_tags,
        }
    }
}
