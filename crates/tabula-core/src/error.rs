//! Error types for Tabula

use thiserror::Error;

use crate::amount::ParseAmountError;

/// Conversion failures raised to the caller.
///
/// Variants are categories rather than messages so callers can map header
/// problems, per-row content problems and "nothing usable in the file" to
/// distinct responses.
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Invalid file header")]
    InvalidFileHeader,

    #[error("Missing required field in header row")]
    MissingRequiredFieldInHeaderRow,

    #[error("Format invalid")]
    FormatInvalid,

    #[error("Transaction time invalid")]
    TransactionTimeInvalid,

    #[error("Transaction type invalid")]
    TransactionTypeInvalid,

    #[error("Account currency invalid")]
    AccountCurrencyInvalid,

    #[error("No transaction data found in file")]
    NotFoundTransactionDataInFile,

    #[error("Operation failed")]
    OperationFailed,

    #[error(transparent)]
    Amount(#[from] ParseAmountError),

    #[error(transparent)]
    Coordinate(#[from] std::num::ParseFloatError),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, ConvertError>;
