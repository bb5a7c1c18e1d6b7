//! Alipay transaction export
//!
//! The export is a narrative table: a status word and a fund direction
//! instead of a type column, free-text counterparty and product fields
//! instead of account columns. Account roles are inferred from the product
//! name; see [`TRANSFER_RULES`].

use tracing::error;

use crate::column::DataTableColumn;
use crate::error::{ConvertError, Result};
use crate::models::TransactionType;
use crate::table::{ImportedDataTable, MemoryDataTable};

use super::format::{
    AccountRoles, HeaderIndex, RowContext, Separators, TransactionDataFormat, TypeResolution,
};

const FILE_TITLE: &str = "支付宝交易记录明细查询";
const SECTION_MARKER: &str = "交易记录明细列表";
const SECTION_END_PREFIX: &str = "---";

const TIME_COLUMN: &str = "交易创建时间";
const COUNTERPARTY_COLUMN: &str = "交易对方";
const PRODUCT_COLUMN: &str = "商品名称";
const AMOUNT_COLUMN: &str = "金额（元）";
const STATUS_COLUMN: &str = "交易状态";
const REMARK_COLUMN: &str = "备注";
const FUND_STATUS_COLUMN: &str = "资金状态";

const STATUS_SUCCESS: &str = "交易成功";
const STATUS_REFUND_SUCCESS: &str = "退款成功";
const STATUS_TAX_REFUND_SUCCESS: &str = "退税成功";

const FUND_INCOME: &str = "已收入";
const FUND_EXPENSE: &str = "已支出";
const FUND_TRANSFER: &str = "资金转移";

/// Pseudo-account standing for the Alipay wallet balance
pub const WALLET_ACCOUNT_NAME: &str = "Alipay";

static SEPARATORS: Separators = Separators {
    column: ",",
    line: "\n",
    geo_location: " ",
    tag: ";",
};

/// Who occupies an account role of a transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Party {
    Blank,
    Wallet,
    Counterparty,
}

#[derive(Debug, Clone, Copy)]
enum ProductMatch {
    Prefix(&'static str),
    Suffix(&'static str),
    Contains(&'static str),
}

impl ProductMatch {
    fn matches(&self, product: &str) -> bool {
        match self {
            ProductMatch::Prefix(text) => product.starts_with(text),
            ProductMatch::Suffix(text) => product.ends_with(text),
            ProductMatch::Contains(text) => product.contains(text),
        }
    }
}

/// Transfer account roles by product name, first match wins.
/// Unmatched transfers leave both roles blank.
const TRANSFER_RULES: &[(ProductMatch, Party, Party)] = &[
    // recharge
    (ProductMatch::Prefix("充值-"), Party::Blank, Party::Wallet),
    // withdrawal
    (ProductMatch::Prefix("提现-"), Party::Wallet, Party::Counterparty),
    (ProductMatch::Suffix("-转入"), Party::Blank, Party::Counterparty),
    (ProductMatch::Suffix("-转出"), Party::Blank, Party::Counterparty),
    // repayment
    (ProductMatch::Contains("还款"), Party::Blank, Party::Counterparty),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct AlipayFormat;

impl AlipayFormat {
    pub fn new() -> Self {
        Self
    }

    /// Cut the transaction section out of a full Alipay export.
    ///
    /// The file opens with a title line, followed by account and period
    /// lines, a dashed line carrying the section marker, the header row, the
    /// data rows and a closing dashed line. Cells are trimmed.
    pub fn read_table(&self, content: &str) -> Result<MemoryDataTable> {
        let mut lines = content.lines();

        let title = lines
            .next()
            .map(|line| line.trim_start_matches('\u{feff}').trim())
            .unwrap_or("");

        if title != FILE_TITLE {
            error!(format = self.name(), "cannot find alipay file title line");
            return Err(ConvertError::InvalidFileHeader);
        }

        if !lines.by_ref().any(|line| line.contains(SECTION_MARKER)) {
            error!(format = self.name(), "cannot find transaction section marker");
            return Err(ConvertError::InvalidFileHeader);
        }

        let section: Vec<&str> = lines
            .take_while(|line| !line.trim_start().starts_with(SECTION_END_PREFIX))
            .collect();

        let table = MemoryDataTable::from_delimited(&section.join("\n"), b',', true)?;

        if table.data_row_count() < 1 {
            error!(format = self.name(), "no transaction rows in alipay file");
            return Err(ConvertError::NotFoundTransactionDataInFile);
        }

        Ok(table)
    }

    fn party_name(&self, row: &RowContext<'_>, party: Party) -> String {
        match party {
            Party::Blank => String::new(),
            Party::Wallet => WALLET_ACCOUNT_NAME.to_string(),
            Party::Counterparty => row
                .value_by_name(COUNTERPARTY_COLUMN)
                .unwrap_or("")
                .to_string(),
        }
    }
}

impl TransactionDataFormat for AlipayFormat {
    fn name(&self) -> &'static str {
        "alipay"
    }

    fn column_name(&self, column: DataTableColumn) -> Option<&str> {
        match column {
            DataTableColumn::TransactionTime => Some(TIME_COLUMN),
            DataTableColumn::Amount | DataTableColumn::RelatedAmount => Some(AMOUNT_COLUMN),
            _ => None,
        }
    }

    fn separators(&self) -> &Separators {
        &SEPARATORS
    }

    fn validate_header(&self, header: &HeaderIndex) -> Result<()> {
        for name in [TIME_COLUMN, AMOUNT_COLUMN, STATUS_COLUMN, FUND_STATUS_COLUMN] {
            if !header.contains_name(name) {
                error!(
                    format = self.name(),
                    column = name,
                    "missing required column in header row"
                );
                return Err(ConvertError::MissingRequiredFieldInHeaderRow);
            }
        }

        Ok(())
    }

    fn transaction_type(&self, row: &RowContext<'_>) -> Result<TypeResolution> {
        let status = row.value_by_name(STATUS_COLUMN).unwrap_or("");
        let fund_status = row.value_by_name(FUND_STATUS_COLUMN).unwrap_or("");

        if fund_status.is_empty() {
            error!(
                row = row.ordinal(),
                "fund status is empty, row does not describe a transaction"
            );
            return Err(ConvertError::NotFoundTransactionDataInFile);
        }

        match status {
            STATUS_SUCCESS => match fund_status {
                FUND_INCOME => Ok(TypeResolution::of(TransactionType::Income)),
                FUND_EXPENSE => Ok(TypeResolution::of(TransactionType::Expense)),
                FUND_TRANSFER => Ok(TypeResolution::of(TransactionType::TransferOut)),
                _ => {
                    error!(row = row.ordinal(), "unknown fund status \"{}\"", fund_status);
                    Err(ConvertError::TransactionTypeInvalid)
                }
            },
            STATUS_REFUND_SUCCESS | STATUS_TAX_REFUND_SUCCESS => Ok(TypeResolution {
                transaction_type: TransactionType::Expense,
                negate_amount: true,
            }),
            _ => {
                error!(row = row.ordinal(), "unknown transaction status \"{}\"", status);
                Err(ConvertError::TransactionTypeInvalid)
            }
        }
    }

    /// The export carries no category, every row lands in the blank one
    fn category_name(
        &self,
        _row: &RowContext<'_>,
        _transaction_type: TransactionType,
    ) -> Result<String> {
        Ok(String::new())
    }

    fn account_roles(
        &self,
        row: &RowContext<'_>,
        transaction_type: TransactionType,
    ) -> Result<AccountRoles> {
        let (source, destination) = match transaction_type {
            TransactionType::Income => (Party::Wallet, Party::Blank),
            TransactionType::TransferOut => {
                let product = row.value_by_name(PRODUCT_COLUMN).unwrap_or("");

                TRANSFER_RULES
                    .iter()
                    .find(|(rule, _, _)| rule.matches(product))
                    .map(|(_, source, destination)| (*source, *destination))
                    .unwrap_or((Party::Blank, Party::Blank))
            }
            _ => (Party::Blank, Party::Blank),
        };

        Ok(AccountRoles {
            source: self.party_name(row, source),
            destination: self.party_name(row, destination),
        })
    }

    fn description(&self, row: &RowContext<'_>) -> String {
        let remark = row.value_by_name(REMARK_COLUMN).unwrap_or("");

        if remark.is_empty() {
            row.value_by_name(PRODUCT_COLUMN).unwrap_or("").to_string()
        } else {
            remark.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::{DataTableConverter, EntityMaps, ImportedData};
    use crate::datetime::format_long_date_time;
    use crate::models::User;

    const FILE_PREAMBLE: &str = "支付宝交易记录明细查询\n\
        账号:[xxx@xxx.xxx]\n\
        起始日期:[2024-01-01 00:00:00]    终止日期:[2024-09-01 23:59:59]\n\
        ---------------------------------交易记录明细列表------------------------------------\n";
    const FILE_CLOSING: &str =
        "------------------------------------------------------------------------------------\n";

    fn alipay_file(header: &str, rows: &[&str]) -> String {
        let mut content = String::from(FILE_PREAMBLE);
        content.push_str(header);
        content.push('\n');
        for row in rows {
            content.push_str(row);
            content.push('\n');
        }
        content.push_str(FILE_CLOSING);
        content
    }

    fn user() -> User {
        User {
            uid: 1234567890,
            default_currency: "CNY".to_string(),
        }
    }

    fn parse(content: &str) -> Result<ImportedData> {
        let format = AlipayFormat::new();
        let table = format.read_table(content)?;
        let converter = DataTableConverter::new(format);
        converter.parse_imported_data(&user(), &table, 0, &mut EntityMaps::default())
    }

    const BASIC_HEADER: &str = "交易创建时间              ,金额（元）,交易状态    ,资金状态     ,";
    const ROLES_HEADER: &str =
        "交易创建时间              ,交易对方            ,商品名称                ,金额（元）,交易状态    ,资金状态     ,";

    #[test]
    fn test_minimum_valid_data() {
        let content = alipay_file(
            BASIC_HEADER,
            &[
                "2024-09-01 01:23:45 ,0.12   ,交易成功    ,已收入      ,",
                "2024-09-01 12:34:56 ,123.45  ,交易成功    ,已支出      ,",
                "2024-09-01 23:59:59 ,0.05   ,交易成功    ,资金转移     ,",
            ],
        );

        let data = parse(&content).unwrap();

        assert_eq!(data.transactions.len(), 3);
        assert_eq!(data.new_accounts.len(), 2);
        assert_eq!(data.new_sub_categories.len(), 1);
        assert_eq!(data.new_tags.len(), 0);

        let income = &data.transactions[0];
        assert_eq!(income.uid, 1234567890);
        assert_eq!(income.transaction_type, TransactionType::Income);
        assert_eq!(format_long_date_time(income.transaction_time, 0), "2024-09-01 01:23:45");
        assert_eq!(income.amount, 12);
        assert_eq!(income.original_source_account_name, "Alipay");
        assert_eq!(income.original_category_name, "");

        let expense = &data.transactions[1];
        assert_eq!(expense.transaction_type, TransactionType::Expense);
        assert_eq!(format_long_date_time(expense.transaction_time, 0), "2024-09-01 12:34:56");
        assert_eq!(expense.amount, 12345);
        assert_eq!(expense.original_source_account_name, "");

        let transfer = &data.transactions[2];
        assert_eq!(transfer.transaction_type, TransactionType::TransferOut);
        assert_eq!(transfer.amount, 5);
        assert_eq!(transfer.related_account_amount, 5);
        assert_eq!(transfer.original_source_account_name, "");
        assert_eq!(transfer.original_destination_account_name, "");

        assert_eq!(data.new_accounts[0].name, "Alipay");
        assert_eq!(data.new_accounts[0].currency, "CNY");
        assert_eq!(data.new_accounts[0].uid, 1234567890);
        assert_eq!(data.new_accounts[1].name, "");
        assert_eq!(data.new_accounts[1].currency, "CNY");
        assert_eq!(data.new_sub_categories[0].name, "");
    }

    #[test]
    fn test_refunds_become_negative_expenses() {
        for status in [STATUS_REFUND_SUCCESS, STATUS_TAX_REFUND_SUCCESS] {
            let row = format!("2024-09-01 01:23:45 ,0.12   ,{}    ,已收入      ,", status);
            let data = parse(&alipay_file(BASIC_HEADER, &[&row])).unwrap();

            let refund = &data.transactions[0];
            assert_eq!(refund.transaction_type, TransactionType::Expense);
            assert_eq!(refund.amount, -12);
            assert_eq!(refund.original_source_account_name, "");
            assert_eq!(refund.original_category_name, "");
        }
    }

    #[test]
    fn test_invalid_time() {
        for time in ["2024-09-01T12:34:56", "09/01/2024 12:34:56"] {
            let row = format!("{} ,0.12   ,交易成功    ,已收入      ,", time);
            let result = parse(&alipay_file(BASIC_HEADER, &[&row]));
            assert!(matches!(result, Err(ConvertError::TransactionTimeInvalid)), "{}", time);
        }
    }

    #[test]
    fn test_blank_fund_status() {
        let content = alipay_file(
            BASIC_HEADER,
            &["2024-09-01 12:34:56 ,0.12   ,交易成功    ,          ,"],
        );

        assert!(matches!(
            parse(&content),
            Err(ConvertError::NotFoundTransactionDataInFile)
        ));
    }

    #[test]
    fn test_unknown_status_and_fund_status() {
        let unknown_status = alipay_file(
            BASIC_HEADER,
            &["2024-09-01 12:34:56 ,0.12   ,等待付款    ,已支出      ,"],
        );
        assert!(matches!(
            parse(&unknown_status),
            Err(ConvertError::TransactionTypeInvalid)
        ));

        let unknown_fund = alipay_file(
            BASIC_HEADER,
            &["2024-09-01 12:34:56 ,0.12   ,交易成功    ,冻结      ,"],
        );
        assert!(matches!(
            parse(&unknown_fund),
            Err(ConvertError::TransactionTypeInvalid)
        ));
    }

    fn roles_of(row: &str) -> (String, String) {
        let data = parse(&alipay_file(ROLES_HEADER, &[row])).unwrap();
        assert_eq!(data.transactions.len(), 1);

        let transaction = &data.transactions[0];
        (
            transaction.original_source_account_name.clone(),
            transaction.original_destination_account_name.clone(),
        )
    }

    #[test]
    fn test_account_names() {
        // income to the wallet
        let (source, _) =
            roles_of("2024-09-01 12:34:56 ,test                ,,0.12   ,交易成功    ,已收入      ,");
        assert_eq!(source, "Alipay");

        // refund to another account
        let (source, _) =
            roles_of("2024-09-01 12:34:56 ,test                ,,0.12   ,退款成功    ,已收入      ,");
        assert_eq!(source, "");

        let cases = [
            ("充值-普通充值", "", "Alipay"),
            ("提现-实时提现", "Alipay", "test"),
            ("xx-转入", "", "test"),
            ("xx-转出", "", "test"),
            ("xx还款", "", "test"),
            ("其他", "", ""),
        ];

        for (product, expected_source, expected_destination) in cases {
            let row = format!(
                "2024-09-01 12:34:56 ,test                ,{}             ,0.12   ,交易成功    ,资金转移     ,",
                product
            );
            let (source, destination) = roles_of(&row);
            assert_eq!(source, expected_source, "{}", product);
            assert_eq!(destination, expected_destination, "{}", product);
        }
    }

    #[test]
    fn test_description() {
        let header =
            "交易创建时间              ,商品名称                ,金额（元）,交易状态    ,备注                  ,资金状态     ,";

        let with_remark = alipay_file(
            header,
            &[
                "2024-09-01 12:34:56 ,test                ,0.12   ,交易成功    ,test2               ,已收入      ,",
            ],
        );
        assert_eq!(parse(&with_remark).unwrap().transactions[0].comment, "test2");

        let without_remark = alipay_file(
            header,
            &[
                "2024-09-01 12:34:56 ,test                ,0.12   ,交易成功    ,                    ,已收入      ,",
            ],
        );
        assert_eq!(parse(&without_remark).unwrap().transactions[0].comment, "test");
    }

    #[test]
    fn test_missing_file_header() {
        let content = format!(
            "{}\n2024-09-01 12:34:56 ,0.12   ,交易成功    ,Type      ,\n{}",
            BASIC_HEADER, FILE_CLOSING
        );

        assert!(matches!(parse(&content), Err(ConvertError::InvalidFileHeader)));
        assert!(matches!(parse(""), Err(ConvertError::InvalidFileHeader)));
    }

    #[test]
    fn test_missing_section_marker() {
        let content = format!("{}\n{}\n", FILE_TITLE, BASIC_HEADER);
        assert!(matches!(parse(&content), Err(ConvertError::InvalidFileHeader)));
    }

    #[test]
    fn test_header_without_rows() {
        let content = alipay_file(BASIC_HEADER, &[]);
        assert!(matches!(
            parse(&content),
            Err(ConvertError::NotFoundTransactionDataInFile)
        ));
    }

    #[test]
    fn test_missing_required_column() {
        let cases = [
            ("金额（元）,交易状态    ,资金状态     ,", "0.12   ,交易成功    ,已收入      ,"),
            (
                "交易创建时间              ,交易状态    ,资金状态     ,",
                "2024-09-01 12:34:56 ,交易成功    ,已收入      ,",
            ),
            ("交易创建时间              ,金额（元）,资金状态     ,", "2024-09-01 12:34:56 ,0.12   ,已收入      ,"),
            ("交易创建时间              ,金额（元）,交易状态    ,", "2024-09-01 12:34:56 ,0.12   ,交易成功    ,"),
        ];

        for (header, row) in cases {
            assert!(
                matches!(
                    parse(&alipay_file(header, &[row])),
                    Err(ConvertError::MissingRequiredFieldInHeaderRow)
                ),
                "{}",
                header
            );
        }
    }
}
