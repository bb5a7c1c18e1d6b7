//! Integration tests for tabula-core
//!
//! These tests exercise the full read → import → export workflow through the
//! public API only.

use std::collections::HashMap;

use tabula_core::{
    AlipayFormat, ConvertError, ConverterSettings, DataTableConverter, EntityIndex, EntityMaps,
    ImportedDataTable, NativeFormat, Transaction, TransactionType,
};

/// Native CSV export as written by the application
fn native_csv() -> &'static str {
    "Time,Timezone,Type,Category,Sub Category,Account,Account Currency,Amount,Account2,Account2 Currency,Account2 Amount,Geographic Location,Tags,Description
2024-09-03 09:15:00,+08:00,Expense,Food,Coffee,Cash,CNY,-18.00,,,,,morning;habit,latte
2024-09-01 00:00:00,+08:00,Balance Modification,,,Cash,CNY,500.00,,,,,,opening balance
2024-09-02 18:30:00,+08:00,Income,Work,Salary,Bank Card,CNY,8000.00,,,,,,
2024-09-02 20:00:00,+08:00,Transfer,Transfer,Top Up,Bank Card,CNY,200.00,Cash,CNY,200.00,,,
2024-09-03 12:00:00,+08:00,Expense,Food,Lunch,Cash,CNY,-35.50,,,,121.473701 31.230416,habit,
"
}

fn settings() -> ConverterSettings {
    ConverterSettings::from_toml(
        "[owner]\nuid = 1001\n[defaults]\ncurrency = \"CNY\"\ntimezone = \"+08:00\"\n",
    )
    .unwrap()
}

// =============================================================================
// Native format
// =============================================================================

#[test]
fn test_native_import_workflow() {
    let settings = settings();
    let format = NativeFormat::csv();
    let table = format.read_table(native_csv()).unwrap();
    let converter = DataTableConverter::new(format);

    let mut maps = EntityMaps::default();
    let data = converter
        .parse_imported_data(
            &settings.user(),
            &table,
            settings.utc_offset_minutes().unwrap(),
            &mut maps,
        )
        .unwrap();

    assert_eq!(data.transactions.len(), 5);
    assert_eq!(data.new_accounts.len(), 2);
    assert_eq!(data.new_sub_categories.len(), 4);
    assert_eq!(data.new_tags.len(), 2);

    let types: Vec<TransactionType> = data
        .transactions
        .iter()
        .map(|transaction| transaction.transaction_type)
        .collect();
    assert_eq!(
        types,
        vec![
            TransactionType::ModifyBalance,
            TransactionType::Income,
            TransactionType::TransferOut,
            TransactionType::Expense,
            TransactionType::Expense,
        ]
    );

    assert!(data.transactions.iter().all(|transaction| transaction.uid == 1001));
    assert_eq!(data.transactions[3].amount, -1800);
    assert_eq!(data.transactions[3].original_tag_names, vec!["morning", "habit"]);
    assert_eq!(data.transactions[4].geo_latitude, 31.230416);

    // A second import of the same file links to what the first one created
    let repeat = converter
        .parse_imported_data(&settings.user(), &table, 480, &mut maps)
        .unwrap();
    assert!(repeat.new_accounts.is_empty());
    assert!(repeat.new_sub_categories.is_empty());
    assert!(repeat.new_tags.is_empty());
}

#[test]
fn test_native_export_workflow() {
    let converter = DataTableConverter::new(NativeFormat::tsv());
    let index = EntityIndex::new(
        vec![tabula_core::Account {
            id: Some(1),
            uid: 1001,
            name: "Cash".to_string(),
            currency: "CNY".to_string(),
        }],
        Vec::new(),
        Vec::new(),
        HashMap::new(),
    );

    let transactions: Vec<Transaction> = serde_json::from_str(
        r#"[
            {
                "id": 1,
                "uid": 1001,
                "transaction_type": "modify_balance",
                "transaction_time": "2024-08-31T16:00:00Z",
                "timezone_utc_offset": 480,
                "account_id": 1,
                "amount": 50000,
                "comment": "opening\tbalance"
            }
        ]"#,
    )
    .unwrap();

    let mut builder = converter.format().text_builder();
    converter.build_exported_content(&mut builder, &transactions, &index);
    let content = builder.into_string();

    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("Time\tTimezone\tType"));
    assert_eq!(
        lines[1],
        "2024-09-01 00:00:00\t+08:00\tBalance Modification\t\t\tCash\tCNY\t500.00\t\t\t\t\t\topening balance"
    );
}

#[test]
fn test_native_import_rejects_foreign_header() {
    let format = NativeFormat::csv();
    let table = format
        .read_table("Date,Description,Amount\n2024-09-01,Coffee,-3.50\n")
        .unwrap();

    let result = DataTableConverter::new(format).parse_imported_data(
        &settings().user(),
        &table,
        0,
        &mut EntityMaps::default(),
    );
    assert!(matches!(
        result,
        Err(ConvertError::MissingRequiredFieldInHeaderRow)
    ));
}

// =============================================================================
// Alipay
// =============================================================================

fn alipay_statement() -> &'static str {
    "支付宝交易记录明细查询
账号:[xxx@xxx.xxx]
起始日期:[2024-01-01 00:00:00]    终止日期:[2024-09-01 23:59:59]
---------------------------------交易记录明细列表------------------------------------
交易创建时间              ,交易对方            ,商品名称                ,金额（元）,交易状态    ,备注                  ,资金状态     ,
2024-08-30 10:00:00 ,便利店              ,饮料                    ,3.50   ,交易成功    ,                    ,已支出      ,
2024-08-29 09:00:00 ,招商银行            ,充值-普通充值           ,100.00 ,交易成功    ,                    ,资金转移     ,
2024-08-31 08:00:00 ,便利店              ,饮料                    ,3.50   ,退款成功    ,质量问题            ,已收入      ,
------------------------------------------------------------------------------------
共3笔记录
"
}

#[test]
fn test_alipay_import_workflow() {
    let settings = settings();
    let format = AlipayFormat::new();
    let table = format.read_table(alipay_statement()).unwrap();
    assert_eq!(table.data_row_count(), 3);

    let data = DataTableConverter::new(format)
        .parse_imported_data(&settings.user(), &table, 480, &mut EntityMaps::default())
        .unwrap();

    assert_eq!(data.transactions.len(), 3);

    let recharge = &data.transactions[0];
    assert_eq!(recharge.transaction_type, TransactionType::TransferOut);
    assert_eq!(recharge.original_destination_account_name, "Alipay");
    assert_eq!(recharge.amount, 10000);
    assert_eq!(recharge.comment, "充值-普通充值");

    let purchase = &data.transactions[1];
    assert_eq!(purchase.transaction_type, TransactionType::Expense);
    assert_eq!(purchase.amount, 350);

    let refund = &data.transactions[2];
    assert_eq!(refund.transaction_type, TransactionType::Expense);
    assert_eq!(refund.amount, -350);
    assert_eq!(refund.comment, "质量问题");

    let names: Vec<&str> = data
        .new_accounts
        .iter()
        .map(|account| account.name.as_str())
        .collect();
    assert_eq!(names, vec!["", "Alipay"]);
    assert!(data.new_accounts.iter().all(|account| account.currency == "CNY"));
}

#[test]
fn test_alipay_rejects_other_files() {
    let result = AlipayFormat::new().read_table(native_csv());
    assert!(matches!(result, Err(ConvertError::InvalidFileHeader)));
}
