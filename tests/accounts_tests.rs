// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use fin::models::{AccountPatch, NewAccount, NewCategory, Rate, TransactionDraft};
use fin::money::Money;
use fin::store::{accounts, categories, currencies, transactions};
use fin::{LedgerError, db};
use rusqlite::Connection;
use rust_decimal_macros::dec;
use std::time::Duration;

fn setup() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    db::configure(&conn, Duration::from_millis(100)).unwrap();
    db::migrate(&mut conn).unwrap();
    currencies::create(
        &mut conn,
        "USD",
        "$",
        &[Rate::new("BRL", "R$", dec!(3.80)), Rate::new("EUR", "€", dec!(0.87))],
    )
    .unwrap();
    conn
}

fn wallet(conn: &Connection) -> i64 {
    accounts::create(
        conn,
        &NewAccount {
            currency: "USD".into(),
            name: "Wallet".into(),
            initial_balance: Money::new(dec!(100.00)),
        },
    )
    .unwrap()
    .id
}

fn draft(kind: &str, value: Money, categories: Vec<i64>) -> TransactionDraft {
    TransactionDraft {
        description: "test".into(),
        value,
        kind: kind.into(),
        categories,
    }
}

#[test]
fn balance_follows_transactions() {
    let mut conn = setup();
    let id = wallet(&conn);
    let food = categories::create(&conn, &NewCategory { name: "Food".into() }).unwrap();

    let acc = accounts::get(&conn, id, None).unwrap();
    assert_eq!(acc.balance, Money::new(dec!(100.00)));

    transactions::create(&mut conn, id, &draft("INCOME", Money::new(dec!(0.99)), vec![food.id]))
        .unwrap();
    assert_eq!(
        accounts::get(&conn, id, None).unwrap().balance,
        Money::new(dec!(100.99))
    );

    transactions::create(&mut conn, id, &draft("EXPENSE", Money::new(dec!(1.00)), vec![food.id]))
        .unwrap();
    let acc = accounts::get(&conn, id, None).unwrap();
    assert_eq!(acc.balance, Money::new(dec!(99.99)));
    assert_eq!(acc.initial_balance, Money::new(dec!(100.00)));
}

#[test]
fn balance_converts_through_latest_rate() {
    let mut conn = setup();
    let id = wallet(&conn);
    let food = categories::create(&conn, &NewCategory { name: "Food".into() }).unwrap();
    transactions::create(&mut conn, id, &draft("EXPENSE", Money::new(dec!(0.01)), vec![food.id]))
        .unwrap();

    let acc = accounts::get(&conn, id, Some("BRL")).unwrap();
    assert_eq!(acc.initial_balance, Money::new(dec!(380.00)));
    // 99.99 * 3.80 = 379.962, truncated
    assert_eq!(acc.balance, Money::new(dec!(379.96)));
    assert_eq!(acc.currency.name, "USD");

    // native or empty targets are not converted
    for target in [None, Some(""), Some("USD")] {
        let acc = accounts::get(&conn, id, target).unwrap();
        assert_eq!(acc.balance, Money::new(dec!(99.99)));
    }
}

#[test]
fn repeated_reads_are_stable() {
    let conn = setup();
    let id = wallet(&conn);
    let first = accounts::get(&conn, id, Some("BRL")).unwrap();
    let second = accounts::get(&conn, id, Some("BRL")).unwrap();
    assert_eq!(first.balance, second.balance);
    assert_eq!(first.initial_balance, second.initial_balance);

    let listed = accounts::list(&conn, Some("BRL")).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].balance, first.balance);
}

#[test]
fn missing_rate_is_a_dependency_failure() {
    let conn = setup();
    let id = wallet(&conn);
    let err = accounts::get(&conn, id, Some("JPY")).unwrap_err();
    assert!(matches!(err, LedgerError::DependencyFailed(_)));
    assert_eq!(err.to_string(), "rate 'JPY' not found for currency 'USD'");
}

#[test]
fn create_requires_known_currency() {
    let conn = setup();
    let err = accounts::create(
        &conn,
        &NewAccount {
            currency: "XYZ".into(),
            name: "Ghost".into(),
            initial_balance: Money::new(dec!(1)),
        },
    )
    .unwrap_err();
    assert!(matches!(err, LedgerError::DependencyFailed(_)));
    assert!(accounts::list(&conn, None).unwrap().is_empty());
}

#[test]
fn create_validates_before_writing() {
    let conn = setup();
    let err = accounts::create(
        &conn,
        &NewAccount {
            currency: "USD".into(),
            name: "".into(),
            initial_balance: Money::new(dec!(10.999)),
        },
    )
    .unwrap_err();
    match err {
        LedgerError::Validation { field, message } => {
            assert_eq!(field, "initial_balance");
            assert!(message.contains("1.99"));
        }
        other => panic!("unexpected error {:?}", other),
    }
    assert!(accounts::list(&conn, None).unwrap().is_empty());
}

#[test]
fn rename_keeps_currency() {
    let mut conn = setup();
    currencies::create(&mut conn, "BRL", "R$", &[]).unwrap();
    let id = wallet(&conn);

    let acc = accounts::update(
        &mut conn,
        id,
        &AccountPatch {
            name: "Checking".into(),
            currency: Some("USD".into()),
        },
    )
    .unwrap();
    assert_eq!(acc.name, "Checking");
    assert!(acc.updated_at >= acc.created_at);

    let err = accounts::update(
        &mut conn,
        id,
        &AccountPatch {
            name: "Checking".into(),
            currency: Some("BRL".into()),
        },
    )
    .unwrap_err();
    assert!(matches!(err, LedgerError::Validation { field: "currency.name", .. }));
    assert_eq!(accounts::get(&conn, id, None).unwrap().currency.name, "USD");

    let missing = accounts::update(&mut conn, 999, &AccountPatch {
        name: "X".into(),
        currency: None,
    })
    .unwrap_err();
    assert!(matches!(missing, LedgerError::NotFound { entity: "account", .. }));
}

#[test]
fn delete_refused_while_transactions_exist() {
    let mut conn = setup();
    let id = wallet(&conn);
    let food = categories::create(&conn, &NewCategory { name: "Food".into() }).unwrap();
    let t = transactions::create(&mut conn, id, &draft("EXPENSE", Money::new(dec!(5)), vec![food.id]))
        .unwrap();

    let err = accounts::delete(&mut conn, id).unwrap_err();
    assert!(matches!(err, LedgerError::Conflict(_)));
    assert_eq!(err.status_code(), 409);

    transactions::delete(&conn, id, t.id).unwrap();
    accounts::delete(&mut conn, id).unwrap();
    assert!(matches!(
        accounts::get(&conn, id, None).unwrap_err(),
        LedgerError::NotFound { .. }
    ));
}

#[test]
fn zero_rate_is_not_a_conversion() {
    let mut conn = setup();
    currencies::create(&mut conn, "JPY", "¥", &[Rate::new("USD", "$", dec!(0.00))]).unwrap();
    let acc = accounts::create(
        &conn,
        &NewAccount {
            currency: "JPY".into(),
            name: "Yen".into(),
            initial_balance: Money::new(dec!(100000)),
        },
    )
    .unwrap();
    let err = accounts::get(&conn, acc.id, Some("USD")).unwrap_err();
    assert!(matches!(err, LedgerError::DependencyFailed(_)));
    assert_eq!(err.to_string(), "rate 'USD' not found for currency 'JPY'");
    assert_eq!(
        accounts::get(&conn, acc.id, None).unwrap().balance,
        Money::new(dec!(100000))
    );
}

#[test]
fn out_of_range_balance_is_an_error() {
    let mut conn = setup();
    let food = categories::create(&conn, &NewCategory { name: "Food".into() }).unwrap();
    let acc = accounts::create(
        &conn,
        &NewAccount {
            currency: "USD".into(),
            name: "Huge".into(),
            initial_balance: Money::new(rust_decimal::Decimal::MAX),
        },
    )
    .unwrap();
    transactions::create(&mut conn, acc.id, &draft("INCOME", Money::new(dec!(1)), vec![food.id]))
        .unwrap();

    let err = accounts::get(&conn, acc.id, None).unwrap_err();
    assert!(matches!(err, LedgerError::Overflow(_)));
    assert_eq!(err.status_code(), 500);
    assert!(accounts::list(&conn, None).is_err());
}
