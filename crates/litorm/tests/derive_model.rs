//! `#[derive(Model)]` output, checked without a database.

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use litorm::{FieldKind, Generator, Model, Value, values};

#[derive(Debug, Model)]
struct Account {
    #[orm(key, column = "account_id")]
    id: i64,
    #[orm(uuid)]
    public_id: String,
    #[orm(column = "display_name")]
    name: String,
    balance: f64,
    active: bool,
    nickname: Option<String>,
    created_at: DateTime<Utc>,
    #[orm(skip)]
    cached_tags: Vec<String>,
}

#[derive(Debug, Model)]
struct Event {
    id: i64,
    kind: String,
}

#[test]
fn descriptor_lists_mapped_columns_in_declaration_order() {
    let descriptor = Account::descriptor();
    assert_eq!(descriptor.name, "Account");
    assert_eq!(
        descriptor.column_names(),
        vec![
            "account_id",
            "public_id",
            "display_name",
            "balance",
            "active",
            "nickname",
            "created_at"
        ]
    );
}

#[test]
fn descriptor_metadata() {
    let descriptor = Account::descriptor();
    assert_eq!(descriptor.primary_key(), Some("account_id"));
    assert_eq!(
        descriptor.generated_fields(),
        vec![("public_id", Generator::UuidV4)]
    );

    let name = descriptor.field("display_name").unwrap();
    assert_eq!(name.name, "name");
    assert_eq!(name.kind, FieldKind::Str);
    assert_eq!(descriptor.field("balance").unwrap().kind, FieldKind::Float);
    assert_eq!(descriptor.field("nickname").unwrap().kind, FieldKind::Str);
    assert_eq!(
        descriptor.field("created_at").unwrap().kind,
        FieldKind::Timestamp
    );
    assert!(descriptor.field("cached_tags").is_none());
}

#[test]
fn key_falls_back_to_id() {
    assert_eq!(Event::descriptor().primary_key(), None);
    assert_eq!(Event::descriptor().key_or_id(), "id");
}

#[test]
fn from_row_coerces_loosely() {
    let row = values! {
        "account_id" => "17",
        "public_id" => "abc",
        "display_name" => "Ann",
        "balance" => 12,
        "active" => true,
        "nickname" => None::<String>,
        "created_at" => "2023-11-14T22:13:20Z",
        "cached_tags" => "ignored",
    };
    let account = Account::from_row(&row);

    assert_eq!(account.id, 17);
    assert_eq!(account.public_id, "abc");
    assert_eq!(account.name, "Ann");
    assert_eq!(account.balance, 12.0);
    assert!(account.active);
    assert_eq!(account.nickname, None);
    assert_eq!(
        account.created_at,
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    );
    assert!(account.cached_tags.is_empty());
}

#[test]
fn from_row_leaves_missing_and_mistyped_fields_at_default() {
    let row = values! {
        "account_id" => Value::Null,
        "active" => "yes",
        "created_at" => "not a time",
    };
    let account = Account::from_row(&row);

    assert_eq!(account.id, 0);
    assert_eq!(account.name, "");
    assert!(!account.active);
    assert_eq!(account.created_at, DateTime::<Utc>::default());
}
