use super::*;
use crate::values;

fn no_fields() -> Vec<String> {
    Vec::new()
}

#[test]
fn test_select_by_id() {
    let mut qb = Builder::postgres();
    qb.select(no_fields()).from("users").filter(values! { "id" => 5 });
    assert_eq!(qb.build(), "SELECT t.* FROM users as t WHERE t.id=5");
}

#[test]
fn test_select_fields_are_qualified() {
    let mut qb = Builder::postgres();
    qb.select(["id", "name"]).from("users");
    assert_eq!(qb.build(), "SELECT t.id, t.name FROM users as t");
}

#[test]
fn test_build_is_idempotent() {
    let mut qb = Builder::postgres();
    qb.select(no_fields())
        .from("users")
        .join(Join::left("statuses", "id", "status_id").fields(["title"]))
        .filter(values! { "id" => 5 });
    let first = qb.build();
    assert_eq!(first, qb.build());
}

#[test]
fn test_no_query_type_renders_nothing() {
    let mut qb = Builder::postgres();
    qb.from("users");
    assert_eq!(qb.build(), "");
}

#[test]
fn test_where_operators() {
    let mut qb = Builder::postgres();
    qb.select(no_fields())
        .from("users")
        .filter(values! { "age>" => 18, "score<=" => 2.5, "name" => "bob" });
    assert_eq!(
        qb.build(),
        "SELECT t.* FROM users as t WHERE t.age>18 AND t.name='bob' AND t.score<=2.50000000"
    );
}

#[test]
fn test_where_in_lists() {
    let mut qb = Builder::postgres();
    qb.select(no_fields()).from("users").filter(values! {
        "id" => vec![1i64, 2, 3],
        "role" => vec!["admin", "owner"],
        "weight" => vec![0.5f64, 1.0],
    });
    assert_eq!(
        qb.build(),
        "SELECT t.* FROM users as t WHERE t.id IN (1,2,3) AND t.role IN ('admin','owner') \
         AND t.weight IN (0.50000000,1.00000000)"
    );
}

#[test]
fn test_where_empty_list_matches_nothing() {
    let mut qb = Builder::postgres();
    qb.select(no_fields())
        .from("users")
        .filter(values! { "id" => Vec::<i64>::new() });
    assert_eq!(qb.build(), "SELECT t.* FROM users as t WHERE 1=0");
}

#[test]
fn test_where_null_uses_is_null() {
    let mut qb = Builder::postgres();
    qb.select(no_fields())
        .from("users")
        .filter(values! { "deleted_at" => None::<i64> });
    assert_eq!(qb.build(), "SELECT t.* FROM users as t WHERE t.deleted_at IS NULL");
}

#[test]
fn test_join_alias() {
    let mut qb = Builder::postgres();
    qb.select(no_fields())
        .from("users")
        .join(Join::left("statuses", "id", "status_id"));
    assert_eq!(
        qb.build(),
        "SELECT t.* FROM users as t LEFT JOIN statuses AS t1 ON t1.id = t.status_id"
    );
}

#[test]
fn test_join_aliases_increase_in_registration_order() {
    let mut qb = Builder::postgres();
    qb.select(["id"])
        .from("orders")
        .join(Join::inner("users", "id", "user_id").fields(["name"]))
        .join(Join::right("items", "order_id", "id").fields(["sku", "qty"]))
        .join(Join::left("users", "id", "approver_id"));
    let sql = qb.build();
    assert_eq!(
        sql,
        "SELECT t.id, t1.name, t2.sku, t2.qty FROM orders as t \
         INNER JOIN users AS t1 ON t1.id = t.user_id \
         RIGHT JOIN items AS t2 ON t2.order_id = t.id \
         LEFT JOIN users AS t3 ON t3.id = t.approver_id"
    );
}

#[test]
fn test_join_multi_condition() {
    let mut qb = Builder::postgres();
    qb.select(no_fields()).from("users").join(
        Join::left("statuses", "", "")
            .on(JoinOn::keys("status_id", "id"))
            .on(JoinOn::value("statuses", "kind", "user")),
    );
    assert_eq!(
        qb.build(),
        "SELECT t.* FROM users as t LEFT JOIN statuses AS t1 ON t.status_id=t1.id AND t1.kind= 'user'"
    );
}

#[test]
fn test_order_and_limit() {
    let mut qb = Builder::postgres();
    qb.select(no_fields())
        .from("users")
        .order(OrderParam::asc("name"))
        .order(OrderParam::desc("t1.created_at"))
        .limit(20, 40);
    assert_eq!(
        qb.build(),
        "SELECT t.* FROM users as t ORDER BY t.name ASC,t1.created_at DESC LIMIT 20 OFFSET 40"
    );
}

#[test]
fn test_zero_limit_is_omitted() {
    let mut qb = Builder::postgres();
    qb.select(no_fields()).from("users").limit(0, 10);
    assert_eq!(qb.build(), "SELECT t.* FROM users as t");
}

#[test]
fn test_insert_sorted_columns() {
    let mut qb = Builder::postgres();
    qb.insert("users")
        .values(values! { "name" => "a", "email" => "a@b.com", "age" => 30 })
        .return_id("id");
    assert_eq!(
        qb.build(),
        "INSERT INTO users (age,email,name) VALUES (30,'a@b.com','a') RETURNING id"
    );
}

#[test]
fn test_update_postgres() {
    let mut qb = Builder::postgres();
    qb.update("users")
        .set(values! { "name" => "b" })
        .filter(values! { "id" => 5 })
        .limit(1, 0);
    let sql = qb.build();
    assert_eq!(sql, "UPDATE users as t SET name = 'b' WHERE t.id=5");
    assert!(sql.contains("SET name = 'b'"));
    assert!(sql.contains("WHERE t.id=5"));
}

#[test]
fn test_update_without_where_has_no_set() {
    let mut qb = Builder::postgres();
    qb.update("users").set(values! { "name" => "b" });
    assert_eq!(qb.build(), "UPDATE users as t");
}

#[test]
fn test_delete_postgres() {
    let mut qb = Builder::postgres();
    qb.delete().from("users").filter(values! { "id" => 5 }).limit(1, 0);
    assert_eq!(qb.build(), "DELETE FROM users as t WHERE t.id=5");
}

#[test]
fn test_upsert_update_on_fields() {
    let mut qb = Builder::postgres();
    qb.save("users")
        .values(values! { "email" => "a@b.com" })
        .on_conflict_fields(["email"])
        .on_conflict_action("update");
    let sql = qb.build();
    assert_eq!(
        sql,
        "INSERT INTO users (email) VALUES ('a@b.com') ON CONFLICT (email) DO UPDATE SET email = 'a@b.com' RETURNING *"
    );
    assert!(sql.contains("ON CONFLICT (email) DO UPDATE SET email = 'a@b.com' RETURNING *"));
}

#[test]
fn test_upsert_constraint_wins_over_fields() {
    let mut qb = Builder::postgres();
    qb.save("users")
        .values(values! { "email" => "a@b.com" })
        .on_conflict_fields(["email"])
        .on_conflict_constraint("users_email_key")
        .on_conflict_action("NOTHING")
        .return_id("id");
    assert_eq!(
        qb.build(),
        "INSERT INTO users (email) VALUES ('a@b.com') ON CONFLICT ON CONSTRAINT users_email_key DO NOTHING RETURNING id"
    );
}

#[test]
fn test_upsert_requires_action_and_target() {
    let mut no_action = Builder::postgres();
    no_action
        .save("users")
        .values(values! { "email" => "a@b.com" })
        .on_conflict_fields(["email"]);
    assert_eq!(no_action.build(), "INSERT INTO users (email) VALUES ('a@b.com')");

    let mut no_target = Builder::postgres();
    no_target
        .save("users")
        .values(values! { "email" => "a@b.com" })
        .on_conflict_action("update");
    assert_eq!(no_target.build(), "INSERT INTO users (email) VALUES ('a@b.com')");

    let mut bad_action = Builder::postgres();
    bad_action
        .save("users")
        .values(values! { "email" => "a@b.com" })
        .on_conflict_fields(["email"])
        .on_conflict_action("replace");
    assert!(!bad_action.build().contains("ON CONFLICT"));
}

// ==================== MySQL ====================

#[test]
fn test_mysql_select_matches_postgres() {
    let mut pg = Builder::postgres();
    let mut my = Builder::mysql();
    for qb in [&mut pg, &mut my] {
        qb.select(["id"])
            .from("users")
            .join(Join::left("statuses", "id", "status_id"))
            .filter(values! { "id" => 5 })
            .limit(10, 0);
    }
    assert_eq!(pg.build(), my.build());
}

#[test]
fn test_mysql_update_is_unaliased() {
    let mut qb = Builder::mysql();
    qb.update("users")
        .set(values! { "name" => "b" })
        .filter(values! { "id" => 5 })
        .limit(1, 0);
    assert_eq!(qb.build(), "UPDATE users SET `name` = 'b' WHERE id=5 LIMIT 1");
}

#[test]
fn test_mysql_delete_is_unaliased() {
    let mut qb = Builder::mysql();
    qb.delete().from("users").filter(values! { "id" => vec![1i64, 2] });
    assert_eq!(qb.build(), "DELETE FROM users WHERE id IN (1,2)");
}

#[test]
fn test_mysql_insert_quotes_columns_without_returning() {
    let mut qb = Builder::mysql();
    qb.insert("users")
        .values(values! { "name" => "a", "order" => 1 })
        .return_id("id");
    assert_eq!(qb.build(), "INSERT INTO users (`name`,`order`) VALUES ('a',1)");
}

#[test]
fn test_mysql_upsert_is_plain_insert() {
    let mut qb = Builder::mysql();
    qb.save("users")
        .values(values! { "email" => "a@b.com" })
        .on_conflict_fields(["email"])
        .on_conflict_action("update");
    assert_eq!(qb.build(), "INSERT INTO users (`email`) VALUES ('a@b.com')");
}
