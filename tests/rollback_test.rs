//! Integration tests for explicit-transaction write semantics.
//!
//! Requires a running MySQL database; see crud_test.rs for the
//! TEST_MYSQL_CONFIG format.

use minorm::{Database, DbConfig, OrmError, Value};

async fn connect() -> Option<Database> {
    let raw = match std::env::var("TEST_MYSQL_CONFIG") {
        Ok(raw) => raw,
        Err(_) => {
            eprintln!("Skipping test: TEST_MYSQL_CONFIG not set");
            return None;
        }
    };
    let config: DbConfig = serde_json::from_str(&raw).expect("TEST_MYSQL_CONFIG is valid JSON");
    Some(Database::connect(&config).await.expect("connect"))
}

async fn setup_table(db: &Database) {
    db.execute(
        "create table if not exists `minorm_tx_test` (\
         `id` bigint primary key, \
         `name` varchar(100))",
        &[],
        true,
    )
    .await
    .expect("create table");

    db.execute("delete from `minorm_tx_test`", &[], true)
        .await
        .expect("clear table");
}

async fn row_count(db: &Database) -> i64 {
    let rows = db
        .query("select count(*) as n from `minorm_tx_test`", &[], None)
        .await
        .expect("count");
    rows[0].get("n").and_then(Value::as_int).expect("count value")
}

#[tokio::test]
async fn test_failed_write_rolls_back() {
    let Some(db) = connect().await else { return };
    setup_table(&db).await;

    db.execute(
        "insert into `minorm_tx_test` (`id`, `name`) values (?, ?)",
        &[Value::Int(1), Value::from("first")],
        true,
    )
    .await
    .expect("seed row");

    // Duplicate primary key inside an explicit transaction
    let result = db
        .execute(
            "insert into `minorm_tx_test` (`id`, `name`) values (?, ?)",
            &[Value::Int(1), Value::from("dup")],
            false,
        )
        .await;
    assert!(matches!(result, Err(OrmError::Database { .. })));

    // The failure left the table unchanged
    assert_eq!(row_count(&db).await, 1);

    db.close().await;
}

#[tokio::test]
async fn test_successful_write_commits() {
    let Some(db) = connect().await else { return };
    setup_table(&db).await;

    let affected = db
        .execute(
            "insert into `minorm_tx_test` (`id`, `name`) values (?, ?)",
            &[Value::Int(2), Value::from("committed")],
            false,
        )
        .await
        .expect("insert in transaction");
    assert_eq!(affected, 1);

    assert_eq!(row_count(&db).await, 1);

    db.close().await;
}

#[tokio::test]
async fn test_argument_count_mismatch_is_rejected() {
    let Some(db) = connect().await else { return };
    setup_table(&db).await;

    let result = db
        .execute(
            "insert into `minorm_tx_test` (`id`, `name`) values (?, ?)",
            &[Value::Int(3)],
            true,
        )
        .await;
    assert!(matches!(result, Err(OrmError::InvalidInput { .. })));

    db.close().await;
}
