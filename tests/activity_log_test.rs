use axum::extract::{Path, Query, State};
use axum::Json;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, PaginatorTrait, Set};
use serde_json::json;

use packout::api::{items, logs};
use packout::db;
use packout::models::activity_log;

async fn setup_test_db() -> DatabaseConnection {
    db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB")
}

async fn append(db: &DatabaseConnection, action: &str, table: &str) {
    logs::append_log(
        State(db.clone()),
        Json(
            serde_json::from_value(json!({
                "action": action,
                "table_name": table,
            }))
            .unwrap(),
        ),
    )
    .await
    .expect("append log");
}

async fn list(db: &DatabaseConnection, query: serde_json::Value) -> serde_json::Value {
    let Json(body) = logs::list_logs(
        State(db.clone()),
        Query(serde_json::from_value(query).unwrap()),
    )
    .await
    .expect("list logs");
    body
}

#[tokio::test]
async fn listing_paginates_and_exposes_filter_values() {
    let db = setup_test_db().await;
    for _ in 0..3 {
        append(&db, "create", "items").await;
    }
    append(&db, "delete", "bags").await;

    let body = list(&db, json!({ "limit": 2 })).await;
    assert_eq!(body["logs"].as_array().unwrap().len(), 2);
    assert_eq!(body["pagination"]["total"], 4);
    assert_eq!(body["pagination"]["total_pages"], 2);

    let actions = body["filters"]["actions"].as_array().unwrap();
    assert!(actions.contains(&json!("create")));
    assert!(actions.contains(&json!("delete")));

    let filtered = list(&db, json!({ "action": "delete" })).await;
    assert_eq!(filtered["logs"].as_array().unwrap().len(), 1);
    assert_eq!(filtered["logs"][0]["table_name"], "bags");
}

#[tokio::test]
async fn date_range_filter_bounds_the_results() {
    let db = setup_test_db().await;

    for (stamp, action) in [
        ("2024-03-01 10:00:00", "old"),
        ("2024-03-15 10:00:00", "mid"),
        ("2024-03-31 10:00:00", "new"),
    ] {
        activity_log::ActiveModel {
            action: Set(action.to_string()),
            table_name: Set("items".to_string()),
            record_id: Set(None),
            old_data: Set(None),
            new_data: Set(None),
            actor: Set(None),
            created_at: Set(stamp.to_string()),
            ..Default::default()
        }
        .insert(&db)
        .await
        .expect("insert log");
    }

    let body = list(
        &db,
        json!({ "date_from": "2024-03-10", "date_to": "2024-03-20" }),
    )
    .await;
    let entries = body["logs"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["action"], "mid");
}

#[tokio::test]
async fn purge_removes_only_old_entries() {
    let db = setup_test_db().await;

    // One ancient entry, one fresh
    activity_log::ActiveModel {
        action: Set("create".to_string()),
        table_name: Set("items".to_string()),
        record_id: Set(None),
        old_data: Set(None),
        new_data: Set(None),
        actor: Set(None),
        created_at: Set("2020-01-01 00:00:00".to_string()),
        ..Default::default()
    }
    .insert(&db)
    .await
    .expect("insert old log");
    append(&db, "create", "bags").await;

    let Json(body) = logs::purge_logs(
        State(db.clone()),
        Query(serde_json::from_value(json!({ "days": 30 })).unwrap()),
    )
    .await
    .expect("purge");
    assert_eq!(body["deleted_count"], 1);

    assert_eq!(
        activity_log::Entity::find().count(&db).await.unwrap(),
        1,
        "fresh entry must survive"
    );
}

#[tokio::test]
async fn state_changes_leave_audit_entries() {
    let db = setup_test_db().await;

    items::create_item(
        State(db.clone()),
        Json(
            serde_json::from_value(json!({
                "id": "pen",
                "name": "Pen",
                "purchaseDate": "2024-01-15",
                "price": 25.5,
            }))
            .unwrap(),
        ),
    )
    .await
    .expect("create item");

    items::delete_item(State(db.clone()), Path("pen".to_string()))
        .await
        .expect("delete item");

    let entries = activity_log::Entity::find().all(&db).await.unwrap();
    let actions: Vec<&str> = entries.iter().map(|e| e.action.as_str()).collect();
    assert!(actions.contains(&"create"));
    assert!(actions.contains(&"delete"));
    assert!(entries
        .iter()
        .all(|e| e.record_id.as_deref() == Some("pen")));
}
