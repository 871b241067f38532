use axum::extract::State;
use axum::Json;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, PaginatorTrait, Set};
use serde_json::json;

use packout::api::sync;
use packout::db;
use packout::domain::errors::ApiError;
use packout::models::{bag, event, event_bag, item};

async fn setup_test_db() -> DatabaseConnection {
    db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB")
}

fn sample_dataset() -> serde_json::Value {
    json!({
        "items": [
            {
                "id": "pen",
                "name": "Pen",
                "purchaseDate": "2024-01-15",
                "price": 25.5,
                "status": "in-bag",
                "bagId": "kit_a",
            },
            {
                "id": "cable",
                "name": "HDMI Cable",
                "purchaseDate": "2024-02-02",
                "price": 250.0,
            },
        ],
        "bags": [
            { "id": "kit_a", "name": "Kit A", "responsible": "Alice" },
        ],
        "events": [
            {
                "id": "wedding",
                "name": "Wedding",
                "date": "2024-06-01",
                "time": "14:00",
                "location": "Riverside Hall",
                "customer": "Smith family",
                "responsible": "Carol",
                "status": "active",
                "bagIds": ["kit_a"],
            },
        ],
    })
}

async fn import_dataset(db: &DatabaseConnection, data: serde_json::Value) -> serde_json::Value {
    let payload: sync::SyncPayload = serde_json::from_value(data).expect("valid payload");
    let Json(body) = sync::import(State(db.clone()), Json(payload))
        .await
        .expect("import");
    body
}

#[tokio::test]
async fn import_is_idempotent() {
    let db = setup_test_db().await;

    let first = import_dataset(&db, sample_dataset()).await;
    assert_eq!(first["imported"]["items"], 2);
    assert_eq!(first["imported"]["bags"], 1);
    assert_eq!(first["imported"]["events"], 1);

    // Importing the same dataset again inserts nothing and errors on
    // nothing
    let second = import_dataset(&db, sample_dataset()).await;
    assert_eq!(second["imported"]["items"], 0);
    assert_eq!(second["imported"]["bags"], 0);
    assert_eq!(second["imported"]["events"], 0);

    assert_eq!(item::Entity::find().count(&db).await.unwrap(), 2);
    assert_eq!(bag::Entity::find().count(&db).await.unwrap(), 1);
    assert_eq!(event::Entity::find().count(&db).await.unwrap(), 1);
    assert_eq!(event_bag::Entity::find().count(&db).await.unwrap(), 1);
}

#[tokio::test]
async fn dump_uses_display_names_and_nests_bag_ids() {
    let db = setup_test_db().await;
    import_dataset(&db, sample_dataset()).await;

    let Json(dump) = sync::dump(State(db.clone())).await.expect("dump");

    let items = dump["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    let pen = items.iter().find(|i| i["id"] == "pen").unwrap();
    assert_eq!(pen["purchaseDate"], "2024-01-15");
    assert_eq!(pen["bagId"], "kit_a");
    assert!(pen.get("purchase_date").is_none());

    let bags = dump["bags"].as_array().unwrap();
    assert_eq!(bags[0]["item_count"], 1);

    let events = dump["events"].as_array().unwrap();
    assert_eq!(events[0]["bagIds"], json!(["kit_a"]));
    assert_eq!(events[0]["bag_count"], 1);

    assert!(dump["timestamp"].is_string());
}

#[tokio::test]
async fn clear_wipes_everything() {
    let db = setup_test_db().await;
    import_dataset(&db, sample_dataset()).await;

    sync::clear(State(db.clone())).await.expect("clear");

    assert_eq!(item::Entity::find().count(&db).await.unwrap(), 0);
    assert_eq!(bag::Entity::find().count(&db).await.unwrap(), 0);
    assert_eq!(event::Entity::find().count(&db).await.unwrap(), 0);
    assert_eq!(event_bag::Entity::find().count(&db).await.unwrap(), 0);
}

#[tokio::test]
async fn restore_replaces_current_state() {
    let db = setup_test_db().await;
    import_dataset(&db, sample_dataset()).await;

    // A leftover row that is not part of the backup
    item::ActiveModel {
        id: Set("stale".to_string()),
        name: Set("Stale item".to_string()),
        purchase_date: Set("2023-01-01".to_string()),
        price: Set(1.0),
        receipt_photo: Set(None),
        item_photo: Set(None),
        status: Set("available".to_string()),
        bag_id: Set(None),
        created_at: Set("2023-01-01 00:00:00".to_string()),
        updated_at: Set("2023-01-01 00:00:00".to_string()),
    }
    .insert(&db)
    .await
    .expect("insert stale row");

    let backup = json!({
        "items": [
            {
                "id": "projector",
                "name": "Projector",
                "purchaseDate": "2024-02-02",
                "price": 12500.0,
            },
        ],
        "bags": [],
        "events": [],
    });

    sync::restore(State(db.clone()), Json(backup))
        .await
        .expect("restore");

    let remaining = item::Entity::find().all(&db).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, "projector");
    assert_eq!(bag::Entity::find().count(&db).await.unwrap(), 0);
    assert_eq!(event::Entity::find().count(&db).await.unwrap(), 0);
}

#[tokio::test]
async fn restore_rejects_malformed_backups() {
    let db = setup_test_db().await;

    let err = sync::restore(State(db.clone()), Json(json!({ "items": [] })))
        .await
        .expect_err("restore must fail");
    assert!(matches!(err, ApiError::Validation(_)));
}

#[tokio::test]
async fn backup_wraps_the_dump() {
    let db = setup_test_db().await;
    import_dataset(&db, sample_dataset()).await;

    let Json(body) = sync::backup(State(db.clone())).await.expect("backup");
    assert_eq!(body["success"], true);
    assert_eq!(body["backup"]["items"].as_array().unwrap().len(), 2);
    assert_eq!(body["backup"]["backup_info"]["type"], "automatic_backup");
}

#[tokio::test]
async fn exported_backup_restores_cleanly() {
    let db = setup_test_db().await;
    import_dataset(&db, sample_dataset()).await;

    let Json(backup) = sync::backup(State(db.clone())).await.expect("backup");
    let snapshot = backup["backup"].clone();

    sync::clear(State(db.clone())).await.expect("clear");
    sync::restore(State(db.clone()), Json(snapshot))
        .await
        .expect("restore");

    assert_eq!(item::Entity::find().count(&db).await.unwrap(), 2);
    assert_eq!(bag::Entity::find().count(&db).await.unwrap(), 1);
    assert_eq!(event::Entity::find().count(&db).await.unwrap(), 1);
    assert_eq!(event_bag::Entity::find().count(&db).await.unwrap(), 1);
}
