//! Synchronization layer: full dump, idempotent import, download-style
//! export, backup and authoritative restore, full wipe.

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use sea_orm::*;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::views::{bag_view, event_view, item_view};
use crate::domain::errors::ApiError;
use crate::models::{bag, event, event_bag, item};
use crate::services::audit;
use crate::utils::now_stamp;

/// One row of each entity type as it appears in dumps and backups.
/// Accepts both display and storage field names so our own exports
/// import cleanly.
#[derive(Deserialize)]
pub struct ItemRow {
    pub id: String,
    pub name: String,
    #[serde(rename = "purchaseDate", alias = "purchase_date")]
    pub purchase_date: String,
    pub price: f64,
    #[serde(rename = "receiptPhoto", alias = "receipt_photo", default)]
    pub receipt_photo: Option<String>,
    #[serde(rename = "itemPhoto", alias = "item_photo", default)]
    pub item_photo: Option<String>,
    #[serde(default = "default_available")]
    pub status: String,
    #[serde(rename = "bagId", alias = "bag_id", default)]
    pub bag_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Deserialize)]
pub struct BagRow {
    pub id: String,
    pub name: String,
    pub responsible: String,
    #[serde(default = "default_available")]
    pub status: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Deserialize)]
pub struct EventRow {
    pub id: String,
    pub name: String,
    pub date: String,
    pub time: String,
    pub location: String,
    pub customer: String,
    pub responsible: String,
    #[serde(default = "default_active")]
    pub status: String,
    #[serde(rename = "bagIds", alias = "bag_ids", default)]
    pub bag_ids: Vec<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

fn default_available() -> String {
    "available".to_string()
}

fn default_active() -> String {
    "active".to_string()
}

#[derive(Deserialize, Default)]
pub struct SyncPayload {
    #[serde(default)]
    pub items: Vec<ItemRow>,
    #[serde(default)]
    pub bags: Vec<BagRow>,
    #[serde(default)]
    pub events: Vec<EventRow>,
}

fn item_row_model(row: ItemRow, now: &str) -> item::ActiveModel {
    item::ActiveModel {
        id: Set(row.id),
        name: Set(row.name),
        purchase_date: Set(row.purchase_date),
        price: Set(row.price),
        receipt_photo: Set(row.receipt_photo),
        item_photo: Set(row.item_photo),
        status: Set(row.status),
        bag_id: Set(row.bag_id),
        created_at: Set(row.created_at.unwrap_or_else(|| now.to_string())),
        updated_at: Set(row.updated_at.unwrap_or_else(|| now.to_string())),
    }
}

fn bag_row_model(row: BagRow, now: &str) -> bag::ActiveModel {
    bag::ActiveModel {
        id: Set(row.id),
        name: Set(row.name),
        responsible: Set(row.responsible),
        status: Set(row.status),
        created_at: Set(row.created_at.unwrap_or_else(|| now.to_string())),
        updated_at: Set(row.updated_at.unwrap_or_else(|| now.to_string())),
    }
}

fn event_row_model(row: &EventRow, now: &str) -> event::ActiveModel {
    event::ActiveModel {
        id: Set(row.id.clone()),
        name: Set(row.name.clone()),
        date: Set(row.date.clone()),
        time: Set(row.time.clone()),
        location: Set(row.location.clone()),
        customer: Set(row.customer.clone()),
        responsible: Set(row.responsible.clone()),
        status: Set(row.status.clone()),
        created_at: Set(row.created_at.clone().unwrap_or_else(|| now.to_string())),
        updated_at: Set(row.updated_at.clone().unwrap_or_else(|| now.to_string())),
    }
}

/// Everything the store holds, in display-name convention.
async fn collect_dump(db: &DatabaseConnection) -> Result<Value, ApiError> {
    let items = item::Entity::find()
        .order_by_desc(item::Column::CreatedAt)
        .all(db)
        .await?;

    let bags = bag::Entity::find()
        .order_by_desc(bag::Column::CreatedAt)
        .all(db)
        .await?;

    let mut bag_views = Vec::with_capacity(bags.len());
    for b in &bags {
        let count = item::Entity::find()
            .filter(item::Column::BagId.eq(&b.id))
            .count(db)
            .await?;
        bag_views.push(bag_view(b, count));
    }

    let events = event::Entity::find()
        .order_by_desc(event::Column::Date)
        .order_by_desc(event::Column::Time)
        .all(db)
        .await?;

    let mut event_views = Vec::with_capacity(events.len());
    for e in &events {
        let bag_ids: Vec<String> = event_bag::Entity::find()
            .filter(event_bag::Column::EventId.eq(&e.id))
            .all(db)
            .await?
            .into_iter()
            .map(|link| link.bag_id)
            .collect();

        let mut view = event_view(e, bag_ids.len() as u64);
        view["bagIds"] = json!(bag_ids);
        event_views.push(view);
    }

    Ok(json!({
        "items": items.iter().map(item_view).collect::<Vec<_>>(),
        "bags": bag_views,
        "events": event_views,
        "timestamp": now_stamp(),
    }))
}

async fn wipe_all(txn: &DatabaseTransaction) -> Result<(), ApiError> {
    // Dependency order: membership rows before their parents
    event_bag::Entity::delete_many().exec(txn).await?;
    event::Entity::delete_many().exec(txn).await?;
    item::Entity::delete_many().exec(txn).await?;
    bag::Entity::delete_many().exec(txn).await?;
    Ok(())
}

pub async fn dump(State(db): State<DatabaseConnection>) -> Result<Json<Value>, ApiError> {
    Ok(Json(collect_dump(&db).await?))
}

/// Idempotent bulk import: rows whose id already exists are skipped,
/// the response reports how many rows were actually inserted.
pub async fn import(
    State(db): State<DatabaseConnection>,
    Json(payload): Json<SyncPayload>,
) -> Result<Json<Value>, ApiError> {
    let now = now_stamp();
    let txn = db.begin().await?;

    let mut items_count = 0;
    let mut bags_count = 0;
    let mut events_count = 0;

    for row in payload.bags {
        if bag::Entity::find_by_id(&row.id).one(&txn).await?.is_none() {
            bag_row_model(row, &now).insert(&txn).await?;
            bags_count += 1;
        }
    }

    for row in payload.items {
        if item::Entity::find_by_id(&row.id).one(&txn).await?.is_none() {
            item_row_model(row, &now).insert(&txn).await?;
            items_count += 1;
        }
    }

    for row in &payload.events {
        if event::Entity::find_by_id(&row.id)
            .one(&txn)
            .await?
            .is_none()
        {
            event_row_model(row, &now).insert(&txn).await?;
            events_count += 1;

            // Membership only follows a freshly inserted event
            for bag_id in &row.bag_ids {
                event_bag::Entity::insert(event_bag::ActiveModel {
                    event_id: Set(row.id.clone()),
                    bag_id: Set(bag_id.clone()),
                })
                .exec(&txn)
                .await?;
            }
        }
    }

    txn.commit().await?;

    audit::record(
        &db,
        "import",
        "sync",
        None,
        None,
        Some(json!({
            "items": items_count,
            "bags": bags_count,
            "events": events_count,
        })),
    )
    .await;

    Ok(Json(json!({
        "success": true,
        "imported": {
            "items": items_count,
            "bags": bags_count,
            "events": events_count,
        },
        "message": "Data imported successfully"
    })))
}

/// Download-style export with attachment headers, like a backup file.
pub async fn export(State(db): State<DatabaseConnection>) -> Result<impl IntoResponse, ApiError> {
    let dump = collect_dump(&db).await?;

    let mut body = json!({
        "export_info": {
            "timestamp": now_stamp(),
            "version": "1.0",
            "source": "packout",
        }
    });
    for (key, value) in dump.as_object().cloned().unwrap_or_default() {
        body[key] = value;
    }

    let filename = format!(
        "packout_backup_{}.json",
        chrono::Utc::now().format("%Y-%m-%d_%H-%M-%S")
    );

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        "application/json"
            .parse()
            .map_err(|_| ApiError::Database("invalid header".to_string()))?,
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        format!("attachment; filename=\"{}\"", filename)
            .parse()
            .map_err(|_| ApiError::Database("invalid header".to_string()))?,
    );

    Ok((StatusCode::OK, headers, Json(body)))
}

pub async fn backup(State(db): State<DatabaseConnection>) -> Result<Json<Value>, ApiError> {
    let mut backup = collect_dump(&db).await?;
    backup["backup_info"] = json!({
        "timestamp": now_stamp(),
        "type": "automatic_backup",
    });

    Ok(Json(json!({
        "success": true,
        "backup": backup,
        "message": "Backup created successfully"
    })))
}

/// Restore from a backup: wipe, then insert the backup verbatim. The
/// backup is authoritative; this is deliberately not idempotent with
/// respect to prior state.
pub async fn restore(
    State(db): State<DatabaseConnection>,
    Json(raw): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let shape_ok = raw.get("items").map_or(false, Value::is_array)
        && raw.get("bags").map_or(false, Value::is_array)
        && raw.get("events").map_or(false, Value::is_array);
    if !shape_ok {
        return Err(ApiError::Validation(
            "Invalid backup data structure".to_string(),
        ));
    }

    let payload: SyncPayload = serde_json::from_value(raw)
        .map_err(|e| ApiError::Validation(format!("Invalid backup data: {}", e)))?;

    let now = now_stamp();
    let txn = db.begin().await?;

    wipe_all(&txn).await?;

    for row in payload.bags {
        bag_row_model(row, &now).insert(&txn).await?;
    }
    for row in payload.items {
        item_row_model(row, &now).insert(&txn).await?;
    }
    for row in &payload.events {
        event_row_model(row, &now).insert(&txn).await?;
        for bag_id in &row.bag_ids {
            event_bag::Entity::insert(event_bag::ActiveModel {
                event_id: Set(row.id.clone()),
                bag_id: Set(bag_id.clone()),
            })
            .exec(&txn)
            .await?;
        }
    }

    txn.commit().await?;

    audit::record(&db, "restore", "sync", None, None, None).await;

    Ok(Json(json!({
        "success": true,
        "message": "Data restored successfully"
    })))
}

pub async fn clear(State(db): State<DatabaseConnection>) -> Result<Json<Value>, ApiError> {
    let txn = db.begin().await?;
    wipe_all(&txn).await?;
    txn.commit().await?;

    audit::record(&db, "clear", "sync", None, None, None).await;

    Ok(Json(json!({
        "success": true,
        "message": "All data cleared successfully"
    })))
}
