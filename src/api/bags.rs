use axum::{
    extract::{Path, Query, State},
    Json,
};
use sea_orm::*;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::views::{bag_view, bag_view_with_items, item_view};
use crate::domain::errors::ApiError;
use crate::domain::status::BagStatus;
use crate::models::bag::{self, Entity as Bag, BagDto, BagUpdateDto};
use crate::models::item::{self, Entity as Item};
use crate::services::{audit, transitions};
use crate::utils::{generate_id, now_stamp};

#[derive(Deserialize)]
pub struct ListBagsQuery {
    pub status: Option<String>,
    #[serde(rename = "withItems", alias = "with_items", default)]
    pub with_items: bool,
}

async fn bag_items(db: &DatabaseConnection, bag_id: &str) -> Result<Vec<item::Model>, ApiError> {
    Ok(Item::find()
        .filter(item::Column::BagId.eq(bag_id))
        .order_by_asc(item::Column::Name)
        .all(db)
        .await?)
}

pub async fn list_bags(
    State(db): State<DatabaseConnection>,
    Query(query): Query<ListBagsQuery>,
) -> Result<Json<Value>, ApiError> {
    let mut condition = Condition::all();

    if let Some(status) = query.status {
        condition = condition.add(bag::Column::Status.eq(status));
    }

    let bags = Bag::find()
        .filter(condition)
        .order_by_desc(bag::Column::CreatedAt)
        .all(&db)
        .await?;

    let mut result = Vec::with_capacity(bags.len());
    for b in &bags {
        if query.with_items {
            let items = bag_items(&db, &b.id).await?;
            result.push(bag_view_with_items(b, &items));
        } else {
            // item_count is always derived, never stored
            let count = Item::find()
                .filter(item::Column::BagId.eq(&b.id))
                .count(&db)
                .await?;
            result.push(bag_view(b, count));
        }
    }

    Ok(Json(Value::Array(result)))
}

pub async fn get_bag(
    State(db): State<DatabaseConnection>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let bag = Bag::find_by_id(&id)
        .one(&db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Bag not found".to_string()))?;

    let items = bag_items(&db, &bag.id).await?;
    Ok(Json(bag_view_with_items(&bag, &items)))
}

pub async fn create_bag(
    State(db): State<DatabaseConnection>,
    Json(payload): Json<BagDto>,
) -> Result<Json<Value>, ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::Validation(
            "Missing required field: name".to_string(),
        ));
    }
    if payload.responsible.trim().is_empty() {
        return Err(ApiError::Validation(
            "Missing required field: responsible".to_string(),
        ));
    }

    let status = match &payload.status {
        Some(s) => BagStatus::parse(s)?,
        None => BagStatus::Available,
    };

    let id = payload.id.unwrap_or_else(generate_id);
    let now = now_stamp();

    let new_bag = bag::ActiveModel {
        id: Set(id.clone()),
        name: Set(payload.name),
        responsible: Set(payload.responsible),
        status: Set(status.as_str().to_string()),
        created_at: Set(now.clone()),
        updated_at: Set(now),
    };

    let saved = new_bag.insert(&db).await?;

    audit::record(
        &db,
        "create",
        "bags",
        Some(&saved.id),
        None,
        Some(bag_view(&saved, 0)),
    )
    .await;

    Ok(Json(json!({
        "success": true,
        "id": id,
        "message": "Bag created successfully"
    })))
}

pub async fn update_bag(
    State(db): State<DatabaseConnection>,
    Path(id): Path<String>,
    Json(payload): Json<BagUpdateDto>,
) -> Result<Json<Value>, ApiError> {
    let bag = Bag::find_by_id(&id)
        .one(&db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Bag not found".to_string()))?;

    if payload.name.is_none() && payload.responsible.is_none() {
        return Err(ApiError::Validation("No fields to update".to_string()));
    }

    let old_view = bag_view(&bag, 0);
    let mut active: bag::ActiveModel = bag.into();

    if let Some(name) = payload.name {
        if name.trim().is_empty() {
            return Err(ApiError::Validation("Name must not be empty".to_string()));
        }
        active.name = Set(name);
    }
    if let Some(responsible) = payload.responsible {
        active.responsible = Set(responsible);
    }

    active.updated_at = Set(now_stamp());
    let updated = active.update(&db).await?;

    audit::record(
        &db,
        "update",
        "bags",
        Some(&updated.id),
        Some(old_view),
        Some(bag_view(&updated, 0)),
    )
    .await;

    Ok(Json(json!({
        "success": true,
        "message": "Bag updated successfully"
    })))
}

pub async fn delete_bag(
    State(db): State<DatabaseConnection>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let txn = db.begin().await?;
    let deleted = transitions::delete_bag(&txn, &id).await?;
    txn.commit().await?;

    audit::record(
        &db,
        "delete",
        "bags",
        Some(&id),
        Some(bag_view(&deleted, 0)),
        None,
    )
    .await;

    Ok(Json(json!({
        "success": true,
        "message": "Bag deleted successfully"
    })))
}

#[derive(Deserialize)]
pub struct PackItemRequest {
    #[serde(rename = "itemId", alias = "item_id")]
    pub item_id: String,
}

/// `available → in-bag` for one item.
pub async fn pack_item(
    State(db): State<DatabaseConnection>,
    Path(id): Path<String>,
    Json(payload): Json<PackItemRequest>,
) -> Result<Json<Value>, ApiError> {
    let txn = db.begin().await?;
    let item = transitions::pack_item(&txn, &id, &payload.item_id).await?;
    txn.commit().await?;

    audit::record(
        &db,
        "pack",
        "items",
        Some(&item.id),
        None,
        Some(item_view(&item)),
    )
    .await;

    Ok(Json(json!({
        "success": true,
        "message": "Item added to bag successfully"
    })))
}

/// `in-bag → available` for one item.
pub async fn unpack_item(
    State(db): State<DatabaseConnection>,
    Path((id, item_id)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    let txn = db.begin().await?;
    let item = transitions::unpack_item(&txn, &id, &item_id).await?;
    txn.commit().await?;

    audit::record(
        &db,
        "unpack",
        "items",
        Some(&item.id),
        None,
        Some(item_view(&item)),
    )
    .await;

    Ok(Json(json!({
        "success": true,
        "message": "Item removed from bag successfully"
    })))
}
