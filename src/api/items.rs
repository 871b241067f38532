use axum::{
    extract::{Path, Query, State},
    Json,
};
use sea_orm::*;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::views::item_view;
use crate::domain::errors::ApiError;
use crate::domain::status::ItemStatus;
use crate::models::item::{self, Entity as Item, ItemDto, ItemUpdateDto};
use crate::services::{audit, transitions};
use crate::utils::{generate_id, now_stamp};

#[derive(Deserialize)]
pub struct ListItemsQuery {
    pub status: Option<String>,
    #[serde(rename = "bagId", alias = "bag_id")]
    pub bag_id: Option<String>,
}

pub async fn list_items(
    State(db): State<DatabaseConnection>,
    Query(query): Query<ListItemsQuery>,
) -> Result<Json<Value>, ApiError> {
    let mut condition = Condition::all();

    if let Some(status) = query.status {
        condition = condition.add(item::Column::Status.eq(status));
    }

    if let Some(bag_id) = query.bag_id {
        condition = condition.add(item::Column::BagId.eq(bag_id));
    }

    let items = Item::find()
        .filter(condition)
        .order_by_desc(item::Column::CreatedAt)
        .all(&db)
        .await?;

    Ok(Json(Value::Array(items.iter().map(item_view).collect())))
}

pub async fn get_item(
    State(db): State<DatabaseConnection>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let item = Item::find_by_id(&id)
        .one(&db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Item not found".to_string()))?;

    Ok(Json(item_view(&item)))
}

pub async fn create_item(
    State(db): State<DatabaseConnection>,
    Json(payload): Json<ItemDto>,
) -> Result<Json<Value>, ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::Validation(
            "Missing required field: name".to_string(),
        ));
    }
    if payload.purchase_date.trim().is_empty() {
        return Err(ApiError::Validation(
            "Missing required field: purchaseDate".to_string(),
        ));
    }
    if payload.price < 0.0 {
        return Err(ApiError::Validation(
            "Price must not be negative".to_string(),
        ));
    }

    let status = match &payload.status {
        Some(s) => ItemStatus::parse(s)?,
        None => ItemStatus::Available,
    };
    // bag_id is set iff the status says the item sits in a bag
    if status.requires_bag() != payload.bag_id.is_some() {
        return Err(ApiError::Validation(
            "bagId must be set exactly when status is in-bag or on-event".to_string(),
        ));
    }

    let id = payload.id.unwrap_or_else(generate_id);
    let now = now_stamp();

    let new_item = item::ActiveModel {
        id: Set(id.clone()),
        name: Set(payload.name),
        purchase_date: Set(payload.purchase_date),
        price: Set(payload.price),
        receipt_photo: Set(payload.receipt_photo),
        item_photo: Set(payload.item_photo),
        status: Set(status.as_str().to_string()),
        bag_id: Set(payload.bag_id),
        created_at: Set(now.clone()),
        updated_at: Set(now),
    };

    let saved = new_item.insert(&db).await?;

    audit::record(
        &db,
        "create",
        "items",
        Some(&saved.id),
        None,
        Some(item_view(&saved)),
    )
    .await;

    Ok(Json(json!({
        "success": true,
        "id": id,
        "message": "Item created successfully"
    })))
}

pub async fn update_item(
    State(db): State<DatabaseConnection>,
    Path(id): Path<String>,
    Json(payload): Json<ItemUpdateDto>,
) -> Result<Json<Value>, ApiError> {
    let item = Item::find_by_id(&id)
        .one(&db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Item not found".to_string()))?;

    let has_changes = payload.name.is_some()
        || payload.purchase_date.is_some()
        || payload.price.is_some()
        || payload.receipt_photo.is_some()
        || payload.item_photo.is_some()
        || payload.status.is_some();

    if !has_changes {
        return Err(ApiError::Validation("No fields to update".to_string()));
    }

    let old_view = item_view(&item);
    let mut active: item::ActiveModel = item.clone().into();

    if let Some(name) = payload.name {
        if name.trim().is_empty() {
            return Err(ApiError::Validation("Name must not be empty".to_string()));
        }
        active.name = Set(name);
    }
    if let Some(date) = payload.purchase_date {
        active.purchase_date = Set(date);
    }
    if let Some(price) = payload.price {
        if price < 0.0 {
            return Err(ApiError::Validation(
                "Price must not be negative".to_string(),
            ));
        }
        active.price = Set(price);
    }
    if let Some(photo) = payload.receipt_photo {
        active.receipt_photo = Set(Some(photo));
    }
    if let Some(photo) = payload.item_photo {
        active.item_photo = Set(Some(photo));
    }
    if let Some(requested) = payload.status {
        // Only the lost/maintenance side branches are reachable here;
        // packing and event flow have their own endpoints.
        let (status, bag_id) = transitions::plan_status_change(&item, &requested)?;
        active.status = Set(status);
        active.bag_id = Set(bag_id);
    }

    active.updated_at = Set(now_stamp());
    let updated = active.update(&db).await?;

    audit::record(
        &db,
        "update",
        "items",
        Some(&updated.id),
        Some(old_view),
        Some(item_view(&updated)),
    )
    .await;

    Ok(Json(json!({
        "success": true,
        "message": "Item updated successfully"
    })))
}

pub async fn delete_item(
    State(db): State<DatabaseConnection>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let item = Item::find_by_id(&id)
        .one(&db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Item not found".to_string()))?;

    if item.status != ItemStatus::Available.as_str() {
        return Err(ApiError::Conflict(
            "Cannot delete item that is not available (currently in bag or on event)".to_string(),
        ));
    }

    let old_view = item_view(&item);
    Item::delete_by_id(&id).exec(&db).await?;

    audit::record(&db, "delete", "items", Some(&id), Some(old_view), None).await;

    Ok(Json(json!({
        "success": true,
        "message": "Item deleted successfully"
    })))
}
