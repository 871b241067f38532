use axum::{
    extract::{Path, Query, State},
    Json,
};
use sea_orm::*;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::views::{bag_view_with_items, event_view};
use crate::domain::errors::ApiError;
use crate::domain::status::EventStatus;
use crate::models::event::{self, Entity as Event, EventDto, EventUpdateDto};
use crate::models::event_bag::{self, Entity as EventBag};
use crate::models::item::{self, Entity as Item};
use crate::models::{bag, bag::Entity as Bag};
use crate::services::{audit, transitions};
use crate::utils::{generate_id, now_stamp};

#[derive(Deserialize)]
pub struct ListEventsQuery {
    pub status: Option<String>,
    #[serde(rename = "withBags", alias = "with_bags", default)]
    pub with_bags: bool,
}

/// Member bags of an event, name-ordered, each with its items.
async fn event_bags_nested(
    db: &DatabaseConnection,
    event_id: &str,
) -> Result<Vec<Value>, ApiError> {
    let bag_ids: Vec<String> = EventBag::find()
        .filter(event_bag::Column::EventId.eq(event_id))
        .all(db)
        .await?
        .into_iter()
        .map(|link| link.bag_id)
        .collect();

    let bags = Bag::find()
        .filter(bag::Column::Id.is_in(bag_ids))
        .order_by_asc(bag::Column::Name)
        .all(db)
        .await?;

    let mut nested = Vec::with_capacity(bags.len());
    for b in &bags {
        let items = Item::find()
            .filter(item::Column::BagId.eq(&b.id))
            .order_by_asc(item::Column::Name)
            .all(db)
            .await?;
        nested.push(bag_view_with_items(b, &items));
    }
    Ok(nested)
}

async fn bag_count(db: &DatabaseConnection, event_id: &str) -> Result<u64, ApiError> {
    Ok(EventBag::find()
        .filter(event_bag::Column::EventId.eq(event_id))
        .count(db)
        .await?)
}

pub async fn list_events(
    State(db): State<DatabaseConnection>,
    Query(query): Query<ListEventsQuery>,
) -> Result<Json<Value>, ApiError> {
    let mut condition = Condition::all();

    if let Some(status) = query.status {
        condition = condition.add(event::Column::Status.eq(status));
    }

    let events = Event::find()
        .filter(condition)
        .order_by_desc(event::Column::Date)
        .order_by_desc(event::Column::Time)
        .all(&db)
        .await?;

    let mut result = Vec::with_capacity(events.len());
    for e in &events {
        let mut view = event_view(e, bag_count(&db, &e.id).await?);
        if query.with_bags {
            view["bags"] = Value::Array(event_bags_nested(&db, &e.id).await?);
        }
        result.push(view);
    }

    Ok(Json(Value::Array(result)))
}

pub async fn get_event(
    State(db): State<DatabaseConnection>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let event = Event::find_by_id(&id)
        .one(&db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Event not found".to_string()))?;

    let mut view = event_view(&event, bag_count(&db, &event.id).await?);
    view["bags"] = Value::Array(event_bags_nested(&db, &event.id).await?);
    Ok(Json(view))
}

pub async fn create_event(
    State(db): State<DatabaseConnection>,
    Json(payload): Json<EventDto>,
) -> Result<Json<Value>, ApiError> {
    for (field, value) in [
        ("name", &payload.name),
        ("date", &payload.date),
        ("time", &payload.time),
        ("location", &payload.location),
        ("customer", &payload.customer),
        ("responsible", &payload.responsible),
    ] {
        if value.trim().is_empty() {
            return Err(ApiError::Validation(format!(
                "Missing required field: {}",
                field
            )));
        }
    }

    let status = match &payload.status {
        Some(s) => EventStatus::parse(s)?,
        None => EventStatus::Active,
    };

    let id = payload.id.unwrap_or_else(generate_id);
    let now = now_stamp();

    let txn = db.begin().await?;

    event::ActiveModel {
        id: Set(id.clone()),
        name: Set(payload.name),
        date: Set(payload.date),
        time: Set(payload.time),
        location: Set(payload.location),
        customer: Set(payload.customer),
        responsible: Set(payload.responsible),
        status: Set(status.as_str().to_string()),
        created_at: Set(now.clone()),
        updated_at: Set(now),
    }
    .insert(&txn)
    .await?;

    // Only an active event holds bags; a failed checkout rolls the
    // event insert back with it.
    if status == EventStatus::Active && !payload.bag_ids.is_empty() {
        transitions::checkout_bags(&txn, &id, &payload.bag_ids).await?;
    }

    txn.commit().await?;

    audit::record(
        &db,
        "create",
        "events",
        Some(&id),
        None,
        Some(json!({ "id": id, "bagIds": payload.bag_ids })),
    )
    .await;

    Ok(Json(json!({
        "success": true,
        "id": id,
        "message": "Event created successfully"
    })))
}

pub async fn update_event(
    State(db): State<DatabaseConnection>,
    Path(id): Path<String>,
    Json(payload): Json<EventUpdateDto>,
) -> Result<Json<Value>, ApiError> {
    let event = Event::find_by_id(&id)
        .one(&db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Event not found".to_string()))?;

    let has_changes = payload.name.is_some()
        || payload.date.is_some()
        || payload.time.is_some()
        || payload.location.is_some()
        || payload.customer.is_some()
        || payload.responsible.is_some();

    if !has_changes {
        return Err(ApiError::Validation("No fields to update".to_string()));
    }

    let old_view = event_view(&event, 0);
    let mut active: event::ActiveModel = event.into();

    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(date) = payload.date {
        active.date = Set(date);
    }
    if let Some(time) = payload.time {
        active.time = Set(time);
    }
    if let Some(location) = payload.location {
        active.location = Set(location);
    }
    if let Some(customer) = payload.customer {
        active.customer = Set(customer);
    }
    if let Some(responsible) = payload.responsible {
        active.responsible = Set(responsible);
    }

    active.updated_at = Set(now_stamp());
    let updated = active.update(&db).await?;

    audit::record(
        &db,
        "update",
        "events",
        Some(&updated.id),
        Some(old_view),
        Some(event_view(&updated, 0)),
    )
    .await;

    Ok(Json(json!({
        "success": true,
        "message": "Event updated successfully"
    })))
}

/// Bulk restore: items `on-event → in-bag`, bags back to `available`,
/// event flips to `completed`.
pub async fn return_event(
    State(db): State<DatabaseConnection>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let txn = db.begin().await?;
    let event = transitions::return_event(&txn, &id).await?;
    txn.commit().await?;

    audit::record(
        &db,
        "return",
        "events",
        Some(&event.id),
        None,
        Some(event_view(&event, 0)),
    )
    .await;

    Ok(Json(json!({
        "success": true,
        "message": "Event items returned successfully"
    })))
}

pub async fn delete_event(
    State(db): State<DatabaseConnection>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let txn = db.begin().await?;
    let deleted = transitions::delete_event(&txn, &id).await?;
    txn.commit().await?;

    audit::record(
        &db,
        "delete",
        "events",
        Some(&id),
        Some(event_view(&deleted, 0)),
        None,
    )
    .await;

    Ok(Json(json!({
        "success": true,
        "message": "Event deleted successfully"
    })))
}
