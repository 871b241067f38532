//! Display-name mapping at the HTTP boundary.
//!
//! Storage uses the canonical snake_case schema; clients speak the
//! camelCase convention (`purchase_date` ↔ `purchaseDate`). This is the
//! only place the translation happens.

use serde_json::{json, Value};

use crate::models::{bag, event, item};

pub fn item_view(item: &item::Model) -> Value {
    json!({
        "id": item.id,
        "name": item.name,
        "purchaseDate": item.purchase_date,
        "price": item.price,
        "receiptPhoto": item.receipt_photo,
        "itemPhoto": item.item_photo,
        "status": item.status,
        "bagId": item.bag_id,
        "created_at": item.created_at,
        "updated_at": item.updated_at,
    })
}

pub fn bag_view(bag: &bag::Model, item_count: u64) -> Value {
    json!({
        "id": bag.id,
        "name": bag.name,
        "responsible": bag.responsible,
        "status": bag.status,
        "item_count": item_count,
        "created_at": bag.created_at,
        "updated_at": bag.updated_at,
    })
}

pub fn bag_view_with_items(bag: &bag::Model, items: &[item::Model]) -> Value {
    let mut view = bag_view(bag, items.len() as u64);
    view["items"] = Value::Array(items.iter().map(item_view).collect());
    view
}

pub fn event_view(event: &event::Model, bag_count: u64) -> Value {
    json!({
        "id": event.id,
        "name": event.name,
        "date": event.date,
        "time": event.time,
        "location": event.location,
        "customer": event.customer,
        "responsible": event.responsible,
        "status": event.status,
        "bag_count": bag_count,
        "created_at": event.created_at,
        "updated_at": event.updated_at,
    })
}
