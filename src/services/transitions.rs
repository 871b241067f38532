//! Status rule engine.
//!
//! Single canonical implementation of the item/bag/event state machine:
//! `available ⇄ in-bag ⇄ on-event` for items, with `lost` and
//! `maintenance` reachable only from `available`. Every bulk transition
//! runs inside the caller's transaction so a mid-batch failure rolls
//! the whole operation back.

use sea_orm::sea_query::Expr;
use sea_orm::*;

use crate::domain::errors::ApiError;
use crate::domain::status::{BagStatus, EventStatus, ItemStatus};
use crate::models::{bag, event, event_bag, item};
use crate::utils::now_stamp;

/// Pack an available item into an available bag (`available → in-bag`).
pub async fn pack_item<C: ConnectionTrait>(
    db: &C,
    bag_id: &str,
    item_id: &str,
) -> Result<item::Model, ApiError> {
    let item = item::Entity::find_by_id(item_id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Item not found".to_string()))?;

    if item.status != ItemStatus::Available.as_str() {
        return Err(ApiError::Conflict("Item is not available".to_string()));
    }

    let bag = bag::Entity::find_by_id(bag_id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Bag not found".to_string()))?;

    if bag.status != BagStatus::Available.as_str() {
        return Err(ApiError::Conflict(
            "Bag is not available (currently on event)".to_string(),
        ));
    }

    let mut active: item::ActiveModel = item.into();
    active.bag_id = Set(Some(bag_id.to_string()));
    active.status = Set(ItemStatus::InBag.as_str().to_string());
    active.updated_at = Set(now_stamp());
    Ok(active.update(db).await?)
}

/// Take an item out of its bag (`in-bag → available`). The item must
/// actually belong to the claimed bag.
pub async fn unpack_item<C: ConnectionTrait>(
    db: &C,
    bag_id: &str,
    item_id: &str,
) -> Result<item::Model, ApiError> {
    let item = item::Entity::find_by_id(item_id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Item not found".to_string()))?;

    if item.bag_id.as_deref() != Some(bag_id) {
        return Err(ApiError::Conflict(
            "Item does not belong to this bag".to_string(),
        ));
    }
    if item.status != ItemStatus::InBag.as_str() {
        return Err(ApiError::Conflict(
            "Item is not in the bag (currently on event)".to_string(),
        ));
    }

    let mut active: item::ActiveModel = item.into();
    active.bag_id = Set(None);
    active.status = Set(ItemStatus::Available.as_str().to_string());
    active.updated_at = Set(now_stamp());
    Ok(active.update(db).await?)
}

/// Attach the given bags to a freshly created event and flip them and
/// their items to `on-event`. Fails without side effects if any bag is
/// missing or unavailable; the caller's transaction makes that atomic.
pub async fn checkout_bags(
    txn: &DatabaseTransaction,
    event_id: &str,
    bag_ids: &[String],
) -> Result<(), ApiError> {
    let bags = bag::Entity::find()
        .filter(bag::Column::Id.is_in(bag_ids.to_vec()))
        .all(txn)
        .await?;

    if bags.len() != bag_ids.len() {
        return Err(ApiError::NotFound("Some bags not found".to_string()));
    }

    for b in &bags {
        if b.status != BagStatus::Available.as_str() {
            return Err(ApiError::Conflict(format!(
                "Bag {} is not available",
                b.id
            )));
        }
    }

    for bag_id in bag_ids {
        event_bag::Entity::insert(event_bag::ActiveModel {
            event_id: Set(event_id.to_string()),
            bag_id: Set(bag_id.to_string()),
        })
        .exec(txn)
        .await?;
    }

    bag::Entity::update_many()
        .col_expr(bag::Column::Status, Expr::value(BagStatus::OnEvent.as_str()))
        .col_expr(bag::Column::UpdatedAt, Expr::value(now_stamp()))
        .filter(bag::Column::Id.is_in(bag_ids.to_vec()))
        .exec(txn)
        .await?;

    item::Entity::update_many()
        .col_expr(item::Column::Status, Expr::value(ItemStatus::OnEvent.as_str()))
        .col_expr(item::Column::UpdatedAt, Expr::value(now_stamp()))
        .filter(item::Column::BagId.is_in(bag_ids.to_vec()))
        .exec(txn)
        .await?;

    Ok(())
}

/// Undo the checkout of an event's bags: items back to `in-bag`, bags
/// back to `available`, membership rows removed.
async fn release_bags(txn: &DatabaseTransaction, event_id: &str) -> Result<(), ApiError> {
    let bag_ids: Vec<String> = event_bag::Entity::find()
        .filter(event_bag::Column::EventId.eq(event_id))
        .all(txn)
        .await?
        .into_iter()
        .map(|link| link.bag_id)
        .collect();

    if !bag_ids.is_empty() {
        item::Entity::update_many()
            .col_expr(item::Column::Status, Expr::value(ItemStatus::InBag.as_str()))
            .col_expr(item::Column::UpdatedAt, Expr::value(now_stamp()))
            .filter(item::Column::BagId.is_in(bag_ids.clone()))
            .exec(txn)
            .await?;

        bag::Entity::update_many()
            .col_expr(bag::Column::Status, Expr::value(BagStatus::Available.as_str()))
            .col_expr(bag::Column::UpdatedAt, Expr::value(now_stamp()))
            .filter(bag::Column::Id.is_in(bag_ids))
            .exec(txn)
            .await?;

        event_bag::Entity::delete_many()
            .filter(event_bag::Column::EventId.eq(event_id))
            .exec(txn)
            .await?;
    }

    Ok(())
}

/// Return an active event (`on-event → in-bag` for every item in its
/// bags). Returning an already-completed event is a conflict, not a
/// no-op.
pub async fn return_event(
    txn: &DatabaseTransaction,
    event_id: &str,
) -> Result<event::Model, ApiError> {
    let event = event::Entity::find_by_id(event_id)
        .one(txn)
        .await?
        .ok_or_else(|| ApiError::NotFound("Event not found".to_string()))?;

    if event.status != EventStatus::Active.as_str() {
        return Err(ApiError::Conflict("Event is not active".to_string()));
    }

    release_bags(txn, event_id).await?;

    let mut active: event::ActiveModel = event.into();
    active.status = Set(EventStatus::Completed.as_str().to_string());
    active.updated_at = Set(now_stamp());
    Ok(active.update(txn).await?)
}

/// Delete an event. An active event is returned first so its bags and
/// items come back; a completed event only drops its (already empty)
/// membership rows.
pub async fn delete_event(
    txn: &DatabaseTransaction,
    event_id: &str,
) -> Result<event::Model, ApiError> {
    let event = event::Entity::find_by_id(event_id)
        .one(txn)
        .await?
        .ok_or_else(|| ApiError::NotFound("Event not found".to_string()))?;

    if event.status == EventStatus::Active.as_str() {
        release_bags(txn, event_id).await?;
    }

    event_bag::Entity::delete_many()
        .filter(event_bag::Column::EventId.eq(event_id))
        .exec(txn)
        .await?;

    event::Entity::delete_by_id(event_id).exec(txn).await?;

    Ok(event)
}

/// Delete a bag. Blocked while the bag is on an event; contained items
/// are force-detached back to `available` first.
pub async fn delete_bag(
    txn: &DatabaseTransaction,
    bag_id: &str,
) -> Result<bag::Model, ApiError> {
    let bag = bag::Entity::find_by_id(bag_id)
        .one(txn)
        .await?
        .ok_or_else(|| ApiError::NotFound("Bag not found".to_string()))?;

    if bag.status == BagStatus::OnEvent.as_str() {
        return Err(ApiError::Conflict(
            "Cannot delete bag that is currently on event".to_string(),
        ));
    }

    item::Entity::update_many()
        .col_expr(item::Column::Status, Expr::value(ItemStatus::Available.as_str()))
        .col_expr(item::Column::BagId, Expr::value(Option::<String>::None))
        .col_expr(item::Column::UpdatedAt, Expr::value(now_stamp()))
        .filter(item::Column::BagId.eq(bag_id))
        .exec(txn)
        .await?;

    bag::Entity::delete_by_id(bag_id).exec(txn).await?;

    Ok(bag)
}

/// Validate a status change requested through an item update and
/// return the bag link the item must end up with.
///
/// Only the side branches are reachable here (`available ⇄ lost`,
/// `available ⇄ maintenance`); packing and event flow go through their
/// own operations. As a repair path, an item stuck with a bag link may
/// still be marked lost/maintenance, which detaches it in the same
/// update.
pub fn plan_status_change(
    current: &item::Model,
    requested: &str,
) -> Result<(String, Option<String>), ApiError> {
    let next = ItemStatus::parse(requested)?;
    let cur = ItemStatus::parse(&current.status)?;

    if next == cur {
        return Ok((current.status.clone(), current.bag_id.clone()));
    }

    match (cur, next) {
        (ItemStatus::Available, ItemStatus::Lost)
        | (ItemStatus::Available, ItemStatus::Maintenance)
        | (ItemStatus::Lost, ItemStatus::Available)
        | (ItemStatus::Maintenance, ItemStatus::Available) => {
            Ok((next.as_str().to_string(), None))
        }
        (ItemStatus::InBag, ItemStatus::Lost) | (ItemStatus::InBag, ItemStatus::Maintenance) => {
            // Detach from the bag as part of the same operation
            Ok((next.as_str().to_string(), None))
        }
        _ => Err(ApiError::Conflict(format!(
            "Cannot change item status from {} to {}",
            cur.as_str(),
            next.as_str()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item_with(status: &str, bag_id: Option<&str>) -> item::Model {
        item::Model {
            id: "i1".into(),
            name: "Pen".into(),
            purchase_date: "2024-01-01".into(),
            price: 25.5,
            receipt_photo: None,
            item_photo: None,
            status: status.into(),
            bag_id: bag_id.map(str::to_string),
            created_at: "2024-01-01 00:00:00".into(),
            updated_at: "2024-01-01 00:00:00".into(),
        }
    }

    #[test]
    fn available_can_go_lost_and_back() {
        let item = item_with("available", None);
        let (status, bag) = plan_status_change(&item, "lost").unwrap();
        assert_eq!(status, "lost");
        assert_eq!(bag, None);

        let item = item_with("lost", None);
        let (status, _) = plan_status_change(&item, "available").unwrap();
        assert_eq!(status, "available");
    }

    #[test]
    fn marking_a_packed_item_lost_detaches_it() {
        let item = item_with("in-bag", Some("b1"));
        let (status, bag) = plan_status_change(&item, "lost").unwrap();
        assert_eq!(status, "lost");
        assert_eq!(bag, None);
    }

    #[test]
    fn on_event_items_cannot_change_status_directly() {
        let item = item_with("on-event", Some("b1"));
        assert!(plan_status_change(&item, "lost").is_err());
        assert!(plan_status_change(&item, "available").is_err());
    }

    #[test]
    fn lost_cannot_jump_to_maintenance() {
        let item = item_with("lost", None);
        assert!(plan_status_change(&item, "maintenance").is_err());
    }

    #[test]
    fn same_status_is_a_no_op() {
        let item = item_with("in-bag", Some("b1"));
        let (status, bag) = plan_status_change(&item, "in-bag").unwrap();
        assert_eq!(status, "in-bag");
        assert_eq!(bag.as_deref(), Some("b1"));
    }
}
