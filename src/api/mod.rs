pub mod bags;
pub mod events;
pub mod health;
pub mod items;
pub mod logs;
pub mod sync;
pub mod views;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use sea_orm::DatabaseConnection;

pub fn api_router(db: DatabaseConnection) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Items
        .route("/items", get(items::list_items).post(items::create_item))
        .route(
            "/items/:id",
            get(items::get_item)
                .put(items::update_item)
                .delete(items::delete_item),
        )
        // Bags
        .route("/bags", get(bags::list_bags).post(bags::create_bag))
        .route(
            "/bags/:id",
            get(bags::get_bag)
                .put(bags::update_bag)
                .delete(bags::delete_bag),
        )
        .route("/bags/:id/items", post(bags::pack_item))
        .route("/bags/:id/items/:item_id", delete(bags::unpack_item))
        // Events
        .route(
            "/events",
            get(events::list_events).post(events::create_event),
        )
        .route(
            "/events/:id",
            get(events::get_event)
                .put(events::update_event)
                .delete(events::delete_event),
        )
        .route("/events/:id/return", put(events::return_event))
        // Sync / backup
        .route("/sync", get(sync::dump))
        .route("/sync/import", post(sync::import))
        .route("/sync/export", get(sync::export))
        .route("/sync/backup", post(sync::backup))
        .route("/sync/restore", post(sync::restore))
        .route("/sync/clear", delete(sync::clear))
        // Activity log
        .route(
            "/logs",
            get(logs::list_logs)
                .post(logs::append_log)
                .delete(logs::purge_logs),
        )
        .with_state(db)
}
