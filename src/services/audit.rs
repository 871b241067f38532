//! Best-effort activity logging.
//!
//! Log writes happen after the primary operation commits and must
//! never fail it; errors are reported at `warn` and dropped.

use sea_orm::*;
use serde_json::Value;

use crate::models::activity_log;
use crate::utils::now_stamp;

pub async fn record(
    db: &DatabaseConnection,
    action: &str,
    table_name: &str,
    record_id: Option<&str>,
    old_data: Option<Value>,
    new_data: Option<Value>,
) {
    let entry = activity_log::ActiveModel {
        action: Set(action.to_string()),
        table_name: Set(table_name.to_string()),
        record_id: Set(record_id.map(str::to_string)),
        old_data: Set(old_data.map(|v| v.to_string())),
        new_data: Set(new_data.map(|v| v.to_string())),
        actor: Set(None),
        created_at: Set(now_stamp()),
        ..Default::default()
    };

    if let Err(e) = entry.insert(db).await {
        tracing::warn!(
            "activity log write failed ({} on {}): {}",
            action,
            table_name,
            e
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_db;

    #[tokio::test]
    async fn record_appends_an_entry() {
        let db = init_db("sqlite::memory:").await.expect("init db");

        record(
            &db,
            "create",
            "items",
            Some("abc"),
            None,
            Some(serde_json::json!({ "name": "Pen" })),
        )
        .await;

        let logs = activity_log::Entity::find().all(&db).await.expect("query");
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].action, "create");
        assert_eq!(logs[0].table_name, "items");
        assert_eq!(logs[0].record_id.as_deref(), Some("abc"));
    }
}
