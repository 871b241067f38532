use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chrono::Duration;
use sea_orm::*;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::domain::errors::ApiError;
use crate::models::activity_log::{self, Entity as ActivityLog, LogEntryDto};
use crate::utils::now_stamp;

#[derive(Deserialize)]
pub struct ListLogsQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub action: Option<String>,
    pub table_name: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

pub async fn list_logs(
    State(db): State<DatabaseConnection>,
    Query(query): Query<ListLogsQuery>,
) -> Result<Json<Value>, ApiError> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(50).clamp(1, 500);

    let mut condition = Condition::all();

    if let Some(action) = query.action.filter(|s| !s.is_empty()) {
        condition = condition.add(activity_log::Column::Action.eq(action));
    }
    if let Some(table_name) = query.table_name.filter(|s| !s.is_empty()) {
        condition = condition.add(activity_log::Column::TableName.eq(table_name));
    }
    // Timestamps sort lexically, so day-level bounds are plain string
    // comparisons against the stored stamps.
    if let Some(from) = query.date_from.filter(|s| !s.is_empty()) {
        condition = condition.add(activity_log::Column::CreatedAt.gte(from));
    }
    if let Some(to) = query.date_to.filter(|s| !s.is_empty()) {
        condition = condition.add(activity_log::Column::CreatedAt.lte(format!("{} 23:59:59", to)));
    }

    let total = ActivityLog::find()
        .filter(condition.clone())
        .count(&db)
        .await?;

    let logs = ActivityLog::find()
        .filter(condition)
        .order_by_desc(activity_log::Column::CreatedAt)
        .order_by_desc(activity_log::Column::Id)
        .paginate(&db, limit)
        .fetch_page(page - 1)
        .await?;

    // Distinct values for the filter dropdowns
    let actions: Vec<String> = ActivityLog::find()
        .select_only()
        .column(activity_log::Column::Action)
        .distinct()
        .order_by_asc(activity_log::Column::Action)
        .into_tuple()
        .all(&db)
        .await?;

    let tables: Vec<String> = ActivityLog::find()
        .select_only()
        .column(activity_log::Column::TableName)
        .distinct()
        .order_by_asc(activity_log::Column::TableName)
        .into_tuple()
        .all(&db)
        .await?;

    Ok(Json(json!({
        "logs": logs,
        "pagination": {
            "page": page,
            "limit": limit,
            "total": total,
            "total_pages": total.div_ceil(limit),
        },
        "filters": {
            "actions": actions,
            "tables": tables,
        }
    })))
}

pub async fn append_log(
    State(db): State<DatabaseConnection>,
    Json(payload): Json<LogEntryDto>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    if payload.action.trim().is_empty() {
        return Err(ApiError::Validation(
            "Missing required field: action".to_string(),
        ));
    }
    if payload.table_name.trim().is_empty() {
        return Err(ApiError::Validation(
            "Missing required field: table_name".to_string(),
        ));
    }

    let entry = activity_log::ActiveModel {
        action: Set(payload.action),
        table_name: Set(payload.table_name),
        record_id: Set(payload.record_id),
        old_data: Set(payload.old_data.map(|v| v.to_string())),
        new_data: Set(payload.new_data.map(|v| v.to_string())),
        actor: Set(payload.actor),
        created_at: Set(now_stamp()),
        ..Default::default()
    };

    let saved = entry.insert(&db).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Log entry created successfully",
            "id": saved.id,
        })),
    ))
}

#[derive(Deserialize)]
pub struct PurgeLogsQuery {
    pub days: Option<i64>,
}

/// Age-based maintenance purge, default 30 days.
pub async fn purge_logs(
    State(db): State<DatabaseConnection>,
    Query(query): Query<PurgeLogsQuery>,
) -> Result<Json<Value>, ApiError> {
    let days = query.days.unwrap_or(30).max(0);
    let cutoff = (chrono::Utc::now() - Duration::days(days))
        .format("%Y-%m-%d %H:%M:%S")
        .to_string();

    let result = ActivityLog::delete_many()
        .filter(activity_log::Column::CreatedAt.lt(cutoff))
        .exec(&db)
        .await?;

    Ok(Json(json!({
        "message": "Old logs cleared successfully",
        "deleted_count": result.rows_affected,
    })))
}
