use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Append-only audit trail. Writes are best-effort and never fail the
/// operation that triggered them.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "activity_logs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub action: String,
    pub table_name: String,
    pub record_id: Option<String>,
    /// JSON snapshot of the record before the change.
    pub old_data: Option<String>,
    /// JSON snapshot of the record after the change.
    pub new_data: Option<String>,
    pub actor: Option<String>,
    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Deserialize)]
pub struct LogEntryDto {
    pub action: String,
    pub table_name: String,
    #[serde(default)]
    pub record_id: Option<String>,
    #[serde(default)]
    pub old_data: Option<serde_json::Value>,
    #[serde(default)]
    pub new_data: Option<serde_json::Value>,
    #[serde(default)]
    pub actor: Option<String>,
}
