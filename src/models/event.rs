use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "events")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub date: String,
    pub time: String,
    pub location: String,
    pub customer: String,
    pub responsible: String,
    /// `active` while bags are checked out, `completed` once returned.
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::event_bag::Entity")]
    EventBag,
}

impl Related<super::event_bag::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EventBag.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Deserialize)]
pub struct EventDto {
    pub id: Option<String>,
    pub name: String,
    pub date: String,
    pub time: String,
    pub location: String,
    pub customer: String,
    pub responsible: String,
    #[serde(default)]
    pub status: Option<String>,
    /// Bags checked out when the event is created. All must be available.
    #[serde(rename = "bagIds", alias = "bag_ids", default)]
    pub bag_ids: Vec<String>,
}

#[derive(Deserialize)]
pub struct EventUpdateDto {
    pub name: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub location: Option<String>,
    pub customer: Option<String>,
    pub responsible: Option<String>,
}
