use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub purchase_date: String,
    /// Purchase price. Never negative.
    pub price: f64,
    /// Opaque reference to the stored receipt photo, if any.
    pub receipt_photo: Option<String>,
    pub item_photo: Option<String>,
    /// Lifecycle status of this physical item.
    /// Valid values:
    /// - `available`: In stock, can be packed into a bag
    /// - `in-bag`: Packed into a bag (bag_id set)
    /// - `on-event`: Checked out with its bag for an event (bag_id set)
    /// - `lost`: Missing, out of circulation
    /// - `maintenance`: Being repaired, out of circulation
    pub status: String,
    /// Owning bag. Set iff status is `in-bag` or `on-event`.
    pub bag_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::bag::Entity",
        from = "Column::BagId",
        to = "super::bag::Column::Id"
    )]
    Bag,
}

impl Related<super::bag::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bag.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Create payload. Accepts the display-name (camelCase) convention the
/// clients speak; snake_case aliases keep re-imports of our own exports
/// working.
#[derive(Deserialize)]
pub struct ItemDto {
    pub id: Option<String>,
    pub name: String,
    #[serde(rename = "purchaseDate", alias = "purchase_date")]
    pub purchase_date: String,
    pub price: f64,
    #[serde(rename = "receiptPhoto", alias = "receipt_photo", default)]
    pub receipt_photo: Option<String>,
    #[serde(rename = "itemPhoto", alias = "item_photo", default)]
    pub item_photo: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(rename = "bagId", alias = "bag_id", default)]
    pub bag_id: Option<String>,
}

/// Partial update payload. Absent fields are left untouched.
#[derive(Deserialize)]
pub struct ItemUpdateDto {
    pub name: Option<String>,
    #[serde(rename = "purchaseDate", alias = "purchase_date", default)]
    pub purchase_date: Option<String>,
    pub price: Option<f64>,
    #[serde(rename = "receiptPhoto", alias = "receipt_photo", default)]
    pub receipt_photo: Option<String>,
    #[serde(rename = "itemPhoto", alias = "item_photo", default)]
    pub item_photo: Option<String>,
    pub status: Option<String>,
}
