use sea_orm::sea_query::OnConflict;
use sea_orm::*;

use crate::models::{bag, item};
use crate::utils::now_stamp;

/// Seed a small demo inventory. Safe to run repeatedly; existing rows
/// are left alone.
pub async fn seed_demo_data(db: &DatabaseConnection) -> Result<(), DbErr> {
    let now = now_stamp();

    let bags = [
        ("bag_demo_kit_a", "Kit A", "Alice"),
        ("bag_demo_kit_b", "Kit B", "Bob"),
    ];

    for (id, name, responsible) in bags {
        let model = bag::ActiveModel {
            id: Set(id.to_owned()),
            name: Set(name.to_owned()),
            responsible: Set(responsible.to_owned()),
            status: Set("available".to_owned()),
            created_at: Set(now.clone()),
            updated_at: Set(now.clone()),
        };
        bag::Entity::insert(model)
            .on_conflict(OnConflict::column(bag::Column::Id).do_nothing().to_owned())
            .do_nothing()
            .exec(db)
            .await?;
    }

    let items = [
        ("item_demo_pen", "Pen", "2024-01-15", 25.5),
        ("item_demo_notebook", "Notebook", "2024-01-15", 89.0),
        ("item_demo_projector", "Projector", "2024-02-02", 12500.0),
        ("item_demo_hdmi", "HDMI Cable", "2024-02-02", 250.0),
    ];

    for (id, name, purchase_date, price) in items {
        let model = item::ActiveModel {
            id: Set(id.to_owned()),
            name: Set(name.to_owned()),
            purchase_date: Set(purchase_date.to_owned()),
            price: Set(price),
            receipt_photo: Set(None),
            item_photo: Set(None),
            status: Set("available".to_owned()),
            bag_id: Set(None),
            created_at: Set(now.clone()),
            updated_at: Set(now.clone()),
        };
        item::Entity::insert(model)
            .on_conflict(
                OnConflict::column(item::Column::Id)
                    .do_nothing()
                    .to_owned(),
            )
            .do_nothing()
            .exec(db)
            .await?;
    }

    Ok(())
}
