use chrono::{DateTime, Utc};
use sea_orm::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// An immutable record of stock consumption against one supply.
/// Rows are append-only; they are never updated and only disappear
/// when their parent supply is deleted (FK cascade).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "usage_history")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub supply_id: i32,
    pub quantity_used: i32,
    pub timestamp: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::supplies::Entity",
        from = "Column::SupplyId",
        to = "super::supplies::Column::Id",
        on_delete = "Cascade"
    )]
    Supply,
}

impl Related<super::supplies::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Supply.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
