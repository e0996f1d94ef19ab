//! Product rating edge entity.

use sea_orm::entity::prelude::*;
use sea_orm::sea_query::{Index, IndexCreateStatement};
use serde::{Deserialize, Serialize};

/// Lowest accepted rating value.
pub const MIN_RATING: i16 = 0;
/// Highest accepted rating value.
pub const MAX_RATING: i16 = 5;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "product_rating")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub user_id: String,

    #[sea_orm(indexed)]
    pub product_id: String,

    /// Overwritten in place when the user rates again
    pub value: i16,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,

    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id",
        on_delete = "Cascade"
    )]
    Product,
}

impl ActiveModelBehavior for ActiveModel {}

/// One rating per (`user_id`, `product_id`) pair.
#[must_use]
pub fn unique_pair_index() -> IndexCreateStatement {
    Index::create()
        .name("uq_product_rating_user_product")
        .table(Entity)
        .col(Column::UserId)
        .col(Column::ProductId)
        .unique()
        .to_owned()
}
