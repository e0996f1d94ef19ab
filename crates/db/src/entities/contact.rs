//! Contact edge entity (user → brand).

use sea_orm::entity::prelude::*;
use sea_orm::sea_query::{Index, IndexCreateStatement};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "contact")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub from_user_id: String,

    #[sea_orm(indexed)]
    pub to_brand_id: String,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::FromUserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,

    #[sea_orm(
        belongs_to = "super::brand::Entity",
        from = "Column::ToBrandId",
        to = "super::brand::Column::Id",
        on_delete = "Cascade"
    )]
    Brand,
}

impl ActiveModelBehavior for ActiveModel {}

/// One contact per (`from_user_id`, `to_brand_id`) pair.
#[must_use]
pub fn unique_pair_index() -> IndexCreateStatement {
    Index::create()
        .name("uq_contact_from_to")
        .table(Entity)
        .col(Column::FromUserId)
        .col(Column::ToBrandId)
        .unique()
        .to_owned()
}
