//! Follow edge entity (user → user).

use sea_orm::entity::prelude::*;
use sea_orm::sea_query::{Index, IndexCreateStatement};
use serde::{Deserialize, Serialize};

/// Follow edge state.
///
/// Only `Accepted` edges are counted towards follower/following counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum FollowStatus {
    /// Waiting for the (private) target to accept.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Live follow relationship.
    #[sea_orm(string_value = "accepted")]
    Accepted,
}

/// At most one row exists per (`from_user_id`, `to_user_id`) pair.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "follow")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The user who follows
    #[sea_orm(indexed)]
    pub from_user_id: String,

    /// The user being followed
    #[sea_orm(indexed)]
    pub to_user_id: String,

    pub status: FollowStatus,

    pub created_at: DateTimeWithTimeZone,

    /// Set when the edge became accepted
    #[sea_orm(nullable)]
    pub allowed_at: Option<DateTimeWithTimeZone>,
}

impl Model {
    /// Whether this edge counts towards follower counters.
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        self.status == FollowStatus::Accepted
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::FromUserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    FromUser,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ToUserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    ToUser,
}

impl ActiveModelBehavior for ActiveModel {}

/// One follow edge per (`from_user_id`, `to_user_id`) pair.
#[must_use]
pub fn unique_pair_index() -> IndexCreateStatement {
    Index::create()
        .name("uq_follow_from_to")
        .table(Entity)
        .col(Column::FromUserId)
        .col(Column::ToUserId)
        .unique()
        .to_owned()
}
