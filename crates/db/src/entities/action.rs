//! Brand feed action entity.
//!
//! Duplicate suppression filters on (`brand_id`, `verb`, `target_kind`,
//! `target_id`, `seen`, `created_at`); production databases need a composite
//! index over those columns in that order.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// What a brand did.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "UPPERCASE")]
pub enum Verb {
    #[sea_orm(string_value = "NEW")]
    New,
    #[sea_orm(string_value = "LIKE")]
    Like,
    #[sea_orm(string_value = "SALE")]
    Sale,
    #[sea_orm(string_value = "PROMO")]
    Promo,
    #[sea_orm(string_value = "PRODUCT")]
    Product,
    #[sea_orm(string_value = "CONTEST")]
    Contest,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "action")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Acting brand
    #[sea_orm(indexed)]
    pub brand_id: String,

    pub verb: Verb,

    /// Target type tag (`product`, `brand`); `None` for untargeted actions
    #[sea_orm(nullable)]
    pub target_kind: Option<String>,

    #[sea_orm(nullable)]
    pub target_id: Option<String>,

    #[sea_orm(default_value = false)]
    pub seen: bool,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::brand::Entity",
        from = "Column::BrandId",
        to = "super::brand::Column::Id",
        on_delete = "Cascade"
    )]
    Brand,
}

impl ActiveModelBehavior for ActiveModel {}
