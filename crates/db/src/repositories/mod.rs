//! Database repositories.

mod action;
mod brand;
mod contact;
mod follow;
mod product;
mod product_like;
mod product_rating;
mod user;

pub use action::{ActionRepository, TargetRef};
pub use brand::BrandRepository;
pub use contact::ContactRepository;
pub use follow::FollowRepository;
pub use product::ProductRepository;
pub use product_like::ProductLikeRepository;
pub use product_rating::ProductRatingRepository;
pub use user::UserRepository;

use sea_orm::{DbErr, SqlErr};
use vitrine_common::AppError;

/// Map an insert failure, turning a unique pair violation into a conflict.
pub(crate) fn map_insert_err(e: DbErr, what: &str) -> AppError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Conflict(format!("{what} already exists"))
        }
        _ => AppError::Database(e.to_string()),
    }
}
