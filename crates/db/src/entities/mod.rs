//! Database entities.

pub mod action;
pub mod brand;
pub mod contact;
pub mod follow;
pub mod product;
pub mod product_like;
pub mod product_rating;
pub mod user;

pub use action::Entity as Action;
pub use brand::Entity as Brand;
pub use contact::Entity as Contact;
pub use follow::Entity as Follow;
pub use product::Entity as Product;
pub use product_like::Entity as ProductLike;
pub use product_rating::Entity as ProductRating;
pub use user::Entity as User;
